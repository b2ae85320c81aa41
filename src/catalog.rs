use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{Error, Result};
use crate::types::{FinishRequirement, StockType};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FinishRow {
    #[serde(alias = "Length")]
    pub length: f64,
    #[serde(alias = "Quantity", deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(alias = "Label")]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StockRow {
    #[serde(alias = "Length")]
    pub length: f64,
    /// Defaults to `length` when absent.
    #[serde(default, alias = "Price")]
    pub price: Option<f64>,
    /// Defaults to the length rendered as text.
    #[serde(default, alias = "Label")]
    pub label: Option<String>,
}

/// Accepts `3` as well as `3.0`, which is how spreadsheet exports often
/// write whole numbers.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f64::deserialize(deserializer)?;
    if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Ok(v as u32)
    } else {
        Err(de::Error::custom(format!(
            "expected a non-negative whole number, got {v}"
        )))
    }
}

impl From<StockRow> for StockType {
    fn from(row: StockRow) -> Self {
        let id = row.label.unwrap_or_else(|| row.length.to_string());
        StockType::new(id, row.length, row.price.unwrap_or(row.length))
    }
}

impl From<FinishRow> for FinishRequirement {
    fn from(row: FinishRow) -> Self {
        FinishRequirement::new(row.label, row.length, row.quantity)
    }
}

/// Both tables of one problem instance.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogFile {
    #[serde(default, alias = "Stocks")]
    pub stocks: Vec<StockRow>,
    #[serde(default, alias = "finishes", alias = "Finish")]
    pub finish: Vec<FinishRow>,
}

impl CatalogFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Converts the rows into validated catalogs.
    pub fn into_catalogs(self) -> Result<(Vec<StockType>, Vec<FinishRequirement>)> {
        let stocks: Vec<StockType> = self.stocks.into_iter().map(Into::into).collect();
        let finishes: Vec<FinishRequirement> = self.finish.into_iter().map(Into::into).collect();
        validate(&stocks, &finishes)?;
        Ok((stocks, finishes))
    }
}

pub fn validate(stocks: &[StockType], finishes: &[FinishRequirement]) -> Result<()> {
    let mut seen = HashSet::new();
    for s in stocks {
        check_id("stock", &s.id, &mut seen)?;
        check_length("stock", &s.id, s.length)?;
        if !s.cost.is_finite() || s.cost < 0.0 {
            return Err(Error::InvalidCatalog(format!(
                "stock {} has invalid cost {}",
                s.id, s.cost
            )));
        }
    }

    let mut seen = HashSet::new();
    for f in finishes {
        check_id("finish", &f.id, &mut seen)?;
        check_length("finish", &f.id, f.length)?;
    }
    Ok(())
}

fn check_id<'a>(kind: &str, id: &'a str, seen: &mut HashSet<&'a str>) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidCatalog(format!("{kind} with empty identifier")));
    }
    if !seen.insert(id) {
        return Err(Error::InvalidCatalog(format!("duplicate {kind} {id}")));
    }
    Ok(())
}

fn check_length(kind: &str, id: &str, length: f64) -> Result<()> {
    if !length.is_finite() || length <= 0.0 {
        return Err(Error::InvalidCatalog(format!(
            "{kind} {id} has non-positive length {length}"
        )));
    }
    Ok(())
}
