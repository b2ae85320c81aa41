use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{FinishRequirement, Pattern, StockType};

/// Minimize `sum_p cost[p] * x[p]` subject to
/// `sum_p coefficients[f][p] * x[p] >= demand[f]` for every finish `f`, with
/// each `x[p]` a non-negative integer. Patterns and finishes are indexed by
/// their position in the pattern list and the finish catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveringModel {
    /// Finish ids, in constraint order.
    pub finishes: Vec<String>,
    /// Unit cost of the stock each pattern cuts.
    pub cost: Vec<f64>,
    /// `coefficients[f][p]`: pieces of finish `f` one use of pattern `p` yields.
    pub coefficients: Vec<Vec<u32>>,
    pub demand: Vec<u32>,
}

impl CoveringModel {
    pub fn build(
        stocks: &[StockType],
        finishes: &[FinishRequirement],
        patterns: &[Pattern],
    ) -> Result<Self> {
        let by_id: HashMap<&str, &StockType> = stocks.iter().map(|s| (s.id.as_str(), s)).collect();

        let cost = patterns
            .iter()
            .enumerate()
            .map(|(p, pattern)| {
                by_id.get(pattern.stock.as_str()).map(|s| s.cost).ok_or_else(|| {
                    Error::InvalidCatalog(format!(
                        "pattern {p} references unknown stock {}",
                        pattern.stock
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let coefficients: Vec<Vec<u32>> = finishes
            .iter()
            .map(|f| patterns.iter().map(|p| p.count_of(&f.id)).collect())
            .collect();

        for (f, row) in finishes.iter().zip(&coefficients) {
            if f.demand > 0 && row.iter().all(|&a| a == 0) {
                return Err(Error::NoFeasiblePattern {
                    finish: f.id.clone(),
                });
            }
        }

        Ok(Self {
            finishes: finishes.iter().map(|f| f.id.clone()).collect(),
            cost,
            coefficients,
            demand: finishes.iter().map(|f| f.demand).collect(),
        })
    }

    pub fn num_patterns(&self) -> usize {
        self.cost.len()
    }

    pub fn num_finishes(&self) -> usize {
        self.finishes.len()
    }

    pub fn objective(&self, counts: &[u32]) -> f64 {
        self.cost
            .iter()
            .zip(counts)
            .map(|(&c, &n)| c * n as f64)
            .sum()
    }

    /// First finish whose demand `counts` leaves uncovered, with the amount
    /// produced.
    pub fn first_deficit(&self, counts: &[u32]) -> Option<(&str, u64)> {
        self.coefficients
            .iter()
            .zip(&self.demand)
            .zip(&self.finishes)
            .find_map(|((row, &demand), id)| {
                let produced: u64 = row
                    .iter()
                    .zip(counts)
                    .map(|(&a, &n)| a as u64 * n as u64)
                    .sum();
                (produced < demand as u64).then_some((id.as_str(), produced))
            })
    }
}
