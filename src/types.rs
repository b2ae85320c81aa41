use serde::{Deserialize, Serialize};

/// A raw length available for cutting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockType {
    pub id: String,
    pub length: f64,
    pub cost: f64,
}

impl StockType {
    pub fn new(id: impl Into<String>, length: f64, cost: f64) -> Self {
        Self {
            id: id.into(),
            length,
            cost,
        }
    }

    /// How many pieces of `length` one unit of this stock yields, or `None`
    /// when that number does not fit a `u32`.
    pub fn cuts_of(&self, length: f64) -> Option<u32> {
        let n = (self.length / length).floor();
        (n.is_finite() && n <= u32::MAX as f64).then_some(n as u32)
    }
}

impl std::fmt::Display for StockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} @ {})", self.id, self.length, self.cost)
    }
}

/// A required finished length and how many pieces of it are needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRequirement {
    pub id: String,
    pub length: f64,
    pub demand: u32,
}

impl FinishRequirement {
    pub fn new(id: impl Into<String>, length: f64, demand: u32) -> Self {
        Self {
            id: id.into(),
            length,
            demand,
        }
    }
}

impl std::fmt::Display for FinishRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} x{})", self.id, self.length, self.demand)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cut {
    pub finish: String,
    pub count: u32,
}

/// A way of cutting one unit of `stock`. `cuts` has one entry per finish,
/// in catalog order, including zero counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub stock: String,
    pub cuts: Vec<Cut>,
}

impl Pattern {
    pub fn count_of(&self, finish: &str) -> u32 {
        self.cuts
            .iter()
            .find(|c| c.finish == finish)
            .map_or(0, |c| c.count)
    }

    /// Finishes actually cut by this pattern.
    pub fn nonzero_cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter().filter(|c| c.count > 0)
    }

    pub fn used_length(&self, finishes: &[FinishRequirement]) -> f64 {
        finishes
            .iter()
            .map(|f| self.count_of(&f.id) as f64 * f.length)
            .sum()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.stock)?;
        for cut in self.nonzero_cuts() {
            write!(f, " {}x{}", cut.count, cut.finish)?;
        }
        Ok(())
    }
}

/// How many times each pattern is cut, indexed like the pattern list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub counts: Vec<u32>,
    pub cost: f64,
}

impl Selection {
    pub fn empty() -> Self {
        Self {
            counts: Vec::new(),
            cost: 0.0,
        }
    }

    /// Indices of patterns with a non-zero multiplicity.
    pub fn used(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.counts
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, n)| n > 0)
    }

    pub fn units(&self) -> u64 {
        self.counts.iter().map(|&n| n as u64).sum()
    }
}

/// Everything one run of the pipeline produced.
#[derive(Debug, Clone)]
pub struct Plan {
    pub stocks: Vec<StockType>,
    pub finishes: Vec<FinishRequirement>,
    pub patterns: Vec<Pattern>,
    pub selection: Selection,
}

impl Plan {
    pub fn stock(&self, id: &str) -> Option<&StockType> {
        self.stocks.iter().find(|s| s.id == id)
    }

    pub fn stock_length_used(&self) -> f64 {
        self.selection
            .used()
            .filter_map(|(p, n)| {
                self.stock(&self.patterns[p].stock)
                    .map(|s| s.length * n as f64)
            })
            .sum()
    }

    /// Finished length cut, surplus pieces included.
    pub fn finish_length_produced(&self) -> f64 {
        self.selection
            .used()
            .map(|(p, n)| self.patterns[p].used_length(&self.finishes) * n as f64)
            .sum()
    }

    pub fn produced_of(&self, finish: &str) -> u64 {
        self.selection
            .used()
            .map(|(p, n)| self.patterns[p].count_of(finish) as u64 * n as u64)
            .sum()
    }

    pub fn waste_percent(&self) -> f64 {
        let used = self.stock_length_used();
        if used == 0.0 {
            return 0.0;
        }
        (used - self.finish_length_produced()) / used * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_cut_plan() -> Plan {
        Plan {
            stocks: vec![StockType::new("S1", 100.0, 10.0)],
            finishes: vec![
                FinishRequirement::new("F1", 30.0, 3),
                FinishRequirement::new("F2", 45.0, 0),
            ],
            patterns: vec![Pattern {
                stock: "S1".into(),
                cuts: vec![
                    Cut { finish: "F1".into(), count: 3 },
                    Cut { finish: "F2".into(), count: 0 },
                ],
            }],
            selection: Selection {
                counts: vec![2],
                cost: 20.0,
            },
        }
    }

    #[test]
    fn test_cuts_of_floors() {
        let s = StockType::new("S", 100.0, 1.0);
        assert_eq!(s.cuts_of(30.0), Some(3));
        assert_eq!(s.cuts_of(100.0), Some(1));
        assert_eq!(s.cuts_of(101.0), Some(0));
    }

    #[test]
    fn test_cuts_of_overflow() {
        let s = StockType::new("S", 1e10, 1.0);
        assert_eq!(s.cuts_of(1.0), None);
        assert_eq!(s.cuts_of(10.0), Some(1_000_000_000));
    }

    #[test]
    fn test_pattern_display_skips_zero_cuts() {
        let plan = single_cut_plan();
        assert_eq!(plan.patterns[0].to_string(), "S1 -> 3xF1");
        assert_eq!(plan.patterns[0].count_of("F2"), 0);
        assert_eq!(plan.patterns[0].count_of("missing"), 0);
    }

    #[test]
    fn test_plan_waste() {
        let plan = single_cut_plan();
        assert_eq!(plan.stock_length_used(), 200.0);
        assert_eq!(plan.finish_length_produced(), 180.0);
        assert_eq!(plan.produced_of("F1"), 6);
        assert!((plan.waste_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_plan_has_no_waste() {
        let mut plan = single_cut_plan();
        plan.selection = Selection::empty();
        assert_eq!(plan.waste_percent(), 0.0);
        assert_eq!(plan.selection.units(), 0);
    }
}
