use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Cut, FinishRequirement, Pattern, StockType};

/// Enumerates one single-finish pattern per (finish, stock) pair in which at
/// least one piece fits. Patterns never mix finishes, so the list grows with
/// `finishes.len() * stocks.len()` at the price of some waste.
///
/// Output order is finish-major, then stock, following catalog order. Fails
/// with [`Error::NoFeasiblePattern`] on the first finish no stock can yield,
/// and with [`Error::InvalidCatalog`] when a piece count overflows `u32`.
pub fn generate(stocks: &[StockType], finishes: &[FinishRequirement]) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();

    for (fi, finish) in finishes.iter().enumerate() {
        let mut feasible = false;

        for stock in stocks {
            let num_cuts = stock.cuts_of(finish.length).ok_or_else(|| {
                Error::InvalidCatalog(format!(
                    "stock {} yields too many pieces of {} to count",
                    stock.id, finish.id
                ))
            })?;
            if num_cuts == 0 {
                continue;
            }
            feasible = true;

            let cuts = finishes
                .iter()
                .enumerate()
                .map(|(k, f)| Cut {
                    finish: f.id.clone(),
                    count: if k == fi { num_cuts } else { 0 },
                })
                .collect();
            debug!(stock = %stock.id, finish = %finish.id, num_cuts, "pattern");
            patterns.push(Pattern {
                stock: stock.id.clone(),
                cuts,
            });
        }

        if !feasible {
            return Err(Error::NoFeasiblePattern {
                finish: finish.id.clone(),
            });
        }
    }

    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pattern fits its stock and cuts exactly one finish.
    fn assert_patterns_valid(
        stocks: &[StockType],
        finishes: &[FinishRequirement],
        patterns: &[Pattern],
    ) {
        for (pi, p) in patterns.iter().enumerate() {
            let stock = stocks
                .iter()
                .find(|s| s.id == p.stock)
                .unwrap_or_else(|| panic!("pattern {pi} references unknown stock {}", p.stock));
            assert_eq!(p.cuts.len(), finishes.len(), "pattern {pi} misses finishes");
            assert_eq!(p.nonzero_cuts().count(), 1, "pattern {pi} mixes finishes");
            assert!(
                p.used_length(finishes) <= stock.length,
                "pattern {pi} ({p}) exceeds stock length {}",
                stock.length
            );
        }
    }

    #[test]
    fn test_single_pattern() {
        let stocks = vec![StockType::new("S1", 100.0, 10.0)];
        let finishes = vec![FinishRequirement::new("F1", 30.0, 3)];
        let patterns = generate(&stocks, &finishes).unwrap();
        assert_eq!(
            patterns,
            vec![Pattern {
                stock: "S1".into(),
                cuts: vec![Cut { finish: "F1".into(), count: 3 }],
            }]
        );
    }

    #[test]
    fn test_finish_longer_than_every_stock() {
        let stocks = vec![StockType::new("S1", 10.0, 10.0)];
        let finishes = vec![FinishRequirement::new("F1", 20.0, 1)];
        match generate(&stocks, &finishes) {
            Err(Error::NoFeasiblePattern { finish }) => assert_eq!(finish, "F1"),
            other => panic!("expected NoFeasiblePattern, got {other:?}"),
        }
    }

    #[test]
    fn test_unmet_finish_named_even_after_feasible_ones() {
        let stocks = vec![StockType::new("S1", 50.0, 5.0)];
        let finishes = vec![
            FinishRequirement::new("short", 10.0, 1),
            FinishRequirement::new("long", 60.0, 1),
            FinishRequirement::new("longer", 70.0, 1),
        ];
        let err = generate(&stocks, &finishes).unwrap_err();
        assert_eq!(err.to_string(), "no feasible pattern was found for long");
    }

    #[test]
    fn test_order_is_finish_major() {
        let stocks = vec![
            StockType::new("S1", 50.0, 6.0),
            StockType::new("S2", 100.0, 11.0),
        ];
        let finishes = vec![
            FinishRequirement::new("F1", 50.0, 2),
            FinishRequirement::new("F2", 40.0, 1),
            FinishRequirement::new("F3", 60.0, 1),
        ];
        let patterns = generate(&stocks, &finishes).unwrap();
        assert_patterns_valid(&stocks, &finishes, &patterns);

        let summary: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            summary,
            vec![
                "S1 -> 1xF1",
                "S2 -> 2xF1",
                "S1 -> 1xF2",
                "S2 -> 2xF2",
                "S2 -> 1xF3",
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let stocks = vec![
            StockType::new("a", 240.0, 20.0),
            StockType::new("b", 120.0, 11.0),
            StockType::new("c", 360.0, 29.0),
        ];
        let finishes = vec![
            FinishRequirement::new("x", 35.0, 4),
            FinishRequirement::new("y", 80.0, 7),
            FinishRequirement::new("z", 115.0, 2),
        ];
        let first = generate(&stocks, &finishes).unwrap();
        let second = generate(&stocks, &finishes).unwrap();
        assert_eq!(first, second);
        assert_patterns_valid(&stocks, &finishes, &first);
    }

    #[test]
    fn test_piece_count_overflow_rejected() {
        let stocks = vec![StockType::new("S1", 1e10, 1.0)];
        let finishes = vec![FinishRequirement::new("F1", 1.0, 1)];
        let err = generate(&stocks, &finishes).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)), "{err}");
        assert!(err.to_string().contains("S1"), "{err}");
    }

    #[test]
    fn test_no_finishes() {
        let stocks = vec![StockType::new("S1", 100.0, 1.0)];
        assert!(generate(&stocks, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_no_stocks() {
        let finishes = vec![FinishRequirement::new("F1", 1.0, 1)];
        assert!(matches!(
            generate(&[], &finishes),
            Err(Error::NoFeasiblePattern { .. })
        ));
    }
}
