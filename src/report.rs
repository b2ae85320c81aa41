use crate::types::{FinishRequirement, Pattern, Plan, StockType};

pub fn finish_table(finishes: &[FinishRequirement]) -> String {
    let mut out = String::from("| Label | Length | Quantity |\n| ----- | ------ | -------- |\n");
    for f in finishes {
        out.push_str(&format!("| {} | {} | {} |\n", f.id, f.length, f.demand));
    }
    out
}

pub fn stock_table(stocks: &[StockType]) -> String {
    let mut out = String::from("| Stock | Length | Price |\n| ----- | ------ | ----- |\n");
    for s in stocks {
        out.push_str(&format!("| {} | {} | {} |\n", s.id, s.length, s.cost));
    }
    out
}

/// One row per pattern with a `finish: count` cell for every finish.
pub fn pattern_table(patterns: &[Pattern]) -> String {
    if patterns.is_empty() {
        return "No patterns found.\n".to_string();
    }

    let mut out = String::from("| Stock | Cuts |\n| ----- | ---- |\n");
    for p in patterns {
        let cuts = p
            .cuts
            .iter()
            .map(|c| format!("{}: {}", c.finish, c.count))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(&format!("| {} | {} |\n", p.stock, cuts));
    }
    out
}

pub fn selection_table(plan: &Plan) -> String {
    let mut out = String::from("| # | Count | Pattern |\n| - | ----- | ------- |\n");
    for (p, n) in plan.selection.used() {
        out.push_str(&format!("| {} | {} | {} |\n", p, n, plan.patterns[p]));
    }
    out.push_str(&format!(
        "\nSummary: {} stock unit{} cut, cost {:.2}, {:.1}% waste\n",
        plan.selection.units(),
        if plan.selection.units() == 1 { "" } else { "s" },
        plan.selection.cost,
        plan.waste_percent(),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cut, Selection};

    #[test]
    fn test_pattern_table_lists_every_finish() {
        let patterns = vec![Pattern {
            stock: "S1".into(),
            cuts: vec![
                Cut { finish: "F1".into(), count: 3 },
                Cut { finish: "F2".into(), count: 0 },
            ],
        }];
        let table = pattern_table(&patterns);
        assert_eq!(table.lines().nth(2), Some("| S1 | F1: 3 | F2: 0 |"));
    }

    #[test]
    fn test_pattern_table_empty() {
        assert_eq!(pattern_table(&[]), "No patterns found.\n");
    }

    #[test]
    fn test_catalog_tables() {
        let stocks = stock_table(&[StockType::new("S1", 100.0, 10.5)]);
        assert!(stocks.contains("| S1 | 100 | 10.5 |"), "{stocks}");
        let finishes = finish_table(&[FinishRequirement::new("F1", 30.0, 3)]);
        assert!(finishes.contains("| F1 | 30 | 3 |"), "{finishes}");
    }

    #[test]
    fn test_selection_table() {
        let plan = Plan {
            stocks: vec![StockType::new("S1", 100.0, 10.0)],
            finishes: vec![FinishRequirement::new("F1", 30.0, 3)],
            patterns: vec![Pattern {
                stock: "S1".into(),
                cuts: vec![Cut { finish: "F1".into(), count: 3 }],
            }],
            selection: Selection {
                counts: vec![1],
                cost: 10.0,
            },
        };
        let table = selection_table(&plan);
        assert!(table.contains("| 0 | 1 | S1 -> 3xF1 |"), "{table}");
        assert!(table.contains("1 stock unit cut, cost 10.00, 10.0% waste"), "{table}");
    }
}
