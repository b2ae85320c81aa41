use crate::types::{FinishRequirement, Pattern, Plan, StockType};

const MAX_WIDTH: f64 = 80.0;

/// One bar per pattern, each labelled with its stock.
pub fn render_patterns(
    stocks: &[StockType],
    finishes: &[FinishRequirement],
    patterns: &[Pattern],
) -> String {
    let bars: Vec<(String, &Pattern)> = patterns.iter().map(|p| (p.stock.clone(), p)).collect();
    render_bars(stocks, finishes, &bars)
}

/// Only the patterns the plan actually cuts, labelled `N x stock`, under a
/// cost title.
pub fn render_selection(plan: &Plan) -> String {
    let bars: Vec<(String, &Pattern)> = plan
        .selection
        .used()
        .map(|(p, n)| {
            let pattern = &plan.patterns[p];
            (format!("{} x {}", n, pattern.stock), pattern)
        })
        .collect();

    let mut result = format!("Cost = {}\n", (plan.selection.cost * 100.0).round() / 100.0);
    result.push_str(&render_bars(&plan.stocks, &plan.finishes, &bars));
    result
}

fn render_bars(
    stocks: &[StockType],
    finishes: &[FinishRequirement],
    bars: &[(String, &Pattern)],
) -> String {
    let rows: Vec<(&str, &StockType, &Pattern)> = bars
        .iter()
        .filter_map(|(label, p)| {
            stocks
                .iter()
                .find(|s| s.id == p.stock)
                .map(|s| (label.as_str(), s, *p))
        })
        .collect();

    let longest = rows.iter().map(|(_, s, _)| s.length).fold(0.0, f64::max);
    if longest <= 0.0 {
        return String::new();
    }
    let scale = MAX_WIDTH / longest;
    let label_w = rows.iter().map(|(l, _, _)| l.chars().count()).max().unwrap_or(0);

    let mut result = String::new();
    for (label, stock, pattern) in rows {
        let grid = render_bar(stock, finishes, pattern, scale);
        for (i, row) in grid.iter().enumerate() {
            let prefix = if i == 1 { label } else { "" };
            let line: String = row.iter().collect();
            result.push_str(&format!("{prefix:>label_w$} {}", line.trim_end()));
            result.push('\n');
        }
    }
    result
}

/// Three text rows: stock outline, segment labels, stock outline.
fn render_bar(
    stock: &StockType,
    finishes: &[FinishRequirement],
    pattern: &Pattern,
    scale: f64,
) -> Vec<Vec<char>> {
    let grid_w = (stock.length * scale).round() as usize;
    let mut grid = vec![vec![' '; grid_w + 1]; 3];
    draw_rect(&mut grid, 0, 0, grid_w, 2);

    let mut xa = 0.0;
    for finish in finishes {
        for _ in 0..pattern.count_of(&finish.id) {
            let xb = xa + finish.length;
            let sx = (xa * scale).round() as usize;
            let sw = ((xb * scale).round() as usize).saturating_sub(sx);
            xa = xb;

            if sw == 0 {
                continue;
            }
            draw_rect(&mut grid, sx, 0, sw, 2);

            let label_chars: Vec<char> = finish.id.chars().collect();
            if sw > 2 {
                let cx = sx + sw / 2;
                let start_x = cx.saturating_sub(label_chars.len() / 2);
                for (i, &ch) in label_chars.iter().enumerate() {
                    let x = start_x + i;
                    if x > sx && x < sx + sw {
                        grid[1][x] = ch;
                    }
                }
            }
        }
    }

    // Offcut
    let used = (xa * scale).round() as usize;
    for x in used + 1..grid_w {
        if grid[1][x] == ' ' {
            grid[1][x] = '.';
        }
    }
    grid
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            for j in [y, y + h] {
                if j < rows {
                    grid[j][i] = if grid[j][i] == '|' || grid[j][i] == '+' {
                        '+'
                    } else {
                        '-'
                    };
                }
            }
        }
    }

    // Vertical edges
    for j in y..=y + h {
        if j < rows {
            for i in [x, x + w] {
                if i < cols {
                    grid[j][i] = if grid[j][i] == '-' || grid[j][i] == '+' {
                        '+'
                    } else {
                        '|'
                    };
                }
            }
        }
    }

    // Corners
    for &cx in &[x, x + w] {
        for &cy in &[y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cut, Selection};

    fn plan() -> Plan {
        let finishes = vec![
            FinishRequirement::new("F1", 50.0, 2),
            FinishRequirement::new("F2", 30.0, 1),
        ];
        let pattern = |stock: &str, f1, f2| Pattern {
            stock: stock.into(),
            cuts: vec![
                Cut { finish: "F1".into(), count: f1 },
                Cut { finish: "F2".into(), count: f2 },
            ],
        };
        Plan {
            stocks: vec![
                StockType::new("S1", 50.0, 6.0),
                StockType::new("S2", 100.0, 11.0),
            ],
            finishes,
            patterns: vec![
                pattern("S1", 1, 0),
                pattern("S2", 2, 0),
                pattern("S1", 0, 1),
                pattern("S2", 0, 3),
            ],
            selection: Selection {
                counts: vec![0, 1, 1, 0],
                cost: 17.0,
            },
        }
    }

    #[test]
    fn test_render_all_patterns() {
        let plan = plan();
        let output = render_patterns(&plan.stocks, &plan.finishes, &plan.patterns);
        assert_eq!(output.lines().count(), 12);
        assert!(output.contains("F1"));
        assert!(output.contains("F2"));
        assert!(output.contains('+'));
        assert!(output.contains('|'));
    }

    #[test]
    fn test_full_bar_has_no_offcut() {
        let plan = plan();
        let output = render_patterns(&plan.stocks, &plan.finishes, &plan.patterns[1..2]);
        let middle = output.lines().nth(1).unwrap();
        assert!(middle.starts_with("S2 |"), "{middle}");
        assert_eq!(middle.matches("F1").count(), 2);
        assert!(!middle.contains('.'));
    }

    #[test]
    fn test_offcut_is_shaded() {
        let plan = plan();
        let output = render_patterns(&plan.stocks, &plan.finishes, &plan.patterns[3..4]);
        let middle = output.lines().nth(1).unwrap();
        assert_eq!(middle.matches("F2").count(), 3);
        assert!(middle.contains('.'), "{middle}");
    }

    #[test]
    fn test_render_selection_skips_unused() {
        let output = render_selection(&plan());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Cost = 17");
        assert_eq!(lines.len(), 7);
        assert!(output.contains("1 x S2"));
        assert!(output.contains("1 x S1"));
    }

    #[test]
    fn test_render_empty() {
        let plan = plan();
        assert_eq!(render_patterns(&plan.stocks, &plan.finishes, &[]), "");
    }
}
