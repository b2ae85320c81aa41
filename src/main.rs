use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use cut_optimizer::catalog::{CatalogFile, FinishRow, StockRow};
use cut_optimizer::solver::{Backend, SolverOptions};
use cut_optimizer::{render, report};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "cut_optimizer",
    about = "1D cutting stock optimizer: cheapest set of stock lengths covering all finished pieces"
)]
struct Cli {
    /// JSON file with `stocks` and `finish` tables
    #[arg(long, conflicts_with_all = ["stocks", "cuts"])]
    input: Option<PathBuf>,

    /// Stock lengths as LENGTH[:PRICE] (e.g. 6000:45); price defaults to the length
    #[arg(long = "stock", num_args = 1..)]
    stocks: Vec<String>,

    /// Finished pieces as LABEL=LENGTH:QTY (e.g. A=1200:4 B=850:10)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Solver backend: microlp or highs
    #[arg(long, default_value = "microlp", value_parser = parse_backend)]
    solver: Backend,

    /// Time limit in seconds (HiGHS only)
    #[arg(long)]
    time_limit: Option<f64>,

    /// Accepted distance between a solver value and an integer
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,

    /// Show a cutting diagram of the selected patterns
    #[arg(long)]
    layout: bool,

    /// Also show a diagram of every generated pattern
    #[arg(long)]
    all_patterns: bool,

    /// Log pipeline progress to stderr
    #[arg(long)]
    verbose: bool,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}

fn parse_length(s: &str, what: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("invalid {} '{}'", what, s))?;
    if v <= 0.0 {
        return Err(format!("{} must be positive in '{}'", what, s));
    }
    Ok(v)
}

fn parse_stock(s: &str) -> Result<StockRow, String> {
    let (length, price) = match s.split_once(':') {
        Some((l, p)) => (
            l,
            Some(
                p.parse::<f64>()
                    .map_err(|_| format!("invalid price in '{}'", s))?,
            ),
        ),
        None => (s, None),
    };
    Ok(StockRow {
        length: parse_length(length, "stock length")?,
        price,
        label: None,
    })
}

fn parse_cut(s: &str) -> Result<FinishRow, String> {
    let (label, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid cut '{}', expected LABEL=LENGTH:QTY", s))?;
    let (length, qty) = rest
        .split_once(':')
        .ok_or_else(|| format!("invalid cut '{}', expected LABEL=LENGTH:QTY", s))?;
    let quantity = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok(FinishRow {
        length: parse_length(length, "cut length")?,
        quantity,
        label: label.to_string(),
    })
}

fn load(cli: &Cli) -> Result<CatalogFile, String> {
    if let Some(path) = &cli.input {
        return CatalogFile::load(path).map_err(|e| format!("{}: {}", path.display(), e));
    }
    Ok(CatalogFile {
        stocks: cli
            .stocks
            .iter()
            .map(|s| parse_stock(s))
            .collect::<Result<Vec<_>, _>>()?,
        finish: cli
            .cuts
            .iter()
            .map(|c| parse_cut(c))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn main() {
    let cli = Cli::parse();
    let start = Instant::now();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let (stocks, finishes) = load(&cli)
        .and_then(|file| file.into_catalogs().map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    println!("Finish");
    println!("{}", report::finish_table(&finishes));
    println!("Stocks");
    println!("{}", report::stock_table(&stocks));

    let solver = cli.solver.solver().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let options = SolverOptions {
        integrality_tolerance: cli.tolerance,
        time_limit_secs: cli.time_limit,
    };

    let plan = cut_optimizer::optimize(stocks, finishes, solver.as_ref(), &options)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    println!("Patterns");
    println!("{}", report::pattern_table(&plan.patterns));
    if cli.all_patterns {
        print!(
            "{}",
            render::render_patterns(&plan.stocks, &plan.finishes, &plan.patterns)
        );
        println!();
    }

    println!("Selection");
    println!("{}", report::selection_table(&plan));
    if cli.layout {
        print!("{}", render::render_selection(&plan));
        println!();
    }

    println!(
        "Execution time: {:.6} seconds",
        start.elapsed().as_secs_f64()
    );
}
