use std::time::Instant;

use tracing::{info, warn};

use crate::catalog;
use crate::error::{Error, Result};
use crate::model::CoveringModel;
use crate::patterns;
use crate::solver::{MipSolver, SolverOptions};
use crate::types::{FinishRequirement, Pattern, Plan, Selection, StockType};

/// Runs the whole pipeline: validate the catalogs and options, enumerate
/// patterns, solve the covering model.
pub fn optimize(
    stocks: Vec<StockType>,
    finishes: Vec<FinishRequirement>,
    solver: &dyn MipSolver,
    options: &SolverOptions,
) -> Result<Plan> {
    options.validate()?;
    catalog::validate(&stocks, &finishes)?;

    let patterns = timed("generate patterns", || patterns::generate(&stocks, &finishes))?;
    info!(
        stocks = stocks.len(),
        finishes = finishes.len(),
        patterns = patterns.len(),
        "generated patterns"
    );

    let selection = timed("solve", || {
        solve(&stocks, &finishes, &patterns, solver, options)
    })?;

    Ok(Plan {
        stocks,
        finishes,
        patterns,
        selection,
    })
}

/// Picks how many times to cut each pattern so that every demand is met at
/// minimum stock cost.
pub fn solve(
    stocks: &[StockType],
    finishes: &[FinishRequirement],
    patterns: &[Pattern],
    solver: &dyn MipSolver,
    options: &SolverOptions,
) -> Result<Selection> {
    options.validate()?;
    let model = CoveringModel::build(stocks, finishes, patterns)?;
    if model.demand.iter().all(|&d| d == 0) {
        return Ok(Selection {
            counts: vec![0; model.num_patterns()],
            cost: 0.0,
        });
    }

    info!(
        solver = solver.name(),
        variables = model.num_patterns(),
        constraints = model.num_finishes(),
        "solving covering model"
    );
    let raw = solver.solve(&model, options)?;

    if raw.values.len() != model.num_patterns() {
        return Err(Error::SolverFailure(format!(
            "expected {} values, solver returned {}",
            model.num_patterns(),
            raw.values.len()
        )));
    }
    let counts = to_counts(&raw.values, options.integrality_tolerance)?;

    if let Some((finish, produced)) = model.first_deficit(&counts) {
        return Err(Error::SolverFailure(format!(
            "selection yields only {produced} pieces of {finish}"
        )));
    }

    let cost = model.objective(&counts);
    if (cost - raw.objective).abs() > options.integrality_tolerance * cost.abs().max(1.0) {
        warn!(
            reported = raw.objective,
            recomputed = cost,
            "solver objective differs from the cost of the rounded selection"
        );
    }
    info!(cost, units = counts.iter().sum::<u32>(), "solved");

    Ok(Selection { counts, cost })
}

/// Rounds solver values to pattern multiplicities. A value further than
/// `tolerance` from a non-negative integer means the solver and model
/// disagree.
pub fn to_counts(values: &[f64], tolerance: f64) -> Result<Vec<u32>> {
    values
        .iter()
        .enumerate()
        .map(|(pattern, &value)| {
            let rounded = value.round();
            if !value.is_finite()
                || (value - rounded).abs() > tolerance
                || rounded < 0.0
                || rounded > u32::MAX as f64
            {
                return Err(Error::NonIntegralSolution { pattern, value });
            }
            Ok(rounded as u32)
        })
        .collect()
}

/// Runs `f` and logs how long it took.
pub fn timed<T>(step: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    info!(
        step,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "finished"
    );
    out
}
