use std::str::FromStr;

use good_lp::solvers::SolutionStatus;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::model::CoveringModel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Largest accepted distance between a variable value and an integer.
    pub integrality_tolerance: f64,
    /// Wall-clock limit for backends that support one.
    pub time_limit_secs: Option<f64>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            integrality_tolerance: 1e-6,
            time_limit_secs: None,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<()> {
        let tol = self.integrality_tolerance;
        if !tol.is_finite() || tol < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "integrality tolerance must be a finite number >= 0, got {tol}"
            )));
        }
        if let Some(secs) = self.time_limit_secs
            && (!secs.is_finite() || secs <= 0.0)
        {
            return Err(Error::InvalidOptions(format!(
                "time limit must be a finite number of seconds > 0, got {secs}"
            )));
        }
        Ok(())
    }
}

/// Raw values reported by a backend, one per pattern, plus the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct MipSolution {
    pub values: Vec<f64>,
    pub objective: f64,
}

pub trait MipSolver {
    fn name(&self) -> &'static str;

    /// Solves `model` to optimality. Infeasible and unbounded models map to
    /// their own error variants; anything else is [`Error::SolverFailure`].
    fn solve(&self, model: &CoveringModel, options: &SolverOptions) -> Result<MipSolution>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    MicroLp,
    Highs,
}

impl Backend {
    pub fn solver(self) -> Result<Box<dyn MipSolver + Send + Sync>> {
        match self {
            Backend::MicroLp => Ok(Box::new(MicroLpSolver)),
            #[cfg(feature = "highs")]
            Backend::Highs => Ok(Box::new(HighsSolver)),
            #[cfg(not(feature = "highs"))]
            Backend::Highs => Err(Error::SolverFailure(
                "HiGHS backend is not available (build with the `highs` feature)".to_string(),
            )),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "microlp" => Ok(Backend::MicroLp),
            "highs" => Ok(Backend::Highs),
            _ => Err(format!(
                "invalid solver '{}', expected: microlp or highs",
                s
            )),
        }
    }
}

/// Pure Rust branch-and-bound over `microlp`'s simplex. Always compiled in;
/// HiGHS needs the `highs` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MipSolver for MicroLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, model: &CoveringModel, options: &SolverOptions) -> Result<MipSolution> {
        if options.time_limit_secs.is_some() {
            warn!("microlp does not support a time limit, ignoring it");
        }
        let formulation = Formulation::new(model);
        let mut problem = formulation
            .vars
            .minimise(formulation.objective.clone())
            .using(good_lp::solvers::microlp::microlp);
        for c in formulation.constraints {
            problem = problem.with(c);
        }
        extract(problem.solve(), &formulation.x, &formulation.objective)
    }
}

#[cfg(feature = "highs")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsSolver;

#[cfg(feature = "highs")]
impl MipSolver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &CoveringModel, options: &SolverOptions) -> Result<MipSolution> {
        let formulation = Formulation::new(model);
        let mut problem = formulation
            .vars
            .minimise(formulation.objective.clone())
            .using(good_lp::solvers::highs::highs);
        if let Some(secs) = options.time_limit_secs {
            problem = problem.set_time_limit(secs);
        }
        for c in formulation.constraints {
            problem = problem.with(c);
        }
        extract(problem.solve(), &formulation.x, &formulation.objective)
    }
}

/// The covering model expressed in `good_lp` terms, ready for any backend.
struct Formulation {
    vars: ProblemVariables,
    x: Vec<Variable>,
    objective: Expression,
    constraints: Vec<good_lp::Constraint>,
}

impl Formulation {
    fn new(model: &CoveringModel) -> Self {
        let mut vars = ProblemVariables::new();
        let x: Vec<Variable> = (0..model.num_patterns())
            .map(|p| vars.add(variable().integer().min(0.0).name(format!("x_{p}"))))
            .collect();

        let objective = model
            .cost
            .iter()
            .zip(&x)
            .map(|(&c, &v)| c * v)
            .fold(Expression::from(0.0), |acc, term| acc + term);

        // Rows with zero demand hold for any x >= 0.
        let constraints = model
            .coefficients
            .iter()
            .zip(&model.demand)
            .filter(|&(_, &demand)| demand > 0)
            .map(|(row, &demand)| {
                let lhs = row
                    .iter()
                    .zip(&x)
                    .filter(|&(&a, _)| a > 0)
                    .map(|(&a, &v)| a as f64 * v)
                    .fold(Expression::from(0.0), |acc, term| acc + term);
                let rhs = demand as f64;
                constraint!(lhs >= rhs)
            })
            .collect();

        debug!(
            variables = x.len(),
            constraints = model.num_finishes(),
            "formulated covering model"
        );
        Self {
            vars,
            x,
            objective,
            constraints,
        }
    }
}

fn extract<S: Solution>(
    result: std::result::Result<S, ResolutionError>,
    x: &[Variable],
    objective: &Expression,
) -> Result<MipSolution> {
    match result {
        // An early stop still carries an incumbent; it is not trusted.
        Ok(solution) => match solution.status() {
            SolutionStatus::Optimal => Ok(MipSolution {
                values: x.iter().map(|&v| solution.value(v)).collect(),
                objective: objective.eval_with(&solution),
            }),
            status => {
                error!("MILP solver stopped before proving optimality: {:?}", status);
                Err(Error::SolverFailure(format!(
                    "solver stopped before proving optimality ({status:?})"
                )))
            }
        },
        Err(ResolutionError::Infeasible) => Err(Error::InfeasibleModel),
        Err(ResolutionError::Unbounded) => Err(Error::UnboundedModel),
        Err(e) => {
            error!("MILP solver error: {:?}", e);
            Err(Error::SolverFailure(e.to_string()))
        }
    }
}
