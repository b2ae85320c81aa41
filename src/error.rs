use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid solver options: {0}")]
    InvalidOptions(String),

    /// The finish is longer than every stock length.
    #[error("no feasible pattern was found for {finish}")]
    NoFeasiblePattern { finish: String },

    #[error("solver reports the covering model is infeasible")]
    InfeasibleModel,

    #[error("solver reports the covering model is unbounded")]
    UnboundedModel,

    #[error("solver failure: {0}")]
    SolverFailure(String),

    #[error("solver returned non-integral value {value} for pattern {pattern}")]
    NonIntegralSolution { pattern: usize, value: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed catalog file: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors caused by the input rather than by the solver.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidCatalog(_)
                | Error::InvalidOptions(_)
                | Error::NoFeasiblePattern { .. }
                | Error::Json(_)
        )
    }
}
