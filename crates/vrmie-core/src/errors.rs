use num_dual::linalg::LinAlgError;
use std::io;
use thiserror::Error;

/// Errors of the solvers and of the parameter handling.
#[derive(Error, Debug)]
pub enum EosError {
    #[error("{0}")]
    Error(String),

    // solvers
    #[error("`{0}` did not converge within the maximum number of iterations.")]
    NotConverged(String),
    #[error("`{0}` encountered illegal values during the iteration.")]
    IterationFailed(String),
    #[error("Iteration resulted in trivial solution.")]
    TrivialSolution,
    #[error("Invalid state in {0}: {1} = {2}.")]
    InvalidState(String, String, f64),
    #[error("Undetermined state: {0}.")]
    UndeterminedState(String),
    #[error("Pressure is above the critical pressure.")]
    SuperCritical,
    #[error(transparent)]
    LinAlgError(#[from] LinAlgError),

    // parameters
    #[error(transparent)]
    FileIO(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("No parameters found for substance(s): {0}")]
    SubstanceNotFound(String),
    #[error("Substance {0} is requested more than once.")]
    DuplicateSubstance(String),
    #[error("Unknown model parameter `{0}`.")]
    UnknownParameter(String),
}

pub type EosResult<T> = Result<T, EosError>;
