//! Error type for the density-fitted CP-ALS engine

use cpdf_kernels::KernelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DfCpError {
    #[error("Invalid rank: {0}")]
    InvalidRank(usize),

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error("Invalid growth factor: {0}")]
    InvalidGrowthFactor(f64),

    #[error("Initial guess rank {guess} exceeds target rank {target}")]
    InitialGuessTooLarge { guess: usize, target: usize },

    #[error("Singular-vector initial guess requires a positive rank")]
    MissingInitialGuessRank,

    #[error("Symmetry map has {actual} entries, expected {expected}")]
    SymmetryLengthMismatch { expected: usize, actual: usize },

    #[error("Mode {mode} cannot alias mode {target}: aliases must point to an earlier mode")]
    InvalidSymmetry { mode: usize, target: usize },

    #[error("{required} convergence tests required, {supplied} supplied")]
    TooFewConvergenceTests { required: usize, supplied: usize },

    #[error("Invalid reference tensors: {0}")]
    InvalidReference(String),

    #[error("{0} requires the 'linalg' feature to be enabled")]
    MissingCapability(&'static str),

    #[error("SVD failed: {0}")]
    SvdFailed(String),

    #[error("Eigendecomposition failed: {0}")]
    EigenFailed(String),

    #[error("No decomposition has been computed yet")]
    NotComputed,

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("Tensor operation failed: {0}")]
    Tensor(String),
}

impl From<anyhow::Error> for DfCpError {
    fn from(err: anyhow::Error) -> Self {
        DfCpError::Tensor(format!("{:#}", err))
    }
}

pub type DfCpResult<T> = Result<T, DfCpError>;

impl DfCpError {
    /// True for the invalid-configuration kind, raised before any mutation
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DfCpError::InvalidRank(_)
                | DfCpError::InvalidStep(_)
                | DfCpError::InvalidGrowthFactor(_)
                | DfCpError::InitialGuessTooLarge { .. }
                | DfCpError::MissingInitialGuessRank
                | DfCpError::SymmetryLengthMismatch { .. }
                | DfCpError::InvalidSymmetry { .. }
                | DfCpError::TooFewConvergenceTests { .. }
                | DfCpError::InvalidReference(_)
        )
    }
}
