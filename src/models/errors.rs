//! Errors for model providers (formula parsing, design construction,
//! estimation failures, and optimizer failures of iterative providers).
//!
//! ## Conventions
//! - **Row and column indices are 0-based.**
//! - Optimizer errors raised by iterative providers are carried verbatim in
//!   [`ModelError::Optimization`].
use crate::optimization::errors::OptError;

/// Result alias for model-provider operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Formula ----
    /// Formula text is not of the form `endog ~ terms`.
    InvalidFormula { formula: String, reason: &'static str },

    /// A term on either side of the formula is not a column of the table.
    UnknownColumn { name: String },

    // ---- Design ----
    /// Parameter vector does not match the design width.
    ParamLengthMismatch { expected: usize, actual: usize },

    /// Exogenous matrix does not have the fitted number of columns.
    ExogWidthMismatch { expected: usize, actual: usize },

    /// Fewer usable rows than coefficients (no residual degrees of freedom).
    InsufficientObservations { nobs: usize, nparams: usize },

    /// `XᵀX` (or the information matrix) is not positive definite.
    SingularDesign,

    /// Design or response carries a NaN/±inf.
    NonFiniteInput { row: usize },

    /// Covariance has a clearly negative eigenvalue or a non-finite entry.
    InvalidCovariance { min_eigenvalue: f64 },

    // ---- Estimation ----
    /// Binary provider received a response outside {0, 1}.
    NonBinaryResponse { row: usize, value: f64 },

    /// Starting values do not match the design width.
    InvalidStartParams { expected: usize, actual: usize },

    /// Iterative fit stopped without meeting a convergence criterion.
    NotConverged { iterations: usize, status: String },

    /// Failure inside the likelihood optimizer.
    Optimization(OptError),

    // ---- Simulation ----
    /// Residual scale passed to a predictive draw must be finite and ≥ 0.
    InvalidScale { scale: f64 },

    /// Pooled covariance/params handed to `set_pooled` have the wrong shape.
    PooledShapeMismatch { expected: usize, actual: usize },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Formula ----
            ModelError::InvalidFormula { formula, reason } => {
                write!(f, "Invalid formula '{formula}': {reason}")
            }
            ModelError::UnknownColumn { name } => {
                write!(f, "Formula references unknown column '{name}'")
            }

            // ---- Design ----
            ModelError::ParamLengthMismatch { expected, actual } => {
                write!(f, "Parameter length mismatch: expected {expected}, actual {actual}")
            }
            ModelError::ExogWidthMismatch { expected, actual } => {
                write!(f, "Exogenous width mismatch: expected {expected} columns, actual {actual}")
            }
            ModelError::InsufficientObservations { nobs, nparams } => {
                write!(f, "Insufficient observations: {nobs} rows for {nparams} parameters")
            }
            ModelError::SingularDesign => {
                write!(f, "Design matrix is singular (XᵀX not positive definite)")
            }
            ModelError::NonFiniteInput { row } => {
                write!(f, "Non-finite value in model input at row {row}")
            }
            ModelError::InvalidCovariance { min_eigenvalue } => {
                write!(
                    f,
                    "Covariance is not positive semi-definite (smallest eigenvalue {min_eigenvalue})"
                )
            }

            // ---- Estimation ----
            ModelError::NonBinaryResponse { row, value } => {
                write!(f, "Response must be 0 or 1; found {value} at row {row}")
            }
            ModelError::InvalidStartParams { expected, actual } => {
                write!(f, "Start params length mismatch: expected {expected}, actual {actual}")
            }
            ModelError::NotConverged { iterations, status } => {
                write!(f, "Model fit did not converge after {iterations} iterations ({status})")
            }
            ModelError::Optimization(err) => {
                write!(f, "Optimization failed: {err}")
            }

            // ---- Simulation ----
            ModelError::InvalidScale { scale } => {
                write!(f, "Invalid residual scale {scale}: must be finite and non-negative")
            }
            ModelError::PooledShapeMismatch { expected, actual } => {
                write!(f, "Pooled estimate shape mismatch: expected {expected}, actual {actual}")
            }
        }
    }
}

impl From<OptError> for ModelError {
    fn from(err: OptError) -> Self {
        ModelError::Optimization(err)
    }
}
