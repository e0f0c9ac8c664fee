//! optimization::errors — failures of the L-BFGS likelihood maximizer.
//!
//! Conventions
//! -----------
//! - Every fallible routine under `optimization` returns [`OptResult<T>`].
//! - Options are checked before a solver is built; θ and gradient checks
//!   run on every evaluation; the solver outcome is checked last.
//! - Errors raised inside an Argmin run come back as `argmin::core::Error`.
//!   The `From` conversion first recovers a wrapped [`OptError`], then folds
//!   native Argmin failures into [`OptError::Backend`] labelled by their kind.
use argmin::core::{ArgminError, Error};

pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// No analytic gradient; the caller falls back to finite differences.
    GradientNotImplemented,

    GradientDimMismatch { expected: usize, found: usize },

    /// Non-finite gradient entry.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- MLEOptions ----
    InvalidTolGrad { tol: f64, reason: &'static str },
    InvalidTolCost { tol: f64, reason: &'static str },
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// Neither a gradient nor a cost tolerance was set.
    NoTolerancesProvided,

    InvalidLineSearch { name: String, reason: &'static str },
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective ----
    /// The log-likelihood evaluated to NaN or ±inf.
    NonFiniteCost { value: f64 },

    /// θ has a different length than the model's design.
    ThetaLengthMismatch { expected: usize, actual: usize },

    InvalidThetaInput { index: usize, value: f64 },

    // ---- Outcome ----
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// The solver finished without a best parameter vector.
    MissingThetaHat,

    // ---- Argmin ----
    /// Failure inside the Argmin backend that is not one of ours.
    Backend { kind: &'static str, text: String },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "No analytic gradient available")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has {found} entries, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Gradient tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Cost tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Iteration limit {max_iter} rejected: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one stopping tolerance is required")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "L-BFGS memory {mem} rejected: {reason}")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Log-likelihood evaluated to {value}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector has {actual} entries, expected {expected}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Parameter {index} is {value}; all parameters must be finite")
            }

            // ---- Outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Estimated parameter {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Solver returned no parameter estimate")
            }

            // ---- Argmin ----
            OptError::Backend { kind, text } => {
                write!(f, "Argmin {kind}: {text}")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(ours) => return ours,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(native) => {
                let kind = match &native {
                    ArgminError::InvalidParameter { .. } => "invalid parameter",
                    ArgminError::NotImplemented { .. } => "not implemented",
                    ArgminError::NotInitialized { .. } => "not initialized",
                    ArgminError::ConditionViolated { .. } => "condition violated",
                    ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
                    ArgminError::PotentialBug { .. } => "potential bug",
                    ArgminError::ImpossibleError { .. } => "impossible error",
                    _ => "error",
                };
                OptError::Backend { kind, text: native.to_string() }
            }
            Err(other) => OptError::Backend { kind: "backend", text: other.to_string() },
        }
    }
}
