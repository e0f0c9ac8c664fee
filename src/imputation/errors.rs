//! Errors for the imputation engine (dataset construction, imputer and
//! scheduler configuration, conditional-model failures, and write checks).
//!
//! ## Conventions
//! - Every error that originates with one variable names it.
//! - [`MiceError::Repetition`] wraps a failure inside a pooling run with the
//!   0-based index of the retained repetition it interrupted.
//! - [`MiceError::kind`] maps every variant onto one of five categories so
//!   callers can branch on the category without listing variants.
use crate::models::errors::ModelError;

/// Result alias for imputation and pooling operations.
pub type MiceResult<T> = Result<T, MiceError>;

/// Error category of a [`MiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A variable has no observed values.
    EmptyObservedSet,
    /// A conditional or analysis model failed to fit or simulate.
    ModelFit,
    /// Invalid options, rejected before any simulation starts.
    Configuration,
    /// A write whose length disagrees with the missing-row count.
    ShapeMismatch,
    /// Malformed input table.
    Data,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MiceError {
    // ---- Dataset ----
    /// Variable has zero observed values and cannot be imputed.
    EmptyObservedSet { variable: String },

    /// Input table has no rows or no columns.
    EmptyTable,

    /// Number of names does not match the number of columns.
    ColumnCountMismatch { names: usize, columns: usize },

    /// Two columns share a name.
    DuplicateColumn { name: String },

    /// Non-finite cell: ±inf in the input table (missing values must be NaN),
    /// or a non-finite value written into the working table.
    NonFiniteValue { variable: String, row: usize, value: f64 },

    /// Name does not refer to a column of the dataset.
    UnknownVariable { name: String },

    // ---- Writes ----
    /// `write` received a slice of the wrong length.
    ShapeMismatch { variable: String, expected: usize, actual: usize },

    /// Repetition `index` produced an estimate of a different size than the first.
    RaggedEstimates { index: usize, expected: usize, actual: usize },

    // ---- Model fitting ----
    /// Conditional model of `variable` failed.
    ModelFit { variable: String, source: ModelError },

    /// Analysis model failed.
    AnalysisFit { source: ModelError },

    // ---- Configuration ----
    /// PMM neighbor count outside `1 ≤ k < donors`.
    InvalidPmmNeighbors { variable: String, k: usize, donors: usize },

    /// Scale mode that has no implementation was selected.
    UnimplementedScaleMode { mode: &'static str },

    /// A fixed scale value must be finite and strictly positive.
    InvalidScaleValue { value: f64 },

    /// Pooling needs at least two repetitions.
    InsufficientIterations { iterations: usize },

    /// Scheduler `skip` must be at least one.
    InvalidSkip { skip: usize },

    /// A cycle needs at least one imputer.
    NoImputers,

    /// Two imputers target the same variable.
    DuplicateImputer { variable: String },

    /// Imputer was built for a different dataset instance.
    ForeignImputer { variable: String },

    /// Conditional or analysis formula is unusable.
    InvalidFormula { source: ModelError },

    // ---- Context ----
    /// Failure during the `index`-th retained repetition of a pooling run.
    Repetition { index: usize, source: Box<MiceError> },
}

impl MiceError {
    /// Category of this error, looking through [`MiceError::Repetition`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            MiceError::EmptyObservedSet { .. } => ErrorKind::EmptyObservedSet,
            MiceError::ModelFit { .. } | MiceError::AnalysisFit { .. } => ErrorKind::ModelFit,
            MiceError::ShapeMismatch { .. } | MiceError::RaggedEstimates { .. } => {
                ErrorKind::ShapeMismatch
            }
            MiceError::EmptyTable
            | MiceError::ColumnCountMismatch { .. }
            | MiceError::DuplicateColumn { .. }
            | MiceError::NonFiniteValue { .. }
            | MiceError::UnknownVariable { .. } => ErrorKind::Data,
            MiceError::InvalidPmmNeighbors { .. }
            | MiceError::UnimplementedScaleMode { .. }
            | MiceError::InvalidScaleValue { .. }
            | MiceError::InsufficientIterations { .. }
            | MiceError::InvalidSkip { .. }
            | MiceError::NoImputers
            | MiceError::DuplicateImputer { .. }
            | MiceError::ForeignImputer { .. }
            | MiceError::InvalidFormula { .. } => ErrorKind::Configuration,
            MiceError::Repetition { source, .. } => source.kind(),
        }
    }

    /// Wrap with the repetition index; an existing wrapper is kept as is.
    pub fn in_repetition(self, index: usize) -> Self {
        match self {
            MiceError::Repetition { .. } => self,
            other => MiceError::Repetition { index, source: Box::new(other) },
        }
    }
}

impl std::error::Error for MiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MiceError::ModelFit { source, .. }
            | MiceError::AnalysisFit { source }
            | MiceError::InvalidFormula { source } => Some(source),
            MiceError::Repetition { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for MiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Dataset ----
            MiceError::EmptyObservedSet { variable } => {
                write!(f, "Variable '{variable}' has no observed values")
            }
            MiceError::EmptyTable => {
                write!(f, "Input table must have at least one row and one column")
            }
            MiceError::ColumnCountMismatch { names, columns } => {
                write!(f, "Got {names} column names for {columns} columns")
            }
            MiceError::DuplicateColumn { name } => {
                write!(f, "Duplicate column name '{name}'")
            }
            MiceError::NonFiniteValue { variable, row, value } => {
                write!(f, "Non-finite value {value} in '{variable}' at row {row}")
            }
            MiceError::UnknownVariable { name } => {
                write!(f, "Unknown variable '{name}'")
            }

            // ---- Writes ----
            MiceError::ShapeMismatch { variable, expected, actual } => {
                write!(f, "Write to '{variable}' expected {expected} values, got {actual}")
            }
            MiceError::RaggedEstimates { index, expected, actual } => {
                write!(
                    f,
                    "Repetition {index} has {actual} parameters, earlier repetitions have {expected}"
                )
            }

            // ---- Model fitting ----
            MiceError::ModelFit { variable, source } => {
                write!(f, "Conditional model for '{variable}' failed: {source}")
            }
            MiceError::AnalysisFit { source } => {
                write!(f, "Analysis model failed: {source}")
            }

            // ---- Configuration ----
            MiceError::InvalidPmmNeighbors { variable, k, donors } => {
                write!(
                    f,
                    "Invalid PMM neighbor count k = {k} for '{variable}': need 1 ≤ k < {donors} observed donors"
                )
            }
            MiceError::UnimplementedScaleMode { mode } => {
                write!(f, "Scale mode '{mode}' is not implemented")
            }
            MiceError::InvalidScaleValue { value } => {
                write!(f, "Invalid fixed scale {value}: must be finite and positive")
            }
            MiceError::InsufficientIterations { iterations } => {
                write!(f, "Pooling needs at least 2 repetitions, got {iterations}")
            }
            MiceError::InvalidSkip { skip } => {
                write!(f, "Invalid skip {skip}: must be at least 1")
            }
            MiceError::NoImputers => {
                write!(f, "An imputation cycle needs at least one imputer")
            }
            MiceError::DuplicateImputer { variable } => {
                write!(f, "More than one imputer targets '{variable}'")
            }
            MiceError::ForeignImputer { variable } => {
                write!(f, "Imputer for '{variable}' was built for a different dataset")
            }
            MiceError::InvalidFormula { source } => {
                write!(f, "Invalid formula: {source}")
            }

            // ---- Context ----
            MiceError::Repetition { index, source } => {
                write!(f, "Repetition {index} failed: {source}")
            }
        }
    }
}
