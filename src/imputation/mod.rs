//! imputation — chained-equations imputation engine.
//!
//! Purpose
//! -------
//! Repeatedly re-simulate the missing cells of a numeric table, one variable
//! at a time, from conditional models fitted on the rest of the table.
//!
//! Key behaviors
//! -------------
//! - [`ImputedDataset`] owns the table, its per-variable
//!   [`MissingnessIndex`], and the initial mean fill.
//! - [`VariableImputer`] fits one variable's conditional model, perturbs its
//!   parameters, and simulates by predictive draw or predictive mean
//!   matching.
//! - [`ImputationCycle`] runs all imputers once, fewest-missing first.
//! - [`ImputationScheduler`] adds burn-in and thinning and returns retained
//!   datasets for analysis.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single-threaded: exactly one cycle mutates the dataset at a time, and
//!   the scheduler is the dataset's only owner once built.
//! - Every random draw comes from the scheduler's generator.
//!
//! Downstream usage
//! ----------------
//! - `pooling::Pool` pulls retained datasets from a scheduler and fits the
//!   analysis model on each.
//!
//! Testing notes
//! -------------
//! - Each component has unit tests; end-to-end behavior is covered by
//!   `tests/integration_mice_pipeline.rs`.

pub mod cycle;
pub mod dataset;
pub mod errors;
pub mod imputer;
pub mod matching;
pub mod missingness;
pub mod options;
pub mod scheduler;

pub use self::cycle::ImputationCycle;
pub use self::dataset::{DatasetId, ImputedDataset, RowSelection};
pub use self::errors::{ErrorKind, MiceError, MiceResult};
pub use self::imputer::VariableImputer;
pub use self::missingness::MissingnessIndex;
pub use self::options::{ImputationMethod, ImputerOptions, ScaleMode, SchedulerOptions};
pub use self::scheduler::{ImputationScheduler, SchedulerState};
