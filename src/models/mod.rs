//! models — model-provider contract and built-in providers.
//!
//! Purpose
//! -------
//! Define what the imputation engine and the pool require of a statistical
//! model, and ship two providers that satisfy it: [`Ols`] for continuous
//! variables and [`Logit`] for binary ones.
//!
//! Key behaviors
//! -------------
//! - [`Formula`] names the response and additive design terms.
//! - [`ModelFrame`] materializes a formula over a row subset of a table.
//! - [`ModelProvider`] fits a frame into a [`FittedModel`], which exposes
//!   estimates, prediction, and predictive sampling at arbitrary parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Providers never panic on bad input; they return [`ModelError`].
//! - Randomness is always supplied by the caller.
//!
//! Downstream usage
//! ----------------
//! - `imputation::VariableImputer` fits conditional models on observed rows
//!   and simulates missing ones through this contract.
//! - `pooling::Pool` fits the analysis model per retained dataset and writes
//!   the Rubin-combined result back with [`FittedModel::set_pooled`].
//!
//! Testing notes
//! -------------
//! - Providers are tested against hand-computed estimates; the formula
//!   parser and frame builder have their own unit tests.

pub mod errors;
pub mod estimates;
pub mod formula;
pub mod frame;
pub mod linalg;
pub mod logit;
pub mod ols;
pub mod options;
pub mod traits;

pub use self::errors::{ModelError, ModelResult};
pub use self::formula::{Formula, INTERCEPT};
pub use self::frame::ModelFrame;
pub use self::logit::{Logit, LogitFit};
pub use self::ols::{Ols, OlsFit};
pub use self::options::{FitOptions, InitOptions};
pub use self::traits::{FittedModel, ModelProvider};
