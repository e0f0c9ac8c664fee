//! rust_mice — multiple imputation by chained equations.
//!
//! Purpose
//! -------
//! Impute the missing cells of a numeric table by repeatedly re-simulating
//! each incomplete variable from a conditional model fitted on the others,
//! then fit an analysis model on several imputed copies and pool the results
//! with Rubin's rules.
//!
//! Key behaviors
//! -------------
//! - `imputation`: dataset with per-variable missingness, per-variable
//!   imputers (Bayesian predictive draw or predictive mean matching), the
//!   imputation cycle, and a burn-in/skip scheduler.
//! - `pooling`: analysis fits per retained dataset, Rubin's rules, and the
//!   [`pooling::Mice`] driver.
//! - `models`: the provider contract plus OLS and logistic regression.
//! - `optimization`: L-BFGS likelihood maximization used by iterative
//!   providers.
//!
//! Invariants & assumptions
//! ------------------------
//! - Missing input cells are NaN; every other cell must be finite.
//! - Execution is single-threaded and every random draw comes from one
//!   explicit, optionally seeded generator.
//!
//! Conventions
//! -----------
//! - Fallible operations return area-specific `Result` aliases
//!   (`MiceResult`, `ModelResult`, `OptResult`); nothing panics on bad input.
//! - Diagnostics are emitted through `tracing`; the library installs no
//!   subscriber.
//!
//! Example
//! -------
//! ```
//! use ndarray::array;
//! use rust_mice::{
//!     imputation::{ImputedDataset, ImputerOptions, SchedulerOptions},
//!     models::Ols,
//!     pooling::{AnalysisModel, Mice, MiceOptions},
//! };
//! use std::sync::Arc;
//!
//! let nan = f64::NAN;
//! let table = array![
//!     [1.0, 2.1],
//!     [2.0, nan],
//!     [3.0, 6.2],
//!     [nan, 7.9],
//!     [5.0, 10.1],
//!     [6.0, 11.8],
//! ];
//! let data = ImputedDataset::new(table, vec!["x".to_string(), "y".to_string()])?;
//! let imputers = vec![
//!     data.new_imputer("x", None, Arc::new(Ols), ImputerOptions::default())?,
//!     data.new_imputer("y", None, Arc::new(Ols), ImputerOptions::default())?,
//! ];
//! let analysis = AnalysisModel::parse("y ~ x", Arc::new(Ols))?;
//! let options = MiceOptions::new(5, SchedulerOptions::new(2, 1)?, Some(7))?;
//!
//! let mut mice = Mice::new(data, imputers, analysis, options)?;
//! let pooled = mice.run()?;
//! assert_eq!(pooled.params().len(), 2);
//! assert_eq!(pooled.estimate.m, 5);
//! # Ok::<(), rust_mice::imputation::MiceError>(())
//! ```

pub mod imputation;
pub mod models;
pub mod optimization;
pub mod pooling;
