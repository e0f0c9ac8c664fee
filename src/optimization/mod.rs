//! optimization — likelihood maximization and its error surface.
//!
//! Purpose
//! -------
//! Provide the numerical fitting layer used by iterative model providers.
//! Callers implement a log-likelihood, choose tolerances, and get back fitted
//! coefficients plus diagnostics without touching Argmin directly.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: L-BFGS maximization of `ℓ(θ)` with configurable line
//!   search and stopping rules.
//! - `errors`: a single [`OptError`](errors::OptError) enum and
//!   [`OptResult`](errors::OptResult) alias that absorb Argmin backend errors.
//!
//! Conventions
//! -----------
//! - All solvers maximize `ℓ(θ)` by minimizing `-ℓ(θ)`; outcomes are reported
//!   in log-likelihood terms.
//! - Progress is emitted as `tracing` debug events; the optional `obs_slog`
//!   feature adds Argmin's terminal observer on verbose runs.
//!
//! Downstream usage
//! ----------------
//! - `models::logit` fits through `loglik_optimizer::maximize`; its failures
//!   become `ModelError::Optimization`.

pub mod errors;
pub mod loglik_optimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
