//! loglik_optimizer — Argmin-powered log-likelihood maximization.
//!
//! Purpose
//! -------
//! Fit analysis and imputation models that have no closed-form estimator
//! (logistic regression being the built-in case). A model implements
//! [`LogLikelihood`] and calls [`maximize`] to run L-BFGS with a configurable
//! line search, tolerances, and a finite-difference gradient fallback.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the Argmin cost `-ℓ(θ)`.
//! - [`maximize`] validates the start with [`LogLikelihood::check`], selects
//!   a solver via [`builders`], runs it via [`run::run_lbfgs`], and returns an
//!   [`OptimOutcome`].
//! - Configuration ([`Tolerances`], [`MLEOptions`]) is validated on
//!   construction by [`validation`] helpers.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models implement `ℓ(θ)` and optionally `∇ℓ(θ)`, never the cost.
//! - Invalid inputs are reported as [`OptError`](crate::optimization::errors::OptError)
//!   values; nothing here panics.
//! - [`OptimOutcome::converged`] is `true` only when a convergence criterion
//!   fired; an exhausted iteration budget is reported as not converged.
//!
//! Downstream usage
//! ----------------
//! - `models::logit` implements [`LogLikelihood`] for the Bernoulli
//!   likelihood and maps a non-converged outcome to a model error.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign handling in [`adapter`], solver wiring in
//!   [`builders`], configuration rules in [`traits`], and end-to-end
//!   maximization of toy likelihoods in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
