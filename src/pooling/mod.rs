//! pooling — analysis across retained datasets and Rubin's-rule pooling.
//!
//! Purpose
//! -------
//! Turn a stream of imputed datasets into one analysis result whose
//! covariance reflects both within- and between-imputation uncertainty.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisModel`] fits the model of interest on a full dataset.
//! - [`Pool`] records one [`RepetitionEstimate`] per retained dataset and
//!   combines them with [`combine_rubin`].
//! - [`Mice`] validates [`MiceOptions`] and runs scheduler and pool end to
//!   end.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least two repetitions are needed to pool.
//! - The between-repetition covariance uses the divide-by-`m` normalization.
//!
//! Testing notes
//! -------------
//! - Rubin's rules are checked against a hand-computed two-repetition case;
//!   pool and façade behavior is covered by unit and integration tests.

pub mod mice;
pub mod pool;
pub mod rubin;

pub use self::mice::{Mice, MiceOptions};
pub use self::pool::{AnalysisModel, Pool, PooledFit};
pub use self::rubin::{RepetitionEstimate, RubinEstimate, combine_rubin};
