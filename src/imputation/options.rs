//! imputation::options — validated configuration for imputers and the
//! scheduler.
//!
//! Purpose
//! -------
//! Gather every tunable of the chained-equations engine into small option
//! types that are checked when they are built, so simulation never starts
//! from an invalid configuration.
//!
//! Key behaviors
//! -------------
//! - [`ScaleMode`] chooses the residual-scale multiplier `s` applied when
//!   perturbing a conditional model's parameters.
//! - [`ImputationMethod`] chooses between a Bayesian predictive draw and
//!   predictive mean matching.
//! - [`ImputerOptions`] bundles method, scale mode and the provider's
//!   init/fit options.
//! - [`SchedulerOptions`] holds burn-in and skip.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ScaleMode::BootstrapPerturbed` is rejected at construction.
//! - `ScaleMode::Fixed(Some(v))` requires a finite `v > 0`.
//! - `PredictiveMeanMatching { k }` requires `k ≥ 1`; the upper bound
//!   (`k` below the donor count) is checked when an imputer is built.
//! - `skip ≥ 1`; `burn_in` may be zero.
use crate::{
    imputation::errors::{MiceError, MiceResult},
    models::options::{FitOptions, InitOptions},
};

/// Residual-scale multiplier used when perturbing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    /// `s = value`, or `s = 1` when no value is given.
    Fixed(Option<f64>),
    /// `s = df / u` with `u ~ χ²(df)` and `df` the residual degrees of freedom.
    ChiSquarePerturbed,
    /// Reserved. Selecting it is a configuration error.
    BootstrapPerturbed,
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Fixed(None)
    }
}

impl ScaleMode {
    pub fn name(&self) -> &'static str {
        match self {
            ScaleMode::Fixed(_) => "fixed",
            ScaleMode::ChiSquarePerturbed => "chi-square-perturbed",
            ScaleMode::BootstrapPerturbed => "bootstrap",
        }
    }
}

/// How simulated values are produced from the perturbed model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImputationMethod {
    /// Draw from the model's predictive distribution at `β*`.
    #[default]
    AsymptoticBayes,
    /// Copy the observed value of one of the `k` closest donors.
    PredictiveMeanMatching { k: usize },
}

impl ImputationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ImputationMethod::AsymptoticBayes => "asymptotic-bayes",
            ImputationMethod::PredictiveMeanMatching { .. } => "pmm",
        }
    }
}

/// Per-imputer configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImputerOptions {
    pub method: ImputationMethod,
    pub scale: ScaleMode,
    pub init: InitOptions,
    pub fit: FitOptions,
}

impl ImputerOptions {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`MiceError::UnimplementedScaleMode`] for `BootstrapPerturbed`.
    /// - [`MiceError::InvalidScaleValue`] for a non-finite or non-positive
    ///   fixed scale.
    /// - [`MiceError::InvalidPmmNeighbors`] for `k = 0`.
    pub fn new(
        method: ImputationMethod, scale: ScaleMode, init: InitOptions, fit: FitOptions,
    ) -> MiceResult<Self> {
        let opts = Self { method, scale, init, fit };
        opts.validate()?;
        Ok(opts)
    }

    /// Defaults with the given method.
    pub fn with_method(method: ImputationMethod) -> MiceResult<Self> {
        Self::new(method, ScaleMode::default(), InitOptions::default(), FitOptions::default())
    }

    /// Re-run construction checks (fields are public and may have been edited).
    pub fn validate(&self) -> MiceResult<()> {
        match self.scale {
            ScaleMode::BootstrapPerturbed => {
                return Err(MiceError::UnimplementedScaleMode { mode: self.scale.name() });
            }
            ScaleMode::Fixed(Some(value)) if !value.is_finite() || value <= 0.0 => {
                return Err(MiceError::InvalidScaleValue { value });
            }
            _ => {}
        }
        if let ImputationMethod::PredictiveMeanMatching { k: 0 } = self.method {
            return Err(MiceError::InvalidPmmNeighbors {
                variable: String::new(),
                k: 0,
                donors: 0,
            });
        }
        Ok(())
    }
}

/// Burn-in and thinning of the scheduler.
///
/// Default: `burn_in = 5`, `skip = 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub burn_in: usize,
    pub skip: usize,
}

impl SchedulerOptions {
    /// # Errors
    /// [`MiceError::InvalidSkip`] if `skip == 0`.
    pub fn new(burn_in: usize, skip: usize) -> MiceResult<Self> {
        let opts = Self { burn_in, skip };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> MiceResult<()> {
        if self.skip == 0 {
            return Err(MiceError::InvalidSkip { skip: self.skip });
        }
        Ok(())
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self { burn_in: 5, skip: 10 }
    }
}
