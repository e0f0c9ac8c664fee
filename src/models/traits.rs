//! models::traits — the contract between the imputation engine and the
//! statistical models it drives.
//!
//! Purpose
//! -------
//! Any regression or classification model that can be fitted on a
//! [`ModelFrame`], report its coefficients and their covariance, predict,
//! and simulate from its predictive distribution can serve both as a
//! conditional imputation model and as the analysis model that is pooled.
//!
//! Key behaviors
//! -------------
//! - [`ModelProvider::fit`] turns a frame into a boxed [`FittedModel`].
//! - [`FittedModel::predict`] and [`FittedModel::sample_from_predictive`]
//!   accept arbitrary parameter vectors, so perturbed draws `β*` can be
//!   evaluated without refitting.
//! - [`FittedModel::set_pooled`] lets the pool overwrite a fitted result
//!   with Rubin-combined quantities, so summaries reflect pooled values.
//!
//! Invariants & assumptions
//! ------------------------
//! - `params().len() == exog_names().len()` and `cov_params()` is square of
//!   the same size.
//! - `scale()` is the residual variance (1 for models without one).
//! - Both traits are object safe; randomness arrives as `&mut dyn RngCore`.
use crate::models::{
    errors::{ModelError, ModelResult},
    frame::ModelFrame,
    options::{FitOptions, InitOptions},
};
use ndarray::{Array1, Array2, ArrayView2};
use rand::RngCore;
use std::fmt::Debug;

/// Factory for fitted models.
pub trait ModelProvider: Debug + Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Fit on a frame.
    ///
    /// # Errors
    /// Any estimation failure (singular design, non-convergence, invalid
    /// response) as a [`ModelError`].
    fn fit(
        &self, frame: &ModelFrame, init: &InitOptions, fit: &FitOptions,
    ) -> ModelResult<Box<dyn FittedModel>>;
}

/// A fitted model's results and its predictive distribution.
pub trait FittedModel: Debug + Send + Sync {
    fn params(&self) -> &Array1<f64>;

    fn cov_params(&self) -> &Array2<f64>;

    fn scale(&self) -> f64;

    fn df_resid(&self) -> f64;

    fn nobs(&self) -> usize;

    fn exog_names(&self) -> &[String];

    /// Mean response `E[y | x; params]` for every row of `exog`.
    fn predict(
        &self, params: &Array1<f64>, exog: ArrayView2<'_, f64>,
    ) -> ModelResult<Array1<f64>>;

    /// One draw from the predictive distribution for every row of `exog`,
    /// using `scale` as the residual variance.
    fn sample_from_predictive(
        &self, params: &Array1<f64>, exog: ArrayView2<'_, f64>, scale: f64,
        rng: &mut dyn RngCore,
    ) -> ModelResult<Array1<f64>>;

    /// Overwrite the estimate fields with pooled values.
    ///
    /// # Errors
    /// [`ModelError::PooledShapeMismatch`] if shapes disagree with the fit.
    fn set_pooled(
        &mut self, params: Array1<f64>, cov_params: Array2<f64>, scale: f64,
    ) -> ModelResult<()>;

    fn boxed_clone(&self) -> Box<dyn FittedModel>;

    /// Standard errors `sqrt(diag(cov_params))`.
    fn bse(&self) -> Array1<f64> {
        self.cov_params().diag().mapv(f64::sqrt)
    }
}

impl Clone for Box<dyn FittedModel> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

// ---- Helpers shared by providers ----

/// Check `params` and `exog` against a fitted width.
pub(crate) fn check_design(
    width: usize, params: &Array1<f64>, exog: ArrayView2<'_, f64>,
) -> ModelResult<()> {
    if params.len() != width {
        return Err(ModelError::ParamLengthMismatch { expected: width, actual: params.len() });
    }
    if exog.ncols() != width {
        return Err(ModelError::ExogWidthMismatch { expected: width, actual: exog.ncols() });
    }
    Ok(())
}

/// Validate pooled inputs against a fitted width.
pub(crate) fn check_pooled(
    width: usize, params: &Array1<f64>, cov_params: &Array2<f64>,
) -> ModelResult<()> {
    if params.len() != width {
        return Err(ModelError::PooledShapeMismatch { expected: width, actual: params.len() });
    }
    if cov_params.nrows() != width || cov_params.ncols() != width {
        return Err(ModelError::PooledShapeMismatch {
            expected: width,
            actual: cov_params.nrows().max(cov_params.ncols()),
        });
    }
    Ok(())
}
