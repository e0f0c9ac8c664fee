//! models::ols — ordinary least squares provider.
//!
//! Purpose
//! -------
//! Closed-form Gaussian linear regression, the default conditional model for
//! continuous variables and a common analysis model.
//!
//! Key behaviors
//! -------------
//! - `β̂ = (XᵀX)⁻¹ Xᵀy` via a Cholesky solve.
//! - `scale = SSR / (n − p)`, `cov_params = scale · (XᵀX)⁻¹`.
//! - Predictive draws are `N(xβ, scale)` with `scale` a variance.
//!
//! Invariants & assumptions
//! ------------------------
//! - `n > p`; otherwise there are no residual degrees of freedom.
//! - `XᵀX` must be positive definite (full column rank).
use crate::models::{
    errors::{ModelError, ModelResult},
    estimates::Estimates,
    frame::ModelFrame,
    linalg::{spd_inverse, spd_solve},
    options::{FitOptions, InitOptions},
    traits::{FittedModel, ModelProvider, check_design},
};
use ndarray::{Array1, Array2, ArrayView2};
use rand::{RngCore, distributions::Distribution};
use statrs::distribution::Normal;

/// Least-squares provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ols;

/// A fitted least-squares model.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub estimates: Estimates,
    /// `(XᵀX)⁻¹`, kept so that `cov_params = scale · normalized_cov`.
    pub normalized_cov: Array2<f64>,
}

impl ModelProvider for Ols {
    fn name(&self) -> &'static str {
        "ols"
    }

    /// Fit by least squares.
    ///
    /// # Errors
    /// - [`ModelError::InsufficientObservations`] if `n ≤ p`.
    /// - [`ModelError::SingularDesign`] if `XᵀX` is not positive definite.
    fn fit(
        &self, frame: &ModelFrame, _init: &InitOptions, _fit: &FitOptions,
    ) -> ModelResult<Box<dyn FittedModel>> {
        let (nobs, nparams) = frame.exog.dim();
        if nobs <= nparams {
            return Err(ModelError::InsufficientObservations { nobs, nparams });
        }
        let xtx = frame.exog.t().dot(&frame.exog);
        let xty = frame.exog.t().dot(&frame.endog);
        let params = spd_solve(&xtx, &xty)?;
        let normalized_cov = spd_inverse(&xtx)?;

        let resid = &frame.endog - &frame.exog.dot(&params);
        let df_resid = (nobs - nparams) as f64;
        let scale = resid.dot(&resid) / df_resid;
        let cov_params = &normalized_cov * scale;

        Ok(Box::new(OlsFit {
            estimates: Estimates {
                params,
                cov_params,
                scale,
                df_resid,
                nobs,
                exog_names: frame.exog_names.clone(),
            },
            normalized_cov,
        }))
    }
}

impl FittedModel for OlsFit {
    fn params(&self) -> &Array1<f64> {
        &self.estimates.params
    }

    fn cov_params(&self) -> &Array2<f64> {
        &self.estimates.cov_params
    }

    fn scale(&self) -> f64 {
        self.estimates.scale
    }

    fn df_resid(&self) -> f64 {
        self.estimates.df_resid
    }

    fn nobs(&self) -> usize {
        self.estimates.nobs
    }

    fn exog_names(&self) -> &[String] {
        &self.estimates.exog_names
    }

    fn predict(
        &self, params: &Array1<f64>, exog: ArrayView2<'_, f64>,
    ) -> ModelResult<Array1<f64>> {
        check_design(self.estimates.params.len(), params, exog)?;
        Ok(exog.dot(params))
    }

    /// Draw `yᵢ ~ N(xᵢβ, scale)`; a zero scale returns the means.
    ///
    /// # Errors
    /// [`ModelError::InvalidScale`] for a negative or non-finite scale.
    fn sample_from_predictive(
        &self, params: &Array1<f64>, exog: ArrayView2<'_, f64>, scale: f64,
        rng: &mut dyn RngCore,
    ) -> ModelResult<Array1<f64>> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(ModelError::InvalidScale { scale });
        }
        let mean = self.predict(params, exog)?;
        if scale == 0.0 {
            return Ok(mean);
        }
        let noise =
            Normal::new(0.0, scale.sqrt()).map_err(|_| ModelError::InvalidScale { scale })?;
        Ok(mean.mapv(|m| m + noise.sample(&mut *rng)))
    }

    fn set_pooled(
        &mut self, params: Array1<f64>, cov_params: Array2<f64>, scale: f64,
    ) -> ModelResult<()> {
        self.estimates.overwrite(params, cov_params, scale)?;
        if scale > 0.0 {
            self.normalized_cov = &self.estimates.cov_params / scale;
        }
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn FittedModel> {
        Box::new(self.clone())
    }
}
