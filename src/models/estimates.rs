//! Estimate fields shared by the built-in fitted models.
use crate::models::{errors::ModelResult, traits::check_pooled};
use ndarray::{Array1, Array2};

/// Coefficients, their covariance, residual scale and bookkeeping of a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimates {
    pub params: Array1<f64>,
    pub cov_params: Array2<f64>,
    pub scale: f64,
    pub df_resid: f64,
    pub nobs: usize,
    pub exog_names: Vec<String>,
}

impl Estimates {
    /// Replace params, covariance and scale after shape checks.
    pub fn overwrite(
        &mut self, params: Array1<f64>, cov_params: Array2<f64>, scale: f64,
    ) -> ModelResult<()> {
        check_pooled(self.params.len(), &params, &cov_params)?;
        self.params = params;
        self.cov_params = cov_params;
        self.scale = scale;
        Ok(())
    }
}
