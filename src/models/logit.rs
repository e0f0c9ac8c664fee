//! models::logit — binary logistic regression provider.
//!
//! Purpose
//! -------
//! Maximum-likelihood logistic regression for 0/1 variables, fitted through
//! the crate's L-BFGS optimizer. Serves as the conditional model for binary
//! variables and as a binary analysis model.
//!
//! Key behaviors
//! -------------
//! - Maximizes the **average** Bernoulli log-likelihood
//!   `ℓ(β) = n⁻¹ Σ [yᵢ ηᵢ − log(1 + e^{ηᵢ})]`, `η = Xβ`, with its analytic
//!   gradient `n⁻¹ Xᵀ(y − σ(η))`.
//! - `cov_params = (Xᵀ W X)⁻¹` with `W = diag(σ(η)(1 − σ(η)))` at `β̂`.
//! - `scale = 1`; predictive draws are Bernoulli(σ(xβ)) and ignore `scale`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Responses are exactly 0 or 1.
//! - A run that exhausts its iteration budget is a failure
//!   ([`ModelError::NotConverged`]), never a silently accepted estimate.
use crate::{
    models::{
        errors::{ModelError, ModelResult},
        estimates::Estimates,
        frame::ModelFrame,
        linalg::spd_inverse,
        options::{FitOptions, InitOptions},
        traits::{FittedModel, ModelProvider, check_design},
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Cost, Grad, Hessian, LogLikelihood, Theta, maximize, validation},
    },
};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{
    RngCore,
    distributions::{Bernoulli, Distribution},
};

/// Logistic-regression provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Logit;

/// A fitted logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitFit {
    pub estimates: Estimates,
    /// Average log-likelihood at `β̂`.
    pub llf_avg: f64,
    pub iterations: usize,
}

/// Bernoulli log-likelihood over a model frame.
#[derive(Debug, Clone, Copy)]
struct LogitLikelihood;

impl LogLikelihood for LogitLikelihood {
    type Data = ModelFrame;

    fn value(&self, theta: &Theta, data: &ModelFrame) -> OptResult<Cost> {
        let eta = data.exog.dot(theta);
        let total: f64 =
            eta.iter().zip(data.endog.iter()).map(|(&e, &y)| y * e - softplus(e)).sum();
        Ok(total / data.nobs() as f64)
    }

    fn check(&self, theta: &Theta, data: &ModelFrame) -> OptResult<()> {
        validation::validate_theta(theta, data.exog.ncols())
    }

    fn grad(&self, theta: &Theta, data: &ModelFrame) -> OptResult<Grad> {
        let resid = &data.endog - &data.exog.dot(theta).mapv(sigmoid);
        Ok(data.exog.t().dot(&resid) / data.nobs() as f64)
    }
}

impl ModelProvider for Logit {
    fn name(&self) -> &'static str {
        "logit"
    }

    /// Fit by maximum likelihood.
    ///
    /// # Errors
    /// - [`ModelError::NonBinaryResponse`] for responses outside {0, 1}.
    /// - [`ModelError::InsufficientObservations`] if `n ≤ p`.
    /// - [`ModelError::InvalidStartParams`] for a mis-sized start vector.
    /// - [`ModelError::Optimization`] / [`ModelError::NotConverged`] from
    ///   the optimizer.
    /// - [`ModelError::SingularDesign`] if `XᵀWX` cannot be inverted.
    fn fit(
        &self, frame: &ModelFrame, init: &InitOptions, fit: &FitOptions,
    ) -> ModelResult<Box<dyn FittedModel>> {
        let (nobs, nparams) = frame.exog.dim();
        if let Some((i, &value)) =
            frame.endog.iter().enumerate().find(|(_, y)| **y != 0.0 && **y != 1.0)
        {
            return Err(ModelError::NonBinaryResponse { row: frame.rows[i], value });
        }
        if nobs <= nparams {
            return Err(ModelError::InsufficientObservations { nobs, nparams });
        }
        let theta0 = match &init.start_params {
            Some(start) if start.len() != nparams => {
                return Err(ModelError::InvalidStartParams {
                    expected: nparams,
                    actual: start.len(),
                });
            }
            Some(start) => start.clone(),
            None => Array1::zeros(nparams),
        };

        let outcome = maximize(&LogitLikelihood, theta0, frame, &fit.mle_opts)?;
        if !outcome.converged {
            return Err(ModelError::NotConverged {
                iterations: outcome.iterations,
                status: outcome.status,
            });
        }
        let params = outcome.theta_hat;
        let cov_params = spd_inverse(&information(&frame.exog, &params))?;

        Ok(Box::new(LogitFit {
            estimates: Estimates {
                params,
                cov_params,
                scale: 1.0,
                df_resid: (nobs - nparams) as f64,
                nobs,
                exog_names: frame.exog_names.clone(),
            },
            llf_avg: outcome.value,
            iterations: outcome.iterations,
        }))
    }
}

impl FittedModel for LogitFit {
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

    /// Success probabilities `σ(xβ)`.
    fn predict(
        &self, params: &Array1<f64>, exog: ArrayView2<'_, f64>,
    ) -> ModelResult<Array1<f64>> {
        check_design(self.estimates.params.len(), params, exog)?;
        Ok(exog.dot(params).mapv(sigmoid))
    }

    fn sample_from_predictive(
        &self, params: &Array1<f64>, exog: ArrayView2<'_, f64>, _scale: f64,
        rng: &mut dyn RngCore,
    ) -> ModelResult<Array1<f64>> {
        let probs = self.predict(params, exog)?;
        let mut draws = Array1::zeros(probs.len());
        for (slot, &p) in draws.iter_mut().zip(probs.iter()) {
            let coin = Bernoulli::new(p).map_err(|_| ModelError::InvalidScale { scale: p })?;
            *slot = if coin.sample(&mut *rng) { 1.0 } else { 0.0 };
        }
        Ok(draws)
    }

    fn set_pooled(
        &mut self, params: Array1<f64>, cov_params: Array2<f64>, scale: f64,
    ) -> ModelResult<()> {
        self.estimates.overwrite(params, cov_params, scale)
    }

    fn boxed_clone(&self) -> Box<dyn FittedModel> {
        Box::new(self.clone())
    }
}

// ---- Helper Methods ----

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + eˣ)` without overflow.
fn softplus(x: f64) -> f64 {
    if x > 0.0 { x + (-x).exp().ln_1p() } else { x.exp().ln_1p() }
}

/// `XᵀWX` with `W = diag(σ(Xβ)(1 − σ(Xβ)))`.
fn information(exog: &Array2<f64>, params: &Array1<f64>) -> Hessian {
    let w = exog.dot(params).mapv(|e| {
        let p = sigmoid(e);
        p * (1.0 - p)
    });
    let weighted = exog * &w.insert_axis(Axis(1));
    exog.t().dot(&weighted)
}
