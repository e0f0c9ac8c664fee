//! Adapter that exposes a [`LogLikelihood`] as an `argmin` minimization problem.
//!
//! The optimizer maximizes `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`. Analytic
//! gradients supplied by a model are negated here; when a model has none, the
//! **cost** closure is finite-differenced directly, so that branch needs no
//! sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a model and its data to `argmin`'s `CostFunction` / `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Finite-difference gradient of the cost with error capture.
    ///
    /// Central differences are tried first. If any cost evaluation failed, or
    /// the result does not validate, the gradient is recomputed with forward
    /// differences. An error captured on the forward pass is returned as-is.
    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let dim = theta.len();
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_fn = |t: &Theta| -> f64 {
            match self.cost(t) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };

        let central = theta.central_diff(&cost_fn);
        if closure_err.borrow().is_none() && validate_grad(&central, dim).is_ok() {
            return Ok(central);
        }

        closure_err.replace(None);
        let forward = theta.forward_diff(&cost_fn);
        if let Some(err) = closure_err.take() {
            return Err(err);
        }
        validate_grad(&forward, dim)?;
        Ok(forward)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(θ)`.
    ///
    /// # Errors
    /// - Any `OptError` from the model's `value`.
    /// - `NonFiniteCost` if `ℓ(θ)` is NaN or infinite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇c(θ)`.
    ///
    /// An analytic `∇ℓ(θ)` is validated and negated. `GradientNotImplemented`
    /// switches to finite differences; every other model error propagates.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The sign convention `c = -ℓ` for both cost and analytic gradient.
    // - The finite-difference fallback when no analytic gradient exists.
    // - Propagation of model errors raised during finite differencing.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -½‖θ - 1‖², with or without an analytic gradient.
    struct Quadratic {
        analytic: bool,
    }

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-0.5 * theta.mapv(|x| (x - 1.0).powi(2)).sum())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|x| 1.0 - x))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    /// Fails whenever the first coordinate is above 0.5.
    struct Fenced;

    impl LogLikelihood for Fenced {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            if theta[0] > 0.5 {
                return Err(OptError::InvalidThetaInput { index: 0, value: theta[0] });
            }
            Ok(-theta.dot(theta))
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Cost and analytic gradient carry the minimization sign.
    //
    // Given
    // -----
    // - ℓ(θ) = -½‖θ - 1‖² evaluated at θ = (0, 3).
    //
    // Expect
    // ------
    // - cost = +2.5 and ∇c = (-1, 2).
    fn analytic_gradient_is_negated() {
        // Arrange
        let model = Quadratic { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![0.0, 3.0];

        // Act
        let cost = adapter.cost(&theta).expect("cost should evaluate");
        let grad = adapter.gradient(&theta).expect("gradient should evaluate");

        // Assert
        assert_abs_diff_eq!(cost, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(grad[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grad[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the adapter differentiates the cost.
    //
    // Given
    // -----
    // - The same quadratic with `analytic = false`.
    //
    // Expect
    // ------
    // - The FD gradient matches the analytic cost gradient to ~1e-6.
    fn finite_difference_fallback_matches_analytic() {
        // Arrange
        let model = Quadratic { analytic: false };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![0.0, 3.0];

        // Act
        let grad = adapter.gradient(&theta).expect("FD gradient should evaluate");

        // Assert
        assert_abs_diff_eq!(grad[0], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // A model error hit by both difference schemes reaches the caller.
    //
    // Given
    // -----
    // - A likelihood that errors for θ₀ > 0.5, evaluated at θ₀ = 0.5 so the
    //   positive perturbation crosses the fence.
    //
    // Expect
    // ------
    // - The original `InvalidThetaInput` comes back after conversion.
    fn finite_difference_propagates_model_error() {
        // Arrange
        let adapter = ArgMinAdapter::new(&Fenced, &());
        let theta = array![0.5, 0.0];

        // Act
        let err = adapter.gradient(&theta).expect_err("fence should be crossed");

        // Assert
        assert!(matches!(OptError::from(err), OptError::InvalidThetaInput { index: 0, .. }));
    }
}
