//! High-level entry point for maximizing a [`LogLikelihood`].
//!
//! Picks the L-BFGS variant that matches `opts.line_searcher`, wraps the
//! model in an [`ArgMinAdapter`] (which minimizes `-ℓ(θ)`), and delegates
//! execution to [`run_lbfgs`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` starting from `theta0`.
///
/// # Errors
/// - Any error from `f.check(theta0, data)`.
/// - Solver construction or runtime errors.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_mice::optimization::errors::OptResult;
/// use rust_mice::optimization::loglik_optimizer::{maximize, LogLikelihood, MLEOptions, Theta};
///
/// struct Concave;
/// impl LogLikelihood for Concave {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Concave, array![0.1, -0.2], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_mice::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::{OptError, OptResult};
    use crate::optimization::loglik_optimizer::{Grad, Tolerances};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - End-to-end maximization of a concave toy likelihood with both line
    //   searches.
    // - Early rejection through `LogLikelihood::check`.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -Σ (θᵢ - cᵢ)², maximized at θ = c.
    struct Bowl;

    impl LogLikelihood for Bowl {
        type Data = Array1<f64>;

        fn value(&self, theta: &Theta, center: &Array1<f64>) -> OptResult<f64> {
            Ok(-(theta - center).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta, center: &Array1<f64>) -> OptResult<()> {
            if theta.len() != center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: center.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, center: &Array1<f64>) -> OptResult<Grad> {
            Ok((center - theta).mapv(|d| 2.0 * d))
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches find the maximizer of a separable quadratic.
    //
    // Given
    // -----
    // - Center c = (1.5, -2.0) and θ₀ = 0.
    //
    // Expect
    // ------
    // - θ̂ ≈ c, ℓ(θ̂) ≈ 0, and the run reports convergence.
    fn maximize_recovers_quadratic_optimum() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let center = array![1.5, -2.0];
            let tols = Tolerances::new(Some(1e-10), None, Some(200)).expect("valid tolerances");
            let opts = MLEOptions::new(tols, ls, false, None).expect("valid options");

            // Act
            let out = maximize(&Bowl, Array1::zeros(2), &center, &opts).expect("should converge");

            // Assert
            assert_abs_diff_eq!(out.theta_hat[0], 1.5, epsilon = 1e-6);
            assert_abs_diff_eq!(out.theta_hat[1], -2.0, epsilon = 1e-6);
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-10);
            assert!(out.converged, "status was {}", out.status);
        }
    }

    #[test]
    // Purpose
    // -------
    // The `check` hook runs before any solver work.
    //
    // Given
    // -----
    // - θ₀ of length 3 against a 2-dimensional center.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch { expected: 2, actual: 3 }`.
    fn maximize_rejects_bad_start_via_check() {
        // Act
        let res = maximize(&Bowl, Array1::zeros(3), &array![0.0, 0.0], &MLEOptions::default());

        // Assert
        assert_eq!(res.err(), Some(OptError::ThetaLengthMismatch { expected: 2, actual: 3 }));
    }
}
