//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Build L-BFGS solvers with the requested line search and the tolerances in
//! [`MLEOptions`]. The initial parameter vector and iteration cap are runtime
//! concerns applied by [`run_lbfgs`](super::run::run_lbfgs).
//!
//! Invariants & assumptions
//! ------------------------
//! - History size is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - A tolerance left at `None` keeps Argmin's default for that criterion.
//! - Argmin rejections surface as [`OptError`](crate::optimization::errors::OptError)
//!   through the crate's `From<argmin::core::Error>` conversion.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the gradient-norm and cost-change tolerances to any L-BFGS variant.
///
/// # Errors
/// Returns an `OptError` if Argmin refuses a tolerance.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of both line-search variants with default and explicit
    //   history sizes.
    // - Tolerance wiring when tolerances are present or absent.
    //
    // They intentionally DO NOT cover:
    // - Executor behavior (see `api` tests).
    // -------------------------------------------------------------------------

    fn opts(ls: LineSearcher, mem: Option<usize>, tol_cost: Option<f64>) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-6), tol_cost, Some(50)).expect("valid tolerances");
        MLEOptions::new(tols, ls, false, mem).expect("valid options")
    }

    #[test]
    // Purpose
    // -------
    // Both builders succeed with the default and an explicit history size.
    //
    // Given
    // -----
    // - `lbfgs_mem = None` and `lbfgs_mem = Some(11)` for each line search.
    //
    // Expect
    // ------
    // - Every builder call returns `Ok`.
    fn builders_accept_default_and_explicit_memory() {
        // Act / Assert
        assert!(build_optimizer_hager_zhang(&opts(LineSearcher::HagerZhang, None, None)).is_ok());
        assert!(
            build_optimizer_hager_zhang(&opts(LineSearcher::HagerZhang, Some(11), None)).is_ok()
        );
        assert!(
            build_optimizer_more_thuente(&opts(LineSearcher::MoreThuente, None, Some(1e-10)))
                .is_ok()
        );
        assert!(
            build_optimizer_more_thuente(&opts(LineSearcher::MoreThuente, Some(3), None)).is_ok()
        );
    }

    #[test]
    // Purpose
    // -------
    // `configure_lbfgs` leaves Argmin defaults alone when no tolerance is set.
    //
    // Given
    // -----
    // - Tolerances with only `max_iter`.
    //
    // Expect
    // ------
    // - `Ok` solver.
    fn configure_lbfgs_without_tolerances() {
        // Arrange
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(20)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None)
            .expect("valid options");

        // Act
        let configured = configure_lbfgs(raw, &opts);

        // Assert
        assert!(configured.is_ok());
    }
}
