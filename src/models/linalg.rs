//! models::linalg — dense symmetric-matrix helpers on top of `nalgebra`.
//!
//! Purpose
//! -------
//! Bridge `ndarray` matrices into `nalgebra` for the factorizations the
//! providers and the imputer need: Cholesky solves and inverses of `XᵀX` /
//! information matrices, and a square root `L` of a covariance with
//! `L·Lᵀ = Σ`.
//!
//! Conventions
//! -----------
//! - Inputs are assumed symmetric; only their values are copied, no
//!   symmetrization is performed.
//! - Failures are reported as [`ModelError`] values.
use crate::models::errors::{ModelError, ModelResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Relative tolerance under which an eigenvalue counts as zero.
const EIGEN_REL_TOL: f64 = 1e-10;

pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Solve `A x = b` for symmetric positive-definite `A`.
///
/// # Errors
/// [`ModelError::SingularDesign`] if the Cholesky factorization fails.
pub fn spd_solve(a: &Array2<f64>, b: &Array1<f64>) -> ModelResult<Array1<f64>> {
    let chol = to_dmatrix(a).cholesky().ok_or(ModelError::SingularDesign)?;
    let x = chol.solve(&DVector::from_iterator(b.len(), b.iter().copied()));
    Ok(Array1::from_iter(x.iter().copied()))
}

/// Inverse of a symmetric positive-definite matrix.
///
/// # Errors
/// [`ModelError::SingularDesign`] if the Cholesky factorization fails.
pub fn spd_inverse(a: &Array2<f64>) -> ModelResult<Array2<f64>> {
    let chol = to_dmatrix(a).cholesky().ok_or(ModelError::SingularDesign)?;
    Ok(from_dmatrix(&chol.inverse()))
}

/// Square root `L` with `L·Lᵀ = Σ`.
///
/// The lower Cholesky factor is returned when `Σ` is positive definite.
/// A positive semi-definite `Σ` (e.g. the zero covariance of an exact fit)
/// falls back to `L = Q·diag(√λ)` from the symmetric eigendecomposition,
/// with eigenvalues within [`EIGEN_REL_TOL`] of zero truncated.
///
/// # Errors
/// [`ModelError::InvalidCovariance`] if `Σ` has a non-finite entry or an
/// eigenvalue below the truncation tolerance.
pub fn psd_sqrt(sigma: &Array2<f64>) -> ModelResult<Array2<f64>> {
    if sigma.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::InvalidCovariance { min_eigenvalue: f64::NAN });
    }
    let m = to_dmatrix(sigma);
    if let Some(chol) = m.clone().cholesky() {
        let l = chol.l();
        if l.iter().all(|v| v.is_finite()) {
            return Ok(from_dmatrix(&l));
        }
    }

    let eigen = m.symmetric_eigen();
    let max_abs = eigen.eigenvalues.iter().fold(0.0_f64, |acc, l| acc.max(l.abs()));
    let tol = EIGEN_REL_TOL * max_abs.max(1.0);
    let min_eigenvalue = eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    if min_eigenvalue < -tol {
        return Err(ModelError::InvalidCovariance { min_eigenvalue });
    }
    let n = sigma.nrows();
    let q = &eigen.eigenvectors;
    let root = Array2::from_shape_fn((n, n), |(i, k)| {
        let lambda = eigen.eigenvalues[k];
        if lambda > tol { q[(i, k)] * lambda.sqrt() } else { 0.0 }
    });
    Ok(root)
}
