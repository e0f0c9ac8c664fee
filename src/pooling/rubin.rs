//! pooling::rubin — Rubin's rules for combining repeated estimates.
//!
//! Given `m` repetitions with parameter vectors `θᵢ`, covariances `Σᵢ` and
//! scales `σᵢ²`:
//!
//! - `θ̄ = (1/m) Σ θᵢ`
//! - `W = (1/m) Σ Σᵢ`
//! - `B = (1/m) Σ (θᵢ − θ̄)(θᵢ − θ̄)ᵀ` (maximum-likelihood normalization)
//! - `T = W + (1 + 1/m)·B`
//! - pooled scale `= (1/m) Σ σᵢ²`
//!
//! `m < 2` is rejected: the between-repetition term is undefined.
use crate::imputation::errors::{MiceError, MiceResult};
use ndarray::{Array1, Array2, Axis};

/// Estimates recorded from one retained repetition.
#[derive(Debug, Clone, PartialEq)]
pub struct RepetitionEstimate {
    pub params: Array1<f64>,
    pub cov_params: Array2<f64>,
    pub scale: f64,
}

/// Result of [`combine_rubin`].
#[derive(Debug, Clone, PartialEq)]
pub struct RubinEstimate {
    pub params: Array1<f64>,
    pub within: Array2<f64>,
    pub between: Array2<f64>,
    pub total_cov: Array2<f64>,
    pub scale: f64,
    pub m: usize,
}

impl RubinEstimate {
    /// Pooled standard errors `sqrt(diag(T))`.
    pub fn bse(&self) -> Array1<f64> {
        self.total_cov.diag().mapv(f64::sqrt)
    }

    /// Relative increase in variance `(1 + 1/m)·diag(B) / diag(W)`.
    pub fn relative_increase_variance(&self) -> Array1<f64> {
        let inflation = 1.0 + 1.0 / self.m as f64;
        let b = self.between.diag();
        let w = self.within.diag();
        Array1::from_shape_fn(b.len(), |i| inflation * b[i] / w[i])
    }
}

/// Combine repetitions with Rubin's rules.
///
/// # Errors
/// - [`MiceError::InsufficientIterations`] if fewer than two repetitions.
/// - [`MiceError::RaggedEstimates`] if a repetition's parameter vector or
///   covariance does not match the first repetition's size.
pub fn combine_rubin(reps: &[RepetitionEstimate]) -> MiceResult<RubinEstimate> {
    let m = reps.len();
    if m < 2 {
        return Err(MiceError::InsufficientIterations { iterations: m });
    }
    let p = reps[0].params.len();
    for (index, rep) in reps.iter().enumerate() {
        if rep.params.len() != p {
            let actual = rep.params.len();
            return Err(MiceError::RaggedEstimates { index, expected: p, actual });
        }
        if rep.cov_params.dim() != (p, p) {
            let actual = rep.cov_params.nrows().max(rep.cov_params.ncols());
            return Err(MiceError::RaggedEstimates { index, expected: p, actual });
        }
    }

    let mf = m as f64;
    let mut params = Array1::<f64>::zeros(p);
    let mut within = Array2::<f64>::zeros((p, p));
    let mut scale = 0.0;
    for rep in reps {
        params += &rep.params;
        within += &rep.cov_params;
        scale += rep.scale;
    }
    params /= mf;
    within /= mf;
    scale /= mf;

    let mut between = Array2::<f64>::zeros((p, p));
    for rep in reps {
        let d = &rep.params - &params;
        let col = d.view().insert_axis(Axis(1));
        let row = d.view().insert_axis(Axis(0));
        between += &col.dot(&row);
    }
    between /= mf;

    let total_cov = &within + &(&between * (1.0 + 1.0 / mf));
    Ok(RubinEstimate { params, within, between, total_cov, scale, m })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imputation::errors::ErrorKind;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, Dimension, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - A hand-computed two-repetition combination.
    // - Rejection of fewer than two repetitions and of ragged inputs.
    // -------------------------------------------------------------------------

    fn assert_all_close<D: Dimension>(actual: &Array<f64, D>, expected: &Array<f64, D>) {
        assert_eq!(actual.shape(), expected.shape());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    fn rep(params: Array1<f64>, cov_params: Array2<f64>, scale: f64) -> RepetitionEstimate {
        RepetitionEstimate { params, cov_params, scale }
    }

    #[test]
    // Purpose
    // -------
    // Rubin's rules with ML-normalized between covariance match a hand
    // computation.
    //
    // Given
    // -----
    // - θ₁ = (1, 2), Σ₁ = diag(0.5, 1), σ₁² = 1.
    // - θ₂ = (3, 6), Σ₂ = diag(1.5, 3), σ₂² = 3.
    //
    // Expect
    // ------
    // - θ̄ = (2, 4), W = diag(1, 2), B = [[1, 2], [2, 4]],
    //   T = [[2.5, 3], [3, 8]], scale = 2, r = (1.5, 3).
    fn combine_rubin_matches_hand_computation() {
        // Arrange
        let reps = [
            rep(array![1.0, 2.0], array![[0.5, 0.0], [0.0, 1.0]], 1.0),
            rep(array![3.0, 6.0], array![[1.5, 0.0], [0.0, 3.0]], 3.0),
        ];

        // Act
        let est = combine_rubin(&reps).expect("two repetitions combine");

        // Assert
        assert_eq!(est.m, 2);
        assert_all_close(&est.params, &array![2.0, 4.0]);
        assert_all_close(&est.within, &array![[1.0, 0.0], [0.0, 2.0]]);
        assert_all_close(&est.between, &array![[1.0, 2.0], [2.0, 4.0]]);
        assert_all_close(&est.total_cov, &array![[2.5, 3.0], [3.0, 8.0]]);
        assert_abs_diff_eq!(est.scale, 2.0, epsilon = 1e-12);
        assert_all_close(&est.relative_increase_variance(), &array![1.5, 3.0]);
        assert_all_close(&est.bse(), &array![2.5_f64.sqrt(), 8.0_f64.sqrt()]);
    }

    #[test]
    // Purpose
    // -------
    // Fewer than two repetitions is a configuration error, never a zero B.
    //
    // Given
    // -----
    // - Zero and one repetition.
    //
    // Expect
    // ------
    // - `InsufficientIterations { 0 }` and `{ 1 }`, kind `Configuration`.
    fn combine_rubin_rejects_single_repetition() {
        // Arrange
        let one = [rep(array![1.0], array![[1.0]], 1.0)];

        // Act
        let e0 = combine_rubin(&[]).expect_err("no repetitions");
        let e1 = combine_rubin(&one).expect_err("one repetition");

        // Assert
        assert_eq!(e0, MiceError::InsufficientIterations { iterations: 0 });
        assert_eq!(e1, MiceError::InsufficientIterations { iterations: 1 });
        assert_eq!(e1.kind(), ErrorKind::Configuration);
    }

    #[test]
    // Purpose
    // -------
    // Repetitions of different sizes are reported with their index.
    //
    // Given
    // -----
    // - A 2-parameter repetition followed by a 1-parameter one.
    //
    // Expect
    // ------
    // - `RaggedEstimates { index: 1, expected: 2, actual: 1 }`.
    fn combine_rubin_rejects_ragged_repetitions() {
        // Arrange
        let reps = [
            rep(array![1.0, 2.0], Array2::eye(2), 1.0),
            rep(array![1.0], Array2::eye(1), 1.0),
        ];

        // Act
        let err = combine_rubin(&reps).expect_err("sizes differ");

        // Assert
        assert_eq!(err, MiceError::RaggedEstimates { index: 1, expected: 2, actual: 1 });
    }
}
