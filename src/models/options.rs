//! Options passed through to model providers at fit time.
use crate::optimization::loglik_optimizer::MLEOptions;
use ndarray::Array1;

/// Model-initialization options.
///
/// `start_params` seeds iterative providers; when `None` they start from
/// zeros. Closed-form providers ignore it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitOptions {
    pub start_params: Option<Array1<f64>>,
}

impl InitOptions {
    pub fn with_start_params(start_params: Array1<f64>) -> Self {
        Self { start_params: Some(start_params) }
    }
}

/// Fit-time options.
///
/// `mle_opts` configures the L-BFGS run of iterative providers (tolerances,
/// line search, history size, verbosity). Closed-form providers ignore it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitOptions {
    pub mle_opts: MLEOptions,
}

impl FitOptions {
    pub fn new(mle_opts: MLEOptions) -> Self {
        Self { mle_opts }
    }
}
