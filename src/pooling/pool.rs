//! pooling::pool — analysis fits over retained datasets and their pooling.
//!
//! Purpose
//! -------
//! Fit the analysis model on each dataset a scheduler retains, keep the
//! per-repetition estimates, and combine them with Rubin's rules into one
//! fitted model.
//!
//! Key behaviors
//! -------------
//! - [`Pool::step`] pulls one retained dataset, fits the analysis model on
//!   every row, and appends the estimate. A failed step appends nothing, so
//!   a run may be stopped between steps with the accumulated state intact.
//! - [`Pool::run`] checks `iterations ≥ 2`, discards anything recorded
//!   earlier, steps that many times, then combines. The pooled `m` is
//!   therefore always `iterations`; `step` + `combine` is the incremental
//!   alternative.
//! - [`Pool::combine`] writes the pooled parameters, total covariance and
//!   mean scale into a copy of the last repetition's fitted model.
//!
//! Invariants & assumptions
//! ------------------------
//! - Within a run, accumulation is append-only; a failure aborts the run and
//!   is reported with the 0-based repetition index. No repetition is skipped.
use crate::{
    imputation::{
        dataset::{ImputedDataset, RowSelection},
        errors::{MiceError, MiceResult},
        scheduler::ImputationScheduler,
    },
    models::{
        errors::ModelError,
        formula::Formula,
        options::{FitOptions, InitOptions},
        traits::{FittedModel, ModelProvider},
    },
    pooling::rubin::{RepetitionEstimate, RubinEstimate, combine_rubin},
};
use ndarray::Array1;
use rand::RngCore;
use std::sync::Arc;

/// The model whose estimates are pooled.
#[derive(Debug, Clone)]
pub struct AnalysisModel {
    formula: Formula,
    provider: Arc<dyn ModelProvider>,
    init: InitOptions,
    fit: FitOptions,
}

impl AnalysisModel {
    pub fn new(formula: Formula, provider: Arc<dyn ModelProvider>) -> Self {
        Self::with_options(formula, provider, InitOptions::default(), FitOptions::default())
    }

    pub fn with_options(
        formula: Formula, provider: Arc<dyn ModelProvider>, init: InitOptions, fit: FitOptions,
    ) -> Self {
        Self { formula, provider, init, fit }
    }

    /// Parse `text` as the analysis formula.
    ///
    /// # Errors
    /// [`MiceError::InvalidFormula`] if `text` does not parse.
    pub fn parse(text: &str, provider: Arc<dyn ModelProvider>) -> MiceResult<Self> {
        let formula = Formula::parse(text).map_err(|source| MiceError::InvalidFormula { source })?;
        Ok(Self::new(formula, provider))
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    /// Check that every column the formula names exists in `data`.
    ///
    /// # Errors
    /// [`MiceError::InvalidFormula`] naming the first unknown column.
    pub fn check_columns(&self, data: &ImputedDataset) -> MiceResult<()> {
        let exog = self.formula.exog().iter().map(String::as_str);
        for name in std::iter::once(self.formula.endog()).chain(exog) {
            if data.column_index(name).is_err() {
                return Err(MiceError::InvalidFormula {
                    source: ModelError::UnknownColumn { name: name.to_string() },
                });
            }
        }
        Ok(())
    }

    /// Fit on every row of `data`.
    ///
    /// # Errors
    /// - [`MiceError::InvalidFormula`] if the formula names an unknown column.
    /// - [`MiceError::AnalysisFit`] if the provider fails.
    pub fn fit(&self, data: &ImputedDataset) -> MiceResult<Box<dyn FittedModel>> {
        let frame = data.model_frame(&self.formula, RowSelection::All)?;
        self.provider
            .fit(&frame, &self.init, &self.fit)
            .map_err(|source| MiceError::AnalysisFit { source })
    }
}

/// Pooled analysis model and the Rubin combination behind it.
#[derive(Debug, Clone)]
pub struct PooledFit {
    pub model: Box<dyn FittedModel>,
    pub estimate: RubinEstimate,
}

impl PooledFit {
    pub fn params(&self) -> &Array1<f64> {
        self.model.params()
    }

    pub fn bse(&self) -> Array1<f64> {
        self.model.bse()
    }
}

#[derive(Debug)]
pub struct Pool {
    analysis: AnalysisModel,
    repetitions: Vec<RepetitionEstimate>,
    last: Option<Box<dyn FittedModel>>,
}

impl Pool {
    pub fn new(analysis: AnalysisModel) -> Self {
        Self { analysis, repetitions: Vec::new(), last: None }
    }

    /// Run one retained repetition and record its estimate.
    ///
    /// # Errors
    /// Scheduler and analysis-fit errors, wrapped as
    /// [`MiceError::Repetition`] with the index this repetition would have.
    pub fn step<R: RngCore>(
        &mut self, scheduler: &mut ImputationScheduler<R>,
    ) -> MiceResult<&RepetitionEstimate> {
        let index = self.repetitions.len();
        let fitted = scheduler
            .next_dataset()
            .and_then(|data| self.analysis.fit(data))
            .map_err(|e| e.in_repetition(index))?;

        let estimate = RepetitionEstimate {
            params: fitted.params().clone(),
            cov_params: fitted.cov_params().clone(),
            scale: fitted.scale(),
        };
        if let Some(first) = self.repetitions.first() {
            let expected = first.params.len();
            if estimate.params.len() != expected {
                let actual = estimate.params.len();
                return Err(MiceError::RaggedEstimates { index, expected, actual }
                    .in_repetition(index));
            }
        }

        tracing::debug!(
            repetition = index,
            cycle = scheduler.cycles_completed(),
            "analysis model fitted"
        );
        self.repetitions.push(estimate);
        self.last = Some(fitted);
        Ok(&self.repetitions[index])
    }

    /// Pool exactly `iterations` fresh repetitions.
    ///
    /// Estimates recorded by earlier calls are discarded first; the
    /// scheduler keeps advancing, so the new repetitions are later datasets.
    ///
    /// # Errors
    /// - [`MiceError::InsufficientIterations`] if `iterations < 2`, before
    ///   any cycle runs or any estimate is discarded.
    /// - Any error from [`Pool::step`] or [`Pool::combine`].
    pub fn run<R: RngCore>(
        &mut self, scheduler: &mut ImputationScheduler<R>, iterations: usize,
    ) -> MiceResult<PooledFit> {
        if iterations < 2 {
            return Err(MiceError::InsufficientIterations { iterations });
        }
        self.clear();
        for _ in 0..iterations {
            self.step(scheduler)?;
        }
        self.combine()
    }

    /// Rubin-combine the recorded repetitions.
    ///
    /// # Errors
    /// - [`MiceError::InsufficientIterations`] with fewer than two repetitions.
    /// - [`MiceError::AnalysisFit`] if the model rejects the pooled values.
    pub fn combine(&self) -> MiceResult<PooledFit> {
        let estimate = combine_rubin(&self.repetitions)?;
        let mut model = match &self.last {
            Some(last) => last.boxed_clone(),
            None => return Err(MiceError::InsufficientIterations { iterations: 0 }),
        };
        model
            .set_pooled(estimate.params.clone(), estimate.total_cov.clone(), estimate.scale)
            .map_err(|source| MiceError::AnalysisFit { source })?;
        tracing::info!(repetitions = estimate.m, "pooled analysis estimates");
        Ok(PooledFit { model, estimate })
    }

    /// Drop every recorded repetition.
    pub fn clear(&mut self) {
        self.repetitions.clear();
        self.last = None;
    }

    pub fn analysis(&self) -> &AnalysisModel {
        &self.analysis
    }

    pub fn repetitions(&self) -> &[RepetitionEstimate] {
        &self.repetitions
    }

    pub fn len(&self) -> usize {
        self.repetitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repetitions.is_empty()
    }
}
