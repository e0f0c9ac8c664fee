//! pooling::mice — one-call driver for a full imputation-and-pooling run.
//!
//! [`Mice`] wires a dataset, its imputers and an analysis model into a
//! seeded [`ImputationScheduler`] and a [`Pool`], with every option checked
//! up front.
use crate::{
    imputation::{
        cycle::ImputationCycle,
        dataset::ImputedDataset,
        errors::{MiceError, MiceResult},
        imputer::VariableImputer,
        options::SchedulerOptions,
        scheduler::ImputationScheduler,
    },
    pooling::{
        pool::{AnalysisModel, Pool, PooledFit},
        rubin::RepetitionEstimate,
    },
};

/// Options of a full run.
///
/// Default: 20 iterations, default scheduler options, entropy seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiceOptions {
    pub iterations: usize,
    pub scheduler: SchedulerOptions,
    pub seed: Option<u64>,
}

impl MiceOptions {
    /// # Errors
    /// [`MiceError::InsufficientIterations`] or [`MiceError::InvalidSkip`].
    pub fn new(
        iterations: usize, scheduler: SchedulerOptions, seed: Option<u64>,
    ) -> MiceResult<Self> {
        let opts = Self { iterations, scheduler, seed };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> MiceResult<()> {
        if self.iterations < 2 {
            return Err(MiceError::InsufficientIterations { iterations: self.iterations });
        }
        self.scheduler.validate()
    }
}

impl Default for MiceOptions {
    fn default() -> Self {
        Self { iterations: 20, scheduler: SchedulerOptions::default(), seed: None }
    }
}

#[derive(Debug)]
pub struct Mice {
    scheduler: ImputationScheduler,
    pool: Pool,
    options: MiceOptions,
}

impl Mice {
    /// # Errors
    /// Option validation, [`AnalysisModel::check_columns`], and the checks
    /// of [`ImputationCycle::new`].
    pub fn new(
        dataset: ImputedDataset, imputers: Vec<VariableImputer>, analysis: AnalysisModel,
        options: MiceOptions,
    ) -> MiceResult<Self> {
        options.validate()?;
        analysis.check_columns(&dataset)?;
        let cycle = ImputationCycle::new(&dataset, imputers)?;
        let scheduler =
            ImputationScheduler::new(dataset, cycle, options.scheduler, options.seed)?;
        Ok(Self { scheduler, pool: Pool::new(analysis), options })
    }

    /// Run `options.iterations` fresh repetitions and pool exactly those.
    ///
    /// Repetitions recorded by earlier `run` or [`Mice::step`] calls are
    /// discarded; the scheduler continues from where it stopped.
    pub fn run(&mut self) -> MiceResult<PooledFit> {
        self.pool.run(&mut self.scheduler, self.options.iterations)
    }

    /// One more repetition, kept for a later [`Mice::combine`].
    pub fn step(&mut self) -> MiceResult<&RepetitionEstimate> {
        self.pool.step(&mut self.scheduler)
    }

    pub fn combine(&self) -> MiceResult<PooledFit> {
        self.pool.combine()
    }

    pub fn scheduler(&self) -> &ImputationScheduler {
        &self.scheduler
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn options(&self) -> &MiceOptions {
        &self.options
    }

    pub fn into_dataset(self) -> ImputedDataset {
        self.scheduler.into_dataset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imputation::errors::ErrorKind;

    #[test]
    // Purpose
    // -------
    // Run options are validated at construction.
    //
    // Given
    // -----
    // - `iterations = 1`, `skip = 0`, and the defaults.
    //
    // Expect
    // ------
    // - Configuration errors for the first two; `(20, 5, 10, None)` defaults.
    fn mice_options_validate() {
        // Act
        let few = MiceOptions::new(1, SchedulerOptions::default(), None);
        let skip = MiceOptions::new(2, SchedulerOptions { burn_in: 0, skip: 0 }, None);
        let default = MiceOptions::default();

        // Assert
        assert_eq!(few, Err(MiceError::InsufficientIterations { iterations: 1 }));
        assert_eq!(skip.map_err(|e| e.kind()), Err(ErrorKind::Configuration));
        assert_eq!(default.iterations, 20);
        assert_eq!(default.scheduler, SchedulerOptions { burn_in: 5, skip: 10 });
        assert_eq!(default.seed, None);
    }
}
