//! imputation::scheduler — burn-in and thinning over repeated cycles.
//!
//! Purpose
//! -------
//! Own the working dataset, the cycle and the random generator, and hand out
//! retained datasets on request.
//!
//! Key behaviors
//! -------------
//! - State machine with two states:
//!   - [`SchedulerState::Warming`]: the first request runs `burn_in` cycles
//!     and moves to `Cycling`. This happens once per scheduler.
//!   - [`SchedulerState::Cycling`]: every request runs `skip` cycles and
//!     returns the dataset as left by the last of them.
//! - The N-th retained dataset therefore reflects exactly `burn_in + N·skip`
//!   cycles since construction.
//! - Errors from a cycle propagate unchanged. Cycles finished before the
//!   failure still count, so a retried request runs only the cycles its
//!   target is missing and the accounting above still holds.
//!
//! Conventions
//! -----------
//! - The generator is explicit. [`ImputationScheduler::new`] seeds a
//!   [`StdRng`] (from entropy when no seed is given); any other [`RngCore`]
//!   can be supplied through [`ImputationScheduler::with_rng`].
use crate::imputation::{
    cycle::ImputationCycle,
    dataset::ImputedDataset,
    errors::{MiceError, MiceResult},
    options::SchedulerOptions,
};
use rand::{RngCore, SeedableRng, rngs::StdRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Warming,
    Cycling,
}

#[derive(Debug)]
pub struct ImputationScheduler<R: RngCore = StdRng> {
    dataset: ImputedDataset,
    cycle: ImputationCycle,
    options: SchedulerOptions,
    rng: R,
    state: SchedulerState,
    cycles_completed: usize,
    retained: usize,
}

impl ImputationScheduler<StdRng> {
    /// Scheduler with a [`StdRng`] seeded from `seed`, or from entropy.
    ///
    /// # Errors
    /// See [`ImputationScheduler::with_rng`].
    pub fn new(
        dataset: ImputedDataset, cycle: ImputationCycle, options: SchedulerOptions,
        seed: Option<u64>,
    ) -> MiceResult<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(dataset, cycle, options, rng)
    }
}

impl<R: RngCore> ImputationScheduler<R> {
    /// # Errors
    /// - [`MiceError::InvalidSkip`] for `skip == 0`.
    /// - [`MiceError::ForeignImputer`] if `cycle` was built for another dataset.
    pub fn with_rng(
        dataset: ImputedDataset, cycle: ImputationCycle, options: SchedulerOptions, rng: R,
    ) -> MiceResult<Self> {
        options.validate()?;
        if cycle.dataset_id() != dataset.id() {
            let variable = cycle.order().first().map(|v| v.to_string()).unwrap_or_default();
            return Err(MiceError::ForeignImputer { variable });
        }
        Ok(Self {
            dataset,
            cycle,
            options,
            rng,
            state: SchedulerState::Warming,
            cycles_completed: 0,
            retained: 0,
        })
    }

    /// Advance to the next retained dataset.
    ///
    /// # Errors
    /// Any error raised while running a cycle.
    pub fn next_dataset(&mut self) -> MiceResult<&ImputedDataset> {
        let SchedulerOptions { burn_in, skip } = self.options;
        if self.state == SchedulerState::Warming {
            while self.cycles_completed < burn_in {
                self.run_cycle()?;
            }
            self.state = SchedulerState::Cycling;
            tracing::info!(burn_in, "burn-in complete");
        }
        let target = burn_in + (self.retained + 1) * skip;
        while self.cycles_completed < target {
            self.run_cycle()?;
        }
        self.retained += 1;
        tracing::debug!(
            retained = self.retained,
            cycle = self.cycles_completed,
            "retained imputed dataset"
        );
        Ok(&self.dataset)
    }

    fn run_cycle(&mut self) -> MiceResult<()> {
        self.cycle.run_once(&mut self.dataset, &mut self.rng)?;
        self.cycles_completed += 1;
        tracing::debug!(cycle = self.cycles_completed, "imputation cycle finished");
        Ok(())
    }

    pub fn dataset(&self) -> &ImputedDataset {
        &self.dataset
    }

    pub fn cycle(&self) -> &ImputationCycle {
        &self.cycle
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Cycles run since construction, burn-in included.
    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed
    }

    /// Datasets handed out so far.
    pub fn retained(&self) -> usize {
        self.retained
    }

    pub fn into_dataset(self) -> ImputedDataset {
        self.dataset
    }
}
