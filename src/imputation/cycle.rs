//! imputation::cycle — one full pass over all imputers.
//!
//! Purpose
//! -------
//! Fix the order in which variables are re-simulated and run each imputer
//! once per pass against the shared dataset.
//!
//! Key behaviors
//! -------------
//! - Imputers run in non-decreasing order of missing counts; ties keep the
//!   order in which they were supplied.
//! - Execution is sequential, so later imputers in a pass already see the
//!   values written by earlier ones in their predictor columns.
//! - The first failure aborts the pass and is returned unchanged; values
//!   written by imputers that already ran stay in place.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one imputer, at most one per variable, all bound to the same
//!   dataset instance.
use crate::imputation::{
    dataset::{DatasetId, ImputedDataset},
    errors::{MiceError, MiceResult},
    imputer::VariableImputer,
};
use rand::RngCore;

#[derive(Debug, Clone)]
pub struct ImputationCycle {
    dataset: DatasetId,
    imputers: Vec<VariableImputer>,
}

impl ImputationCycle {
    /// Order `imputers` for `dataset`.
    ///
    /// # Errors
    /// - [`MiceError::NoImputers`] for an empty list.
    /// - [`MiceError::ForeignImputer`] if an imputer belongs to another dataset.
    /// - [`MiceError::DuplicateImputer`] if two imputers share a variable.
    pub fn new(dataset: &ImputedDataset, mut imputers: Vec<VariableImputer>) -> MiceResult<Self> {
        if imputers.is_empty() {
            return Err(MiceError::NoImputers);
        }
        for (i, imputer) in imputers.iter().enumerate() {
            if imputer.dataset_id() != dataset.id() {
                return Err(MiceError::ForeignImputer { variable: imputer.variable().to_string() });
            }
            if imputers[..i].iter().any(|other| other.variable() == imputer.variable()) {
                return Err(MiceError::DuplicateImputer {
                    variable: imputer.variable().to_string(),
                });
            }
        }
        imputers.sort_by_key(VariableImputer::num_missing);
        Ok(Self { dataset: dataset.id(), imputers })
    }

    /// Run every imputer once, in order, and hand back the updated dataset.
    ///
    /// # Errors
    /// The first error raised by an imputer.
    pub fn run_once<'d>(
        &self, data: &'d mut ImputedDataset, rng: &mut dyn RngCore,
    ) -> MiceResult<&'d ImputedDataset> {
        for imputer in &self.imputers {
            imputer.simulate(data, rng)?;
        }
        Ok(data)
    }

    /// Variables in execution order.
    pub fn order(&self) -> Vec<&str> {
        self.imputers.iter().map(VariableImputer::variable).collect()
    }

    pub fn imputers(&self) -> &[VariableImputer] {
        &self.imputers
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset
    }
}
