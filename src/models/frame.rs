//! models::frame — materialize a formula against a numeric table.
//!
//! Purpose
//! -------
//! Turn a [`Formula`] plus a named `rows × columns` table into the response
//! vector and design matrix a provider fits on, restricted to a row subset.
//!
//! Invariants & assumptions
//! ------------------------
//! - The design has [`Formula::width`] columns in [`Formula::design_names`]
//!   order; the intercept (if any) is a column of ones in position 0.
//! - Every value that enters a frame is finite; a NaN or ±inf is reported
//!   with the offending table row.
//! - `rows` are kept in the order given and recorded on the frame.
use crate::models::{
    errors::{ModelError, ModelResult},
    formula::Formula,
};
use ndarray::{Array1, Array2, ArrayView2};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelFrame {
    pub formula: Formula,
    pub endog: Array1<f64>,
    pub exog: Array2<f64>,
    pub exog_names: Vec<String>,
    pub rows: Vec<usize>,
}

impl ModelFrame {
    /// Build the response and design for `rows` of `table`.
    ///
    /// # Errors
    /// - [`ModelError::UnknownColumn`] if a formula name is not in `names`.
    /// - [`ModelError::NonFiniteInput`] if a selected cell is not finite.
    pub fn build(
        formula: &Formula, names: &[String], table: ArrayView2<'_, f64>, rows: &[usize],
    ) -> ModelResult<Self> {
        let target = column_index(names, formula.endog())?;
        let mut endog = Array1::zeros(rows.len());
        for (slot, &row) in endog.iter_mut().zip(rows) {
            let value = table[[row, target]];
            if !value.is_finite() {
                return Err(ModelError::NonFiniteInput { row });
            }
            *slot = value;
        }
        let exog = design_matrix(formula, names, table, rows)?;
        Ok(Self {
            formula: formula.clone(),
            endog,
            exog,
            exog_names: formula.design_names(),
            rows: rows.to_vec(),
        })
    }

    pub fn nobs(&self) -> usize {
        self.endog.len()
    }
}

/// Design matrix of `formula` for `rows` of `table`, without a response.
///
/// # Errors
/// Same as [`ModelFrame::build`] for the exogenous columns.
pub fn design_matrix(
    formula: &Formula, names: &[String], table: ArrayView2<'_, f64>, rows: &[usize],
) -> ModelResult<Array2<f64>> {
    let offset = usize::from(formula.has_intercept());
    let cols = formula
        .exog()
        .iter()
        .map(|name| column_index(names, name))
        .collect::<ModelResult<Vec<_>>>()?;

    let mut exog = Array2::zeros((rows.len(), formula.width()));
    for (i, &row) in rows.iter().enumerate() {
        if offset == 1 {
            exog[[i, 0]] = 1.0;
        }
        for (j, &col) in cols.iter().enumerate() {
            let value = table[[row, col]];
            if !value.is_finite() {
                return Err(ModelError::NonFiniteInput { row });
            }
            exog[[i, j + offset]] = value;
        }
    }
    Ok(exog)
}

fn column_index(names: &[String], name: &str) -> ModelResult<usize> {
    names
        .iter()
        .position(|n| n == name)
        .ok_or_else(|| ModelError::UnknownColumn { name: name.to_string() })
}
