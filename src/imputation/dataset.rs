//! imputation::dataset — the working table shared by all imputers.
//!
//! Purpose
//! -------
//! Own the numeric table that chained imputation mutates. Missing cells are
//! remembered per variable in a [`MissingnessIndex`] and immediately
//! mean-filled, so every column is usable as a regressor before any imputer
//! has run.
//!
//! Key behaviors
//! -------------
//! - [`ImputedDataset::new`] validates the raw table (NaN marks missing),
//!   builds one index per column, and mean-fills.
//! - [`ImputedDataset::write`] overwrites exactly the missing rows of one
//!   variable, in index order; nothing else is touched and there is no
//!   staging step.
//! - Read helpers return the observed rows, the whole table, or a
//!   [`ModelFrame`] / design matrix for a formula.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every variable has at least one observed value.
//! - After construction the table holds only finite values.
//! - Each dataset carries a process-unique [`DatasetId`]; cloning produces a
//!   new id, so imputers built for one instance are rejected by another.
//!
//! Conventions
//! -----------
//! - Rows and columns are 0-based; columns are addressed by name.
use crate::{
    imputation::{
        errors::{MiceError, MiceResult},
        imputer::VariableImputer,
        missingness::MissingnessIndex,
        options::ImputerOptions,
    },
    models::{
        errors::ModelError,
        formula::Formula,
        frame::{ModelFrame, design_matrix},
        traits::ModelProvider,
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one [`ImputedDataset`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(u64);

impl DatasetId {
    fn next() -> Self {
        DatasetId(NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which rows of a variable a frame should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    Observed,
    Missing,
    All,
}

#[derive(Debug)]
pub struct ImputedDataset {
    id: DatasetId,
    names: Vec<String>,
    table: Array2<f64>,
    indices: Vec<MissingnessIndex>,
}

impl ImputedDataset {
    /// Build the working dataset from a raw table with NaN for missing cells.
    ///
    /// # Errors
    /// - [`MiceError::EmptyTable`] for zero rows or columns.
    /// - [`MiceError::ColumnCountMismatch`] / [`MiceError::DuplicateColumn`]
    ///   for bad column names.
    /// - [`MiceError::NonFiniteValue`] for ±inf cells.
    /// - [`MiceError::EmptyObservedSet`] if a column is entirely NaN.
    pub fn new(mut table: Array2<f64>, names: Vec<String>) -> MiceResult<Self> {
        let (nrows, ncols) = table.dim();
        if nrows == 0 || ncols == 0 {
            return Err(MiceError::EmptyTable);
        }
        if names.len() != ncols {
            return Err(MiceError::ColumnCountMismatch { names: names.len(), columns: ncols });
        }
        for (j, name) in names.iter().enumerate() {
            if names[..j].contains(name) {
                return Err(MiceError::DuplicateColumn { name: name.clone() });
            }
        }
        for ((row, col), &value) in table.indexed_iter() {
            if value.is_infinite() {
                return Err(MiceError::NonFiniteValue {
                    variable: names[col].clone(),
                    row,
                    value,
                });
            }
        }

        let mut indices = Vec::with_capacity(ncols);
        for (j, mut column) in table.axis_iter_mut(Axis(1)).enumerate() {
            let index = MissingnessIndex::from_column(column.view());
            if index.num_observed() == 0 {
                return Err(MiceError::EmptyObservedSet { variable: names[j].clone() });
            }
            let mean = index.observed_rows().iter().map(|&r| column[r]).sum::<f64>()
                / index.num_observed() as f64;
            for &row in index.missing_rows() {
                column[row] = mean;
            }
            indices.push(index);
        }

        let missing_cells: usize = indices.iter().map(MissingnessIndex::num_missing).sum();
        tracing::debug!(rows = nrows, columns = ncols, missing_cells, "dataset constructed");
        Ok(Self { id: DatasetId::next(), names, table, indices })
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn nrows(&self) -> usize {
        self.table.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.table.ncols()
    }

    /// Column position of `variable`.
    pub fn column_index(&self, variable: &str) -> MiceResult<usize> {
        self.names
            .iter()
            .position(|n| n == variable)
            .ok_or_else(|| MiceError::UnknownVariable { name: variable.to_string() })
    }

    pub fn index(&self, variable: &str) -> MiceResult<&MissingnessIndex> {
        Ok(&self.indices[self.column_index(variable)?])
    }

    /// `(name, index)` pairs in column order.
    pub fn indices(&self) -> impl Iterator<Item = (&str, &MissingnessIndex)> {
        self.names.iter().map(String::as_str).zip(self.indices.iter())
    }

    /// Overwrite the missing rows of `variable` with `values`, in row order.
    ///
    /// # Errors
    /// - [`MiceError::UnknownVariable`] for an unknown name.
    /// - [`MiceError::ShapeMismatch`] if `values.len()` differs from the
    ///   missing-row count.
    pub fn write(&mut self, variable: &str, values: &[f64]) -> MiceResult<()> {
        let col = self.column_index(variable)?;
        let missing = self.indices[col].missing_rows();
        if values.len() != missing.len() {
            return Err(MiceError::ShapeMismatch {
                variable: variable.to_string(),
                expected: missing.len(),
                actual: values.len(),
            });
        }
        let mut column = self.table.column_mut(col);
        for (&row, &value) in missing.iter().zip(values) {
            column[row] = value;
        }
        Ok(())
    }

    pub fn column(&self, variable: &str) -> MiceResult<ArrayView1<'_, f64>> {
        Ok(self.table.column(self.column_index(variable)?))
    }

    /// All columns, restricted to the rows observed for `variable`.
    pub fn read_observed(&self, variable: &str) -> MiceResult<Array2<f64>> {
        let rows = self.index(variable)?.observed_rows();
        Ok(self.table.select(Axis(0), rows))
    }

    /// The full current table.
    pub fn read_all(&self) -> ArrayView2<'_, f64> {
        self.table.view()
    }

    /// Current values of `variable` at its missing rows.
    pub fn imputed_values(&self, variable: &str) -> MiceResult<Array1<f64>> {
        let col = self.column(variable)?;
        let rows = self.index(variable)?.missing_rows();
        Ok(rows.iter().map(|&r| col[r]).collect())
    }

    /// Rows of `selection`, relative to the missingness of `formula`'s response.
    pub fn rows_for(&self, formula: &Formula, selection: RowSelection) -> MiceResult<Vec<usize>> {
        Ok(match selection {
            RowSelection::All => (0..self.nrows()).collect(),
            RowSelection::Observed => self.index(formula.endog())?.observed_rows().to_vec(),
            RowSelection::Missing => self.index(formula.endog())?.missing_rows().to_vec(),
        })
    }

    /// Model frame of `formula` over the selected rows.
    ///
    /// # Errors
    /// - [`MiceError::InvalidFormula`] if the formula names an unknown column.
    /// - [`MiceError::NonFiniteValue`] if a selected cell is not finite.
    pub fn model_frame(
        &self, formula: &Formula, selection: RowSelection,
    ) -> MiceResult<ModelFrame> {
        let rows = self.rows_for(formula, selection)?;
        ModelFrame::build(formula, &self.names, self.table.view(), &rows)
            .map_err(|source| self.frame_error(formula, source))
    }

    /// Design matrix of `formula` over the selected rows.
    pub fn design(&self, formula: &Formula, selection: RowSelection) -> MiceResult<Array2<f64>> {
        let rows = self.rows_for(formula, selection)?;
        design_matrix(formula, &self.names, self.table.view(), &rows)
            .map_err(|source| self.frame_error(formula, source))
    }

    /// Frame failures on a non-finite cell are data errors naming the cell;
    /// the rest are formula errors.
    fn frame_error(&self, formula: &Formula, source: ModelError) -> MiceError {
        let ModelError::NonFiniteInput { row } = source else {
            return MiceError::InvalidFormula { source };
        };
        let exog = formula.exog().iter().map(String::as_str);
        std::iter::once(formula.endog())
            .chain(exog)
            .find_map(|name| {
                let col = self.column_index(name).ok()?;
                let value = self.table[[row, col]];
                (!value.is_finite()).then(|| MiceError::NonFiniteValue {
                    variable: name.to_string(),
                    row,
                    value,
                })
            })
            .unwrap_or(MiceError::InvalidFormula { source })
    }

    /// `(endog_obs, exog_obs, exog_miss)` for `formula`'s response.
    pub fn split_for_formula(
        &self, formula: &Formula,
    ) -> MiceResult<(Array1<f64>, Array2<f64>, Array2<f64>)> {
        let observed = self.model_frame(formula, RowSelection::Observed)?;
        let exog_miss = self.design(formula, RowSelection::Missing)?;
        Ok((observed.endog, observed.exog, exog_miss))
    }

    /// Build an imputer for `endog` on this dataset.
    ///
    /// With `predictors = None` the conditional formula regresses `endog` on
    /// every other column with an intercept.
    ///
    /// # Errors
    /// Formula construction and the checks of [`VariableImputer::new`].
    pub fn new_imputer(
        &self, endog: &str, predictors: Option<&[&str]>, provider: Arc<dyn ModelProvider>,
        options: ImputerOptions,
    ) -> MiceResult<VariableImputer> {
        self.column_index(endog)?;
        let formula = match predictors {
            Some(cols) => {
                Formula::new(endog, cols.iter().map(|c| c.to_string()).collect(), true)
            }
            None => Formula::all_others(endog, &self.names),
        }
        .map_err(|source| MiceError::InvalidFormula { source })?;
        VariableImputer::new(self, formula, provider, options)
    }
}

impl Clone for ImputedDataset {
    /// Deep copy with a fresh [`DatasetId`].
    fn clone(&self) -> Self {
        Self {
            id: DatasetId::next(),
            names: self.names.clone(),
            table: self.table.clone(),
            indices: self.indices.clone(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::imputation::errors::ErrorKind;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction: mean-filling and rejection of malformed tables.
    // - `write` semantics: exact rows, order preservation, shape checks.
    // - Read helpers, the formula split, and frame error mapping.
    // - Fresh identity on clone.
    // -------------------------------------------------------------------------

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> ImputedDataset {
        let nan = f64::NAN;
        let table = array![[1.0, 10.0], [nan, 20.0], [3.0, nan], [nan, 40.0], [5.0, 50.0]];
        ImputedDataset::new(table, names(&["x", "y"])).expect("valid dataset")
    }

    #[test]
    // Purpose
    // -------
    // Missing cells are filled with the observed column mean.
    //
    // Given
    // -----
    // - x observed at rows 0, 2, 4 (mean 3); y observed at 0, 1, 3, 4 (mean 30).
    //
    // Expect
    // ------
    // - x[1] = x[3] = 3, y[2] = 30, observed cells unchanged.
    fn new_mean_fills_missing_cells() {
        // Act
        let ds = sample();

        // Assert
        let x = ds.column("x").expect("x exists");
        let y = ds.column("y").expect("y exists");
        assert_abs_diff_eq!(x[1], 3.0);
        assert_abs_diff_eq!(x[3], 3.0);
        assert_abs_diff_eq!(y[2], 30.0);
        assert_eq!(x[0], 1.0);
        assert_eq!(ds.index("x").expect("x exists").missing_rows(), &[1, 3]);
        assert!(ds.read_all().iter().all(|v| v.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Malformed tables are rejected with data or empty-set errors.
    //
    // Given
    // -----
    // - An all-NaN column, an infinite cell, duplicate names, a name count
    //   mismatch, and a zero-row table.
    //
    // Expect
    // ------
    // - `EmptyObservedSet`, `NonFiniteValue`, `DuplicateColumn`,
    //   `ColumnCountMismatch`, `EmptyTable`.
    fn new_rejects_malformed_tables() {
        // Arrange
        let nan = f64::NAN;

        // Act
        let empty_obs = ImputedDataset::new(array![[1.0, nan], [2.0, nan]], names(&["a", "b"]));
        let inf = ImputedDataset::new(array![[1.0, f64::INFINITY]], names(&["a", "b"]));
        let dup = ImputedDataset::new(array![[1.0, 2.0]], names(&["a", "a"]));
        let count = ImputedDataset::new(array![[1.0, 2.0]], names(&["a"]));
        let rows = ImputedDataset::new(Array2::zeros((0, 2)), names(&["a", "b"]));

        // Assert
        let err = empty_obs.expect_err("b is never observed");
        assert_eq!(err, MiceError::EmptyObservedSet { variable: "b".to_string() });
        assert_eq!(err.kind(), ErrorKind::EmptyObservedSet);
        assert!(matches!(inf, Err(MiceError::NonFiniteValue { row: 0, .. })));
        assert_eq!(dup.err(), Some(MiceError::DuplicateColumn { name: "a".to_string() }));
        assert_eq!(count.err(), Some(MiceError::ColumnCountMismatch { names: 1, columns: 2 }));
        assert_eq!(rows.err(), Some(MiceError::EmptyTable));
    }

    #[test]
    // Purpose
    // -------
    // `write` touches exactly the missing rows, in order.
    //
    // Given
    // -----
    // - Writing (7, 9) to x, whose missing rows are [1, 3].
    //
    // Expect
    // ------
    // - x = (1, 7, 3, 9, 5); y unchanged; reading the imputed slots returns
    //   the written values.
    fn write_overwrites_only_missing_rows() {
        // Arrange
        let mut ds = sample();
        let y_before = ds.column("y").expect("y exists").to_owned();

        // Act
        ds.write("x", &[7.0, 9.0]).expect("shape matches");

        // Assert
        assert_eq!(ds.column("x").expect("x exists"), array![1.0, 7.0, 3.0, 9.0, 5.0]);
        assert_eq!(ds.column("y").expect("y exists"), y_before);
        assert_eq!(ds.imputed_values("x").expect("x exists"), array![7.0, 9.0]);
    }

    #[test]
    // Purpose
    // -------
    // Wrong-length writes and unknown names are reported, not applied.
    //
    // Given
    // -----
    // - Three values for x (two missing) and a write to `z`.
    //
    // Expect
    // ------
    // - `ShapeMismatch { expected: 2, actual: 3 }`, `UnknownVariable`, and an
    //   unchanged table.
    fn write_rejects_wrong_length() {
        // Arrange
        let mut ds = sample();
        let before = ds.read_all().to_owned();

        // Act
        let e1 = ds.write("x", &[1.0, 2.0, 3.0]);
        let e2 = ds.write("z", &[]);

        // Assert
        assert_eq!(
            e1,
            Err(MiceError::ShapeMismatch { variable: "x".to_string(), expected: 2, actual: 3 })
        );
        assert_eq!(e1.expect_err("mismatch").kind(), ErrorKind::ShapeMismatch);
        assert_eq!(e2, Err(MiceError::UnknownVariable { name: "z".to_string() }));
        assert_eq!(ds.read_all(), before);
    }

    #[test]
    // Purpose
    // -------
    // The formula split separates observed fitting data from missing rows.
    //
    // Given
    // -----
    // - `y ~ x` on the sample (y missing at row 2 only).
    //
    // Expect
    // ------
    // - 4 observed responses, a 4×2 observed design, and a 1×2 missing
    //   design [1, 3]; `read_observed` has the same 4 rows.
    fn split_for_formula_partitions_rows() {
        // Arrange
        let ds = sample();
        let formula = Formula::parse("y ~ x").expect("valid formula");

        // Act
        let (endog_obs, exog_obs, exog_miss) = ds.split_for_formula(&formula).expect("splits");

        // Assert
        assert_eq!(endog_obs, array![10.0, 20.0, 40.0, 50.0]);
        assert_eq!(exog_obs.dim(), (4, 2));
        assert_eq!(exog_miss, array![[1.0, 3.0]]);
        assert_eq!(ds.read_observed("y").expect("y exists").nrows(), 4);
        assert!(matches!(
            ds.design(&Formula::parse("y ~ q").expect("valid formula"), RowSelection::All),
            Err(MiceError::InvalidFormula { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A non-finite value in the working table surfaces as a data error that
    // names the cell, not as a formula error.
    //
    // Given
    // -----
    // - NaN written into x's missing row 3, then `y ~ x` framed over all rows
    //   and the design of x's missing rows requested.
    //
    // Expect
    // ------
    // - `NonFiniteValue { variable: "x", row: 3 }` of kind `Data` both times.
    fn frames_report_non_finite_cells_as_data_errors() {
        // Arrange
        let mut ds = sample();
        ds.write("x", &[2.0, f64::NAN]).expect("shape matches");
        let formula = Formula::parse("y ~ x").expect("valid formula");

        // Act
        let frame_err = ds.model_frame(&formula, RowSelection::All).expect_err("NaN in x");
        let design_err = ds.design(&formula, RowSelection::All).expect_err("NaN in x");

        // Assert
        for err in [frame_err, design_err] {
            assert_eq!(err.kind(), ErrorKind::Data);
            match err {
                MiceError::NonFiniteValue { variable, row, value } => {
                    assert_eq!(variable, "x");
                    assert_eq!(row, 3);
                    assert!(value.is_nan());
                }
                other => panic!("expected a non-finite cell, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // A clone is a separate dataset instance.
    //
    // Given
    // -----
    // - The sample dataset and its clone.
    //
    // Expect
    // ------
    // - Equal contents, different ids.
    fn clone_gets_fresh_identity() {
        // Arrange
        let ds = sample();

        // Act
        let copy = ds.clone();

        // Assert
        assert_ne!(ds.id(), copy.id());
        assert_eq!(ds.read_all(), copy.read_all());
    }
}
