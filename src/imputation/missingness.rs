//! imputation::missingness — observed/missing row partition of one column.
//!
//! Purpose
//! -------
//! Record, once, which rows of a variable were observed in the raw input and
//! which must be simulated. The partition never changes during a run even
//! though the missing cells are overwritten every cycle.
//!
//! Invariants & assumptions
//! ------------------------
//! - `observed_rows` and `missing_rows` are disjoint, each strictly
//!   increasing, and together cover `0..nrows` exactly.
//! - In the raw input a missing cell is encoded as NaN.
use ndarray::ArrayView1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingnessIndex {
    observed_rows: Vec<usize>,
    missing_rows: Vec<usize>,
}

impl MissingnessIndex {
    /// Partition a raw column: NaN cells are missing, every other cell observed.
    pub fn from_column(column: ArrayView1<'_, f64>) -> Self {
        let (missing_rows, observed_rows): (Vec<usize>, Vec<usize>) =
            (0..column.len()).partition(|&row| column[row].is_nan());
        Self { observed_rows, missing_rows }
    }

    pub fn observed_rows(&self) -> &[usize] {
        &self.observed_rows
    }

    pub fn missing_rows(&self) -> &[usize] {
        &self.missing_rows
    }

    pub fn num_missing(&self) -> usize {
        self.missing_rows.len()
    }

    pub fn num_observed(&self) -> usize {
        self.observed_rows.len()
    }

    pub fn nrows(&self) -> usize {
        self.observed_rows.len() + self.missing_rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The index partitions all rows into ordered, disjoint sets.
    //
    // Given
    // -----
    // - A column with NaN at rows 1 and 4.
    //
    // Expect
    // ------
    // - missing = [1, 4], observed = [0, 2, 3, 5], union covers 0..6.
    fn from_column_partitions_rows() {
        // Arrange
        let col = array![1.0, f64::NAN, 3.0, -0.0, f64::NAN, 2.5];

        // Act
        let idx = MissingnessIndex::from_column(col.view());

        // Assert
        assert_eq!(idx.missing_rows(), &[1, 4]);
        assert_eq!(idx.observed_rows(), &[0, 2, 3, 5]);
        let mut all: Vec<usize> =
            idx.observed_rows().iter().chain(idx.missing_rows()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..6).collect::<Vec<_>>());
        assert_eq!((idx.num_missing(), idx.num_observed(), idx.nrows()), (2, 4, 6));
    }
}
