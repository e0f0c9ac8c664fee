//! imputation::imputer — conditional model and simulation for one variable.
//!
//! Purpose
//! -------
//! A [`VariableImputer`] pairs a target variable with a conditional model
//! (formula + provider) and re-simulates the variable's missing cells from
//! that model each time it is asked to.
//!
//! Key behaviors
//! -------------
//! - Fit the provider on the rows observed for the target.
//! - Draw one posterior parameter vector `β* = β̂ + L·z`, where `L·Lᵀ = Σ`
//!   is the fitted covariance, `z ~ N(0, (s·σ²)²)` componentwise, `σ²` is the
//!   fitted scale and `s` the multiplier chosen by [`ScaleMode`].
//! - Asymptotic Bayes: sample the missing rows from the model's predictive
//!   distribution at `β*` with residual scale `s·σ²`.
//! - Predictive mean matching: predict every row at `β*`, and for each
//!   missing row copy the observed value of one of the `k` observed rows
//!   whose predictions are closest, chosen uniformly.
//!
//! Invariants & assumptions
//! ------------------------
//! - An imputer is bound to the [`DatasetId`] it was built from and refuses
//!   any other dataset.
//! - A variable with nothing missing is skipped without fitting.
//! - For PMM, `1 ≤ k < num_observed`; checked at construction.
//! - Failures are reported as [`MiceError::ModelFit`] naming the variable;
//!   nothing is retried and the dataset is left untouched on error.
//!
//! Downstream usage
//! ----------------
//! - [`crate::imputation::ImputationCycle`] calls [`VariableImputer::simulate`]
//!   for each imputer in ascending order of missing counts.
use crate::{
    imputation::{
        dataset::{DatasetId, ImputedDataset, RowSelection},
        errors::{MiceError, MiceResult},
        matching::nearest_donors,
        options::{ImputationMethod, ImputerOptions, ScaleMode},
    },
    models::{
        errors::ModelError,
        formula::Formula,
        linalg::psd_sqrt,
        traits::{FittedModel, ModelProvider},
    },
};
use ndarray::Array1;
use rand::{RngCore, distributions::Distribution, seq::SliceRandom};
use statrs::distribution::{ChiSquared, Normal};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct VariableImputer {
    dataset: DatasetId,
    formula: Formula,
    provider: Arc<dyn ModelProvider>,
    options: ImputerOptions,
    num_missing: usize,
    num_observed: usize,
}

impl VariableImputer {
    /// Bind a conditional model for `formula.endog()` to `dataset`.
    ///
    /// # Errors
    /// - Option validation errors from [`ImputerOptions::validate`].
    /// - [`MiceError::UnknownVariable`] if the response is not a column.
    /// - [`MiceError::InvalidFormula`] if a predictor is not a column.
    /// - [`MiceError::InvalidPmmNeighbors`] if `k` is not below the number
    ///   of observed donors.
    pub fn new(
        dataset: &ImputedDataset, formula: Formula, provider: Arc<dyn ModelProvider>,
        options: ImputerOptions,
    ) -> MiceResult<Self> {
        let variable = formula.endog().to_string();
        options.validate().map_err(|e| match e {
            MiceError::InvalidPmmNeighbors { k, donors, .. } => {
                MiceError::InvalidPmmNeighbors { variable: variable.clone(), k, donors }
            }
            other => other,
        })?;

        let index = dataset.index(&variable)?;
        for name in formula.exog() {
            if dataset.column_index(name).is_err() {
                return Err(MiceError::InvalidFormula {
                    source: ModelError::UnknownColumn { name: name.clone() },
                });
            }
        }
        let (num_missing, num_observed) = (index.num_missing(), index.num_observed());
        if let ImputationMethod::PredictiveMeanMatching { k } = options.method {
            if k >= num_observed {
                return Err(MiceError::InvalidPmmNeighbors { variable, k, donors: num_observed });
            }
        }

        Ok(Self { dataset: dataset.id(), formula, provider, options, num_missing, num_observed })
    }

    pub fn variable(&self) -> &str {
        self.formula.endog()
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn options(&self) -> &ImputerOptions {
        &self.options
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset
    }

    pub fn num_missing(&self) -> usize {
        self.num_missing
    }

    pub fn num_observed(&self) -> usize {
        self.num_observed
    }

    /// Re-simulate the missing cells of the target variable in `data`.
    ///
    /// # Errors
    /// - [`MiceError::ForeignImputer`] if `data` is not the bound dataset.
    /// - [`MiceError::ModelFit`] if fitting, perturbation or simulation fails.
    pub fn simulate(&self, data: &mut ImputedDataset, rng: &mut dyn RngCore) -> MiceResult<()> {
        if data.id() != self.dataset {
            return Err(MiceError::ForeignImputer { variable: self.variable().to_string() });
        }
        if self.num_missing == 0 {
            return Ok(());
        }
        tracing::trace!(
            variable = self.variable(),
            num_missing = self.num_missing,
            method = self.options.method.name(),
            "simulating missing values"
        );
        match self.options.method {
            ImputationMethod::AsymptoticBayes => self.impute_asymptotic_bayes(data, rng),
            ImputationMethod::PredictiveMeanMatching { k } => self.impute_pmm(data, k, rng),
        }
    }

    /// Fit the conditional model on the rows observed for the target.
    pub fn fit(&self, data: &ImputedDataset) -> MiceResult<Box<dyn FittedModel>> {
        let frame = data.model_frame(&self.formula, RowSelection::Observed)?;
        self.provider
            .fit(&frame, &self.options.init, &self.options.fit)
            .map_err(|source| self.model_fit(source))
    }

    /// One posterior draw of the parameters and the scale multiplier `s`.
    ///
    /// # Errors
    /// [`MiceError::ModelFit`] if the covariance has no square root, the
    /// residual degrees of freedom do not admit a χ² draw, or the implied
    /// standard deviation is invalid.
    pub fn perturb_params(
        &self, fitted: &dyn FittedModel, rng: &mut dyn RngCore,
    ) -> MiceResult<(Array1<f64>, f64)> {
        let root = psd_sqrt(fitted.cov_params()).map_err(|source| self.model_fit(source))?;
        let multiplier = match self.options.scale {
            ScaleMode::Fixed(value) => value.unwrap_or(1.0),
            ScaleMode::ChiSquarePerturbed => {
                let df = fitted.df_resid();
                let chi = ChiSquared::new(df)
                    .map_err(|_| self.model_fit(ModelError::InvalidScale { scale: df }))?;
                df / chi.sample(&mut *rng)
            }
            ScaleMode::BootstrapPerturbed => {
                return Err(MiceError::UnimplementedScaleMode { mode: self.options.scale.name() });
            }
        };

        let std_dev = multiplier * fitted.scale();
        let p = fitted.params().len();
        let z = if std_dev == 0.0 {
            Array1::zeros(p)
        } else {
            let normal = Normal::new(0.0, std_dev)
                .map_err(|_| self.model_fit(ModelError::InvalidScale { scale: std_dev }))?;
            Array1::from_shape_fn(p, |_| normal.sample(&mut *rng))
        };
        Ok((fitted.params() + &root.dot(&z), multiplier))
    }

    /// Draw the missing rows from the predictive distribution at `β*`.
    fn impute_asymptotic_bayes(
        &self, data: &mut ImputedDataset, rng: &mut dyn RngCore,
    ) -> MiceResult<()> {
        let fitted = self.fit(data)?;
        let (params, multiplier) = self.perturb_params(fitted.as_ref(), rng)?;
        let exog_miss = data.design(&self.formula, RowSelection::Missing)?;
        let draws = fitted
            .sample_from_predictive(
                &params,
                exog_miss.view(),
                multiplier * fitted.scale(),
                rng,
            )
            .map_err(|source| self.model_fit(source))?;
        data.write(self.variable(), &draws.to_vec())
    }

    /// Copy, for each missing row, the observed value of a random one of the
    /// `k` observed rows with the closest prediction at `β*`.
    fn impute_pmm(
        &self, data: &mut ImputedDataset, k: usize, rng: &mut dyn RngCore,
    ) -> MiceResult<()> {
        let fitted = self.fit(data)?;
        let (params, _) = self.perturb_params(fitted.as_ref(), rng)?;
        let exog_all = data.design(&self.formula, RowSelection::All)?;
        let preds =
            fitted.predict(&params, exog_all.view()).map_err(|source| self.model_fit(source))?;

        let index = data.index(self.variable())?;
        let column = data.column(self.variable())?;
        let donor_preds: Vec<f64> = index.observed_rows().iter().map(|&r| preds[r]).collect();
        let donor_values: Vec<f64> = index.observed_rows().iter().map(|&r| column[r]).collect();

        let mut imputed = Vec::with_capacity(index.num_missing());
        for &row in index.missing_rows() {
            let candidates = nearest_donors(preds[row], &donor_preds, k);
            let donor = candidates.choose(&mut *rng).ok_or_else(|| {
                MiceError::InvalidPmmNeighbors {
                    variable: self.variable().to_string(),
                    k,
                    donors: donor_preds.len(),
                }
            })?;
            imputed.push(donor_values[*donor]);
        }
        data.write(self.variable(), &imputed)
    }

    fn model_fit(&self, source: ModelError) -> MiceError {
        MiceError::ModelFit { variable: self.variable().to_string(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        imputation::errors::ErrorKind,
        models::{
            frame::ModelFrame,
            ols::Ols,
            options::{FitOptions, InitOptions},
            traits::FittedModel,
        },
    };
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rand::{SeedableRng, rngs::StdRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction checks (PMM neighbor bound, unknown predictors).
    // - Dataset binding and the zero-missing short-circuit.
    // - Asymptotic-Bayes and PMM simulation with the OLS provider.
    // - Propagation of provider failures with the variable name.
    // - The perturbation step under fixed and χ²-perturbed scale.
    // -------------------------------------------------------------------------

    #[derive(Debug)]
    struct FailingProvider;

    impl ModelProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn fit(
            &self, _frame: &ModelFrame, _init: &InitOptions, _fit: &FitOptions,
        ) -> Result<Box<dyn FittedModel>, ModelError> {
            Err(ModelError::SingularDesign)
        }
    }

    fn names() -> Vec<String> {
        vec!["x".to_string(), "y".to_string()]
    }

    /// `y ≈ 1 + 2x` with small alternating residuals; `y` missing at rows 2 and 5.
    fn linear() -> ImputedDataset {
        let mut table = Array2::zeros((8, 2));
        for i in 0..8 {
            let x = i as f64;
            let noise = if i % 2 == 0 { 0.1 } else { -0.1 };
            table[[i, 0]] = x;
            table[[i, 1]] = 1.0 + 2.0 * x + noise;
        }
        table[[2, 1]] = f64::NAN;
        table[[5, 1]] = f64::NAN;
        ImputedDataset::new(table, names()).expect("valid dataset")
    }

    fn imputer(ds: &ImputedDataset, method: ImputationMethod) -> MiceResult<VariableImputer> {
        let opts = ImputerOptions::with_method(method)?;
        ds.new_imputer("y", Some(&["x"]), Arc::new(Ols), opts)
    }

    #[test]
    // Purpose
    // -------
    // Invalid neighbor counts and predictors are rejected at construction.
    //
    // Given
    // -----
    // - `y` with 6 observed rows; PMM with k = 6 and k = 5; a formula on `z`.
    //
    // Expect
    // ------
    // - k = 6 → `InvalidPmmNeighbors { variable: "y", donors: 6 }`;
    //   k = 5 → Ok; unknown predictor → `InvalidFormula`.
    fn new_validates_neighbors_and_predictors() {
        // Arrange
        let ds = linear();

        // Act
        let too_many = imputer(&ds, ImputationMethod::PredictiveMeanMatching { k: 6 });
        let ok = imputer(&ds, ImputationMethod::PredictiveMeanMatching { k: 5 });
        let bad = ds.new_imputer("y", Some(&["z"]), Arc::new(Ols), ImputerOptions::default());

        // Assert
        assert_eq!(
            too_many.expect_err("k equals donor count"),
            MiceError::InvalidPmmNeighbors { variable: "y".to_string(), k: 6, donors: 6 }
        );
        let ok = ok.expect("k below donor count");
        assert_eq!((ok.num_missing(), ok.num_observed()), (2, 6));
        let bad = bad.expect_err("z is not a column");
        assert_eq!(bad.kind(), ErrorKind::Configuration);
    }

    #[test]
    // Purpose
    // -------
    // An imputer refuses a different dataset instance, and a complete
    // variable is skipped without fitting.
    //
    // Given
    // -----
    // - An imputer for `y` simulated against a clone of its dataset.
    // - An imputer for the complete `x` backed by a provider that always fails.
    //
    // Expect
    // ------
    // - `ForeignImputer` for the clone; `Ok` and an unchanged table for `x`.
    fn simulate_checks_binding_and_skips_complete_variables() {
        // Arrange
        let mut ds = linear();
        let mut other = ds.clone();
        let y_imp = imputer(&ds, ImputationMethod::AsymptoticBayes).expect("valid imputer");
        let x_imp = ds
            .new_imputer("x", None, Arc::new(FailingProvider), ImputerOptions::default())
            .expect("valid imputer");
        let before = ds.read_all().to_owned();
        let mut rng = StdRng::seed_from_u64(1);

        // Act
        let foreign = y_imp.simulate(&mut other, &mut rng);
        let skipped = x_imp.simulate(&mut ds, &mut rng);

        // Assert
        assert_eq!(foreign, Err(MiceError::ForeignImputer { variable: "y".to_string() }));
        assert!(skipped.is_ok());
        assert_eq!(ds.read_all(), before);
    }

    #[test]
    // Purpose
    // -------
    // Asymptotic-Bayes draws land near the regression line.
    //
    // Given
    // -----
    // - `y ≈ 1 + 2x` with residual s.d. ≈ 0.1, missing at x = 2 and x = 5.
    //
    // Expect
    // ------
    // - Imputed values within 2 of 5 and 11; observed rows unchanged.
    fn simulate_asymptotic_bayes_draws_near_fit() {
        // Arrange
        let mut ds = linear();
        let imp = imputer(&ds, ImputationMethod::AsymptoticBayes).expect("valid imputer");
        let observed_before = ds.read_observed("y").expect("y exists");
        let mut rng = StdRng::seed_from_u64(42);

        // Act
        imp.simulate(&mut ds, &mut rng).expect("simulation succeeds");

        // Assert
        let imputed = ds.imputed_values("y").expect("y exists");
        assert!((imputed[0] - 5.0).abs() < 2.0, "got {}", imputed[0]);
        assert!((imputed[1] - 11.0).abs() < 2.0, "got {}", imputed[1]);
        assert_eq!(ds.read_observed("y").expect("y exists"), observed_before);
    }

    #[test]
    // Purpose
    // -------
    // PMM only ever imputes values that were observed.
    //
    // Given
    // -----
    // - The linear dataset and PMM with k = 2, run several times.
    //
    // Expect
    // ------
    // - Every imputed value equals one of the observed `y` values.
    fn simulate_pmm_copies_observed_donors() {
        // Arrange
        let mut ds = linear();
        let imp =
            imputer(&ds, ImputationMethod::PredictiveMeanMatching { k: 2 }).expect("valid imputer");
        let observed: Vec<f64> = {
            let col = ds.column("y").expect("y exists");
            let idx = ds.index("y").expect("y exists");
            idx.observed_rows().iter().map(|&r| col[r]).collect()
        };
        let mut rng = StdRng::seed_from_u64(7);

        // Act / Assert
        for _ in 0..5 {
            imp.simulate(&mut ds, &mut rng).expect("simulation succeeds");
            for v in ds.imputed_values("y").expect("y exists") {
                assert!(observed.contains(&v), "{v} is not an observed value");
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Provider failures surface as `ModelFit` naming the variable.
    //
    // Given
    // -----
    // - An imputer for `y` backed by a provider that always fails.
    //
    // Expect
    // ------
    // - `ModelFit { variable: "y", source: SingularDesign }`; table unchanged.
    fn simulate_propagates_fit_failure() {
        // Arrange
        let mut ds = linear();
        let imp = ds
            .new_imputer("y", None, Arc::new(FailingProvider), ImputerOptions::default())
            .expect("valid imputer");
        let before = ds.read_all().to_owned();
        let mut rng = StdRng::seed_from_u64(3);

        // Act
        let err = imp.simulate(&mut ds, &mut rng).expect_err("fit fails");

        // Assert
        assert_eq!(
            err,
            MiceError::ModelFit { variable: "y".to_string(), source: ModelError::SingularDesign }
        );
        assert_eq!(err.kind(), ErrorKind::ModelFit);
        assert_eq!(ds.read_all(), before);
    }

    #[test]
    // Purpose
    // -------
    // The perturbation reports the chosen multiplier and keeps the
    // parameter dimension.
    //
    // Given
    // -----
    // - A fitted OLS conditional model; `Fixed(Some(2))`, `Fixed(None)` and
    //   `ChiSquarePerturbed` scale modes.
    // - For the χ² mode, a copy of the generator that draws `u ~ χ²(df_resid)`
    //   on its own.
    //
    // Expect
    // ------
    // - Multipliers exactly 2 and 1 for the fixed modes.
    // - The χ² multiplier equals `df_resid / u` for the mirrored draw.
    // - Two finite parameters in every case.
    fn perturb_params_reports_multiplier() {
        // Arrange
        let ds = linear();
        let build = |scale| {
            let opts = ImputerOptions::new(
                ImputationMethod::AsymptoticBayes,
                scale,
                InitOptions::default(),
                FitOptions::default(),
            )
            .expect("valid options");
            ds.new_imputer("y", Some(&["x"]), Arc::new(Ols), opts).expect("valid imputer")
        };
        let fixed = build(ScaleMode::Fixed(Some(2.0)));
        let unit = build(ScaleMode::Fixed(None));
        let chi = build(ScaleMode::ChiSquarePerturbed);
        let fitted = fixed.fit(&ds).expect("fit succeeds");
        let df = fitted.df_resid();
        let mut rng = StdRng::seed_from_u64(11);

        // Act
        let (p_fixed, s_fixed) = fixed.perturb_params(fitted.as_ref(), &mut rng).expect("draws");
        let (p_unit, s_unit) = unit.perturb_params(fitted.as_ref(), &mut rng).expect("draws");
        let mut mirror = rng.clone();
        let (p_chi, s_chi) = chi.perturb_params(fitted.as_ref(), &mut rng).expect("draws");
        let mirror: &mut dyn RngCore = &mut mirror;
        let u = ChiSquared::new(df).expect("positive df").sample(&mut *mirror);

        // Assert
        assert_eq!(s_fixed, 2.0);
        assert_eq!(s_unit, 1.0);
        assert_abs_diff_eq!(s_chi, df / u, epsilon = 1e-12);
        assert_eq!(p_fixed.len(), 2);
        assert!(p_fixed.iter().chain(p_unit.iter()).chain(p_chi.iter()).all(|v| v.is_finite()));
    }
}
