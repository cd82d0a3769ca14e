use crate::error::{Result, SalesAnalyticsError};
use crate::schema::{DayOfWeek, Month, Transaction, Variable};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::{mean_squared_error, r2};
use smartcore::model_selection::train_test_split;
use std::collections::BTreeSet;

/// Fixed seed for the train/test split and the forest, for reproducibility.
const SPLIT_SEED: u64 = 123;
const TEST_FRACTION: f32 = 0.2;

/// One-hot encoder over the four categorical predictors, fit on the category
/// vocabulary observed in training. Categories absent from training encode to
/// an all-zero block by construction, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    items: Vec<String>,
    days: Vec<DayOfWeek>,
    months: Vec<Month>,
    years: Vec<i32>,
}

impl OneHotEncoder {
    pub fn fit(records: &[Transaction]) -> Self {
        let items: BTreeSet<String> = records.iter().map(|txn| txn.item.clone()).collect();
        let days: BTreeSet<DayOfWeek> = records.iter().map(|txn| txn.day_of_week).collect();
        let months: BTreeSet<Month> = records.iter().map(|txn| txn.month).collect();
        let years: BTreeSet<i32> = records.iter().map(|txn| txn.year).collect();

        OneHotEncoder {
            items: items.into_iter().collect(),
            days: days.into_iter().collect(),
            months: months.into_iter().collect(),
            years: years.into_iter().collect(),
        }
    }

    /// Number of columns in the encoded feature space.
    pub fn width(&self) -> usize {
        self.items.len() + self.days.len() + self.months.len() + self.years.len()
    }

    pub fn encode(&self, item: &str, day: DayOfWeek, month: Month, year: i32) -> Vec<f64> {
        let mut row = vec![0.0; self.width()];
        let mut offset = 0;

        if let Ok(idx) = self.items.binary_search_by(|known| known.as_str().cmp(item)) {
            row[offset + idx] = 1.0;
        }
        offset += self.items.len();

        if let Ok(idx) = self.days.binary_search(&day) {
            row[offset + idx] = 1.0;
        }
        offset += self.days.len();

        if let Ok(idx) = self.months.binary_search(&month) {
            row[offset + idx] = 1.0;
        }
        offset += self.months.len();

        if let Ok(idx) = self.years.binary_search(&year) {
            row[offset + idx] = 1.0;
        }

        row
    }

    fn encode_transaction(&self, txn: &Transaction) -> Vec<f64> {
        self.encode(&txn.item, txn.day_of_week, txn.month, txn.year)
    }
}

/// Held-out error metrics from the 80/20 split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mse: f64,
    pub r2: f64,
}

/// A category combination to predict for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub item: String,
    pub day_of_week: DayOfWeek,
    pub month: Month,
    pub year: i32,
}

/// A request with the target variable filled in by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub item: String,
    pub day_of_week: DayOfWeek,
    pub month: Month,
    pub year: i32,
    pub predicted: f64,
}

/// Random-forest regression over one-hot encoded (item, day, month, year)
/// predictors. Hyperparameters are fixed; there is no tuning loop.
pub struct SalesForecaster {
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
    encoder: OneHotEncoder,
    variable: Variable,
    metrics: ModelMetrics,
}

impl SalesForecaster {
    /// Fits the model on an 80/20 split with a fixed seed and reports the
    /// held-out error metrics.
    pub fn train(records: &[Transaction], variable: Variable) -> Result<Self> {
        if records.is_empty() {
            return Err(SalesAnalyticsError::EmptyDataset);
        }

        let encoder = OneHotEncoder::fit(records);
        let features: Vec<Vec<f64>> = records
            .iter()
            .map(|txn| encoder.encode_transaction(txn))
            .collect();
        let targets: Vec<f64> = records.iter().map(|txn| txn.value(variable)).collect();

        let x = DenseMatrix::from_2d_vec(&features);
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &targets, TEST_FRACTION, true, Some(SPLIT_SEED));

        let parameters = RandomForestRegressorParameters::default()
            .with_n_trees(150)
            .with_max_depth(3)
            .with_min_samples_leaf(5)
            .with_min_samples_split(6)
            .with_seed(SPLIT_SEED);

        info!(
            "Training forecaster for '{}' on {} transactions ({} features)",
            variable,
            records.len(),
            encoder.width()
        );

        let model = RandomForestRegressor::fit(&x_train, &y_train, parameters)
            .map_err(|e| SalesAnalyticsError::ModelError(e.to_string()))?;

        let y_pred = model
            .predict(&x_test)
            .map_err(|e| SalesAnalyticsError::ModelError(e.to_string()))?;

        let metrics = ModelMetrics {
            mse: mean_squared_error(&y_test, &y_pred),
            r2: r2(&y_test, &y_pred),
        };
        debug!(
            "Forecaster metrics: mse={:.4}, r2={:.4}",
            metrics.mse, metrics.r2
        );

        Ok(SalesForecaster {
            model,
            encoder,
            variable,
            metrics,
        })
    }

    /// Predicts the target variable for new category combinations using the
    /// encoder fit at training time.
    pub fn predict(&self, requests: &[ForecastRequest]) -> Result<Vec<ForecastRow>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let features: Vec<Vec<f64>> = requests
            .iter()
            .map(|req| self.encoder.encode(&req.item, req.day_of_week, req.month, req.year))
            .collect();
        let x = DenseMatrix::from_2d_vec(&features);

        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| SalesAnalyticsError::ModelError(e.to_string()))?;

        Ok(requests
            .iter()
            .zip(predictions)
            .map(|(req, predicted)| ForecastRow {
                item: req.item.clone(),
                day_of_week: req.day_of_week,
                month: req.month,
                year: req.year,
                predicted,
            })
            .collect())
    }

    pub fn metrics(&self) -> ModelMetrics {
        self.metrics
    }

    pub fn variable(&self) -> Variable {
        self.variable
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }
}
