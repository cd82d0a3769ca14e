//! # Cafe Sales Analytics
//!
//! A library for turning a dirty retail transaction log into clean,
//! aggregation-ready records, with comparative grouping by calendar period
//! and a simple regression-based forecast.
//!
//! ## Core Concepts
//!
//! - **Raw Transaction**: a row as loaded from the source CSV; any field may
//!   be missing after sentinel tokens ("UNKNOWN", "ERROR", blanks) are
//!   normalized away
//! - **Imputation**: missing quantity/price/total/item are cross-filled from
//!   the identity `total = quantity * price` and a canonical per-item price
//!   table; rows that stay incomplete are dropped, never fudged
//! - **Temporal Decomposition**: the date string becomes day-of-week, month
//!   and year attributes; unparseable dates drop the row
//! - **Aggregation**: mean of quantity or total spend per item per weekday,
//!   or per month/season averaged across years, in canonical period order
//! - **Forecasting**: a fixed-hyperparameter random forest over one-hot
//!   encoded (item, day, month, year) predictors
//!
//! ## Example
//!
//! ```rust,ignore
//! use cafe_sales_analytics::*;
//!
//! let (sales, report) = process_transactions("cafe_sales.csv")?;
//! println!("retained {} of {} rows", report.retained, report.loaded);
//!
//! let items: Vec<String> = vec!["Coffee".into(), "Cake".into()];
//! let daily = aggregate_daily(&sales, &items, false, Variable::TotalSpent);
//!
//! let forecaster = SalesForecaster::train(&sales, Variable::Quantity)?;
//! let predictions = forecaster.predict(&[ForecastRequest {
//!     item: "Coffee".into(),
//!     day_of_week: DayOfWeek::Monday,
//!     month: Month::June,
//!     year: 2024,
//! }])?;
//! ```

pub mod aggregator;
pub mod error;
pub mod forecaster;
pub mod imputer;
pub mod loader;
pub mod schema;
pub mod temporal;

pub use aggregator::{
    aggregate_daily, aggregate_monthly, payment_method_breakdown, PaymentBreakdownRow, SpendBand,
};
pub use error::{Result, SalesAnalyticsError};
pub use forecaster::{
    ForecastRequest, ForecastRow, ModelMetrics, OneHotEncoder, SalesForecaster,
};
pub use imputer::{
    fill_categoricals, impute_numeric, ImputationOutcome, PriceTable, LOCATION_PLACEHOLDER,
    PAYMENT_PLACEHOLDER,
};
pub use loader::{load_transactions, read_transactions, MISSING_SENTINELS};
pub use schema::*;
pub use temporal::{decompose_dates, parse_transaction_date, DecompositionOutcome};

use log::{debug, info};
use std::io::Read;
use std::path::Path;

/// Stage-by-stage row accounting for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    /// Rows read from the source file.
    pub loaded: usize,
    /// Rows dropped because imputation could not complete them.
    pub dropped_incomplete: usize,
    /// Rows dropped because the date was missing or unparseable.
    pub dropped_bad_dates: usize,
    /// Clean rows available to the aggregator and forecaster.
    pub retained: usize,
}

pub struct SalesPipeline;

impl SalesPipeline {
    /// Runs the full cleaning pipeline against a CSV file:
    /// load -> impute -> fill categoricals -> decompose dates.
    pub fn run<P: AsRef<Path>>(path: P) -> Result<(Vec<Transaction>, PipelineReport)> {
        let raw = load_transactions(path)?;
        Self::clean(raw)
    }

    /// Same pipeline over an in-memory CSV source.
    pub fn run_from_reader<R: Read>(reader: R) -> Result<(Vec<Transaction>, PipelineReport)> {
        let raw = read_transactions(reader)?;
        Self::clean(raw)
    }

    fn clean(raw: Vec<RawTransaction>) -> Result<(Vec<Transaction>, PipelineReport)> {
        let loaded = raw.len();

        let price_table = PriceTable::build(&raw);
        debug!(
            "Price table covers {} items across {} raw rows",
            price_table.len(),
            loaded
        );

        let ImputationOutcome {
            mut retained,
            dropped: dropped_incomplete,
        } = impute_numeric(raw, &price_table);

        fill_categoricals(&mut retained);

        let DecompositionOutcome {
            retained: clean,
            dropped: dropped_bad_dates,
        } = decompose_dates(retained);

        let report = PipelineReport {
            loaded,
            dropped_incomplete,
            dropped_bad_dates,
            retained: clean.len(),
        };
        info!(
            "Pipeline retained {}/{} rows ({} incomplete, {} bad dates)",
            report.retained, report.loaded, report.dropped_incomplete, report.dropped_bad_dates
        );

        Ok((clean, report))
    }
}

/// Convenience wrapper around [`SalesPipeline::run`].
pub fn process_transactions<P: AsRef<Path>>(path: P) -> Result<(Vec<Transaction>, PipelineReport)> {
    SalesPipeline::run(path)
}
