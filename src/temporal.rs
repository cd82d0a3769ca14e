use crate::imputer::{LOCATION_PLACEHOLDER, PAYMENT_PLACEHOLDER};
use crate::schema::{DayOfWeek, Month, RawTransaction, Transaction};
use chrono::{Datelike, NaiveDate};
use log::debug;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a transaction date, trying each supported format in turn. Returns
/// `None` on failure rather than erroring; the caller drops such rows.
pub fn parse_transaction_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
}

/// Result of date decomposition. `dropped` counts rows whose date was missing
/// or unparseable.
#[derive(Debug, Clone)]
pub struct DecompositionOutcome {
    pub retained: Vec<Transaction>,
    pub dropped: usize,
}

/// Parses each record's date and replaces it with day-of-week, month and year
/// attributes. Expects records that already passed numeric imputation; rows
/// with a missing or unparseable date are dropped.
pub fn decompose_dates(records: Vec<RawTransaction>) -> DecompositionOutcome {
    let mut retained = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for record in records {
        let date = match record
            .transaction_date
            .as_deref()
            .and_then(parse_transaction_date)
        {
            Some(date) => date,
            None => {
                dropped += 1;
                continue;
            }
        };

        let (Some(item), Some(quantity), Some(price), Some(total)) = (
            record.item,
            record.quantity,
            record.price_per_unit,
            record.total_spent,
        ) else {
            dropped += 1;
            continue;
        };

        // month() is 1-based and always in range, so from_number cannot fail.
        let month = match Month::from_number(date.month()) {
            Some(month) => month,
            None => {
                dropped += 1;
                continue;
            }
        };

        retained.push(Transaction {
            transaction_id: record.transaction_id,
            item,
            quantity,
            price_per_unit: price,
            total_spent: total,
            payment_method: record
                .payment_method
                .unwrap_or_else(|| PAYMENT_PLACEHOLDER.to_string()),
            location: record
                .location
                .unwrap_or_else(|| LOCATION_PLACEHOLDER.to_string()),
            day_of_week: DayOfWeek::from(date.weekday()),
            month,
            year: date.year(),
        });
    }

    if dropped > 0 {
        debug!("Dropped {} rows with unusable dates", dropped);
    }

    DecompositionOutcome { retained, dropped }
}
