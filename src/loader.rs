use crate::error::{Result, SalesAnalyticsError};
use crate::schema::RawTransaction;
use log::{debug, info};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Literal tokens the source file uses to mean "missing". The empty string is
/// handled separately because the csv reader already maps it to `None`.
pub const MISSING_SENTINELS: [&str; 3] = ["UNKNOWN", "ERROR", " "];

#[derive(Debug, Deserialize)]
struct SourceRecord {
    #[serde(rename = "Transaction ID")]
    transaction_id: Option<String>,
    #[serde(rename = "Item")]
    item: Option<String>,
    #[serde(rename = "Quantity")]
    quantity: Option<String>,
    #[serde(rename = "Price Per Unit")]
    price_per_unit: Option<String>,
    #[serde(rename = "Total Spent")]
    total_spent: Option<String>,
    #[serde(rename = "Payment Method")]
    payment_method: Option<String>,
    #[serde(rename = "Location")]
    location: Option<String>,
    #[serde(rename = "Transaction Date")]
    transaction_date: Option<String>,
}

fn normalize_sentinels(field: Option<String>) -> Option<String> {
    match field {
        Some(value) if value.is_empty() || MISSING_SENTINELS.contains(&value.as_str()) => None,
        other => other,
    }
}

/// Numeric coercion for a normalized field. A cell that does not parse as a
/// number is treated as missing; the imputer decides whether the row survives.
fn coerce_numeric(field: Option<String>) -> Option<f64> {
    field.and_then(|value| value.trim().parse::<f64>().ok())
}

impl From<SourceRecord> for RawTransaction {
    fn from(record: SourceRecord) -> Self {
        RawTransaction {
            transaction_id: normalize_sentinels(record.transaction_id),
            item: normalize_sentinels(record.item),
            quantity: coerce_numeric(normalize_sentinels(record.quantity)),
            price_per_unit: coerce_numeric(normalize_sentinels(record.price_per_unit)),
            total_spent: coerce_numeric(normalize_sentinels(record.total_spent)),
            payment_method: normalize_sentinels(record.payment_method),
            location: normalize_sentinels(record.location),
            transaction_date: normalize_sentinels(record.transaction_date),
        }
    }
}

/// Reads transactions from any CSV source. Sentinel tokens become `None` and
/// the numeric columns are coerced to `f64`. No rows are dropped here.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut transactions = Vec::new();

    for record in csv_reader.deserialize::<SourceRecord>() {
        let record = record?;
        transactions.push(RawTransaction::from(record));
    }

    debug!("Read {} raw transactions", transactions.len());
    Ok(transactions)
}

/// Reads transactions from a CSV file. An unreadable source is fatal.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let file =
        std::fs::File::open(path).map_err(|source| SalesAnalyticsError::SourceUnreadable {
            path: path.display().to_string(),
            source: csv::Error::from(source),
        })?;

    let transactions = read_transactions(file)?;
    info!(
        "Loaded {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}
