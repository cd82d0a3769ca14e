use crate::schema::RawTransaction;
use log::debug;
use std::collections::BTreeMap;

/// Placeholder for a missing payment method.
pub const PAYMENT_PLACEHOLDER: &str = "Mixed";
/// Placeholder for a missing location.
pub const LOCATION_PLACEHOLDER: &str = "Unknown";

/// Two passes catch rows that need chained derivations, e.g. item filled from
/// price on the first pass and total from quantity * price on the second.
const DERIVATION_PASSES: usize = 2;

/// Canonical unit price per item, with the inverted price-to-item lookup used
/// as an imputation fallback. Built once from the loaded data and treated as
/// an immutable derived index.
///
/// The reverse lookup assumes prices are unique across items. When two items
/// share a price the later one wins, which can misassign item identity during
/// imputation; the source data is assumed not to share prices.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    price_by_item: BTreeMap<String, f64>,
    item_by_price: BTreeMap<i64, String>,
}

impl PriceTable {
    /// Builds the table from the first observed non-null price for each item.
    pub fn build(records: &[RawTransaction]) -> Self {
        let mut price_by_item: BTreeMap<String, f64> = BTreeMap::new();
        for record in records {
            if let (Some(item), Some(price)) = (&record.item, record.price_per_unit) {
                price_by_item.entry(item.clone()).or_insert(price);
            }
        }

        let mut item_by_price = BTreeMap::new();
        for (item, price) in &price_by_item {
            item_by_price.insert(Self::cents(*price), item.clone());
        }

        debug!("Built price table for {} items", price_by_item.len());
        PriceTable {
            price_by_item,
            item_by_price,
        }
    }

    pub fn price_for_item(&self, item: &str) -> Option<f64> {
        self.price_by_item.get(item).copied()
    }

    pub fn item_for_price(&self, price: f64) -> Option<&str> {
        self.item_by_price
            .get(&Self::cents(price))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.price_by_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price_by_item.is_empty()
    }

    // Prices are keyed on whole cents so the reverse lookup tolerates float
    // representation noise.
    fn cents(price: f64) -> i64 {
        (price * 100.0).round() as i64
    }
}

/// Result of the numeric imputation pass. `dropped` counts rows that were
/// still incomplete after the fixed-point passes and were discarded.
#[derive(Debug, Clone)]
pub struct ImputationOutcome {
    pub retained: Vec<RawTransaction>,
    pub dropped: usize,
}

fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => {
            let value = n / d;
            value.is_finite().then_some(value)
        }
        _ => None,
    }
}

fn derive_pass(record: &mut RawTransaction, table: &PriceTable) {
    if record.total_spent.is_none() {
        if let (Some(quantity), Some(price)) = (record.quantity, record.price_per_unit) {
            record.total_spent = Some(quantity * price);
        }
    }
    if record.quantity.is_none() {
        record.quantity = safe_div(record.total_spent, record.price_per_unit);
    }
    if record.price_per_unit.is_none() {
        record.price_per_unit = safe_div(record.total_spent, record.quantity);
    }
    if record.price_per_unit.is_none() {
        if let Some(item) = &record.item {
            record.price_per_unit = table.price_for_item(item);
        }
    }
    if record.item.is_none() {
        if let Some(price) = record.price_per_unit {
            record.item = table.item_for_price(price).map(str::to_string);
        }
    }
}

fn is_complete(record: &RawTransaction) -> bool {
    record.item.is_some()
        && record.quantity.is_some()
        && record.price_per_unit.is_some()
        && record.total_spent.is_some()
}

/// Fills missing quantity, price, total and item using the identity
/// `total = quantity * price` plus the price table fallbacks, then drops any
/// row still incomplete. Imputation trades completeness for consistency:
/// every retained row satisfies the identity.
pub fn impute_numeric(mut records: Vec<RawTransaction>, table: &PriceTable) -> ImputationOutcome {
    for _ in 0..DERIVATION_PASSES {
        for record in &mut records {
            derive_pass(record, table);
        }
    }

    let before = records.len();
    let retained: Vec<RawTransaction> = records.into_iter().filter(is_complete).collect();
    let dropped = before - retained.len();

    if dropped > 0 {
        debug!("Dropped {} rows that could not be imputed", dropped);
    }

    ImputationOutcome { retained, dropped }
}

/// Fills missing payment method and location with fixed placeholder labels.
/// Total and idempotent.
pub fn fill_categoricals(records: &mut [RawTransaction]) {
    for record in records {
        record
            .payment_method
            .get_or_insert_with(|| PAYMENT_PLACEHOLDER.to_string());
        record
            .location
            .get_or_insert_with(|| LOCATION_PLACEHOLDER.to_string());
    }
}
