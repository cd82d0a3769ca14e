use crate::schema::{AggregatedRow, PeriodLabel, Transaction, Variable, TOTAL_ITEM};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sort_canonical(rows: &mut [AggregatedRow]) {
    rows.sort_by(|a, b| a.period.cmp(&b.period).then_with(|| a.item.cmp(&b.item)));
}

/// Sums the per-item means of each period into a single synthetic "Total"
/// series, keeping the canonical period order.
fn collapse_to_total(rows: Vec<AggregatedRow>) -> Vec<AggregatedRow> {
    let mut sums: BTreeMap<PeriodLabel, f64> = BTreeMap::new();
    for row in rows {
        *sums.entry(row.period).or_insert(0.0) += row.mean;
    }

    sums.into_iter()
        .map(|(period, sum)| AggregatedRow {
            item: TOTAL_ITEM.to_string(),
            period,
            mean: round2(sum),
        })
        .collect()
}

/// Mean of `variable` per item per day of week, restricted to `items` and
/// ordered Monday through Sunday. With `collapse`, the per-item means are
/// summed into one "Total" series per day.
pub fn aggregate_daily(
    records: &[Transaction],
    items: &[String],
    collapse: bool,
    variable: Variable,
) -> Vec<AggregatedRow> {
    let mut stats: BTreeMap<(String, PeriodLabel), (f64, usize)> = BTreeMap::new();

    for txn in records.iter().filter(|txn| items.contains(&txn.item)) {
        let entry = stats
            .entry((txn.item.clone(), PeriodLabel::Day(txn.day_of_week)))
            .or_insert((0.0, 0));
        entry.0 += txn.value(variable);
        entry.1 += 1;
    }

    let mut rows: Vec<AggregatedRow> = stats
        .into_iter()
        .map(|((item, period), (sum, count))| AggregatedRow {
            item,
            period,
            mean: round2(sum / count as f64),
        })
        .collect();
    sort_canonical(&mut rows);

    if collapse {
        collapse_to_total(rows)
    } else {
        rows
    }
}

/// Mean of `variable` per item per month, restricted to `items` and ordered
/// January through December. Values are first summed per (item, month, year)
/// and then averaged across the years observed in the filtered data, so a
/// year with more transactions does not dominate the multi-year mean; a year
/// with no observations for a period contributes zero to its average. With
/// `season`, months are re-bucketed into the four seasons before averaging.
pub fn aggregate_monthly(
    records: &[Transaction],
    items: &[String],
    collapse: bool,
    variable: Variable,
    season: bool,
) -> Vec<AggregatedRow> {
    let filtered: Vec<&Transaction> = records
        .iter()
        .filter(|txn| items.contains(&txn.item))
        .collect();

    let years: BTreeSet<i32> = filtered.iter().map(|txn| txn.year).collect();
    if years.is_empty() {
        return Vec::new();
    }
    let year_count = years.len() as f64;

    // Sum per (item, period, year) first.
    let mut yearly_sums: BTreeMap<(String, PeriodLabel, i32), f64> = BTreeMap::new();
    for txn in &filtered {
        let period = if season {
            PeriodLabel::Season(txn.month.season())
        } else {
            PeriodLabel::Month(txn.month)
        };
        *yearly_sums
            .entry((txn.item.clone(), period, txn.year))
            .or_insert(0.0) += txn.value(variable);
    }

    // Then average across years per (item, period).
    let mut totals: BTreeMap<(String, PeriodLabel), f64> = BTreeMap::new();
    for ((item, period, _year), sum) in yearly_sums {
        *totals.entry((item, period)).or_insert(0.0) += sum;
    }

    let mut rows: Vec<AggregatedRow> = totals
        .into_iter()
        .map(|((item, period), total)| AggregatedRow {
            item,
            period,
            mean: round2(total / year_count),
        })
        .collect();
    sort_canonical(&mut rows);

    if collapse {
        collapse_to_total(rows)
    } else {
        rows
    }
}

/// Spending tercile over the equal-width range of observed totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpendBand {
    Low,
    Medium,
    High,
}

/// Transaction counts per payment method, split by spending band, with
/// per-row totals. The final row carries the column margins under "All".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdownRow {
    pub payment_method: String,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub all: usize,
}

fn spend_band(value: f64, min: f64, max: f64) -> SpendBand {
    let width = (max - min) / 3.0;
    if width <= 0.0 {
        return SpendBand::Low;
    }
    match (((value - min) / width) as usize).min(2) {
        0 => SpendBand::Low,
        1 => SpendBand::Medium,
        _ => SpendBand::High,
    }
}

/// Cross-tabulates payment methods against Low/Medium/High spending bands
/// (equal-width bins over the observed total-spent range), with margins.
pub fn payment_method_breakdown(records: &[Transaction]) -> Vec<PaymentBreakdownRow> {
    if records.is_empty() {
        return Vec::new();
    }

    let min = records
        .iter()
        .map(|txn| txn.total_spent)
        .fold(f64::INFINITY, f64::min);
    let max = records
        .iter()
        .map(|txn| txn.total_spent)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut counts: BTreeMap<String, [usize; 3]> = BTreeMap::new();
    for txn in records {
        let cells = counts.entry(txn.payment_method.clone()).or_insert([0; 3]);
        cells[spend_band(txn.total_spent, min, max) as usize] += 1;
    }

    let mut margins = [0usize; 3];
    let mut rows: Vec<PaymentBreakdownRow> = counts
        .into_iter()
        .map(|(payment_method, [low, medium, high])| {
            margins[0] += low;
            margins[1] += medium;
            margins[2] += high;
            PaymentBreakdownRow {
                payment_method,
                low,
                medium,
                high,
                all: low + medium + high,
            }
        })
        .collect();

    rows.push(PaymentBreakdownRow {
        payment_method: "All".to_string(),
        low: margins[0],
        medium: margins[1],
        high: margins[2],
        all: margins.iter().sum(),
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DayOfWeek, Month};

    fn txn(item: &str, day: DayOfWeek, month: Month, year: i32, total: f64) -> Transaction {
        Transaction {
            transaction_id: None,
            item: item.to_string(),
            quantity: 1.0,
            price_per_unit: total,
            total_spent: total,
            payment_method: "Cash".to_string(),
            location: "In-store".to_string(),
            day_of_week: day,
            month,
            year,
        }
    }

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_daily_mean_per_item() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 4.0),
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 6.0),
            txn("Coffee", DayOfWeek::Friday, Month::January, 2023, 9.0),
        ];

        let rows = aggregate_daily(&records, &items(&["Coffee"]), false, Variable::TotalSpent);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, PeriodLabel::Day(DayOfWeek::Monday));
        assert_eq!(rows[0].mean, 5.0);
        assert_eq!(rows[1].period, PeriodLabel::Day(DayOfWeek::Friday));
        assert_eq!(rows[1].mean, 9.0);
    }

    #[test]
    fn test_daily_order_is_canonical_not_alphabetical() {
        let records = vec![
            txn("Coffee", DayOfWeek::Sunday, Month::January, 2023, 1.0),
            txn("Coffee", DayOfWeek::Friday, Month::January, 2023, 1.0),
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 1.0),
            txn("Coffee", DayOfWeek::Wednesday, Month::January, 2023, 1.0),
        ];

        let rows = aggregate_daily(&records, &items(&["Coffee"]), false, Variable::TotalSpent);
        let days: Vec<PeriodLabel> = rows.iter().map(|r| r.period).collect();
        assert_eq!(
            days,
            vec![
                PeriodLabel::Day(DayOfWeek::Monday),
                PeriodLabel::Day(DayOfWeek::Wednesday),
                PeriodLabel::Day(DayOfWeek::Friday),
                PeriodLabel::Day(DayOfWeek::Sunday),
            ]
        );
    }

    #[test]
    fn test_daily_item_filter() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 4.0),
            txn("Tea", DayOfWeek::Monday, Month::January, 2023, 2.0),
        ];

        let rows = aggregate_daily(&records, &items(&["Tea"]), false, Variable::TotalSpent);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Tea");
    }

    #[test]
    fn test_daily_collapse_sums_per_item_means() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 4.0),
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 6.0),
            txn("Tea", DayOfWeek::Monday, Month::January, 2023, 2.0),
        ];
        let all = items(&["Coffee", "Tea"]);

        let collapsed = aggregate_daily(&records, &all, true, Variable::TotalSpent);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].item, TOTAL_ITEM);
        // Sum of means (5.0 + 2.0), not mean of all values.
        assert_eq!(collapsed[0].mean, 7.0);

        // Collapse equals manually summing the uncollapsed rows per period.
        let flat = aggregate_daily(&records, &all, false, Variable::TotalSpent);
        let manual: f64 = flat
            .iter()
            .filter(|r| r.period == PeriodLabel::Day(DayOfWeek::Monday))
            .map(|r| r.mean)
            .sum();
        assert_eq!(collapsed[0].mean, round2(manual));
    }

    #[test]
    fn test_monthly_sums_within_year_then_averages_across_years() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::January, 2022, 10.0),
            txn("Coffee", DayOfWeek::Tuesday, Month::January, 2022, 20.0),
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 40.0),
        ];

        let rows = aggregate_monthly(
            &records,
            &items(&["Coffee"]),
            false,
            Variable::TotalSpent,
            false,
        );
        assert_eq!(rows.len(), 1);
        // (30 + 40) / 2 years, not the mean of three transactions.
        assert_eq!(rows[0].mean, 35.0);
    }

    #[test]
    fn test_monthly_absent_year_counts_as_zero() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::March, 2022, 30.0),
            txn("Coffee", DayOfWeek::Monday, Month::April, 2023, 12.0),
        ];

        let rows = aggregate_monthly(
            &records,
            &items(&["Coffee"]),
            false,
            Variable::TotalSpent,
            false,
        );
        // March observed only in 2022, but two years are in scope.
        let march = rows
            .iter()
            .find(|r| r.period == PeriodLabel::Month(Month::March))
            .unwrap();
        assert_eq!(march.mean, 15.0);
    }

    #[test]
    fn test_monthly_season_collapse_single_year() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::August, 2023, 10.0),
            txn("Coffee", DayOfWeek::Monday, Month::September, 2023, 20.0),
        ];

        let rows = aggregate_monthly(
            &records,
            &items(&["Coffee"]),
            false,
            Variable::TotalSpent,
            true,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, PeriodLabel::Season(crate::schema::Season::Autumn));
        // Two Autumn months sum to 30; one year, so the mean is 30.
        assert_eq!(rows[0].mean, 30.0);
    }

    #[test]
    fn test_monthly_order_is_canonical() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::December, 2023, 1.0),
            txn("Coffee", DayOfWeek::Monday, Month::April, 2023, 1.0),
            txn("Coffee", DayOfWeek::Monday, Month::August, 2023, 1.0),
        ];

        let rows = aggregate_monthly(
            &records,
            &items(&["Coffee"]),
            false,
            Variable::TotalSpent,
            false,
        );
        let months: Vec<PeriodLabel> = rows.iter().map(|r| r.period).collect();
        assert_eq!(
            months,
            vec![
                PeriodLabel::Month(Month::April),
                PeriodLabel::Month(Month::August),
                PeriodLabel::Month(Month::December),
            ]
        );
    }

    #[test]
    fn test_monthly_empty_selection() {
        let records = vec![txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 1.0)];
        let rows = aggregate_monthly(&records, &[], false, Variable::TotalSpent, false);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_payment_breakdown_margins() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 1.0),
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 5.0),
            {
                let mut t = txn("Cake", DayOfWeek::Monday, Month::January, 2023, 10.0);
                t.payment_method = "Credit Card".to_string();
                t
            },
        ];

        let rows = payment_method_breakdown(&records);
        assert_eq!(rows.len(), 3);
        let all = rows.last().unwrap();
        assert_eq!(all.payment_method, "All");
        assert_eq!(all.all, 3);
        assert_eq!(all.low + all.medium + all.high, 3);

        let cash = rows.iter().find(|r| r.payment_method == "Cash").unwrap();
        assert_eq!(cash.all, 2);
        assert_eq!(cash.low, 1);
    }

    #[test]
    fn test_payment_breakdown_degenerate_range() {
        let records = vec![
            txn("Coffee", DayOfWeek::Monday, Month::January, 2023, 4.0),
            txn("Coffee", DayOfWeek::Tuesday, Month::January, 2023, 4.0),
        ];
        let rows = payment_method_breakdown(&records);
        let cash = rows.iter().find(|r| r.payment_method == "Cash").unwrap();
        assert_eq!(cash.low, 2);
        assert_eq!(cash.medium + cash.high, 0);
    }
}
