use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week in canonical Monday-first order. The derived `Ord` gives
/// the categorical ordering used by all aggregated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calendar month in canonical January-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Converts a 1-based calendar month number (as returned by
    /// `chrono::Datelike::month`) into a `Month`.
    pub fn from_number(month: u32) -> Option<Month> {
        Month::ALL.get(month.checked_sub(1)? as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Season bucket for this month. Jan-Mar is Spring, Apr-Jun Summer,
    /// Jul-Sep Autumn, Oct-Dec Winter, matching the dashboard's quarter
    /// naming rather than astronomical seasons.
    pub fn season(&self) -> Season {
        match self {
            Month::January | Month::February | Month::March => Season::Spring,
            Month::April | Month::May | Month::June => Season::Summer,
            Month::July | Month::August | Month::September => Season::Autumn,
            Month::October | Month::November | Month::December => Season::Winter,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn name(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value column an aggregation or forecast operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    Quantity,
    TotalSpent,
}

impl Variable {
    pub fn label(&self) -> &'static str {
        match self {
            Variable::Quantity => "Quantity",
            Variable::TotalSpent => "Total Spent",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A transaction as loaded from the source file: every field may be missing.
/// Sentinel tokens have already been normalized to `None` by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: Option<String>,
    pub item: Option<String>,
    pub quantity: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub total_spent: Option<f64>,
    pub payment_method: Option<String>,
    pub location: Option<String>,
    pub transaction_date: Option<String>,
}

/// A fully cleaned transaction, output of the pipeline. All fields are
/// non-null and `total_spent` equals `quantity * price_per_unit` within
/// rounding. The raw date string is replaced by its calendar attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: Option<String>,
    pub item: String,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub total_spent: f64,
    pub payment_method: String,
    pub location: String,
    pub day_of_week: DayOfWeek,
    pub month: Month,
    pub year: i32,
}

impl Transaction {
    pub fn value(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Quantity => self.quantity,
            Variable::TotalSpent => self.total_spent,
        }
    }
}

/// The period axis of an aggregated row. Daily output carries `Day`, monthly
/// output `Month` or (with season collapse) `Season`. The derived `Ord`
/// follows the canonical period order of the inner enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeriodLabel {
    Day(DayOfWeek),
    Month(Month),
    Season(Season),
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodLabel::Day(d) => f.write_str(d.name()),
            PeriodLabel::Month(m) => f.write_str(m.name()),
            PeriodLabel::Season(s) => f.write_str(s.name()),
        }
    }
}

/// One row of aggregated output: the mean of the requested variable for an
/// item (or the synthetic "Total" series) in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub item: String,
    pub period: PeriodLabel,
    pub mean: f64,
}

/// Item name used for collapsed (summed across items) aggregation rows.
pub const TOTAL_ITEM: &str = "Total";
