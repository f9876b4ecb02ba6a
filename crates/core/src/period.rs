use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// First through last day of the month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        DateRange { start, end }
    }
}

/// Reporting windows offered by the budget overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    #[default]
    CurrentMonth,
    LastMonth,
    LastThreeMonths,
}

impl BudgetPeriod {
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        match self {
            BudgetPeriod::CurrentMonth => DateRange::month_of(today),
            BudgetPeriod::LastMonth => {
                let last = today.checked_sub_months(Months::new(1)).unwrap_or(today);
                DateRange::month_of(last)
            }
            BudgetPeriod::LastThreeMonths => {
                let start = today.checked_sub_months(Months::new(3)).unwrap_or(today);
                DateRange::new(start, today)
            }
        }
    }

    /// Number of monthly budgets the period spans.
    pub fn months(self) -> u32 {
        match self {
            BudgetPeriod::CurrentMonth | BudgetPeriod::LastMonth => 1,
            BudgetPeriod::LastThreeMonths => 3,
        }
    }

    pub fn label(self, today: NaiveDate) -> String {
        let range = self.resolve(today);
        match self {
            BudgetPeriod::CurrentMonth => {
                format!("Current Month ({})", range.start.format("%b %Y"))
            }
            BudgetPeriod::LastMonth => format!("Last Month ({})", range.start.format("%b %Y")),
            BudgetPeriod::LastThreeMonths => "Last 3 Months".to_string(),
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" | "current_month" => Ok(BudgetPeriod::CurrentMonth),
            "last" | "last_month" => Ok(BudgetPeriod::LastMonth),
            "last3" | "last_three_months" => Ok(BudgetPeriod::LastThreeMonths),
            other => Err(format!("Unknown budget period: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_contains() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 12, 31));
        assert!(range.contains(date(2025, 6, 15)));
        assert!(range.contains(date(2025, 1, 1))); // inclusive start
        assert!(range.contains(date(2025, 12, 31))); // inclusive end
        assert!(!range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2026, 1, 1)));
    }

    #[test]
    fn date_range_display() {
        let range = DateRange::new(date(2025, 5, 1), date(2025, 5, 31));
        assert_eq!(range.to_string(), "2025-05-01 to 2025-05-31");
    }

    #[test]
    fn month_of_handles_short_months() {
        let feb = DateRange::month_of(date(2024, 2, 14));
        assert_eq!(feb.start, date(2024, 2, 1));
        assert_eq!(feb.end, date(2024, 2, 29));

        let dec = DateRange::month_of(date(2025, 12, 31));
        assert_eq!(dec.end, date(2025, 12, 31));
    }

    #[test]
    fn current_month() {
        let r = BudgetPeriod::CurrentMonth.resolve(date(2025, 5, 27));
        assert_eq!(r, DateRange::new(date(2025, 5, 1), date(2025, 5, 31)));
    }

    #[test]
    fn last_month_crosses_year_boundary() {
        let r = BudgetPeriod::LastMonth.resolve(date(2025, 1, 10));
        assert_eq!(r, DateRange::new(date(2024, 12, 1), date(2024, 12, 31)));
    }

    #[test]
    fn last_three_months_ends_today() {
        let r = BudgetPeriod::LastThreeMonths.resolve(date(2025, 5, 27));
        assert_eq!(r, DateRange::new(date(2025, 2, 27), date(2025, 5, 27)));
    }

    #[test]
    fn parse_and_label() {
        assert_eq!("last3".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::LastThreeMonths);
        assert!("fortnight".parse::<BudgetPeriod>().is_err());
        assert_eq!(
            BudgetPeriod::CurrentMonth.label(date(2025, 5, 27)),
            "Current Month (May 2025)"
        );
    }
}
