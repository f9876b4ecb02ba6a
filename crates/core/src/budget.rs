use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::money::Money;
use super::transaction::CategorySpend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetCadence {
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub amount: Money,
    pub period: BudgetCadence,
    pub spent: Money,
}

impl Budget {
    /// Negative when overspent.
    pub fn remaining(&self) -> Money {
        self.amount - self.spent
    }

    /// Share of the budget used, as a percentage. Zero budgets report 0.
    pub fn utilization(&self) -> f64 {
        if self.amount.is_zero() {
            return 0.0;
        }
        (self.spent.amount() / self.amount.amount() * rust_decimal::Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    pub fn is_over(&self) -> bool {
        self.spent > self.amount
    }
}

/// A budget for every category with a monthly target, scaled to `months`,
/// with spend taken from `spending` by category name.
pub fn category_budgets(
    categories: &[Category],
    spending: &[CategorySpend],
    months: u32,
) -> Vec<Budget> {
    categories
        .iter()
        .filter_map(|category| {
            let target = category.target?;
            let spent = spending
                .iter()
                .find(|s| s.category == category.name)
                .map_or_else(Money::zero, |s| s.amount);
            Some(Budget {
                id: format!("budget-{}", category.id),
                category_id: category.id.clone(),
                amount: Money::from_decimal(target.amount() * rust_decimal::Decimal::from(months)),
                period: BudgetCadence::Monthly,
                spent,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Savings,
    Investment,
    Emergency,
    Vacation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub target_date: NaiveDate,
    pub kind: GoalKind,
    pub priority: GoalPriority,
}

impl Goal {
    /// Capped at 100.
    pub fn progress_percentage(&self) -> f64 {
        if !self.target_amount.is_positive() {
            return 100.0;
        }
        let pct = self.current_amount.to_f64() / self.target_amount.to_f64() * 100.0;
        pct.min(100.0)
    }

    /// Days left until the target date; negative once it has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days()
    }

    /// Amount to put away each month to hit the target. At least one month is
    /// assumed so overdue goals ask for the full remainder.
    pub fn monthly_requirement(&self, today: NaiveDate) -> Money {
        let remaining = (self.target_amount - self.current_amount).to_f64();
        let months_left = (self.days_remaining(today) as f64 / 30.0).max(1.0);
        Money::from_f64(remaining / months_left).unwrap_or_else(Money::zero)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_percentage: f64,
    pub days_remaining: i64,
    pub monthly_requirement: Money,
}

impl GoalProgress {
    pub fn new(goal: Goal, today: NaiveDate) -> Self {
        Self {
            progress_percentage: goal.progress_percentage(),
            days_remaining: goal.days_remaining(today),
            monthly_requirement: goal.monthly_requirement(today),
            goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(target: i64, current: i64, target_date: NaiveDate) -> Goal {
        Goal {
            id: "g".to_string(),
            name: "Emergency Fund".to_string(),
            target_amount: Money::from_cents(target),
            current_amount: Money::from_cents(current),
            target_date,
            kind: GoalKind::Emergency,
            priority: GoalPriority::High,
        }
    }

    #[test]
    fn budget_remaining_and_utilization() {
        let b = Budget {
            id: "b1".to_string(),
            category_id: "4".to_string(),
            amount: Money::from_cents(496_400),
            period: BudgetCadence::Monthly,
            spent: Money::from_cents(124_100),
        };
        assert_eq!(b.remaining().to_cents(), 372_300);
        assert!((b.utilization() - 25.0).abs() < 1e-9);
        assert!(!b.is_over());
    }

    #[test]
    fn zero_budget_has_zero_utilization() {
        let b = Budget {
            id: "b".to_string(),
            category_id: "1".to_string(),
            amount: Money::zero(),
            period: BudgetCadence::Weekly,
            spent: Money::from_cents(100),
        };
        assert_eq!(b.utilization(), 0.0);
        assert!(b.is_over());
    }

    #[test]
    fn budgets_follow_category_targets() {
        let categories = crate::category::default_categories();
        let spending = vec![
            CategorySpend {
                category: "Housing".to_string(),
                amount: Money::from_cents(1_500_000),
            },
            CategorySpend {
                category: "Income".to_string(),
                amount: Money::from_cents(100),
            },
        ];
        let budgets = category_budgets(&categories, &spending, 1);
        assert_eq!(budgets.len(), 10);
        assert!(budgets.iter().all(|b| b.period == BudgetCadence::Monthly));

        let housing_id = &categories.iter().find(|c| c.name == "Housing").unwrap().id;
        let housing = budgets.iter().find(|b| &b.category_id == housing_id).unwrap();
        assert_eq!(housing.amount, Money::from_cents(1_430_000));
        assert!(housing.is_over());
        assert_eq!(housing.remaining(), Money::from_cents(-70_000));

        let untouched = budgets.iter().filter(|b| b.spent.is_zero()).count();
        assert_eq!(untouched, 9);
    }

    #[test]
    fn budgets_scale_with_months() {
        let categories = crate::category::default_categories();
        let budgets = category_budgets(&categories, &[], 3);
        let groceries_id = &categories.iter().find(|c| c.name == "Groceries").unwrap().id;
        let groceries = budgets.iter().find(|b| &b.category_id == groceries_id).unwrap();
        assert_eq!(groceries.amount, Money::from_cents(1_489_200));
        assert_eq!(groceries.utilization(), 0.0);
    }

    #[test]
    fn goal_progress_is_capped() {
        let g = goal(10_000, 25_000, date(2025, 12, 31));
        assert_eq!(g.progress_percentage(), 100.0);
        let g = goal(20_000_000, 16_278_600, date(2025, 10, 31));
        assert!((g.progress_percentage() - 81.393).abs() < 1e-9);
    }

    #[test]
    fn monthly_requirement_spreads_remainder() {
        // 60 days left -> two months.
        let today = date(2025, 1, 1);
        let g = goal(1_000_000, 400_000, date(2025, 3, 2));
        assert_eq!(g.days_remaining(today), 60);
        assert_eq!(g.monthly_requirement(today).to_cents(), 300_000);
    }

    #[test]
    fn overdue_goal_asks_for_everything() {
        let g = goal(1_000_000, 400_000, date(2024, 12, 1));
        let today = date(2025, 1, 1);
        assert!(g.days_remaining(today) < 0);
        assert_eq!(g.monthly_requirement(today).to_cents(), 600_000);
    }
}
