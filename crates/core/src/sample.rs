//! Demo data used when the store starts empty and sample seeding is enabled.

use chrono::NaiveDate;

use super::account::{Account, AccountId, AccountType};
use super::budget::{Goal, GoalKind, GoalPriority};
use super::money::Money;
use super::transaction::{Transaction, TransactionId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn account(
    id: &str,
    name: &str,
    account_type: AccountType,
    cents: i64,
    institution: &str,
    number: &str,
    updated: NaiveDate,
) -> Account {
    Account {
        id: AccountId::new(id),
        name: name.to_string(),
        account_type,
        balance: Money::from_cents(cents),
        currency: "ZAR".to_string(),
        institution: institution.to_string(),
        last_updated: updated,
        account_number: Some(number.to_string()),
    }
}

pub fn sample_accounts() -> Vec<Account> {
    vec![
        account("1", "Primary Checking", AccountType::Checking, 1_542_050, "Standard Bank", "****1234", date(2025, 5, 26)),
        account("2", "Savings Account", AccountType::Savings, 8_500_000, "FNB", "****5678", date(2025, 5, 26)),
        account("3", "Credit Card", AccountType::Credit, -425_075, "ABSA", "****9012", date(2025, 5, 26)),
        account("4", "Investment Account", AccountType::Investment, 12_500_000, "Investec", "****3456", date(2025, 5, 25)),
        account("5", "Home Loan", AccountType::Loan, -45_000_000, "Nedbank", "****7890", date(2025, 5, 25)),
    ]
}

struct Row {
    id: &'static str,
    account: &'static str,
    cents: i64,
    description: &'static str,
    day: u32,
    category: &'static str,
    subcategory: Option<&'static str>,
    merchant: Option<&'static str>,
    confidence: f64,
}

const SAMPLE_ROWS: &[Row] = &[
    Row { id: "1", account: "1", cents: -8_950, description: "WOOLWORTHS GARDENS", day: 26, category: "Groceries", subcategory: Some("Food & Beverages"), merchant: Some("Woolworths"), confidence: 0.95 },
    Row { id: "2", account: "1", cents: -120_000, description: "RENT PAYMENT", day: 25, category: "Housing", subcategory: Some("Rent"), merchant: None, confidence: 0.99 },
    Row { id: "3", account: "3", cents: -4_500, description: "UBER TRIP", day: 25, category: "Transport", subcategory: Some("Ride Sharing"), merchant: Some("Uber"), confidence: 0.92 },
    Row { id: "4", account: "1", cents: 2_500_000, description: "SALARY DEPOSIT", day: 25, category: "Income", subcategory: Some("Salary"), merchant: None, confidence: 0.99 },
    Row { id: "5", account: "3", cents: -15_000, description: "TAKEALOT ONLINE", day: 24, category: "Shopping", subcategory: Some("Online Shopping"), merchant: Some("Takealot"), confidence: 0.88 },
    Row { id: "6", account: "1", cents: -6_500, description: "SHELL PETROL STATION", day: 24, category: "Transport", subcategory: Some("Fuel"), merchant: Some("Shell"), confidence: 0.96 },
    Row { id: "7", account: "3", cents: -32_000, description: "RESTAURANT MEAL", day: 23, category: "Food & Dining", subcategory: Some("Restaurants"), merchant: None, confidence: 0.85 },
    Row { id: "8", account: "1", cents: -89_000, description: "MEDICAL AID PAYMENT", day: 23, category: "Healthcare", subcategory: Some("Medical Aid"), merchant: None, confidence: 0.98 },
    Row { id: "9", account: "2", cents: 50_000, description: "INTEREST PAYMENT", day: 22, category: "Income", subcategory: Some("Interest"), merchant: None, confidence: 0.99 },
    Row { id: "10", account: "1", cents: -7_550, description: "UNKNOWN MERCHANT", day: 22, category: "Uncategorized", subcategory: None, merchant: None, confidence: 0.45 },
];

/// Newest first, matching the store's ordering.
pub fn sample_transactions() -> Vec<Transaction> {
    SAMPLE_ROWS
        .iter()
        .map(|row| Transaction {
            id: TransactionId::new(row.id),
            account_id: AccountId::new(row.account),
            amount: Money::from_cents(row.cents),
            description: row.description.to_string(),
            date: date(2025, 5, row.day),
            category: row.category.to_string(),
            subcategory: row.subcategory.map(str::to_string),
            merchant: row.merchant.map(str::to_string),
            pending: false,
            confidence: Some(row.confidence),
        })
        .collect()
}

pub fn sample_goals() -> Vec<Goal> {
    vec![
        Goal {
            id: "slush-fund".to_string(),
            name: "Slush Fund Target".to_string(),
            target_amount: Money::from_cents(30_000_000),
            current_amount: Money::from_cents(10_641_900),
            target_date: date(2025, 12, 31),
            kind: GoalKind::Savings,
            priority: GoalPriority::High,
        },
        Goal {
            id: "vacation-fund".to_string(),
            name: "Vacation Fund".to_string(),
            target_amount: Money::from_cents(5_000_000),
            current_amount: Money::from_cents(102_800),
            target_date: date(2025, 8, 31),
            kind: GoalKind::Vacation,
            priority: GoalPriority::Medium,
        },
        Goal {
            id: "emergency-fund".to_string(),
            name: "Emergency Fund Target".to_string(),
            target_amount: Money::from_cents(20_000_000),
            current_amount: Money::from_cents(16_278_600),
            target_date: date(2025, 10, 31),
            kind: GoalKind::Emergency,
            priority: GoalPriority::High,
        },
    ]
}
