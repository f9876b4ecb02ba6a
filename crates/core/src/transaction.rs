use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::account::AccountId;
use super::classification::{
    ClassificationResult, ConfidenceLevel, AUTHORITATIVE_CONFIDENCE, REVIEW_THRESHOLD,
    UNCATEGORIZED,
};
use super::money::Money;
use super::period::DateRange;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        TransactionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    /// Positive is a credit (income), negative a debit (expense).
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Transaction {
    /// A new, uncategorized transaction with no confidence yet.
    pub fn new(
        id: TransactionId,
        account_id: AccountId,
        amount: Money,
        description: &str,
        date: NaiveDate,
    ) -> Self {
        Transaction {
            id,
            account_id,
            amount,
            description: description.to_string(),
            date,
            category: UNCATEGORIZED.to_string(),
            subcategory: None,
            merchant: None,
            pending: false,
            confidence: None,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    /// Amount in the form the classifier consumes.
    pub fn amount_for_classification(&self) -> Option<f64> {
        Some(self.amount.to_f64())
    }

    /// True when `result` would replace the current category: the new
    /// confidence must strictly exceed the stored one, or nothing is stored.
    pub fn should_accept(&self, result: &ClassificationResult) -> bool {
        match self.confidence {
            Some(current) => result.confidence > current,
            None => true,
        }
    }

    /// Writes `result` onto the transaction if it passes [`Self::should_accept`].
    /// Returns whether anything changed.
    pub fn apply_classification(&mut self, result: ClassificationResult) -> bool {
        if !self.should_accept(&result) {
            return false;
        }
        if self.category != result.category {
            self.subcategory = None;
        }
        self.category = result.category;
        self.confidence = Some(result.confidence);
        true
    }

    /// A user-chosen category. Always wins and pins confidence at 1.0.
    pub fn confirm_category(&mut self, category: &str) {
        if self.category != category {
            self.subcategory = None;
        }
        self.category = category.to_string();
        self.confidence = Some(AUTHORITATIVE_CONFIDENCE);
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    pub fn needs_review(&self) -> bool {
        self.confidence.is_some_and(|c| c < REVIEW_THRESHOLD)
    }
}

/// Partial update for a stored transaction. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub merchant: Option<String>,
    pub pending: Option<bool>,
    pub confidence: Option<f64>,
}

impl TransactionUpdate {
    pub fn apply(self, tx: &mut Transaction) {
        if let Some(category) = self.category {
            tx.category = category;
        }
        if let Some(subcategory) = self.subcategory {
            tx.subcategory = Some(subcategory);
        }
        if let Some(merchant) = self.merchant {
            tx.merchant = Some(merchant);
        }
        if let Some(pending) = self.pending {
            tx.pending = pending;
        }
        if let Some(confidence) = self.confidence {
            tx.confidence = Some(confidence);
        }
    }
}

pub fn filter_by_date_range(transactions: &[Transaction], range: DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| range.contains(t.date))
        .cloned()
        .collect()
}

pub fn group_by_category(transactions: &[Transaction]) -> BTreeMap<String, Vec<&Transaction>> {
    let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        groups.entry(tx.category.clone()).or_default().push(tx);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: Money,
}

/// Expense totals per category (as positive amounts), largest first.
pub fn spending_by_category(transactions: &[Transaction]) -> Vec<CategorySpend> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        let entry = totals.entry(tx.category.as_str()).or_insert_with(Money::zero);
        *entry = *entry + tx.amount;
    }

    let mut spend: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, total)| CategorySpend {
            category: category.to_string(),
            amount: total.abs(),
        })
        .collect();
    spend.sort_by(|a, b| b.amount.cmp(&a.amount));
    spend
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total_income: Money,
    pub total_spent: Money,
    pub net: Money,
    pub income_count: usize,
    pub expense_count: usize,
}

impl PeriodSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_income: Money = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();
        let total_spent: Money = transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount.abs())
            .sum();

        PeriodSummary {
            total_income,
            total_spent,
            net: total_income - total_spent,
            income_count: transactions.iter().filter(|t| t.is_income()).count(),
            expense_count: transactions.iter().filter(|t| t.is_expense()).count(),
        }
    }

    pub fn is_surplus(&self) -> bool {
        !self.net.is_negative()
    }
}
