//! Yodlee wire types and their mapping into domain types.

use chrono::NaiveDate;
use finsight_core::{
    Account, AccountId, AccountType, Money, Transaction, TransactionId, AUTHORITATIVE_CONFIDENCE,
    DEFAULT_CURRENCY, UNCATEGORIZED,
};
use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, Result};

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: TokenBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenBody {
    pub access_token: String,
    /// Seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: YodleeUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YodleeUser {
    pub id: i64,
    pub login_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserName {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokensResponse {
    pub user: AccessTokensUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessTokensUser {
    #[serde(default)]
    pub access_tokens: Vec<AccessToken>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessToken {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YodleeAmount {
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// The API answers `{}` rather than an empty list when there is nothing.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AccountsResponse {
    #[serde(default)]
    pub account: Vec<YodleeAccount>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YodleeAccount {
    pub id: i64,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub balance: Option<YodleeAmount>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransactionsResponse {
    #[serde(default)]
    pub transaction: Vec<YodleeTransaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BaseType {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Posted,
    Pending,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YodleeDescription {
    pub original: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YodleeMerchant {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YodleeTransaction {
    pub id: i64,
    pub account_id: i64,
    pub amount: YodleeAmount,
    pub base_type: BaseType,
    #[serde(default)]
    pub category: Option<String>,
    pub description: YodleeDescription,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default)]
    pub merchant: Option<YodleeMerchant>,
}

/// Provider IDs are numeric and would collide with locally created ones.
pub fn provider_id(raw: i64) -> String {
    format!("yodlee-{}", raw)
}

/// Yodlee account types are upper-case container names such as
/// `CREDIT_CARD` or `SAVINGS`; anything unrecognised is a checking account.
pub fn map_account_type(raw: &str) -> AccountType {
    let raw = raw.to_uppercase();
    if raw.contains("CREDIT") {
        AccountType::Credit
    } else if raw.contains("INVESTMENT") {
        AccountType::Investment
    } else if raw.contains("SAVINGS") {
        AccountType::Savings
    } else if raw.contains("LOAN") {
        AccountType::Loan
    } else if raw.contains("RETIREMENT") {
        AccountType::Retirement
    } else {
        AccountType::Checking
    }
}

/// `today` stands in when the provider omits or garbles `lastUpdated`.
pub fn map_account(account: YodleeAccount, today: NaiveDate) -> Account {
    let (balance, currency) = match account.balance {
        Some(b) => (
            Money::from_f64(b.amount).unwrap_or_else(Money::zero),
            b.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        ),
        None => (Money::zero(), DEFAULT_CURRENCY.to_string()),
    };

    let last_updated = account
        .last_updated
        .as_deref()
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or(today);

    Account {
        id: AccountId::new(provider_id(account.id)),
        name: account.account_name,
        account_type: map_account_type(&account.account_type),
        balance,
        currency,
        institution: account.provider_name,
        last_updated,
        account_number: account.account_number,
    }
}

pub fn map_transaction(tx: YodleeTransaction) -> Result<Transaction> {
    let magnitude = Money::from_f64(tx.amount.amount)
        .ok_or_else(|| AggregationError::InvalidResponse(format!("amount of transaction {}", tx.id)))?
        .abs();
    let amount = match tx.base_type {
        BaseType::Credit => magnitude,
        BaseType::Debit => -magnitude,
    };

    Ok(Transaction {
        id: TransactionId::new(provider_id(tx.id)),
        account_id: AccountId::new(provider_id(tx.account_id)),
        amount,
        description: tx.description.original,
        date: tx.date,
        category: tx
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        subcategory: None,
        merchant: tx.merchant.map(|m| m.name),
        pending: tx.status == Some(TransactionStatus::Pending),
        confidence: Some(AUTHORITATIVE_CONFIDENCE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn account_type_substrings() {
        assert_eq!(map_account_type("CREDIT_CARD"), AccountType::Credit);
        assert_eq!(map_account_type("INVESTMENT"), AccountType::Investment);
        assert_eq!(map_account_type("SAVINGS"), AccountType::Savings);
        assert_eq!(map_account_type("PERSONAL_LOAN"), AccountType::Loan);
        assert_eq!(map_account_type("RETIREMENT"), AccountType::Retirement);
        assert_eq!(map_account_type("CHECKING"), AccountType::Checking);
        assert_eq!(map_account_type(""), AccountType::Checking);
    }

    #[test]
    fn account_without_balance_is_zero_rand() {
        let json = r#"{"id": 10, "accountName": "Everyday", "accountType": "CHECKING",
                       "providerName": "Dag Site", "lastUpdated": "2025-05-20T08:15:00Z"}"#;
        let acct = map_account(serde_json::from_str(json).unwrap(), today());
        assert_eq!(acct.id.as_str(), "yodlee-10");
        assert!(acct.balance.is_zero());
        assert_eq!(acct.currency, "ZAR");
        assert_eq!(acct.institution, "Dag Site");
        assert_eq!(acct.last_updated, NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
    }

    #[test]
    fn account_with_balance() {
        let json = r#"{"id": 11, "accountName": "Card", "accountType": "CREDIT_CARD",
                       "balance": {"amount": 4250.75, "currency": "USD"}}"#;
        let acct = map_account(serde_json::from_str(json).unwrap(), today());
        assert_eq!(acct.balance, Money::from_cents(425075));
        assert_eq!(acct.currency, "USD");
        assert_eq!(acct.account_type, AccountType::Credit);
        assert_eq!(acct.last_updated, today());
    }

    #[test]
    fn debit_is_negative_and_authoritative() {
        let json = r#"{"id": 5, "accountId": 10, "amount": {"amount": 89.5, "currency": "ZAR"},
                       "baseType": "DEBIT", "category": "Groceries",
                       "description": {"original": "WOOLWORTHS"}, "date": "2025-05-26",
                       "status": "POSTED", "merchant": {"name": "Woolworths"}}"#;
        let tx = map_transaction(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(tx.id.as_str(), "yodlee-5");
        assert_eq!(tx.account_id.as_str(), "yodlee-10");
        assert_eq!(tx.amount, Money::from_cents(-8950));
        assert_eq!(tx.category, "Groceries");
        assert_eq!(tx.merchant.as_deref(), Some("Woolworths"));
        assert_eq!(tx.confidence, Some(1.0));
        assert!(!tx.pending);
    }

    #[test]
    fn pending_credit_without_category() {
        let json = r#"{"id": 6, "accountId": 10, "amount": {"amount": 25000},
                       "baseType": "CREDIT", "description": {"original": "SALARY"},
                       "date": "2025-05-25", "status": "PENDING"}"#;
        let tx = map_transaction(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(tx.amount, Money::from_cents(2_500_000));
        assert_eq!(tx.category, "Uncategorized");
        assert!(tx.pending);
    }

    #[test]
    fn empty_response_bodies() {
        let accounts: AccountsResponse = serde_json::from_str("{}").unwrap();
        assert!(accounts.account.is_empty());
        let txs: TransactionsResponse = serde_json::from_str("{}").unwrap();
        assert!(txs.transaction.is_empty());
    }
}
