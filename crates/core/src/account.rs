use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Investment,
    Loan,
    Retirement,
}

impl AccountType {
    /// CSV exports use free-form type columns; anything unknown is treated as a
    /// checking account.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(AccountType::Checking)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Checking => write!(f, "checking"),
            AccountType::Savings => write!(f, "savings"),
            AccountType::Credit => write!(f, "credit"),
            AccountType::Investment => write!(f, "investment"),
            AccountType::Loan => write!(f, "loan"),
            AccountType::Retirement => write!(f, "retirement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown account type: '{0}'")]
pub struct UnknownAccountType(pub String);

impl std::str::FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checking" | "current" | "cheque" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            "credit" => Ok(AccountType::Credit),
            "investment" => Ok(AccountType::Investment),
            "loan" => Ok(AccountType::Loan),
            "retirement" => Ok(AccountType::Retirement),
            other => Err(UnknownAccountType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Money,
    pub currency: String,
    pub institution: String,
    pub last_updated: NaiveDate,
    pub account_number: Option<String>,
}

pub const DEFAULT_CURRENCY: &str = "ZAR";

impl Account {
    pub fn new(id: &str, name: &str, account_type: AccountType, balance: Money) -> Self {
        Account {
            id: AccountId::new(id),
            name: name.to_string(),
            account_type,
            balance,
            currency: DEFAULT_CURRENCY.to_string(),
            institution: "Unknown".to_string(),
            last_updated: chrono::Utc::now().date_naive(),
            account_number: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWorth {
    pub assets: Money,
    pub liabilities: Money,
    pub net_worth: Money,
}

/// Positive balances count as assets, everything else as liabilities
/// (by magnitude).
pub fn calculate_net_worth(accounts: &[Account]) -> NetWorth {
    let (assets, liabilities) = accounts.iter().fold(
        (Money::zero(), Money::zero()),
        |(assets, liabilities), account| {
            if account.balance.is_positive() {
                (assets + account.balance, liabilities)
            } else {
                (assets, liabilities + account.balance.abs())
            }
        },
    );

    NetWorth {
        assets,
        liabilities,
        net_worth: assets - liabilities,
    }
}

/// Asset classes in display order: label, account type, colour.
const ALLOCATION_CLASSES: [(&str, AccountType, &str); 4] = [
    ("Cash & Checking", AccountType::Checking, "bg-blue-500"),
    ("Savings", AccountType::Savings, "bg-green-500"),
    ("Investments", AccountType::Investment, "bg-purple-500"),
    ("Retirement", AccountType::Retirement, "bg-orange-500"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub label: String,
    pub account_type: AccountType,
    pub value: Money,
    /// Percentage of all positive balances; 0 when there are none.
    pub percentage: f64,
    pub color: String,
    pub account_ids: Vec<AccountId>,
}

/// One slice per asset class, empty classes included. Only positive balances
/// count towards a slice and towards the total.
pub fn asset_allocation(accounts: &[Account]) -> Vec<AllocationSlice> {
    let total_assets: Money = accounts
        .iter()
        .map(|a| a.balance)
        .filter(|b| b.is_positive())
        .sum();

    ALLOCATION_CLASSES
        .iter()
        .map(|&(label, account_type, color)| {
            let members: Vec<&Account> = accounts
                .iter()
                .filter(|a| a.account_type == account_type)
                .collect();
            let value: Money = members
                .iter()
                .map(|a| a.balance)
                .filter(|b| b.is_positive())
                .sum();
            let percentage = if total_assets.is_positive() {
                value.to_f64() / total_assets.to_f64() * 100.0
            } else {
                0.0
            };

            AllocationSlice {
                label: label.to_string(),
                account_type,
                value,
                percentage,
                color: color.to_string(),
                account_ids: members.iter().map(|a| a.id.clone()).collect(),
            }
        })
        .collect()
}
