use chrono::NaiveDate;
use finsight_core::{AccountType, Money, DEFAULT_CURRENCY, UNCATEGORIZED};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

/// Column positions for a transactions file. Use [`CsvColumnMapping::from_headers`]
/// to build one from a header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvColumnMapping {
    pub date_column: Option<usize>,
    pub description_column: Option<usize>,
    pub amount_column: Option<usize>,
    pub debit_column: Option<usize>,
    pub credit_column: Option<usize>,
    pub category_column: Option<usize>,
    pub account_column: Option<usize>,
    pub merchant_column: Option<usize>,
    pub memo_column: Option<usize>,
    pub date_format: String,
}

impl Default for CsvColumnMapping {
    fn default() -> Self {
        Self {
            date_column: None,
            description_column: None,
            amount_column: None,
            debit_column: None,
            credit_column: None,
            category_column: None,
            account_column: None,
            merchant_column: None,
            memo_column: None,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl CsvColumnMapping {
    pub fn from_headers(headers: &[String]) -> Self {
        let find = |names: &[&str]| {
            names.iter().find_map(|name| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(name))
            })
        };

        let description_column = find(&["description", "memo"]);
        let memo_column = find(&["memo"]).filter(|c| Some(*c) != description_column);

        Self {
            date_column: find(&["date", "transaction date", "posting date"]),
            description_column,
            amount_column: find(&["amount"]),
            debit_column: find(&["debit"]),
            credit_column: find(&["credit"]),
            category_column: find(&["category"]),
            account_column: find(&["account id", "account"]),
            merchant_column: find(&["merchant"]),
            memo_column,
            ..Self::default()
        }
    }

    fn has_amount(&self) -> bool {
        self.amount_column.is_some() || self.debit_column.is_some() || self.credit_column.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvImportProfile {
    pub name: String,
    /// `None` detects columns from the header row.
    #[serde(default)]
    pub mapping: Option<CsvColumnMapping>,
    pub has_header: bool,
    pub delimiter: String,
    /// Used when a row has no account column or an empty one.
    pub default_account: String,
    /// Source category label → app category label.
    #[serde(default)]
    pub category_map: HashMap<String, String>,
}

impl Default for CsvImportProfile {
    fn default() -> Self {
        Self {
            name: "Generic CSV".to_string(),
            mapping: None,
            has_header: true,
            delimiter: ",".to_string(),
            default_account: "default".to_string(),
            category_map: HashMap::new(),
        }
    }
}

impl CsvImportProfile {
    pub fn map_category(&self, source: &str) -> String {
        if let Some(mapped) = self.category_map.get(source) {
            return mapped.clone();
        }
        self.category_map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(source))
            .map_or_else(|| source.to_string(), |(_, v)| v.clone())
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid date format: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("No data rows")]
    NoDataRows,
}

/// A row that was skipped. `line` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parsed rows plus the rows that were rejected along the way.
#[derive(Debug, Clone)]
pub struct CsvParse<T> {
    pub rows: Vec<T>,
    pub errors: Vec<RowError>,
}

impl<T> Default for CsvParse<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> CsvParse<T> {
    fn reject(&mut self, line: u64, message: impl Into<String>) {
        self.errors.push(RowError {
            line,
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Positive is money in.
    pub amount: Money,
    /// Already passed through the profile's category map.
    pub category: Option<String>,
    pub account_id: String,
    pub merchant: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvAccount {
    pub name: String,
    pub account_type: AccountType,
    pub institution: String,
    pub balance: Money,
    pub currency: String,
    pub account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingRow {
    pub category: String,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvFileKind {
    Accounts,
    Transactions,
    Spending,
}

impl CsvFileKind {
    /// The file name wins when it is telling; otherwise the header row decides.
    pub fn detect(filename: Option<&str>, headers: &[String]) -> Self {
        if let Some(name) = filename.map(str::to_lowercase) {
            if name.contains("account") || name.contains("balance") {
                return CsvFileKind::Accounts;
            }
            if name.contains("transaction") || name.contains("statement") {
                return CsvFileKind::Transactions;
            }
            if name.contains("spending") || name.contains("expense") {
                return CsvFileKind::Spending;
            }
        }

        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        if lowered
            .iter()
            .any(|h| h.contains("balance") || h.contains("account"))
        {
            CsvFileKind::Accounts
        } else if lowered
            .iter()
            .any(|h| h.contains("amount") && h.contains("description"))
        {
            CsvFileKind::Transactions
        } else {
            CsvFileKind::Spending
        }
    }
}

impl fmt::Display for CsvFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CsvFileKind::Accounts => "accounts",
            CsvFileKind::Transactions => "transactions",
            CsvFileKind::Spending => "spending categories",
        };
        write!(f, "{}", s)
    }
}

/// The raw contents of a CSV file: trimmed header names and data records.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    records: Vec<(u64, csv::StringRecord)>,
}

impl CsvTable {
    pub fn read<R: Read>(data: R, profile: &CsvImportProfile) -> Result<Self, CsvError> {
        let delimiter = profile
            .delimiter
            .as_bytes()
            .first()
            .copied()
            .unwrap_or(b',');
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(profile.has_header)
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers = if profile.has_header {
            reader.headers()?.iter().map(|h| h.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let offset = if profile.has_header { 2 } else { 1 };
            let line = record
                .position()
                .map_or(index as u64 + offset, |p| p.line());
            records.push((line, record));
        }

        if records.is_empty() {
            return Err(CsvError::NoDataRows);
        }

        Ok(Self { headers, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| {
            self.headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        })
    }
}

fn cell(record: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parses the transactions in `table`. Rows without a date use `fallback_date`.
pub fn parse_transactions(
    table: &CsvTable,
    profile: &CsvImportProfile,
    fallback_date: NaiveDate,
) -> Result<CsvParse<CsvTransaction>, CsvError> {
    let mapping = match &profile.mapping {
        Some(mapping) => mapping.clone(),
        None => CsvColumnMapping::from_headers(&table.headers),
    };
    if mapping.description_column.is_none() {
        return Err(CsvError::MissingColumn("Description".to_string()));
    }
    if !mapping.has_amount() {
        return Err(CsvError::MissingColumn("Amount".to_string()));
    }

    let mut parsed = CsvParse::default();

    for (line, record) in &table.records {
        let line = *line;

        let Some(description) = cell(record, mapping.description_column) else {
            tracing::debug!(line, "skipping row without description");
            parsed.reject(line, "missing description");
            continue;
        };

        let amount = match row_amount(record, &mapping) {
            Ok(amount) => amount,
            Err(e) => {
                tracing::debug!(line, error = %e, "skipping row with bad amount");
                parsed.reject(line, e.to_string());
                continue;
            }
        };

        let date = match cell(record, mapping.date_column) {
            Some(raw) => match parse_date(raw, &mapping.date_format) {
                Ok(date) => date,
                Err(e) => {
                    tracing::debug!(line, error = %e, "skipping row with bad date");
                    parsed.reject(line, e.to_string());
                    continue;
                }
            },
            None => fallback_date,
        };

        let category = cell(record, mapping.category_column)
            .map(|raw| profile.map_category(raw))
            .filter(|c| c != UNCATEGORIZED);

        parsed.rows.push(CsvTransaction {
            date,
            description: description.to_string(),
            amount,
            category,
            account_id: cell(record, mapping.account_column)
                .unwrap_or(&profile.default_account)
                .to_string(),
            merchant: cell(record, mapping.merchant_column).map(str::to_string),
            memo: cell(record, mapping.memo_column).map(str::to_string),
        });
    }

    Ok(parsed)
}

/// A single amount column, or debit (money out) and credit (money in) columns.
fn row_amount(record: &csv::StringRecord, mapping: &CsvColumnMapping) -> Result<Money, CsvError> {
    if mapping.amount_column.is_some() {
        let raw = cell(record, mapping.amount_column)
            .ok_or_else(|| CsvError::InvalidAmount(String::new()))?;
        return parse_amount(raw);
    }

    let debit = cell(record, mapping.debit_column)
        .map(parse_amount)
        .transpose()?;
    let credit = cell(record, mapping.credit_column)
        .map(parse_amount)
        .transpose()?;
    match (debit, credit) {
        (Some(d), None) => Ok(-d.abs()),
        (None, Some(c)) => Ok(c.abs()),
        (Some(d), Some(c)) => Ok(c.abs() - d.abs()),
        (None, None) => Err(CsvError::InvalidAmount(String::new())),
    }
}

pub fn parse_accounts(table: &CsvTable) -> CsvParse<CsvAccount> {
    let name_col = table.column(&["account", "name"]);
    let type_col = table.column(&["type"]);
    let institution_col = table.column(&["institution", "bank"]);
    let balance_col = table.column(&["balance", "amount"]);
    let currency_col = table.column(&["currency"]);
    let number_col = table.column(&["account number"]);

    let mut parsed = CsvParse::default();

    for (line, record) in &table.records {
        let Some(name) = cell(record, name_col) else {
            parsed.reject(*line, "missing account name");
            continue;
        };
        let balance = match cell(record, balance_col).map(parse_amount) {
            Some(Ok(balance)) => balance,
            Some(Err(e)) => {
                parsed.reject(*line, e.to_string());
                continue;
            }
            None => Money::zero(),
        };

        parsed.rows.push(CsvAccount {
            name: name.to_string(),
            account_type: cell(record, type_col)
                .map(AccountType::parse_lenient)
                .unwrap_or(AccountType::Checking),
            institution: cell(record, institution_col)
                .unwrap_or("Unknown")
                .to_string(),
            balance,
            currency: cell(record, currency_col)
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            account_number: cell(record, number_col).map(str::to_string),
        });
    }

    parsed
}

pub fn parse_spending(table: &CsvTable) -> CsvParse<SpendingRow> {
    let category_col = table.column(&["category", "spending category"]);
    let amount_col = table.column(&["amount", "total"]);
    let month_col = table.column(&["month"]);

    let mut parsed = CsvParse::default();

    for (line, record) in &table.records {
        let Some(category) = cell(record, category_col) else {
            parsed.reject(*line, "missing category");
            continue;
        };
        let amount = match cell(record, amount_col).map(parse_amount) {
            Some(Ok(amount)) => amount,
            Some(Err(e)) => {
                parsed.reject(*line, e.to_string());
                continue;
            }
            None => Money::zero(),
        };

        parsed.rows.push(SpendingRow {
            category: category.to_string(),
            amount,
            month: cell(record, month_col).map(str::to_string),
        });
    }

    parsed
}

/// Reads and parses a transactions file in one step.
pub fn import_csv<R: Read>(
    data: R,
    profile: &CsvImportProfile,
    fallback_date: NaiveDate,
) -> Result<CsvParse<CsvTransaction>, CsvError> {
    let table = CsvTable::read(data, profile)?;
    parse_transactions(&table, profile, fallback_date)
}

fn parse_date(s: &str, format: &str) -> Result<NaiveDate, CsvError> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, format) {
        return Ok(date);
    }

    for fmt in &[
        "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d %b %Y", "%m/%d/%Y",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(CsvError::InvalidDate(s.to_string()))
}

/// Accepts `R` and `$` symbols, thousands separators, a leading sign and
/// accounting parentheses.
pub fn parse_amount(s: &str) -> Result<Money, CsvError> {
    let s = s.trim();
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned = s.replace([',', '$', 'R', ' '], "");
    let mut dec =
        Decimal::from_str(&cleaned).map_err(|_| CsvError::InvalidAmount(s.to_string()))?;
    if negative {
        dec = -dec;
    }
    Money::checked_from_decimal(dec).ok_or_else(|| CsvError::InvalidAmount(s.to_string()))
}
