//! Turns uploaded CSV files into categorized domain records.

use chrono::NaiveDate;
use finsight_core::{Account, AccountId, Classifier, IdGenerator, Transaction};
use serde::Serialize;
use std::io::Read;

use crate::csv::{
    parse_accounts, parse_spending, parse_transactions, CsvError, CsvFileKind, CsvImportProfile,
    CsvParse, CsvTable, CsvTransaction, SpendingRow,
};

/// Starting confidence for a category supplied by the source file.
pub const IMPORTED_CATEGORY_CONFIDENCE: f64 = 0.85;

/// Stored confidence above which the seeding pass leaves a transaction alone.
pub const ENHANCE_SKIP_THRESHOLD: f64 = 0.9;

/// Outcome of importing a single file, as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    pub imported_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CsvFileKind>,
}

impl ImportReport {
    fn failure(label: &str, message: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("{}: {}", label, message),
            imported_count: 0,
            errors: Vec::new(),
            kind: None,
        }
    }
}

/// Everything an import produced. Only one of the record lists is populated,
/// according to `report.kind`.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub report: ImportReport,
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    pub spending: Vec<SpendingRow>,
}

pub struct ImportPipeline<'a> {
    classifier: &'a dyn Classifier,
    ids: &'a dyn IdGenerator,
    profile: CsvImportProfile,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(classifier: &'a dyn Classifier, ids: &'a dyn IdGenerator) -> Self {
        Self {
            classifier,
            ids,
            profile: CsvImportProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: CsvImportProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Imports one file. Never fails outright: unreadable files come back as
    /// an unsuccessful report. `today` dates rows without a date column and
    /// stamps imported accounts.
    pub fn import<R: Read>(&self, data: R, filename: Option<&str>, today: NaiveDate) -> ImportOutcome {
        let label = filename.unwrap_or("upload");

        let table = match CsvTable::read(data, &self.profile) {
            Ok(table) => table,
            Err(CsvError::NoDataRows) => {
                tracing::info!(file = label, "no data rows");
                return ImportOutcome {
                    report: ImportReport::failure(label, "No valid data found"),
                    ..ImportOutcome::default()
                };
            }
            Err(e) => {
                tracing::warn!(file = label, error = %e, "failed to read CSV");
                return ImportOutcome {
                    report: ImportReport::failure(label, format!("Failed to process file - {}", e)),
                    ..ImportOutcome::default()
                };
            }
        };

        // A fixed mapping means the caller already knows this is a statement.
        let kind = if self.profile.mapping.is_some() {
            CsvFileKind::Transactions
        } else {
            CsvFileKind::detect(filename, &table.headers)
        };

        let mut outcome = ImportOutcome::default();
        let (count, errors) = match kind {
            CsvFileKind::Transactions => {
                match parse_transactions(&table, &self.profile, today) {
                    Ok(parsed) => {
                        let errors = parsed.errors.clone();
                        outcome.transactions = self.build_transactions(parsed);
                        (outcome.transactions.len(), errors)
                    }
                    Err(e) => {
                        tracing::warn!(file = label, error = %e, "unusable transactions file");
                        outcome.report = ImportReport::failure(
                            label,
                            format!("Failed to import transactions: {}", e),
                        );
                        return outcome;
                    }
                }
            }
            CsvFileKind::Accounts => {
                let parsed = parse_accounts(&table);
                outcome.accounts = parsed
                    .rows
                    .into_iter()
                    .map(|row| Account {
                        id: AccountId::new(self.ids.next_id().0),
                        name: row.name,
                        account_type: row.account_type,
                        balance: row.balance,
                        currency: row.currency,
                        institution: row.institution,
                        last_updated: today,
                        account_number: row.account_number,
                    })
                    .collect();
                (outcome.accounts.len(), parsed.errors)
            }
            CsvFileKind::Spending => {
                let parsed = parse_spending(&table);
                outcome.spending = parsed.rows;
                (outcome.spending.len(), parsed.errors)
            }
        };

        tracing::info!(
            file = label,
            kind = %kind,
            imported = count,
            skipped = errors.len(),
            "CSV import finished"
        );

        let verb = if kind == CsvFileKind::Spending { "processed" } else { "imported" };
        outcome.report = ImportReport {
            success: true,
            message: format!("{}: Successfully {} {} {}", label, verb, count, kind),
            imported_count: count,
            errors: errors.iter().map(|e| e.to_string()).collect(),
            kind: Some(kind),
        };
        outcome
    }

    /// IDs are drawn in row order; each row then goes through the
    /// recategorization policy.
    fn build_transactions(&self, parsed: CsvParse<CsvTransaction>) -> Vec<Transaction> {
        parsed
            .rows
            .into_iter()
            .map(|row| {
                let mut tx = Transaction::new(
                    self.ids.next_id(),
                    AccountId::new(row.account_id),
                    row.amount,
                    &row.description,
                    row.date,
                );
                tx.merchant = row.merchant;
                if let Some(category) = row.category {
                    tx.category = category;
                    tx.confidence = Some(IMPORTED_CATEGORY_CONFIDENCE);
                }
                let result = self.classifier.classify(&tx.description, tx.amount_for_classification());
                tx.apply_classification(result);
                tx
            })
            .collect()
    }
}

/// Seeding pass over existing transactions. Anything already above
/// [`ENHANCE_SKIP_THRESHOLD`] is left untouched; returns how many changed.
pub fn enhance_categorization(transactions: &mut [Transaction], classifier: &dyn Classifier) -> usize {
    let mut updated = 0;
    for tx in transactions.iter_mut() {
        if tx.confidence.is_some_and(|c| c > ENHANCE_SKIP_THRESHOLD) {
            continue;
        }
        let result = classifier.classify(&tx.description, tx.amount_for_classification());
        if tx.apply_classification(result) {
            updated += 1;
        }
    }
    tracing::debug!(updated, total = transactions.len(), "enhanced categorization");
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CategoryRuleEngine;
    use finsight_core::{
        sample::sample_transactions, AccountType, Money, SequentialIdGenerator, TransactionId,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn run(data: &str, filename: Option<&str>) -> ImportOutcome {
        let engine = CategoryRuleEngine::default();
        let ids = SequentialIdGenerator::new("imported");
        ImportPipeline::new(&engine, &ids).import(data.as_bytes(), filename, today())
    }

    // ── transactions ──────────────────────────────────────────────────────────

    #[test]
    fn statement_rows_are_classified() {
        let out = run(
            "Date,Description,Amount\n\
             2025-05-26,WOOLWORTHS SANDTON,-1247.50\n\
             2025-05-25,RANDOM MERCHANT XYZ123,-20.00\n",
            Some("statement.csv"),
        );
        assert!(out.report.success);
        assert_eq!(out.report.imported_count, 2);
        assert_eq!(out.report.message, "statement.csv: Successfully imported 2 transactions");

        let woolies = &out.transactions[0];
        assert_eq!(woolies.id.as_str(), "imported-1");
        assert_eq!(woolies.category, "Groceries");
        assert!((woolies.confidence.unwrap() - 0.95).abs() < 1e-9);

        let unknown = &out.transactions[1];
        assert_eq!(unknown.id.as_str(), "imported-2");
        assert_eq!(unknown.category, "Uncategorized");
        assert_eq!(unknown.confidence, Some(0.3));
    }

    #[test]
    fn source_category_kept_unless_engine_is_surer() {
        let out = run(
            "Date,Description,Amount,Category\n\
             2025-05-26,UBER TRIP,-45.00,Travel\n\
             2025-05-26,GIFT FOR MOM,-300.00,Gifts\n",
            Some("transactions.csv"),
        );
        // 0.96 from the engine beats the imported 0.85.
        assert_eq!(out.transactions[0].category, "Transport");
        // Nothing matches, so the source label survives at 0.85.
        assert_eq!(out.transactions[1].category, "Gifts");
        assert_eq!(out.transactions[1].confidence, Some(IMPORTED_CATEGORY_CONFIDENCE));
    }

    #[test]
    fn skipped_rows_are_reported() {
        let out = run(
            "Date,Description,Amount\n2025-05-26,,10\n2025-05-26,SPAR,x\n2025-05-26,SPAR,-80\n",
            Some("statement.csv"),
        );
        assert!(out.report.success);
        assert_eq!(out.report.imported_count, 1);
        assert_eq!(out.report.errors.len(), 2);
        assert!(out.report.errors[0].starts_with("line 2"));
    }

    #[test]
    fn empty_file_is_a_failed_report() {
        let out = run("Date,Description,Amount\n", Some("statement.csv"));
        assert!(!out.report.success);
        assert_eq!(out.report.message, "statement.csv: No valid data found");
        assert!(out.transactions.is_empty());
    }

    #[test]
    fn transactions_file_without_amount_fails() {
        let out = run("Date,Description\n2025-05-01,THING\n", Some("statement.csv"));
        assert!(!out.report.success);
        assert!(out.report.message.contains("Missing required column"));
    }

    // ── accounts & spending ───────────────────────────────────────────────────

    #[test]
    fn accounts_file_builds_accounts() {
        let out = run(
            "Account,Type,Institution,Balance\nEveryday,savings,FNB,1000\n",
            Some("balances.csv"),
        );
        assert_eq!(out.report.kind, Some(CsvFileKind::Accounts));
        assert_eq!(out.report.message, "balances.csv: Successfully imported 1 accounts");
        let acct = &out.accounts[0];
        assert_eq!(acct.id.as_str(), "imported-1");
        assert_eq!(acct.account_type, AccountType::Savings);
        assert_eq!(acct.balance, Money::from_cents(100_000));
        assert_eq!(acct.last_updated, today());
    }

    #[test]
    fn spending_detected_from_headers() {
        let out = run("Category,Total\nGroceries,3200\n", Some("export.csv"));
        assert_eq!(out.report.kind, Some(CsvFileKind::Spending));
        assert_eq!(out.report.message, "export.csv: Successfully processed 1 spending categories");
        assert_eq!(out.spending.len(), 1);
    }

    // ── enhance_categorization ────────────────────────────────────────────────

    #[test]
    fn enhance_skips_confident_transactions() {
        let engine = CategoryRuleEngine::default();
        let mut txs = sample_transactions();
        let before = txs.clone();
        let updated = enhance_categorization(&mut txs, &engine);

        // Only "RESTAURANT MEAL" (0.85 stored, 0.96 from the engine) moves.
        assert_eq!(updated, 1);
        for (old, new) in before.iter().zip(&txs) {
            if old.confidence.unwrap() > ENHANCE_SKIP_THRESHOLD {
                assert_eq!(old, new);
            }
            assert!(new.confidence.unwrap() >= old.confidence.unwrap());
        }
        let meal = txs.iter().find(|t| t.description == "RESTAURANT MEAL").unwrap();
        assert_eq!(meal.category, "Food & Dining");
    }

    #[test]
    fn enhance_upgrades_low_confidence_rows() {
        let engine = CategoryRuleEngine::default();
        let mut txs = vec![Transaction {
            confidence: Some(0.5),
            ..Transaction::new(
                TransactionId::new("t1"),
                AccountId::new("1"),
                Money::from_cents(-4500),
                "UBER TRIP",
                today(),
            )
        }];
        assert_eq!(enhance_categorization(&mut txs, &engine), 1);
        assert_eq!(txs[0].category, "Transport");
    }
}
