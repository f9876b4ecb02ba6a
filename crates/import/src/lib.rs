pub mod csv;
pub mod default_rules;
pub mod pipeline;
pub mod rules;

pub use csv::{
    CsvAccount, CsvColumnMapping, CsvError, CsvFileKind, CsvImportProfile, CsvTransaction,
    RowError, SpendingRow,
};
pub use default_rules::default_rules;
pub use pipeline::{enhance_categorization, ImportOutcome, ImportPipeline, ImportReport};
pub use rules::{AmountRange, CategoryRule, CategoryRuleEngine, RuleError};
