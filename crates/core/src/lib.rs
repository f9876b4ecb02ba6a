pub mod account;
pub mod budget;
pub mod category;
pub mod classification;
pub mod ids;
pub mod money;
pub mod period;
pub mod sample;
pub mod transaction;

pub use account::{
    asset_allocation, calculate_net_worth, Account, AccountId, AccountType, AllocationSlice,
    NetWorth, DEFAULT_CURRENCY,
};
pub use budget::{
    category_budgets, Budget, BudgetCadence, Goal, GoalKind, GoalPriority, GoalProgress,
};
pub use category::{default_categories, Category, KnownCategory};
pub use classification::{
    ClassificationResult, Classifier, ConfidenceLevel, AUTHORITATIVE_CONFIDENCE,
    DEFAULT_CONFIDENCE, MAX_ENGINE_CONFIDENCE, UNCATEGORIZED,
};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use money::Money;
pub use period::{BudgetPeriod, DateRange};
pub use transaction::{
    filter_by_date_range, group_by_category, spending_by_category, CategorySpend,
    PeriodSummary, Transaction, TransactionId, TransactionUpdate,
};
