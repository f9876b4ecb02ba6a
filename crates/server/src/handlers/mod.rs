//! HTTP request handlers organized by domain

pub mod accounts;
pub mod aggregation;
pub mod budget;
pub mod classify;
pub mod import;
pub mod transactions;

pub use accounts::*;
pub use aggregation::*;
pub use budget::*;
pub use classify::*;
pub use import::*;
pub use transactions::*;
