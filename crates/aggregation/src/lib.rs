//! Client for the Yodlee account-aggregation API.
//!
//! Provider transactions arrive already categorized; they are mapped into
//! domain types with [`finsight_core::AUTHORITATIVE_CONFIDENCE`] and never go
//! through the rule engine.

pub mod client;
pub mod error;
pub mod fastlink;
pub mod models;

pub use client::{SyncResult, YodleeClient, YodleeConfig};
pub use error::AggregationError;
pub use fastlink::{FastLinkFlow, FastLinkOptions};
pub use models::{map_account, map_account_type, map_transaction, provider_id, UserResponse};
