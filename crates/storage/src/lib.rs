pub mod db;
pub mod store;

pub use db::{create_db, create_memory_db, kv_get, kv_remove, kv_set, DbPool};
pub use store::{StoreError, TransactionFilter, TransactionStore};
