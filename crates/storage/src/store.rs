use finsight_core::sample::{sample_accounts, sample_transactions};
use finsight_core::{Account, Classifier, Transaction, TransactionId, TransactionUpdate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::db::{kv_get, kv_remove, kv_set, DbPool};

const TRANSACTIONS_KEY: &str = "finsight-transactions";
const IMPORTED_IDS_KEY: &str = "finsight-imported-ids";
const ACCOUNTS_KEY: &str = "finsight-accounts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub category: Option<String>,
    pub account: Option<String>,
}

impl TransactionFilter {
    fn matches(&self, tx: &Transaction) -> bool {
        self.category.as_deref().map_or(true, |c| tx.category == c)
            && self.account.as_deref().map_or(true, |a| tx.account_id.as_str() == a)
    }
}

/// The mutable transaction list, mirrored into the key-value table after
/// every change. Transactions are kept newest first.
pub struct TransactionStore {
    pool: DbPool,
    transactions: Vec<Transaction>,
    imported_ids: BTreeSet<TransactionId>,
    accounts: Vec<Account>,
}

impl TransactionStore {
    /// Restores persisted state. With nothing persisted the store starts from
    /// the sample data when `seed_sample` is set, else empty. Unreadable
    /// stored values are logged and treated as absent.
    pub async fn load(pool: DbPool, seed_sample: bool) -> Result<Self, StoreError> {
        let transactions = match read_json::<Vec<Transaction>>(&pool, TRANSACTIONS_KEY).await? {
            Some(txs) => txs,
            None if seed_sample => sample_transactions(),
            None => Vec::new(),
        };
        let imported_ids = read_json(&pool, IMPORTED_IDS_KEY).await?.unwrap_or_default();
        let accounts = match read_json::<Vec<Account>>(&pool, ACCOUNTS_KEY).await? {
            Some(accounts) => accounts,
            None if seed_sample => sample_accounts(),
            None => Vec::new(),
        };

        tracing::info!(
            transactions = transactions.len(),
            accounts = accounts.len(),
            "transaction store loaded"
        );

        Ok(Self {
            pool,
            transactions,
            imported_ids,
            accounts,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn list(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn imported_count(&self) -> usize {
        self.imported_ids.len()
    }

    pub fn is_imported(&self, id: &TransactionId) -> bool {
        self.imported_ids.contains(id)
    }

    /// Adds transactions whose IDs are not already present and marks them as
    /// imported. Returns how many were added.
    pub async fn add_transactions(&mut self, new: Vec<Transaction>) -> Result<usize, StoreError> {
        self.insert(new, true).await
    }

    /// Adds provider-synced transactions. They are not marked as imported, so
    /// [`Self::clear_imported`] leaves them alone.
    pub async fn add_synced_transactions(&mut self, new: Vec<Transaction>) -> Result<usize, StoreError> {
        self.insert(new, false).await
    }

    async fn insert(&mut self, new: Vec<Transaction>, mark_imported: bool) -> Result<usize, StoreError> {
        let mut existing: BTreeSet<TransactionId> =
            self.transactions.iter().map(|t| t.id.clone()).collect();

        let mut added = 0;
        for tx in new {
            if !existing.insert(tx.id.clone()) {
                tracing::debug!(id = %tx.id, "skipping duplicate transaction");
                continue;
            }
            if mark_imported {
                self.imported_ids.insert(tx.id.clone());
            }
            self.transactions.push(tx);
            added += 1;
        }

        // Stable, so same-day transactions keep their relative order.
        self.transactions.sort_by(|a, b| b.date.cmp(&a.date));
        self.persist().await?;

        tracing::info!(added, mark_imported, total = self.transactions.len(), "transactions added");
        Ok(added)
    }

    /// Adds accounts whose IDs are not already present.
    pub async fn add_accounts(&mut self, new: Vec<Account>) -> Result<usize, StoreError> {
        let mut added = 0;
        for account in new {
            if self.accounts.iter().any(|a| a.id == account.id) {
                continue;
            }
            self.accounts.push(account);
            added += 1;
        }
        write_json(&self.pool, ACCOUNTS_KEY, &self.accounts).await?;
        Ok(added)
    }

    /// Merges `update` into the transaction as-is. See [`Self::confirm_category`]
    /// for user category choices.
    pub async fn update_transaction(
        &mut self,
        id: &TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, StoreError> {
        let tx = self.find_mut(id)?;
        update.apply(tx);
        let updated = tx.clone();
        self.persist().await?;
        Ok(updated)
    }

    pub async fn confirm_category(
        &mut self,
        id: &TransactionId,
        category: &str,
    ) -> Result<Transaction, StoreError> {
        let tx = self.find_mut(id)?;
        tx.confirm_category(category);
        let updated = tx.clone();
        self.persist().await?;
        Ok(updated)
    }

    /// Re-runs `classifier` on one transaction. The result is only kept if it
    /// is strictly more confident than what is stored.
    pub async fn recategorize(
        &mut self,
        id: &TransactionId,
        classifier: &dyn Classifier,
    ) -> Result<(bool, Transaction), StoreError> {
        let tx = self.find_mut(id)?;
        let result = classifier.classify(&tx.description, tx.amount_for_classification());
        let changed = tx.apply_classification(result);
        let snapshot = tx.clone();
        if changed {
            self.persist().await?;
        }
        Ok((changed, snapshot))
    }

    pub async fn recategorize_all(&mut self, classifier: &dyn Classifier) -> Result<usize, StoreError> {
        let mut changed = 0;
        for tx in self.transactions.iter_mut() {
            let result = classifier.classify(&tx.description, tx.amount_for_classification());
            if tx.apply_classification(result) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist().await?;
        }
        tracing::info!(changed, total = self.transactions.len(), "recategorized transactions");
        Ok(changed)
    }

    /// Removes only transactions added through [`Self::add_transactions`].
    pub async fn clear_imported(&mut self) -> Result<usize, StoreError> {
        let before = self.transactions.len();
        let imported = std::mem::take(&mut self.imported_ids);
        self.transactions.retain(|t| !imported.contains(&t.id));
        let removed = before - self.transactions.len();

        write_json(&self.pool, TRANSACTIONS_KEY, &self.transactions).await?;
        kv_remove(&self.pool, IMPORTED_IDS_KEY).await?;

        tracing::info!(removed, "cleared imported transactions");
        Ok(removed)
    }

    pub async fn clear_all(&mut self) -> Result<(), StoreError> {
        self.transactions.clear();
        self.imported_ids.clear();

        // An empty list is stored so the next load does not reseed samples.
        write_json(&self.pool, TRANSACTIONS_KEY, &self.transactions).await?;
        kv_remove(&self.pool, IMPORTED_IDS_KEY).await?;

        tracing::info!("cleared all transactions");
        Ok(())
    }

    fn find_mut(&mut self, id: &TransactionId) -> Result<&mut Transaction, StoreError> {
        self.transactions
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn persist(&self) -> Result<(), StoreError> {
        write_json(&self.pool, TRANSACTIONS_KEY, &self.transactions).await?;
        write_json(&self.pool, IMPORTED_IDS_KEY, &self.imported_ids).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(pool: &DbPool, key: &str) -> Result<Option<T>, StoreError> {
    let Some(raw) = kv_get(pool, key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable stored value");
            Ok(None)
        }
    }
}

async fn write_json<T: Serialize + ?Sized>(pool: &DbPool, key: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    kv_set(pool, key, &raw).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_db, create_memory_db};
    use chrono::NaiveDate;
    use finsight_core::{AccountId, ClassificationResult, Money};

    fn tx(id: &str, day: u32, description: &str, cents: i64) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            AccountId::new("1"),
            Money::from_cents(cents),
            description,
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        )
    }

    /// Puts everything mentioning "coffee" in Coffee at a fixed confidence.
    struct CoffeeClassifier(f64);

    impl Classifier for CoffeeClassifier {
        fn classify(&self, description: &str, _amount: Option<f64>) -> ClassificationResult {
            if description.to_lowercase().contains("coffee") {
                ClassificationResult::new("Coffee", self.0)
            } else {
                ClassificationResult::uncategorized()
            }
        }
    }

    async fn empty_store() -> TransactionStore {
        TransactionStore::load(create_memory_db().await.unwrap(), false)
            .await
            .unwrap()
    }

    // ── loading ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn seeds_sample_data_when_nothing_stored() {
        let store = TransactionStore::load(create_memory_db().await.unwrap(), true)
            .await
            .unwrap();
        assert_eq!(store.transactions().len(), 10);
        assert_eq!(store.accounts().len(), 5);
        assert_eq!(store.imported_count(), 0);
    }

    #[tokio::test]
    async fn starts_empty_without_seeding() {
        let store = empty_store().await;
        assert!(store.transactions().is_empty());
        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn corrupt_value_falls_back() {
        let pool = create_memory_db().await.unwrap();
        kv_set(&pool, TRANSACTIONS_KEY, "{not json").await.unwrap();
        let store = TransactionStore::load(pool, true).await.unwrap();
        assert_eq!(store.transactions().len(), 10);
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let pool = create_db(&path).await.unwrap();
        let mut store = TransactionStore::load(pool.clone(), false).await.unwrap();
        store
            .add_transactions(vec![tx("a", 1, "COFFEE", -3500)])
            .await
            .unwrap();
        store
            .confirm_category(&TransactionId::new("a"), "Treats")
            .await
            .unwrap();
        pool.close().await;

        let store = TransactionStore::load(create_db(&path).await.unwrap(), true)
            .await
            .unwrap();
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].category, "Treats");
        assert_eq!(store.transactions()[0].confidence, Some(1.0));
        assert!(store.is_imported(&TransactionId::new("a")));
    }

    // ── add / clear ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn add_ignores_known_ids_and_sorts_newest_first() {
        let mut store = empty_store().await;
        let added = store
            .add_transactions(vec![tx("a", 1, "A", -100), tx("b", 3, "B", -100)])
            .await
            .unwrap();
        assert_eq!(added, 2);

        let added = store
            .add_transactions(vec![tx("a", 9, "A again", -100), tx("c", 2, "C", -100)])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.imported_count(), 3);

        let ids: Vec<_> = store.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert_eq!(store.get(&TransactionId::new("a")).unwrap().description, "A");
    }

    #[tokio::test]
    async fn clear_imported_keeps_seed_data() {
        let mut store = TransactionStore::load(create_memory_db().await.unwrap(), true)
            .await
            .unwrap();
        store
            .add_transactions(vec![tx("x1", 1, "X", -100), tx("x2", 2, "Y", -100)])
            .await
            .unwrap();
        assert_eq!(store.transactions().len(), 12);

        assert_eq!(store.clear_imported().await.unwrap(), 2);
        assert_eq!(store.transactions().len(), 10);
        assert_eq!(store.imported_count(), 0);
    }

    #[tokio::test]
    async fn synced_transactions_survive_clear_imported() {
        let mut store = empty_store().await;
        store
            .add_transactions(vec![tx("csv-1", 1, "FROM CSV", -100)])
            .await
            .unwrap();
        let added = store
            .add_synced_transactions(vec![tx("yodlee-1", 2, "FROM BANK", -100), tx("csv-1", 2, "dupe", -1)])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.imported_count(), 1);
        assert!(!store.is_imported(&TransactionId::new("yodlee-1")));

        assert_eq!(store.clear_imported().await.unwrap(), 1);
        let ids: Vec<_> = store.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["yodlee-1"]);
    }

    #[tokio::test]
    async fn clear_all_is_not_reseeded() {
        let pool = create_memory_db().await.unwrap();
        let mut store = TransactionStore::load(pool.clone(), true).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.transactions().is_empty());

        let reloaded = TransactionStore::load(pool, true).await.unwrap();
        assert!(reloaded.transactions().is_empty());
    }

    // ── updates & recategorization ────────────────────────────────────────────

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let mut store = empty_store().await;
        let err = store
            .update_transaction(&TransactionId::new("nope"), TransactionUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let mut store = empty_store().await;
        store.add_transactions(vec![tx("a", 1, "A", -100)]).await.unwrap();
        let updated = store
            .update_transaction(
                &TransactionId::new("a"),
                TransactionUpdate {
                    merchant: Some("Acme".to_string()),
                    pending: Some(true),
                    ..TransactionUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.merchant.as_deref(), Some("Acme"));
        assert!(updated.pending);
        assert_eq!(updated.category, "Uncategorized");
    }

    #[tokio::test]
    async fn recategorize_only_raises_confidence() {
        let mut store = empty_store().await;
        store
            .add_transactions(vec![tx("a", 1, "COFFEE SHOP", -3500)])
            .await
            .unwrap();
        let id = TransactionId::new("a");

        let (changed, t) = store.recategorize(&id, &CoffeeClassifier(0.7)).await.unwrap();
        assert!(changed);
        assert_eq!(t.category, "Coffee");

        let (changed, t) = store.recategorize(&id, &CoffeeClassifier(0.7)).await.unwrap();
        assert!(!changed);
        assert_eq!(t.confidence, Some(0.7));

        let (changed, _) = store.recategorize(&id, &CoffeeClassifier(0.9)).await.unwrap();
        assert!(changed);
    }

    #[tokio::test]
    async fn recategorize_never_touches_manual_choice() {
        let mut store = empty_store().await;
        store
            .add_transactions(vec![tx("a", 1, "COFFEE SHOP", -3500)])
            .await
            .unwrap();
        let id = TransactionId::new("a");
        store.confirm_category(&id, "Work").await.unwrap();

        let (changed, t) = store.recategorize(&id, &CoffeeClassifier(0.99)).await.unwrap();
        assert!(!changed);
        assert_eq!(t.category, "Work");
    }

    #[tokio::test]
    async fn recategorize_all_counts_changes() {
        let mut store = empty_store().await;
        store
            .add_transactions(vec![
                tx("a", 1, "COFFEE SHOP", -3500),
                tx("b", 2, "SOMETHING ELSE", -100),
                tx("c", 3, "coffee beans", -9000),
            ])
            .await
            .unwrap();

        // Every transaction starts without a confidence, so all three accept
        // their first result.
        assert_eq!(store.recategorize_all(&CoffeeClassifier(0.8)).await.unwrap(), 3);
        assert_eq!(store.recategorize_all(&CoffeeClassifier(0.8)).await.unwrap(), 0);

        let list = store.list(&TransactionFilter {
            category: Some("Coffee".to_string()),
            account: None,
        });
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn filter_by_account() {
        let mut store = TransactionStore::load(create_memory_db().await.unwrap(), true)
            .await
            .unwrap();
        store.add_transactions(vec![tx("z", 1, "Z", -1)]).await.unwrap();
        let list = store.list(&TransactionFilter {
            category: None,
            account: Some("3".to_string()),
        });
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|t| t.account_id.as_str() == "3"));
    }

    #[tokio::test]
    async fn accounts_are_deduplicated_by_id() {
        let mut store = empty_store().await;
        let acct = Account::new("acc-1", "Everyday", finsight_core::AccountType::Checking, Money::zero());
        assert_eq!(store.add_accounts(vec![acct.clone()]).await.unwrap(), 1);
        assert_eq!(store.add_accounts(vec![acct]).await.unwrap(), 0);
        assert_eq!(store.accounts().len(), 1);
    }
}
