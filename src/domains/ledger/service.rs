// ============================================================================
// BALANCE LEDGER - $UPV balance per user
// ============================================================================
// Every balance mutation is a single atomic store primitive (SET, SET NX or
// INCRBY). There is no read-modify-write path.
// ============================================================================

use shared::{CacheKeys, KeyValueStore, Username};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::models::{BalanceUpdate, LedgerError};
use crate::observability::record_ledger_operation;

#[derive(Clone)]
pub struct BalanceLedger {
    store: Arc<dyn KeyValueStore>,
}

impl BalanceLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Writes the starting balance. Overwrites any existing record.
    pub async fn initialize(&self, username: &Username, default_balance: i64) -> Result<(), LedgerError> {
        let start = Instant::now();
        let key = CacheKeys::user_balance(username.as_str());
        let result = self.store.set(&key, &default_balance.to_string()).await;
        record_ledger_operation("initialize", result.is_ok(), start.elapsed().as_secs_f64());

        result.map_err(|e| self.store_failure("initialize", username, e))?;
        info!(username = %username, balance = default_balance, "💰 Balance initialized");
        Ok(())
    }

    /// Writes the starting balance only when no record exists. Returns whether
    /// this call created the record.
    pub async fn initialize_if_absent(
        &self,
        username: &Username,
        default_balance: i64,
    ) -> Result<bool, LedgerError> {
        let start = Instant::now();
        let key = CacheKeys::user_balance(username.as_str());
        let result = self.store.set_if_absent(&key, &default_balance.to_string()).await;
        record_ledger_operation("initialize_if_absent", result.is_ok(), start.elapsed().as_secs_f64());

        let created = result.map_err(|e| self.store_failure("initialize_if_absent", username, e))?;
        if created {
            info!(username = %username, balance = default_balance, "💰 Balance created on first use");
        }
        Ok(created)
    }

    /// Atomically adds `delta` and returns the new total.
    pub async fn apply_delta(&self, username: &Username, delta: i64) -> Result<BalanceUpdate, LedgerError> {
        let start = Instant::now();
        let key = CacheKeys::user_balance(username.as_str());
        let result = self.store.incr_by(&key, delta).await;
        record_ledger_operation("apply_delta", result.is_ok(), start.elapsed().as_secs_f64());

        let new_balance = result.map_err(|e| self.store_failure("apply_delta", username, e))?;
        info!(username = %username, delta = delta, balance = new_balance, "📊 Updated points");

        Ok(BalanceUpdate {
            username: username.to_string(),
            delta,
            new_balance,
        })
    }

    /// Current balance, or `None` when the user was never initialized.
    pub async fn read(&self, username: &Username) -> Result<Option<i64>, LedgerError> {
        let start = Instant::now();
        let key = CacheKeys::user_balance(username.as_str());
        let result = self.store.get(&key).await;
        record_ledger_operation("read", result.is_ok(), start.elapsed().as_secs_f64());

        let raw = match result.map_err(|e| self.store_failure("read", username, e))? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        raw.trim().parse::<i64>().map(Some).map_err(|_| {
            error!(username = %username, raw = %raw, "Stored balance is not an integer");
            LedgerError::CorruptBalance {
                username: username.to_string(),
                raw,
            }
        })
    }

    /// Reads the balance, creating it with `default_balance` first when absent.
    pub async fn read_or_initialize(&self, username: &Username, default_balance: i64) -> Result<i64, LedgerError> {
        if let Some(balance) = self.read(username).await? {
            return Ok(balance);
        }

        self.initialize_if_absent(username, default_balance).await?;

        // Another session may have initialized or moved the balance in between.
        Ok(self.read(username).await?.unwrap_or(default_balance))
    }

    fn store_failure(&self, operation: &str, username: &Username, err: shared::StoreError) -> LedgerError {
        if err.is_retryable() {
            warn!(operation = operation, username = %username, error = %err, "⚠️ Balance store unavailable, retryable");
        } else {
            error!(operation = operation, username = %username, error = %err, "❌ Balance store command failed");
        }
        LedgerError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::{MemoryStore, StoreError};

    fn user(name: &str) -> Username {
        Username::parse(name).unwrap()
    }

    fn ledger() -> (BalanceLedger, MemoryStore) {
        let store = MemoryStore::new();
        (BalanceLedger::new(Arc::new(store.clone())), store)
    }

    struct DownStore;

    #[async_trait]
    impl KeyValueStore for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
        async fn set_if_absent(&self, _key: &str, _value: &str) -> Result<bool, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
        async fn incr_by(&self, _key: &str, _delta: i64) -> Result<i64, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_read_uninitialized_is_absent() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.read(&user("nobody")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_then_read() {
        let (ledger, store) = ledger();
        ledger.initialize(&user("alice"), 250).await.unwrap();

        assert_eq!(ledger.read(&user("alice")).await.unwrap(), Some(250));
        assert_eq!(store.get("upv_alice").await.unwrap().as_deref(), Some("250"));
    }

    #[tokio::test]
    async fn test_initialize_overwrites() {
        let (ledger, _) = ledger();
        let alice = user("alice");
        ledger.initialize(&alice, 100).await.unwrap();
        ledger.apply_delta(&alice, 5).await.unwrap();
        ledger.initialize(&alice, 100).await.unwrap();

        assert_eq!(ledger.read(&alice).await.unwrap(), Some(100));
    }

    #[tokio::test]
    async fn test_apply_delta_returns_new_total() {
        let (ledger, _) = ledger();
        let bob = user("bob");
        ledger.initialize(&bob, 10).await.unwrap();

        let update = ledger.apply_delta(&bob, -3).await.unwrap();
        assert_eq!(update.new_balance, 7);
        assert_eq!(update.delta, -3);
        assert_eq!(ledger.apply_delta(&bob, 20).await.unwrap().new_balance, 27);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deltas_are_not_lost() {
        let (ledger, _) = ledger();
        let carol = user("carol");
        ledger.initialize(&carol, 1_000).await.unwrap();

        let deltas: Vec<i64> = (0..200).map(|i| if i % 3 == 0 { -7 } else { 11 }).collect();
        let expected = 1_000 + deltas.iter().sum::<i64>();

        let handles: Vec<_> = deltas
            .into_iter()
            .map(|delta| {
                let ledger = ledger.clone();
                let carol = carol.clone();
                tokio::spawn(async move { ledger.apply_delta(&carol, delta).await.unwrap() })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ledger.read(&carol).await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_corrupt_balance_is_surfaced() {
        let (ledger, store) = ledger();
        store.set("upv_dave", "lots").await.unwrap();

        let err = ledger.read(&user("dave")).await.unwrap_err();
        assert!(matches!(err, LedgerError::CorruptBalance { ref raw, .. } if raw == "lots"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_store_outage_propagates_as_retryable() {
        let ledger = BalanceLedger::new(Arc::new(DownStore));
        let erin = user("erin");

        assert!(ledger.read(&erin).await.unwrap_err().is_retryable());
        assert!(ledger.apply_delta(&erin, 1).await.unwrap_err().is_retryable());
        assert!(ledger.initialize(&erin, 1).await.unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn test_read_or_initialize_keeps_existing_balance() {
        let (ledger, _) = ledger();
        let frank = user("frank");

        assert_eq!(ledger.read_or_initialize(&frank, 100).await.unwrap(), 100);
        ledger.apply_delta(&frank, 42).await.unwrap();
        assert_eq!(ledger.read_or_initialize(&frank, 100).await.unwrap(), 142);
        assert!(!ledger.initialize_if_absent(&frank, 5).await.unwrap());
    }
}
