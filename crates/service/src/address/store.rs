use async_trait::async_trait;
use thiserror::Error;

/// Transport or connection failure. Absence of a key is never an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Key-value client used by the address service.
///
/// Both conditional writes must be a single atomic operation on the store side;
/// two concurrent `set_if_absent` calls on one key yield exactly one `true`.
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    /// Returns `false` and leaves the value untouched when the key already exists.
    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError>;
    /// Returns `false` without creating anything when the key is missing.
    async fn set_if_present(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError>;
    /// Number of keys removed, 0 or 1.
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// In-memory store for tests and local runs without Redis
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryAddressStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        unavailable: AtomicBool,
    }

    impl InMemoryAddressStore {
        pub fn new() -> Self { Self::default() }

        /// Make every subsequent call fail as if the connection dropped.
        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        /// Write a value bypassing the conditional semantics.
        pub async fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
            self.entries.lock().await.insert(key.to_string(), value.into());
        }

        pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
            self.entries.lock().await.get(key).cloned()
        }

        pub async fn len(&self) -> usize {
            self.entries.lock().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AddressStore for InMemoryAddressStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.check()?;
            Ok(self.entries.lock().await.get(key).cloned())
        }

        async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError> {
            self.check()?;
            let mut entries = self.entries.lock().await;
            if entries.contains_key(key) {
                return Ok(false);
            }
            entries.insert(key.to_string(), value);
            Ok(true)
        }

        async fn set_if_present(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError> {
            self.check()?;
            let mut entries = self.entries.lock().await;
            match entries.get_mut(key) {
                Some(slot) => {
                    *slot = value;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, key: &str) -> Result<u64, StoreError> {
            self.check()?;
            Ok(u64::from(self.entries.lock().await.remove(key).is_some()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.check()
        }
    }
}
