use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, AsyncConnectionConfig, Client};
use tracing::{debug, info};

use super::store::{AddressStore, StoreError};

/// Redis-backed store over a single multiplexed connection.
///
/// The connection is cheap to clone and pipelines concurrent requests, so one
/// instance is shared by every in-flight handler. Failed commands are not retried.
#[derive(Clone)]
pub struct RedisAddressStore {
    conn: MultiplexedConnection,
}

impl RedisAddressStore {
    /// Open the connection and PING it; an unreachable server is an error.
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let config = AsyncConnectionConfig::new()
            .set_connection_timeout(connect_timeout)
            .set_response_timeout(response_timeout);
        let conn = client.get_multiplexed_async_connection_with_config(&config).await?;
        let store = Self { conn };
        store.ping().await?;
        info!(event = "store_connected", "redis connection established");
        Ok(store)
    }
}

#[async_trait]
impl AddressStore for RedisAddressStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // SET .. NX replies OK when written and nil when the key exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        debug!(%key, created = reply.is_some(), "set nx");
        Ok(reply.is_some())
    }

    async fn set_if_present(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        debug!(%key, updated = reply.is_some(), "set xx");
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong != "PONG" {
            return Err(StoreError::Unavailable(format!("unexpected PING reply: {pong}")));
        }
        Ok(())
    }
}
