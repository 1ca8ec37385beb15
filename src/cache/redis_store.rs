use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use super::LabelCache;
use crate::error::LabelGateError;

const BACKEND: &str = "redis";

/// Redis-backed cache using `GET` and `SET .. EX`.
///
/// The connection is opened on first use and shared afterwards; a failed connect is
/// retried on the next operation. Every operation is bounded by `op_timeout`.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    op_timeout: Duration,
}

fn cache_error(err: impl std::fmt::Display) -> LabelGateError {
    LabelGateError::Cache {
        backend: BACKEND,
        message: err.to_string(),
    }
}

impl RedisCache {
    /// Parses `url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is not a valid Redis connection string.
    pub fn open(url: &str, op_timeout: Duration) -> Result<Self, LabelGateError> {
        let client = redis::Client::open(url).map_err(|err| LabelGateError::InvalidConfig {
            var: "REDIS_URL".into(),
            message: err.to_string(),
        })?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            op_timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, LabelGateError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(cache_error)
            })
            .await?;
        Ok(conn.clone())
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, LabelGateError>
    where
        F: Future<Output = Result<T, LabelGateError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(cache_error(format!(
                "{op} timed out after {}ms",
                self.op_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl LabelCache for RedisCache {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LabelGateError> {
        self.bounded("GET", async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(key).await.map_err(cache_error)?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LabelGateError> {
        let seconds = ttl.as_secs().max(1);
        self.bounded("SET", async {
            let mut conn = self.connection().await?;
            let _: () = conn.set_ex(key, value, seconds).await.map_err(cache_error)?;
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<(), LabelGateError> {
        self.bounded("PING", async {
            let mut conn = self.connection().await?;
            let _: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(cache_error)?;
            Ok(())
        })
        .await
    }
}
