//! Session storage keyed by the `sessionid` cookie

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// Per-session key/value storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read one value from a session
    async fn get(&self, session_id: &str, key: &str) -> AppResult<Option<String>>;

    /// Write one value to a session, refreshing its expiry
    async fn set(&self, session_id: &str, key: &str, value: &str) -> AppResult<()>;
}

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

/// Redis EXPIRE takes a signed count of seconds
fn expire_seconds(ttl_seconds: u64) -> AppResult<i64> {
    i64::try_from(ttl_seconds).map_err(|_| {
        AppError::Internal(format!(
            "session.ttl_seconds {} is out of range (max {})",
            ttl_seconds,
            i64::MAX
        ))
    })
}

/// Sessions stored as Redis hashes (`session:{id}`) with a sliding TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_seconds: i64,
}

impl RedisSessionStore {
    /// Connect to Redis and check the connection
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let ttl_seconds = expire_seconds(ttl_seconds)?;

        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { conn, ttl_seconds })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: &str, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.hget(session_key(session_id), key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session: {}", e)))
    }

    async fn set(&self, session_id: &str, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let hash = session_key(session_id);

        redis::pipe()
            .atomic()
            .hset(&hash, key, value)
            .ignore()
            .expire(&hash, self.ttl_seconds)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write session: {}", e)))
    }
}

struct MemorySession {
    values: HashMap<String, String>,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl MemorySession {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local sessions, lost on restart. Each write slides the expiry
/// and drops sessions that have already expired.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, MemorySession>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> AppResult<Option<String>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|session| session.is_live(Instant::now()))
            .and_then(|session| session.values.get(key))
            .cloned())
    }

    async fn set(&self, session_id: &str, key: &str, value: &str) -> AppResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.is_live(now));

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| MemorySession {
                values: HashMap::new(),
                expires_at: None,
            });
        session.values.insert(key.to_string(), value.to_string());
        session.expires_at = now.checked_add(self.ttl);
        Ok(())
    }
}
