//! Server-side session store.
//!
//! Sessions are created by a successful login and found again through the
//! `sessionid` cookie. Tokens are 128 random bits, hex-encoded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user: String,
    pub created_at: Instant,
}

/// Shared session table. Clones share state.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    /// None = sessions never expire.
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions older than `ttl` stop validating even before a sweep
    /// removes them.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    /// Create a session for `user` and return its token.
    pub fn create(&self, user: &str) -> String {
        let id = hex::encode(rand::random::<[u8; 16]>());
        self.sessions.insert(
            id.clone(),
            Session {
                id: id.clone(),
                user: user.to_string(),
                created_at: Instant::now(),
            },
        );
        tracing::debug!(user, "session created");
        id
    }

    /// Find a live session token in a `Cookie` header value.
    ///
    /// Absent, malformed, unknown or expired cookies all yield None.
    pub fn validate(&self, cookie_header: &str) -> Option<String> {
        cookie_header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| name.trim() == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
            .find(|token| self.is_live(token))
            .map(str::to_string)
    }

    fn is_live(&self, token: &str) -> bool {
        match (self.sessions.get(token), self.ttl) {
            (Some(session), Some(ttl)) => session.created_at.elapsed() < ttl,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions older than `ttl`. Returns how many were removed.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.created_at.elapsed() < ttl);
        before.saturating_sub(self.sessions.len())
    }
}

/// Evict expired sessions periodically.
///
/// Never returns. Abort the spawned task to stop it.
pub async fn expiry_loop(store: SessionStore, ttl: Duration) {
    let check_interval = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    let mut interval = tokio::time::interval(check_interval);

    loop {
        interval.tick().await;
        let removed = store.evict_expired(ttl);
        if removed > 0 {
            tracing::debug!(removed, "expired sessions evicted");
        }
    }
}

/// `Set-Cookie` value for a new session token.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly")
}
