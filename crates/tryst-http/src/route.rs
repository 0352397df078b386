//! Route table and the handler contract.
//!
//! Routes are registered once at startup and never change afterwards.
//! Lookup is exact string equality on (method, path); there are no wildcard
//! segments. Public-path prefixes are the gate's business, not the table's.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use tryst_core::wire::ErrorResponse;

use crate::request::{Headers, Method};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

// ── Reply ─────────────────────────────────────────────────────────────────────

/// What a handler hands back. Every handler builds one explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

impl Reply {
    pub fn bytes(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::bytes(body.into(), CONTENT_TYPE_HTML)
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes(body.into(), CONTENT_TYPE_TEXT)
    }

    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_vec(value).map_err(|e| HandlerError::Internal(e.to_string()))?;
        Ok(Self::bytes(body, CONTENT_TYPE_JSON))
    }

    pub fn json_with_status<T: Serialize>(value: &T, status: u16) -> Result<Self, HandlerError> {
        Ok(Self::json(value)?.with_status(status))
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The request body could not be understood. No state was touched.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    pub fn status(&self) -> u16 {
        match self {
            HandlerError::BadRequest(_) => 400,
            HandlerError::Internal(_) => 500,
        }
    }

    pub fn into_reply(self) -> Reply {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        // Serializing a single String field cannot fail.
        let body = serde_json::to_vec(&body).unwrap_or_default();
        Reply::bytes(body, CONTENT_TYPE_JSON).with_status(status)
    }
}

/// Deserialize a JSON request body, mapping every failure to 400.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, HandlerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(HandlerError::BadRequest("request body required".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| HandlerError::BadRequest(e.to_string()))
}

// ── Handler ───────────────────────────────────────────────────────────────────

/// A hook bound to one (method, path) route.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn invoke(&self, headers: &Headers, body: &Bytes) -> Result<Reply, HandlerError>;
}

/// Plain async closures are handlers. They receive owned copies so the
/// returned future can outlive the borrow of the request.
#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Headers, Bytes) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    async fn invoke(&self, headers: &Headers, body: &Bytes) -> Result<Reply, HandlerError> {
        (self)(headers.clone(), body.clone()).await
    }
}

pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: Arc<dyn Handler>,
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// Immutable (method, path) → handler mapping.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<(Method, String), Arc<Route>>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<Arc<Route>> {
        self.routes.get(&(method.clone(), path.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[derive(Default)]
pub struct RouteTableBuilder {
    routes: HashMap<(Method, String), Arc<Route>>,
}

impl RouteTableBuilder {
    /// Register a route. A later registration of the same pair wins.
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler + 'static) -> Self {
        let key = (method.clone(), path.to_string());
        let route = Arc::new(Route {
            method,
            path: path.to_string(),
            handler: Arc::new(handler),
        });
        if self.routes.insert(key, route).is_some() {
            tracing::warn!(path, "route registered twice, keeping the later handler");
        }
        self
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}
