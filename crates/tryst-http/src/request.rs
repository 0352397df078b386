//! Request parsing.
//!
//! The whole request is expected to arrive in the single read the worker
//! performs. Bodies larger than that read are truncated, not reassembled.
//! Parsing never fails: input without a recognisable request line yields a
//! request with an empty path, which later stages answer with 404.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::route::{Route, RouteTable};

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

// ── Method ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Other(String),
}

impl Method {
    /// Methods treated as HTTP when sniffing a peer connection.
    pub const KNOWN: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Head,
        Method::Options,
        Method::Patch,
    ];

    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Other(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if the payload opens with `<METHOD> /`.
///
/// Peers share one port between HTTP and raw text messages; anything that
/// fails this check is a raw message.
pub fn looks_like_http(payload: &[u8]) -> bool {
    Method::KNOWN.iter().any(|m| {
        let token = m.as_str().as_bytes();
        payload.len() > token.len() + 1
            && payload.starts_with(token)
            && payload[token.len()] == b' '
            && payload[token.len() + 1] == b'/'
    })
}

// ── Headers ───────────────────────────────────────────────────────────────────

/// Header map with case-insensitive names. Insertion order is kept so
/// serialized responses are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace. The original spelling of a replaced name is kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Fold a repeated header into the existing entry. `Cookie` values are
    /// joined with `; `, every other list with `, `.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let sep = if name.eq_ignore_ascii_case("Cookie") { "; " } else { ", " };
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => {
                entry.1.push_str(sep);
                entry.1.push_str(&value);
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Request {
    pub method: Method,
    /// Path without query string. Empty when the request line was unusable.
    pub path: String,
    pub query: Option<String>,
    pub version: String,
    pub headers: Headers,
    pub body: Bytes,
    /// Exact (method, path) match in the route table, if any.
    pub route: Option<Arc<Route>>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers.len())
            .field("body_len", &self.body.len())
            .field("routed", &self.route.is_some())
            .finish()
    }
}

impl Request {
    /// Parse raw bytes and resolve the route against `routes`.
    pub fn parse(raw: &[u8], routes: &RouteTable) -> Self {
        let mut req = Self::parse_unrouted(raw);
        req.resolve(routes);
        req
    }

    /// Parse raw bytes without touching a route table.
    pub fn parse_unrouted(raw: &[u8]) -> Self {
        let (head, body) = match find(raw, HEAD_TERMINATOR) {
            Some(i) => (&raw[..i], Bytes::copy_from_slice(&raw[i + HEAD_TERMINATOR.len()..])),
            None => (raw, Bytes::new()),
        };
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split("\r\n");

        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let method = Method::from_token(parts.next().unwrap_or_default());
        let target = parts.next().unwrap_or_default();
        let version = parts.next().unwrap_or_default().to_string();

        let (path, query) = if target.starts_with('/') {
            match target.split_once('?') {
                Some((p, q)) => (p.to_string(), Some(q.to_string())),
                None => (target.to_string(), None),
            }
        } else {
            (String::new(), None)
        };

        let mut headers = Headers::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    headers.append(name, value.trim());
                }
            }
        }

        Self {
            method,
            path,
            query,
            version,
            headers,
            body,
            route: None,
        }
    }

    /// Re-run route lookup, e.g. after the gate rewrote the path.
    pub fn resolve(&mut self, routes: &RouteTable) {
        self.route = routes.lookup(&self.method, &self.path);
    }

    pub fn is_malformed(&self) -> bool {
        self.path.is_empty()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
