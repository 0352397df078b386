//! Response assembly and serialization.

use bytes::Bytes;

use crate::request::Headers;
use crate::route::{Reply, CONTENT_TYPE_HTML};

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!("tryst/", env!("CARGO_PKG_VERSION"));

const UNAUTHORIZED_BODY: &[u8] = b"<html><head><title>401 Unauthorized</title></head>\
<body><h1>401 Unauthorized</h1><p>Invalid username or password.</p></body></html>";

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        302 => "Found",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A fully assembled response, ready to be written in one go.
#[derive(Debug, Clone)]
pub struct BuiltResponse {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Headers,
    pub content: Bytes,
    /// Set once the gate let the request through without needing to emit
    /// its own headers.
    pub authenticated: bool,
}

impl BuiltResponse {
    /// Response with the standard header set.
    pub fn new(status: u16, content_type: &str, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let mut headers = Headers::new();
        headers.insert("Date", http_date());
        headers.insert("Server", SERVER_NAME);
        headers.insert("Content-Type", content_type);
        headers.insert("Content-Length", content.len().to_string());
        headers.insert("Cache-Control", "no-cache, no-store, must-revalidate");
        headers.insert("Pragma", "no-cache");
        headers.insert("Connection", "close");
        Self {
            status,
            reason: reason_phrase(status),
            headers,
            content,
            authenticated: false,
        }
    }

    pub fn from_reply(reply: Reply) -> Self {
        Self::new(reply.status, &reply.content_type, reply.body)
    }

    pub fn not_found() -> Self {
        Self::new(404, CONTENT_TYPE_HTML, Bytes::from_static(b"404 Not Found"))
    }

    pub fn internal_error() -> Self {
        Self::new(
            500,
            CONTENT_TYPE_HTML,
            Bytes::from_static(b"500 Internal Server Error"),
        )
    }

    /// Literal page for a failed login.
    pub fn unauthorized() -> Self {
        Self::new(401, CONTENT_TYPE_HTML, Bytes::from_static(UNAUTHORIZED_BODY))
    }

    pub fn redirect(location: &str) -> Self {
        Self::new(302, CONTENT_TYPE_HTML, Bytes::new()).with_header("Location", location)
    }

    pub fn service_unavailable() -> Self {
        Self::new(
            503,
            CONTENT_TYPE_HTML,
            Bytes::from_static(b"503 Service Unavailable"),
        )
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Status line, headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut out = Vec::with_capacity(head.len() + self.content.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.content);
        out
    }
}

/// RFC 7231 IMF-fixdate for the `Date` header.
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
