//! tryst-http: a small HTTP/1.1 engine over raw TCP sockets.
//!
//! One read, one write, one request per connection. Every connection flows
//! through the same pipeline:
//!
//!   bytes → [`request::Request::parse`] → [`gate::AuthGate`] →
//!   [`route::RouteTable`] or [`statics::StaticFiles`] →
//!   [`response::BuiltResponse`] → bytes
//!
//! [`server::Server`] owns the accept loop and the per-connection workers.

pub mod app;
pub mod gate;
pub mod request;
pub mod response;
pub mod route;
pub mod server;
pub mod session;
pub mod statics;

pub use app::App;
pub use gate::{AuthGate, Credentials, GateDecision, PublicPaths};
pub use request::{looks_like_http, Headers, Method, Request};
pub use response::BuiltResponse;
pub use route::{parse_json, Handler, HandlerError, Reply, Route, RouteTable};
pub use server::{RawPayloadHandler, Server, ServerLimits};
pub use session::{SessionStore, SESSION_COOKIE};
pub use statics::StaticFiles;
