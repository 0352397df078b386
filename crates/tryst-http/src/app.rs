//! Request pipeline: parse → gate → route or static file → response.

use std::sync::Arc;

use crate::gate::{AuthGate, GateDecision};
use crate::request::Request;
use crate::response::BuiltResponse;
use crate::route::RouteTable;
use crate::statics::StaticFiles;

/// Everything a connection worker needs to turn request bytes into
/// response bytes. Shared read-only across workers.
pub struct App {
    routes: Arc<RouteTable>,
    gate: AuthGate,
    statics: StaticFiles,
}

impl App {
    pub fn new(routes: RouteTable, gate: AuthGate, statics: StaticFiles) -> Self {
        Self {
            routes: Arc::new(routes),
            gate,
            statics,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Handle one raw request received on `local_port`.
    pub async fn respond(&self, raw: &[u8], local_port: u16) -> BuiltResponse {
        let req = Request::parse(raw, &self.routes);
        self.dispatch(req, local_port).await
    }

    pub async fn dispatch(&self, mut req: Request, local_port: u16) -> BuiltResponse {
        if req.is_malformed() {
            tracing::debug!("malformed request line");
            return BuiltResponse::not_found();
        }

        let original_path = req.path.clone();
        let (authenticated, set_cookie) = match self.gate.evaluate(&mut req, local_port) {
            GateDecision::Proceed {
                authenticated,
                set_cookie,
            } => (authenticated, set_cookie),
            GateDecision::Redirect { location } => return BuiltResponse::redirect(&location),
            GateDecision::Reject => return BuiltResponse::unauthorized(),
        };
        if req.path != original_path {
            req.resolve(&self.routes);
        }

        let mut resp = match req.route.clone() {
            Some(route) => {
                tracing::debug!(method = %route.method, path = %route.path, "dispatching to handler");
                let reply = match route.handler.invoke(&req.headers, &req.body).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        tracing::warn!(path = %route.path, status = e.status(), error = %e, "handler failed");
                        e.into_reply()
                    }
                };
                BuiltResponse::from_reply(reply)
            }
            None => self.statics.serve(&req.path).await,
        };

        resp.authenticated = authenticated;
        if !authenticated {
            if let Some(cookie) = set_cookie {
                resp.headers.insert("Set-Cookie", cookie);
            }
        }
        resp
    }
}
