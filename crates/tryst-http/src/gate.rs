//! Auth/session gate.
//!
//! Every parsed request is classified into one [`Admission`], then turned
//! into a [`GateDecision`]. Rules, highest precedence first:
//!
//! 1. exempt listening port, or a public path → proceed, authenticated
//! 2. POST to the login path → check the form; proceed to the landing page
//!    with a fresh session cookie, or reject with 401
//! 3. valid session cookie → proceed, authenticated
//! 4. anything else → 302 to the login page

use tryst_core::config::AuthConfig;

use crate::request::{Method, Request};
use crate::session::{session_cookie, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Allow-list consulted only by the gate.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths {
    pub prefixes: Vec<String>,
    pub exact: Vec<String>,
}

impl PublicPaths {
    pub fn is_public(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path) || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Public,
    PortExempt,
    SessionValid,
    LoginAttempt,
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue to the route table. `set_cookie` is only present after a
    /// successful login, in which case `authenticated` is false so the
    /// response builder emits it.
    Proceed {
        authenticated: bool,
        set_cookie: Option<String>,
    },
    Redirect { location: String },
    Reject,
}

pub struct AuthGate {
    credentials: Credentials,
    public: PublicPaths,
    exempt_port: Option<u16>,
    login_path: String,
    login_page: String,
    landing_page: String,
    sessions: SessionStore,
}

impl AuthGate {
    pub fn from_config(config: &AuthConfig, sessions: SessionStore) -> Self {
        Self {
            credentials: Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            public: PublicPaths {
                prefixes: config.public_prefixes.clone(),
                exact: config.public_paths.clone(),
            },
            exempt_port: config.exempt_port,
            login_path: config.login_path.clone(),
            login_page: config.login_page.clone(),
            landing_page: config.landing_page.clone(),
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn classify(&self, req: &Request, local_port: u16) -> Admission {
        if self.exempt_port == Some(local_port) {
            Admission::PortExempt
        } else if self.public.is_public(&req.path) {
            Admission::Public
        } else if req.method == Method::Post && req.path == self.login_path {
            Admission::LoginAttempt
        } else if req
            .headers
            .get("Cookie")
            .and_then(|c| self.sessions.validate(c))
            .is_some()
        {
            Admission::SessionValid
        } else {
            Admission::Unauthenticated
        }
    }

    /// Decide whether `req` may proceed. A successful login rewrites
    /// `req.path` to the landing page.
    pub fn evaluate(&self, req: &mut Request, local_port: u16) -> GateDecision {
        let admission = self.classify(req, local_port);
        tracing::debug!(method = %req.method, path = %req.path, ?admission, "gate");

        match admission {
            Admission::PortExempt | Admission::Public | Admission::SessionValid => {
                GateDecision::Proceed {
                    authenticated: true,
                    set_cookie: None,
                }
            }
            Admission::LoginAttempt => {
                if self.check_login(&req.body) {
                    let token = self.sessions.create(&self.credentials.username);
                    req.path = self.landing_page.clone();
                    tracing::info!(user = %self.credentials.username, "login accepted");
                    GateDecision::Proceed {
                        authenticated: false,
                        set_cookie: Some(session_cookie(&token)),
                    }
                } else {
                    tracing::info!("login rejected");
                    GateDecision::Reject
                }
            }
            Admission::Unauthenticated => GateDecision::Redirect {
                location: self.login_page.clone(),
            },
        }
    }

    fn check_login(&self, body: &[u8]) -> bool {
        let mut username = None;
        let mut password = None;
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "username" => username = Some(value.into_owned()),
                "password" => password = Some(value.into_owned()),
                _ => {}
            }
        }
        username.as_deref() == Some(self.credentials.username.as_str())
            && password.as_deref() == Some(self.credentials.password.as_str())
    }
}
