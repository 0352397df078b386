//! CLI command modules.

pub mod http;
pub mod peer;
pub mod tracker;
