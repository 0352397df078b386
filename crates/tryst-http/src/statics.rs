//! Static file fallback.
//!
//! Used when no route matches. The MIME type guessed from the extension
//! picks the base directory under the static root:
//!
//!   text/html, other text/*              → www/
//!   text/css, text/plain, csv, xml, image/* → static/
//!   video/*                              → videos/
//!   audio/*                              → audios/
//!   application/*                        → apps/

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mime_guess::Mime;

use crate::response::BuiltResponse;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to (file on disk, content type).
    ///
    /// None when the path has no extension, an unknown MIME category, or
    /// tries to climb out of the root.
    pub fn resolve(&self, path: &str) -> Option<(PathBuf, String)> {
        let relative = path.trim_start_matches('/');
        let last = relative.rsplit('/').next()?;
        if !last.contains('.') || relative.split('/').any(|seg| seg == "..") {
            return None;
        }

        let mime = mime_guess::from_path(relative).first()?;
        let base = base_dir_for(&mime)?;
        Some((self.root.join(base).join(relative), mime.essence_str().to_string()))
    }

    /// Read the file for `path`, or produce the matching error page.
    pub async fn serve(&self, path: &str) -> BuiltResponse {
        let Some((file, content_type)) = self.resolve(path) else {
            return BuiltResponse::not_found();
        };

        match tokio::fs::read(&file).await {
            Ok(content) => {
                tracing::debug!(file = %file.display(), %content_type, "serving static file");
                BuiltResponse::new(200, &content_type, content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(file = %file.display(), "static file not found");
                BuiltResponse::not_found()
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "failed to read static file");
                BuiltResponse::internal_error()
            }
        }
    }
}

fn base_dir_for(mime: &Mime) -> Option<&'static str> {
    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("text", "css" | "plain" | "csv" | "xml") => Some("static"),
        ("text", _) => Some("www"),
        ("image", _) => Some("static"),
        ("video", _) => Some("videos"),
        ("audio", _) => Some("audios"),
        ("application", _) => Some("apps"),
        _ => None,
    }
}
