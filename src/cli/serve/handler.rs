//! Per-request routing for the dev server.

use super::lifecycle::InFlight;
use super::path::{self, Target};
use super::response::{
    respond_compile_error, respond_file, respond_html, respond_not_found, respond_unavailable,
};
use crate::compiler::{CompileOptions, compile_file};
use crate::core::is_shutdown;
use crate::embed::serve::LIVE_RELOAD_PATH;
use crate::logger::status_error;
use crate::reload::Broadcaster;
use crate::debug;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::Request;

/// State shared by every request of one server run.
pub struct ServeContext {
    pub site_dir: PathBuf,
    pub options: CompileOptions,
    pub broadcaster: Arc<Broadcaster>,
    pub in_flight: InFlight,
}

impl ServeContext {
    pub fn new(site_dir: PathBuf, options: CompileOptions) -> Self {
        Self {
            site_dir,
            options,
            broadcaster: Broadcaster::new(),
            in_flight: InFlight::default(),
        }
    }
}

/// Whether `url` (path plus optional query) is the live-reload stream.
pub fn is_live_reload(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path == LIVE_RELOAD_PATH
}

/// Compile a page, serve a site file, or answer 404.
pub fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    if is_shutdown() {
        return respond_unavailable(request);
    }

    match path::resolve(request.url(), &ctx.site_dir) {
        Target::Page(file) => respond_page(request, &file, ctx),
        Target::Static(file) => respond_file(request, &file),
        Target::NotFound => {
            debug!("serve"; "404 {}", request.url());
            respond_not_found(request)
        }
    }
}

fn respond_page(request: Request, file: &Path, ctx: &ServeContext) -> Result<()> {
    let name = file.strip_prefix(&ctx.site_dir).unwrap_or(file).display();

    match compile_file(file, &ctx.options) {
        Ok(result) => {
            debug!("serve"; "compiled {}", name);
            respond_html(request, result.html)
        }
        Err(e) => {
            status_error(&format!("failed: {name}"), &e.to_string());
            respond_compile_error(request, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_live_reload() {
        assert!(is_live_reload("/__live_reload"));
        assert!(is_live_reload("/__live_reload?t=1"));
        assert!(!is_live_reload("/__live_reload/x"));
        assert!(!is_live_reload("/"));
    }
}
