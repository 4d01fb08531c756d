//! HTTP response helpers.
//!
//! HEAD requests go through the same helpers; tiny_http drops the body.

use crate::compiler::CompileError;
use crate::embed::serve::{ERROR_HTML, ErrorVars};
use crate::utils::mime::{self, HTML};
use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, StatusCode};

const PLAIN: &str = "text/plain; charset=utf-8";

/// Respond with a compiled page.
pub fn respond_html(request: Request, html: String) -> Result<()> {
    send_body(request, 200, HTML, html.into_bytes())
}

/// Respond with a file from the site directory.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, mime::from_path(path), body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the compile error page (500). The page keeps the
/// live-reload script, so fixing the template refreshes the browser.
pub fn respond_compile_error(request: Request, error: &CompileError) -> Result<()> {
    send_body(request, 500, HTML, compile_error_page(error).into_bytes())
}

pub fn compile_error_page(error: &CompileError) -> String {
    ERROR_HTML.render(&ErrorVars {
        message: error.to_string(),
    })
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?);
    request.respond(response)?;
    Ok(())
}

pub fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileOptions, compile};

    #[test]
    fn test_compile_error_page() {
        let error = compile(
            "<p>{{ missing < 1 }}</p>",
            Path::new("index.vyu"),
            &CompileOptions::default(),
        )
        .unwrap_err();
        let page = compile_error_page(&error);

        assert!(page.contains("index.vyu"));
        assert!(page.contains("EventSource"));
        assert!(page.contains("missing &lt; 1"));
        assert!(!page.contains("missing < 1"));
    }

    #[test]
    fn test_make_header_rejects_non_ascii() {
        assert!(make_header("Content-Type", HTML).is_ok());
        assert!(make_header("X-Name", "caf\u{e9}").is_err());
    }
}
