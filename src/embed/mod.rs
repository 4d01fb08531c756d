//! Embedded markup and scripts served or injected by vaayu.
//!
//! # Example
//!
//! ```ignore
//! use embed::serve::{ERROR_HTML, ErrorVars};
//!
//! let html = ERROR_HTML.render(&ErrorVars { message: err.to_string() });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// Path of the live-reload event stream.
    pub const LIVE_RELOAD_PATH: &str = "/__live_reload";

    /// Inline script injected into dev pages. Reloads on a `reload` event.
    pub const LIVE_RELOAD_SCRIPT: &str = "  <script>
    const es = new EventSource('/__live_reload');
    es.onmessage = (e) => { if (e.data === 'reload') location.reload(); };
  </script>
";

    /// Variables for the compile error page.
    pub struct ErrorVars {
        /// Raw failure text, escaped on render.
        pub message: String,
    }

    impl TemplateVars for ErrorVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__VAAYU_LIVE_RELOAD__", LIVE_RELOAD_SCRIPT)
                .replace("__VAAYU_ERROR__", &escape(&self.message))
        }
    }

    /// Diagnostic page shown when a dev compile fails.
    pub const ERROR_HTML: Template<ErrorVars> =
        Template::new(include_str!("serve/error.html"));
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_live_reload_script_targets_stream() {
        assert!(LIVE_RELOAD_SCRIPT.contains(&format!("'{LIVE_RELOAD_PATH}'")));
        assert!(LIVE_RELOAD_SCRIPT.contains("'reload'"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = ERROR_HTML.render(&ErrorVars {
            message: "unexpected <token> & more".into(),
        });
        assert!(html.contains("unexpected &lt;token&gt; &amp; more"));
        assert!(html.contains("EventSource"));
        assert!(!html.contains("__VAAYU_"));
    }
}
