//! Asset tag injection into compiled markup.

use crate::embed::serve::LIVE_RELOAD_SCRIPT;

/// Render a stylesheet link.
pub fn stylesheet_tag(url: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{url}">"#)
}

/// Render a module script tag.
pub fn module_script_tag(url: &str) -> String {
    format!(r#"<script type="module" src="{url}"></script>"#)
}

/// Insert stylesheet links, then module scripts, then (dev only) the
/// live-reload script.
///
/// Insertion point, first match wins:
/// 1. right before the first `</head>` (any case)
/// 2. right after the `>` closing the first `<body ...>` tag
/// 3. the start of the document
///
/// Markup is returned untouched when there is nothing to add.
pub fn inject_assets(html: &str, css: &[String], js: &[String], dev_mode: bool) -> String {
    if css.is_empty() && js.is_empty() && !dev_mode {
        return html.to_string();
    }

    let mut block = String::new();
    for tag in css.iter().chain(js) {
        block.push_str("  ");
        block.push_str(tag);
        block.push('\n');
    }
    if dev_mode {
        block.push_str(LIVE_RELOAD_SCRIPT);
    }

    if let Some(pos) = find_ignore_ascii_case(html, "</head>") {
        return splice(html, pos, &block);
    }

    if let Some(open) = find_ignore_ascii_case(html, "<body")
        && let Some(close) = html[open..].find('>')
    {
        let pos = open + close + 1;
        return splice(html, pos, &format!("\n{block}"));
    }

    block + html
}

fn splice(html: &str, pos: usize, insert: &str) -> String {
    let mut out = String::with_capacity(html.len() + insert.len());
    out.push_str(&html[..pos]);
    out.push_str(insert);
    out.push_str(&html[pos..]);
    out
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> (Vec<String>, Vec<String>) {
        (
            vec![stylesheet_tag("/a.css")],
            vec![module_script_tag("/b.js")],
        )
    }

    #[test]
    fn test_nothing_to_inject() {
        let html = "<html><head></head><body></body></html>";
        assert_eq!(inject_assets(html, &[], &[], false), html);
    }

    #[test]
    fn test_before_head_close_case_insensitive() {
        let (css, js) = tags();
        let out = inject_assets("<HTML><HEAD><title>t</title></HEAD></HTML>", &css, &js, false);
        assert_eq!(
            out,
            "<HTML><HEAD><title>t</title>  <link rel=\"stylesheet\" href=\"/a.css\">\n  \
             <script type=\"module\" src=\"/b.js\"></script>\n</HEAD></HTML>"
        );
    }

    #[test]
    fn test_after_body_open_without_head() {
        let (css, _) = tags();
        let out = inject_assets("<body class=\"x\"><p>hi</p></body>", &css, &[], false);
        assert_eq!(
            out,
            "<body class=\"x\">\n  <link rel=\"stylesheet\" href=\"/a.css\">\n<p>hi</p></body>"
        );
    }

    #[test]
    fn test_prepend_without_head_or_body() {
        let (_, js) = tags();
        let out = inject_assets("<p>fragment</p>", &[], &js, false);
        assert!(out.starts_with("  <script type=\"module\""));
        assert!(out.ends_with("<p>fragment</p>"));
    }

    #[test]
    fn test_css_before_js_then_live_reload() {
        let (css, js) = tags();
        let out = inject_assets("<head></head>", &css, &js, true);
        let link = out.find("<link").unwrap();
        let module = out.find("type=\"module\"").unwrap();
        let reload = out.find("EventSource").unwrap();
        assert!(link < module && module < reload);
        assert!(out.ends_with("</head>"));
    }

    #[test]
    fn test_dev_mode_injects_even_without_imports() {
        let out = inject_assets("<head></head>", &[], &[], true);
        assert!(out.contains("/__live_reload"));
    }

    #[test]
    fn test_only_first_head_close_used() {
        let (css, _) = tags();
        let out = inject_assets("<head></head><template></head></template>", &css, &[], false);
        assert_eq!(out.matches("<link").count(), 1);
        assert!(out.starts_with("<head>  <link"));
    }
}
