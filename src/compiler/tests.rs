//! End-to-end compile tests.

use super::*;
use super::error::ParseError;
use std::fs;
use tempfile::TempDir;

fn build_opts(pairs: &[(&str, &str)]) -> CompileOptions {
    let manifest: ManifestMap = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    CompileOptions::build(Arc::new(manifest), "pages")
}

fn render(source: &str) -> String {
    compile(source, Path::new("pages/x.vyu"), &build_opts(&[]))
        .unwrap()
        .html
}

#[test]
fn test_plain_markup_unchanged() {
    let source = "  <html>\n<head></head>\n<body>{ not a marker }</body></html>\n";
    assert_eq!(render(source), source);
}

#[test]
fn test_value_forms() {
    assert_eq!(render(r#"{{ "abc" }}"#), "abc");
    assert_eq!(render("{{ 1 + 2 }}"), "3");
    assert_eq!(render("{{ 1.5 }}"), "1.5");
    assert_eq!(render("{{ true }}"), "true");
    assert_eq!(render("{{ [1,2] }}"), "[1,2]");
    assert_eq!(render("<p>{{ null }}</p>"), "<p></p>");
}

#[test]
fn test_substitution_matches_simultaneous_replacement() {
    let source = "{{ const a = 'A', bb = 'BBBB'; }}\
                  <i>{{ a }}</i>{{ bb }}-{{ a + bb }}|{{ '' }}|{{ 12345 }}";
    assert_eq!(render(source), "<i>A</i>BBBB-ABBBB||12345");
}

#[test]
fn test_declarations_visible_to_every_expression() {
    let source = "\n  {{ function greet(n) { return `hi ${n}`; } const who = 'there'; }}\n\
                  <p>{{ greet(who) }}</p><p>{{ greet('again') }}</p>";
    assert_eq!(render(source), "\n<p>hi there</p><p>hi again</p>");
}

#[test]
fn test_braces_inside_strings_do_not_close() {
    assert_eq!(render(r#"<p>{{ "}}" + '{{' }}</p>"#), "<p>}}{{</p>");
}

#[test]
fn test_import_directives_build_mode() {
    let opts = build_opts(&[("a.css", "a.1234.css")]);
    let source = r#"<html><head></head><body>{{ importCSS("./a.css") }}{{ importJS("./b.js") }}</body></html>"#;
    let result = compile(source, Path::new("pages/x.vyu"), &opts).unwrap();

    assert_eq!(
        result.html,
        "<html><head>  <link rel=\"stylesheet\" href=\"/a.1234.css\">\n  \
         <script type=\"module\" src=\"/b.js\"></script>\n</head><body></body></html>"
    );
    assert_eq!(result.css_imports, ["./a.css"]);
    assert_eq!(result.js_imports, ["./b.js"]);
}

#[test]
fn test_tags_keep_source_order_and_dedupe() {
    let source = "<head></head>{{ importJS('./one.js') }}{{ importJS('./two.js') }}\
                  {{ importJS('./one.js') }}{{ importCSS('./z.css') }}{{ importCSS('./a.css') }}";
    let html = render(source);

    let one = html.find("/one.js").unwrap();
    let two = html.find("/two.js").unwrap();
    let z = html.find("/z.css").unwrap();
    let a = html.find("/a.css").unwrap();
    assert!(z < a && a < one && one < two);
    assert_eq!(html.matches("/one.js").count(), 1);
}

#[test]
fn test_import_lists_declarations_then_body() {
    let source = "{{ importCSS('base.css'); }}\
                  {{ importCSS('./page.css') }}{{ importJS('./late.js') }}";
    let result = compile(source, Path::new("pages/x.vyu"), &build_opts(&[])).unwrap();
    assert_eq!(result.css_imports, ["base.css", "./page.css"]);
    assert_eq!(result.js_imports, ["./late.js"]);
    // Declaration-time calls record only; no tag is emitted for them
    assert!(!result.html.contains("base.css"));
}

#[test]
fn test_computed_import_falls_through_to_evaluation() {
    let source = "{{ const name = 'app'; }}<head></head>[{{ importJS(`./${name}.js`) }}]";
    let result = compile(source, Path::new("pages/x.vyu"), &build_opts(&[])).unwrap();
    assert_eq!(result.html, "<head></head>[]");
    assert_eq!(result.js_imports, ["./app.js"]);
}

#[test]
fn test_dev_mode_injects_live_reload() {
    let opts = CompileOptions::dev("http://localhost:5173/", "pages");
    let source = "<head></head>{{ importJS('./main.ts') }}";
    let html = compile(source, Path::new("pages/x.vyu"), &opts).unwrap().html;
    assert!(html.contains(r#"src="http://localhost:5173/main.ts""#));
    assert!(html.contains("EventSource"));
}

#[test]
fn test_unterminated_declarations_fail() {
    let err = compile("{{ let x = 1;", Path::new("pages/x.vyu"), &build_opts(&[])).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Parse {
            source: ParseError::UnclosedDeclarations,
            ..
        }
    ));
}

#[test]
fn test_unterminated_expression_fail() {
    let err = compile("<p>{{ oops </p>", Path::new("pages/x.vyu"), &build_opts(&[])).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Parse {
            source: ParseError::UnclosedExpression(3),
            ..
        }
    ));
}

#[test]
fn test_script_failures() {
    let opts = build_opts(&[]);
    let file = Path::new("pages/x.vyu");

    let err = compile("{{ throw new Error('boom'); }}<p></p>", file, &opts).unwrap_err();
    assert!(matches!(err, CompileError::Declaration { .. }));
    assert!(err.to_string().contains("boom"));

    let err = compile("<p>{{ nope.field }}</p>", file, &opts).unwrap_err();
    match err {
        CompileError::Evaluation { expr, .. } => assert_eq!(expr, "nope.field"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_compiles_do_not_share_state() {
    let opts = build_opts(&[]);
    let file = Path::new("pages/x.vyu");
    compile("{{ var shared = 1; }}", file, &opts).unwrap();
    assert!(compile("{{ shared }}", file, &opts).is_err());
}

#[test]
fn test_compile_file_reads_from_disk() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("index.vyu");
    fs::write(&page, "{{ const n = 2; }}<b>{{ n * 21 }}</b>").unwrap();

    let opts = CompileOptions::build(Arc::default(), dir.path());
    assert_eq!(compile_file(&page, &opts).unwrap().html, "<b>42</b>");

    let missing = dir.path().join("missing.vyu");
    assert!(matches!(
        compile_file(&missing, &opts),
        Err(CompileError::Read(..))
    ));
}

#[test]
fn test_collect_all_files() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    fs::write(dir.path().join("a/b/page.vyu"), "").unwrap();
    fs::write(dir.path().join("top.css"), "").unwrap();
    fs::write(dir.path().join(".DS_Store"), "").unwrap();

    let mut files = collect_all_files(dir.path());
    files.sort();
    assert_eq!(
        files,
        [dir.path().join("a/b/page.vyu"), dir.path().join("top.css")]
    );
}
