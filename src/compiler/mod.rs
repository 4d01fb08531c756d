//! Template compilation: `.vyu` source to HTML.
//!
//! ```text
//! source ─► parse ─► declarations ─► expressions (last to first) ─► inject
//!                        │                 │
//!                        └── BoaContext ───┘  (one per compile)
//! ```

pub mod asset;
pub mod directive;
pub mod error;
pub mod inject;
pub mod parser;
pub mod scanner;
pub mod script;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;

use crate::bundler::manifest::ManifestMap;
use asset::resolve_asset_url;
use directive::ImportKind;
use inject::{inject_assets, module_script_tag, stylesheet_tag};
use script::{BoaContext, ImportSink, ScriptContext};

pub use error::CompileError;
use parser::parse;

/// Settings shared by every compile of one command invocation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub dev_mode: bool,
    /// Bundler dev server base URL. Read only in dev mode.
    pub dev_server_url: String,
    /// Source asset path to built file. Read only outside dev mode.
    pub manifest: Arc<ManifestMap>,
    pub site_root: PathBuf,
}

impl CompileOptions {
    pub fn dev(dev_server_url: impl Into<String>, site_root: impl Into<PathBuf>) -> Self {
        Self {
            dev_mode: true,
            dev_server_url: dev_server_url.into(),
            manifest: Arc::default(),
            site_root: site_root.into(),
        }
    }

    pub fn build(manifest: Arc<ManifestMap>, site_root: impl Into<PathBuf>) -> Self {
        Self {
            dev_mode: false,
            dev_server_url: String::new(),
            manifest,
            site_root: site_root.into(),
        }
    }
}

/// Output of a successful compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileResult {
    pub html: String,
    /// Stylesheet import paths, as written, in source order.
    pub css_imports: Vec<String>,
    /// Module script import paths, as written, in source order.
    pub js_imports: Vec<String>,
}

/// Read and compile one template file.
pub fn compile_file(path: &Path, opts: &CompileOptions) -> Result<CompileResult, CompileError> {
    let source =
        std::fs::read_to_string(path).map_err(|e| CompileError::Read(path.to_path_buf(), e))?;
    compile(&source, path, opts)
}

/// Compile template `source`. `file` locates relative asset paths and names
/// the template in errors.
///
/// Either the whole page compiles or an error is returned; partial output
/// never escapes.
pub fn compile(source: &str, file: &Path, opts: &CompileOptions) -> Result<CompileResult, CompileError> {
    let parsed = parse(source).map_err(|source| CompileError::Parse {
        path: file.to_path_buf(),
        source,
    })?;

    let mut ctx = BoaContext::new();
    let sink = ImportSink::new();
    sink.install(&mut ctx).map_err(|source| CompileError::Setup {
        path: file.to_path_buf(),
        source,
    })?;

    ctx.run_declarations(&parsed.declarations)
        .map_err(|source| CompileError::Declaration {
            path: file.to_path_buf(),
            source,
        })?;
    let (mut css_imports, mut js_imports) = sink.drain();

    let mut body = parsed.body;
    // Filled last to first, reversed once at the end
    let mut css_tags = Vec::new();
    let mut js_tags = Vec::new();
    let mut body_imports: Vec<(Vec<String>, Vec<String>)> = Vec::new();

    for expr in parsed.expressions.iter().rev() {
        if let Some(directive) = directive::recognize(&expr.raw) {
            let url = resolve_asset_url(directive.path, file, opts);
            let path = directive.path.to_string();
            match directive.kind {
                ImportKind::Css => {
                    css_tags.push(stylesheet_tag(&url));
                    body_imports.push((vec![path], Vec::new()));
                }
                ImportKind::Js => {
                    js_tags.push(module_script_tag(&url));
                    body_imports.push((Vec::new(), vec![path]));
                }
            }
            body.replace_range(expr.span(), "");
            continue;
        }

        let text = ctx
            .evaluate(&expr.raw)
            .map_err(|source| CompileError::Evaluation {
                path: file.to_path_buf(),
                expr: expr.raw.clone(),
                source,
            })?;
        body_imports.push(sink.drain());
        body.replace_range(expr.span(), &text);
    }

    for (css, js) in body_imports.into_iter().rev() {
        css_imports.extend(css);
        js_imports.extend(js);
    }

    let css_tags = first_seen(css_tags.into_iter().rev());
    let js_tags = first_seen(js_tags.into_iter().rev());

    Ok(CompileResult {
        html: inject_assets(&body, &css_tags, &js_tags, opts.dev_mode),
        css_imports,
        js_imports,
    })
}

/// Keep the first occurrence of each tag, preserving order.
fn first_seen(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files under `dir`, recursively.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect()
}
