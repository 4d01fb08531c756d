//! Batch build.
//!
//! Build pipeline phases:
//! - **Init** - Clean (when configured) and create the output directory
//! - **Bundle** - Install bundler dependencies, run the production bundle
//! - **Manifest** - Load the bundler manifest for asset URL rewriting
//! - **Compile** - Compile every template to `<output>/<name>.html` (parallel)
//! - **Copy** - Copy static files as is (parallel)
//!
//! Scripts and stylesheets under the site directory belong to the bundler and
//! are not copied.

use crate::{
    bundler::{self, manifest::ManifestMap},
    compiler::{CompileOptions, collect_all_files, compile_file},
    config::SiteConfig,
    core::SourceKind,
    debug, log,
    logger::ProgressLine,
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Counts reported after a successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub static_files: usize,
}

/// Build the whole site into `build.output`.
pub fn build_site(config: &SiteConfig) -> Result<BuildSummary> {
    let output = &config.build.output;
    init_output(output, config.build.clean)?;

    let manifest = if config.bundler.enable {
        bundler::ensure_installed(&config.bundler)?;
        bundler::build(&config.bundler, output)?;
        bundler::manifest::load_or_empty(&config.manifest_path())
    } else {
        ManifestMap::default()
    };

    let files = SiteFiles::collect(&config.site.dir, output);
    let progress = ProgressLine::new(&[
        ("pages", files.templates.len()),
        ("static", files.statics.len()),
    ]);

    let options = CompileOptions::build(Arc::new(manifest), config.site.dir.clone());
    let compiled = compile_pages(&files.templates, &config.site.dir, output, &options, &progress);
    let copied = compiled.and_then(|()| copy_static(&files.statics, &config.site.dir, output, &progress));
    progress.finish();
    copied?;

    let summary = BuildSummary {
        pages: files.templates.len(),
        static_files: files.statics.len(),
    };
    log!(
        "build";
        "{} pages, {} static files -> {}",
        summary.pages,
        summary.static_files,
        config.root_relative(output).display()
    );
    Ok(summary)
}

fn init_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        debug!("build"; "removing {}", output.display());
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean output directory `{}`", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory `{}`", output.display()))
}

/// Site files split by what the build does with them.
struct SiteFiles {
    templates: Vec<PathBuf>,
    statics: Vec<PathBuf>,
}

impl SiteFiles {
    /// Everything under `site_dir`, minus the output tree if it is nested there.
    fn collect(site_dir: &Path, output: &Path) -> Self {
        let mut templates = Vec::new();
        let mut statics = Vec::new();
        let mut bundled = 0usize;

        for file in collect_all_files(site_dir) {
            if file.starts_with(output) {
                continue;
            }
            match SourceKind::from_path(&file) {
                SourceKind::Template => templates.push(file),
                SourceKind::Static => statics.push(file),
                SourceKind::Script | SourceKind::Stylesheet => bundled += 1,
            }
        }

        debug!("build"; "{} bundler sources skipped", bundled);
        Self { templates, statics }
    }
}

/// Compile every template. The first failure aborts the run.
fn compile_pages(
    templates: &[PathBuf],
    site_dir: &Path,
    output: &Path,
    options: &CompileOptions,
    progress: &ProgressLine,
) -> Result<()> {
    templates.par_iter().try_for_each(|file| {
        let relative = file.strip_prefix(site_dir).unwrap_or(file);
        let dest = output.join(relative).with_extension("html");

        let result = compile_file(file, options)?;
        write_file(&dest, result.html.as_bytes())?;

        debug!("build"; "{} -> {}", relative.display(), dest.display());
        progress.inc("pages");
        Ok(())
    })
}

/// Copy static files. Every failure is reported before the build fails.
fn copy_static(
    statics: &[PathBuf],
    site_dir: &Path,
    output: &Path,
    progress: &ProgressLine,
) -> Result<()> {
    let failures = statics
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(site_dir).unwrap_or(file);
            let result = copy_file(file, &output.join(relative));
            progress.inc("static");
            result.err()
        })
        .collect::<Vec<_>>();

    for error in &failures {
        log!("error"; "{:#}", error);
    }
    if !failures.is_empty() {
        bail!("{} static file(s) failed to copy", failures.len());
    }
    Ok(())
}

fn write_file(dest: &Path, content: &[u8]) -> Result<()> {
    create_parent(dest)?;
    fs::write(dest, content).with_context(|| format!("Failed to write `{}`", dest.display()))
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    create_parent(dest)?;
    fs::copy(src, dest)
        .with_context(|| format!("Failed to copy `{}` to `{}`", src.display(), dest.display()))?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site");
        fs::create_dir_all(site.join("blog")).unwrap();
        fs::write(
            site.join("index.vyu"),
            "{{ const title = 'Home'; }}<html><head></head><body>{{ title }}</body></html>",
        )
        .unwrap();
        fs::write(site.join("blog/post.vyu"), "<p>{{ 6 * 7 }}</p>").unwrap();
        fs::write(site.join("logo.svg"), "<svg/>").unwrap();
        fs::write(site.join("blog/photo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(site.join("main.ts"), "console.log(1)").unwrap();
        fs::write(site.join("style.css"), "p {}").unwrap();

        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.site.dir = site;
        config.build.output = dir.path().join("dist");
        config.bundler.enable = false;
        (dir, config)
    }

    #[test]
    fn test_build_site_writes_pages_and_static_files() {
        let (_dir, config) = project();
        let summary = build_site(&config).unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                pages: 2,
                static_files: 2
            }
        );

        let out = &config.build.output;
        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            "<html><head></head><body>Home</body></html>"
        );
        assert_eq!(fs::read_to_string(out.join("blog/post.html")).unwrap(), "<p>42</p>");
        assert_eq!(fs::read_to_string(out.join("logo.svg")).unwrap(), "<svg/>");
        assert!(out.join("blog/photo.png").is_file());

        // Bundler sources and templates are not copied
        assert!(!out.join("main.ts").exists());
        assert!(!out.join("style.css").exists());
        assert!(!out.join("index.vyu").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_build_uses_manifest_when_present() {
        let (_dir, mut config) = project();
        fs::write(
            config.site.dir.join("index.vyu"),
            "<head></head>{{ importJS(\"./main.ts\") }}",
        )
        .unwrap();
        let manifest = config.build.output.join(".vite/manifest.json");
        fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        fs::write(
            &manifest,
            r#"{"main.ts": {"file": "assets/main-4f2a.js", "src": "main.ts", "isEntry": true}}"#,
        )
        .unwrap();

        // Stand-in bundler: dependencies already "installed", build is a no-op
        let bundler_dir = config.root.join("vite");
        fs::create_dir_all(bundler_dir.join("node_modules")).unwrap();
        config.bundler.enable = true;
        config.bundler.dir = bundler_dir;
        config.bundler.command = "true".to_string();

        build_site(&config).unwrap();
        let html = fs::read_to_string(config.build.output.join("index.html")).unwrap();
        assert_eq!(
            html,
            "<head>  <script type=\"module\" src=\"/assets/main-4f2a.js\"></script>\n</head>"
        );
    }

    #[test]
    fn test_compile_failure_aborts_build() {
        let (_dir, config) = project();
        fs::write(config.site.dir.join("broken.vyu"), "<p>{{ oops</p>").unwrap();

        let err = build_site(&config).unwrap_err();
        assert!(format!("{err:#}").contains("broken.vyu"), "{err:#}");
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let (_dir, mut config) = project();
        let stale = config.build.output.join("old.html");
        fs::create_dir_all(&config.build.output).unwrap();
        fs::write(&stale, "stale").unwrap();

        build_site(&config).unwrap();
        assert!(stale.exists());

        config.build.clean = true;
        build_site(&config).unwrap();
        assert!(!stale.exists());
        assert!(config.build.output.join("index.html").is_file());
    }

    #[test]
    fn test_nested_output_is_not_collected() {
        let (_dir, mut config) = project();
        config.build.output = config.site.dir.join("dist");

        build_site(&config).unwrap();
        // Second run must not pick up the first run's output
        let summary = build_site(&config).unwrap();
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.static_files, 2);
    }
}
