//! Development server with live reload support.
//!
//! ```text
//! GET /__live_reload  -> SSE stream, one thread per client
//! GET /<page>         -> compile site/<page>.vyu (dev mode), rayon pool
//! GET /<file>         -> site file as is
//! ```
//!
//! Shutdown (Ctrl+C) runs in this order: stop accepting, stop the watcher,
//! stop the bundler dev process, end live-reload streams, then give
//! in-flight requests a bounded grace period.

mod handler;
mod lifecycle;
mod path;
mod response;
mod sse;


use crate::bundler::{self, DevProcess};
use crate::compiler::CompileOptions;
use crate::config::SiteConfig;
use crate::core::register_server;
use crate::logger::status_success;
use crate::reload::Broadcaster;
use crate::watcher::Watcher;
use crate::{debug, log};
use anyhow::{Context, Result};
use handler::ServeContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tiny_http::Server;

/// How long in-flight requests may run after shutdown begins.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Number of threads compiling pages and serving files.
const REQUEST_THREADS: usize = 4;

/// Run the dev server until Ctrl+C.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let mut dev_process = start_bundler(config);

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    let options = CompileOptions::dev(config.bundler.dev_url.clone(), config.site.dir.clone());
    let ctx = Arc::new(ServeContext::new(config.site.dir.clone(), options));

    let mut watcher = if config.serve.watch {
        Some(start_watcher(&config.site.dir, &ctx.broadcaster)?)
    } else {
        None
    };

    log!("serve"; "http://{}", addr);
    run_request_loop(&server, &ctx)?;

    if let Some(watcher) = watcher.as_mut() {
        watcher.stop();
    }
    if let Some(process) = dev_process.as_mut() {
        if !process.is_running() {
            log!("bundler"; "dev server had already exited");
        }
        if let Err(e) = process.stop() {
            log!("bundler"; "{:#}", e);
        }
    }
    debug!("reload"; "closing {} live-reload stream(s)", ctx.broadcaster.len());
    ctx.broadcaster.close();
    ctx.in_flight.wait_idle(SHUTDOWN_GRACE);

    log!("serve"; "stopped");
    Ok(())
}

/// Install and launch the bundler dev server. Failure leaves pages
/// servable, only without bundled assets.
fn start_bundler(config: &SiteConfig) -> Option<DevProcess> {
    if !config.bundler.enable {
        return None;
    }
    let started = bundler::ensure_installed(&config.bundler)
        .and_then(|()| DevProcess::start(&config.bundler));

    match started {
        Ok(process) => Some(process),
        Err(e) => {
            log!("bundler"; "dev server not started: {:#}", e);
            None
        }
    }
}

fn start_watcher(site_dir: &Path, broadcaster: &Arc<Broadcaster>) -> Result<Watcher> {
    let broadcaster = Arc::clone(broadcaster);
    let root = site_dir.to_path_buf();

    let watcher = Watcher::start(site_dir, move |paths| {
        let clients = broadcaster.broadcast();
        status_success(&change_summary(&paths, &root));
        debug!("watch"; "reloaded {} client(s)", clients);
    })
    .with_context(|| format!("Failed to watch {}", site_dir.display()))?;

    Ok(watcher)
}

fn change_summary(paths: &[PathBuf], root: &Path) -> String {
    match paths {
        [one] => format!(
            "changed: {}",
            one.strip_prefix(root).unwrap_or(one).display()
        ),
        many => format!("changed: {} files", many.len()),
    }
}

/// Dispatch requests until the server is unblocked.
fn run_request_loop(server: &Server, ctx: &Arc<ServeContext>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("vaayu-serve-{i}"))
        .panic_handler(|_| log!("serve"; "request handler panicked"))
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        // Streams live until the client leaves, so they never occupy the pool
        if handler::is_live_reload(request.url()) {
            let broadcaster = Arc::clone(&ctx.broadcaster);
            let spawned = thread::Builder::new()
                .name("vaayu-reload".into())
                .spawn(move || sse::stream(request, &broadcaster));
            if let Err(e) = spawned {
                log!("serve"; "failed to open live-reload stream: {}", e);
            }
            continue;
        }

        let guard = ctx.in_flight.enter();
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            let _guard = guard;
            if let Err(e) = handler::handle_request(request, &ctx) {
                log!("serve"; "request error: {:#}", e);
            }
        });
    }
    Ok(())
}
