//! Local preview server.
//!
//! A lightweight HTTP server over the static site root, built on
//! `tiny_http`:
//!
//! - Collection directories (`/docs/`, `/wiki/`) are answered with a reader
//!   page rendered for the request's query string
//! - Everything else is served as a static file
//! - Graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Main Thread   │   request loop + current-thread runtime
//! └────────┬────────┘
//!          │
//!    ┌─────┴──────────────────┐
//!    ▼                        ▼
//! /<collection>/?p=…     /<anything else>
//! Controller → page      site root file
//! ```

use crate::{config::FolioConfig, log, nav::Location, page::render_page};
use anyhow::{Context, Result, anyhow};
use folio_core::{Collection, path::normalize};
use std::{
    fs,
    io::Cursor,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tokio::runtime::Runtime;

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the preview server.
///
/// This function:
/// 1. Binds to the configured interface and port (with auto-retry on port conflict)
/// 2. Sets up Ctrl+C handler for graceful shutdown
/// 3. Enters the main request handling loop
///
/// The server blocks until Ctrl+C is received.
pub fn serve_site(config: &FolioConfig) -> Result<()> {
    let first = config
        .serve
        .addr()
        .with_context(|| format!("invalid interface `{}`", config.serve.interface))?;
    let (server, addr) = try_bind_port(first.ip(), first.port(), MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    // Controllers hold single-threaded state; pages render one at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let collections = config.collections();
    log!("serve"; "http://{addr}/{}/", collections.primary);
    log!("serve"; "http://{addr}/{}/", collections.secondary);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config, &runtime) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Routing
// ============================================================================

/// What a request URL resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    /// Reader page of a collection.
    Page(Collection),
    /// Collection directory without its trailing slash.
    Redirect(String),
    File(PathBuf),
    NotFound,
}

/// Resolution order:
/// 1. `/<collection>/` → reader page (`/<collection>` redirects)
/// 2. Exact file match → file
/// 3. Directory with index.html → index.html
/// 4. Nothing found → 404
fn route(url: &str, config: &FolioConfig) -> Route {
    let (path, query) = match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let path = urlencoding::decode(path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let request_path = path.trim_matches('/');

    let collections = config.collections();
    for collection in [Collection::Primary, Collection::Secondary] {
        if request_path == collections.dir(collection) {
            return if path.ends_with('/') {
                Route::Page(collection)
            } else {
                Route::Redirect(format!("/{request_path}/{query}"))
            };
        }
    }

    let local_path = match normalize(request_path) {
        Some(relative) => config.root().join(relative),
        None if request_path.is_empty() => config.root().to_path_buf(),
        None => return Route::NotFound,
    };
    if local_path.is_file() {
        return Route::File(local_path);
    }
    let index_path = local_path.join("index.html");
    if local_path.is_dir() && index_path.is_file() {
        return Route::File(index_path);
    }
    Route::NotFound
}

/// Handle a single HTTP request.
fn handle_request(request: Request, config: &FolioConfig, runtime: &Runtime) -> Result<()> {
    match route(request.url(), config) {
        Route::Page(collection) => {
            let location = Location::parse(request.url());
            let html = runtime.block_on(render_page(config, collection, location))?;
            serve_html(request, html)
        }
        Route::Redirect(to) => serve_redirect(request, &to),
        Route::File(path) => serve_file(request, &path),
        Route::NotFound => serve_not_found(request),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header `{name}: {value}`"))
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response =
        Response::from_data(content).with_header(header("Content-Type", guess_content_type(path))?);
    request.respond(response)?;
    Ok(())
}

/// Serve HTML content.
fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content)
        .with_header(header("Content-Type", "text/html; charset=utf-8")?);
    request.respond(response)?;
    Ok(())
}

fn serve_redirect(request: Request, to: &str) -> Result<()> {
    let response = Response::empty(StatusCode(301)).with_header(header("Location", to)?);
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![header("Content-Type", "text/plain")?],
        Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        // Document sources
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}
