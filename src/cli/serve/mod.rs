//! HTTP server for the icon manager frontend.
//!
//! # Module Structure
//!
//! ```text
//! serve/
//! ├── lifecycle   # bind with port retry
//! ├── path        # URL decoding, static file resolution
//! ├── router      # (method, path) -> Route
//! ├── handlers    # Route -> Reply
//! └── response    # Reply -> tiny_http response with CORS
//! ```

mod handlers;
mod lifecycle;
mod path;
mod response;
mod router;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Request, Server};

use crate::config::AppConfig;
use crate::feedback::{FeedbackStore, Notifier};
use crate::library::Library;
use crate::log;
use response::Reply;

/// Largest request body read into memory.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// Everything a request handler needs, shared across worker threads.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub library: Library,
    pub feedback: FeedbackStore,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            library: Library::new(config.library.clone()),
            feedback: FeedbackStore::new(&config.library.feedback),
            notifier: Notifier::from_config(&config.mail),
            config,
        }
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    state: Arc<AppState>,
}

/// Bind the HTTP server and register it for Ctrl+C shutdown.
pub fn bind_server(config: Arc<AppConfig>) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server));

    let state = Arc::new(AppState::new(config));
    if state.notifier.is_enabled() {
        log!("mail"; "notifications to {}", state.config.mail.to);
    }
    log!("serve"; "http://{}", addr);
    log!("serve"; "library at {}", state.config.library.root.display());

    Ok(BoundServer { server, state })
}

impl BoundServer {
    /// Start the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.state.config.serve.threads)
            .thread_name(|i| format!("serve-{i}"))
            // A panicking handler must not take the whole server down.
            .panic_handler(|_| log!("serve"; "request handler panicked"))
            .build()
            .context("Failed to create request thread pool")?;

        for request in self.server.incoming_requests() {
            let state = Arc::clone(&self.state);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &state) {
                    log!("serve"; "request error: {e}");
                }
            });
        }

        log!("serve"; "stopped");
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, state: &AppState) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::send(request, Reply::unavailable());
    }

    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut body)
        .context("Failed to read request body")?;

    let method = request.method().clone();
    let url = request.url().to_string();
    let reply = handlers::dispatch(state, &method, &url, &body);
    crate::debug!("serve"; "{} {} {}", reply.status, method, url);
    response::send(request, reply)
}
