//! `tiny_http` accept loop.
//!
//! `recv` blocks, so the loop runs on a blocking thread and polls with a
//! timeout to notice shutdown. Each request is answered by its own tokio task
//! with its own database session.

use std::future::Future;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::handlers::{self, ApiRequest, AppState, Reply};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct HttpServer {
    inner: Arc<tiny_http::Server>,
}

impl HttpServer {
    /// Bind the listener. Use port 0 for an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the address cannot be bound.
    pub fn bind(addr: &str) -> Result<Self, ServerError> {
        let inner = tiny_http::Server::http(addr).map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// The bound socket address, when listening on IP.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.server_addr().to_ip()
    }

    /// Serve until `shutdown` resolves. In-flight requests finish on their own
    /// tasks.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Recv` if the listener fails.
    pub async fn run<F>(self, state: Arc<AppState>, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        if let Some(addr) = self.local_addr() {
            info!(%addr, "listening");
        }

        let stop = Arc::new(AtomicBool::new(false));
        let runtime = Handle::current();
        let server = Arc::clone(&self.inner);
        let loop_stop = Arc::clone(&stop);
        let mut accept =
            tokio::task::spawn_blocking(move || accept_loop(&server, &state, &runtime, &loop_stop));

        tokio::select! {
            result = &mut accept => result?,
            () = shutdown => {
                info!("shutting down");
                stop.store(true, Ordering::Relaxed);
                accept.await?
            }
        }
    }
}

fn accept_loop(
    server: &tiny_http::Server,
    state: &Arc<AppState>,
    runtime: &Handle,
    stop: &AtomicBool,
) -> Result<(), ServerError> {
    while !stop.load(Ordering::Relaxed) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => {
                runtime.spawn(respond_to(Arc::clone(state), request));
            }
            Ok(None) => {}
            Err(e) => return Err(ServerError::Recv(e.to_string())),
        }
    }
    Ok(())
}

async fn respond_to(state: Arc<AppState>, request: tiny_http::Request) {
    let limit = state.max_upload_bytes();
    let read = tokio::task::spawn_blocking(move || read_request(request, limit)).await;
    let (request, api_request) = match read {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "request reader panicked");
            return;
        }
    };

    let reply = match api_request {
        Ok(api_request) => {
            debug!(method = %api_request.method, url = %api_request.url, "request");
            handlers::handle(&state, api_request).await
        }
        Err(e) => Reply {
            status: 400,
            body: serde_json::json!({"success": false, "error": format!("Unreadable body: {e}")})
                .to_string(),
        },
    };

    let status = reply.status;
    let sent = tokio::task::spawn_blocking(move || request.respond(to_response(reply))).await;
    match sent {
        Ok(Ok(())) => debug!(status, "response sent"),
        Ok(Err(e)) => warn!(error = %e, "failed to write response"),
        Err(e) => warn!(error = %e, "response writer panicked"),
    }
}

/// Read method, target, content type, and at most `limit + 1` body bytes.
fn read_request(
    mut request: tiny_http::Request,
    limit: u64,
) -> (tiny_http::Request, std::io::Result<ApiRequest>) {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let mut body = Vec::new();
    let read = request
        .as_reader()
        .take(limit.saturating_add(1))
        .read_to_end(&mut body);

    let api_request = read.map(|_| ApiRequest {
        method: request.method().to_string(),
        url: request.url().to_string(),
        content_type,
        body,
    });
    (request, api_request)
}

fn to_response(reply: Reply) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut response =
        tiny_http::Response::from_data(reply.body.into_bytes()).with_status_code(reply.status);
    if let Ok(header) = tiny_http::Header::from_bytes("Content-Type", "application/json") {
        response.add_header(header);
    }
    response
}
