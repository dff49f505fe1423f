//! Endpoint handlers. Transport-free: they take an [`ApiRequest`] and return
//! a [`Reply`], so the accept loop is the only code that touches `tiny_http`.

use serde::Serialize;
use serde_json::Value;
use ship_core::responses::{ApiResponse, ConfirmResponse};
use ship_db::error::CommitError;
use ship_db::service::ShipService;
use ship_schema::BatchValidator;
use tokio::runtime::Handle;
use tracing::{error, warn};

use crate::error::ServerError;
use crate::multipart;
use crate::router::{self, Route, RouteMiss};

const UPLOAD_FIELD: &str = "file";

/// Shared by every request.
pub struct AppState {
    service: ShipService,
    validator: BatchValidator,
    max_upload_bytes: u64,
}

impl AppState {
    /// # Errors
    ///
    /// Returns `ServerError::Validator` if the batch schema does not compile.
    pub fn new(service: ShipService, max_upload_bytes: u64) -> Result<Self, ServerError> {
        Ok(Self {
            service,
            validator: BatchValidator::new()?,
            max_upload_bytes,
        })
    }

    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}

/// What the handlers need from an HTTP request.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Status code and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!(error = %e, "response serialization failed");
                Self {
                    status: 500,
                    body: r#"{"success":false,"error":"Internal error"}"#.to_string(),
                }
            }
        }
    }

    fn ok<T: Serialize>(data: T) -> Self {
        Self::json(200, &ApiResponse::ok(data))
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ApiResponse::<()>::failure(message))
    }
}

/// Route and answer one request.
pub async fn handle(state: &AppState, request: ApiRequest) -> Reply {
    if request.body.len() as u64 > state.max_upload_bytes {
        return Reply::failure(
            413,
            format!("Request body exceeds {} bytes", state.max_upload_bytes),
        );
    }

    let route = match router::resolve(&request.method, &request.url) {
        Ok(route) => route,
        Err(RouteMiss::NotFound) => return Reply::failure(404, "Not found"),
        Err(RouteMiss::MethodNotAllowed) => return Reply::failure(405, "Method not allowed"),
    };

    match route {
        Route::Health => Reply::ok(serde_json::json!({"status": "ok"})),
        Route::Upload => upload(state, &request),
        Route::Confirm => confirm(state, &request.body).await,
        Route::Shipments { company_id } => list_shipments(state, company_id.as_deref()).await,
        Route::History { shipment_id } => history(state, &shipment_id).await,
        Route::Companies => list_companies(state).await,
    }
}

/// Validate an uploaded file without storing anything.
fn upload(state: &AppState, request: &ApiRequest) -> Reply {
    let part = request
        .content_type
        .as_deref()
        .and_then(multipart::boundary)
        .and_then(|b| multipart::find_part(&request.body, b, UPLOAD_FIELD));
    let Some(part) = part else {
        return Reply::failure(400, "No file provided");
    };

    let is_json = part
        .filename
        .as_deref()
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(".json"));
    if !is_json {
        return Reply::failure(400, "File must be a JSON file");
    }

    match state.validator.validate(&part.data) {
        Ok(batch) => Reply::ok(batch),
        Err(e) => Reply::failure(400, e.to_string()),
    }
}

/// Re-validate the previewed invoices and commit them.
async fn confirm(state: &AppState, body: &[u8]) -> Reply {
    let invoices = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => map.remove("invoices"),
        Ok(_) => None,
        Err(e) => return Reply::failure(400, format!("Invalid request body: {e}")),
    };
    let Some(invoices @ Value::Array(_)) = invoices else {
        return Reply::failure(400, CommitError::EmptyInput.to_string());
    };

    let batch = match state.validator.validate_value(invoices) {
        Ok(batch) => batch,
        Err(e) => return Reply::failure(400, e.to_string()),
    };

    let service = match state.service.session().await {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "could not open database session");
            return Reply::failure(500, "Storage unavailable");
        }
    };

    // A commit waiting on the write lock sleeps inside SQLite's busy
    // handler, so it runs on the blocking pool instead of a runtime worker.
    let invoices = batch.len();
    let runtime = Handle::current();
    let committed =
        tokio::task::spawn_blocking(move || runtime.block_on(service.commit(&batch))).await;

    match committed {
        Ok(Ok(stats)) => Reply::json(200, &ConfirmResponse::committed(stats)),
        Ok(Err(e)) => {
            let status = commit_status(&e);
            if status >= 500 {
                error!(error = %e, invoices, "commit failed");
            } else {
                warn!(error = %e, invoices, "commit rejected");
            }
            Reply::failure(status, e.to_string())
        }
        Err(e) => {
            error!(error = %e, invoices, "commit task aborted");
            Reply::failure(500, "Storage unavailable")
        }
    }
}

const fn commit_status(error: &CommitError) -> u16 {
    match error {
        CommitError::EmptyInput => 400,
        CommitError::ConstraintViolation(_) => 409,
        CommitError::Timeout { .. } => 504,
        CommitError::StorageUnavailable(_) => 500,
    }
}

async fn list_shipments(state: &AppState, company_id: Option<&str>) -> Reply {
    let result = match state.service.session().await {
        Ok(service) => service.list_shipments(company_id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(shipments) => Reply::ok(shipments),
        Err(e) => {
            error!(error = %e, "listing shipments failed");
            Reply::failure(500, "Failed to fetch shipments")
        }
    }
}

async fn history(state: &AppState, shipment_id: &str) -> Reply {
    let result = match state.service.session().await {
        Ok(service) => service.get_history(shipment_id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(invoices) => Reply::ok(invoices),
        Err(e) => {
            error!(error = %e, shipment_id, "history query failed");
            Reply::failure(500, "Failed to fetch invoice history")
        }
    }
}

async fn list_companies(state: &AppState) -> Reply {
    let result = match state.service.session().await {
        Ok(service) => service.list_companies().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(companies) => Reply::ok(companies),
        Err(e) => {
            error!(error = %e, "listing companies failed");
            Reply::failure(500, "Failed to fetch companies")
        }
    }
}
