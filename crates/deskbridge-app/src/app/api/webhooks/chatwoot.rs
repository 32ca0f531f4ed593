use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use deskbridge_core::constants::CHATWOOT_ROUTE_COMPONENT;

use crate::error::AppError;
use crate::sync_handler::get_event_router_from_depot;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
struct Accepted {
    status: &'static str,
}

/// ## Summary
/// POST /api/webhooks/chatwoot - Runs the sync flow for one Chatwoot webhook delivery.
///
/// Deliveries without an `event` tag are accepted and ignored.
///
/// ## Errors
/// Returns HTTP 400 if the body is not JSON or the payload misses required fields
/// Returns HTTP 501 if the event tag is not handled
/// Returns HTTP 500 if the event router is missing from the depot
#[handler]
async fn chatwoot_webhook(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let router = match get_event_router_from_depot(depot) {
        Ok(router) => router,
        Err(e) => {
            error!(error = %e, "Failed to get event router");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let body: Value = match req.parse_json().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = ?e, "Failed to parse webhook body");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    match router.handle_json(&body).await {
        Ok(()) => {
            res.status_code(StatusCode::OK);
            res.render(Json(Accepted { status: "ok" }));
        }
        Err(e) => {
            let e = AppError::from(e);
            let status = e.status_code();
            if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
                error!(error = %e, "Webhook flow failed");
            } else {
                tracing::warn!(error = %e, %status, "Webhook rejected");
            }
            res.status_code(status);
            res.render(Json(ErrorResponse {
                error: e.to_string(),
            }));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CHATWOOT_ROUTE_COMPONENT).post(chatwoot_webhook)
}
