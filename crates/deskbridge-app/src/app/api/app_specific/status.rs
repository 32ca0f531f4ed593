use salvo::prelude::Json;
use salvo::{Depot, Router, handler};
use serde_json::json;

use crate::config::get_config_from_depot;

/// Liveness check; does not touch either backend.
#[handler]
async fn healthcheck() -> &'static str {
    "OK"
}

/// ## Summary
/// Reports the active sync settings as JSON, without credentials.
#[handler]
async fn status(depot: &Depot) -> Json<serde_json::Value> {
    match get_config_from_depot(depot) {
        Ok(settings) => Json(json!({
            "backend": settings.sync.backend,
            "timezone": settings.sync.timezone.name(),
            "assignee_policy": settings.sync.assignee_policy,
            "link_attribute": settings.chatwoot.link_attribute.as_str(),
            "memory_operators": settings.sync.memory_operators.len(),
        })),
        Err(_) => Json(json!({ "error": "Configuration not found in depot" })),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck))
        .push(Router::with_path("status").get(status))
}
