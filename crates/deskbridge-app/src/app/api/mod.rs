mod app_specific;
mod webhooks;

use salvo::Router;

// Re-export route constants from core
pub use deskbridge_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, CHATWOOT_ROUTE_COMPONENT, CHATWOOT_WEBHOOK_PATH,
    WEBHOOK_ROUTE_COMPONENT, WEBHOOK_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router: application endpoints and webhook receivers.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(webhooks::routes())
}
