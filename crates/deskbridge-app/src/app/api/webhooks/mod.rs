use salvo::Router;

use super::WEBHOOK_ROUTE_COMPONENT;

mod chatwoot;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(WEBHOOK_ROUTE_COMPONENT).push(chatwoot::routes())
}
