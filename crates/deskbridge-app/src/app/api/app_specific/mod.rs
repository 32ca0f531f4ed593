use salvo::Router;

mod status;

#[must_use]
pub fn routes() -> Router {
    Router::with_path("app").push(status::routes())
}
