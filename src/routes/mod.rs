//! Router assembly.

mod common;
mod cupcakes;

pub use common::common_routes;
pub use cupcakes::cupcake_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;

/// Full application: probes, home page, and cupcake API, with request bodies
/// capped at `body_limit` bytes. Oversized bodies surface as a `JsonRejection`
/// in the handlers, so they get the same error envelope as any other failure.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(cupcake_routes(state))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(body_limit)))
}
