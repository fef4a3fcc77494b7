//! Cupcake API routes and the HTML home page.
//! Ids are taken as strings so a non-numeric id reaches the handler and gets a JSON 404.

use crate::handlers::cupcakes::{create, delete as delete_handler, list, read, update};
use crate::handlers::home;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn cupcake_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/cupcakes", get(list).post(create))
        .route(
            "/api/cupcakes/:id",
            get(read).patch(update).delete(delete_handler),
        )
        .with_state(state)
}
