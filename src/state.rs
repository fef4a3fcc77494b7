//! Shared application state for all routes.

use crate::service::CupcakeService;

#[derive(Clone)]
pub struct AppState {
    pub cupcakes: CupcakeService,
}
