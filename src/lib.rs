//! Cupcake API: CRUD for cupcake records over HTTP, backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError, StoreError};
pub use model::{Cupcake, Field, FieldInput, FieldValue, Fields, DEFAULT_IMAGE};
pub use response::{Message, Outcome};
pub use routes::{app, common_routes, cupcake_routes};
pub use service::CupcakeService;
pub use state::AppState;
pub use store::{
    ensure_cupcakes_table, ensure_database_exists, CupcakeDraft, CupcakeStore, MemoryCupcakeStore, PgCupcakeStore,
};
