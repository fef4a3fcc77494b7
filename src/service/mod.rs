//! Cupcake business logic: normalization, change detection, and the CRUD service.

mod changes;
mod cupcakes;
mod normalize;

pub use changes::{detect_changes, Change};
pub use cupcakes::CupcakeService;
pub use normalize::{normalize, normalize_all, normalize_value};
