//! HTTP handlers for the cupcake API and the home page.

pub mod cupcakes;
pub mod home;
pub use home::home;
