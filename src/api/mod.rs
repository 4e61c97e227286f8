//! API module
//!
//! HTTP endpoints over the account use cases.

pub mod routes;

pub use routes::{create_router, ApiState};
