//! Domain services
//!
//! Pure business rules with no access to storage.

mod transfer;

pub use transfer::can_transfer;
