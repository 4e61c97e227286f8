//! Domain module
//!
//! Core domain types and business logic.

pub mod account;
pub mod amount;
pub mod context;
pub mod error;
pub mod transfer;

pub use account::Account;
pub use amount::{Amount, AmountError};
pub use context::{CancelSignal, Cancelled, RequestContext};
pub use error::DomainError;
pub use transfer::{TransferReceipt, TransferRecord};
