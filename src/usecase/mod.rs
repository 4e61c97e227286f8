//! Use case module
//!
//! Application operations composed from repositories, the eligibility rule
//! and a unit of work.

mod account;

pub use account::{AccountService, AccountUseCase, TransferStage};
