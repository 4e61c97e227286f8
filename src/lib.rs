//! dsql_transfer Library
//!
//! Double-entry balance transfer against Aurora DSQL. Re-exports modules for
//! the binary, integration tests and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod infrastructure;
pub mod repository;
pub mod service;
pub mod unit_of_work;
pub mod usecase;

mod error;

pub use config::Config;
pub use domain::{Account, Amount, AmountError, DomainError, RequestContext, TransferRecord};
pub use error::{AppError, AppResult, ErrorResponse};
pub use unit_of_work::UnitOfWork;
pub use usecase::{AccountService, AccountUseCase};
