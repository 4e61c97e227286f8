//! PostgreSQL adapters
//!
//! Handles are `PgConnection`s: a pooled connection for plain execution,
//! the connection under an open `Transaction` otherwise.

mod account_repository;
mod transfer_record_repository;
mod unit_of_work;

pub use account_repository::PgAccountRepository;
pub use transfer_record_repository::PgTransferRecordRepository;
pub use unit_of_work::PgUnitOfWork;
