//! Infrastructure module
//!
//! Adapters for the repository and unit-of-work contracts: PostgreSQL (via
//! sqlx, used against DSQL) and an in-memory store for tests and demos.

pub mod memory;
pub mod postgres;

pub use memory::{
    MemoryAccountRepository, MemoryDatabase, MemorySession, MemoryTransferRecordRepository,
    MemoryUnitOfWork,
};
pub use postgres::{PgAccountRepository, PgTransferRecordRepository, PgUnitOfWork};
