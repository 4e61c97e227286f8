//! Repository module
//!
//! Data-access contracts. Each operation runs against a handle supplied by
//! the unit of work, so the same calls work on a plain connection or inside
//! an open transaction.

mod account;
mod transfer_record;

pub use account::AccountRepository;
pub use transfer_record::TransferRecordRepository;
