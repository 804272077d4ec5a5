//! Service layer for the booking ledger.
//! - `ledger`: domain types, repository traits and the business service.
//! - `file`: JSON file implementations of the repositories.
//! - `storage`: the generic locked JSON document store they share.

pub mod errors;
pub mod file;
pub mod ledger;
pub mod storage;
