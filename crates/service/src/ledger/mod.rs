//! Ledger module: three-layer architecture (domain, repository, service).
//!
//! Drivers and client bookings live behind repository traits; the service
//! owns request validation and the cross-store driver search.

pub mod domain;
pub mod repository;
pub mod service;

pub use service::LedgerService;
