//! File-backed repository implementations.

pub mod client_store;
pub mod driver_store;

pub use client_store::FileClientStore;
pub use driver_store::FileDriverStore;
