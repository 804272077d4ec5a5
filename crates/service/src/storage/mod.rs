//! Storage abstractions for service layer
//!
//! Contains the file-backed JSON document store shared by the driver and
//! client repositories.

pub mod json_file_store;
