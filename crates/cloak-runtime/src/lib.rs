//! Ingestion runtime for the cloak dashboard.
//!
//! Fetches the raw table through a [`data_manager::TableSource`] and swaps
//! the decoded store into the dashboard context in one step.

pub mod data_manager;

pub use cloak_core as core;
pub use cloak_data as data;
