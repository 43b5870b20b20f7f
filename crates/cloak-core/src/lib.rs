//! Core domain types for the cloak fail-rate dashboard.
//!
//! Holds the fixed series catalogue, the per-date metric model, the numeric
//! normalizer used by the decoder, the selection state with its pure update
//! function, CLI settings and the shared error type.

pub mod error;
pub mod formatting;
pub mod models;
pub mod numeric;
pub mod selection;
pub mod settings;

pub use error::{CloakError, Result};
