//! Decode → normalize → aggregate → project pipeline.
//!
//! Turns the raw CSV export into a [`store::TimeSeriesStore`], runs the
//! entity and window computations of [`aggregator::AggregationEngine`] and
//! assembles a renderer-ready [`projection::DashboardView`]. The
//! [`dashboard::Dashboard`] context owns the store and the selection.

pub mod aggregator;
pub mod dashboard;
pub mod decoder;
pub mod projection;
pub mod store;
pub mod tokenizer;

pub use cloak_core as core;
