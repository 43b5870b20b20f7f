//! Entity-level projection and window aggregation over a store.
//!
//! Both operations are total and read-only: empty inputs give empty outputs,
//! and nothing here clamps or filters for display. Range filtering belongs
//! to [`crate::projection`].

use serde::Serialize;

use cloak_core::models::{AggregationWindow, SeriesId, Window};

use crate::store::TimeSeriesStore;

// ── EntityTrack ───────────────────────────────────────────────────────────────

/// One entity's stored fail rates, aligned with the store's dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTrack {
    pub series_id: SeriesId,
    pub entity_id: String,
    /// `None` where the entity has no meaningful metric on that date.
    pub values: Vec<Option<f64>>,
}

// ── WindowTotals ──────────────────────────────────────────────────────────────

/// Summed counters of one series × window pair on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowTotals {
    pub series_id: SeriesId,
    pub window: Window,
    pub total_meta: u64,
    pub total_ga4: u64,
    /// Derived, unrounded, unclamped.
    pub fail_rate: f64,
}

impl WindowTotals {
    /// At least one field is strictly positive.
    pub fn is_meaningful(&self) -> bool {
        self.total_meta > 0 || self.total_ga4 > 0 || self.fail_rate > 0.0
    }
}

/// All window totals computed for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowRecord {
    pub date: String,
    pub totals: Vec<WindowTotals>,
}

impl WindowRecord {
    pub fn get(&self, series: SeriesId, window: Window) -> Option<&WindowTotals> {
        self.totals
            .iter()
            .find(|t| t.series_id == series && t.window == window)
    }
}

/// Fail rate of summed counters: `(1 - ga4 / meta) * 100`.
///
/// Zero volume is reported as exactly 100 % failure.
pub fn aggregated_fail_rate(total_meta: u64, total_ga4: u64) -> f64 {
    let conversion_rate = if total_meta > 0 {
        total_ga4 as f64 / total_meta as f64
    } else {
        0.0
    };
    (1.0 - conversion_rate) * 100.0
}

// ── AggregationEngine ─────────────────────────────────────────────────────────

/// Stateless helper that derives per-date metrics from a store.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Stored fail rate per date for each of `entity_ids` within `series`.
    ///
    /// Ids that do not belong to `series` are skipped. A date yields `None`
    /// when the entity is absent or all of its fields are non-positive.
    pub fn project_entities(
        store: &TimeSeriesStore,
        series: SeriesId,
        entity_ids: &[&str],
    ) -> Vec<EntityTrack> {
        let definition = series.definition();

        entity_ids
            .iter()
            .filter(|id| definition.contains(id))
            .map(|&entity_id| EntityTrack {
                series_id: series,
                entity_id: entity_id.to_string(),
                values: store
                    .records()
                    .iter()
                    .map(|record| {
                        record
                            .metric(entity_id)
                            .filter(|m| m.is_meaningful())
                            .map(|m| m.fail_rate)
                    })
                    .collect(),
            })
            .collect()
    }

    /// Sum each window's entities per series for every date.
    ///
    /// Totals are ordered window-major (all series of the first window,
    /// then the next). Sums saturate at `u64::MAX`. Returns nothing when
    /// either list is empty.
    pub fn aggregate_windows(
        store: &TimeSeriesStore,
        windows: &[Window],
        series: &[SeriesId],
    ) -> Vec<WindowRecord> {
        if windows.is_empty() || series.is_empty() {
            return Vec::new();
        }

        let definitions: Vec<AggregationWindow> =
            windows.iter().map(|&w| AggregationWindow::new(w)).collect();

        store
            .records()
            .iter()
            .map(|record| {
                let mut totals = Vec::with_capacity(windows.len() * series.len());
                for window in &definitions {
                    for &series_id in series {
                        let (total_meta, total_ga4) = window
                            .entity_ids(series_id)
                            .iter()
                            .filter_map(|id| record.metric(id))
                            .fold((0u64, 0u64), |(meta, ga4), m| {
                                (
                                    meta.saturating_add(m.meta_count),
                                    ga4.saturating_add(m.ga4_count),
                                )
                            });
                        totals.push(WindowTotals {
                            series_id,
                            window: window.window_id,
                            total_meta,
                            total_ga4,
                            fail_rate: aggregated_fail_rate(total_meta, total_ga4),
                        });
                    }
                }
                WindowRecord {
                    date: record.date.clone(),
                    totals,
                }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
