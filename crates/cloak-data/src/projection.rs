//! Renderer-facing view of a store under a selection.
//!
//! The projection decides which lines are drawn and what the summary panel
//! shows. It never mutates its inputs, so building the same view twice from
//! the same store and selection gives identical output.

use serde::Serialize;

use cloak_core::models::{SeriesId, Window};
use cloak_core::selection::{ActiveSeries, Selection};

use crate::aggregator::AggregationEngine;
use crate::store::TimeSeriesStore;

/// Keep a fail rate only if it is drawable, i.e. inside `[0, 100]`.
pub fn display_value(fail_rate: f64) -> Option<f64> {
    (0.0..=100.0).contains(&fail_rate).then_some(fail_rate)
}

/// A line is worth drawing when at least one point is strictly positive.
fn has_positive_value(values: &[Option<f64>]) -> bool {
    values.iter().any(|v| matches!(v, Some(x) if *x > 0.0))
}

// ── Output types ──────────────────────────────────────────────────────────────

/// One named line aligned 1:1 with the date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSeries {
    /// Entity id, or series display name plus window suffix.
    pub label: String,
    pub series_id: SeriesId,
    pub color: String,
    /// Set for window aggregates, `None` for single entities.
    pub window: Option<Window>,
    pub values: Vec<Option<f64>>,
}

/// Figures for the summary panel, over the entity-level selection only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub average_fail_rate: f64,
    pub max_fail_rate: f64,
    pub min_fail_rate: f64,
    pub total_meta: u64,
    /// Number of meaningful (date, entity) samples behind the figures.
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailRateBand {
    Low,
    Medium,
    High,
}

impl FailRateBand {
    pub fn from_rate(fail_rate: f64) -> Self {
        if fail_rate > 60.0 {
            FailRateBand::High
        } else if fail_rate > 30.0 {
            FailRateBand::Medium
        } else {
            FailRateBand::Low
        }
    }
}

/// One line of the detail table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: String,
    /// Upper-case entity id, e.g. `JT01`.
    pub entity: String,
    pub meta: u64,
    pub ga4: u64,
    pub fail_rate: f64,
    pub band: FailRateBand,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub dates: Vec<String>,
    pub series: Vec<DataSeries>,
    pub summary: SummaryStats,
    pub table: Vec<TableRow>,
    pub show_value_labels: bool,
}

// ── ViewProjection ────────────────────────────────────────────────────────────

pub struct ViewProjection;

impl ViewProjection {
    pub fn build(store: &TimeSeriesStore, selection: &Selection) -> DashboardView {
        DashboardView {
            dates: store.dates(),
            series: Self::data_series(store, selection),
            summary: Self::summary(store, selection),
            table: Self::table_rows(store, selection),
            show_value_labels: selection.show_value_labels,
        }
    }

    /// Lines to draw.
    ///
    /// While any window is active the window aggregates of the focused
    /// series replace the per-entity lines. Values outside `[0, 100]` become
    /// `None`, and a line with no positive value is left out entirely.
    pub fn data_series(store: &TimeSeriesStore, selection: &Selection) -> Vec<DataSeries> {
        if selection.has_active_window() {
            Self::window_series(store, selection)
        } else {
            Self::entity_series(store, selection)
        }
    }

    fn entity_series(store: &TimeSeriesStore, selection: &Selection) -> Vec<DataSeries> {
        let selected = selection.selected_entities();
        let mut out = Vec::new();

        for series in selection.active_series.series() {
            let ids: Vec<&str> = selected
                .iter()
                .filter(|(owner, _)| *owner == series)
                .map(|(_, id)| *id)
                .collect();
            if ids.is_empty() {
                continue;
            }

            let color = series.definition().color;
            for track in AggregationEngine::project_entities(store, series, &ids) {
                let values: Vec<Option<f64>> = track
                    .values
                    .iter()
                    .map(|v| v.and_then(display_value))
                    .collect();
                if !has_positive_value(&values) {
                    continue;
                }
                out.push(DataSeries {
                    label: track.entity_id,
                    series_id: series,
                    color: color.to_string(),
                    window: None,
                    values,
                });
            }
        }

        out
    }

    fn window_series(store: &TimeSeriesStore, selection: &Selection) -> Vec<DataSeries> {
        let windows = selection.active_windows();
        let series = selection.active_series.series();
        let records = AggregationEngine::aggregate_windows(store, &windows, &series);
        let mut out = Vec::new();

        for &window in &windows {
            for &series_id in &series {
                let values: Vec<Option<f64>> = records
                    .iter()
                    .map(|record| {
                        record
                            .get(series_id, window)
                            .filter(|t| t.is_meaningful())
                            .and_then(|t| display_value(t.fail_rate))
                    })
                    .collect();
                if !has_positive_value(&values) {
                    continue;
                }
                let def = series_id.definition();
                out.push(DataSeries {
                    label: format!("{}{}", def.display_name, window.label_suffix()),
                    series_id,
                    color: def.color.to_string(),
                    window: Some(window),
                    values,
                });
            }
        }

        out
    }

    /// Average, extremes and total volume over meaningful samples.
    ///
    /// Stored fail rates are used as-is here; the display range filter only
    /// applies to drawn lines.
    pub fn summary(store: &TimeSeriesStore, selection: &Selection) -> SummaryStats {
        let selected = selection.selected_entities();
        let mut stats = SummaryStats::default();
        let mut sum = 0.0;

        for record in store.records() {
            for (_, entity_id) in &selected {
                let Some(metric) = record.metric(entity_id).filter(|m| m.is_meaningful()) else {
                    continue;
                };
                if stats.sample_count == 0 {
                    stats.max_fail_rate = metric.fail_rate;
                    stats.min_fail_rate = metric.fail_rate;
                } else {
                    stats.max_fail_rate = stats.max_fail_rate.max(metric.fail_rate);
                    stats.min_fail_rate = stats.min_fail_rate.min(metric.fail_rate);
                }
                sum += metric.fail_rate;
                stats.total_meta = stats.total_meta.saturating_add(metric.meta_count);
                stats.sample_count += 1;
            }
        }

        if stats.sample_count > 0 {
            stats.average_fail_rate = sum / stats.sample_count as f64;
        }
        stats
    }

    /// Detail rows, date-major then selection order.
    ///
    /// With every series in view any meaningful metric is listed; a single
    /// focused series only lists entities that had Meta volume that day.
    pub fn table_rows(store: &TimeSeriesStore, selection: &Selection) -> Vec<TableRow> {
        let selected = selection.selected_entities();
        let show_all = selection.active_series == ActiveSeries::All;
        let mut rows = Vec::new();

        for record in store.records() {
            for (_, entity_id) in &selected {
                let Some(metric) = record.metric(entity_id) else {
                    continue;
                };
                let listed = if show_all {
                    metric.is_meaningful()
                } else {
                    metric.meta_count > 0
                };
                if !listed {
                    continue;
                }
                rows.push(TableRow {
                    date: record.date.clone(),
                    entity: entity_id.to_uppercase(),
                    meta: metric.meta_count,
                    ga4: metric.ga4_count,
                    fail_rate: metric.fail_rate,
                    band: FailRateBand::from_rate(metric.fail_rate),
                });
            }
        }

        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
