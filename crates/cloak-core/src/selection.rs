//! Caller-controlled filter state and its pure update function.
//!
//! A [`Selection`] is never mutated in place by the engine. Every user
//! gesture is expressed as a [`SelectionIntent`] and folded into a new
//! selection by [`apply_selection_change`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CloakError;
use crate::models::{SeriesId, Window};

// ── ActiveSeries ──────────────────────────────────────────────────────────────

/// Which series the dashboard is focused on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveSeries {
    /// Every entity of every series, regardless of checkboxes.
    All,
    Series(SeriesId),
}

impl ActiveSeries {
    /// Series in scope, in catalogue order.
    pub fn series(self) -> Vec<SeriesId> {
        match self {
            ActiveSeries::All => SeriesId::ALL.to_vec(),
            ActiveSeries::Series(id) => vec![id],
        }
    }
}

impl fmt::Display for ActiveSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveSeries::All => f.write_str("all"),
            ActiveSeries::Series(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ActiveSeries {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ActiveSeries::All);
        }
        s.parse::<SeriesId>().map(ActiveSeries::Series)
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Process-local filter state read by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub active_series: ActiveSeries,
    /// Checked entity ids, keyed by owning series.
    pub active_entity_ids_by_series: BTreeMap<SeriesId, BTreeSet<String>>,
    pub early_window_active: bool,
    pub late_window_active: bool,
    pub show_value_labels: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            active_series: ActiveSeries::Series(SeriesId::Jb),
            active_entity_ids_by_series: SeriesId::ALL
                .iter()
                .map(|&id| (id, BTreeSet::new()))
                .collect(),
            early_window_active: false,
            late_window_active: false,
            show_value_labels: false,
        }
    }
}

impl Selection {
    /// Active windows in fixed order (early before late).
    pub fn active_windows(&self) -> Vec<Window> {
        Window::ALL
            .into_iter()
            .filter(|&w| self.is_window_active(w))
            .collect()
    }

    pub fn is_window_active(&self, window: Window) -> bool {
        match window {
            Window::Early => self.early_window_active,
            Window::Late => self.late_window_active,
        }
    }

    /// Window aggregates replace per-entity lines while any window is on.
    pub fn has_active_window(&self) -> bool {
        self.early_window_active || self.late_window_active
    }

    pub fn is_entity_checked(&self, series: SeriesId, entity_id: &str) -> bool {
        self.active_entity_ids_by_series
            .get(&series)
            .is_some_and(|ids| ids.contains(entity_id))
    }

    /// Entities in the entity-level selection, in catalogue order.
    ///
    /// With [`ActiveSeries::All`] this is every entity of every series;
    /// otherwise the checked entities of the focused series.
    pub fn selected_entities(&self) -> Vec<(SeriesId, &'static str)> {
        match self.active_series {
            ActiveSeries::All => SeriesId::ALL
                .iter()
                .flat_map(|&series| {
                    series
                        .definition()
                        .entity_ids
                        .iter()
                        .map(move |&id| (series, id))
                })
                .collect(),
            ActiveSeries::Series(series) => series
                .definition()
                .entity_ids
                .iter()
                .filter(|id| self.is_entity_checked(series, id))
                .map(|&id| (series, id))
                .collect(),
        }
    }

    fn set_window(&mut self, window: Window, active: bool) {
        match window {
            Window::Early => self.early_window_active = active,
            Window::Late => self.late_window_active = active,
        }
    }

    fn clear_entities(&mut self) {
        for ids in self.active_entity_ids_by_series.values_mut() {
            ids.clear();
        }
    }
}

// ── Intents ───────────────────────────────────────────────────────────────────

/// One user-level change to the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionIntent {
    /// Focus a single series, or all of them.
    SelectSeries(ActiveSeries),
    /// Check or uncheck one entity of a series.
    SetEntity {
        series: SeriesId,
        entity_id: String,
        checked: bool,
    },
    /// Check or uncheck every entity of a series.
    SetAllEntities { series: SeriesId, checked: bool },
    /// Flip a window on or off. Turning any window on clears all entity checks.
    ToggleWindow(Window),
    ToggleValueLabels,
}

/// Fold `intent` into `current`, returning the new selection.
pub fn apply_selection_change(current: &Selection, intent: SelectionIntent) -> Selection {
    let mut next = current.clone();

    match intent {
        SelectionIntent::SelectSeries(active) => {
            next.active_series = active;
        }
        SelectionIntent::SetEntity {
            series,
            entity_id,
            checked,
        } => {
            if !series.definition().contains(&entity_id) {
                debug!(%series, entity_id = %entity_id, "ignoring entity outside series");
                return next;
            }
            let ids = next.active_entity_ids_by_series.entry(series).or_default();
            if checked {
                ids.insert(entity_id);
            } else {
                ids.remove(&entity_id);
            }
        }
        SelectionIntent::SetAllEntities { series, checked } => {
            let ids = next.active_entity_ids_by_series.entry(series).or_default();
            if checked {
                ids.extend(series.definition().entity_ids.iter().map(|id| id.to_string()));
            } else {
                ids.clear();
            }
        }
        SelectionIntent::ToggleWindow(window) => {
            let active = !next.is_window_active(window);
            next.set_window(window, active);
            if next.has_active_window() {
                next.clear_entities();
            }
        }
        SelectionIntent::ToggleValueLabels => {
            next.show_value_labels = !next.show_value_labels;
        }
    }

    next
}
