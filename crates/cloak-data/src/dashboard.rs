//! The dashboard context: one store, one selection.
//!
//! [`Dashboard`] is the only mutable unit of the pipeline. Callers feed it
//! raw tables and selection intents and read back a [`DashboardView`].

use tracing::{debug, info};

use cloak_core::selection::{apply_selection_change, Selection, SelectionIntent};

use crate::projection::{DashboardView, ViewProjection};
use crate::store::TimeSeriesStore;

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Owns the current store and selection.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    store: TimeSeriesStore,
    selection: Selection,
}

impl Dashboard {
    /// Empty store, default selection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: Selection) -> Self {
        Self {
            store: TimeSeriesStore::default(),
            selection,
        }
    }

    /// Decode `raw` and replace the current store with it.
    ///
    /// Returns the number of records now held.
    pub fn ingest(&mut self, raw: &str) -> usize {
        self.replace_store(TimeSeriesStore::decode(raw));
        self.store.len()
    }

    /// Swap in an already decoded store. The previous store is dropped whole.
    pub fn replace_store(&mut self, store: TimeSeriesStore) {
        info!(
            previous = self.store.len(),
            current = store.len(),
            "store replaced"
        );
        self.store = store;
    }

    /// Fold one intent into the selection.
    pub fn apply(&mut self, intent: SelectionIntent) {
        debug!(?intent, "applying selection change");
        self.selection = apply_selection_change(&self.selection, intent);
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Project the current store through the current selection.
    pub fn view(&self) -> DashboardView {
        ViewProjection::build(&self.store, &self.selection)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
