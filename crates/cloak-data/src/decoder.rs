//! Fixed-offset column decoding for the three-series export.
//!
//! Column 0 holds the date. Each series occupies a block of 13 consecutive
//! 3-column groups starting at its fixed offset, with the field order given
//! by the series' [`ColumnLayout`].

use cloak_core::models::{CloakMetric, ColumnLayout, DateRecord, SERIES};
use cloak_core::numeric::{to_float, to_integer};

/// Leading rows of the export that never carry data.
pub const HEADER_ROWS: usize = 2;

/// Cell at `index`, or the empty string past the end of a short row.
fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

/// Stored counts are never negative.
fn to_count(raw: &str) -> u64 {
    u64::try_from(to_integer(raw)).unwrap_or(0)
}

/// Round a per-entity fail rate to 2 decimals, halves away from zero.
///
/// Only decoded cells go through here; window aggregates stay unrounded.
pub fn round_fail_rate(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decode one entity's metric from the group starting at `start_column`.
pub fn decode_metric(cells: &[String], start_column: usize, layout: ColumnLayout) -> CloakMetric {
    let offsets = layout.offsets();
    CloakMetric {
        meta_count: to_count(cell(cells, start_column + offsets.meta)),
        ga4_count: to_count(cell(cells, start_column + offsets.ga4)),
        fail_rate: round_fail_rate(to_float(cell(cells, start_column + offsets.fail_rate))),
    }
}

/// Decode a tokenized data row into a [`DateRecord`].
///
/// Returns `None` when the trimmed date cell is empty. Otherwise every
/// entity of every series gets an entry, zeros included.
pub fn decode_row(cells: &[String]) -> Option<DateRecord> {
    let date = cell(cells, 0).trim();
    if date.is_empty() {
        return None;
    }

    let mut record = DateRecord::new(date);
    for def in &SERIES {
        for (position, entity_id) in def.entity_ids.iter().enumerate() {
            let metric = decode_metric(cells, def.entity_column(position), def.column_layout);
            record.metrics.insert(entity_id.to_string(), metric);
        }
    }

    Some(record)
}
