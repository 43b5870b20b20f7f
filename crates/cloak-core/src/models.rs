use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::CloakError;

/// Number of entities tracked by every series.
pub const ENTITIES_PER_SERIES: usize = 13;

/// Number of columns one entity occupies in the export.
pub const COLUMN_STRIDE: usize = 3;

// ── SeriesId ──────────────────────────────────────────────────────────────────

/// Identifier of one of the three fixed series in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesId {
    Jb,
    Jw,
    Jg,
}

impl SeriesId {
    /// All series in catalogue order.
    pub const ALL: [SeriesId; 3] = [SeriesId::Jb, SeriesId::Jw, SeriesId::Jg];

    /// Stable lowercase key, e.g. `"jb"`.
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesId::Jb => "jb",
            SeriesId::Jw => "jw",
            SeriesId::Jg => "jg",
        }
    }

    /// The fixed definition of this series.
    pub fn definition(self) -> &'static SeriesDefinition {
        match self {
            SeriesId::Jb => &SERIES[0],
            SeriesId::Jw => &SERIES[1],
            SeriesId::Jg => &SERIES[2],
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesId {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jb" => Ok(SeriesId::Jb),
            "jw" => Ok(SeriesId::Jw),
            "jg" => Ok(SeriesId::Jg),
            other => Err(CloakError::Config(format!("unknown series: {other}"))),
        }
    }
}

// ── ColumnLayout ──────────────────────────────────────────────────────────────

/// Field order inside one entity's 3-column group.
///
/// The export is not uniform: series A writes (volume, ratio, reference)
/// while B and C write (reference, volume, ratio). Volume is the Meta click
/// count, ratio the fail rate, reference the GA4 session count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnLayout {
    VolumeRatioReference,
    ReferenceVolumeRatio,
}

/// Column offsets of each field relative to an entity's first column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOffsets {
    pub meta: usize,
    pub ga4: usize,
    pub fail_rate: usize,
}

impl ColumnLayout {
    pub const fn offsets(self) -> FieldOffsets {
        match self {
            ColumnLayout::VolumeRatioReference => FieldOffsets {
                meta: 0,
                fail_rate: 1,
                ga4: 2,
            },
            ColumnLayout::ReferenceVolumeRatio => FieldOffsets {
                ga4: 0,
                meta: 1,
                fail_rate: 2,
            },
        }
    }
}

// ── SeriesDefinition ──────────────────────────────────────────────────────────

/// Static description of one series: its entities, colour and column block.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesDefinition {
    pub series_id: SeriesId,
    pub display_name: &'static str,
    /// Hex colour shared by every line of this series.
    pub color: &'static str,
    pub entity_ids: &'static [&'static str],
    pub column_layout: ColumnLayout,
    /// Column index of the first entity's first field.
    pub start_column: usize,
}

impl SeriesDefinition {
    /// First column of the entity at `position` (0-based).
    pub fn entity_column(&self, position: usize) -> usize {
        self.start_column + position * COLUMN_STRIDE
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entity_ids.contains(&entity_id)
    }
}

const JB_ENTITIES: [&str; ENTITIES_PER_SERIES] = [
    "jt01", "jt02", "jt03", "jt04", "jt05", "jt06", "jt07", "jt08", "jt09", "jt10", "jt11",
    "jt12", "jt13",
];

const JW_ENTITIES: [&str; ENTITIES_PER_SERIES] = [
    "jtw01", "jtw02", "jtw03", "jtw04", "jtw05", "jtw06", "jtw07", "jtw08", "jtw09", "jtw10",
    "jtw11", "jtw12", "jtw13",
];

const JG_ENTITIES: [&str; ENTITIES_PER_SERIES] = [
    "jtg01", "jtg02", "jtg03", "jtg04", "jtg05", "jtg06", "jtg07", "jtg08", "jtg09", "jtg10",
    "jtg11", "jtg12", "jtg13",
];

/// The three series of the export, in catalogue order.
///
/// Columns 1 and 80 carry series title cells and are never decoded.
pub static SERIES: [SeriesDefinition; 3] = [
    SeriesDefinition {
        series_id: SeriesId::Jb,
        display_name: "JB",
        color: "#FF6384",
        entity_ids: &JB_ENTITIES,
        column_layout: ColumnLayout::VolumeRatioReference,
        start_column: 2,
    },
    SeriesDefinition {
        series_id: SeriesId::Jw,
        display_name: "JW",
        color: "#36A2EB",
        entity_ids: &JW_ENTITIES,
        column_layout: ColumnLayout::ReferenceVolumeRatio,
        start_column: 41,
    },
    SeriesDefinition {
        series_id: SeriesId::Jg,
        display_name: "JG",
        color: "#FFCE56",
        entity_ids: &JG_ENTITIES,
        column_layout: ColumnLayout::ReferenceVolumeRatio,
        start_column: 81,
    },
];

/// Series that owns `entity_id`, or `None` for an unknown id.
pub fn series_of(entity_id: &str) -> Option<SeriesId> {
    SERIES
        .iter()
        .find(|def| def.contains(entity_id))
        .map(|def| def.series_id)
}

// ── CloakMetric / DateRecord ──────────────────────────────────────────────────

/// Counters for one entity on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloakMetric {
    /// Meta click count (the volume field).
    pub meta_count: u64,
    /// GA4 session count (the reference field).
    pub ga4_count: u64,
    /// Fail rate in percent, rounded to 2 decimals at decode time.
    /// Out-of-range values are kept as-is.
    pub fail_rate: f64,
}

impl CloakMetric {
    /// At least one field is strictly positive.
    pub fn is_meaningful(&self) -> bool {
        self.meta_count > 0 || self.ga4_count > 0 || self.fail_rate > 0.0
    }
}

/// All entity metrics decoded from one data row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRecord {
    pub date: String,
    /// Absent key means no data for that entity on this date.
    pub metrics: BTreeMap<String, CloakMetric>,
}

impl DateRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(&self, entity_id: &str) -> Option<&CloakMetric> {
        self.metrics.get(entity_id)
    }
}

// ── Windows ───────────────────────────────────────────────────────────────────

/// One of the two fixed aggregation windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// First 8 entities of each series.
    Early,
    /// Last 5 entities of each series.
    Late,
}

impl Window {
    pub const ALL: [Window; 2] = [Window::Early, Window::Late];

    /// Entity positions covered by this window.
    pub fn entity_range(self) -> Range<usize> {
        match self {
            Window::Early => 0..8,
            Window::Late => 8..ENTITIES_PER_SERIES,
        }
    }

    /// Suffix appended to a series display name, e.g. `"JB(01-08)"`.
    pub fn label_suffix(self) -> &'static str {
        match self {
            Window::Early => "(01-08)",
            Window::Late => "(09-13)",
        }
    }

    /// Entity ids of `series` that fall inside this window.
    pub fn entity_ids(self, series: SeriesId) -> &'static [&'static str] {
        &series.definition().entity_ids[self.entity_range()]
    }
}

/// A window materialised as explicit entity-id subsets per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationWindow {
    pub window_id: Window,
    pub entity_ids_by_series: BTreeMap<SeriesId, &'static [&'static str]>,
}

impl AggregationWindow {
    pub fn new(window: Window) -> Self {
        let entity_ids_by_series = SeriesId::ALL
            .iter()
            .map(|&series| (series, window.entity_ids(series)))
            .collect();
        Self {
            window_id: window,
            entity_ids_by_series,
        }
    }

    pub fn entity_ids(&self, series: SeriesId) -> &'static [&'static str] {
        self.entity_ids_by_series
            .get(&series)
            .copied()
            .unwrap_or(&[])
    }
}
