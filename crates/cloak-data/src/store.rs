//! Ordered per-date records decoded from one export.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cloak_core::models::DateRecord;

use crate::decoder::{decode_row, HEADER_ROWS};
use crate::tokenizer::tokenize_row;

/// Every decoded data row, in source order.
///
/// A store is rebuilt wholesale on each ingestion; there is no merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesStore {
    records: Vec<DateRecord>,
}

impl TimeSeriesStore {
    /// Decode the whole raw table.
    ///
    /// The first [`HEADER_ROWS`] lines are skipped unconditionally, as are
    /// blank lines and rows whose date cell is empty.
    pub fn decode(raw: &str) -> Self {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in raw.lines().enumerate().skip(HEADER_ROWS) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match decode_row(&tokenize_row(line)) {
                Some(record) => {
                    debug!(row = index + 1, date = %record.date, "decoded row");
                    records.push(record);
                }
                None => skipped += 1,
            }
        }

        info!(records = records.len(), skipped, "table decoded");
        Self { records }
    }

    pub fn from_records(records: Vec<DateRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DateRecord] {
        &self.records
    }

    /// The date axis, one label per record.
    pub fn dates(&self) -> Vec<String> {
        self.records.iter().map(|r| r.date.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "日期,JB,jt01,,,jt02\n,,Meta,Fail,GA4,Meta\n";

    #[test]
    fn test_header_only_table_is_empty() {
        let store = TimeSeriesStore::decode(HEADER);
        assert!(store.is_empty());
        assert!(store.dates().is_empty());
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(TimeSeriesStore::decode("").is_empty());
    }

    #[test]
    fn test_first_two_lines_skipped_even_with_dates() {
        let raw = "8/1,JB,1,1,1\n8/2,JB,1,1,1\n8/3,JB,1,1,1\n";
        let store = TimeSeriesStore::decode(raw);
        assert_eq!(store.dates(), vec!["8/3"]);
    }

    #[test]
    fn test_rows_keep_source_order_and_skip_undated() {
        let raw = format!("{HEADER}8/2,JB,5\n,JB,9\n\n   \n8/1,JB,7\r\n");
        let store = TimeSeriesStore::decode(&raw);
        assert_eq!(store.dates(), vec!["8/2", "8/1"]);
        assert_eq!(store.records()[0].metric("jt01").unwrap().meta_count, 5);
        assert_eq!(store.records()[1].metric("jt01").unwrap().meta_count, 7);
    }

    #[test]
    fn test_every_record_holds_all_entities() {
        let raw = format!("{HEADER}8/1\n");
        let store = TimeSeriesStore::decode(&raw);
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].metrics.len(), 39);
    }

    #[test]
    fn test_quoted_date_cell() {
        let raw = format!("{HEADER}\"Aug 1, 2024\",JB,\"1,200\",10%,3\n");
        let store = TimeSeriesStore::decode(&raw);
        assert_eq!(store.dates(), vec!["Aug 1, 2024"]);
        let jt01 = store.records()[0].metric("jt01").unwrap();
        assert_eq!(jt01.meta_count, 1200);
        assert_eq!(jt01.fail_rate, 10.0);
        assert_eq!(jt01.ga4_count, 3);
    }
}
