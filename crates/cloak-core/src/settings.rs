use clap::Parser;
use std::path::PathBuf;

use crate::error::{CloakError, Result};
use crate::models::{series_of, SeriesId, Window};
use crate::selection::{apply_selection_change, ActiveSeries, Selection, SelectionIntent};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Fail-rate dashboard over a three-series cloak export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cloak-dashboard",
    about = "Fail-rate dashboard over a three-series cloak export",
    version
)]
pub struct Settings {
    /// CSV export to read (two header rows, one data row per date)
    #[arg(long, short)]
    pub input: PathBuf,

    /// Series to focus on
    #[arg(long, default_value = "jb", value_parser = ["all", "jb", "jw", "jg"])]
    pub series: String,

    /// Entity ids to check, comma separated (e.g. jt01,jt02)
    #[arg(long, value_delimiter = ',')]
    pub entities: Vec<String>,

    /// Check every entity of the focused series
    #[arg(long)]
    pub all_entities: bool,

    /// Aggregate the early window (entities 01-08)
    #[arg(long)]
    pub early: bool,

    /// Aggregate the late window (entities 09-13)
    #[arg(long)]
    pub late: bool,

    /// Show value labels on chart points
    #[arg(long)]
    pub labels: bool,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    pub fn active_series(&self) -> Result<ActiveSeries> {
        self.series.parse()
    }

    /// Translate the flags into selection intents.
    ///
    /// Windows are applied before entity checks, so explicitly named
    /// entities survive a window being switched on.
    pub fn intents(&self) -> Result<Vec<SelectionIntent>> {
        let active = self.active_series()?;
        let mut intents = vec![SelectionIntent::SelectSeries(active)];

        if self.early {
            intents.push(SelectionIntent::ToggleWindow(Window::Early));
        }
        if self.late {
            intents.push(SelectionIntent::ToggleWindow(Window::Late));
        }

        if self.all_entities {
            let series: Vec<SeriesId> = active.series();
            intents.extend(series.into_iter().map(|series| SelectionIntent::SetAllEntities {
                series,
                checked: true,
            }));
        }

        for raw in &self.entities {
            let entity_id = raw.trim().to_lowercase();
            if entity_id.is_empty() {
                continue;
            }
            let series = series_of(&entity_id)
                .ok_or_else(|| CloakError::Config(format!("unknown entity: {entity_id}")))?;
            intents.push(SelectionIntent::SetEntity {
                series,
                entity_id,
                checked: true,
            });
        }

        if self.labels {
            intents.push(SelectionIntent::ToggleValueLabels);
        }

        Ok(intents)
    }

    /// Fold [`Settings::intents`] over the default selection.
    pub fn selection(&self) -> Result<Selection> {
        Ok(self
            .intents()?
            .into_iter()
            .fold(Selection::default(), |sel, intent| {
                apply_selection_change(&sel, intent)
            }))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Settings {
        let mut args = vec!["cloak-dashboard", "--input", "export.csv"];
        args.extend_from_slice(extra);
        Settings::load_from_args(args)
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = parse(&[]);
        assert_eq!(settings.input, PathBuf::from("export.csv"));
        assert_eq!(settings.series, "jb");
        assert!(settings.entities.is_empty());
        assert!(!settings.all_entities);
        assert!(!settings.early);
        assert!(!settings.late);
        assert!(!settings.labels);
        assert_eq!(settings.format, "text");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_input_is_required() {
        let result = Settings::try_parse_from(["cloak-dashboard"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_rejects_unknown_series() {
        let result =
            Settings::try_parse_from(["cloak-dashboard", "--input", "x.csv", "--series", "jx"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = parse(&["--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── selection ─────────────────────────────────────────────────────────────

    #[test]
    fn test_selection_from_entities() {
        let settings = parse(&["--series", "jw", "--entities", "jtw02, JTW01"]);
        let sel = settings.selection().unwrap();
        assert_eq!(sel.active_series, ActiveSeries::Series(SeriesId::Jw));
        assert_eq!(
            sel.selected_entities(),
            vec![(SeriesId::Jw, "jtw01"), (SeriesId::Jw, "jtw02")]
        );
    }

    #[test]
    fn test_selection_unknown_entity_is_config_error() {
        let settings = parse(&["--entities", "jt42"]);
        let err = settings.selection().unwrap_err();
        assert!(matches!(err, CloakError::Config(_)));
        assert!(err.to_string().contains("jt42"));
    }

    #[test]
    fn test_selection_windows_and_labels() {
        let settings = parse(&["--series", "all", "--early", "--late", "--labels"]);
        let sel = settings.selection().unwrap();
        assert_eq!(sel.active_series, ActiveSeries::All);
        assert_eq!(sel.active_windows(), vec![Window::Early, Window::Late]);
        assert!(sel.show_value_labels);
    }

    #[test]
    fn test_selection_entities_survive_window_flag() {
        let settings = parse(&["--late", "--entities", "jt01"]);
        let sel = settings.selection().unwrap();
        assert!(sel.late_window_active);
        assert!(sel.is_entity_checked(SeriesId::Jb, "jt01"));
    }

    #[test]
    fn test_selection_all_entities() {
        let settings = parse(&["--series", "jg", "--all-entities"]);
        let sel = settings.selection().unwrap();
        assert_eq!(sel.selected_entities().len(), 13);
    }
}
