//! Plain-text rendering of a [`DashboardView`].

use std::fmt::{self, Write};

use cloak_core::formatting::{format_count, format_percent, value_label};
use cloak_data::projection::{DashboardView, FailRateBand};

fn band_label(band: FailRateBand) -> &'static str {
    match band {
        FailRateBand::High => "high",
        FailRateBand::Medium => "medium",
        FailRateBand::Low => "low",
    }
}

/// Render summary, drawn lines and the detail table as plain text.
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    // `fmt::Write` for `String` never returns an error.
    let _ = write_report(&mut out, view);
    out
}

fn write_report(out: &mut String, view: &DashboardView) -> fmt::Result {
    write_summary(out, view)?;
    writeln!(out)?;
    write_series(out, view)?;
    if !view.table.is_empty() {
        writeln!(out)?;
        write_table(out, view)?;
    }
    Ok(())
}

fn write_summary(out: &mut String, view: &DashboardView) -> fmt::Result {
    let range = match (view.dates.first(), view.dates.last()) {
        (Some(first), Some(last)) => format!(" ({first} .. {last})"),
        _ => String::new(),
    };
    writeln!(out, "Dates: {}{}", view.dates.len(), range)?;
    writeln!(out, "Average fail rate: {}", format_percent(view.summary.average_fail_rate))?;
    writeln!(out, "Max fail rate:     {}", format_percent(view.summary.max_fail_rate))?;
    writeln!(out, "Min fail rate:     {}", format_percent(view.summary.min_fail_rate))?;
    writeln!(out, "Total Meta:        {}", format_count(view.summary.total_meta))
}

fn write_series(out: &mut String, view: &DashboardView) -> fmt::Result {
    if view.series.is_empty() {
        return writeln!(out, "No series to display");
    }

    writeln!(out, "Series:")?;
    for series in &view.series {
        let points = series.values.iter().filter(|v| v.is_some()).count();
        write!(out, "  {:<12} {} {:>3} points", series.label, series.color, points)?;
        if view.show_value_labels {
            let labels: Vec<String> = series
                .values
                .iter()
                .map(|v| match value_label(*v) {
                    l if l.is_empty() => "-".to_string(),
                    l => l,
                })
                .collect();
            write!(out, "  {}", labels.join(" "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_table(out: &mut String, view: &DashboardView) -> fmt::Result {
    writeln!(
        out,
        "  {:<12} {:<6} {:>10} {:>10} {:>10}  band",
        "date", "entity", "meta", "ga4", "fail"
    )?;
    for row in &view.table {
        writeln!(
            out,
            "  {:<12} {:<6} {:>10} {:>10} {:>10}  {}",
            row.date,
            row.entity,
            format_count(row.meta),
            format_count(row.ga4),
            format_percent(row.fail_rate),
            band_label(row.band)
        )?;
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
