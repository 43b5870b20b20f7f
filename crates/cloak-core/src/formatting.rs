/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use cloak_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (value.abs() * factor).round() / factor;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());
    let body = if decimals == 0 {
        grouped
    } else {
        // "0.50" → ".50"
        let frac = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        format!("{}{}", grouped, &frac[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Integer count with thousands separators, e.g. `12,345`.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Fail rate as shown in summaries and tables: two decimals plus `%`.
///
/// ```
/// use cloak_core::formatting::format_percent;
///
/// assert_eq!(format_percent(33.5), "33.50%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 2))
}

/// On-point value label: one decimal plus `%`, nothing for empty or
/// non-positive values.
///
/// ```
/// use cloak_core::formatting::value_label;
///
/// assert_eq!(value_label(Some(47.32)), "47.3%");
/// assert_eq!(value_label(Some(0.0)), "");
/// assert_eq!(value_label(None), "");
/// ```
pub fn value_label(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("{:.1}%", v),
        _ => String::new(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
