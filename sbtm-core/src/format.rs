//! Formatting helpers shared by the table writers and the summary views.

use chrono::{NaiveDate, NaiveDateTime};

/// Render a real number the way the report tables expect it.
///
/// Integral values keep one decimal (`1.0`), other values use the shortest
/// representation that round-trips (`0.7`, `1.3333333333333333`). Very small
/// and very large magnitudes switch to exponent form (`1.0e-05`, `1.0e+16`).
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format_exponent(value);
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn format_exponent(value: f64) -> String {
    let text = format!("{:e}", value);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let mantissa = if mantissa.contains('.') {
        mantissa.to_string()
    } else {
        format!("{}.0", mantissa)
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// Render a number for people: integral values without decimals, others to
/// two places.
pub fn format_summary_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// `2024-01-15`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `09:00 am`
pub fn format_time(datetime: NaiveDateTime) -> String {
    datetime.format("%I:%M %p").to_string().to_lowercase()
}
