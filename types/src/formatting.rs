//! Number formatting for player-facing messages.
//!
//! All satiety values shown to players go through this module so the
//! European-style separator setting applies everywhere.

/// Swap `.` and `,` in a formatted number.
fn europeanize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a number of seconds with one decimal place.
///
/// # Examples
/// ```
/// use epicurean_types::formatting::format_seconds;
/// assert_eq!(format_seconds(15.0, false), "15.0");
/// assert_eq!(format_seconds(7.5, true), "7,5");
/// ```
pub fn format_seconds(secs: f64, european: bool) -> String {
    maybe_eu(format!("{:.1}", secs), european)
}

/// Format a decimal number with the specified precision.
///
/// # Examples
/// ```
/// use epicurean_types::formatting::format_decimal;
/// assert_eq!(format_decimal(1000.0, 0, false), "1000");
/// assert_eq!(format_decimal(1.234, 3, true), "1,234");
/// ```
pub fn format_decimal(n: f64, precision: usize, european: bool) -> String {
    maybe_eu(format!("{:.prec$}", n, prec = precision), european)
}
