//! Display formatting for timers, variables and counts.
//!
//! Every string that ends up substituted into an overlay graphic goes
//! through this module.

use crate::action::TimerFormat;

/// Format a timer value given in seconds.
///
/// Negative values clamp to zero; non-finite values render as `"0"`.
///
/// # Examples
/// ```
/// use vta_core::action::TimerFormat;
/// use vta_core::format::format_timer;
/// assert_eq!(format_timer(5.0, TimerFormat::S), "5");
/// assert_eq!(format_timer(5.0, TimerFormat::Ms), "00:05");
/// assert_eq!(format_timer(65.0, TimerFormat::Ms), "01:05");
/// assert_eq!(format_timer(754.0, TimerFormat::Ms), "12:34");
/// ```
pub fn format_timer(seconds: f64, format: TimerFormat) -> String {
    if !seconds.is_finite() {
        return "0".to_string();
    }
    let seconds = if seconds < 0.0 { 0.0 } else { seconds };
    let secs = (seconds % 60.0).floor() as u64;
    let mins = (seconds / 60.0).floor() as u64;

    match format {
        TimerFormat::Ms => {
            let prefix = match mins {
                0 => "00:".to_string(),
                1..=9 => format!("0{}:", mins),
                _ => format!("{}:", mins),
            };
            format!("{}{:02}", prefix, secs)
        }
        TimerFormat::S => (mins * 60 + secs).to_string(),
    }
}

/// Format a numeric variable.
///
/// With a positive precision the value is rounded half up and printed with
/// exactly that many decimals; otherwise it is printed plainly.
///
/// # Examples
/// ```
/// use vta_core::format::format_variable;
/// assert_eq!(format_variable(8.0, 0), "8");
/// assert_eq!(format_variable(2.5, 0), "2.5");
/// assert_eq!(format_variable(3.14159, 2), "3.14");
/// assert_eq!(format_variable(1.0, 3), "1.000");
/// ```
pub fn format_variable(value: f64, precision: u32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if precision == 0 {
        return plain(value);
    }

    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor + 0.5).floor() / factor;
    if rounded.is_finite() {
        format!("{:.*}", precision as usize, rounded)
    } else {
        format!("{:.*}", precision as usize, value)
    }
}

/// Format a count compactly, e.g. a viewer total.
///
/// # Examples
/// ```
/// use vta_core::format::format_count;
/// assert_eq!(format_count(999.0), "999");
/// assert_eq!(format_count(1_500.0), "1.5K");
/// assert_eq!(format_count(2_000_000.0), "2M");
/// ```
pub fn format_count(n: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    for (scale, suffix) in UNITS {
        if n >= scale {
            return format!("{}{}", plain(round_to_tenth(n / scale)), suffix);
        }
    }
    plain(n)
}

fn round_to_tenth(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

/// Shortest round-trip rendering; `-0` prints as `0`
fn plain(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_minutes_padding() {
        assert_eq!(format_timer(0.0, TimerFormat::Ms), "00:00");
        assert_eq!(format_timer(59.9, TimerFormat::Ms), "00:59");
        assert_eq!(format_timer(600.0, TimerFormat::Ms), "10:00");
        assert_eq!(format_timer(5999.0, TimerFormat::Ms), "99:59");
    }

    #[test]
    fn test_timer_seconds_format_truncates() {
        assert_eq!(format_timer(5.7, TimerFormat::S), "5");
        assert_eq!(format_timer(125.0, TimerFormat::S), "125");
    }

    #[test]
    fn test_timer_degenerate_values() {
        assert_eq!(format_timer(f64::NAN, TimerFormat::Ms), "0");
        assert_eq!(format_timer(f64::INFINITY, TimerFormat::S), "0");
        assert_eq!(format_timer(-3.0, TimerFormat::S), "0");
        assert_eq!(format_timer(-3.0, TimerFormat::Ms), "00:00");
    }

    #[test]
    fn test_variable_rounding_half_up() {
        assert_eq!(format_variable(2.345, 1), "2.3");
        assert_eq!(format_variable(2.25, 1), "2.3");
        assert_eq!(format_variable(-2.5, 0), "-2.5");
        assert_eq!(format_variable(-0.0, 0), "0");
        assert_eq!(format_variable(f64::NAN, 2), "0");
    }

    #[test]
    fn test_count_suffixes() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(1_000.0), "1K");
        assert_eq!(format_count(12_340.0), "12.3K");
        assert_eq!(format_count(1_250_000_000.0), "1.3B");
        assert_eq!(format_count(4e12), "4T");
    }
}
