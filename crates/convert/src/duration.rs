use std::time::Duration;

use crate::Error;

/// Units accepted in a compound duration, longest first so that `ms` is not
/// read as `m`.
const UNITS: [&str; 7] = ["ms", "us", "µs", "ns", "h", "m", "s"];

/// Parses a compound duration such as `"1h2m3s"`, `"2m"` or `"500ms"`.
///
/// Every component is an unsigned integer followed by one of `h`, `m`, `s`,
/// `ms`, `us` (or `µs`) and `ns`, with nothing in between. A bare `"0"` is
/// accepted as zero.
///
/// # Errors
///
/// Returns [`Error::InvalidDuration`] for empty or signed input, whitespace,
/// and units outside the grammar such as days, months or years.
pub fn parse_duration(value: &str) -> Result<Duration, Error> {
    if value.is_empty() {
        return Err(invalid(value, "empty duration"));
    }

    if value == "0" {
        return Ok(Duration::ZERO);
    }

    if value.starts_with(['-', '+']) {
        return Err(invalid(value, "durations must not be signed"));
    }

    check_grammar(value)?;

    humantime::parse_duration(&value.replace('µ', "u"))
        .map_err(|e| invalid(value, &e.to_string()))
}

fn check_grammar(value: &str) -> Result<(), Error> {
    let mut rest = value;

    while !rest.is_empty() {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return Err(invalid(value, "expected a number"));
        }
        rest = &rest[digits..];

        let unit = UNITS
            .iter()
            .find(|unit| rest.starts_with(*unit))
            .ok_or_else(|| invalid(value, "expected one of h, m, s, ms, us, ns"))?;
        rest = &rest[unit.len()..];

        if rest.starts_with(|c: char| c.is_alphabetic()) {
            return Err(invalid(value, "expected one of h, m, s, ms, us, ns"));
        }
    }

    Ok(())
}

/// Like [`parse_duration`], but an empty string means "not set".
///
/// # Errors
///
/// Returns [`Error::InvalidDuration`] for non-empty, unparsable input.
pub fn parse_optional_duration(value: &str) -> Result<Option<Duration>, Error> {
    if value.trim().is_empty() {
        return Ok(None);
    }

    parse_duration(value).map(Some)
}

/// Renders a duration in the canonical form accepted by [`parse_duration`].
///
/// Hours are the largest unit, zero components are left out and zero itself
/// renders as `"0s"`: 25 hours is `"25h"`, 90 seconds `"1m30s"`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();

    let components = [
        (secs / 3600, "h"),
        (secs / 60 % 60, "m"),
        (secs % 60, "s"),
        (u64::from(nanos / 1_000_000), "ms"),
        (u64::from(nanos / 1_000 % 1_000), "us"),
        (u64::from(nanos % 1_000), "ns"),
    ];

    components
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{amount}{unit}"))
        .collect()
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    #[test]
    fn test_compound() {
        assert_eq!(parse_duration("1h2m3s").unwrap(), Duration::from_secs(3723));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(
            parse_duration("500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(
            parse_duration("1s500ms250us7ns").unwrap(),
            Duration::new(1, 500_250_007)
        );
        assert_eq!(parse_duration("3µs").unwrap(), Duration::from_micros(3));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_matches!(parse_duration(""), Err(Error::InvalidDuration { .. }));
        assert_matches!(parse_duration("abc"), Err(Error::InvalidDuration { .. }));
        assert_matches!(parse_duration("10"), Err(Error::InvalidDuration { .. }));
        assert_matches!(parse_duration("-5m"), Err(Error::InvalidDuration { .. }));
    }

    #[test]
    fn test_rejects_units_outside_grammar() {
        for input in ["1d", "1M", "1y", "2w", "1h 2m", " 1h", "1h ", "5 minutes", "1.5h", "1hour"] {
            assert_matches!(
                parse_duration(input),
                Err(Error::InvalidDuration { .. }),
                "{input}"
            );
        }
    }

    #[test]
    fn test_format_uses_hours_at_most() {
        assert_eq!(format_duration(Duration::from_secs(25 * 3600)), "25h");
        assert_eq!(format_duration(Duration::from_secs(3_000_000)), "833h20m");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1s500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn test_optional() {
        assert_eq!(parse_optional_duration("").unwrap(), None);
        assert_eq!(
            parse_optional_duration("1m").unwrap(),
            Some(Duration::from_secs(60))
        );
        assert_matches!(
            parse_optional_duration("soon"),
            Err(Error::InvalidDuration { .. })
        );
    }

    #[test]
    fn test_format_reparses_to_same_value() {
        for input in ["1h2m3s", "2m", "30s", "500ms", "0", "90s", "25h", "1h0m5s", "1ms2us3ns"] {
            let parsed = parse_duration(input).unwrap();
            let formatted = format_duration(parsed);

            assert_eq!(parse_duration(&formatted).unwrap(), parsed, "{input}");
            assert_eq!(format_duration(parse_duration(&formatted).unwrap()), formatted);
        }
    }
}
