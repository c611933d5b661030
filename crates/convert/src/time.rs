use chrono::{DateTime, SecondsFormat, Utc};

use crate::Error;

/// Numeric-offset ISO 8601 form without the RFC3339 colon, e.g. `+0000`.
const ISO8601_COMPACT_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parses an RFC3339 timestamp (`2006-01-02T15:04:05Z07:00`), falling back
/// to the ISO 8601 form with a compact numeric offset.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] for anything else, including RFC
/// 822/1123/2822 dates, timestamps without an offset and the space or
/// lowercase separators RFC3339 otherwise tolerates.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    if value.as_bytes().get(10) != Some(&b'T') || value.contains('z') {
        return Err(Error::InvalidTimestamp {
            value: value.to_string(),
        });
    }

    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, ISO8601_COMPACT_OFFSET))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| Error::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Like [`parse_timestamp`], but an empty string means "not set".
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] for non-empty, unparsable input.
pub fn parse_optional_timestamp(value: &str) -> Result<Option<DateTime<Utc>>, Error> {
    if value.trim().is_empty() {
        return Ok(None);
    }

    parse_timestamp(value).map(Some)
}

/// Renders a timestamp as RFC3339 in UTC with a `Z` suffix. Fractional
/// seconds are only written when present.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339_and_offset_forms_agree() {
        let zulu = parse_timestamp("2023-01-09T14:48:32Z").unwrap();
        let offset = parse_timestamp("2023-01-09T14:48:32+00:00").unwrap();
        let compact = parse_timestamp("2023-01-09T14:48:32+0000").unwrap();

        assert_eq!(zulu.timestamp(), 1_673_275_712);
        assert_eq!(zulu, offset);
        assert_eq!(zulu, compact);
        assert_eq!(format_timestamp(&offset), "2023-01-09T14:48:32Z");
    }

    #[test]
    fn test_non_utc_offset_is_normalized() {
        let parsed = parse_timestamp("2023-01-09T16:48:32+02:00").unwrap();

        assert_eq!(parsed.timestamp(), 1_673_275_712);
        assert_eq!(format_timestamp(&parsed), "2023-01-09T14:48:32Z");
    }

    #[test]
    fn test_rejects_other_formats() {
        for input in [
            "01/09/2023 @ 2:48pm",
            "Mon, 09 Jan 2023 14:48:32 +0000",
            "Monday, 09-Jan-23 14:48:32 UTC",
            "2023-01-09T14:48:32",
            "2023-01-09 14:48:32Z",
            "2023-01-09t14:48:32z",
            "2023-01-09T14:48:32z",
            "",
        ] {
            assert_matches!(
                parse_timestamp(input),
                Err(Error::InvalidTimestamp { .. }),
                "{input}"
            );
        }
    }

    #[test]
    fn test_round_trip() {
        let instants = [
            Utc.timestamp_opt(1_673_275_712, 0).unwrap(),
            Utc.timestamp_opt(0, 0).unwrap(),
            Utc.timestamp_opt(1_673_275_712, 123_456_789).unwrap(),
            Utc.timestamp_opt(4_102_444_800, 500_000_000).unwrap(),
        ];

        for instant in instants {
            assert_eq!(parse_timestamp(&format_timestamp(&instant)).unwrap(), instant);
        }
    }

    #[test]
    fn test_optional() {
        assert_eq!(parse_optional_timestamp("").unwrap(), None);
        assert!(parse_optional_timestamp("2023-01-09T14:48:32Z").unwrap().is_some());
        assert_matches!(
            parse_optional_timestamp("yesterday"),
            Err(Error::InvalidTimestamp { .. })
        );
    }
}
