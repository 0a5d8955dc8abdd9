//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `created_at`, `updated_at`, `executed_at`, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an RFC 3339 string (as written by [`DateTime::to_rfc3339`]) into a
/// UTC [`Timestamp`].
///
/// # Errors
///
/// Returns the underlying [`chrono::ParseError`] when `value` is not RFC 3339.
pub fn parse_rfc3339(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.to_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_parse_what_to_rfc3339_writes() {
        let ts = now();
        let parsed = parse_rfc3339(&ts.to_rfc3339()).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn should_normalize_offsets_to_utc() {
        let parsed = parse_rfc3339("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T08:00:00+00:00");
    }

    #[test]
    fn should_reject_non_rfc3339_input() {
        assert!(parse_rfc3339("yesterday").is_err());
    }
}
