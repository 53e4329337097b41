//! Thread permalink resolution.
//!
//! A Slack thread permalink embeds the channel and the thread's root
//! timestamp as one compact digit token:
//! `https://<team>.slack.com/archives/<CHANNEL>/p<seconds><microseconds>`.
//! The API wants the timestamp back in `seconds.microseconds` form, with the
//! microsecond part always six digits.

use regex::Regex;
use thiserror::Error;
use url::Url;

static THREAD_PATH: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    // Channel token, then `p` + the compact digit timestamp. Anchored so a
    // trailing non-digit or extra path segment fails instead of matching a
    // digit prefix.
    Regex::new(r"^/archives/([A-Z0-9]+)/p([0-9]+)/?$").unwrap()
});

/// Microsecond digits carried at the end of the compact timestamp token.
const MICROS_DIGITS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidUrlError {
    #[error("not a Slack thread permalink: {0}")]
    Shape(String),
    #[error("timestamp token '{0}' is too short to carry a microsecond suffix")]
    ShortTimestamp(String),
}

/// Identifies one thread: where it lives and which message roots it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadIdentifier {
    /// Uppercase alphanumeric channel token from the permalink.
    pub channel_id: String,
    /// API-form root timestamp, `seconds.microseconds`.
    pub thread_timestamp: String,
    /// The raw digit token, used to name the bundle directory and archive.
    pub thread_id: String,
}

/// Resolve a thread permalink into its [`ThreadIdentifier`].
///
/// Pure string work, no I/O. Query strings (`?thread_ts=…&cid=…`) and
/// fragments are ignored since they are not part of the path.
///
/// # Errors
///
/// Returns [`InvalidUrlError`] when the URL is not a `slack.com` permalink of
/// the expected shape, or when the digit token is too short to split into
/// seconds and microseconds.
pub fn parse_thread_url(url: &str) -> Result<ThreadIdentifier, InvalidUrlError> {
    let parsed = Url::parse(url).map_err(|_| InvalidUrlError::Shape(url.to_string()))?;

    let host_ok = parsed
        .host_str()
        .is_some_and(|host| host == "slack.com" || host.ends_with(".slack.com"));
    if !host_ok {
        return Err(InvalidUrlError::Shape(url.to_string()));
    }

    let captures = THREAD_PATH
        .captures(parsed.path())
        .ok_or_else(|| InvalidUrlError::Shape(url.to_string()))?;

    let channel_id = captures[1].to_string();
    let raw_timestamp = &captures[2];

    if raw_timestamp.len() <= MICROS_DIGITS {
        return Err(InvalidUrlError::ShortTimestamp(raw_timestamp.to_string()));
    }

    let (seconds, micros) = raw_timestamp.split_at(raw_timestamp.len() - MICROS_DIGITS);

    Ok(ThreadIdentifier {
        channel_id,
        thread_timestamp: format!("{seconds}.{micros}"),
        thread_id: raw_timestamp.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_permalink() {
        let thread = parse_thread_url("https://x.slack.com/archives/C123ABC/p1741754154975769")
            .expect("Should parse a standard permalink");

        assert_eq!(thread.channel_id, "C123ABC");
        assert_eq!(thread.thread_timestamp, "1741754154.975769");
        assert_eq!(thread.thread_id, "1741754154975769");
    }

    #[test]
    fn test_parse_tolerates_query_and_trailing_slash() {
        let thread = parse_thread_url(
            "https://myteam.slack.com/archives/C0XYZ9/p1700000000123456/?thread_ts=1700000000.123456&cid=C0XYZ9",
        )
        .expect("Should parse a permalink with query parameters");

        assert_eq!(thread.channel_id, "C0XYZ9");
        assert_eq!(thread.thread_timestamp, "1700000000.123456");
    }

    #[test]
    fn test_parse_bare_slack_host() {
        let thread = parse_thread_url("https://slack.com/archives/C1/p1234567890123456")
            .expect("Should accept the bare slack.com host");

        assert_eq!(thread.channel_id, "C1");
    }

    #[test]
    fn test_timestamp_matches_invariant_shape() {
        let thread = parse_thread_url("https://a.slack.com/archives/C42/p7654321")
            .expect("Should parse a seven digit token");

        // One digit of seconds, six of microseconds
        assert_eq!(thread.thread_timestamp, "7.654321");
    }

    #[test]
    fn test_reject_wrong_domain() {
        let err = parse_thread_url("https://slack.example.com/archives/C123ABC/p1741754154975769")
            .expect_err("Should reject a non-slack.com host");
        assert!(matches!(err, InvalidUrlError::Shape(_)));
    }

    #[test]
    fn test_reject_missing_archives_segment() {
        let err = parse_thread_url("https://x.slack.com/messages/C123ABC/p1741754154975769")
            .expect_err("Should reject a non-archives path");
        assert!(matches!(err, InvalidUrlError::Shape(_)));
    }

    #[test]
    fn test_reject_non_digit_timestamp() {
        let err = parse_thread_url("https://x.slack.com/archives/C123ABC/p17417abc54975769")
            .expect_err("Should reject a timestamp with letters in it");
        assert!(matches!(err, InvalidUrlError::Shape(_)));
    }

    #[test]
    fn test_reject_lowercase_channel() {
        let err = parse_thread_url("https://x.slack.com/archives/c123abc/p1741754154975769")
            .expect_err("Should reject a lowercase channel token");
        assert!(matches!(err, InvalidUrlError::Shape(_)));
    }

    #[test]
    fn test_reject_short_timestamp_token() {
        let err = parse_thread_url("https://x.slack.com/archives/C123ABC/p123456")
            .expect_err("Should reject a six digit token");
        assert_eq!(err, InvalidUrlError::ShortTimestamp("123456".to_string()));
    }

    #[test]
    fn test_reject_not_a_url() {
        assert!(parse_thread_url("C123ABC/p1741754154975769").is_err());
        assert!(parse_thread_url("").is_err());
    }
}
