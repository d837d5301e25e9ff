//! Webhook timestamp freshness checks.

/// Default tolerance window, in seconds.
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300; // 5 minutes

/// Checks a webhook timestamp header against the tolerance window.
///
/// An absent header is accepted: replay protection is only enforced when the
/// sender supplies a timestamp. Tightening this would break senders that
/// omit the header. An unparsable header is rejected. The boundary value
/// (skew exactly equal to the tolerance) is accepted.
pub fn check_freshness(header: Option<&str>, tolerance_seconds: i64) -> bool {
    check_freshness_at(header, tolerance_seconds, chrono::Utc::now().timestamp())
}

/// Same as [`check_freshness`], with an explicit `now` (Unix seconds).
pub fn check_freshness_at(header: Option<&str>, tolerance_seconds: i64, now: i64) -> bool {
    match header {
        None => true,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(timestamp) => (now - timestamp).abs() <= tolerance_seconds,
            Err(_) => false,
        },
    }
}
