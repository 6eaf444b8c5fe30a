use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::http::header::HttpDate;

use crate::error::TimestampError;

/// Latest instant formattable as an HTTP-date: 9999-12-31T23:59:59Z.
const MAX_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// Checks whether `value` is a valid Unix timestamp in decimal string form.
///
/// Valid means non-empty, base-10 digits only (no sign, no whitespace), and
/// an instant that survives a calendar-date re-encoding, i.e. one
/// representable as an HTTP-date.
///
/// # Examples
/// ```
/// use actix_conditional::is_valid_unix_timestamp;
///
/// assert!(is_valid_unix_timestamp("784111777"));
///
/// assert!(!is_valid_unix_timestamp(""));
/// assert!(!is_valid_unix_timestamp("-1"));
/// assert!(!is_valid_unix_timestamp("99999999999999"));
/// ```
pub fn is_valid_unix_timestamp(value: &str) -> bool {
    parse_unix_timestamp(value).is_ok()
}

/// Parses a decimal-string Unix timestamp into an [`HttpDate`].
///
/// See [`is_valid_unix_timestamp`] for what is accepted; the error describes
/// which check failed.
pub fn parse_unix_timestamp(value: &str) -> Result<HttpDate, TimestampError> {
    if value.is_empty() {
        return Err(TimestampError::Empty);
    }

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::NotNumeric);
    }

    // digit strings wider than u64 cannot name a representable instant
    let secs = value
        .parse::<u64>()
        .map_err(|_| TimestampError::OutOfRange)?;

    from_secs(secs)
}

/// Re-encodes `secs` through a calendar date and back, rejecting values that
/// do not round-trip.
pub(crate) fn from_secs(secs: u64) -> Result<HttpDate, TimestampError> {
    // guard: httpdate formatting is only defined up to year 9999
    if secs > MAX_HTTP_DATE_SECS {
        return Err(TimestampError::OutOfRange);
    }

    let time = UNIX_EPOCH + Duration::from_secs(secs);

    match httpdate::parse_http_date(&httpdate::fmt_http_date(time)) {
        Ok(decoded) if decoded == time => Ok(HttpDate::from(time)),
        _ => Err(TimestampError::OutOfRange),
    }
}

/// Validates a [`SystemTime`], truncating it to whole seconds.
pub(crate) fn from_system_time(time: SystemTime) -> Result<HttpDate, TimestampError> {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TimestampError::OutOfRange)?
        .as_secs();

    from_secs(secs)
}
