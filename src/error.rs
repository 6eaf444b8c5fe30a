use actix_web::{http::StatusCode, ResponseError};
use derive_more::{Display, Error};

/// Errors which can occur when validating a resource timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum TimestampError {
    /// No timestamp was supplied.
    #[display("missing timestamp")]
    Empty,

    /// The value contained something other than base-10 digits.
    #[display("timestamp is not a base-10 digit string")]
    NotNumeric,

    /// The value does not survive a calendar-date re-encoding.
    #[display("timestamp is outside the representable HTTP-date range")]
    OutOfRange,
}

/// Return `InternalServerError` for `TimestampError`; a resource with an
/// invalid modification time is a server-side defect.
impl ResponseError for TimestampError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
