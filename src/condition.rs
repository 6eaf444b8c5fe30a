use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{
    http::header::{self, HttpDate, LastModified},
    HttpMessage,
};

/// Outcome of validating a conditional `GET` against a resource's
/// modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The client's copy is current. Respond `304 Not Modified` with an
    /// empty body.
    NotModified,

    /// The resource has changed, or the request was unconditional. Serve the
    /// full response and attach this `Last-Modified` validator.
    Modified(LastModified),
}

/// Validates a conditional `GET`.
///
/// Compares the client-supplied `If-Modified-Since` date (if any) against the
/// resource's modification time and decides whether the response can be
/// short-circuited.
///
/// # Examples
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use actix_web::http::header::HttpDate;
/// use actix_conditional::{evaluate, Decision};
///
/// let modified = HttpDate::from(SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777));
///
/// assert_eq!(evaluate(Some(modified), modified), Decision::NotModified);
/// assert!(matches!(evaluate(None, modified), Decision::Modified(_)));
/// ```
pub fn evaluate(since: Option<HttpDate>, last_modified: HttpDate) -> Decision {
    match since {
        Some(since) if not_modified(last_modified, since) => Decision::NotModified,
        _ => Decision::Modified(LastModified(last_modified)),
    }
}

/// Returns true if the resource has not been modified after `since`.
///
/// HTTP-dates carry second resolution, so the comparison is made on whole
/// seconds since the epoch. Pre-epoch modification times never validate.
pub(crate) fn not_modified(last_modified: HttpDate, since: HttpDate) -> bool {
    let t1: SystemTime = last_modified.into();
    let t2: SystemTime = since.into();

    match (t1.duration_since(UNIX_EPOCH), t2.duration_since(UNIX_EPOCH)) {
        (Ok(t1), Ok(t2)) => t1.as_secs() <= t2.as_secs(),
        _ => false,
    }
}

/// Extracts the request's `If-Modified-Since` date.
///
/// Returns `None` when the header is absent or unparseable, and when an
/// `If-None-Match` header is present, which takes precedence over
/// `If-Modified-Since`.
pub(crate) fn if_modified_since(msg: &impl HttpMessage) -> Option<HttpDate> {
    if msg.headers().contains_key(header::IF_NONE_MATCH) {
        return None;
    }

    msg.get_header::<header::IfModifiedSince>()
        .map(|header::IfModifiedSince(since)| since)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::test::TestRequest;

    use super::*;

    fn date(secs: u64) -> HttpDate {
        HttpDate::from(UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn unconditional_request_serves_full_response() {
        assert_eq!(
            evaluate(None, date(784_111_777)),
            Decision::Modified(LastModified(date(784_111_777)))
        );
    }

    #[test]
    fn stale_copy_serves_full_response() {
        assert_eq!(
            evaluate(Some(date(784_111_776)), date(784_111_777)),
            Decision::Modified(LastModified(date(784_111_777)))
        );
    }

    #[test]
    fn current_copy_is_not_modified() {
        assert_eq!(
            evaluate(Some(date(784_111_777)), date(784_111_777)),
            Decision::NotModified
        );
        assert_eq!(
            evaluate(Some(date(784_111_778)), date(784_111_777)),
            Decision::NotModified
        );
    }

    #[test]
    fn extracts_if_modified_since() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(784_111_777)))
            .to_http_request();

        assert_eq!(if_modified_since(&req), Some(date(784_111_777)));
    }

    #[test]
    fn malformed_header_reads_as_absent() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, "not a date"))
            .to_http_request();

        assert_eq!(if_modified_since(&req), None);
    }

    #[test]
    fn if_none_match_takes_precedence() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(784_111_777)))
            .insert_header((header::IF_NONE_MATCH, "\"xyzzy\""))
            .to_http_request();

        assert_eq!(if_modified_since(&req), None);
    }
}
