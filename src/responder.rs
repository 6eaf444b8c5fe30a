use std::time::SystemTime;

use actix_web::{
    body::{self, EitherBody},
    http::{
        header::{self, HttpDate, TryIntoHeaderValue as _},
        StatusCode,
    },
    HttpRequest, HttpResponse, Responder,
};

use crate::{
    condition::{self, Decision},
    error::TimestampError,
    timestamp,
};

/// A responder with an associated modification time.
///
/// Wraps any [`Responder`] and makes it conditional: when the request carries
/// an `If-Modified-Since` date at or past the modification time, the inner
/// responder is skipped and an empty `304 Not Modified` response is sent
/// instead. Full responses are served with a `Last-Modified` header attached.
///
/// An `If-None-Match` request header suppresses `If-Modified-Since`
/// evaluation; no entity tag comparison is performed.
///
/// # Examples
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use actix_web::{get, Responder};
/// use actix_conditional::Conditional;
///
/// #[get("/report")]
/// async fn report() -> actix_web::Result<impl Responder> {
///     let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
///     Ok(Conditional::new("cached content", modified)?)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Conditional<R> {
    responder: R,
    modified: HttpDate,
    send_last_modified: bool,
}

impl<R> Conditional<R> {
    /// Wraps `responder` with the time the underlying resource was last
    /// modified.
    ///
    /// # Errors
    /// Returns an error when `modified` is before the Unix epoch or past the
    /// HTTP-date range.
    pub fn new(responder: R, modified: SystemTime) -> Result<Self, TimestampError> {
        Ok(Conditional {
            responder,
            modified: timestamp::from_system_time(modified)?,
            send_last_modified: true,
        })
    }

    /// Wraps `responder` with a modification time given as a decimal Unix
    /// timestamp string.
    ///
    /// # Errors
    /// Returns an error when `value` is empty, contains non-digit characters,
    /// or does not survive a calendar-date re-encoding.
    pub fn from_unix(responder: R, value: &str) -> Result<Self, TimestampError> {
        Ok(Conditional {
            responder,
            modified: timestamp::parse_unix_timestamp(value)?,
            send_last_modified: true,
        })
    }

    /// Specifies whether to add a `Last-Modified` header to responses.
    ///
    /// Default is true. Disabling it also disables `If-Modified-Since`
    /// evaluation, since clients can no longer hold a validator to replay.
    #[inline]
    pub fn use_last_modified(mut self, value: bool) -> Self {
        self.send_last_modified = value;
        self
    }

    /// Returns the modification time advertised to clients.
    #[inline]
    pub fn last_modified(&self) -> HttpDate {
        self.modified
    }
}

impl<R: Responder> Responder for Conditional<R> {
    type Body = EitherBody<R::Body>;

    fn respond_to(self, req: &HttpRequest) -> HttpResponse<Self::Body> {
        let since = if self.send_last_modified {
            condition::if_modified_since(req)
        } else {
            None
        };

        match condition::evaluate(since, self.modified) {
            Decision::NotModified => {
                let mut res = HttpResponse::build(StatusCode::NOT_MODIFIED);

                res.insert_header(header::LastModified(self.modified));

                res.body(body::None::new()).map_into_right_body()
            }

            Decision::Modified(last_modified) => {
                let mut res = self.responder.respond_to(req);

                if self.send_last_modified {
                    // unwrap: HTTP-date output is known to be well formed
                    let value = last_modified.try_into_value().unwrap();
                    res.headers_mut().insert(header::LAST_MODIFIED, value);
                }

                res.map_into_left_body()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{
        body::to_bytes,
        test::TestRequest,
        web::Bytes,
    };

    use super::*;

    const MTIME_SECS: u64 = 784_111_777;

    fn mtime() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(MTIME_SECS)
    }

    fn date(secs: u64) -> HttpDate {
        HttpDate::from(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[actix_rt::test]
    async fn serves_full_response_when_unconditional() {
        let req = TestRequest::default().to_http_request();
        let res = Conditional::new("body", mtime()).unwrap().respond_to(&req);

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::LAST_MODIFIED).unwrap(),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );

        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(body, Bytes::from_static(b"body"));
    }

    #[actix_rt::test]
    async fn serves_full_response_to_stale_copy() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(MTIME_SECS - 1)))
            .to_http_request();
        let res = Conditional::new("body", mtime()).unwrap().respond_to(&req);

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn short_circuits_current_copy() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(MTIME_SECS)))
            .to_http_request();
        let res = Conditional::new("body", mtime()).unwrap().respond_to(&req);

        assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
        assert!(res.headers().contains_key(header::LAST_MODIFIED));

        let body = to_bytes(res.into_body()).await.unwrap();
        assert!(body.is_empty());
    }

    #[actix_rt::test]
    async fn sub_second_mtime_drift_still_validates() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(MTIME_SECS)))
            .to_http_request();

        let drifted = SystemTime::UNIX_EPOCH + Duration::new(MTIME_SECS, 500_000_000);
        let res = Conditional::new("body", drifted).unwrap().respond_to(&req);

        assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    }

    #[actix_rt::test]
    async fn if_none_match_disables_evaluation() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(MTIME_SECS)))
            .insert_header((header::IF_NONE_MATCH, "\"xyzzy\""))
            .to_http_request();
        let res = Conditional::new("body", mtime()).unwrap().respond_to(&req);

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn malformed_header_serves_full_response() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, "yesterday-ish"))
            .to_http_request();
        let res = Conditional::new("body", mtime()).unwrap().respond_to(&req);

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn disabling_last_modified_disables_validation() {
        let req = TestRequest::default()
            .insert_header((header::IF_MODIFIED_SINCE, date(MTIME_SECS)))
            .to_http_request();
        let res = Conditional::new("body", mtime())
            .unwrap()
            .use_last_modified(false)
            .respond_to(&req);

        assert_eq!(res.status(), StatusCode::OK);
        assert!(!res.headers().contains_key(header::LAST_MODIFIED));
    }

    #[test]
    fn constructor_guards_timestamps() {
        assert_eq!(
            Conditional::new("body", SystemTime::UNIX_EPOCH - Duration::from_secs(60)).unwrap_err(),
            TimestampError::OutOfRange
        );
        assert_eq!(
            Conditional::from_unix("body", "").unwrap_err(),
            TimestampError::Empty
        );
        assert_eq!(
            Conditional::from_unix("body", "soon").unwrap_err(),
            TimestampError::NotNumeric
        );
    }

    #[test]
    fn from_unix_matches_system_time_constructor() {
        let a = Conditional::from_unix("body", "784111777").unwrap();
        let b = Conditional::new("body", mtime()).unwrap();

        assert_eq!(a.last_modified(), b.last_modified());
    }
}
