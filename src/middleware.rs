//! For middleware documentation, see [`ConditionalGet`].

use std::{
    fmt,
    future::Future,
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

use actix_utils::future::{ready, Ready};
use actix_web::{
    body::{self, EitherBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{self, HttpDate},
        Method, StatusCode,
    },
    Error,
};
use futures_core::ready;
use pin_project_lite::pin_project;

use crate::condition;

/// Middleware for answering conditional `GET` requests on behalf of handlers.
///
/// When a `GET` or `HEAD` request carries an `If-Modified-Since` date and the
/// inner service produces a `200 OK` response with a `Last-Modified` header at
/// or before that date, the response is rewritten to `304 Not Modified` and
/// its payload is dropped. Response headers, the validator included, are kept.
///
/// Responses without a `Last-Modified` header, non-`200` responses, and
/// requests carrying `If-None-Match` pass through untouched.
///
/// # Examples
/// ```
/// use actix_web::{http::header, middleware, web, App, HttpResponse};
/// use actix_conditional::ConditionalGet;
///
/// let app = App::new()
///     .wrap(ConditionalGet::default())
///     .route("/", web::get().to(|| async {
///         HttpResponse::Ok()
///             .insert_header((header::LAST_MODIFIED, "Sun, 06 Nov 1994 08:49:37 GMT"))
///             .body("hello world")
///     }));
/// ```
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ConditionalGet;

impl<S, B> Transform<S, ServiceRequest> for ConditionalGet
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ConditionalGetMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ConditionalGetMiddleware { service }))
    }
}

/// Middleware service for [`ConditionalGet`].
pub struct ConditionalGetMiddleware<S> {
    service: S,
}

impl<S> fmt::Debug for ConditionalGetMiddleware<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConditionalGetMiddleware")
    }
}

impl<S, B> Service<ServiceRequest> for ConditionalGetMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = ConditionalGetFuture<S, B>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // conditional evaluation only applies to GET and HEAD
        let since = match *req.method() {
            Method::GET | Method::HEAD => condition::if_modified_since(&req),
            _ => None,
        };

        ConditionalGetFuture {
            fut: self.service.call(req),
            since,
            _body: PhantomData,
        }
    }
}

pin_project! {
    /// Response future for [`ConditionalGet`].
    pub struct ConditionalGetFuture<S, B>
    where
        S: Service<ServiceRequest>,
    {
        #[pin]
        fut: S::Future,
        since: Option<HttpDate>,
        _body: PhantomData<B>,
    }
}

impl<S, B> fmt::Debug for ConditionalGetFuture<S, B>
where
    S: Service<ServiceRequest>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConditionalGetFuture")
    }
}

impl<S, B> Future for ConditionalGetFuture<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    type Output = Result<ServiceResponse<EitherBody<B>>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let res = ready!(this.fut.poll(cx))?;

        let since = match this.since {
            Some(since) => *since,
            None => return Poll::Ready(Ok(res.map_into_left_body())),
        };

        // only a would-be 200 may be downgraded to a 304
        if res.status() != StatusCode::OK {
            return Poll::Ready(Ok(res.map_into_left_body()));
        }

        let last_modified = res
            .headers()
            .get(header::LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<HttpDate>().ok());

        match last_modified {
            Some(last_modified) if condition::not_modified(last_modified, since) => {
                log::trace!("response not modified since {}; rewriting to 304", since);

                let res = res
                    .map_body(|head, _| {
                        head.status = StatusCode::NOT_MODIFIED;
                        body::None::new()
                    })
                    .map_into_boxed_body()
                    .map_into_right_body();

                Poll::Ready(Ok(res))
            }

            _ => Poll::Ready(Ok(res.map_into_left_body())),
        }
    }
}
