//! Conditional `GET` handling for Actix Web.
//!
//! Implements the `If-Modified-Since` half of [RFC 7232] conditional requests:
//! a resource's modification time is compared against the date supplied by the
//! client and the response is either short-circuited with `304 Not Modified`
//! or served in full with a `Last-Modified` validator attached.
//!
//! Two integration points are provided:
//!
//! - [`Conditional`], a wrapping [`Responder`](actix_web::Responder) for
//!   handlers that know their resource's modification time;
//! - [`ConditionalGet`], a middleware that rewrites any `200 OK` response
//!   carrying a `Last-Modified` header to `304` when the client's copy is
//!   current.
//!
//! # Examples
//! ```
//! use std::time::{Duration, SystemTime};
//!
//! use actix_web::{get, App, Responder};
//! use actix_conditional::Conditional;
//!
//! #[get("/")]
//! async fn index() -> actix_web::Result<impl Responder> {
//!     let rendered = "<h1>hello</h1>";
//!     let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
//!     Ok(Conditional::new(rendered, modified)?)
//! }
//!
//! let app = App::new().service(index);
//! ```
//!
//! [RFC 7232]: https://datatracker.ietf.org/doc/html/rfc7232

#![deny(rust_2018_idioms)]
#![warn(missing_docs, missing_debug_implementations)]

mod condition;
mod error;
mod middleware;
mod responder;
mod timestamp;

pub use crate::condition::{evaluate, Decision};
pub use crate::error::TimestampError;
pub use crate::middleware::ConditionalGet;
pub use crate::responder::Conditional;
pub use crate::timestamp::{is_valid_unix_timestamp, parse_unix_timestamp};
