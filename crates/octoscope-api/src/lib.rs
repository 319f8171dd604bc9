//! # octoscope-api
//!
//! Request plumbing for the GitHub v3 API: an authenticated [`Connection`],
//! `Link` header pagination, and [`RawRecord`], a lazy view over the JSON
//! objects the API returns.
//!
//! # Security
//!
//! Passwords and OAuth2 tokens are stored using `SecretString` which
//! automatically zeroizes memory when dropped and is redacted from `Debug`
//! output.

mod auth;
mod connection;
mod error;
pub mod pagination;
pub mod record;

pub use auth::{ConnectionOptions, Credentials};
pub use connection::{Connection, DEFAULT_PER_PAGE, RequestOptions};
pub use error::{Error, Result};
pub use pagination::{LinkRelation, QueryParams, page_from_headers};
pub use record::{JsonObject, RawRecord, Resource, parse_timestamp};
// Re-exported for building RequestOptions and secret options.
pub use reqwest::{StatusCode, header};
pub use secrecy::SecretString;
