//! Authenticated connection to the GitHub v3 API.

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::auth::{ConnectionOptions, Credentials};
use crate::error::{Error, Result};
use crate::pagination::{LinkRelation, QueryParams, page_from_headers};

/// Page size requested from paginated end-points unless the caller sets one.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Per-request headers and query parameters.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers. Authentication headers take precedence on collision.
    pub headers: HeaderMap,

    /// Query parameters appended to the end-point.
    pub params: QueryParams,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.set(key, value);
        self
    }
}

#[derive(Debug)]
struct Inner {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

/// Issues GET requests against the GitHub API with one fixed set of
/// credentials.
///
/// Cloning is cheap; clones share the underlying HTTP client and
/// credentials.
#[derive(Debug, Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    /// Default GitHub API URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Create a connection to api.github.com.
    ///
    /// # Errors
    /// Returns error if the options are inconsistent or the HTTP client
    /// cannot be built.
    pub fn new(options: ConnectionOptions) -> Result<Self> {
        Self::with_base_url(options, Self::DEFAULT_API_URL)
    }

    /// Create a connection making unauthenticated requests.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn anonymous() -> Result<Self> {
        Self::new(ConnectionOptions::anonymous())
    }

    /// Create a connection from a generic JSON mapping of options.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfiguration`] for bad options.
    pub fn from_value(options: &Value) -> Result<Self> {
        Self::new(ConnectionOptions::from_value(options)?)
    }

    /// Create a connection with a custom API URL (for GitHub Enterprise).
    ///
    /// # Errors
    /// Returns error if the options are inconsistent or the HTTP client
    /// cannot be built.
    pub fn with_base_url(options: ConnectionOptions, base_url: impl Into<String>) -> Result<Self> {
        let credentials = options.into_credentials()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("octoscope/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                credentials,
            }),
        })
    }

    /// Are requests made with credentials?
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.credentials.is_authenticated()
    }

    /// The credentials attached to every request.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// The API base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// GET `end_point` and decode the JSON body.
    ///
    /// `end_point` is either a path starting with `/` relative to the base
    /// URL, or an absolute URL as found in API payloads. Credentials are only
    /// sent to URLs on the base URL's origin.
    ///
    /// # Errors
    /// Returns error if the request fails, the API reports an error status,
    /// or the body is empty or not JSON.
    pub async fn get(&self, end_point: &str, options: &RequestOptions) -> Result<Value> {
        let response = self.raw_get(end_point, options).await?;
        let response = Self::check_status(response).await?;
        Self::decode(end_point, response).await
    }

    /// GET every page of a paginated end-point and concatenate the items.
    ///
    /// `per_page` defaults to [`DEFAULT_PER_PAGE`]. Pages are requested one at
    /// a time, following the `next` relation of each response's `Link`
    /// header; a response without one (or without any `Link` header) ends
    /// the sequence, as does a `next` page that was already requested.
    ///
    /// # Errors
    /// Returns error if any page fails, or a page body is not a JSON array.
    pub async fn get_paginated(
        &self,
        end_point: &str,
        options: &RequestOptions,
    ) -> Result<Vec<Value>> {
        let mut options = options.clone();
        if options.params.get("per_page").is_none() {
            options.params.set("per_page", DEFAULT_PER_PAGE);
        }

        let mut requested = HashSet::new();
        requested.insert(options.params.get("page").unwrap_or("1").to_string());

        let mut items = Vec::new();
        loop {
            let response = self.raw_get(end_point, &options).await?;
            let response = Self::check_status(response).await?;
            let next_page = page_from_headers(response.headers(), LinkRelation::Next);

            match Self::decode(end_point, response).await? {
                Value::Array(page) => items.extend(page),
                _ => {
                    return Err(Error::UnexpectedPayload {
                        end_point: end_point.to_string(),
                        expected: "a JSON array",
                    });
                }
            }

            let Some(next_page) = next_page else {
                trace!(end_point, total = items.len(), "no next page");
                break;
            };

            if !requested.insert(next_page.clone()) {
                warn!(end_point, page = %next_page, "next page already requested, stopping");
                break;
            }

            trace!(end_point, page = %next_page, "following next page");
            options.params.set("page", next_page);
        }

        Ok(items)
    }

    /// GET `end_point` and return the body as text (patch and diff
    /// documents).
    ///
    /// # Errors
    /// Returns error if the request fails or the API reports an error status.
    pub async fn get_text(&self, end_point: &str, options: &RequestOptions) -> Result<String> {
        let response = self.raw_get(end_point, options).await?;
        let response = Self::check_status(response).await?;
        response
            .text()
            .await
            .map_err(|source| Error::RequestFailed {
                end_point: end_point.to_string(),
                source,
            })
    }

    /// GET `end_point` with authentication applied, returning the response
    /// untouched regardless of its status.
    ///
    /// # Errors
    /// Returns [`Error::RequestFailed`] if no response is received.
    pub async fn raw_get(&self, end_point: &str, options: &RequestOptions) -> Result<Response> {
        let url = self.url_for(end_point, &options.params);
        let authenticate = self.is_authenticated() && self.is_same_origin(&url);
        debug!(%url, authenticated = authenticate, "GET");

        let mut headers = options.headers.clone();
        if authenticate {
            headers.remove(AUTHORIZATION);
        }

        let mut request = self.inner.client.get(&url).headers(headers);
        // Credentials only go to the API's own origin.
        request = match &self.inner.credentials {
            Credentials::Anonymous => request,
            _ if !authenticate => request,
            Credentials::Basic {
                user_name,
                password,
            } => request.basic_auth(user_name, Some(password.expose_secret())),
            Credentials::OAuth2(token) => {
                let mut value =
                    HeaderValue::from_str(&format!("token {}", token.expose_secret())).map_err(
                        |_| Error::InvalidConfiguration("oauth2_token is not a valid header".into()),
                    )?;
                value.set_sensitive(true);
                request.header(AUTHORIZATION, value)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|source| Error::RequestFailed {
                end_point: end_point.to_string(),
                source,
            })?;

        debug!(%url, status = response.status().as_u16(), "response");
        Ok(response)
    }

    /// Resolve `end_point` against the base URL and append `params`.
    fn url_for(&self, end_point: &str, params: &QueryParams) -> String {
        let url = if end_point.starts_with("http://") || end_point.starts_with("https://") {
            end_point.to_string()
        } else {
            format!("{}{}", self.inner.base_url, end_point)
        };

        let query = params.to_query_string();
        if url.contains('?') {
            format!("{url}{}", query.replacen('?', "&", 1))
        } else {
            format!("{url}{query}")
        }
    }

    /// Whether `url` shares scheme, host and port with the base URL.
    fn is_same_origin(&self, url: &str) -> bool {
        match (Url::parse(url), Url::parse(&self.inner.base_url)) {
            (Ok(url), Ok(base)) => url.origin() == base.origin(),
            _ => false,
        }
    }

    /// Map error statuses to [`Error`], passing successful responses through.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(Error::AuthenticationFailed),
            StatusCode::FORBIDDEN
                if response
                    .headers()
                    .get("x-ratelimit-remaining")
                    .is_some_and(|v| v == "0") =>
            {
                Err(Error::RateLimited)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(Error::ApiError {
                    status: status.as_u16(),
                    message: text,
                })
            }
        }
    }

    async fn decode(end_point: &str, response: Response) -> Result<Value> {
        let body = response
            .bytes()
            .await
            .map_err(|source| Error::RequestFailed {
                end_point: end_point.to_string(),
                source,
            })?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::EmptyResponse(end_point.to_string()));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
