//! GitHub users.

use octoscope_api::{
    Connection, Error, RawRecord, RequestOptions, Resource, Result, StatusCode,
};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::repository::Repository;
use crate::types::{AccountType, RepositoryVisibility};

/// A GitHub user or organization account.
///
/// Fields not covered by a typed accessor are available through
/// [`RawRecord::get`] on [`Resource::record`].
#[derive(Debug, Clone)]
pub struct User {
    record: RawRecord,
    repositories: OnceCell<Vec<Repository>>,
}

/// Identifies a user by login name or by an already fetched [`User`].
#[derive(Debug, Clone, Copy)]
pub enum UserRef<'a> {
    Login(&'a str),
    User(&'a User),
}

impl<'a> From<&'a str> for UserRef<'a> {
    fn from(login: &'a str) -> Self {
        Self::Login(login)
    }
}

impl<'a> From<&'a String> for UserRef<'a> {
    fn from(login: &'a String) -> Self {
        Self::Login(login)
    }
}

impl<'a> From<&'a User> for UserRef<'a> {
    fn from(user: &'a User) -> Self {
        Self::User(user)
    }
}

impl UserRef<'_> {
    fn login(&self) -> Result<&str> {
        match self {
            Self::Login(login) => Ok(login),
            Self::User(user) => user.login(),
        }
    }
}

impl User {
    /// Wrap an already fetched user object.
    #[must_use]
    pub fn new(record: RawRecord) -> Self {
        Self {
            record,
            repositories: OnceCell::new(),
        }
    }

    /// Fetch a user by login name.
    ///
    /// # Errors
    /// Returns error if the user does not exist or the request fails.
    pub async fn fetch(login: &str, connection: &Connection) -> Result<Self> {
        let end_point = format!("/users/{}", urlencoding::encode(login));
        let raw = connection.get(&end_point, &RequestOptions::new()).await?;

        Ok(Self::new(RawRecord::from_value(
            raw,
            connection.clone(),
            &end_point,
        )?))
    }

    /// Login name.
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn login(&self) -> Result<&str> {
        self.record.str_field("login")
    }

    /// Numeric account ID.
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn id(&self) -> Result<u64> {
        self.record.u64_field("id")
    }

    /// Whether this is a user or an organization (the API's `type` field).
    ///
    /// # Errors
    /// Returns error if the field is missing or holds an unknown value.
    pub fn account_type(&self) -> Result<AccountType> {
        self.record.str_field("type")?.parse()
    }

    /// Every repository owned by this account.
    ///
    /// Cached after the first successful call.
    ///
    /// # Errors
    /// Returns error if the listing fails.
    pub async fn repositories(&self) -> Result<&[Repository]> {
        let repositories = self
            .repositories
            .get_or_try_init(|| async {
                Repository::list(
                    self.login()?,
                    self.account_type()?,
                    RepositoryVisibility::All,
                    self.record.connection(),
                )
                .await
            })
            .await?;

        Ok(repositories)
    }

    /// Check whether the user authenticated by `connection` follows `target`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `connection` is not
    /// authenticated or the login is empty, and propagates request failures.
    pub async fn is_following<'a>(
        target: impl Into<UserRef<'a>>,
        connection: &Connection,
    ) -> Result<bool> {
        if !connection.is_authenticated() {
            return Err(Error::InvalidArgument(
                "provided connection must make authenticated requests".into(),
            ));
        }

        let target = target.into();
        let login = target.login()?;
        if login.is_empty() {
            return Err(Error::InvalidArgument("user login must not be empty".into()));
        }

        let end_point = format!("/user/following/{}", urlencoding::encode(login));
        let response = connection
            .raw_get(&end_point, &RequestOptions::new())
            .await?;

        let status = response.status();
        debug!(login, status = status.as_u16(), "following check");

        // 204 No Content means "following", 404 means "not following".
        match status {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::UNAUTHORIZED => Err(Error::AuthenticationFailed),
            _ => Err(Error::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

impl Resource for User {
    fn record(&self) -> &RawRecord {
        &self.record
    }

    fn additional_attributes(&self) -> Vec<String> {
        vec!["id".into(), "account_type".into()]
    }
}
