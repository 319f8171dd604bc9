//! GitHub repositories.

use octoscope_api::record::{self, JsonObject};
use octoscope_api::{Connection, Error, RawRecord, RequestOptions, Resource, Result};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::pull_request::PullRequest;
use crate::types::{AccountType, PullRequestState, RepositoryVisibility};
use crate::user::User;

/// A GitHub repository.
#[derive(Debug, Clone)]
pub struct Repository {
    record: RawRecord,
    owner: OnceCell<User>,
}

impl Repository {
    /// Wrap an already fetched repository object.
    #[must_use]
    pub fn new(record: RawRecord) -> Self {
        Self {
            record,
            owner: OnceCell::new(),
        }
    }

    pub(crate) fn from_object(object: &JsonObject, connection: &Connection) -> Self {
        Self::new(RawRecord::new(Some(object.clone()), connection.clone()))
    }

    /// Fetch a repository by owner login and name.
    ///
    /// # Errors
    /// Returns error if the repository does not exist or the request fails.
    pub async fn fetch(owner: &str, name: &str, connection: &Connection) -> Result<Self> {
        let end_point = format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(name)
        );
        let raw = connection.get(&end_point, &RequestOptions::new()).await?;

        Ok(Self::new(RawRecord::from_value(
            raw,
            connection.clone(),
            &end_point,
        )?))
    }

    /// List the repositories of an account, following every page.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] when listing private repositories
    /// over an unauthenticated connection (no request is made), and
    /// propagates request failures.
    pub async fn list(
        login: &str,
        account_type: AccountType,
        visibility: RepositoryVisibility,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        if visibility == RepositoryVisibility::Private && !connection.is_authenticated() {
            return Err(Error::InvalidArgument(
                "must provide an authenticated connection when listing private repositories"
                    .into(),
            ));
        }

        let end_point = format!(
            "/{}/{}/repos",
            account_type.path_segment(),
            urlencoding::encode(login)
        );
        let options = RequestOptions::new().param("type", visibility);

        let items = connection.get_paginated(&end_point, &options).await?;
        debug!(login, %visibility, count = items.len(), "listed repositories");

        items
            .into_iter()
            .map(|item| RawRecord::from_value(item, connection.clone(), &end_point).map(Self::new))
            .collect()
    }

    /// List every repository of an account.
    ///
    /// # Errors
    /// See [`Repository::list`].
    pub async fn list_all(
        login: &str,
        account_type: AccountType,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        Self::list(login, account_type, RepositoryVisibility::All, connection).await
    }

    /// List the private repositories of an account.
    ///
    /// # Errors
    /// See [`Repository::list`]; `connection` must be authenticated.
    pub async fn list_private(
        login: &str,
        account_type: AccountType,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        Self::list(login, account_type, RepositoryVisibility::Private, connection).await
    }

    /// List the public repositories of an account.
    ///
    /// # Errors
    /// See [`Repository::list`].
    pub async fn list_public(
        login: &str,
        account_type: AccountType,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        Self::list(login, account_type, RepositoryVisibility::Public, connection).await
    }

    /// List the repositories an account is a member of.
    ///
    /// # Errors
    /// See [`Repository::list`].
    pub async fn list_member(
        login: &str,
        account_type: AccountType,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        Self::list(login, account_type, RepositoryVisibility::Member, connection).await
    }

    /// Repository name.
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn name(&self) -> Result<&str> {
        self.record.str_field("name")
    }

    /// Numeric repository ID.
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn id(&self) -> Result<u64> {
        self.record.u64_field("id")
    }

    fn owner_object(&self) -> Result<&JsonObject> {
        self.record
            .object_field("owner")?
            .ok_or_else(|| Error::UnknownAttribute("owner".into()))
    }

    /// Login name of the owner.
    ///
    /// # Errors
    /// Returns error if the owner is missing.
    pub fn owner_login(&self) -> Result<&str> {
        record::str_field(self.owner_object()?, "login")
    }

    /// Numeric ID of the owner, from the embedded `owner` object.
    ///
    /// # Errors
    /// Returns error if the owner is missing.
    pub fn owner_id(&self) -> Result<u64> {
        record::u64_field(self.owner_object()?, "id")
    }

    /// Avatar URL of the owner.
    ///
    /// # Errors
    /// Returns error if the owner is missing.
    pub fn owner_avatar_url(&self) -> Result<&str> {
        record::str_field(self.owner_object()?, "avatar_url")
    }

    /// API URL of the owner.
    ///
    /// # Errors
    /// Returns error if the owner is missing.
    pub fn owner_url(&self) -> Result<&str> {
        record::str_field(self.owner_object()?, "url")
    }

    /// The full owner account, fetched once and cached.
    ///
    /// # Errors
    /// Returns error if the owner cannot be fetched.
    pub async fn owner(&self) -> Result<&User> {
        self.owner
            .get_or_try_init(|| async {
                User::fetch(self.owner_login()?, self.record.connection()).await
            })
            .await
    }

    /// Open pull requests. Never cached.
    ///
    /// # Errors
    /// Returns error if the listing fails.
    pub async fn open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        self.pull_requests(PullRequestState::Open).await
    }

    /// Closed pull requests. Never cached.
    ///
    /// # Errors
    /// Returns error if the listing fails.
    pub async fn closed_pull_requests(&self) -> Result<Vec<PullRequest>> {
        self.pull_requests(PullRequestState::Closed).await
    }

    async fn pull_requests(&self, state: PullRequestState) -> Result<Vec<PullRequest>> {
        PullRequest::find_for_repository(
            self.owner_login()?,
            self.name()?,
            state,
            self.record.connection(),
        )
        .await
    }

    /// The repository this one was forked from, or `None` if it is not a
    /// fork (or the listing did not include the parent).
    ///
    /// # Errors
    /// Returns error if `source` is present but not an object.
    pub fn source(&self) -> Result<Option<Self>> {
        Ok(self
            .record
            .object_field("source")?
            .map(|source| Self::from_object(source, self.record.connection())))
    }
}

impl Resource for Repository {
    fn record(&self) -> &RawRecord {
        &self.record
    }

    fn additional_attributes(&self) -> Vec<String> {
        ["id", "owner_login", "owner_id", "owner_avatar_url", "owner_url"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}
