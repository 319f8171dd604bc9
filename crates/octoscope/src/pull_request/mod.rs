//! GitHub pull requests.
//!
//! Listings return an abbreviated "overview" of each pull request; merge
//! information, timestamps and the head/base branches only come with the
//! single-item "detail" document. A [`PullRequest`] keeps both snapshots and
//! fetches the detail the first time something needs it.

mod repo;

use chrono::{DateTime, Utc};
use octoscope_api::header::{ACCEPT, HeaderValue};
use octoscope_api::record::{self, JsonObject};
use octoscope_api::{
    Connection, Error, RawRecord, RequestOptions, Resource, Result, parse_timestamp,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

pub use repo::PullRequestRepo;

use crate::types::PullRequestState;
use crate::user::User;

/// Media type returning the full pull request representation.
pub const FULL_MEDIA_TYPE: &str = "application/vnd.github.full+json";

fn full_media_options() -> RequestOptions {
    RequestOptions::new().header(ACCEPT, HeaderValue::from_static(FULL_MEDIA_TYPE))
}

/// A pull request, backed by an overview and a lazily fetched detail
/// snapshot.
#[derive(Debug, Clone)]
pub struct PullRequest {
    overview: RawRecord,
    detail: OnceCell<JsonObject>,
    user: OnceCell<User>,
    merged_by: OnceCell<Option<User>>,
    head: OnceCell<PullRequestRepo>,
    base: OnceCell<PullRequestRepo>,
    patch_text: OnceCell<String>,
    diff_text: OnceCell<String>,
}

impl PullRequest {
    /// Build from an overview (listing) object, a detail object, or both.
    #[must_use]
    pub fn new(
        overview: Option<JsonObject>,
        detail: Option<JsonObject>,
        connection: Connection,
    ) -> Self {
        Self {
            overview: RawRecord::new(overview, connection),
            detail: OnceCell::new_with(detail),
            user: OnceCell::new(),
            merged_by: OnceCell::new(),
            head: OnceCell::new(),
            base: OnceCell::new(),
            patch_text: OnceCell::new(),
            diff_text: OnceCell::new(),
        }
    }

    /// List the pull requests of a repository in the given state.
    ///
    /// # Errors
    /// Returns error if the listing fails.
    pub async fn find_for_repository(
        owner: &str,
        repository: &str,
        state: PullRequestState,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        let end_point = format!(
            "/repos/{}/{}/pulls",
            urlencoding::encode(owner),
            urlencoding::encode(repository)
        );
        let options = full_media_options().param("state", state);

        let items = connection.get_paginated(&end_point, &options).await?;
        debug!(owner, repository, %state, count = items.len(), "listed pull requests");

        items
            .into_iter()
            .map(|item| {
                let overview = record::into_object(item, &end_point)?;
                Ok(Self::new(Some(overview), None, connection.clone()))
            })
            .collect()
    }

    /// List the open pull requests of a repository.
    ///
    /// # Errors
    /// Returns error if the listing fails.
    pub async fn find_open_for_repository(
        owner: &str,
        repository: &str,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        Self::find_for_repository(owner, repository, PullRequestState::Open, connection).await
    }

    /// List the closed pull requests of a repository.
    ///
    /// # Errors
    /// Returns error if the listing fails.
    pub async fn find_closed_for_repository(
        owner: &str,
        repository: &str,
        connection: &Connection,
    ) -> Result<Vec<Self>> {
        Self::find_for_repository(owner, repository, PullRequestState::Closed, connection).await
    }

    /// Fetch a single pull request with full detail.
    ///
    /// # Errors
    /// Returns error if the pull request does not exist or the request fails.
    pub async fn fetch(
        owner: &str,
        repository: &str,
        number: u64,
        connection: &Connection,
    ) -> Result<Self> {
        let end_point = format!(
            "/repos/{}/{}/pulls/{number}",
            urlencoding::encode(owner),
            urlencoding::encode(repository)
        );
        let value = connection.get(&end_point, &full_media_options()).await?;
        let detail = record::into_object(value, &end_point)?;

        Ok(Self::new(None, Some(detail), connection.clone()))
    }

    /// Whether the detail snapshot has been loaded.
    #[must_use]
    pub fn has_detail(&self) -> bool {
        self.detail.initialized()
    }

    /// The detail snapshot, fetched from the overview's `url` on first use.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched.
    pub async fn detail(&self) -> Result<&JsonObject> {
        self.detail
            .get_or_try_init(|| async {
                let url = self.overview.str_field("url")?;
                debug!(url, "fetching pull request detail");
                let value = self.connection().get(url, &full_media_options()).await?;
                record::into_object(value, url)
            })
            .await
    }

    /// Look up a field, trying the overview first and then the detail
    /// (fetching it if needed).
    ///
    /// # Errors
    /// Returns [`Error::UnknownAttribute`] naming the field if neither
    /// snapshot has it, including when the detail cannot be located because
    /// the overview has no `url`.
    pub async fn field(&self, name: &str) -> Result<&Value> {
        if let Some(value) = self.overview.lookup(name) {
            return Ok(value);
        }

        if !self.has_detail() && self.overview.lookup("url").is_none() {
            return Err(Error::UnknownAttribute(name.to_string()));
        }

        record::field(self.detail().await?, name)
    }

    async fn str_value(&self, name: &str) -> Result<&str> {
        self.field(name)
            .await?
            .as_str()
            .ok_or_else(|| Error::AttributeType {
                name: name.to_string(),
                expected: "a string",
            })
    }

    /// The pull request number.
    ///
    /// # Errors
    /// Returns error if the number is missing from both snapshots.
    pub async fn number(&self) -> Result<u64> {
        self.field("number")
            .await?
            .as_u64()
            .ok_or_else(|| Error::AttributeType {
                name: "number".into(),
                expected: "an unsigned integer",
            })
    }

    /// The `user` object from whichever snapshot is loaded. Never makes a
    /// request.
    fn user_object(&self) -> Result<&JsonObject> {
        if let Some(user) = self.overview.object_field("user")? {
            return Ok(user);
        }

        let from_detail = match self.detail.get() {
            Some(detail) => record::object_field(detail, "user")?,
            None => None,
        };
        from_detail.ok_or_else(|| Error::UnknownAttribute("user".into()))
    }

    /// Login of the author. Available without an extra request.
    ///
    /// # Errors
    /// Returns error if no loaded snapshot has the author.
    pub fn user_login(&self) -> Result<&str> {
        record::str_field(self.user_object()?, "login")
    }

    /// Numeric ID of the author.
    ///
    /// # Errors
    /// Returns error if no loaded snapshot has the author.
    pub fn user_id(&self) -> Result<u64> {
        record::u64_field(self.user_object()?, "id")
    }

    /// Avatar URL of the author.
    ///
    /// # Errors
    /// Returns error if no loaded snapshot has the author.
    pub fn user_avatar_url(&self) -> Result<&str> {
        record::str_field(self.user_object()?, "avatar_url")
    }

    /// API URL of the author.
    ///
    /// # Errors
    /// Returns error if no loaded snapshot has the author.
    pub fn user_url(&self) -> Result<&str> {
        record::str_field(self.user_object()?, "url")
    }

    /// The author, fetched once and cached.
    ///
    /// # Errors
    /// Returns error if the user cannot be fetched.
    pub async fn user(&self) -> Result<&User> {
        self.user
            .get_or_try_init(|| async { User::fetch(self.user_login()?, self.connection()).await })
            .await
    }

    async fn merged_by_object(&self) -> Result<Option<&JsonObject>> {
        record::object_field(self.detail().await?, "merged_by")
    }

    /// Login of whoever merged the pull request, or `None` if unmerged.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched.
    pub async fn merged_by_login(&self) -> Result<Option<&str>> {
        self.merged_by_object()
            .await?
            .map(|user| record::str_field(user, "login"))
            .transpose()
    }

    /// Numeric ID of whoever merged the pull request, or `None` if unmerged.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched.
    pub async fn merged_by_id(&self) -> Result<Option<u64>> {
        self.merged_by_object()
            .await?
            .map(|user| record::u64_field(user, "id"))
            .transpose()
    }

    /// Avatar URL of whoever merged the pull request, or `None` if unmerged.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched.
    pub async fn merged_by_avatar_url(&self) -> Result<Option<&str>> {
        self.merged_by_object()
            .await?
            .map(|user| record::str_field(user, "avatar_url"))
            .transpose()
    }

    /// API URL of whoever merged the pull request, or `None` if unmerged.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched.
    pub async fn merged_by_url(&self) -> Result<Option<&str>> {
        self.merged_by_object()
            .await?
            .map(|user| record::str_field(user, "url"))
            .transpose()
    }

    /// Whoever merged the pull request, fetched once and cached; `None` if
    /// unmerged.
    ///
    /// # Errors
    /// Returns error if the detail or the user cannot be fetched.
    pub async fn merged_by(&self) -> Result<Option<&User>> {
        let merged_by = self
            .merged_by
            .get_or_try_init(|| async {
                match self.merged_by_login().await? {
                    Some(login) => User::fetch(login, self.connection()).await.map(Some),
                    None => Ok(None),
                }
            })
            .await?;

        Ok(merged_by.as_ref())
    }

    async fn detail_timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        let detail = self.detail().await?;
        parse_timestamp(record::optional_str_field(detail, name)?)
    }

    /// When the pull request was opened.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched or the time is malformed.
    pub async fn created_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.detail_timestamp("created_at").await
    }

    /// When the pull request was last updated.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched or the time is malformed.
    pub async fn updated_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.detail_timestamp("updated_at").await
    }

    /// When the pull request was closed, or `None` while it is open.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched or the time is malformed.
    pub async fn closed_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.detail_timestamp("closed_at").await
    }

    /// When the pull request was merged, or `None` if it was not.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched or the time is malformed.
    pub async fn merged_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.detail_timestamp("merged_at").await
    }

    /// What is being asked to be merged.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched or lacks `head`.
    pub async fn head(&self) -> Result<&PullRequestRepo> {
        self.head.get_or_try_init(|| self.branch("head")).await
    }

    /// What the pull request is based on.
    ///
    /// # Errors
    /// Returns error if the detail cannot be fetched or lacks `base`.
    pub async fn base(&self) -> Result<&PullRequestRepo> {
        self.base.get_or_try_init(|| self.branch("base")).await
    }

    async fn branch(&self, name: &str) -> Result<PullRequestRepo> {
        let object = record::object_field(self.detail().await?, name)?
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))?;

        Ok(PullRequestRepo::new(RawRecord::new(
            Some(object.clone()),
            self.connection().clone(),
        )))
    }

    /// The pull request as a patch series, fetched once and cached.
    ///
    /// # Errors
    /// Returns error if `patch_url` is missing or the request fails.
    pub async fn patch_text(&self) -> Result<&str> {
        self.patch_text
            .get_or_try_init(|| self.document("patch_url"))
            .await
            .map(String::as_str)
    }

    /// The pull request as a unified diff, fetched once and cached.
    ///
    /// # Errors
    /// Returns error if `diff_url` is missing or the request fails.
    pub async fn diff_text(&self) -> Result<&str> {
        self.diff_text
            .get_or_try_init(|| self.document("diff_url"))
            .await
            .map(String::as_str)
    }

    async fn document(&self, url_field: &str) -> Result<String> {
        let url = self.str_value(url_field).await?;
        self.connection().get_text(url, &RequestOptions::new()).await
    }

    /// Overview and detail merged into one object; detail wins on conflict.
    ///
    /// Only uses what is already loaded.
    #[must_use]
    pub fn to_map(&self) -> JsonObject {
        let mut merged = self.overview.raw().cloned().unwrap_or_default();
        if let Some(detail) = self.detail.get() {
            merged.extend(detail.clone());
        }
        merged
    }
}

impl Resource for PullRequest {
    fn record(&self) -> &RawRecord {
        &self.overview
    }

    fn additional_attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> = [
            "user_avatar_url",
            "user_url",
            "user_id",
            "user_login",
            "patch_text",
            "diff_text",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        if let Some(detail) = self.detail.get() {
            attributes.extend(detail.keys().cloned());
        }

        attributes.extend(
            [
                "merged_by_login",
                "merged_by_id",
                "merged_by_avatar_url",
                "merged_by_url",
            ]
            .into_iter()
            .map(String::from),
        );

        attributes
    }
}
