//! The head or base side of a pull request.

use octoscope_api::record::{self, JsonObject};
use octoscope_api::{Error, RawRecord, Resource, Result};
use tokio::sync::OnceCell;

use crate::repository::Repository;
use crate::user::User;

/// One side of a pull request: a branch (`label`, `ref`, `sha`), the account
/// it belongs to, and its repository.
#[derive(Debug, Clone)]
pub struct PullRequestRepo {
    record: RawRecord,
    user: OnceCell<User>,
    repo: Option<Repository>,
}

impl PullRequestRepo {
    /// Wrap a `head` or `base` object. The embedded repository is built
    /// immediately; it is `None` when the API reports `null` (a deleted fork).
    #[must_use]
    pub fn new(record: RawRecord) -> Self {
        let repo = record
            .raw()
            .and_then(|raw| raw.get("repo"))
            .and_then(serde_json::Value::as_object)
            .map(|object| Repository::from_object(object, record.connection()));

        Self {
            record,
            user: OnceCell::new(),
            repo,
        }
    }

    fn user_object(&self) -> Result<&JsonObject> {
        self.record
            .object_field("user")?
            .ok_or_else(|| Error::UnknownAttribute("user".into()))
    }

    /// Login of the account owning this branch.
    ///
    /// # Errors
    /// Returns error if the `user` object or its login is missing.
    pub fn user_login(&self) -> Result<&str> {
        record::str_field(self.user_object()?, "login")
    }

    /// Numeric ID of the account owning this branch.
    ///
    /// # Errors
    /// Returns error if the `user` object or its ID is missing.
    pub fn user_id(&self) -> Result<u64> {
        record::u64_field(self.user_object()?, "id")
    }

    /// Avatar URL of the account owning this branch.
    ///
    /// # Errors
    /// Returns error if the `user` object or its avatar URL is missing.
    pub fn user_avatar_url(&self) -> Result<&str> {
        record::str_field(self.user_object()?, "avatar_url")
    }

    /// API URL of the account owning this branch.
    ///
    /// # Errors
    /// Returns error if the `user` object or its URL is missing.
    pub fn user_url(&self) -> Result<&str> {
        record::str_field(self.user_object()?, "url")
    }

    /// The account owning this branch, fetched once and cached.
    ///
    /// # Errors
    /// Returns error if the user cannot be fetched.
    pub async fn user(&self) -> Result<&User> {
        self.user
            .get_or_try_init(|| async {
                User::fetch(self.user_login()?, self.record.connection()).await
            })
            .await
    }

    /// The repository the branch lives in, if it still exists.
    #[must_use]
    pub const fn repo(&self) -> Option<&Repository> {
        self.repo.as_ref()
    }

    /// `owner:branch` label.
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn label(&self) -> Result<&str> {
        self.record.str_field("label")
    }

    /// Branch name (the API's `ref` field).
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn ref_name(&self) -> Result<&str> {
        self.record.str_field("ref")
    }

    /// Commit the branch pointed at.
    ///
    /// # Errors
    /// Returns error if the field is missing.
    pub fn sha(&self) -> Result<&str> {
        self.record.str_field("sha")
    }
}

impl Resource for PullRequestRepo {
    fn record(&self) -> &RawRecord {
        &self.record
    }

    fn additional_attributes(&self) -> Vec<String> {
        ["user_avatar_url", "user_url", "user_id", "user_login"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}
