//! Enumerated API parameters.

use std::fmt;
use std::str::FromStr;

use octoscope_api::Error;
use serde::{Deserialize, Serialize};

/// Kind of GitHub account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// A personal account.
    User,
    /// An organization.
    Organization,
}

impl AccountType {
    /// The value GitHub uses in a user's `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Organization => "Organization",
        }
    }

    /// Path prefix of the account's end-points.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Organization => "orgs",
        }
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Organization" => Ok(Self::Organization),
            other => Err(Error::InvalidArgument(format!(
                "unknown account type: {other}"
            ))),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which repositories of an account to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryVisibility {
    /// Every repository.
    #[default]
    All,
    /// Private repositories; needs an authenticated connection.
    Private,
    /// Public repositories.
    Public,
    /// Repositories the account is a member of.
    Member,
}

impl RepositoryVisibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Private => "private",
            Self::Public => "public",
            Self::Member => "member",
        }
    }
}

impl FromStr for RepositoryVisibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            "member" => Ok(Self::Member),
            other => Err(Error::InvalidArgument(format!(
                "unknown repository type: {other}"
            ))),
        }
    }
}

impl fmt::Display for RepositoryVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State filter for pull request listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// PR is open.
    #[default]
    Open,
    /// PR was closed (merged or not).
    Closed,
}

impl PullRequestState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for PullRequestState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(Error::InvalidArgument(format!(
                "unknown pull request state '{other}', must be one of [open, closed]"
            ))),
        }
    }
}

impl fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
