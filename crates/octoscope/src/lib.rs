//! # octoscope
//!
//! Read-only access to GitHub users, repositories and pull requests.
//!
//! Resources keep the JSON object GitHub returned and expose it through
//! [`RawRecord`], with typed accessors on top. Related resources (a
//! repository's owner, a pull request's head and base) are fetched on first
//! use and cached per instance.
//!
//! ```no_run
//! # async fn run() -> octoscope::Result<()> {
//! use octoscope::{ConnectionOptions, Octoscope};
//!
//! let github = Octoscope::new(ConnectionOptions::oauth2("token"))?;
//! let user = github.user("octocat").await?;
//! for repository in user.repositories().await? {
//!     for pull in repository.open_pull_requests().await? {
//!         println!("{} #{}", repository.name()?, pull.number().await?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod pull_request;
pub mod repository;
pub mod types;
pub mod user;

pub use client::Octoscope;
pub use octoscope_api::{
    Connection, ConnectionOptions, Credentials, Error, JsonObject, LinkRelation, QueryParams,
    RawRecord, RequestOptions, Resource, Result, SecretString,
};
pub use pull_request::{PullRequest, PullRequestRepo};
pub use repository::Repository;
pub use types::{AccountType, PullRequestState, RepositoryVisibility};
pub use user::{User, UserRef};
