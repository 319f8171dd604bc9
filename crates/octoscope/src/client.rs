//! Entry point bundling a connection.

use octoscope_api::{Connection, ConnectionOptions, Result};
use serde_json::Value;

use crate::user::User;

/// GitHub client.
///
/// Holds one [`Connection`] and hands it to every resource it builds.
#[derive(Debug, Clone)]
pub struct Octoscope {
    connection: Connection,
}

impl Octoscope {
    /// Create a client for api.github.com.
    ///
    /// # Errors
    /// Returns error if the options are invalid or the HTTP client fails to build.
    pub fn new(options: ConnectionOptions) -> Result<Self> {
        Ok(Self::with_connection(Connection::new(options)?))
    }

    /// Create a client from a JSON object of options.
    ///
    /// # Errors
    /// Returns [`octoscope_api::Error::InvalidConfiguration`] for unknown,
    /// incomplete or conflicting options.
    pub fn from_value(options: &Value) -> Result<Self> {
        Ok(Self::with_connection(Connection::from_value(options)?))
    }

    /// Wrap an existing connection, e.g. one pointed at GitHub Enterprise.
    #[must_use]
    pub const fn with_connection(connection: Connection) -> Self {
        Self { connection }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Fetch a user by login name.
    ///
    /// # Errors
    /// Returns error if the user does not exist or the request fails.
    pub async fn user(&self, login: &str) -> Result<User> {
        User::fetch(login, &self.connection).await
    }
}
