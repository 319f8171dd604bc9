//! Authentication handling for GitHub API.

use secrecy::SecretString;
use serde_json::Value;

use crate::error::{Error, Result};

/// Authentication method for GitHub API requests.
#[derive(Debug)]
pub enum Credentials {
    /// Unauthenticated requests.
    Anonymous,

    /// HTTP Basic authentication.
    Basic {
        user_name: String,
        password: SecretString,
    },

    /// `Authorization: token <token>` header.
    OAuth2(SecretString),
}

impl Credentials {
    /// Whether requests made with these credentials are authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

/// Login information used to construct a [`Connection`](crate::Connection).
///
/// All fields are optional; [`ConnectionOptions::into_credentials`] checks
/// that they form a consistent combination.
#[derive(Debug, Default)]
pub struct ConnectionOptions {
    /// User name for HTTP Basic authentication.
    pub user_name: Option<String>,

    /// Password for HTTP Basic authentication.
    pub password: Option<SecretString>,

    /// OAuth2 token.
    pub oauth2_token: Option<SecretString>,
}

impl ConnectionOptions {
    /// Options for unauthenticated requests.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Options for HTTP Basic authentication.
    #[must_use]
    pub fn basic(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            password: Some(SecretString::from(password.into())),
            oauth2_token: None,
        }
    }

    /// Options for OAuth2 token authentication.
    #[must_use]
    pub fn oauth2(token: impl Into<String>) -> Self {
        Self {
            oauth2_token: Some(SecretString::from(token.into())),
            ..Self::default()
        }
    }

    /// Read options from a generic JSON mapping such as
    /// `{"user_name": "bob", "password": "pass"}`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfiguration`] if `value` is not an object,
    /// contains an unknown key, or holds a non-string value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::InvalidConfiguration(format!(
                "connection does not accept: {}",
                json_kind(value)
            )));
        };

        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "user_name" => options.user_name = Some(option_string(key, value)?),
                "password" => {
                    options.password = Some(SecretString::from(option_string(key, value)?));
                }
                "oauth2_token" => {
                    options.oauth2_token = Some(SecretString::from(option_string(key, value)?));
                }
                other => {
                    return Err(Error::InvalidConfiguration(format!(
                        "unknown option: '{other}'"
                    )));
                }
            }
        }

        Ok(options)
    }

    /// Validate the combination of options and turn it into [`Credentials`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfiguration`] if only one of user name and
    /// password is given, or if a token is combined with a user name.
    pub fn into_credentials(self) -> Result<Credentials> {
        match (self.user_name, self.password, self.oauth2_token) {
            (None, None, None) => Ok(Credentials::Anonymous),
            (None, None, Some(token)) => Ok(Credentials::OAuth2(token)),
            (Some(_), None, _) | (None, Some(_), _) => Err(Error::InvalidConfiguration(
                "when providing user_name or password, both are required".into(),
            )),
            (Some(_), Some(_), Some(_)) => Err(Error::InvalidConfiguration(
                "cannot provide both an OAuth2 token, and a user name and password".into(),
            )),
            (Some(user_name), Some(password), None) => {
                Ok(Credentials::Basic { user_name, password })
            }
        }
    }
}

fn option_string(key: &str, value: &Value) -> Result<String> {
    value.as_str().map(str::to_owned).ok_or_else(|| {
        Error::InvalidConfiguration(format!(
            "option '{key}' must be a string, got {}",
            json_kind(value)
        ))
    })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
