//! Basic-auth credentials for the upstream API.

use std::fmt;
use std::path::Path;

use super::ConfigError;

/// Username and password sent with every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parses `username:password`.
    ///
    /// Only the first colon separates the fields, so passwords may contain
    /// colons. Surrounding whitespace (including the trailing newline of a
    /// file) is ignored.
    pub fn parse(content: &str) -> Option<Self> {
        let (username, password) = content.trim().split_once(':')?;
        if username.is_empty() {
            return None;
        }
        Some(Self::new(username, password))
    }

    /// Loads credentials from a file holding `username:password`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).ok_or_else(|| ConfigError::InvalidCredentialsFile {
            path: path.to_path_buf(),
        })
    }

    /// Picks the credentials to use.
    ///
    /// A credentials file wins over inline values. Inline values must be
    /// supplied as a pair; empty values count as not supplied.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        file: Option<&Path>,
    ) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = file {
            return Self::from_file(path).map(Some);
        }

        let username = username.filter(|s| !s.is_empty());
        let password = password.filter(|s| !s.is_empty());

        match (username, password) {
            (Some(username), Some(password)) => {
                Ok(Some(Self::new(username, password)))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteCredentials),
        }
    }
}
