//! Accounts whose repositories are collected.

use std::fmt;

/// Kind of account, which selects the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// Personal account, listed via `/users/{login}/repos`.
    User,
    /// Organization, listed via `/orgs/{login}/repos`.
    Organization,
}

impl AccountKind {
    /// Path segment of the listing endpoint for this kind.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Organization => "orgs",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Organization => f.write_str("organization"),
        }
    }
}

/// A configured user or organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    /// Login name on the hosting platform.
    pub login: String,
    /// User or organization.
    pub kind: AccountKind,
}

impl Account {
    pub fn user(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            kind: AccountKind::User,
        }
    }

    pub fn organization(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            kind: AccountKind::Organization,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.login)
    }
}
