#![forbid(unsafe_code)]

//! Authentication status as seen by the UI kernel.
//!
//! The host's session layer owns login/logout. It publishes an
//! [`AuthState`] through an [`AuthProvider`] (an [`Observable`]) and the
//! kernel reacts to every change.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::reactive::Observable;

/// Observable authentication status.
pub type AuthProvider = Observable<AuthState>;

/// Account role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum Role {
    /// Patient / shopper.
    Client,
    Doctor,
    Admin,
    /// A role this kernel does not know about.
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Client => "client",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "client" => Self::Client,
            "doctor" => Self::Doctor,
            "admin" => Self::Admin,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// `{isAuthenticated, role}` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuthState {
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

impl AuthState {
    /// Logged out.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            role: None,
        }
    }

    /// Logged in with `role`.
    #[must_use]
    pub fn signed_in(role: Role) -> Self {
        Self {
            is_authenticated: true,
            role: Some(role),
        }
    }

    /// Authenticated and holding exactly `role`.
    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.is_authenticated && self.role.as_ref() == Some(role)
    }
}
