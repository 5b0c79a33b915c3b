//! Closed set of user roles.
//!
//! Roles travel as lowercase strings (`"admin"`). The older backend emits the
//! capitalised spelling (`"Admin"`), so parsing ignores ASCII case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for role strings outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{value}'; expected admin, doctor or patient")]
pub struct RoleParseError {
    value: String,
}

/// Role attached to an authenticated identity.
///
/// # Examples
/// ```
/// use frontend::domain::Role;
///
/// let role: Role = "Doctor".parse().unwrap();
/// assert_eq!(role, Role::Doctor);
/// assert_eq!(role.as_str(), "doctor");
/// assert_eq!(role.home_path(), "/doctor");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Hospital administrator: departments and user accounts.
    Admin,
    /// Clinician: availability, appointments and medical records.
    Doctor,
    /// Patient: own profile and appointment booking.
    Patient,
}

impl Role {
    /// Every role, in menu order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Doctor, Self::Patient];

    /// Canonical lowercase spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }

    /// Default destination for this role; the guard's fallback on a role
    /// mismatch and the target of the application root.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Doctor => "/doctor",
            Self::Patient => "/patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RoleParseError {
                value: value.to_owned(),
            })
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_owned()
    }
}
