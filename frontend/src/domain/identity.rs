//! Identity held by the session store.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Validation errors returned by identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    /// Record id was blank.
    EmptyId,
    /// Username was blank once trimmed.
    EmptyUsername,
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be empty"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Opaque identifier of a backend record.
///
/// The backend has issued both prefixed string ids (`"U001"`) and plain
/// integers (`7`); both decode and are kept in string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawRecordId", into = "String")]
pub struct RecordId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Text(String),
    Number(u64),
}

impl RecordId {
    /// Validate and construct a [`RecordId`].
    ///
    /// # Errors
    ///
    /// Returns [`IdentityValidationError::EmptyId`] for blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl TryFrom<RawRecordId> for RecordId {
    type Error = IdentityValidationError;

    fn try_from(value: RawRecordId) -> Result<Self, Self::Error> {
        match value {
            RawRecordId::Text(text) => Self::new(text),
            RawRecordId::Number(number) => Ok(Self::from(number)),
        }
    }
}

/// Login name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Errors
    ///
    /// Returns [`IdentityValidationError::EmptyUsername`] for blank input.
    pub fn new(username: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let raw = username.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authenticated user as seen by the session store and the guard.
///
/// Decodes from the backend's `user` object; extra fields such as `email` or
/// names are ignored.
///
/// # Examples
/// ```
/// use frontend::domain::{Identity, Role};
///
/// let identity: Identity =
///     serde_json::from_str(r#"{"id": 3, "username": "dr_who", "role": "Doctor", "email": "x@y"}"#)
///         .unwrap();
/// assert_eq!(identity.role(), Role::Doctor);
/// assert_eq!(identity.id().as_ref(), "3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: RecordId,
    username: Username,
    role: Role,
}

impl Identity {
    /// Build an identity from validated parts.
    #[must_use]
    pub const fn new(id: RecordId, username: Username, role: Role) -> Self {
        Self { id, username, role }
    }

    /// Fallible constructor from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityValidationError`] when the id or username is blank.
    pub fn try_from_parts(
        id: impl Into<String>,
        username: impl Into<String>,
        role: Role,
    ) -> Result<Self, IdentityValidationError> {
        Ok(Self::new(RecordId::new(id)?, Username::new(username)?, role))
    }

    /// Backend user id.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// Login name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Role used by the route guard.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for identity decoding.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#""U001""#, "U001")]
    #[case("42", "42")]
    #[case(r#"" P7 ""#, "P7")]
    fn record_ids_accept_strings_and_integers(#[case] json: &str, #[case] expected: &str) {
        let id: RecordId = serde_json::from_str(json).expect("id decodes");
        assert_eq!(id.as_ref(), expected);
    }

    #[rstest]
    #[case(r#""""#)]
    #[case("-1")]
    #[case("null")]
    fn record_ids_reject_blank_or_negative(#[case] json: &str) {
        assert!(serde_json::from_str::<RecordId>(json).is_err());
    }

    #[rstest]
    fn identity_round_trips_through_storage_form() {
        let identity =
            Identity::try_from_parts("U001", "admin", Role::Admin).expect("valid identity");
        let json = serde_json::to_string(&identity).expect("serialise");
        assert_eq!(json, r#"{"id":"U001","username":"admin","role":"admin"}"#);
        let back: Identity = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, identity);
    }

    #[rstest]
    #[case(r#"{"id":"1","username":"","role":"admin"}"#)]
    #[case(r#"{"id":"1","username":"x","role":"nurse"}"#)]
    #[case(r#"{"id":"1","role":"admin"}"#)]
    fn malformed_identities_fail_to_decode(#[case] json: &str) {
        assert!(serde_json::from_str::<Identity>(json).is_err());
    }
}
