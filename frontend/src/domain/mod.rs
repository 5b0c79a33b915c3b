//! Domain primitives, the session store and the route guard.
//!
//! Purpose: hold the rules of the frontend independent of HTTP and disk.
//! Adapters under `outbound` implement the traits in [`ports`]; the
//! application context in `app` wires them together.
//!
//! Public surface:
//! - [`SessionStore`]: the current identity and credential token.
//! - [`routing::Guard`]: decides whether a navigation renders or redirects.
//! - [`DomainError`] and [`ErrorCode`]: inline, user-facing failures.
//! - [`records`]: entity shapes exchanged with the REST backend.

pub mod auth;
pub mod drugs;
pub mod error;
pub mod identity;
pub mod navigation;
pub mod ports;
pub mod records;
pub mod role;
pub mod routing;
pub mod session;

pub use self::auth::{
    AuthGrant, CredentialToken, CredentialValidationError, LoginCredentials, Registration,
};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::identity::{Identity, IdentityValidationError, RecordId, Username};
pub use self::role::{Role, RoleParseError};
pub use self::session::{
    Session, SessionStore, SessionStoreClosed, SessionStoreError, SessionSubscription,
};

/// Result alias for operations that surface inline errors.
///
/// # Examples
/// ```
/// use frontend::domain::{DomainError, DomainResult};
///
/// fn save() -> DomainResult<()> {
///     Err(DomainError::forbidden("admins only"))
/// }
/// assert!(save().is_err());
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
