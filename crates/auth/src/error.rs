//! Error types for ZoneGate authenticator operations.

use thiserror::Error;

/// Errors surfaced by the credential store and provisioning path.
///
/// Authentication outcomes are not errors: `auth_user` always returns an
/// [`crate::AccessDecision`]. These variants cover provisioning rejections
/// and the store's file I/O.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Sponsor credential did not resolve to any record
    #[error("Sponsor not found")]
    SponsorNotFound,

    /// Sponsoring record is not member-level
    #[error("Non-member cannot sponsor a new user")]
    SponsorNotMember,

    /// Sponsoring record is outside its own validity window
    #[error("Sponsor outside own validity window")]
    SponsorOutsideValidity,

    /// A candidate code is already mapped to an existing record
    #[error("Duplicate code while adding user")]
    DuplicateCode,

    /// Shared credential table lock was poisoned by a panicking thread
    #[error("Credential table lock poisoned")]
    LockPoisoned,

    /// I/O errors from the persisted user file
    #[error("User file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for authenticator operations.
pub type AuthResult<T> = Result<T, AuthError>;
