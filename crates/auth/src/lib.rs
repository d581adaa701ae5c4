//! Credential authentication for the ZoneGate facility access-control
//! system.
//!
//! This crate decides, per door event, whether a presented credential (PIN
//! or card serial) may open a given zone at the current time. It owns the
//! file-backed credential store, the deterministic credential digest, the
//! time-windowed access policy, and sponsor-gated provisioning of new
//! records.
//!
//! # Core Concepts
//!
//! - **Credential digest**: raw identifiers are hashed once at the process
//!   boundary; the store and the user file only ever hold hashed keys
//! - **Atomic snapshot reload**: the user file is re-read lazily when its
//!   mtime changes and swapped in wholesale, never edited in place
//! - **Fail-closed policy**: every access level is matched exhaustively;
//!   nothing unrecognized is ever granted
//! - **Sponsor gate**: only a member inside their own validity window can
//!   provision a new record
//!
//! # Integration Points
//!
//! The door/gate controller consumes the [`Authenticator`] trait; the
//! process entry point constructs a [`FileAuthenticator`] from
//! [`zonegate_core::Config`].

pub mod authenticator;
pub mod error;
pub mod hash;
pub mod policy;
pub mod record;
pub mod store;

pub use authenticator::{Authenticator, FileAuthenticator};
pub use error::{AuthError, AuthResult};
pub use hash::hash_code;
pub use policy::{decide, AccessDecision};
pub use record::{NewUser, UserRecord};
pub use store::CredentialStore;

// Re-export core types for convenience
pub use zonegate_core::{Clock, FixedClock, Level, SystemClock, Target};
