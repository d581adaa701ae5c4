//! Access-level and zone vocabulary shared across the ZoneGate system.
//!
//! Both enums are closed: every consumer is expected to match exhaustively
//! so that a new variant is a compile error at every decision point rather
//! than a silent fall-through. Unknown tokens from the persisted store or
//! from a door controller never parse into a permissive value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Access classification of an identity record.
///
/// The level is immutable for the lifetime of a loaded record and drives the
/// time-window policy applied at each door event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Full members, unrestricted hours
    Member,
    /// Fulltime users, extended daytime hours
    Fulltime,
    /// Regular users, core daytime hours
    Regular,
    /// Temporarily suspended records (on leave); always denied
    Hiatus,
    /// Grandfathered records restricted to the downstairs zone
    Legacy,
}

impl Level {
    /// All levels, in persisted-store token order.
    pub const ALL: [Level; 5] = [
        Level::Member,
        Level::Fulltime,
        Level::Regular,
        Level::Hiatus,
        Level::Legacy,
    ];

    /// Stable token used in the persisted store and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Member => "member",
            Level::Fulltime => "fulltime",
            Level::Regular => "regular",
            Level::Hiatus => "hiatus",
            Level::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(Level::Member),
            "fulltime" => Ok(Level::Fulltime),
            "regular" => Ok(Level::Regular),
            "hiatus" => Ok(Level::Hiatus),
            "legacy" => Ok(Level::Legacy),
            other => Err(CoreError::UnknownLevel(other.to_string())),
        }
    }
}

/// Physical zone a door event requests access to.
///
/// Treated as an opaque tag by everything except the Legacy policy rule,
/// which is restricted to [`Target::Downstairs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Ground-floor zone; the designated Legacy zone
    Downstairs,
    /// Upper-floor zone
    Upstairs,
    /// Elevator access
    Elevator,
}

impl Target {
    /// Stable token used in logs and by door controllers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Downstairs => "downstairs",
            Target::Upstairs => "upstairs",
            Target::Elevator => "elevator",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "downstairs" => Ok(Target::Downstairs),
            "upstairs" => Ok(Target::Upstairs),
            "elevator" => Ok(Target::Elevator),
            other => Err(CoreError::UnknownTarget(other.to_string())),
        }
    }
}
