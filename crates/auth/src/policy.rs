//! Time-windowed access policy.
//!
//! A pure decision function over (level, target, current time). The match on
//! [`Level`] is exhaustive over the closed enum, so adding a level forces a
//! decision here; nothing falls through to an implicit allow.

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};
use zonegate_core::{Level, Target};

/// Outcome of an access decision.
///
/// `reason` is a human-readable operator string; empty when granted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether access is granted
    pub granted: bool,
    /// Deny reason for operator-facing logs
    pub reason: String,
}

impl AccessDecision {
    /// A granted decision.
    pub fn granted() -> Self {
        Self {
            granted: true,
            reason: String::new(),
        }
    }

    /// A denied decision with the given reason.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            granted: false,
            reason: reason.into(),
        }
    }
}

/// Decide whether `level` may enter `target` at `now`.
pub fn decide(level: Level, target: Target, now: DateTime<Local>) -> AccessDecision {
    match level {
        // Members always have access.
        Level::Member => AccessDecision::granted(),

        Level::Fulltime => {
            if is_fulltime_daytime(now) {
                AccessDecision::granted()
            } else {
                AccessDecision::denied("Fulltime user outside daytime (7:00-23:59)")
            }
        }

        Level::Regular => {
            if is_user_daytime(now) {
                AccessDecision::granted()
            } else {
                AccessDecision::denied("Regular user outside daytime (11:00-21:59)")
            }
        }

        // The authenticator short-circuits hiatus records with an
        // identity-revealing reason before policy runs; deny here as well so
        // the function is safe to call on its own.
        Level::Hiatus => AccessDecision::denied("On hiatus"),

        Level::Legacy => {
            if !is_user_daytime(now) {
                AccessDecision::denied("Legacy user outside daytime (11:00-21:59)")
            } else if target != Target::Downstairs {
                AccessDecision::denied("Legacy user restricted to downstairs")
            } else {
                AccessDecision::granted()
            }
        }
    }
}

/// Core daytime window, 11:00..21:59.
fn is_user_daytime(now: DateTime<Local>) -> bool {
    let hour = now.hour();
    (11..22).contains(&hour)
}

/// Extended daytime window, 7:00..23:59.
fn is_fulltime_daytime(now: DateTime<Local>) -> bool {
    let hour = now.hour();
    (7..24).contains(&hour)
}
