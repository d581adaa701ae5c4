//! Identity records and their persisted line format.
//!
//! A [`UserRecord`] is the domain entity the store indexes: who the holder
//! is, their access level, the hashed credentials the record answers to, and
//! the validity window plus sponsor trail stamped at provisioning.
//!
//! The persisted store is line-oriented text; each non-comment line encodes
//! one record as comma-separated fields:
//!
//! ```text
//! name,contact,level,valid_from,valid_thru,sponsors,code[,code...]
//! ```
//!
//! `contact`, the validity bounds, and `sponsors` may be empty; timestamps
//! are RFC 3339; `sponsors` is a `;`-joined list of hashed keys; codes are
//! stored hashed. Comment lines start with `#`. Malformed or short lines are
//! skipped by the loader, never fatal.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::warn;
use zonegate_core::Level;

use crate::hash::hash_code;

/// Minimum fields in a record line: name, contact, level, valid_from,
/// valid_thru, sponsors, and at least one code.
const MIN_RECORD_FIELDS: usize = 7;

/// An identity record as held in the credential store.
///
/// `codes` and `sponsors` contain hashed keys, never raw credentials. The
/// level is immutable after load; a record only changes by being replaced
/// wholesale in a reloaded snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name for operator logs
    pub name: String,
    /// Free-text contact info, surfaced only in the hiatus deny reason
    pub contact_info: String,
    /// Access classification driving the time-window policy
    pub level: Level,
    /// Hashed credential keys this record is indexed under
    pub codes: Vec<String>,
    /// Start of the validity window; unset means unconstrained
    pub valid_from: Option<DateTime<Local>>,
    /// End of the validity window; unset means unconstrained
    pub valid_thru: Option<DateTime<Local>>,
    /// Hashed keys of the members who vouched for this record
    pub sponsors: Vec<String>,
}

impl UserRecord {
    /// Whether `now` falls inside the record's validity window.
    pub fn in_validity_period(&self, now: DateTime<Local>) -> bool {
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(thru) = self.valid_thru {
            if now > thru {
                return false;
            }
        }
        true
    }

    /// Parse one line of the persisted store.
    ///
    /// Returns `None` for comments, blank lines, and lines that are short or
    /// malformed; the loader skips these and carries on.
    pub fn from_line(line: &str) -> Option<UserRecord> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < MIN_RECORD_FIELDS {
            warn!("Skipping short record line ({} fields)", fields.len());
            return None;
        }
        let level = match fields[2].parse::<Level>() {
            Ok(level) => level,
            Err(err) => {
                warn!("Skipping record line: {}", err);
                return None;
            }
        };
        let valid_from = match parse_timestamp(fields[3]) {
            Ok(ts) => ts,
            Err(()) => return None,
        };
        let valid_thru = match parse_timestamp(fields[4]) {
            Ok(ts) => ts,
            Err(()) => return None,
        };
        let sponsors: Vec<String> = fields[5]
            .split(';')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let codes: Vec<String> = fields[6..]
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();
        if codes.is_empty() {
            warn!("Skipping record line without codes");
            return None;
        }
        Some(UserRecord {
            name: fields[0].to_string(),
            contact_info: fields[1].to_string(),
            level,
            codes,
            valid_from,
            valid_thru,
            sponsors,
        })
    }

    /// Format the record as one persisted-store line, without trailing
    /// newline.
    pub fn to_line(&self) -> String {
        let mut fields = vec![
            self.name.clone(),
            self.contact_info.clone(),
            self.level.to_string(),
            self.valid_from.map(|t| t.to_rfc3339()).unwrap_or_default(),
            self.valid_thru.map(|t| t.to_rfc3339()).unwrap_or_default(),
            self.sponsors.join(";"),
        ];
        fields.extend(self.codes.iter().cloned());
        fields.join(",")
    }
}

/// A candidate record presented for provisioning.
///
/// Unlike [`UserRecord`], `codes` holds *raw* credentials as presented by
/// the new holder. They are hashed exactly once, when the candidate crosses
/// into the store via [`NewUser::into_record`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub contact_info: String,
    pub level: Level,
    /// Raw credentials (PINs, card serials) for the new record
    pub codes: Vec<String>,
    pub valid_from: Option<DateTime<Local>>,
    pub valid_thru: Option<DateTime<Local>>,
}

impl NewUser {
    /// Convert into a store record, hashing the raw codes and stamping the
    /// sponsor trail.
    pub fn into_record(self, sponsors: Vec<String>) -> UserRecord {
        UserRecord {
            name: self.name,
            contact_info: self.contact_info,
            level: self.level,
            codes: self.codes.iter().map(|c| hash_code(c)).collect(),
            valid_from: self.valid_from,
            valid_thru: self.valid_thru,
            sponsors,
        }
    }
}

fn parse_timestamp(field: &str) -> Result<Option<DateTime<Local>>, ()> {
    if field.is_empty() {
        return Ok(None);
    }
    match DateTime::parse_from_rfc3339(field) {
        Ok(ts) => Ok(Some(ts.with_timezone(&Local))),
        Err(err) => {
            warn!("Skipping record line with bad timestamp: {}", err);
            Err(())
        }
    }
}
