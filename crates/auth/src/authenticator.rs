//! Authenticator orchestration.
//!
//! Ties the pieces together per door event: syntactic code check,
//! opportunistic reload, record resolution, hiatus and validity-window
//! short-circuits, then the time-window policy. Also owns sponsor-gated
//! provisioning of new records.

use std::sync::Arc;

use tracing::{debug, info};
use zonegate_core::{Clock, Config, Level, SystemClock, Target};

use crate::error::{AuthError, AuthResult};
use crate::hash::hash_code;
use crate::policy::{self, AccessDecision};
use crate::record::{NewUser, UserRecord};
use crate::store::CredentialStore;

/// The contract a door controller consumes.
pub trait Authenticator: Send + Sync {
    /// Given a presented code, is the holder allowed into `target` right now?
    fn auth_user(&self, code: &str, target: Target) -> AccessDecision;

    /// Add `candidate` to the store, authorized by the sponsor's credential.
    /// Appends to the persisted user file.
    fn add_new_user(&self, sponsor_code: &str, candidate: NewUser) -> AuthResult<()>;

    /// Resolve a code to a copy of its record, if any.
    fn find_user(&self, code: &str) -> Option<UserRecord>;
}

/// File-backed authenticator over the credential store.
pub struct FileAuthenticator {
    store: CredentialStore,
    clock: Arc<dyn Clock>,
    min_code_length: usize,
    reload_on_change: bool,
}

impl FileAuthenticator {
    /// Open the authenticator with the system clock.
    ///
    /// Fails if the configured user file is missing or unreadable.
    pub fn open(config: &Config) -> AuthResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Open the authenticator with an injected clock, for deterministic
    /// policy behavior in tests.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> AuthResult<Self> {
        let store = CredentialStore::open(&config.store.user_file)?;
        Ok(Self {
            store,
            clock,
            min_code_length: config.policy.min_code_length,
            reload_on_change: config.store.reload_on_change,
        })
    }

    /// Syntactic floor on presented codes, checked before any lookup.
    fn meets_minimal_code_requirements(&self, code: &str) -> bool {
        code.len() >= self.min_code_length
    }
}

impl Authenticator for FileAuthenticator {
    fn auth_user(&self, code: &str, target: Target) -> AccessDecision {
        if !self.meets_minimal_code_requirements(code) {
            return AccessDecision::denied("Auth failed: code too short");
        }
        if self.reload_on_change {
            self.store.reload_if_changed();
        }
        let Some(user) = self.store.lookup(code) else {
            // Deliberately generic: no oracle for probing near-valid codes.
            return AccessDecision::denied("No user for code");
        };
        // Hiatus is more specific than other deny paths on purpose: the
        // token may be stolen from, or misused by, someone on leave, and the
        // operator needs enough to follow up.
        if user.level == Level::Hiatus {
            return AccessDecision::denied(format!(
                "User on hiatus '{} <{}>'",
                user.name, user.contact_info
            ));
        }
        let now = self.clock.now();
        if !user.in_validity_period(now) {
            let reason = if user.valid_from.is_some_and(|from| now < from) {
                "Code not valid yet"
            } else {
                "Code expired"
            };
            return AccessDecision::denied(reason);
        }
        let decision = policy::decide(user.level, target, now);
        debug!(
            user = %user.name,
            target = %target,
            granted = decision.granted,
            "access decision"
        );
        decision
    }

    fn add_new_user(&self, sponsor_code: &str, candidate: NewUser) -> AuthResult<()> {
        let sponsor = self
            .store
            .lookup(sponsor_code)
            .ok_or(AuthError::SponsorNotFound)?;
        if sponsor.level != Level::Member {
            return Err(AuthError::SponsorNotMember);
        }
        let now = self.clock.now();
        if !sponsor.in_validity_period(now) {
            return Err(AuthError::SponsorOutsideValidity);
        }

        // Single-sponsor policy for now; a longer sponsor trail may come
        // with differentiated expiry rules.
        let mut record = candidate.into_record(vec![hash_code(sponsor_code)]);
        if record.valid_from.is_none() {
            record.valid_from = Some(now);
        }

        self.store.insert(record.clone())?;
        // The in-memory insert is not rolled back if the append below
        // fails; store and file diverge until the next full reload drops
        // the record.
        self.store.append(&record)?;
        info!("Added {} user '{}'", record.level, record.name);
        Ok(())
    }

    fn find_user(&self, code: &str) -> Option<UserRecord> {
        self.store.lookup(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use std::path::PathBuf;
    use zonegate_core::FixedClock;

    fn at_hour(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, hour, 30, 0).unwrap()
    }

    fn user_file(name: &str, lines: &[String]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("zonegate-auth-{}.txt", name));
        std::fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();
        path
    }

    fn line(name: &str, contact: &str, level: &str, raw_code: &str) -> String {
        format!("{},{},{},,,,{}", name, contact, level, hash_code(raw_code))
    }

    fn authenticator(path: &PathBuf, hour: u32) -> (FileAuthenticator, Arc<FixedClock>) {
        let mut config = Config::default_config();
        config.store.user_file = path.clone();
        let clock = Arc::new(FixedClock::new(at_hour(hour)));
        let auth = FileAuthenticator::with_clock(&config, clock.clone()).unwrap();
        (auth, clock)
    }

    #[test]
    fn test_short_code_denied_regardless_of_table() {
        let path = user_file("short-code", &[line("alice", "a@x", "member", "12345")]);
        let (auth, _clock) = authenticator(&path, 12);
        let decision = auth.auth_user("12345", Target::Downstairs);
        assert!(!decision.granted);
        assert!(decision.reason.contains("short"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_code_gets_generic_reason() {
        let path = user_file("unknown-code", &[line("alice", "a@x", "member", "ABCDEF12")]);
        let (auth, _clock) = authenticator(&path, 12);
        let decision = auth.auth_user("ZZZZZZ99", Target::Downstairs);
        assert!(!decision.granted);
        assert_eq!(decision.reason, "No user for code");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_member_granted_any_target_any_hour() {
        let path = user_file("member-any", &[line("alice", "a@x", "member", "ABCDEF12")]);
        let (auth, clock) = authenticator(&path, 0);
        for hour in 0..24 {
            clock.set(at_hour(hour));
            for target in [Target::Downstairs, Target::Upstairs, Target::Elevator] {
                assert!(auth.auth_user("ABCDEF12", target).granted);
            }
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_hiatus_reason_reveals_name_and_contact() {
        let path = user_file(
            "hiatus",
            &[line("frank", "frank@example.org", "hiatus", "44556677")],
        );
        let (auth, _clock) = authenticator(&path, 12);
        let decision = auth.auth_user("44556677", Target::Downstairs);
        assert!(!decision.granted);
        assert!(decision.reason.contains("frank"));
        assert!(decision.reason.contains("frank@example.org"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_not_yet_valid_and_expired_are_distinguished() {
        let future = (at_hour(12) + chrono::Duration::days(10)).to_rfc3339();
        let past = (at_hour(12) - chrono::Duration::days(10)).to_rfc3339();
        let not_yet = format!("grace,g@x,member,{},,,{}", future, hash_code("77665544"));
        let expired = format!("henry,h@x,member,,{},,{}", past, hash_code("33221100"));
        let path = user_file("validity", &[not_yet, expired]);
        let (auth, _clock) = authenticator(&path, 12);

        let decision = auth.auth_user("77665544", Target::Downstairs);
        assert_eq!(decision.reason, "Code not valid yet");
        let decision = auth.auth_user("33221100", Target::Downstairs);
        assert_eq!(decision.reason, "Code expired");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_policy_verdict_returned_verbatim() {
        let path = user_file("policy", &[line("ruth", "r@x", "regular", "12121212")]);
        let (auth, clock) = authenticator(&path, 10);
        assert!(!auth.auth_user("12121212", Target::Downstairs).granted);
        clock.set(at_hour(11));
        assert!(auth.auth_user("12121212", Target::Downstairs).granted);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_add_new_user_requires_known_sponsor() {
        let path = user_file("sponsor-unknown", &[line("alice", "a@x", "member", "ABCDEF12")]);
        let (auth, _clock) = authenticator(&path, 12);
        let result = auth.add_new_user("NOTACODE", candidate("ivan", "10101010"));
        assert!(matches!(result, Err(AuthError::SponsorNotFound)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_add_new_user_requires_member_sponsor() {
        let path = user_file("sponsor-level", &[line("ruth", "r@x", "regular", "12121212")]);
        let (auth, _clock) = authenticator(&path, 12);
        let result = auth.add_new_user("12121212", candidate("ivan", "10101010"));
        assert!(matches!(result, Err(AuthError::SponsorNotMember)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_add_new_user_requires_sponsor_in_validity_window() {
        let expired_member = format!(
            "olga,o@x,member,,{},,{}",
            (at_hour(12) - chrono::Duration::days(30)).to_rfc3339(),
            hash_code("56565656")
        );
        let path = user_file("sponsor-window", &[expired_member]);
        let (auth, _clock) = authenticator(&path, 12);
        let result = auth.add_new_user("56565656", candidate("ivan", "10101010"));
        assert!(matches!(result, Err(AuthError::SponsorOutsideValidity)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_add_new_user_stamps_sponsor_and_valid_from() {
        let path = user_file("stamp", &[line("alice", "a@x", "member", "ABCDEF12")]);
        let (auth, _clock) = authenticator(&path, 12);
        auth.add_new_user("ABCDEF12", candidate("ivan", "10101010"))
            .unwrap();

        let record = auth.find_user("10101010").unwrap();
        assert_eq!(record.sponsors, vec![hash_code("ABCDEF12")]);
        assert_eq!(record.valid_from, Some(at_hour(12)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_duplicate_code_rejected_without_partial_mutation() {
        let path = user_file("duplicate", &[line("alice", "a@x", "member", "ABCDEF12")]);
        let (auth, _clock) = authenticator(&path, 12);
        auth.add_new_user("ABCDEF12", candidate("ivan", "10101010"))
            .unwrap();

        let result = auth.add_new_user("ABCDEF12", candidate("imposter", "10101010"));
        assert!(matches!(result, Err(AuthError::DuplicateCode)));
        assert_eq!(auth.find_user("10101010").unwrap().name, "ivan");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_persist_failure_surfaces_but_memory_keeps_record() {
        let path = user_file("persist-fail", &[line("alice", "a@x", "member", "ABCDEF12")]);
        let (auth, _clock) = authenticator(&path, 12);

        // Make the append fail by replacing the user file with a directory.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let result = auth.add_new_user("ABCDEF12", candidate("ivan", "10101010"));
        assert!(matches!(result, Err(AuthError::Io(_))));
        // Known risk window: memory updated, disk write failed.
        assert!(auth.find_user("10101010").is_some());

        let _ = std::fs::remove_dir(&path);
    }

    fn candidate(name: &str, raw_code: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            contact_info: format!("{}@example.org", name),
            level: Level::Regular,
            codes: vec![raw_code.to_string()],
            valid_from: None,
            valid_thru: None,
        }
    }
}
