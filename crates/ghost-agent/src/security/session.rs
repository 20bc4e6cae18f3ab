//! Time-boxed PIN session for CRITICAL actions.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Upper bound on the configured TTL, keeping deadline arithmetic in range.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Holds the single process-wide PIN session.
///
/// Expiry is checked on read. Concurrent `verify_pin` calls race benignly:
/// the last successful one sets the deadline.
pub struct SecuritySessionStore {
    secret: String,
    ttl: Duration,
    unlocked_until: Mutex<Option<DateTime<Utc>>>,
}

impl SecuritySessionStore {
    /// Create a store. An empty `secret` accepts any entry.
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            unlocked_until: Mutex::new(None),
        }
    }

    /// Verify an entered PIN and open a session on success.
    ///
    /// This is the only way a session is opened.
    pub fn verify_pin(&self, entered: &str) -> bool {
        self.verify_pin_at(entered, Utc::now())
    }

    pub fn verify_pin_at(&self, entered: &str, now: DateTime<Utc>) -> bool {
        let secret = self.secret.trim();
        if !secret.is_empty() && entered.trim() != secret {
            tracing::warn!("PIN verification failed");
            return false;
        }
        let until = now + self.ttl;
        *self.slot() = Some(until);
        tracing::info!(until = %until, "PIN session opened");
        true
    }

    /// Close the session immediately.
    pub fn lock(&self) {
        *self.slot() = None;
        tracing::info!("PIN session locked");
    }

    pub fn is_unlocked(&self) -> bool {
        self.is_unlocked_at(Utc::now())
    }

    pub fn is_unlocked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(*self.slot(), Some(until) if now < until)
    }

    #[cfg(test)]
    fn unlocked_until(&self) -> Option<DateTime<Utc>> {
        *self.slot()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        // The guarded value is a plain Option, so a poisoned lock is still usable.
        self.unlocked_until
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_starts_locked() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(!store.is_unlocked());
        assert!(store.unlocked_until().is_none());
    }

    #[test]
    fn test_correct_pin_opens_session() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(store.verify_pin("1234"));
        assert!(store.is_unlocked());
    }

    #[test]
    fn test_wrong_pin_leaves_locked() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(!store.verify_pin("4321"));
        assert!(!store.is_unlocked());
    }

    #[test]
    fn test_wrong_pin_keeps_existing_session() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(store.verify_pin_at("1234", t0()));
        assert!(!store.verify_pin_at("0000", t0() + Duration::seconds(10)));
        assert_eq!(store.unlocked_until(), Some(t0() + Duration::seconds(300)));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(store.verify_pin(" 1234\n"));
    }

    #[test]
    fn test_empty_secret_accepts_anything() {
        let store = SecuritySessionStore::new("", 300);
        assert!(!store.is_unlocked());
        assert!(store.verify_pin("whatever"));
        assert!(store.is_unlocked());
    }

    #[test]
    fn test_ttl_boundary() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(store.verify_pin_at("1234", t0()));
        assert!(store.is_unlocked_at(t0() + Duration::seconds(299)));
        assert!(!store.is_unlocked_at(t0() + Duration::seconds(300)));
        assert!(!store.is_unlocked_at(t0() + Duration::seconds(301)));
    }

    #[test]
    fn test_lock_clears_session() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(store.verify_pin("1234"));
        store.lock();
        assert!(!store.is_unlocked());
        assert!(store.unlocked_until().is_none());
    }

    #[test]
    fn test_reverify_extends_session() {
        let store = SecuritySessionStore::new("1234", 300);
        assert!(store.verify_pin_at("1234", t0()));
        assert!(store.verify_pin_at("1234", t0() + Duration::seconds(200)));
        assert!(store.is_unlocked_at(t0() + Duration::seconds(450)));
    }
}
