//! At most one in-flight prediction per user

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use ticketdesk_core::{Error, Result, SessionKey};

/// Tracks which session keys have a prediction in flight
#[derive(Clone, Default)]
pub struct AdmissionControl {
    in_flight: Arc<Mutex<HashSet<SessionKey>>>,
}

impl AdmissionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `key`, or fail if it is already taken.
    ///
    /// The slot is released when the returned guard is dropped.
    pub fn admit(&self, key: SessionKey) -> Result<InFlightGuard> {
        let mut in_flight = self.in_flight.lock();
        if in_flight.contains(&key) {
            return Err(Error::PredictionInFlight(key.to_string()));
        }
        in_flight.insert(key.clone());

        Ok(InFlightGuard {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Whether `key` currently holds a slot
    pub fn is_in_flight(&self, key: &SessionKey) -> bool {
        self.in_flight.lock().contains(key)
    }
}

/// Releases its user's slot on drop
pub struct InFlightGuard {
    key: SessionKey,
    in_flight: Arc<Mutex<HashSet<SessionKey>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> SessionKey {
        SessionKey::User(id.to_string())
    }

    #[test]
    fn test_second_admission_is_rejected_until_release() {
        let control = AdmissionControl::new();

        let guard = control.admit(user("alice")).unwrap();
        assert!(control.is_in_flight(&user("alice")));
        assert!(matches!(
            control.admit(user("alice")),
            Err(Error::PredictionInFlight(name)) if name == "alice"
        ));

        // Other users are unaffected
        let _bob = control.admit(user("bob")).unwrap();

        drop(guard);
        assert!(!control.is_in_flight(&user("alice")));
        assert!(control.admit(user("alice")).is_ok());
    }

    #[test]
    fn test_user_named_anonymous_does_not_block_anonymous_sessions() {
        let control = AdmissionControl::new();

        let _named = control.admit(user("anonymous")).unwrap();
        assert!(control.admit(SessionKey::Anonymous).is_ok());
    }
}
