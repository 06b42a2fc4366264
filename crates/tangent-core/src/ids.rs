//! Branded ID newtypes for type safety.
//!
//! Every entity in the routing engine has a distinct ID type implemented as a
//! newtype wrapper around `String`. This prevents accidentally passing an
//! owner ID where a thread ID is expected.
//!
//! Transition IDs are UUID v7 (time-ordered). Thread IDs are derived
//! deterministically from `(owner, timestamp, sequence)` so routing runs are
//! reproducible under a simulated clock.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::{THREAD_ID_HEX_LEN, THREAD_ID_PREFIX};

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Identifier of the user whose messages are being routed.
    OwnerId
}

branded_id! {
    /// Unique identifier for a conversation thread (unique per owner).
    ThreadId
}

branded_id! {
    /// Unique identifier for a recorded transition.
    TransitionId
}

impl ThreadId {
    /// Derive a thread ID from the owner, creation timestamp, and the owner's
    /// creation sequence number.
    ///
    /// Pure: the same inputs always produce the same ID.
    #[must_use]
    pub fn derive(owner: &OwnerId, at: DateTime<Utc>, sequence: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(owner.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(at.to_rfc3339_opts(SecondsFormat::Millis, true).as_bytes());
        hasher.update(b":");
        hasher.update(sequence.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(format!("{THREAD_ID_PREFIX}{}", &digest[..THREAD_ID_HEX_LEN]))
    }
}

impl TransitionId {
    /// Create a new random ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn derived_thread_id_is_reproducible() {
        let owner = OwnerId::from("alice");
        let a = ThreadId::derive(&owner, at(0), 1);
        let b = ThreadId::derive(&owner, at(0), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn derived_thread_id_has_prefix_and_length() {
        let id = ThreadId::derive(&OwnerId::from("alice"), at(0), 0);
        assert!(id.starts_with(THREAD_ID_PREFIX), "got: {id}");
        assert_eq!(id.len(), THREAD_ID_PREFIX.len() + THREAD_ID_HEX_LEN);
        assert!(id[THREAD_ID_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sequence_changes_thread_id() {
        let owner = OwnerId::from("alice");
        assert_ne!(
            ThreadId::derive(&owner, at(0), 1),
            ThreadId::derive(&owner, at(0), 2)
        );
    }

    #[test]
    fn owner_and_time_change_thread_id() {
        let alice = OwnerId::from("alice");
        let bob = OwnerId::from("bob");
        assert_ne!(ThreadId::derive(&alice, at(0), 1), ThreadId::derive(&bob, at(0), 1));
        assert_ne!(ThreadId::derive(&alice, at(0), 1), ThreadId::derive(&alice, at(1), 1));
    }

    #[test]
    fn transition_id_is_uuid_v7() {
        let id = TransitionId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn transition_ids_are_unique() {
        assert_ne!(TransitionId::new(), TransitionId::new());
    }

    #[test]
    fn ids_order_lexically() {
        let a = ThreadId::from("thr_a");
        let b = ThreadId::from("thr_b");
        assert!(a < b);
    }

    #[test]
    fn serde_transparent() {
        let id = OwnerId::from("owner-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"owner-1\"");
        let back: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
