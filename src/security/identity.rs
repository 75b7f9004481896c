//! Session-scoped pseudo identity.
//!
//! The host has no trustworthy client address, so a client is "whatever
//! session it holds". The identity only deters casual scraping and is not an
//! authentication boundary: two browsers sharing a session share an identity,
//! and a session reset yields a fresh one.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Number of hex characters kept from the digest.
const IDENTITY_LEN: usize = 12;

/// Opaque per-session client key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Derive an identity from a seed: the first 12 hex chars of its MD5.
    pub fn from_seed(seed: &str) -> Self {
        let digest = Md5::digest(seed.as_bytes());
        let hex = format!("{:x}", digest);
        Self(hex[..IDENTITY_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the identity for a session.
///
/// `None` means identity is unavailable; callers must fail open.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, session: &mut SessionState) -> Option<ClientIdentity>;
}

/// Default resolver: seeds from a nanosecond clock reading plus the session
/// state's address, stores the seed, and caches the derived identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionIdentityResolver;

impl IdentityResolver for SessionIdentityResolver {
    fn resolve(&self, session: &mut SessionState) -> Option<ClientIdentity> {
        if let Some(identity) = session.identity() {
            return Some(identity.clone());
        }

        let seed = match session.seed() {
            Some(seed) => seed.to_string(),
            None => {
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos();
                let addr = session as *const SessionState as usize;
                let seed = format!("{}{}", nanos, addr);
                session.set_seed(seed.clone());
                seed
            }
        };

        let identity = ClientIdentity::from_seed(&seed);
        session.set_identity(identity.clone());
        Some(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_twelve_hex_chars() {
        let id = ClientIdentity::from_seed("1700000000.123140234");
        assert_eq!(id.as_str().len(), 12);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_identity_matches_md5_prefix() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(ClientIdentity::from_seed("").as_str(), "d41d8cd98f00");
    }

    #[test]
    fn test_resolver_is_idempotent_within_session() {
        let mut session = SessionState::new(100, 0.0);
        let resolver = SessionIdentityResolver;
        let first = resolver.resolve(&mut session).unwrap();
        let second = resolver.resolve(&mut session).unwrap();
        assert_eq!(first, second);
        assert!(session.seed().is_some());
    }

    #[test]
    fn test_distinct_sessions_get_distinct_identities() {
        let mut a = SessionState::new(100, 0.0);
        let mut b = SessionState::new(100, 0.0);
        let resolver = SessionIdentityResolver;
        assert_ne!(resolver.resolve(&mut a), resolver.resolve(&mut b));
    }
}
