// Sqlauth - Credential data models
//
// The digest is private and never shown in Debug output. It is not
// reversible, but it is still offline-attackable material.

use chrono::{DateTime, Utc};
use std::fmt;

use super::StoreError;

/// One row of the credential table.
pub struct CredentialRecord {
    pub identity: String,
    digest: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn new(identity: String, digest: Vec<u8>, updated_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            digest,
            updated_at,
        }
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    pub fn into_digest(self) -> Vec<u8> {
        self.digest
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("identity", &self.identity)
            .field("digest", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// What a login boundary may tell the party submitting credentials.
///
/// Collapses an `authenticate` result into three outcomes whose messages
/// never reveal why a login failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    /// Wrong password or unknown identity.
    Rejected,
    /// Storage or verification fault. Retryable, and worth an operator's look.
    Unavailable,
}

impl AuthOutcome {
    /// `NotFound` maps to `Rejected`, not `Unavailable`. An unknown identity
    /// is ordinary input, and reporting it as a fault would tell the caller
    /// that the identity does not exist. Every other error is `Unavailable`.
    pub fn from_result(result: &Result<bool, StoreError>) -> Self {
        match result {
            Ok(true) => AuthOutcome::Authenticated,
            Ok(false) => AuthOutcome::Rejected,
            Err(e) if e.is_not_found() => AuthOutcome::Rejected,
            Err(_) => AuthOutcome::Unavailable,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthOutcome::Authenticated => "authenticated",
            AuthOutcome::Rejected => "authentication failed",
            AuthOutcome::Unavailable => "service unavailable, try again later",
        }
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashError;

    #[test]
    fn test_debug_redacts_digest() {
        let record =
            CredentialRecord::new("alice".into(), b"$2b$04$secretish".to_vec(), Utc::now());
        let debug = format!("{:?}", record);

        assert!(debug.contains("alice"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secretish"), "Debug must never print the digest");
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(AuthOutcome::from_result(&Ok(true)), AuthOutcome::Authenticated);
        assert_eq!(AuthOutcome::from_result(&Ok(false)), AuthOutcome::Rejected);
        assert_eq!(
            AuthOutcome::from_result(&Err(StoreError::NotFound("bob".into()))),
            AuthOutcome::Rejected
        );
        assert_eq!(
            AuthOutcome::from_result(&Err(StoreError::Verification(HashError::MalformedDigest(
                "bad".into()
            )))),
            AuthOutcome::Unavailable
        );
    }

    #[test]
    fn test_messages_do_not_leak_error_kind() {
        let not_found = AuthOutcome::from_result(&Err(StoreError::NotFound("bob".into())));
        let mismatch = AuthOutcome::from_result(&Ok(false));

        assert_eq!(not_found.user_message(), mismatch.user_message());
        assert!(!not_found.to_string().contains("bob"));
        assert!(AuthOutcome::Authenticated.is_authenticated());
        assert!(!AuthOutcome::Unavailable.is_authenticated());
    }
}
