use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

/// Bearer token for calls to the external table API on behalf of one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Supplies the external API credential of a logged-in account.
pub trait CredentialProvider {
    fn credential_for(&self, owner_id: &str) -> Option<Credential>;
}

#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    tokens: RwLock<HashMap<String, Credential>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, owner_id: impl Into<String>, credential: Credential) {
        self.tokens.write().insert(owner_id.into(), credential);
    }

    pub fn revoke(&self, owner_id: &str) -> Option<Credential> {
        self.tokens.write().remove(owner_id)
    }
}

impl CredentialProvider for InMemoryCredentials {
    fn credential_for(&self, owner_id: &str) -> Option<Credential> {
        self.tokens.read().get(owner_id).cloned()
    }
}
