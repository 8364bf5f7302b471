//! Bearer-token identity verification.
//!
//! Maps a bearer token to a user identity. The production deployment of the
//! original service delegated this to a hosted auth provider; here the seam
//! is a trait with a configuration-backed implementation.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait mapping a bearer token to a user identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a token to a user id. `None` means the token is unknown.
    async fn verify(&self, token: &str) -> Result<Option<String>>;
}

/// Verifier backed by the configured token table.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    /// Create a verifier over a token-to-user map.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<String>> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
