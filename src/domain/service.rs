use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

// region token codec

/// Signed compact token string handed to the client. Opaque on the wire;
/// the server keeps no copy of it.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

/// Decoded claims of a structurally valid, unexpired token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub subject: String,
    pub roles: HashSet<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: AccessToken,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// `Malformed` covers structural damage and signature mismatch alike and is
/// worth logging; `Expired` is routine and is not.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("token malformed or signature mismatch")]
    Malformed,
    #[error("token expired")]
    Expired,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue(
        &self,
        subject: &str,
        roles: &HashSet<String>,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError>;
    async fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError>;
}

// endregion

// region revocation store

#[derive(Debug, thiserror::Error)]
pub enum RevokeError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStats {
    pub revoked_tokens: usize,
    pub subject_watermarks: usize,
}

/// Tracks not-yet-expired tokens that were explicitly invalidated. Reads run
/// on the hot path of every authenticated request; writes are rare (logout,
/// forced revocation).
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Records the token's fingerprint. Idempotent; a repeat revoke only
    /// refreshes the timestamp. A failure must surface to the caller so a
    /// compromised token is never silently left valid.
    async fn revoke(&self, token: &str) -> Result<(), RevokeError>;

    /// Records a per-subject watermark: every token issued at or before now
    /// is dead, including tokens this process never saw.
    async fn revoke_all(&self, subject: &str) -> Result<(), RevokeError>;

    async fn is_revoked(
        &self,
        token: &str,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<bool, RevokeError>;

    /// Drops entries and watermarks older than the retention window and
    /// returns how many were removed. Runs from a dedicated background task,
    /// never inline with request handling.
    fn sweep(&self) -> usize;

    fn stats(&self) -> StoreStats;
}

// endregion

// region session service

/// Request-scoped projection of a verified, unrevoked token. Built by the
/// authentication middleware and dropped when the request completes.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub subject: String,
    pub roles: HashSet<String>,
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Principal {
            subject: claims.subject,
            roles: claims.roles,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token malformed")]
    TokenMalformed,
    #[error("token expired")]
    TokenExpired,
    #[error("token revoked")]
    TokenRevoked,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<VerifyError> for AuthError {
    fn from(error: VerifyError) -> Self {
        match error {
            VerifyError::Malformed => AuthError::TokenMalformed,
            VerifyError::Expired => AuthError::TokenExpired,
        }
    }
}

impl From<RevokeError> for AuthError {
    fn from(error: RevokeError) -> Self {
        match error {
            RevokeError::Unavailable(e) => AuthError::Store(e),
        }
    }
}

/// Collaborator-facing contract. Login/logout handlers in the surrounding
/// system call these; everything else consumes the `Principal` produced by
/// `authenticate`.
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn login(
        &self,
        subject: &str,
        roles: HashSet<String>,
    ) -> Result<IssuedToken, AuthError>;
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
    async fn logout_all(&self, subject: &str) -> Result<(), AuthError>;
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError>;
}

// endregion
