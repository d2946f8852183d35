use crate::domain::{RevocationStore, RevokeError, StoreStats};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Process-local revocation state. Entries are keyed by a SHA-256
/// fingerprint of the raw token, so the credential itself is never held in
/// memory. Both maps are sharded; readers never take a global lock and the
/// sweep only pins one shard at a time.
///
/// State does not survive a restart. A multi-instance deployment would need
/// a shared backend behind the same trait.
pub struct InMemoryRevocationStore {
    revoked: DashMap<String, DateTime<Utc>>,
    watermarks: DashMap<String, DateTime<Utc>>,
    retention: Duration,
}

impl InMemoryRevocationStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            revoked: DashMap::new(),
            watermarks: DashMap::new(),
            retention,
        }
    }

    fn fingerprint(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[async_trait::async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, token: &str) -> Result<(), RevokeError> {
        self.revoked.insert(Self::fingerprint(token), Utc::now());
        Ok(())
    }

    async fn revoke_all(&self, subject: &str) -> Result<(), RevokeError> {
        self.watermarks.insert(subject.to_owned(), Utc::now());
        Ok(())
    }

    async fn is_revoked(
        &self,
        token: &str,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<bool, RevokeError> {
        if self.revoked.contains_key(&Self::fingerprint(token)) {
            return Ok(true);
        }
        if let Some(mark) = self.watermarks.get(subject) {
            // claims carry second-resolution timestamps, so tokens minted in
            // the same second as the watermark count as issued at or before it
            if *mark >= issued_at {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn sweep(&self) -> usize {
        let cutoff = Utc::now() - self.retention;
        let before = self.revoked.len() + self.watermarks.len();
        self.revoked.retain(|_, revoked_at| *revoked_at > cutoff);
        self.watermarks.retain(|_, mark| *mark > cutoff);
        let after = self.revoked.len() + self.watermarks.len();
        before.saturating_sub(after)
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            revoked_tokens: self.revoked.len(),
            subject_watermarks: self.watermarks.len(),
        }
    }
}
