use crate::domain::{
    AuthError, IssuedToken, Principal, RevocationStore, SessionService, TokenCodec, VerifyError,
};
use crate::logger::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    revocation_store: Arc<dyn RevocationStore>,
    token_ttl: Duration,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        revocation_store: Arc<dyn RevocationStore>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            token_codec,
            revocation_store,
            token_ttl,
        }
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn login(
        &self,
        subject: &str,
        roles: HashSet<String>,
    ) -> Result<IssuedToken, AuthError> {
        let issued = self
            .token_codec
            .issue(subject, &roles, self.token_ttl)
            .await?;
        debug!(%subject, expires_at = %issued.expires_at, "session token issued");
        Ok(issued)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        match self.token_codec.verify(token).await {
            Ok(claims) => {
                if let Err(e) = self.revocation_store.revoke(token).await {
                    error!(subject = %claims.subject, error = %e, "failed to revoke session");
                    return Err(e.into());
                }
                info!(subject = %claims.subject, "session revoked");
                Ok(())
            }
            // an expired token is already dead; no bookkeeping required
            Err(VerifyError::Expired) => {
                debug!("logout of expired token, nothing to revoke");
                Ok(())
            }
            Err(VerifyError::Malformed) => {
                warn!("logout with malformed token");
                Err(AuthError::TokenMalformed)
            }
        }
    }

    async fn logout_all(&self, subject: &str) -> Result<(), AuthError> {
        if let Err(e) = self.revocation_store.revoke_all(subject).await {
            error!(%subject, error = %e, "failed to revoke subject sessions");
            return Err(e.into());
        }
        info!(%subject, "all sessions revoked");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.token_codec.verify(token).await?;
        if self
            .revocation_store
            .is_revoked(token, &claims.subject, claims.issued_at)
            .await?
        {
            return Err(AuthError::TokenRevoked);
        }
        Ok(Principal::from(claims))
    }
}
