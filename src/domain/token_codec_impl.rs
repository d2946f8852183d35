use crate::domain::{AccessToken, AuthError, IssuedToken, TokenClaims, TokenCodec, VerifyError};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    roles: HashSet<String>,
    iat: i64,
    exp: i64,
    iss: String,
    aud: String,
}

fn encode_token(
    subject: &str,
    roles: &HashSet<String>,
    ttl: Duration,
    cfg: &TokenConfig,
) -> Result<IssuedToken, AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + ttl;
    let claims = Claims {
        sub: subject.to_owned(),
        roles: roles.clone(),
        iat: iat_dt.timestamp(),
        exp: exp_dt.timestamp(),
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.signing_key),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(IssuedToken {
        token: AccessToken(token),
        issued_at: iat_dt,
        expires_at: exp_dt,
    })
}

fn decode_token(token: &str, cfg: &TokenConfig) -> Result<TokenClaims, VerifyError> {
    let mut v = Validation::new(Algorithm::HS256);
    // zero leeway: `exp` is exact, a token is expired the second it says so
    v.leeway = 0;
    v.validate_exp = true;
    v.set_audience(&[cfg.audience.clone()]);
    v.set_issuer(&[cfg.issuer.clone()]);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(&cfg.signing_key), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            _ => VerifyError::Malformed,
        })?;
    let claims = data.claims;
    let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(VerifyError::Malformed)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(VerifyError::Malformed)?;
    Ok(TokenClaims {
        subject: claims.sub,
        roles: claims.roles,
        issued_at,
        expires_at,
    })
}

/// Stateless HS256 codec. Holds only the signing material, loaded once at
/// startup; safe to share across any number of request tasks.
pub struct Hs256TokenCodec {
    cfg: TokenConfig,
}

impl Hs256TokenCodec {
    pub fn new(cfg: TokenConfig) -> Self {
        Hs256TokenCodec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for Hs256TokenCodec {
    async fn issue(
        &self,
        subject: &str,
        roles: &HashSet<String>,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        encode_token(subject, roles, ttl, &self.cfg)
    }

    async fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        decode_token(token, &self.cfg)
    }
}
