use super::error::*;
use crate::domain::{IssuedToken, Principal, RevocationStore, SessionService, StoreStats};
use crate::logger::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Credential verification happens in the excluded user-management module;
/// by the time this endpoint is called the subject is already authenticated.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub subject: String,
    #[serde(default)]
    pub roles: HashSet<String>,
}

pub async fn login(
    body: LoginRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let issued: IssuedToken = session_service
        .login(&body.subject, body.roles)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(issued)))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse;

pub async fn logout(
    token: String,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    session_service
        .logout(&token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutAllRequest {
    pub subject: String,
}

pub async fn logout_all(
    body: LogoutAllRequest,
    principal: Principal,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(operator = %principal.subject, subject = %body.subject, "forced logout requested");

    session_service
        .logout_all(&body.subject)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub principal: Option<Principal>,
}

pub async fn current_session(
    principal: Option<Principal>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let response = SessionResponse {
        authenticated: principal.is_some(),
        principal,
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

pub async fn session_stats(
    principal: Principal,
    revocation_store: Arc<dyn RevocationStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    debug!(operator = %principal.subject, "revocation stats requested");

    let stats: StoreStats = revocation_store.stats();
    Ok(warp::reply::json(&ApiResponse::ok(stats)))
}
