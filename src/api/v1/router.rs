use super::error::*;
use super::handler;
use crate::domain::{AuthError, Principal, SessionService};
use crate::logger::*;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::login);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_bearer_token())
        .and(with(server.session_service.clone()))
        .and_then(handler::logout);

    let logout_all = warp::post()
        .and(warp::path("logout_all"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_authentication(server.session_service.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::logout_all);

    let session = warp::get()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(with_principal(server.session_service.clone()))
        .and_then(handler::current_session);

    let session_stats = warp::get()
        .and(warp::path("session_stats"))
        .and(warp::path::end())
        .and(with_authentication(server.session_service.clone()))
        .and(with(server.revocation_store.clone()))
        .and_then(handler::session_stats);

    login
        .or(logout)
        .or(logout_all)
        .or(session)
        .or(session_stats)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Extracts the raw bearer token for endpoints that operate on the token
/// itself (logout). Missing or non-bearer headers are an error here, unlike
/// the fail-open `with_principal` path.
fn with_bearer_token() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        |header: String| async move {
            match header.strip_prefix("Bearer ") {
                Some(token) => Ok(token.to_owned()),
                None => Err(reject::custom(ApiErrorCode::InvalidToken)),
            }
        },
    )
}

/// Per-request authentication. Verifies the bearer token and consults the
/// revocation store; every failure path degrades to an anonymous request
/// rather than rejecting it. Authorization on protected routes decides what
/// anonymous is allowed to do.
pub fn with_principal(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (Option<Principal>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        move |header: Option<String>| {
            let session_service = session_service.clone();
            async move {
                let token = match header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
                    Some(token) => token.to_owned(),
                    None => return Ok::<Option<Principal>, warp::Rejection>(None),
                };
                match session_service.authenticate(&token).await {
                    Ok(principal) => Ok(Some(principal)),
                    Err(AuthError::TokenMalformed) => {
                        warn!("malformed bearer token, request continues as anonymous");
                        Ok(None)
                    }
                    Err(AuthError::TokenExpired) | Err(AuthError::TokenRevoked) => {
                        debug!("bearer token no longer valid, request continues as anonymous");
                        Ok(None)
                    }
                    Err(error) => {
                        error!(%error, "token verification failed, clearing request principal");
                        Ok(None)
                    }
                }
            }
        },
    )
}

/// Downstream authorization for protected routes: anonymous requests are
/// rejected with 401 here, not in `with_principal`.
pub fn with_authentication(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (Principal,), Error = warp::Rejection> + Clone {
    with_principal(session_service).and_then(|principal: Option<Principal>| async move {
        principal.ok_or_else(|| reject::custom(ApiErrorCode::AuthenticationRequired))
    })
}
