//! # Authentication Module
//!
//! Identity is established by the upstream authentication service, which
//! forwards the verified user as two headers: `x-user-id` (a UUID) and
//! `x-user-email`. This module turns those headers into an [`Identity`].
//!
//! [`Authenticated`] rejects requests without an identity with 401;
//! [`MaybeAuthenticated`] lets anonymous requests through. Both reject
//! malformed headers and both record the identity in the account directory
//! so later claims can snapshot `has_account`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use huddle_core::{
    errors::{HuddleError, HuddleResult},
    models::identity::Identity,
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> HuddleResult<Option<&'a str>> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| HuddleError::Authentication(format!("Malformed {} header", name))),
    }
}

/// Reads the identity headers.
///
/// Returns `Ok(None)` when neither header is present and an authentication
/// error when only one is, or when the user id is not a UUID.
pub fn identity_from_headers(headers: &HeaderMap) -> HuddleResult<Option<Identity>> {
    let user_id = header(headers, USER_ID_HEADER)?;
    let email = header(headers, USER_EMAIL_HEADER)?;

    match (user_id, email) {
        (None, None) => Ok(None),
        (Some(user_id), Some(email)) => {
            let user_id = Uuid::parse_str(user_id).map_err(|_| {
                HuddleError::Authentication(format!("Malformed {} header", USER_ID_HEADER))
            })?;
            Ok(Some(Identity::new(user_id, email.to_lowercase())))
        }
        _ => Err(HuddleError::Authentication(
            "Incomplete identity headers".to_string(),
        )),
    }
}

async fn resolve(parts: &Parts, state: &Arc<ApiState>) -> HuddleResult<Option<Identity>> {
    let identity = identity_from_headers(&parts.headers)?;
    if let Some(identity) = &identity {
        state.store.remember_account(identity).await?;
    }
    Ok(identity)
}

/// A request made by a verified user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = resolve(parts, state)
            .await?
            .ok_or_else(|| HuddleError::Authentication("Authentication required".to_string()))?;
        Ok(Authenticated(identity))
    }
}

/// A request that may or may not carry a verified user.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for MaybeAuthenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthenticated(resolve(parts, state).await?))
    }
}
