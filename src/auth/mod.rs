pub mod jwt;
pub mod password;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::Role, state::AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub name: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Single policy check replacing per-route role closures: the actor's role
/// must be one of `allowed`.
pub fn require_role(user: &AuthenticatedUser, allowed: &[Role]) -> Result<Role, AppError> {
    user.role()
        .filter(|role| allowed.contains(role))
        .ok_or_else(|| AppError::forbidden("access denied"))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized())?;

        let claims = state
            .jwt
            .verify_token(bearer.token())
            .map_err(|_| AppError::unauthorized())?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        })
    }
}
