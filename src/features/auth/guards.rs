//! Role guards for handlers.
//!
//! Roles, highest first: `admin`, `desk_officer`, `resident`. Each role
//! includes the permissions of the ones below it.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn current_user(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Confirm, cancel, complete and the generic status transition
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireDeskOfficer(user): RequireDeskOfficer) { ... }
/// ```
pub struct RequireDeskOfficer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireDeskOfficer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_desk_access() {
            return Err(AppError::Forbidden(
                "Desk officer access required".to_string(),
            ));
        }

        Ok(RequireDeskOfficer(user.clone()))
    }
}

/// Filing tickets, booking and reading
pub struct RequireResident(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireResident
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_resident_access() {
            return Err(AppError::Forbidden("Resident access required".to_string()));
        }

        Ok(RequireResident(user.clone()))
    }
}
