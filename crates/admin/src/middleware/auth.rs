//! Authentication extractors for admin.
//!
//! The session says who is signed in; the `users` table says whether they
//! are still an admin. [`RequireAdminAuth`] checks both on every request.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in admin whose role is still `admin`.
///
/// - No session: redirect to `/auth/login` (401 for `/api/` paths).
/// - Role revoked or account gone: the session is flushed and the request
///   redirected to `/auth/login?error=forbidden` (403 for `/api/` paths).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Why [`RequireAdminAuth`] turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Not signed in (HTML).
    RedirectToLogin,
    /// Not signed in (API).
    Unauthorized,
    /// Signed in without the admin role (HTML).
    RedirectForbidden,
    /// Signed in without the admin role (API).
    Forbidden,
    /// The role could not be read.
    Internal,
}

impl AdminAuthRejection {
    fn for_path(path: &str, api: Self, html: Self) -> Self {
        if is_api_path(path) { api } else { html }
    }
}

fn is_api_path(path: &str) -> bool {
    path.starts_with("/api/")
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::RedirectForbidden => Redirect::to("/auth/login?error=forbidden").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required").into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_owned();

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Internal)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                AdminAuthRejection::for_path(
                    &path,
                    AdminAuthRejection::Unauthorized,
                    AdminAuthRejection::RedirectToLogin,
                )
            })?;

        let role = UserRepository::new(state.pool())
            .get_role(admin.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %admin.id, "Role lookup failed");
                AdminAuthRejection::Internal
            })?;

        if role.is_some_and(|role| role.is_admin()) {
            set_sentry_user(&admin.id, Some(admin.email.as_str()));
            return Ok(Self(admin));
        }

        tracing::warn!(user_id = %admin.id, "Admin role revoked; signing out");
        if let Err(e) = session.flush().await {
            tracing::error!(error = %e, "Failed to flush session");
        }
        clear_sentry_user();

        Err(AdminAuthRejection::for_path(
            &path,
            AdminAuthRejection::Forbidden,
            AdminAuthRejection::RedirectForbidden,
        ))
    }
}

/// Extractor that optionally gets the admin stored in the session.
///
/// Does not consult the database; use it only to decide whether to show the
/// login page.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Store the signed-in admin, cycling the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop the whole admin session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_api_paths_get_status_codes() {
        assert!(is_api_path("/api/stats"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/orders"));
        assert_eq!(
            AdminAuthRejection::for_path(
                "/api/stats",
                AdminAuthRejection::Forbidden,
                AdminAuthRejection::RedirectForbidden
            ),
            AdminAuthRejection::Forbidden
        );
    }

    #[test]
    fn test_rejection_responses() {
        let response = AdminAuthRejection::RedirectForbidden.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(LOCATION).map(|v| v.to_str().ok()),
            Some(Some("/auth/login?error=forbidden"))
        );

        assert_eq!(
            AdminAuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AdminAuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
