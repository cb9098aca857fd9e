//! Admin login and logout.
//!
//! Staff sign in with the same email and password they use on the
//! storefront. Only accounts whose role is `admin` get a session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::MessageQuery;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Display the login page.
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        email: String::new(),
        error: query.error_message(),
        success: query.success_message(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AdminAuthService::new(state.pool());

    let user = match auth.login(&form.email, &form.password).await {
        Ok(user) => user,
        Err(AdminAuthError::Repository(e)) => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Admin login rejected");
            let status = match e {
                AdminAuthError::NotAdmin => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            };
            let page = LoginTemplate {
                email: form.email,
                error: Some(e.user_message()),
                success: None,
            };
            return Ok((status, page).into_response());
        }
    };

    let admin = CurrentAdmin::from(&user);
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));
    tracing::info!(user_id = %admin.id, "Admin signed in");

    Ok(Redirect::to("/").into_response())
}

/// Sign out and return to the login page.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login?success=logged_out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_shows_forbidden_message() {
        let query = MessageQuery {
            error: Some("forbidden".to_string()),
            success: None,
        };
        let html = LoginTemplate {
            email: String::new(),
            error: query.error_message(),
            success: None,
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains("does not have admin access"));
        assert!(html.contains(r#"action="/auth/login""#));
    }
}
