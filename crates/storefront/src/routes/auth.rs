//! Authentication route handlers.
//!
//! Handles login, registration, logout and password reset against the
//! `users` table. Form failures re-render the page with the entered values;
//! completed actions redirect with a message code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};
use tracing::instrument;

use super::{MessageQuery, PageChrome};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user, user_message};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::services::auth::{AuthError, Registration};
use crate::state::AppState;

/// Cookie holding the email for "remember me".
pub const REMEMBERED_EMAIL_COOKIE: &str = "remembered_email";

/// How long the remembered email is kept.
const REMEMBER_DAYS: i64 = 30;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present when ticked.
    pub remember: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

/// `?token=` on the reset link.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: PageChrome,
    pub email: String,
    pub remember: bool,
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub chrome: PageChrome,
    pub username: String,
    pub mobile: String,
    pub email: String,
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub chrome: PageChrome,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub chrome: PageChrome,
    pub token: String,
    pub error: Option<String>,
}

// =============================================================================
// Remembered email cookie
// =============================================================================

/// Read the remembered email from the request cookies.
fn remembered_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|cookie| cookie.name() == REMEMBERED_EMAIL_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|email| !email.is_empty())
}

/// `Set-Cookie` value that stores `email`, or clears the cookie when `None`.
fn remember_cookie(email: Option<&str>, secure: bool) -> String {
    let (value, max_age) = match email {
        Some(email) => (email.to_string(), Duration::days(REMEMBER_DAYS)),
        None => (String::new(), Duration::ZERO),
    };
    Cookie::build((REMEMBERED_EMAIL_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
        .to_string()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    let email = remembered_email(&headers);
    LoginTemplate {
        chrome: PageChrome::load(&session, None).await,
        remember: email.is_some(),
        email: email.unwrap_or_default(),
        error: query.error_message().map(str::to_string),
        success: query.success_message(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Admins are sent on to the admin console.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    let user = match auth.login(&form.email, &form.password).await {
        Ok(user) => user,
        Err(e) if e.is_internal() => return Err(e.into()),
        Err(e) => {
            tracing::debug!(error = %e, "Login rejected");
            return Ok(LoginTemplate {
                chrome: PageChrome::load(&session, None).await,
                email: form.email,
                remember: form.remember.is_some(),
                error: Some(user_message(&e)),
                success: None,
            }
            .into_response());
        }
    };

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = remember_cookie(
        form.remember.is_some().then_some(user.email.as_str()),
        state.config().is_https(),
    );
    let destination = if user.role.is_admin() {
        state.config().admin_url.clone()
    } else {
        "/account".to_string()
    };

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&destination)).into_response())
}

/// Handle logout. The cart is kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login?success=logged_out"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }
    RegisterTemplate {
        chrome: PageChrome::load(&session, None).await,
        username: String::new(),
        mobile: String::new(),
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle registration form submission.
///
/// New accounts are customers and are signed in straight away.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());
    let result = auth
        .register(Registration {
            username: &form.username,
            mobile: &form.mobile,
            email: &form.email,
            password: &form.password,
            password_confirm: &form.password_confirm,
        })
        .await;

    let user = match result {
        Ok(user) => user,
        Err(e) if e.is_internal() => return Err(e.into()),
        Err(e) => {
            return Ok(RegisterTemplate {
                chrome: PageChrome::load(&session, None).await,
                error: Some(user_message(&e)),
                username: form.username,
                mobile: form.mobile,
                email: form.email,
            }
            .into_response());
        }
    };

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Customer registered");

    Ok(Redirect::to("/account?success=registered").into_response())
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> ForgotPasswordTemplate {
    ForgotPasswordTemplate {
        chrome: PageChrome::load(&session, user).await,
        error: query.error_message(),
        success: query.success_message(),
    }
}

/// Handle forgot password form submission.
///
/// Responds identically whether or not the email has an account.
#[instrument(skip(state, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Redirect> {
    let auth = AuthService::new(state.pool());

    if let Some(reset) = auth.request_password_reset(&form.email).await? {
        let reset_url = state.config().absolute_url(&format!(
            "/auth/reset-password?token={}",
            urlencoding::encode(&reset.token)
        ));

        match state.email() {
            Some(email) => {
                if let Err(e) = email
                    .send_password_reset(reset.user.email.as_str(), &reset.user.username, &reset_url)
                    .await
                {
                    tracing::error!(error = %e, user_id = %reset.user.id, "Failed to send reset email");
                }
            }
            None => {
                tracing::info!(user_id = %reset.user.id, %reset_url, "Password reset link issued");
            }
        }
    }

    Ok(Redirect::to("/auth/forgot-password?success=reset_sent"))
}

/// Display the reset password page for a live token.
pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<TokenQuery>,
) -> Result<Response> {
    let Some(token) = query.token.filter(|t| !t.is_empty()) else {
        return Ok(Redirect::to("/auth/forgot-password?error=invalid_reset_link").into_response());
    };

    if !AuthService::new(state.pool())
        .reset_token_is_valid(&token)
        .await?
    {
        return Ok(Redirect::to("/auth/forgot-password?error=invalid_reset_link").into_response());
    }

    Ok(ResetPasswordTemplate {
        chrome: PageChrome::load(&session, None).await,
        token,
        error: None,
    }
    .into_response())
}

/// Handle reset password form submission.
#[instrument(skip(state, session, query, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<TokenQuery>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response> {
    let Some(token) = query.token.filter(|t| !t.is_empty()) else {
        return Ok(Redirect::to("/auth/forgot-password?error=invalid_reset_link").into_response());
    };

    let auth = AuthService::new(state.pool());
    match auth
        .reset_password(&token, &form.password, &form.password_confirm)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Password reset completed");
            Ok(Redirect::to("/auth/login?success=password_reset").into_response())
        }
        Err(AuthError::InvalidResetToken) => {
            Ok(Redirect::to("/auth/forgot-password?error=invalid_reset_link").into_response())
        }
        Err(e) if e.is_internal() => Err(AppError::from(e)),
        Err(e) => Ok(ResetPasswordTemplate {
            chrome: PageChrome::load(&session, None).await,
            token,
            error: Some(user_message(&e)),
        }
        .into_response()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_remembered_email_read_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("hd_session=abc; remembered_email=meena@example.in"),
        );
        assert_eq!(
            remembered_email(&headers).as_deref(),
            Some("meena@example.in")
        );
        assert!(remembered_email(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_remember_cookie_set_and_clear() {
        let set = remember_cookie(Some("meena@example.in"), true);
        assert!(set.starts_with("remembered_email=meena@example.in"));
        assert!(set.contains("Max-Age=2592000"));
        assert!(set.contains("Secure"));
        assert!(set.contains("HttpOnly"));

        let cleared = remember_cookie(None, false);
        assert!(cleared.contains("Max-Age=0"));
        assert!(!cleared.contains("Secure"));
    }
}
