//! Account route handlers (requires auth).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{MessageQuery, PageChrome};
use crate::error::{Result, set_sentry_user, user_message};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Profile display data.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub username: String,
    pub mobile: String,
    pub email: String,
    pub member_since: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            mobile: user.mobile.as_str().to_string(),
            email: user.email.as_str().to_string(),
            member_since: user.created_at.format("%B %Y").to_string(),
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub chrome: PageChrome,
    pub profile: ProfileView,
    pub profile_error: Option<String>,
    pub email_error: Option<String>,
    pub success: Option<&'static str>,
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub mobile: String,
}

/// Email change form data.
#[derive(Debug, Deserialize)]
pub struct EmailForm {
    pub email: String,
    pub current_password: String,
}

/// Display the account page.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<AccountIndexTemplate> {
    let account = AuthService::new(state.pool()).get_user(user.id).await?;

    Ok(AccountIndexTemplate {
        chrome: PageChrome::load(&session, Some(user)).await,
        profile: ProfileView::from(&account),
        profile_error: None,
        email_error: None,
        success: query.success_message(),
    })
}

/// Update username and mobile.
#[instrument(skip(state, session, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());
    match auth
        .update_profile(user.id, &form.username, &form.mobile)
        .await
    {
        Ok(updated) => {
            set_current_user(&session, &CurrentUser::from(&updated)).await?;
            Ok(Redirect::to("/account?success=profile_updated").into_response())
        }
        Err(e) if e.is_internal() => Err(e.into()),
        Err(e) => {
            let account = auth.get_user(user.id).await?;
            let mut profile = ProfileView::from(&account);
            profile.username = form.username;
            profile.mobile = form.mobile;
            Ok(AccountIndexTemplate {
                chrome: PageChrome::load(&session, Some(user)).await,
                profile,
                profile_error: Some(user_message(&e)),
                email_error: None,
                success: None,
            }
            .into_response())
        }
    }
}

/// Change the login email. Requires the current password.
#[instrument(skip(state, session, user, form))]
pub async fn change_email(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<EmailForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());
    match auth
        .change_email(user.id, &form.email, &form.current_password)
        .await
    {
        Ok(updated) => {
            set_current_user(&session, &CurrentUser::from(&updated)).await?;
            set_sentry_user(&updated.id, Some(updated.email.as_str()));
            tracing::info!(user_id = %updated.id, "Email changed");
            Ok(Redirect::to("/account?success=email_updated").into_response())
        }
        Err(e) if e.is_internal() => Err(e.into()),
        Err(e) => {
            let account = auth.get_user(user.id).await?;
            Ok(AccountIndexTemplate {
                chrome: PageChrome::load(&session, Some(user)).await,
                profile: ProfileView::from(&account),
                profile_error: None,
                email_error: Some(user_message(&e)),
                success: None,
            }
            .into_response())
        }
    }
}
