//! Feedback and contact form handlers.
//!
//! Both forms land in the `feedbacks` table. Contact messages carry no star
//! rating and are stored with source `contact`.

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

use halwa_core::{Email, FeedbackSource, MobileNumber, Rating};

use super::PageChrome;
use crate::db::FeedbackRepository;
use crate::db::feedbacks::NewFeedback;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Longest accepted message.
const MAX_MESSAGE_CHARS: usize = 2000;

/// `?sent=1` after a successful submission.
#[derive(Debug, Default, Deserialize)]
pub struct SentQuery {
    pub sent: Option<String>,
}

/// Feedback form data.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub message: String,
}

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

/// Star option for the rating radios.
#[derive(Debug, Clone)]
pub struct StarOption {
    pub value: i32,
    pub checked: bool,
}

/// Feedback page template.
#[derive(Template, WebTemplate)]
#[template(path = "feedback.html")]
pub struct FeedbackTemplate {
    pub chrome: PageChrome,
    pub stars: Vec<StarOption>,
    pub message: String,
    pub error: Option<String>,
    pub sent: bool,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: PageChrome,
    pub form: ContactForm,
    pub errors: Vec<(&'static str, &'static str)>,
    pub sent: bool,
}

impl ContactTemplate {
    /// Inline error for one form field.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| *message)
    }
}

fn stars(selected: Option<i32>) -> Vec<StarOption> {
    (Rating::MIN..=Rating::MAX)
        .rev()
        .map(|value| StarOption {
            value,
            checked: selected == Some(value),
        })
        .collect()
}

/// Trimmed, non-empty message within the length limit.
fn clean_message(message: &str) -> Option<String> {
    let message = message.trim();
    (!message.is_empty() && message.chars().count() <= MAX_MESSAGE_CHARS)
        .then(|| message.to_string())
}

/// Validate the feedback form.
///
/// # Errors
///
/// Returns the message to show above the form.
pub fn validate_feedback(form: &FeedbackForm) -> std::result::Result<NewFeedback, &'static str> {
    let rating = form
        .rating
        .trim()
        .parse::<i32>()
        .ok()
        .and_then(|r| Rating::new(r).ok())
        .ok_or("Please choose a rating from 1 to 5 stars")?;
    let message = clean_message(&form.message).ok_or("Please tell us a little about your experience")?;

    Ok(NewFeedback {
        rating: Some(rating),
        message,
        name: None,
        email: None,
        phone: None,
        source: FeedbackSource::Review,
    })
}

/// Validate the contact form, collecting every field error.
///
/// # Errors
///
/// Returns `(field, message)` pairs.
pub fn validate_contact(
    form: &ContactForm,
) -> std::result::Result<NewFeedback, Vec<(&'static str, &'static str)>> {
    let mut errors = Vec::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.push(("name", "This field is required"));
    }
    let email = Email::parse(&form.email)
        .map_err(|_| errors.push(("email", "Please enter a valid email address")))
        .ok();
    let phone = form.phone.trim();
    let phone = if phone.is_empty() {
        None
    } else {
        MobileNumber::parse_indian(phone)
            .map_err(|_| errors.push(("phone", "Please enter a valid 10-digit phone number")))
            .ok()
    };
    let message = clean_message(&form.message);
    if message.is_none() {
        errors.push(("message", "This field is required"));
    }

    match (email, message) {
        (Some(email), Some(message)) if errors.is_empty() => Ok(NewFeedback {
            rating: None,
            message,
            name: Some(name.to_string()),
            email: Some(email.into_inner()),
            phone: phone.map(|p| p.as_str().to_string()),
            source: FeedbackSource::Contact,
        }),
        _ => Err(errors),
    }
}

/// Display the feedback form.
pub async fn feedback_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<SentQuery>,
) -> FeedbackTemplate {
    FeedbackTemplate {
        chrome: PageChrome::load(&session, user).await,
        stars: stars(None),
        message: String::new(),
        error: None,
        sent: query.sent.is_some(),
    }
}

/// Store a star rating and message.
#[instrument(skip(state, session, user, form))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<FeedbackForm>,
) -> Result<Response> {
    let feedback = match validate_feedback(&form) {
        Ok(feedback) => feedback,
        Err(message) => {
            return Ok(FeedbackTemplate {
                chrome: PageChrome::load(&session, user).await,
                stars: stars(form.rating.trim().parse().ok()),
                message: form.message,
                error: Some(message.to_string()),
                sent: false,
            }
            .into_response());
        }
    };

    let id = FeedbackRepository::new(state.pool())
        .create(&feedback)
        .await?;
    tracing::info!(feedback_id = %id, rating = ?feedback.rating.map(Rating::value), "Feedback received");

    Ok(Redirect::to("/feedback?sent=1").into_response())
}

/// Display the contact form.
pub async fn contact_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<SentQuery>,
) -> ContactTemplate {
    let form = ContactForm {
        name: user.as_ref().map(|u| u.username.clone()).unwrap_or_default(),
        email: user
            .as_ref()
            .map(|u| u.email.as_str().to_string())
            .unwrap_or_default(),
        ..ContactForm::default()
    };
    ContactTemplate {
        chrome: PageChrome::load(&session, user).await,
        form,
        errors: Vec::new(),
        sent: query.sent.is_some(),
    }
}

/// Store a contact message.
#[instrument(skip(state, session, user, form))]
pub async fn submit_contact(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let feedback = match validate_contact(&form) {
        Ok(feedback) => feedback,
        Err(errors) => {
            return Ok(ContactTemplate {
                chrome: PageChrome::load(&session, user).await,
                form,
                errors,
                sent: false,
            }
            .into_response());
        }
    };

    let id = FeedbackRepository::new(state.pool())
        .create(&feedback)
        .await?;
    tracing::info!(feedback_id = %id, "Contact message received");

    Ok(Redirect::to("/contact?sent=1").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_requires_rating_and_message() {
        let form = FeedbackForm {
            rating: "0".to_string(),
            message: "Lovely".to_string(),
        };
        assert!(validate_feedback(&form).is_err());

        let form = FeedbackForm {
            rating: "5".to_string(),
            message: "   ".to_string(),
        };
        assert!(validate_feedback(&form).is_err());

        let form = FeedbackForm {
            rating: "4".to_string(),
            message: " Soft and fresh ".to_string(),
        };
        let feedback = validate_feedback(&form).unwrap();
        assert_eq!(feedback.rating.map(Rating::value), Some(4));
        assert_eq!(feedback.message, "Soft and fresh");
        assert_eq!(feedback.source, FeedbackSource::Review);
    }

    #[test]
    fn test_contact_phone_is_optional_but_checked() {
        let mut form = ContactForm {
            name: "Meena".to_string(),
            email: "meena@example.in".to_string(),
            phone: String::new(),
            message: "Do you ship to Dubai?".to_string(),
        };
        let feedback = validate_contact(&form).unwrap();
        assert_eq!(feedback.source, FeedbackSource::Contact);
        assert!(feedback.rating.is_none());
        assert!(feedback.phone.is_none());

        form.phone = "5123456789".to_string();
        let errors = validate_contact(&form).unwrap_err();
        assert_eq!(errors, vec![("phone", "Please enter a valid 10-digit phone number")]);

        form.phone = "9876543210".to_string();
        assert_eq!(validate_contact(&form).unwrap().phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_contact_collects_all_errors() {
        let errors = validate_contact(&ContactForm::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, vec!["name", "email", "message"]);
    }
}
