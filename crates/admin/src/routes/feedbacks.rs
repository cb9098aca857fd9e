//! Feedback triage board.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use halwa_core::{Feedback, FeedbackId, FeedbackSource, FeedbackStatus};

use super::{AdminChrome, MessageQuery, after_mutation, redirect_with};
use crate::db::FeedbackRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{FeedbackGroups, FeedbackSummary};
use crate::state::AppState;

const LIST_PATH: &str = "/feedbacks";

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Option in a card's status select.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

/// One feedback card.
#[derive(Debug, Clone)]
pub struct FeedbackView {
    pub id: i32,
    /// Empty for contact messages.
    pub stars: String,
    pub rating: Option<u8>,
    pub message: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_contact: bool,
    pub status: &'static str,
    pub statuses: Vec<StatusOption>,
    pub received_at: String,
}

impl From<&Feedback> for FeedbackView {
    fn from(feedback: &Feedback) -> Self {
        Self {
            id: feedback.id.as_i32(),
            stars: feedback.rating.map(|r| r.stars()).unwrap_or_default(),
            rating: feedback.rating.map(|r| r.value()),
            message: feedback.message.clone(),
            name: feedback.name.clone(),
            email: feedback.email.clone(),
            phone: feedback.phone.clone(),
            is_contact: feedback.source == FeedbackSource::Contact,
            status: feedback.status.as_str(),
            statuses: FeedbackStatus::ALL
                .into_iter()
                .map(|status| StatusOption {
                    value: status.as_str(),
                    selected: status == feedback.status,
                })
                .collect(),
            received_at: feedback.created_at.format("%-d %b %Y, %H:%M").to_string(),
        }
    }
}

/// A sentiment column.
#[derive(Debug, Clone)]
pub struct FeedbackColumn {
    pub title: &'static str,
    pub class: &'static str,
    pub entries: Vec<FeedbackView>,
}

fn column(title: &'static str, class: &'static str, entries: &[Feedback]) -> FeedbackColumn {
    FeedbackColumn {
        title,
        class,
        entries: entries.iter().map(FeedbackView::from).collect(),
    }
}

/// Feedback board template.
#[derive(Template, WebTemplate)]
#[template(path = "feedbacks/index.html")]
pub struct FeedbacksTemplate {
    pub chrome: AdminChrome,
    pub summary: FeedbackSummary,
    pub average: String,
    pub columns: Vec<FeedbackColumn>,
}

/// Reviews grouped by sentiment, with contact messages in their own column.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(messages): Query<MessageQuery>,
) -> Result<FeedbacksTemplate> {
    let feedbacks = FeedbackRepository::new(state.pool()).list().await?;
    let groups = FeedbackGroups::split(feedbacks);
    let summary = groups.summary();

    Ok(FeedbacksTemplate {
        chrome: AdminChrome::new(&admin, LIST_PATH, &messages),
        average: summary
            .average_rating
            .map_or_else(|| "-".to_string(), |avg| avg.to_string()),
        summary,
        columns: vec![
            column("Positive", "sentiment-positive", &groups.positive),
            column("Neutral", "sentiment-neutral", &groups.neutral),
            column("Negative", "sentiment-negative", &groups.negative),
            column("Contact messages", "sentiment-contact", &groups.contact),
        ],
    })
}

/// Mark feedback as new, reviewed or resolved.
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let Ok(status) = form.status.parse::<FeedbackStatus>() else {
        return Ok(redirect_with(LIST_PATH, "error", "invalid_status"));
    };

    let result = FeedbackRepository::new(state.pool())
        .set_status(FeedbackId::new(id), status)
        .await;
    after_mutation(LIST_PATH, result, "status_updated")
}

/// Delete a feedback entry.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let result = FeedbackRepository::new(state.pool())
        .delete(FeedbackId::new(id))
        .await;
    after_mutation(LIST_PATH, result, "deleted")
}
