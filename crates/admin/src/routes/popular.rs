//! "Popular this week" cards.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::Redirect,
};
use tracing::instrument;

use halwa_core::{PopularItem, PopularItemId};

use super::form::{MultipartForm, resolve_image};
use super::{AdminChrome, MessageQuery, after_mutation, redirect_with};
use crate::db::{PopularInput, PopularRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const LIST_PATH: &str = "/popular";

/// Card with its inline edit form.
#[derive(Debug, Clone)]
pub struct PopularView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

impl From<&PopularItem> for PopularView {
    fn from(item: &PopularItem) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Popular items template.
#[derive(Template, WebTemplate)]
#[template(path = "popular/index.html")]
pub struct PopularTemplate {
    pub chrome: AdminChrome,
    pub items: Vec<PopularView>,
}

async fn read_item(
    state: &AppState,
    multipart: Multipart,
) -> Result<std::result::Result<PopularInput, &'static str>> {
    let mut form = MultipartForm::read(multipart).await?;
    let Some(name) = form.optional("name") else {
        return Ok(Err("missing_name"));
    };
    let description = form.text("description").to_string();

    Ok(resolve_image(&mut form, state.store())
        .await
        .map(|image_url| PopularInput {
            name,
            description,
            image_url,
        }))
}

/// List the cards.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(messages): Query<MessageQuery>,
) -> Result<PopularTemplate> {
    let items = PopularRepository::new(state.pool()).list().await?;

    Ok(PopularTemplate {
        chrome: AdminChrome::new(&admin, LIST_PATH, &messages),
        items: items.iter().map(PopularView::from).collect(),
    })
}

/// Add a card.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect> {
    let input = match read_item(&state, multipart).await? {
        Ok(input) => input,
        Err(code) => return Ok(redirect_with(LIST_PATH, "error", code)),
    };

    let id = PopularRepository::new(state.pool()).create(&input).await?;
    tracing::info!(popular_id = %id, "Popular item created");
    Ok(redirect_with(LIST_PATH, "success", "created"))
}

/// Edit a card.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Redirect> {
    let input = match read_item(&state, multipart).await? {
        Ok(input) => input,
        Err(code) => return Ok(redirect_with(LIST_PATH, "error", code)),
    };

    let result = PopularRepository::new(state.pool())
        .update(PopularItemId::new(id), &input)
        .await;
    after_mutation(LIST_PATH, result, "updated")
}

/// Remove a card.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let result = PopularRepository::new(state.pool())
        .delete(PopularItemId::new(id))
        .await;
    after_mutation(LIST_PATH, result, "deleted")
}
