//! Home page offer banners.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::Redirect,
};
use tracing::instrument;

use halwa_core::{Offer, OfferId};

use super::form::{MultipartForm, resolve_image};
use super::{AdminChrome, MessageQuery, after_mutation, redirect_with};
use crate::db::{OfferInput, OfferRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const LIST_PATH: &str = "/offers";

/// Offer card with its inline edit form.
#[derive(Debug, Clone)]
pub struct OfferView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub button_link: String,
    pub image_url: String,
    pub enabled: bool,
    pub updated_at: String,
}

impl From<&Offer> for OfferView {
    fn from(offer: &Offer) -> Self {
        Self {
            id: offer.id.as_i32(),
            title: offer.title.clone(),
            description: offer.description.clone(),
            button_text: offer.button_text.clone().unwrap_or_default(),
            button_link: offer.button_link.clone().unwrap_or_default(),
            image_url: offer.image_url.clone().unwrap_or_default(),
            enabled: offer.enabled,
            updated_at: offer.updated_at.format("%-d %b %Y").to_string(),
        }
    }
}

/// Offer list template.
#[derive(Template, WebTemplate)]
#[template(path = "offers/index.html")]
pub struct OffersTemplate {
    pub chrome: AdminChrome,
    pub offers: Vec<OfferView>,
}

/// Site-relative paths and absolute http(s) URLs.
fn is_valid_link(link: &str) -> bool {
    (link.starts_with('/') && !link.starts_with("//"))
        || link.starts_with("https://")
        || link.starts_with("http://")
}

/// Read the text fields of an offer form. The image is resolved separately.
///
/// # Errors
///
/// Returns a flash code naming the first invalid field.
pub fn offer_input(form: &MultipartForm) -> std::result::Result<OfferInput, &'static str> {
    let title = form.optional("title").ok_or("missing_title")?;
    let button_link = form.optional("button_link");
    if button_link.as_deref().is_some_and(|link| !is_valid_link(link)) {
        return Err("invalid_link");
    }

    Ok(OfferInput {
        title,
        description: form.text("description").to_string(),
        button_text: form.optional("button_text"),
        button_link,
        image_url: None,
        enabled: form.checked("enabled"),
    })
}

/// Validate, upload the image if any, and return the record to write.
async fn read_offer(
    state: &AppState,
    multipart: Multipart,
) -> Result<std::result::Result<OfferInput, &'static str>> {
    let mut form = MultipartForm::read(multipart).await?;
    let mut input = match offer_input(&form) {
        Ok(input) => input,
        Err(code) => return Ok(Err(code)),
    };
    match resolve_image(&mut form, state.store()).await {
        Ok(image_url) => input.image_url = image_url,
        Err(code) => return Ok(Err(code)),
    }
    Ok(Ok(input))
}

/// List every offer.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(messages): Query<MessageQuery>,
) -> Result<OffersTemplate> {
    let offers = OfferRepository::new(state.pool()).list().await?;

    Ok(OffersTemplate {
        chrome: AdminChrome::new(&admin, LIST_PATH, &messages),
        offers: offers.iter().map(OfferView::from).collect(),
    })
}

/// Create an offer.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect> {
    let input = match read_offer(&state, multipart).await? {
        Ok(input) => input,
        Err(code) => return Ok(redirect_with(LIST_PATH, "error", code)),
    };

    let id = OfferRepository::new(state.pool()).create(&input).await?;
    tracing::info!(offer_id = %id, "Offer created");
    Ok(redirect_with(LIST_PATH, "success", "created"))
}

/// Update an offer.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Redirect> {
    let input = match read_offer(&state, multipart).await? {
        Ok(input) => input,
        Err(code) => return Ok(redirect_with(LIST_PATH, "error", code)),
    };

    let result = OfferRepository::new(state.pool())
        .update(OfferId::new(id), &input)
        .await;
    after_mutation(LIST_PATH, result, "updated")
}

/// Show or hide an offer on the home page.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn toggle(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let result = OfferRepository::new(state.pool())
        .toggle(OfferId::new(id))
        .await
        .map(|enabled| tracing::info!(offer_id = id, enabled, "Offer toggled"));
    after_mutation(LIST_PATH, result, "toggled")
}

/// Delete an offer.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let result = OfferRepository::new(state.pool())
        .delete(OfferId::new(id))
        .await;
    after_mutation(LIST_PATH, result, "deleted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_must_be_local_or_http() {
        assert!(is_valid_link("/products?category=Halwa"));
        assert!(is_valid_link("https://halwadelights.in/diwali"));
        assert!(!is_valid_link("//evil.example.com"));
        assert!(!is_valid_link("javascript:alert(1)"));
        assert!(!is_valid_link("products"));
    }

    #[test]
    fn test_blank_form_needs_title() {
        assert_eq!(offer_input(&MultipartForm::default()), Err("missing_title"));
    }
}
