//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use halwa_core::{Offer, PopularItem};

use super::PageChrome;
use super::products::ProductView;
use crate::db::UserRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Products shown in the home page grid.
const FEATURED_COUNT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: PageChrome,
    pub offers: Vec<Offer>,
    pub popular: Vec<PopularItem>,
    pub featured: Vec<ProductView>,
    /// Set when the signed-in user is an admin.
    pub admin_url: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let pool = state.pool();
    let offers = state.catalog().offers(pool).await?;
    let popular = state.catalog().popular(pool).await?;
    let products = state.catalog().products(pool).await?;

    let is_admin = match &user {
        Some(current) => UserRepository::new(pool)
            .get_by_id(current.id)
            .await?
            .is_some_and(|u| u.role.is_admin()),
        None => false,
    };

    Ok(HomeTemplate {
        chrome: PageChrome::load(&session, user).await,
        offers: offers.as_ref().clone(),
        popular: popular.as_ref().clone(),
        featured: products
            .iter()
            .take(FEATURED_COUNT)
            .map(ProductView::from)
            .collect(),
        admin_url: is_admin.then(|| state.config().admin_url.clone()),
    })
}
