//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use halwa_core::{PriceBand, Product, ProductFilter, ProductId};

use super::PageChrome;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// A filter option rendered as a link or radio.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Listing filters from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub price: Option<String>,
}

impl ProductQuery {
    /// Turn the raw query into a filter. Blank and unknown values are ignored.
    #[must_use]
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
            price_band: self.price.as_deref().and_then(|p| p.parse().ok()),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductView>,
    pub categories: Vec<FilterOption>,
    pub price_bands: Vec<FilterOption>,
    pub filtered: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: PageChrome,
    pub product: ProductView,
}

/// Distinct categories in first-seen order.
fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&product.category))
        {
            seen.push(product.category.clone());
        }
    }
    seen
}

/// Display the product listing.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ProductQuery>,
) -> Result<ProductsIndexTemplate> {
    let all = state.catalog().products(state.pool()).await?;
    let filter = query.to_filter();

    let category_options = categories(&all)
        .into_iter()
        .map(|category| FilterOption {
            selected: filter
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(&category)),
            label: category.clone(),
            value: category,
        })
        .collect();

    let price_bands = PriceBand::ALL
        .into_iter()
        .map(|band| FilterOption {
            value: band.as_str().to_owned(),
            label: band.label().to_owned(),
            selected: filter.price_band == Some(band),
        })
        .collect();

    let products = all
        .iter()
        .filter(|p| filter.matches(p))
        .map(ProductView::from)
        .collect();

    Ok(ProductsIndexTemplate {
        chrome: PageChrome::load(&session, user).await,
        products,
        categories: category_options,
        price_bands,
        filtered: filter != ProductFilter::default(),
    })
}

/// Display a product detail page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
) -> Result<ProductShowTemplate> {
    let product = state
        .catalog()
        .product(state.pool(), ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        chrome: PageChrome::load(&session, user).await,
        product: ProductView::from(&product),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_filter_ignores_blank_and_unknown() {
        let query = ProductQuery {
            category: Some("  ".to_owned()),
            price: Some("cheap".to_owned()),
        };
        assert_eq!(query.to_filter(), ProductFilter::default());

        let query = ProductQuery {
            category: Some("Halwa".to_owned()),
            price: Some("high".to_owned()),
        };
        let filter = query.to_filter();
        assert_eq!(filter.category.as_deref(), Some("Halwa"));
        assert_eq!(filter.price_band, Some(PriceBand::High));
    }
}
