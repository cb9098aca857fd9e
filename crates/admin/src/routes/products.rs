//! Product catalog management.
//!
//! Unlike offers and popular items, products are edited on their own page so
//! a rejected form is re-rendered with the entered values.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use halwa_core::{PriceError, Product, ProductId, Rupees};

use super::form::{MultipartForm, resolve_image};
use super::{AdminChrome, MessageQuery, after_mutation, flash_text, redirect_with};
use crate::db::{ProductInput, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

const LIST_PATH: &str = "/products";

/// Product table row.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
    pub updated_at: String,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
            updated_at: product.updated_at.format("%-d %b %Y").to_string(),
        }
    }
}

/// Values shown in the product form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormValues {
    pub name: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_input_value(),
            category: product.category.clone(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }
}

impl From<&MultipartForm> for ProductFormValues {
    fn from(form: &MultipartForm) -> Self {
        Self {
            name: form.text("name").to_string(),
            price: form.text("price").to_string(),
            category: form.text("category").to_string(),
            image_url: form.text("image_url").to_string(),
        }
    }
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub chrome: AdminChrome,
    pub products: Vec<ProductRowView>,
}

/// New/edit product template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub chrome: AdminChrome,
    pub heading: &'static str,
    pub action: String,
    pub values: ProductFormValues,
    pub errors: Vec<&'static str>,
}

impl ProductFormTemplate {
    fn new_product(admin: &CurrentAdmin, values: ProductFormValues, errors: Vec<&'static str>) -> Self {
        Self {
            chrome: AdminChrome::new(admin, LIST_PATH, &MessageQuery::default()),
            heading: "New product",
            action: LIST_PATH.to_string(),
            values,
            errors,
        }
    }

    fn edit_product(
        admin: &CurrentAdmin,
        id: i32,
        values: ProductFormValues,
        errors: Vec<&'static str>,
    ) -> Self {
        Self {
            chrome: AdminChrome::new(admin, LIST_PATH, &MessageQuery::default()),
            heading: "Edit product",
            action: format!("{LIST_PATH}/{id}"),
            values,
            errors,
        }
    }

    fn rejected(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

/// Check the text fields, collecting every problem.
///
/// # Errors
///
/// Returns the messages to list above the form.
pub fn product_input(form: &MultipartForm) -> std::result::Result<ProductInput, Vec<&'static str>> {
    let mut errors = Vec::new();

    let name = form.optional("name");
    if name.is_none() {
        errors.push("A name is required.");
    }

    let price = match Rupees::parse_storable(form.text("price")) {
        Ok(price) => Some(price),
        Err(PriceError::Negative) => {
            errors.push("Price cannot be negative.");
            None
        }
        Err(PriceError::NotANumber) => {
            errors.push("Price must be a number, e.g. 450 or 380.50.");
            None
        }
        Err(PriceError::TooManyDecimals) => {
            errors.push("Price can have at most two decimal places.");
            None
        }
        Err(PriceError::TooLarge) => {
            errors.push("Price cannot exceed ₹99,999,999.99.");
            None
        }
    };

    let category = form.optional("category");
    if category.is_none() {
        errors.push("A category is required.");
    }

    match (name, price, category) {
        (Some(name), Some(price), Some(category)) if errors.is_empty() => Ok(ProductInput {
            name,
            price,
            category,
            image_url: None,
        }),
        _ => Err(errors),
    }
}

/// Validate and upload. On failure returns the values to re-render with.
async fn read_product(
    state: &AppState,
    multipart: Multipart,
) -> Result<std::result::Result<ProductInput, (ProductFormValues, Vec<&'static str>)>> {
    let mut form = MultipartForm::read(multipart).await?;
    let values = ProductFormValues::from(&form);

    let mut input = match product_input(&form) {
        Ok(input) => input,
        Err(errors) => return Ok(Err((values, errors))),
    };
    match resolve_image(&mut form, state.store()).await {
        Ok(image_url) => input.image_url = image_url,
        Err(code) => {
            let message = flash_text(code).unwrap_or("The image could not be uploaded.");
            return Ok(Err((values, vec![message])));
        }
    }
    Ok(Ok(input))
}

/// List products, newest first.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(messages): Query<MessageQuery>,
) -> Result<ProductsTemplate> {
    let products = ProductRepository::new(state.pool()).list().await?;

    Ok(ProductsTemplate {
        chrome: AdminChrome::new(&admin, LIST_PATH, &messages),
        products: products.iter().map(ProductRowView::from).collect(),
    })
}

/// Blank product form.
pub async fn new_page(RequireAdminAuth(admin): RequireAdminAuth) -> ProductFormTemplate {
    ProductFormTemplate::new_product(&admin, ProductFormValues::default(), Vec::new())
}

/// Create a product.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let input = match read_product(&state, multipart).await? {
        Ok(input) => input,
        Err((values, errors)) => {
            return Ok(ProductFormTemplate::new_product(&admin, values, errors).rejected());
        }
    };

    let id = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %id, name = %input.name, "Product created");
    Ok(redirect_with(LIST_PATH, "success", "created").into_response())
}

/// Product form filled with the stored values.
#[instrument(skip(admin, state))]
pub async fn edit_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ProductFormTemplate> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductFormTemplate::edit_product(
        &admin,
        id,
        ProductFormValues::from(&product),
        Vec::new(),
    ))
}

/// Save an edited product.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response> {
    let input = match read_product(&state, multipart).await? {
        Ok(input) => input,
        Err((values, errors)) => {
            return Ok(ProductFormTemplate::edit_product(&admin, id, values, errors).rejected());
        }
    };

    let result = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await;
    if let Err(RepositoryError::NotFound) = result {
        tracing::warn!(product_id = id, "Edited product no longer exists");
    }
    Ok(after_mutation(LIST_PATH, result, "updated")?.into_response())
}

/// Delete a product. Past orders keep their copied line items.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let result = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await;
    after_mutation(LIST_PATH, result, "deleted")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_lists_every_problem() {
        let errors = product_input(&MultipartForm::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&"A name is required."));
        assert!(errors.contains(&"A category is required."));
    }

    fn form_with_price(price: &str) -> MultipartForm {
        MultipartForm::with_fields(&[
            ("name", "Milk Halwa"),
            ("category", "Halwa"),
            ("price", price),
        ])
    }

    #[test]
    fn test_price_must_fit_money_column() {
        let too_big = product_input(&form_with_price("123456789012")).unwrap_err();
        assert_eq!(too_big, vec!["Price cannot exceed ₹99,999,999.99."]);

        let too_precise = product_input(&form_with_price("380.555")).unwrap_err();
        assert_eq!(too_precise, vec!["Price can have at most two decimal places."]);

        let ok = product_input(&form_with_price("380.50")).unwrap();
        assert_eq!(ok.price, Rupees::parse("380.5").unwrap());
    }

    #[test]
    fn test_form_values_round_trip_stored_price() {
        let product = Product {
            id: ProductId::new(7),
            name: "Tirunelveli Halwa".to_string(),
            price: Rupees::parse("380.50").unwrap(),
            category: "Halwa".to_string(),
            image_url: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let values = ProductFormValues::from(&product);
        assert_eq!(values.price, "380.5");
        assert_eq!(values.image_url, "");
    }
}
