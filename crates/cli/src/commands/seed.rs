//! Seed the catalog with sample products, offers and popular picks.
//!
//! The YAML file has three optional lists:
//!
//! ```yaml
//! products:
//!   - name: Milk Halwa
//!     price: "380"
//!     category: Halwa
//! offers:
//!   - title: Diwali Special Offers!
//!     button_text: Shop Now
//!     button_link: /products
//! popular:
//!   - name: Milk Halwa
//!     description: Soft, creamy and absolutely irresistible.
//! ```
//!
//! Rows whose name (title for offers) already exists are skipped, so the
//! command can be re-run safely.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use halwa_core::Rupees;

use super::{CommandError, connect};

/// Catalog shipped with the binary, used when no file is given.
const DEFAULT_CATALOG: &str = include_str!("../../seed/catalog.yaml");

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub offers: Vec<SeedOffer>,
    #[serde(default)]
    pub popular: Vec<SeedPopular>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub price: Rupees,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedOffer {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SeedPopular {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Inserted and skipped row counts for one table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCount {
    pub inserted: u64,
    pub skipped: u64,
}

impl SeedCount {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Parse a catalog from YAML text.
///
/// # Errors
///
/// Returns `CommandError::SeedParse` if the YAML does not describe a catalog.
pub fn parse_catalog(yaml: &str) -> Result<SeedCatalog, CommandError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Problems that would make a seeded catalog unusable.
#[must_use]
pub fn validate_catalog(catalog: &SeedCatalog) -> Vec<String> {
    let mut errors = Vec::new();

    check_names(
        "product",
        catalog.products.iter().map(|p| p.name.as_str()),
        &mut errors,
    );
    for product in &catalog.products {
        if product.category.trim().is_empty() {
            errors.push(format!("product '{}' has no category", product.name));
        }
        if let Err(e) = product.price.storable() {
            errors.push(format!("product '{}': {e}", product.name));
        }
    }
    check_names(
        "offer",
        catalog.offers.iter().map(|o| o.title.as_str()),
        &mut errors,
    );
    check_names(
        "popular item",
        catalog.popular.iter().map(|p| p.name.as_str()),
        &mut errors,
    );

    errors
}

fn check_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            errors.push(format!("{kind} with an empty name"));
        } else if !seen.insert(name.to_lowercase()) {
            errors.push(format!("duplicate {kind} '{name}'"));
        }
    }
}

/// Seed from `file`, or from the bundled catalog when `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the database is unreachable.
pub async fn run(file: Option<&Path>) -> Result<(), CommandError> {
    let yaml = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => {
            info!("Loading bundled sample catalog");
            DEFAULT_CATALOG.to_string()
        }
    };

    let catalog = parse_catalog(&yaml)?;
    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::SeedValidation(errors.len()));
    }

    let pool = connect().await?;

    let products = seed_products(&pool, &catalog.products).await?;
    let offers = seed_offers(&pool, &catalog.offers).await?;
    let popular = seed_popular(&pool, &catalog.popular).await?;

    info!("Seeding complete!");
    info!("  Products: {} inserted, {} skipped", products.inserted, products.skipped);
    info!("  Offers: {} inserted, {} skipped", offers.inserted, offers.skipped);
    info!("  Popular: {} inserted, {} skipped", popular.inserted, popular.skipped);

    Ok(())
}

async fn seed_products(pool: &PgPool, products: &[SeedProduct]) -> Result<SeedCount, CommandError> {
    let mut count = SeedCount::default();
    for product in products {
        let result = sqlx::query(
            r"
            INSERT INTO products (name, price, category, image_url)
            SELECT $1, $2, $3, $4
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE lower(name) = lower($1))
            ",
        )
        .bind(product.name.trim())
        .bind(product.price)
        .bind(product.category.trim())
        .bind(product.image_url.as_deref())
        .execute(pool)
        .await?;
        count.record(result.rows_affected() > 0);
    }
    Ok(count)
}

async fn seed_offers(pool: &PgPool, offers: &[SeedOffer]) -> Result<SeedCount, CommandError> {
    let mut count = SeedCount::default();
    for offer in offers {
        let result = sqlx::query(
            r"
            INSERT INTO offers (title, description, button_text, button_link, image_url, enabled)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (SELECT 1 FROM offers WHERE lower(title) = lower($1))
            ",
        )
        .bind(offer.title.trim())
        .bind(&offer.description)
        .bind(offer.button_text.as_deref())
        .bind(offer.button_link.as_deref())
        .bind(offer.image_url.as_deref())
        .bind(offer.enabled)
        .execute(pool)
        .await?;
        count.record(result.rows_affected() > 0);
    }
    Ok(count)
}

async fn seed_popular(pool: &PgPool, items: &[SeedPopular]) -> Result<SeedCount, CommandError> {
    let mut count = SeedCount::default();
    for item in items {
        let result = sqlx::query(
            r"
            INSERT INTO popular_week (name, description, image_url)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM popular_week WHERE lower(name) = lower($1))
            ",
        )
        .bind(item.name.trim())
        .bind(&item.description)
        .bind(item.image_url.as_deref())
        .execute(pool)
        .await?;
        count.record(result.rows_affected() > 0);
    }
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog = parse_catalog(DEFAULT_CATALOG).unwrap();

        assert_eq!(catalog.products.len(), 6);
        assert!(validate_catalog(&catalog).is_empty());

        let milk = catalog.products.iter().find(|p| p.name == "Milk Halwa").unwrap();
        assert_eq!(milk.price, Rupees::from_whole(380));
        assert!(catalog.offers.iter().all(|o| o.enabled));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let catalog = parse_catalog("popular:\n  - name: Wheat Halwa\n").unwrap();
        assert!(catalog.products.is_empty());
        assert!(catalog.offers.is_empty());
        assert_eq!(catalog.popular[0].description, "");
    }

    #[test]
    fn test_duplicates_and_blank_names_are_reported() {
        let yaml = r#"
products:
  - name: Milk Halwa
    price: "380"
    category: Halwa
  - name: milk halwa
    price: "390"
    category: Halwa
  - name: " "
    price: "100"
    category: ""
"#;
        let errors = validate_catalog(&parse_catalog(yaml).unwrap());
        assert!(errors.contains(&"duplicate product 'milk halwa'".to_string()));
        assert!(errors.contains(&"product with an empty name".to_string()));
        assert!(errors.iter().any(|e| e.ends_with("has no category")));
    }

    #[test]
    fn test_price_must_fit_money_column() {
        let yaml = "products:\n  - name: Gold Halwa\n    price: \"450.125\"\n    category: Halwa\n";
        let errors = validate_catalog(&parse_catalog(yaml).unwrap());
        assert_eq!(
            errors,
            vec!["product 'Gold Halwa': price can have at most two decimal places".to_string()]
        );
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let yaml = "products:\n  - name: Bad\n    price: \"-5\"\n    category: Halwa\n";
        assert!(matches!(
            parse_catalog(yaml),
            Err(CommandError::SeedParse(_))
        ));
    }

    #[test]
    fn test_seed_count_records() {
        let mut count = SeedCount::default();
        count.record(true);
        count.record(false);
        count.record(true);
        assert_eq!(count, SeedCount { inserted: 2, skipped: 1 });
    }
}
