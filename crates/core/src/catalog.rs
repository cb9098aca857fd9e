//! Catalog and feedback records shared by the storefront and admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    FeedbackId, FeedbackStatus, OfferId, PopularItemId, ProductId, Rating, Rupees, Sentiment,
};

/// A product for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Rupees,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A promotional banner on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub description: String,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub image_url: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A "popular this week" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct PopularItem {
    pub id: PopularItemId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a feedback entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "feedback_source", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    /// The star-rating form.
    #[default]
    Review,
    /// The contact page.
    Contact,
}

/// Visitor feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Feedback {
    pub id: FeedbackId,
    /// Visitor's stars; `None` for contact messages.
    pub rating: Option<Rating>,
    pub message: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: FeedbackSource,
    pub status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// Positive, neutral or negative bucket. Contact messages have none.
    #[must_use]
    pub const fn sentiment(&self) -> Option<Sentiment> {
        match self.rating {
            Some(rating) => Some(rating.sentiment()),
            None => None,
        }
    }
}

/// Price buckets offered as catalog filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    /// Under ₹400.
    Low,
    /// ₹400 to ₹600 inclusive.
    Medium,
    /// Over ₹600.
    High,
}

impl PriceBand {
    /// Every band, cheapest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Whether `price` falls in this band.
    #[must_use]
    pub fn contains(self, price: Rupees) -> bool {
        let low = Rupees::from_whole(400);
        let high = Rupees::from_whole(600);
        match self {
            Self::Low => price < low,
            Self::Medium => price >= low && price <= high,
            Self::High => price > high,
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Filter label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Under ₹400",
            Self::Medium => "₹400 - ₹600",
            Self::High => "Above ₹600",
        }
    }
}

impl std::str::FromStr for PriceBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|band| band.as_str() == s)
            .ok_or_else(|| format!("invalid price band: {s}"))
    }
}

/// Catalog listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub price_band: Option<PriceBand>,
}

impl ProductFilter {
    /// Whether `product` passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| product.category.eq_ignore_ascii_case(category));
        let price_ok = self
            .price_band
            .is_none_or(|band| band.contains(product.price));
        category_ok && price_ok
    }

    /// Apply the filter to a listing, preserving order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, category: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(1),
            name: name.to_owned(),
            price: Rupees::from_whole(price),
            category: category.to_owned(),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_price_band_edges() {
        assert!(PriceBand::Low.contains(Rupees::from_whole(399)));
        assert!(!PriceBand::Low.contains(Rupees::from_whole(400)));
        assert!(PriceBand::Medium.contains(Rupees::from_whole(400)));
        assert!(PriceBand::Medium.contains(Rupees::from_whole(600)));
        assert!(!PriceBand::High.contains(Rupees::from_whole(600)));
        assert!(PriceBand::High.contains(Rupees::parse("600.5").unwrap()));
    }

    #[test]
    fn test_filter_by_category_and_band() {
        let items = vec![
            product("Tirunelveli Halwa", "halwa", 450),
            product("Milk Halwa", "halwa", 380),
            product("Mixture", "savories", 150),
        ];
        let filter = ProductFilter {
            category: Some("Halwa".to_owned()),
            price_band: Some("medium".parse().unwrap()),
        };
        let names: Vec<_> = filter.apply(items).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Tirunelveli Halwa"]);
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = ProductFilter::default();
        assert!(filter.matches(&product("Mixture", "savories", 150)));
    }
}
