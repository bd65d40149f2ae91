//! Home page: the public product listing with filters.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::api::ProductQuery;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::NavContext;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Categories offered by the filter dropdown ("all" disables the filter).
pub const CATEGORIES: &[&str] = &[
    "all",
    "mobile",
    "laptop",
    "tablet",
    "smartwatch",
    "accessories",
    "headphones",
    "camera",
    "gaming",
    "monitor",
    "keyboard",
    "mouse",
    "speaker",
    "tv",
    "electronics",
    "home-appliances",
    "wearables",
    "storage-devices",
    "networking",
];

/// Upper bound of the price range slider.
const PRICE_CEILING: u32 = 50_000;

/// Listing filter state from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub sort: Option<String>,
}

impl ListingQuery {
    /// Convert to backend query parameters, dropping no-op filters the same
    /// way the listing UI does ("all" category, full price range).
    fn to_api_query(&self) -> ProductQuery {
        ProductQuery {
            category: self
                .category
                .clone()
                .filter(|c| !c.is_empty() && c != "all"),
            min_price: self.min_price.filter(|&min| min > 0),
            max_price: self.max_price.filter(|&max| max < PRICE_CEILING),
            sort: self.sort.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// One entry in the category dropdown.
#[derive(Debug, Clone, Copy)]
pub struct CategoryOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavContext,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryOption>,
    pub max_price: u32,
    pub sort: String,
}

/// Display the filtered product listing.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ListingQuery>,
) -> Result<HomeTemplate> {
    let products = state.api().products(&query.to_api_query()).await?;

    let selected = query.category.as_deref().unwrap_or("all");
    let categories = CATEGORIES
        .iter()
        .map(|&name| CategoryOption {
            name,
            selected: name == selected,
        })
        .collect();

    Ok(HomeTemplate {
        nav: NavContext::for_session(user.as_ref()),
        products: products
            .iter()
            .map(|p| ProductCardView::from_product(p, state.api()))
            .collect(),
        categories,
        max_price: query.max_price.unwrap_or(PRICE_CEILING),
        sort: query.sort.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_filters_are_dropped() {
        let query = ListingQuery {
            category: Some("all".to_string()),
            min_price: Some(0),
            max_price: Some(PRICE_CEILING),
            sort: Some(String::new()),
        };
        let api_query = query.to_api_query();
        assert!(api_query.category.is_none());
        assert!(api_query.min_price.is_none());
        assert!(api_query.max_price.is_none());
        assert!(api_query.sort.is_none());
    }

    #[test]
    fn test_real_filters_pass_through() {
        let query = ListingQuery {
            category: Some("laptop".to_string()),
            min_price: Some(1_000),
            max_price: Some(30_000),
            sort: Some("desc".to_string()),
        };
        let api_query = query.to_api_query();
        assert_eq!(api_query.category.as_deref(), Some("laptop"));
        assert_eq!(api_query.min_price, Some(1_000));
        assert_eq!(api_query.max_price, Some(30_000));
        assert_eq!(api_query.sort.as_deref(), Some("desc"));
    }
}
