//! Title search over the catalog.
//!
//! The backend has no search endpoint; the full listing is fetched and
//! filtered by title substring, matching the behaviour users see on the
//! listing page's search box.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::api::ProductQuery;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::NavContext;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Search query string.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub nav: NavContext,
    pub q: String,
    pub results: Vec<ProductCardView>,
}

/// Display products whose title contains the query, case-insensitively.
/// An empty query shows the whole catalog.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let products = state.api().products(&ProductQuery::default()).await?;

    let q = query.q.unwrap_or_default();
    let needle = q.to_lowercase();
    let results = products
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .map(|p| ProductCardView::from_product(p, state.api()))
        .collect();

    Ok(SearchTemplate {
        nav: NavContext::for_session(Some(&user)),
        q,
        results,
    })
}
