//! Aggregated search API handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use btagg_core::searcher::parse_page;
use btagg_core::SearchPage;
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query string of `GET /api/bt`.
///
/// `page` is kept as text so malformed values coerce to the first page
/// instead of rejecting the request.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub page: Option<String>,
}

impl SearchParams {
    /// Build from raw query pairs. The first occurrence of a key wins and
    /// unknown keys are ignored, so repeated parameters never reject a request.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "keyword" if params.keyword.is_none() => params.keyword = Some(value),
                "page" if params.page.is_none() => params.page = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/bt
///
/// Search every collection for `keyword` and return one page of results.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchPage>, impl IntoResponse> {
    let params = SearchParams::from_pairs(pairs);
    let keyword = params.keyword.unwrap_or_default();
    let page = parse_page(params.page.as_deref());

    match state.search().search(&keyword, page).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!(keyword = %keyword, error = %e, "Search failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal Server Error".to_string(),
                }),
            ))
        }
    }
}
