//! Axum route handlers for job listings.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::search::{SearchPage, SearchQuery};
use crate::state::AppState;

pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
    #[serde(default, alias = "nivel")]
    pub level: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl SearchParams {
    pub fn into_query(self, default_per_page: i64) -> Result<SearchQuery, AppError> {
        let per_page = self.per_page.unwrap_or(default_per_page);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::Validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(SearchQuery {
            term: self.search,
            level: self.level,
            page: self.page.unwrap_or(1),
            per_page,
        })
    }
}

/// GET /api/v1/jobs?search=&level=&page=&per_page=
///
/// Lists job postings that have at least one application.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, AppError> {
    let query = params.into_query(state.config.per_page)?;
    let page = state.data.search_jobs(&query).await?;
    Ok(Json(page))
}
