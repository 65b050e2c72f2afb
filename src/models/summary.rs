//! Home page summary

use serde::Serialize;
use utoipa::ToSchema;

/// Catalog totals shown on the home page, plus the caller's visit count
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct HomeSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Books whose title contains at least one word character
    pub num_books_with_words: i64,
    /// Visits in this session before the current one
    pub num_visits: i64,
}
