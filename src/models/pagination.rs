//! Page-number pagination for list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

use super::author::Author;
use super::book::BookShort;

/// Page query parameter: a 1-based page number or `last`
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Rows to fetch for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub offset: i64,
    pub limit: i64,
}

/// Splits `total` rows into pages of `per_page`
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub total: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(total: i64, per_page: i64) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty collection still has one empty page
    pub fn num_pages(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages() > 1
    }

    /// Resolve the requested page, failing with NotFound when it does not exist
    pub fn page(&self, requested: Option<&str>) -> AppResult<PageWindow> {
        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => self.num_pages(),
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::NotFound("That page number is not an integer".to_string())
            })?,
        };

        if number < 1 {
            return Err(AppError::NotFound(
                "That page number is less than 1".to_string(),
            ));
        }
        if number > self.num_pages() {
            return Err(AppError::NotFound(
                "That page contains no results".to_string(),
            ));
        }

        Ok(PageWindow {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        })
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(BookPage = PaginatedResponse<BookShort>, AuthorPage = PaginatedResponse<Author>)]
pub struct PaginatedResponse<T: Serialize> {
    /// Rows of the current page
    pub items: Vec<T>,
    /// Total number of rows
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
    pub num_pages: i64,
    pub is_paginated: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, paginator: &Paginator, window: &PageWindow) -> Self {
        Self {
            items,
            total: paginator.total,
            page: window.number,
            per_page: paginator.per_page,
            num_pages: paginator.num_pages(),
            is_paginated: paginator.is_paginated(),
            has_next: window.number < paginator.num_pages(),
            has_previous: window.number > 1,
        }
    }
}
