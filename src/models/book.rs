//! Book (catalog title) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;
use super::classification::{Genre, Language};
use super::instance::BookInstance;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: i32,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, when the book has one
    pub author_name: Option<String>,
}

/// Book with its relations resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub language: Language,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

/// Book create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: String,
    /// 13 character ISBN
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub author_id: Option<i32>,
    pub language_id: i32,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

impl BookForm {
    /// Strip surrounding whitespace from the text fields
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.summary = self.summary.trim().to_string();
        self.isbn = self.isbn.trim().to_string();
        self
    }

    /// Pre-filled form for editing an existing book
    pub fn from_detail(detail: &BookDetail) -> Self {
        Self {
            title: detail.book.title.clone(),
            summary: detail.book.summary.clone(),
            isbn: detail.book.isbn.clone(),
            author_id: detail.book.author_id,
            language_id: detail.book.language_id,
            genre_ids: detail.genres.iter().map(|g| g.id).collect(),
        }
    }
}

/// Delete confirmation payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDeletePreview {
    pub book: Book,
    /// Copies that would block or be removed by the delete
    pub instance_count: i64,
}
