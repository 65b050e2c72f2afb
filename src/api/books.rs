//! Book listing, detail and administration endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{BookDeletePreview, BookDetail, BookForm},
        pagination::{BookPage, PageQuery},
    },
};

use super::AuthenticatedUser;

/// List books, ten per page
#[utoipa::path(
    get,
    path = "/catalog/books/",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = BookPage),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.catalog.list_books(query.page.as_deref()).await?;
    Ok(Json(page))
}

/// Get a book with its author, language, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Empty book form
#[utoipa::path(
    get,
    path = "/catalog/book/create/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form values", body = BookForm),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_book_form(AuthenticatedUser(claims): AuthenticatedUser) -> AppResult<Json<BookForm>> {
    claims.require_staff()?;
    Ok(Json(BookForm::default()))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/book/create/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 303, description = "Created, redirects to the book"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown author, language or genre"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<BookForm>, JsonRejection>,
) -> AppResult<Redirect> {
    claims.require_staff()?;
    let Json(form) = form?;

    let book = state.services.catalog.create_book(form).await?;
    Ok(Redirect::to(&format!("/catalog/book/{}", book.id)))
}

/// Current values of a book
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Form pre-filled with the book", body = BookForm),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookForm>> {
    claims.require_staff()?;

    let form = state.services.catalog.book_form(id).await?;
    Ok(Json(form))
}

/// Update a book; genres are replaced by the submitted list
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 303, description = "Updated, redirects to the book"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 404, description = "Book, author, language or genre not found"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    form: Result<Json<BookForm>, JsonRejection>,
) -> AppResult<Redirect> {
    claims.require_staff()?;
    let Json(form) = form?;

    state.services.catalog.update_book(id, form).await?;
    Ok(Redirect::to(&format!("/catalog/book/{}", id)))
}

/// Delete confirmation: the book and how many copies it has
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book to delete", body = BookDeletePreview),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_preview(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDeletePreview>> {
    claims.require_staff()?;

    let preview = state.services.catalog.book_delete_preview(id).await?;
    Ok(Json(preview))
}

/// Delete a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirects to the book list"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    claims.require_staff()?;

    state.services.catalog.delete_book(id).await?;
    Ok(Redirect::to("/catalog/books/"))
}
