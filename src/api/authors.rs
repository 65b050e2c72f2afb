//! Author listing, detail and administration endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{AuthorDeletePreview, AuthorDetail, AuthorForm},
        pagination::{AuthorPage, PageQuery},
    },
};

use super::AuthenticatedUser;

/// List authors, ten per page
#[utoipa::path(
    get,
    path = "/catalog/authors/",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of authors", body = AuthorPage),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<AuthorPage>> {
    let page = state.services.catalog.list_authors(query.page.as_deref()).await?;
    Ok(Json(page))
}

/// Get an author and the books they wrote
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Empty author form
#[utoipa::path(
    get,
    path = "/catalog/author/create/",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Initial form values", body = AuthorForm),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_author_form(
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AuthorForm>> {
    claims.require_staff()?;
    Ok(Json(AuthorForm::default()))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create/",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Created, redirects to the author"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<AuthorForm>, JsonRejection>,
) -> AppResult<Redirect> {
    claims.require_staff()?;
    let Json(form) = form?;

    let author = state.services.catalog.create_author(form).await?;
    Ok(Redirect::to(&format!("/catalog/author/{}", author.id)))
}

/// Current values of an author
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Form pre-filled with the author", body = AuthorForm),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorForm>> {
    claims.require_staff()?;

    let form = state.services.catalog.author_form(id).await?;
    Ok(Json(form))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Updated, redirects to the author"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    form: Result<Json<AuthorForm>, JsonRejection>,
) -> AppResult<Redirect> {
    claims.require_staff()?;
    let Json(form) = form?;

    state.services.catalog.update_author(id, form).await?;
    Ok(Redirect::to(&format!("/catalog/author/{}", id)))
}

/// Delete confirmation: the author and how many books reference them
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author to delete", body = AuthorDeletePreview),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author_preview(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDeletePreview>> {
    claims.require_staff()?;

    let preview = state.services.catalog.author_delete_preview(id).await?;
    Ok(Json(preview))
}

/// Delete an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirects to the author list"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still referenced by books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    claims.require_staff()?;

    state.services.catalog.delete_author(id).await?;
    Ok(Redirect::to("/catalog/authors/"))
}
