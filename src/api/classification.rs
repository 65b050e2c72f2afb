//! Genre and language endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::classification::{Genre, Language, NameForm},
};

use super::AuthenticatedUser;

/// List all genres by name
#[utoipa::path(
    get,
    path = "/catalog/genres/",
    tag = "classification",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/catalog/genre/create/",
    tag = "classification",
    security(("bearer_auth" = [])),
    request_body = NameForm,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 409, description = "Genre already exists")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<NameForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    claims.require_staff()?;
    let Json(form) = form?;

    let genre = state.services.catalog.create_genre(form).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// List all languages by name
#[utoipa::path(
    get,
    path = "/catalog/languages/",
    tag = "classification",
    responses(
        (status = 200, description = "All languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/catalog/language/create/",
    tag = "classification",
    security(("bearer_auth" = [])),
    request_body = NameForm,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 409, description = "Language already exists")
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    form: Result<Json<NameForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require_staff()?;
    let Json(form) = form?;

    let language = state.services.catalog.create_language(form).await?;
    Ok((StatusCode::CREATED, Json(language)))
}
