//! Borrowed-book listings, renewal and the copy lifecycle

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        instance::{BookInstance, BorrowedInstance, CreateInstance, LendRequest},
        renewal::{RenewBookRequest, RenewalFormView},
    },
};

use super::AuthenticatedUser;

/// Copies the caller has on loan, soonest due first
#[utoipa::path(
    get,
    path = "/catalog/mybooks/",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's borrowed copies", body = Vec<BorrowedInstance>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowedInstance>>> {
    let books = state.services.loans.list_borrowed_by_user(claims.user_id).await?;
    Ok(Json(books))
}

/// Every copy on loan, for librarians
#[utoipa::path(
    get,
    path = "/catalog/borrowed/",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrowed copies", body = Vec<BorrowedInstance>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowedInstance>>> {
    claims.require_staff()?;

    let books = state.services.loans.list_all_borrowed().await?;
    Ok(Json(books))
}

/// Renewal form with the proposed due date
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalFormView),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormView>> {
    claims.require_mark_returned()?;

    let form = state.services.loans.renewal_form(id).await?;
    Ok(Json(form))
}

/// Move the due date of a borrowed copy
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookRequest,
    responses(
        (status = 303, description = "Renewed, redirects to all borrowed books"),
        (status = 400, description = "Date outside the renewal window", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Book instance is not on loan")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    request: Result<Json<RenewBookRequest>, JsonRejection>,
) -> AppResult<Redirect> {
    claims.require_mark_returned()?;
    let Json(request) = request?;

    state.services.loans.renew_loan(id, &request.renewal_date).await?;
    Ok(Redirect::to("/catalog/borrowed/"))
}

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/instances/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid status or imprint"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    request: Result<Json<CreateInstance>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require_staff()?;
    let Json(request) = request?;

    let instance = state.services.loans.create_instance(book_id, request).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Lend an available or reserved copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/lend/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = LendRequest,
    responses(
        (status = 200, description = "Copy lent", body = BookInstance),
        (status = 400, description = "Due date outside the loan window", body = crate::error::ErrorResponse),
        (status = 404, description = "Book instance or borrower not found"),
        (status = 409, description = "Copy cannot be lent")
    )
)]
pub async fn lend_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    request: Result<Json<LendRequest>, JsonRejection>,
) -> AppResult<Json<BookInstance>> {
    claims.require_mark_returned()?;
    let Json(request) = request?;

    let instance = state
        .services
        .loans
        .lend(id, request.borrower_id, request.due_back.as_deref())
        .await?;
    Ok(Json(instance))
}

/// Mark a borrowed copy as returned
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/return/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = BookInstance),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Copy is not on loan")
    )
)]
pub async fn return_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    claims.require_mark_returned()?;

    let instance = state.services.loans.return_instance(id).await?;
    Ok(Json(instance))
}
