//! HTTP API for the catalog

pub mod authors;
pub mod books;
pub mod classification;
pub mod health;
pub mod home;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Session id from the session cookie, or a fresh one set on the jar
pub fn session_id(jar: CookieJar, cookie_name: &str) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(cookie_name) {
        if Uuid::parse_str(cookie.value()).is_ok() {
            let id = cookie.value().to_string();
            return (jar, id);
        }
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((cookie_name.to_string(), id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), id)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/catalog/", get(home::index))
        // Books
        .route("/catalog/books/", get(books::list_books))
        .route("/catalog/book/create/", get(books::create_book_form).post(books::create_book))
        .route("/catalog/book/:id", get(books::get_book))
        .route("/catalog/book/:id/update/", get(books::update_book_form).post(books::update_book))
        .route("/catalog/book/:id/delete/", get(books::delete_book_preview).post(books::delete_book))
        .route("/catalog/book/:id/instances/", post(loans::create_instance))
        .route("/catalog/book/:id/renew/", get(loans::renewal_form).post(loans::renew_loan))
        // Authors
        .route("/catalog/authors/", get(authors::list_authors))
        .route("/catalog/author/create/", get(authors::create_author_form).post(authors::create_author))
        .route("/catalog/author/:id", get(authors::get_author))
        .route("/catalog/author/:id/update/", get(authors::update_author_form).post(authors::update_author))
        .route("/catalog/author/:id/delete/", get(authors::delete_author_preview).post(authors::delete_author))
        // Genres & languages
        .route("/catalog/genres/", get(classification::list_genres))
        .route("/catalog/genre/create/", post(classification::create_genre))
        .route("/catalog/languages/", get(classification::list_languages))
        .route("/catalog/language/create/", post(classification::create_language))
        // Loans
        .route("/catalog/mybooks/", get(loans::my_books))
        .route("/catalog/borrowed/", get(loans::all_borrowed))
        .route("/catalog/bookinstance/:id/lend/", post(loans::lend_instance))
        .route("/catalog/bookinstance/:id/return/", post(loans::return_instance))
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
