//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, classification, health, home, loans};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "1.0.0",
        description = "Library catalog: books, authors, copies and loans"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        home::index,
        // Books
        books::list_books,
        books::get_book,
        books::create_book_form,
        books::create_book,
        books::update_book_form,
        books::update_book,
        books::delete_book_preview,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author_form,
        authors::create_author,
        authors::update_author_form,
        authors::update_author,
        authors::delete_author_preview,
        authors::delete_author,
        // Genres & languages
        classification::list_genres,
        classification::create_genre,
        classification::list_languages,
        classification::create_language,
        // Loans
        loans::my_books,
        loans::all_borrowed,
        loans::renewal_form,
        loans::renew_loan,
        loans::create_instance,
        loans::lend_instance,
        loans::return_instance,
    ),
    components(
        schemas(
            // Catalog
            crate::models::summary::HomeSummary,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetail,
            crate::models::book::BookForm,
            crate::models::book::BookDeletePreview,
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorForm,
            crate::models::author::AuthorDeletePreview,
            crate::models::classification::Genre,
            crate::models::classification::Language,
            crate::models::classification::NameForm,
            crate::models::pagination::BookPage,
            crate::models::pagination::AuthorPage,
            // Loans
            crate::models::enums::LoanStatus,
            crate::models::instance::BookInstance,
            crate::models::instance::BorrowedInstance,
            crate::models::instance::CreateInstance,
            crate::models::instance::LendRequest,
            crate::models::renewal::RenewBookRequest,
            crate::models::renewal::RenewalFormView,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog summary"),
        (name = "books", description = "Books"),
        (name = "authors", description = "Authors"),
        (name = "classification", description = "Genres and languages"),
        (name = "loans", description = "Borrowed copies, renewals, lending and returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
