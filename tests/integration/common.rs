//! Shared fixtures: a migrated, emptied database and seeded rows

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use catalog_server::{
    config::AppConfig,
    models::{enums::LoanStatus, user::Permission, UserClaims},
    repository::Repository,
    services::{sessions::MemorySessionStore, Services},
    AppState,
};

pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query(
        "TRUNCATE book_instances, book_genres, books, authors, genres, languages, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to reset tables");

    pool
}

pub fn services(pool: &PgPool, config: &AppConfig) -> Services {
    Services::new(
        Repository::new(pool.clone()),
        config,
        Arc::new(MemorySessionStore::new(Duration::from_secs(
            config.session.ttl_seconds,
        ))),
    )
}

pub fn state(pool: &PgPool, config: AppConfig) -> AppState {
    let services = services(pool, &config);
    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}

pub fn token(config: &AppConfig, user_id: i32, is_staff: bool, permissions: Vec<Permission>) -> String {
    let now = Utc::now();
    UserClaims {
        sub: format!("user{}", user_id),
        user_id,
        is_staff,
        permissions,
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    }
    .create_token(&config.auth.jwt_secret)
    .unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn user(pool: &PgPool, username: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn language(pool: &PgPool, name: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO languages (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn author(pool: &PgPool, first: &str, last: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING id")
        .bind(first)
        .bind(last)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn book(pool: &PgPool, title: &str, isbn: &str, author_id: Option<i32>) -> i32 {
    let language_id = match sqlx::query_scalar::<_, i32>("SELECT id FROM languages ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await
        .unwrap()
    {
        Some(id) => id,
        None => language(pool, "English").await,
    };

    sqlx::query_scalar(
        "INSERT INTO books (title, summary, isbn, author_id, language_id) VALUES ($1, '', $2, $3, $4) RETURNING id",
    )
    .bind(title)
    .bind(isbn)
    .bind(author_id)
    .bind(language_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Copy of a book; on loan when a borrower and due date are given
pub async fn instance(
    pool: &PgPool,
    book_id: i32,
    status: LoanStatus,
    borrower: Option<(i32, NaiveDate)>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO book_instances (id, book_id, imprint, status, borrower_id, due_back) VALUES ($1, $2, 'Unlikely Imprint, 2016', $3, $4, $5)",
    )
    .bind(id)
    .bind(book_id)
    .bind(status)
    .bind(borrower.map(|(user, _)| user))
    .bind(borrower.map(|(_, due)| due))
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn due_back(pool: &PgPool, id: Uuid) -> Option<NaiveDate> {
    sqlx::query_scalar("SELECT due_back FROM book_instances WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}
