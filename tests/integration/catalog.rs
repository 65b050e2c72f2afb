//! Listings, summary and administration against a real database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serial_test::serial;
use tower::ServiceExt;

use catalog_server::{
    api::create_router,
    config::{AppConfig, AuthorDeletePolicy, BookDeletePolicy},
    models::{author::AuthorForm, book::BookForm, enums::LoanStatus},
    AppError,
};

use crate::common::{self, author, book, instance, language};

fn author_form(first: &str, last: &str) -> AuthorForm {
    AuthorForm {
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_thirteen_authors_paginate_by_ten() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    for n in 0..13 {
        services
            .catalog
            .create_author(author_form(&format!("Christian {}", n), &format!("Surname {}", n)))
            .await
            .unwrap();
    }

    let first = services.catalog.list_authors(None).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert!(first.is_paginated);
    assert_eq!(first.items[0].first_name, "Christian 0");

    let second = services.catalog.list_authors(Some("2")).await.unwrap();
    assert_eq!(second.items.len(), 3);
    assert!(second.is_paginated);
    assert!(!second.has_next);

    assert!(matches!(
        services.catalog.list_authors(Some("3")).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_home_summary_and_visit_counter() {
    let pool = common::pool().await;
    let config = AppConfig::default();

    let author_id = author(&pool, "Ursula", "Le Guin").await;
    let book_id = book(&pool, "The Dispossessed", "9780060512750", Some(author_id)).await;
    instance(&pool, book_id, LoanStatus::Available, None).await;
    instance(&pool, book_id, LoanStatus::Maintenance, None).await;

    let app = create_router(common::state(&pool, config));

    let response = app
        .clone()
        .oneshot(Request::get("/catalog/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .expect("session cookie");

    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let summary: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["num_books"], 1);
    assert_eq!(summary["num_instances"], 2);
    assert_eq!(summary["num_instances_available"], 1);
    assert_eq!(summary["num_authors"], 1);
    assert_eq!(summary["num_books_with_words"], 1);
    assert_eq!(summary["num_visits"], 0);

    let response = app
        .oneshot(
            Request::get("/catalog/")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let summary: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["num_visits"], 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_protected_author_is_kept() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    let author_id = author(&pool, "Frank", "Herbert").await;
    let book_id = book(&pool, "Dune", "9780441013593", Some(author_id)).await;

    assert!(matches!(
        services.catalog.delete_author(author_id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(services.catalog.get_author(author_id).await.is_ok());
    assert_eq!(
        services.catalog.get_book(book_id).await.unwrap().book.author_id,
        Some(author_id)
    );
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_set_null_detaches_books() {
    let pool = common::pool().await;
    let mut config = AppConfig::default();
    config.catalog.author_delete_policy = AuthorDeletePolicy::SetNull;
    let services = common::services(&pool, &config);

    let author_id = author(&pool, "Frank", "Herbert").await;
    let book_id = book(&pool, "Dune", "9780441013593", Some(author_id)).await;

    services.catalog.delete_author(author_id).await.unwrap();

    assert!(matches!(
        services.catalog.get_author(author_id).await,
        Err(AppError::NotFound(_))
    ));
    let detail = services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(detail.book.author_id, None);
    assert!(detail.author.is_none());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_book_delete_policies() {
    let pool = common::pool().await;
    let book_id = book(&pool, "Solaris", "9780156027601", None).await;
    instance(&pool, book_id, LoanStatus::Available, None).await;

    let protect = common::services(&pool, &AppConfig::default());
    assert!(matches!(
        protect.catalog.delete_book(book_id).await,
        Err(AppError::Conflict(_))
    ));

    let mut config = AppConfig::default();
    config.catalog.book_delete_policy = BookDeletePolicy::Cascade;
    let cascade = common::services(&pool, &config);
    cascade.catalog.delete_book(book_id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_book_create_update_and_duplicate_isbn() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());
    let language_id = language(&pool, "English").await;
    let author_id = author(&pool, "Iain", "Banks").await;

    let fantasy = services
        .catalog
        .create_genre(serde_json::from_value(serde_json::json!({ "name": "Fantasy" })).unwrap())
        .await
        .unwrap();
    let scifi = services
        .catalog
        .create_genre(serde_json::from_value(serde_json::json!({ "name": "Science Fiction" })).unwrap())
        .await
        .unwrap();

    let form = BookForm {
        title: "Use of Weapons".to_string(),
        isbn: "9780316030571".to_string(),
        author_id: Some(author_id),
        language_id,
        genre_ids: vec![scifi.id],
        ..Default::default()
    };
    let created = services.catalog.create_book(form.clone()).await.unwrap();

    assert!(matches!(
        services.catalog.create_book(form.clone()).await,
        Err(AppError::Conflict(_))
    ));

    let update = BookForm {
        genre_ids: vec![fantasy.id, scifi.id],
        ..form.clone()
    };
    services.catalog.update_book(created.id, update).await.unwrap();
    let detail = services.catalog.get_book(created.id).await.unwrap();
    assert_eq!(detail.genres.len(), 2);

    let unknown_author = BookForm {
        isbn: "0000000000001".to_string(),
        author_id: Some(9999),
        ..form
    };
    assert!(matches!(
        services.catalog.create_book(unknown_author).await,
        Err(AppError::NotFound(_))
    ));

    assert!(matches!(
        services
            .catalog
            .create_genre(serde_json::from_value(serde_json::json!({ "name": "fantasy" })).unwrap())
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_author_create_redirects_to_detail() {
    let pool = common::pool().await;
    let config = AppConfig::default();
    let token = common::token(&config, 1, true, vec![]);
    let app = create_router(common::state(&pool, config));

    let response = app
        .oneshot(
            Request::post("/catalog/author/create/")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "first_name": "Christian",
                        "last_name": "Surname",
                        "date_of_birth": "1980-01-01"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/catalog/author/1");
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_case_insensitive_names_are_unique_in_the_schema() {
    let pool = common::pool().await;
    language(&pool, "French").await;

    let error = sqlx::query("INSERT INTO languages (name) VALUES ('FRENCH')")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(error), AppError::Conflict(_)));

    sqlx::query("INSERT INTO genres (name) VALUES ('Horror')")
        .execute(&pool)
        .await
        .unwrap();
    let error = sqlx::query("INSERT INTO genres (name) VALUES ('horror')")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(AppError::from(error), AppError::Conflict(_)));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_concurrent_genre_creation_yields_one_conflict() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());
    let genres = &services.repository.classification;

    let (first, second) = tokio::join!(genres.create_genre("Drama"), genres.create_genre("drama"));

    let created = [&first, &second].iter().filter(|r| r.is_ok()).count();
    let conflicts = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!((created, conflicts), (1, 1));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_duplicate_language_is_conflict() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    services
        .catalog
        .create_language(serde_json::from_value(serde_json::json!({ "name": "German" })).unwrap())
        .await
        .unwrap();

    assert!(matches!(
        services
            .catalog
            .create_language(serde_json::from_value(serde_json::json!({ "name": " german " })).unwrap())
            .await,
        Err(AppError::Conflict(_))
    ));

    let languages = services.catalog.list_languages().await.unwrap();
    assert_eq!(languages.len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_book_form_with_unknown_references_is_not_found() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());
    let language_id = language(&pool, "English").await;
    let author_id = author(&pool, "Iain", "Banks").await;

    let form = BookForm {
        title: "Excession".to_string(),
        isbn: "9780553575378".to_string(),
        author_id: Some(author_id),
        language_id,
        ..Default::default()
    };

    let unknown_author = BookForm {
        author_id: Some(9999),
        ..form.clone()
    };
    let unknown_language = BookForm {
        language_id: 9999,
        ..form.clone()
    };
    let unknown_genre = BookForm {
        genre_ids: vec![9999],
        ..form.clone()
    };

    for invalid in [unknown_author, unknown_language, unknown_genre] {
        assert!(matches!(
            services.catalog.create_book(invalid).await,
            Err(AppError::NotFound(_))
        ));
    }

    let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(books, 0);

    let created = services.catalog.create_book(form.clone()).await.unwrap();
    let retarget = BookForm {
        language_id: 9999,
        ..form
    };
    assert!(matches!(
        services.catalog.update_book(created.id, retarget).await,
        Err(AppError::NotFound(_))
    ));
}
