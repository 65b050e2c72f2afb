//! Borrowed listings, renewal and the copy lifecycle against a real database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use serial_test::serial;
use tower::ServiceExt;

use catalog_server::{
    api::create_router,
    config::AppConfig,
    models::{enums::LoanStatus, instance::CreateInstance, user::Permission},
    AppError,
};

use crate::common::{self, book, due_back, instance, today, user};

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_borrowed_lists_are_scoped_to_borrower() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let book_id = book(&pool, "Book Title", "ABCDEFG", None).await;

    let later = instance(&pool, book_id, LoanStatus::OnLoan, Some((alice, today() + Duration::days(10)))).await;
    let sooner = instance(&pool, book_id, LoanStatus::OnLoan, Some((alice, today() - Duration::days(1)))).await;
    let bobs = instance(&pool, book_id, LoanStatus::OnLoan, Some((bob, today() + Duration::days(2)))).await;
    instance(&pool, book_id, LoanStatus::Available, None).await;

    let mine = services.loans.list_borrowed_by_user(alice).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![sooner, later]);
    assert!(mine[0].is_overdue);
    assert!(!mine[1].is_overdue);
    assert!(mine.iter().all(|b| b.borrower_id == alice));

    let all = services.loans.list_all_borrowed().await.unwrap();
    let ids: Vec<_> = all.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![sooner, bobs, later]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_renewal_window_bounds() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    let borrower = user(&pool, "patron").await;
    let book_id = book(&pool, "Book Title", "ABCDEFG", None).await;
    let original_due = today() + Duration::days(5);
    let id = instance(&pool, book_id, LoanStatus::OnLoan, Some((borrower, original_due))).await;

    for rejected in [today() - Duration::days(1), today() + Duration::days(29)] {
        let result = services.loans.renew_loan(id, &iso(rejected)).await;
        assert!(matches!(result, Err(AppError::InvalidForm(_))), "{}", rejected);
        assert_eq!(due_back(&pool, id).await, Some(original_due));
    }

    services.loans.renew_loan(id, &iso(today())).await.unwrap();
    assert_eq!(due_back(&pool, id).await, Some(today()));

    let latest = today() + Duration::days(28);
    let renewed = services.loans.renew_loan(id, &iso(latest)).await.unwrap();
    assert_eq!(renewed.due_back, Some(latest));
    assert_eq!(renewed.borrower_id, Some(borrower));
    assert_eq!(renewed.status, LoanStatus::OnLoan);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_renewing_a_copy_not_on_loan_conflicts() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    let book_id = book(&pool, "Book Title", "ABCDEFG", None).await;
    let id = instance(&pool, book_id, LoanStatus::Available, None).await;

    assert!(matches!(
        services.loans.renew_loan(id, &iso(today())).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(due_back(&pool, id).await, None);

    assert!(matches!(
        services.loans.renew_loan(uuid::Uuid::new_v4(), &iso(today())).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_renew_over_http() {
    let pool = common::pool().await;
    let config = AppConfig::default();
    let librarian = common::token(&config, 1, true, vec![Permission::CanMarkReturned]);

    let borrower = user(&pool, "patron").await;
    let book_id = book(&pool, "Book Title", "ABCDEFG", None).await;
    let id = instance(&pool, book_id, LoanStatus::OnLoan, Some((borrower, today()))).await;

    let app = create_router(common::state(&pool, config));
    let uri = format!("/catalog/book/{}/renew/", id);

    let response = app
        .clone()
        .oneshot(
            Request::get(&uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", librarian))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let form: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(form["renewal_date"], iso(today() + Duration::weeks(3)));

    let post = |date: String| {
        Request::post(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", librarian))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "renewal_date": date }).to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(post(iso(today() + Duration::weeks(5))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        error["fields"]["renewal_date"][0],
        "Invalid date - renewal more than 4 weeks ahead"
    );

    let response = app
        .oneshot(post(iso(today() + Duration::weeks(2))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/catalog/borrowed/");
    assert_eq!(due_back(&pool, id).await, Some(today() + Duration::weeks(2)));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_lend_and_return_keep_status_consistent() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());

    let borrower = user(&pool, "patron").await;
    let book_id = book(&pool, "Book Title", "ABCDEFG", None).await;

    let created = services
        .loans
        .create_instance(
            book_id,
            CreateInstance {
                imprint: "Penguin, 1999".to_string(),
                status: LoanStatus::Maintenance,
            },
        )
        .await
        .unwrap();
    assert!(created.is_consistent());

    assert!(matches!(
        services.loans.lend(created.id, borrower, None).await,
        Err(AppError::Conflict(_))
    ));

    let id = instance(&pool, book_id, LoanStatus::Reserved, None).await;
    assert!(matches!(
        services.loans.lend(id, 9999, None).await,
        Err(AppError::NotFound(_))
    ));

    let lent = services.loans.lend(id, borrower, None).await.unwrap();
    assert_eq!(lent.status, LoanStatus::OnLoan);
    assert_eq!(lent.due_back, Some(today() + Duration::weeks(3)));
    assert_eq!(lent.borrower_id, Some(borrower));
    assert!(lent.is_consistent());

    assert!(matches!(
        services.loans.lend(id, borrower, None).await,
        Err(AppError::Conflict(_))
    ));

    let returned = services.loans.return_instance(id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Available);
    assert_eq!(returned.due_back, None);
    assert_eq!(returned.borrower_id, None);
    assert!(returned.is_consistent());

    assert!(matches!(
        services.loans.return_instance(id).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_new_copy_cannot_start_on_loan() {
    let pool = common::pool().await;
    let services = common::services(&pool, &AppConfig::default());
    let book_id = book(&pool, "Book Title", "ABCDEFG", None).await;

    let result = services
        .loans
        .create_instance(
            book_id,
            CreateInstance {
                imprint: String::new(),
                status: LoanStatus::OnLoan,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert!(matches!(
        services
            .loans
            .create_instance(9999, CreateInstance { imprint: String::new(), status: LoanStatus::Available })
            .await,
        Err(AppError::NotFound(_))
    ));
}
