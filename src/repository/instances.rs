//! Book instances (loanable copies) repository

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LoanStatus,
        instance::{BookInstance, BorrowedInstance, CreateInstance},
    },
};

/// Lock an instance row for the rest of the transaction
async fn lock_instance(conn: &mut PgConnection, id: Uuid) -> AppResult<BookInstance> {
    sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
}

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get instance by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Copies currently on loan, soonest due first.
    /// With a borrower, only that borrower's copies are returned.
    pub async fn borrowed(
        &self,
        borrower_id: Option<i32>,
        today: NaiveDate,
    ) -> AppResult<Vec<BorrowedInstance>> {
        let borrower_clause = if borrower_id.is_some() {
            "AND bi.borrower_id = $2"
        } else {
            ""
        };

        let query = format!(
            r#"
            SELECT bi.id, bi.book_id, b.title, bi.imprint, bi.due_back,
                   bi.borrower_id, u.username AS borrower_username
            FROM book_instances bi
            JOIN books b ON b.id = bi.book_id
            JOIN users u ON u.id = bi.borrower_id
            WHERE bi.status = $1 {}
            ORDER BY bi.due_back, bi.id
            "#,
            borrower_clause
        );

        let mut builder = sqlx::query_as::<_, BorrowedInstance>(&query).bind(LoanStatus::OnLoan);
        if let Some(id) = borrower_id {
            builder = builder.bind(id);
        }

        let mut rows = builder.fetch_all(&self.pool).await?;
        for row in &mut rows {
            row.is_overdue = row.due_back < today;
        }

        Ok(rows)
    }

    /// Create a new copy of a book
    pub async fn create(&self, book_id: i32, data: &CreateInstance) -> AppResult<BookInstance> {
        let book_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        if !book_exists {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }

        let instance = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(&data.imprint)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(instance)
    }

    /// Move the due date of a copy that is on loan.
    /// The row stays locked from the state check to the write.
    pub async fn renew(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;

        let instance = lock_instance(&mut *tx, id).await?;
        if instance.status != LoanStatus::OnLoan {
            return Err(AppError::Conflict(format!(
                "Book instance {} is not on loan ({})",
                id, instance.status
            )));
        }

        let renewed = sqlx::query_as::<_, BookInstance>(
            "UPDATE book_instances SET due_back = $1 WHERE id = $2 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        debug_assert!(renewed.is_consistent());
        tx.commit().await?;
        Ok(renewed)
    }

    /// Hand an available or reserved copy to a borrower
    pub async fn lend(
        &self,
        id: Uuid,
        borrower_id: i32,
        due_back: NaiveDate,
    ) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;

        let instance = lock_instance(&mut *tx, id).await?;
        if !instance.status.is_lendable() {
            return Err(AppError::Conflict(format!(
                "Book instance {} cannot be lent ({})",
                id, instance.status
            )));
        }

        let borrower_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(borrower_id)
                .fetch_one(&mut *tx)
                .await?;
        if !borrower_exists {
            return Err(AppError::NotFound(format!("User with id {} not found", borrower_id)));
        }

        let lent = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = $2, due_back = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(due_back)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        debug_assert!(lent.is_consistent());
        tx.commit().await?;
        Ok(lent)
    }

    /// Take back a copy that is on loan
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;

        let instance = lock_instance(&mut *tx, id).await?;
        if instance.status != LoanStatus::OnLoan {
            return Err(AppError::Conflict(format!(
                "Book instance {} is not on loan ({})",
                id, instance.status
            )));
        }

        let returned = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = NULL, due_back = NULL
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Available)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        debug_assert!(returned.is_consistent());
        tx.commit().await?;
        Ok(returned)
    }
}
