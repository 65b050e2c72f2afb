//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    config::BookDeletePolicy,
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{Book, BookDetail, BookForm, BookShort},
        classification::{Genre, Language},
        instance::BookInstance,
        pagination::{PaginatedResponse, Paginator},
    },
};

fn unique_genres(form: &BookForm) -> Vec<i32> {
    let mut ids = form.genre_ids.clone();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Check everything a book form points to, inside the caller's transaction
async fn check_references(
    conn: &mut PgConnection,
    form: &BookForm,
    genre_ids: &[i32],
    exclude_id: Option<i32>,
) -> AppResult<()> {
    let isbn_taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int4 IS NULL OR id <> $2))",
    )
    .bind(&form.isbn)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    if isbn_taken {
        return Err(AppError::Conflict(format!(
            "A book with ISBN {} already exists",
            form.isbn
        )));
    }

    if let Some(author_id) = form.author_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(author_id)
            .fetch_one(&mut *conn)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Author with id {} not found", author_id)));
        }
    }

    let language_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM languages WHERE id = $1)")
            .bind(form.language_id)
            .fetch_one(&mut *conn)
            .await?;
    if !language_exists {
        return Err(AppError::NotFound(format!(
            "Language with id {} not found",
            form.language_id
        )));
    }

    if !genre_ids.is_empty() {
        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE id = ANY($1)")
            .bind(genre_ids)
            .fetch_one(&mut *conn)
            .await?;
        if found != genre_ids.len() as i64 {
            return Err(AppError::NotFound("One or more genres not found".to_string()));
        }
    }

    Ok(())
}

async fn replace_genres(conn: &mut PgConnection, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    if !genre_ids.is_empty() {
        sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int4[])")
            .bind(book_id)
            .bind(genre_ids)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book with author, language, genres and copies
    pub async fn get_detail(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.get_by_id(id).await?;

        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(book.author_id)
            .fetch_optional(&self.pool)
            .await?;

        let language = sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(book.language_id)
            .fetch_one(&self.pool)
            .await?;

        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let instances = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE book_id = $1 ORDER BY imprint, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(BookDetail {
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Books whose title contains a word character
    pub async fn count_with_words(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r"SELECT COUNT(*) FROM books WHERE title ~ '\w'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// One page of books in insertion order
    pub async fn list_page(
        &self,
        page: Option<&str>,
        per_page: i64,
    ) -> AppResult<PaginatedResponse<BookShort>> {
        let paginator = Paginator::new(self.count().await?, per_page);
        let window = paginator.page(page)?;

        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.isbn, b.author_id,
                   a.last_name || ', ' || a.first_name AS author_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedResponse::new(books, &paginator, &window))
    }

    /// Number of copies of a book
    pub async fn count_instances(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a new book with its genres
    pub async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let genre_ids = unique_genres(form);
        let mut tx = self.pool.begin().await?;

        check_references(&mut *tx, form, &genre_ids, None).await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, summary, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&form.title)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.author_id)
        .bind(form.language_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_genres(&mut *tx, book.id, &genre_ids).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Update an existing book; genres are replaced wholesale
    pub async fn update(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        let genre_ids = unique_genres(form);
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        check_references(&mut *tx, form, &genre_ids, Some(id)).await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, summary = $2, isbn = $3, author_id = $4, language_id = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&form.title)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(form.author_id)
        .bind(form.language_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        replace_genres(&mut *tx, id, &genre_ids).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Delete a book, applying the policy to its copies
    pub async fn delete(&self, id: i32, policy: BookDeletePolicy) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let instances: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if instances > 0 {
            match policy {
                BookDeletePolicy::Protect => {
                    return Err(AppError::Conflict(format!(
                        "Book {} still has {} instance(s)",
                        id, instances
                    )));
                }
                BookDeletePolicy::Cascade => {
                    sqlx::query("DELETE FROM book_instances WHERE book_id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        replace_genres(&mut *tx, id, &[]).await?;

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
