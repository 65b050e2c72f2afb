//! Catalog browsing and administration service

use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{
        author::{Author, AuthorDeletePreview, AuthorDetail, AuthorForm},
        book::{Book, BookDeletePreview, BookDetail, BookForm, BookShort},
        classification::{Genre, Language, NameForm},
        enums::LoanStatus,
        pagination::PaginatedResponse,
        summary::HomeSummary,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Site-wide counts for the home page; the caller fills in the visit count
    pub async fn home_summary(&self) -> AppResult<HomeSummary> {
        let instances = &self.repository.instances;

        Ok(HomeSummary {
            num_books: self.repository.books.count().await?,
            num_instances: instances.count().await?,
            num_instances_available: instances.count_by_status(LoanStatus::Available).await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.classification.count_genres().await?,
            num_books_with_words: self.repository.books.count_with_words().await?,
            num_visits: 0,
        })
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, page: Option<&str>) -> AppResult<PaginatedResponse<BookShort>> {
        self.repository.books.list_page(page, self.config.page_size).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        self.repository.books.get_detail(id).await
    }

    /// Current values of a book, as the update form starts with them
    pub async fn book_form(&self, id: i32) -> AppResult<BookForm> {
        let detail = self.repository.books.get_detail(id).await?;
        Ok(BookForm::from_detail(&detail))
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        let form = form.normalized();
        form.validate()?;
        let book = self.repository.books.create(&form).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Book> {
        let form = form.normalized();
        form.validate()?;
        let book = self.repository.books.update(id, &form).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    /// What deleting a book would affect
    pub async fn book_delete_preview(&self, id: i32) -> AppResult<BookDeletePreview> {
        let book = self.repository.books.get_by_id(id).await?;
        let instance_count = self.repository.books.count_instances(id).await?;
        Ok(BookDeletePreview {
            book,
            instance_count,
        })
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let policy = self.config.book_delete_policy;
        self.repository.books.delete(id, policy).await?;
        tracing::info!(book_id = id, ?policy, "Book deleted");
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<PaginatedResponse<Author>> {
        self.repository.authors.list_page(page, self.config.page_size).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.books(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub async fn author_form(&self, id: i32) -> AppResult<AuthorForm> {
        let author = self.repository.authors.get_by_id(id).await?;
        Ok(AuthorForm::from(&author))
    }

    pub async fn create_author(&self, form: AuthorForm) -> AppResult<Author> {
        let form = form.normalized();
        form.validate()?;
        let author = self.repository.authors.create(&form).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: AuthorForm) -> AppResult<Author> {
        let form = form.normalized();
        form.validate()?;
        let author = self.repository.authors.update(id, &form).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    pub async fn author_delete_preview(&self, id: i32) -> AppResult<AuthorDeletePreview> {
        let author = self.repository.authors.get_by_id(id).await?;
        let book_count = self.repository.authors.count_books(id).await?;
        Ok(AuthorDeletePreview { author, book_count })
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let policy = self.config.author_delete_policy;
        self.repository.authors.delete(id, policy).await?;
        tracing::info!(author_id = id, ?policy, "Author deleted");
        Ok(())
    }

    // =========================================================================
    // GENRES & LANGUAGES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.classification.list_genres().await
    }

    pub async fn create_genre(&self, form: NameForm) -> AppResult<Genre> {
        let form = form.normalized();
        form.validate()?;
        let genre = self.repository.classification.create_genre(&form.name).await?;
        tracing::info!(genre_id = genre.id, name = %genre.name, "Genre created");
        Ok(genre)
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.classification.list_languages().await
    }

    pub async fn create_language(&self, form: NameForm) -> AppResult<Language> {
        let form = form.normalized();
        form.validate()?;
        let language = self
            .repository
            .classification
            .create_language(&form.name)
            .await?;
        tracing::info!(language_id = language.id, name = %language.name, "Language created");
        Ok(language)
    }
}
