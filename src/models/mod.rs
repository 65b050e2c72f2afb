//! Data models for the catalog

pub mod author;
pub mod book;
pub mod classification;
pub mod enums;
pub mod instance;
pub mod pagination;
pub mod renewal;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorForm};
pub use book::{Book, BookDetail, BookForm, BookShort};
pub use classification::{Genre, Language};
pub use enums::LoanStatus;
pub use instance::{BookInstance, BorrowedInstance};
pub use pagination::{PageQuery, PaginatedResponse, Paginator};
pub use summary::HomeSummary;
pub use user::{Permission, UserClaims};
