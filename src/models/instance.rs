//! Book instance (loanable copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::LoanStatus;

/// Book instance row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// Status, due date and borrower agree with each other:
    /// on loan iff both due date and borrower are set, and an
    /// available copy carries neither.
    pub fn is_consistent(&self) -> bool {
        let loaned_fields = self.due_back.is_some() && self.borrower_id.is_some();
        match self.status {
            LoanStatus::OnLoan => loaned_fields,
            LoanStatus::Available => self.due_back.is_none() && self.borrower_id.is_none(),
            _ => !loaned_fields,
        }
    }
}

/// Borrowed copy with its title and borrower, as listed for patrons and staff
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowedInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub title: String,
    pub imprint: String,
    pub due_back: NaiveDate,
    pub borrower_id: i32,
    pub borrower_username: String,
    #[sqlx(skip)]
    pub is_overdue: bool,
}

/// Create instance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInstance {
    #[serde(default)]
    #[validate(length(max = 200, message = "Imprint must be at most 200 characters"))]
    pub imprint: String,
    /// Initial status; defaults to maintenance
    #[serde(default)]
    pub status: LoanStatus,
}

/// Lend request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LendRequest {
    pub borrower_id: i32,
    /// Due date (YYYY-MM-DD); defaults to the proposed renewal date
    pub due_back: Option<String>,
}
