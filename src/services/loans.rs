//! Loan service: borrowed listings, renewal, lending and returns

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        enums::LoanStatus,
        instance::{BookInstance, BorrowedInstance, CreateInstance},
        renewal::{RenewalFormView, RenewalWindow},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn window(&self) -> RenewalWindow {
        RenewalWindow::new(Self::today(), &self.config)
    }

    /// Copies a user currently has on loan, soonest due first
    pub async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowedInstance>> {
        self.repository.instances.borrowed(Some(user_id), Self::today()).await
    }

    /// Every copy currently on loan
    pub async fn list_all_borrowed(&self) -> AppResult<Vec<BorrowedInstance>> {
        self.repository.instances.borrowed(None, Self::today()).await
    }

    /// Renewal form for a copy, pre-filled with the proposed date
    pub async fn renewal_form(&self, instance_id: Uuid) -> AppResult<RenewalFormView> {
        let instance = self.repository.instances.get_by_id(instance_id).await?;
        let window = self.window();

        Ok(RenewalFormView {
            instance,
            renewal_date: window.proposed(),
            latest_renewal_date: window.latest(),
        })
    }

    /// Validate the submitted date and move the due date of a loaned copy
    pub async fn renew_loan(&self, instance_id: Uuid, renewal_date: &str) -> AppResult<BookInstance> {
        self.repository.instances.get_by_id(instance_id).await?;

        let due_back = self.window().validate(renewal_date)?;
        let instance = self.repository.instances.renew(instance_id, due_back).await?;

        tracing::info!(instance = %instance_id, due_back = %due_back, "Loan renewed");
        Ok(instance)
    }

    /// Add a copy of a book; copies cannot start on loan
    pub async fn create_instance(&self, book_id: i32, data: CreateInstance) -> AppResult<BookInstance> {
        data.validate()?;
        if data.status == LoanStatus::OnLoan {
            return Err(AppError::Validation(
                "A new copy cannot start on loan; lend it instead".to_string(),
            ));
        }

        let instance = self.repository.instances.create(book_id, &data).await?;
        tracing::info!(instance = %instance.id, book_id, status = %instance.status, "Book instance created");
        Ok(instance)
    }

    /// Lend an available or reserved copy.
    /// Without a due date the proposed renewal date is used.
    pub async fn lend(
        &self,
        instance_id: Uuid,
        borrower_id: i32,
        due_back: Option<&str>,
    ) -> AppResult<BookInstance> {
        let window = self.window();
        let due_back = match due_back {
            Some(raw) => window.validate(raw)?,
            None => window.proposed(),
        };

        let instance = self
            .repository
            .instances
            .lend(instance_id, borrower_id, due_back)
            .await?;

        tracing::info!(instance = %instance_id, borrower_id, due_back = %due_back, "Book instance lent");
        Ok(instance)
    }

    /// Mark a loaned copy as returned
    pub async fn return_instance(&self, instance_id: Uuid) -> AppResult<BookInstance> {
        let instance = self.repository.instances.mark_returned(instance_id).await?;
        tracing::info!(instance = %instance_id, "Book instance returned");
        Ok(instance)
    }
}
