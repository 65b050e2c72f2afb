//! Loan renewal form and its date window

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use super::instance::BookInstance;
use crate::config::LoansConfig;

pub const RENEWAL_DATE_FIELD: &str = "renewal_date";

/// Renewal form submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenewBookRequest {
    /// New due date (YYYY-MM-DD)
    pub renewal_date: String,
}

/// Renewal form as displayed to the librarian
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalFormView {
    pub instance: BookInstance,
    /// Suggested due date, not validated
    pub renewal_date: NaiveDate,
    /// Latest date the form will accept
    pub latest_renewal_date: NaiveDate,
}

/// Dates a renewal may move a due date to: `[today, today + window]`
#[derive(Debug, Clone, Copy)]
pub struct RenewalWindow {
    today: NaiveDate,
    window_weeks: i64,
    proposed_weeks: i64,
}

impl RenewalWindow {
    pub fn new(today: NaiveDate, config: &LoansConfig) -> Self {
        Self {
            today,
            window_weeks: config.renewal_window_weeks,
            proposed_weeks: config.proposed_renewal_weeks,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Date pre-filled in the renewal form
    pub fn proposed(&self) -> NaiveDate {
        self.today + Duration::weeks(self.proposed_weeks)
    }

    /// Latest accepted renewal date (inclusive)
    pub fn latest(&self) -> NaiveDate {
        self.today + Duration::weeks(self.window_weeks)
    }

    /// Parse and check a submitted date
    pub fn validate(&self, raw: &str) -> Result<NaiveDate, ValidationErrors> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| field_error("invalid", "Enter a valid date.".to_string()))?;
        self.check(date)
    }

    /// Check an already parsed date against both bounds
    pub fn check(&self, date: NaiveDate) -> Result<NaiveDate, ValidationErrors> {
        if date < self.today {
            return Err(field_error(
                "renewal_in_past",
                "Invalid date - renewal in past".to_string(),
            ));
        }

        if date > self.latest() {
            return Err(field_error(
                "renewal_too_far",
                format!(
                    "Invalid date - renewal more than {} weeks ahead",
                    self.window_weeks
                ),
            ));
        }

        Ok(date)
    }
}

fn field_error(code: &'static str, message: String) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());

    let mut errors = ValidationErrors::new();
    errors.add(RENEWAL_DATE_FIELD, error);
    errors
}
