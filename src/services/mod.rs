//! Business logic services

pub mod catalog;
pub mod loans;
pub mod sessions;
pub mod visits;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub visits: visits::VisitCounterService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        session_store: Arc<dyn sessions::SessionStore>,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), config.catalog.clone()),
            loans: loans::LoansService::new(repository.clone(), config.loans.clone()),
            visits: visits::VisitCounterService::new(session_store),
            repository,
        }
    }
}
