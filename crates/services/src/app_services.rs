use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::analytics_service::AnalyticsService;
use crate::catalog_service::CatalogService;
use crate::error::{AppServicesError, ReportError};
use crate::report::{Report, ReportOptions, ReportService};
use crate::semester_service::SemesterService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    semesters: Arc<SemesterService>,
    catalog: Arc<CatalogService>,
    analytics: Arc<AnalyticsService>,
    reports: Arc<ReportService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        Self {
            semesters: Arc::new(SemesterService::new(Arc::clone(&storage.grades))),
            catalog: Arc::new(CatalogService::new(Arc::clone(&storage.grades))),
            analytics: Arc::new(AnalyticsService::new(Arc::clone(&storage.grades))),
            reports: Arc::new(ReportService::new(clock)),
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(&Storage::in_memory(), clock)
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock))
    }

    #[must_use]
    pub fn semesters(&self) -> Arc<SemesterService> {
        Arc::clone(&self.semesters)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }

    #[must_use]
    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.reports)
    }

    /// Snapshot the current semesters and build a report from them.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NoData` when nothing has been entered yet, or
    /// `ReportError::Storage` if repository access fails.
    pub async fn report(&self, options: ReportOptions) -> Result<Report, ReportError> {
        let analytics = self.analytics.overview().await?;
        self.reports.build(analytics, options)
    }
}
