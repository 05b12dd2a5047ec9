use std::sync::Arc;

use rapor_core::model::{Kkm, SubjectCatalog, SubjectInfo, SubjectName};
use storage::repository::GradeRepository;

use crate::error::CatalogServiceError;

/// Name and threshold suggestions drawn from previously entered subjects.
#[derive(Clone)]
pub struct CatalogService {
    grades: Arc<dyn GradeRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(grades: Arc<dyn GradeRepository>) -> Self {
        Self { grades }
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list(&self) -> Result<SubjectCatalog, CatalogServiceError> {
        Ok(self.grades.read_catalog().await?)
    }

    /// Entries whose name contains `query`, ignoring case. An empty query
    /// matches everything.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn suggest(&self, query: &str) -> Result<Vec<SubjectInfo>, CatalogServiceError> {
        let catalog = self.grades.read_catalog().await?;
        Ok(catalog.suggestions(query).into_iter().cloned().collect())
    }

    /// Threshold last used for `name`, or the default for an unknown name.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn suggested_kkm(&self, name: &str) -> Result<Kkm, CatalogServiceError> {
        let catalog = self.grades.read_catalog().await?;
        Ok(catalog.suggested_kkm(name.trim()))
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Subject` for a blank name.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn remember(
        &self,
        name: &str,
        kkm: Kkm,
    ) -> Result<SubjectCatalog, CatalogServiceError> {
        let name = SubjectName::new(name)?;
        let catalog = self
            .grades
            .upsert_catalog_entry(name.as_str(), kkm)
            .await?;
        tracing::debug!(subject = %name, kkm = kkm.value(), "catalog entry remembered");
        Ok(catalog)
    }
}
