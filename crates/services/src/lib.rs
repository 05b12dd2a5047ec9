#![forbid(unsafe_code)]

pub mod analytics_service;
pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod report;
pub mod semester_service;

pub use rapor_core::Clock;

pub use analytics_service::{Analytics, AnalyticsService};
pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use error::{AppServicesError, CatalogServiceError, ReportError, SemesterServiceError};
pub use report::{Report, ReportOptions, ReportService};
pub use semester_service::{SemesterService, SubjectSaved};
