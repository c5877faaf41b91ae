#![forbid(unsafe_code)]

pub mod app_services;
pub mod assignment_service;
pub mod config;
pub mod curation_service;
pub mod error;
pub mod feedback_service;
pub mod preview_service;
pub mod quiz_api;
pub mod retry;

pub use curator_core::Clock;

pub use app_services::AppServices;
pub use assignment_service::AssignmentService;
pub use config::{CuratorConfig, QuizApiConfig};
pub use curation_service::{BatchUpload, CurationService};
pub use error::{
    AppServicesError, AssignmentError, ConfigError, CurationError, FeedbackServiceError,
    QuizApiError,
};
pub use feedback_service::FeedbackService;
pub use preview_service::{QuizPreview, QuizPreviewService};
pub use quiz_api::{QuizApiClient, QuizDetail, QuizSource};
pub use retry::RetryPolicy;
