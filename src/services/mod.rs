pub mod buyers;
pub mod draft_validator;
pub mod drafts;
pub mod notifier;
pub mod offers;
pub mod promoter;

use crate::error::AppError;

/// Collapses an unanticipated store failure into `fallback`, keeping anticipated
/// failures (conflicts, not-found) as they are.
pub(crate) fn store_failure(err: AppError, fallback: &'static str) -> AppError {
    match err {
        AppError::Conflict(_) | AppError::NotFound(_) | AppError::ValidationError(_) => err,
        other => {
            tracing::error!(error = %other, "{fallback}");
            AppError::internal(fallback)
        }
    }
}
