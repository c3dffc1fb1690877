//! Shared error types for the services crate.

use thiserror::Error;

use confirm_core::upgrade::UpgradeError;
use storage::repository::StorageError;

/// Errors emitted by `ConfirmationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfirmationServiceError {
    #[error("params must be a JSON object")]
    InvalidParams,
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
