use spendlens_core::{StoreError, ValidationError};
use thiserror::Error;

use crate::renderer::RenderState;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("report rendering cancelled")]
    Cancelled,
    #[error("renderer cannot be reused (state: {0:?})")]
    AlreadyUsed(RenderState),
    #[error("render task failed: {0}")]
    Task(String),
}

/// Everything an endpoint can fail with. Validation failures are the
/// caller's fault; the rest are server-side.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl InsightsError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, InsightsError::Validation(_))
    }
}
