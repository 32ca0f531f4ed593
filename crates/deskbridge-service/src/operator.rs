use std::sync::Arc;

use deskbridge_core::types::OperatorId;
use deskbridge_store::RecordStore;

use crate::error::{ServiceError, ServiceResult};

/// Resolves operator display names against the operators table.
#[derive(Clone)]
pub struct OperatorDirectory {
    store: Arc<dyn RecordStore>,
}

impl OperatorDirectory {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Looks up the operator record whose name equals `display_name`.
    ///
    /// ## Errors
    /// - `ServiceError::ExternalService` if the record store call fails.
    /// - `ServiceError::Resolution` if no operator has that name.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_operator(&self, display_name: &str) -> ServiceResult<OperatorId> {
        self.store
            .resolve_operator_id(display_name)
            .await?
            .ok_or_else(|| ServiceError::Resolution(format!("unknown operator '{display_name}'")))
    }
}
