use std::sync::Arc;

use confirm_core::model::{ContentId, PersistedState};
use confirm_core::upgrade::{ContentVersion, Upgrades};
use serde_json::Value;
use storage::repository::{StateRecord, StateRepository, StorageError};
use tracing::info;

use crate::Clock;
use crate::component::{CompletionConfirmation, ContentData, ContentMetadata};
use crate::error::ConfirmationServiceError;

/// Opens confirmations with their saved state and persists state after each interaction.
#[derive(Clone)]
pub struct ConfirmationService {
    clock: Clock,
    states: Arc<dyn StateRepository>,
    upgrades: Upgrades,
}

impl ConfirmationService {
    #[must_use]
    pub fn new(clock: Clock, states: Arc<dyn StateRepository>) -> Self {
        Self {
            clock,
            states,
            upgrades: Upgrades::completion_confirmation(),
        }
    }

    /// Build a confirmation for `content_id`, restoring whatever state was saved for it.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationServiceError::InvalidParams` if params are not a JSON object, or
    /// a storage error if the saved state cannot be read.
    pub async fn open(
        &self,
        content_id: ContentId,
        params: &Value,
        metadata: Option<ContentMetadata>,
    ) -> Result<CompletionConfirmation, ConfirmationServiceError> {
        if !params.is_object() {
            return Err(ConfirmationServiceError::InvalidParams);
        }
        let saved = self.states.get_state(content_id).await?;
        let mut data = ContentData {
            previous_state: None,
            metadata,
        };
        if let Some(record) = saved {
            data = data.with_previous_state(record.state);
        }
        Ok(CompletionConfirmation::from_params(params, content_id, data))
    }

    /// Like [`Self::open`], upgrading params written for an older library version first.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationServiceError::Upgrade` if no upgrade path exists, or any error
    /// [`Self::open`] returns.
    pub async fn open_versioned(
        &self,
        content_id: ContentId,
        params: Value,
        version: ContentVersion,
        metadata: Option<ContentMetadata>,
    ) -> Result<CompletionConfirmation, ConfirmationServiceError> {
        let params = self
            .upgrades
            .upgrade(params, version, self.upgrades.latest())?;
        self.open(content_id, &params, metadata).await
    }

    /// Apply one click and persist the resulting state.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationServiceError::Storage` if the state cannot be saved. The component
    /// has already been updated and its records dispatched when this happens.
    pub async fn toggle(
        &self,
        component: &mut CompletionConfirmation,
        checked: bool,
    ) -> Result<PersistedState, ConfirmationServiceError> {
        component.toggle(checked);
        self.save(component).await
    }

    /// Persist the component's current state verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationServiceError::Storage` on persistence failures.
    pub async fn save(
        &self,
        component: &CompletionConfirmation,
    ) -> Result<PersistedState, ConfirmationServiceError> {
        let state = component.current_state();
        let record = StateRecord {
            content_id: component.content_id(),
            state,
            saved_at: self.clock.now(),
        };
        self.states.save_state(&record).await?;
        info!(
            content_id = %record.content_id,
            checked = state.checked,
            disabled = state.disabled,
            "state.saved"
        );
        Ok(state)
    }

    /// Load the saved state without building a component.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationServiceError::Storage` on read failures.
    pub async fn saved_state(
        &self,
        content_id: ContentId,
    ) -> Result<Option<PersistedState>, ConfirmationServiceError> {
        Ok(self
            .states
            .get_state(content_id)
            .await?
            .map(|record| record.state))
    }

    /// Forget the saved state so the next `open` starts unchecked. Missing state is fine.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationServiceError::Storage` on other storage failures.
    pub async fn reset(&self, content_id: ContentId) -> Result<(), ConfirmationServiceError> {
        match self.states.delete_state(content_id).await {
            Ok(()) | Err(StorageError::NotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
