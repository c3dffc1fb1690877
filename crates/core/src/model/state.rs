use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::Configuration;

/// The only data that survives a reload.
///
/// `disabled` is true only when the box was checked under `disableOnCheck`, or when it was
/// already true in a restored state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub checked: bool,
    pub disabled: bool,
}

impl PersistedState {
    #[must_use]
    pub fn new(checked: bool, disabled: bool) -> Self {
        Self { checked, disabled }
    }

    /// Read a previous state leniently: only a literal `true` counts, anything else
    /// (missing, `null`, `"true"`, a non-object) reads as `false`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let flag = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            checked: flag("checked"),
            disabled: flag("disabled"),
        }
    }
}

/// Live state of one confirmation instance, mutated only by [`Self::on_user_toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationState {
    toggle: bool,
    locked: bool,
    disable_on_check: bool,
}

impl ConfirmationState {
    #[must_use]
    pub fn initialize(config: &Configuration, persisted: Option<&PersistedState>) -> Self {
        let persisted = persisted.copied().unwrap_or_default();
        Self {
            toggle: persisted.checked,
            locked: persisted.disabled,
            disable_on_check: config.disable_on_check(),
        }
    }

    /// Apply one user interaction. `value` is the control's value after the interaction.
    ///
    /// The lock is set before any report is built and is never cleared.
    pub fn on_user_toggle(&mut self, value: bool) {
        if self.locked {
            warn!(value, "toggle received while the control is locked");
        }
        self.toggle = value;
        if self.disable_on_check && value {
            self.locked = true;
        }
    }

    #[must_use]
    pub fn current_state(&self) -> PersistedState {
        PersistedState {
            checked: self.toggle,
            disabled: self.locked,
        }
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !self.locked
    }

    #[must_use]
    pub fn toggle(&self) -> bool {
        self.toggle
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }
}
