use serde::Serialize;
use tracing::debug;

use crate::model::{Configuration, ConfirmationState};

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Which statement a record feeds. Completion bookkeeping listens for `Answered`,
/// resumable-state tracking listens for `Progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Answered,
    Progress,
}

impl ReportKind {
    /// Emission order for one interaction.
    pub const ORDER: [ReportKind; 2] = [ReportKind::Answered, ReportKind::Progress];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Answered => "answered",
            ReportKind::Progress => "progress",
        }
    }
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionType {
    TrueFalse,
}

/// Activity definition attached to every record of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    name: String,
    description: String,
    interaction_type: InteractionType,
}

impl Definition {
    /// `name` is the already-formatted title.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            interaction_type: InteractionType::TrueFalse,
        }
    }

    #[must_use]
    pub fn for_config(config: &Configuration, name: impl Into<String>) -> Self {
        Self::new(name, config.activity_description())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn interaction_type(&self) -> InteractionType {
        self.interaction_type
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// One outbound scored true/false report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub kind: ReportKind,
    pub score_achieved: f64,
    pub score_max: f64,
    pub response: bool,
    pub success: bool,
    pub response_text: String,
    pub definition: Definition,
}

//
// ─── EMITTER ───────────────────────────────────────────────────────────────────
//

/// Builds records for one instance from its state snapshot and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEmitter {
    definition: Definition,
}

impl ReportEmitter {
    #[must_use]
    pub fn new(definition: Definition) -> Self {
        Self { definition }
    }

    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Build one record. A checked box is always the correct answer.
    #[must_use]
    pub fn build_record(
        &self,
        kind: ReportKind,
        state: &ConfirmationState,
        config: &Configuration,
    ) -> ReportRecord {
        let checked = state.toggle();
        let score_max = config.score_reported();
        ReportRecord {
            kind,
            score_achieved: if checked { score_max } else { 0.0 },
            score_max,
            response: checked,
            success: checked,
            response_text: config.label_text().to_string(),
            definition: self.definition.clone(),
        }
    }

    /// Emit the `answered` record then the `progress` record, both from the same snapshot.
    ///
    /// Call after [`ConfirmationState::on_user_toggle`].
    pub fn emit_on_toggle<F>(&self, state: &ConfirmationState, config: &Configuration, mut emit: F)
    where
        F: FnMut(ReportRecord),
    {
        for kind in ReportKind::ORDER {
            let record = self.build_record(kind, state, config);
            debug!(
                kind = kind.as_str(),
                score = record.score_achieved,
                max = record.score_max,
                locked = state.locked(),
                "report.emit"
            );
            emit(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigurationDraft, PersistedState};

    fn emitter(config: &Configuration) -> ReportEmitter {
        ReportEmitter::new(Definition::for_config(config, config.resolve_title(None)))
    }

    fn state_with(config: &Configuration, checked: bool, locked: bool) -> ConfirmationState {
        ConfirmationState::initialize(config, Some(&PersistedState::new(checked, locked)))
    }

    #[test]
    fn score_follows_toggle() {
        let config = ConfigurationDraft::new().with_score_reported(5.0).apply_defaults();
        let emitter = emitter(&config);

        for locked in [false, true] {
            let checked = state_with(&config, true, locked);
            let on = emitter.build_record(ReportKind::Answered, &checked, &config);
            assert_eq!(on.score_achieved, 5.0);
            assert_eq!(on.score_max, 5.0);

            let unchecked = state_with(&config, false, locked);
            let off = emitter.build_record(ReportKind::Answered, &unchecked, &config);
            assert_eq!(off.score_achieved, 0.0);
            assert_eq!(off.score_max, 5.0);
        }
    }

    #[test]
    fn fractional_score_is_reported_as_configured() {
        let params = serde_json::json!({ "behaviour": { "scoreReported": 2.5 } });
        let config = ConfigurationDraft::from_params(&params).apply_defaults();
        let mut state = ConfirmationState::initialize(&config, None);
        state.on_user_toggle(true);

        let record = emitter(&config).build_record(ReportKind::Answered, &state, &config);
        assert_eq!(record.score_achieved, 2.5);
        assert_eq!(record.score_max, 2.5);
    }

    #[test]
    fn response_text_is_label_regardless_of_toggle() {
        let config = ConfigurationDraft::new().with_label_text("Done").apply_defaults();
        let emitter = emitter(&config);
        let unchecked = state_with(&config, false, false);
        let off = emitter.build_record(ReportKind::Progress, &unchecked, &config);

        assert_eq!(off.response_text, "Done");
        assert!(!off.response);
        assert!(!off.success);
    }

    #[test]
    fn build_record_leaves_state_untouched() {
        let config = Configuration::default();
        let state = state_with(&config, true, false);
        let before = state.clone();
        let _ = emitter(&config).build_record(ReportKind::Answered, &state, &config);
        assert_eq!(state, before);
    }

    #[test]
    fn definition_uses_title_and_description() {
        let config = ConfigurationDraft::new()
            .with_description_text("Read chapter 2")
            .apply_defaults();
        let record = emitter(&config).build_record(
            ReportKind::Answered,
            &state_with(&config, true, false),
            &config,
        );

        assert_eq!(record.definition.name(), "Completion Confirmation");
        assert_eq!(record.definition.description(), "Read chapter 2");
        assert_eq!(record.definition.interaction_type(), InteractionType::TrueFalse);
    }

    #[test]
    fn emit_on_toggle_emits_answered_then_progress_with_same_values() {
        let config = ConfigurationDraft::new()
            .with_disable_on_check(true)
            .with_label_text("Done")
            .apply_defaults();
        let mut state = ConfirmationState::initialize(&config, None);
        state.on_user_toggle(true);

        let mut records = Vec::new();
        emitter(&config).emit_on_toggle(&state, &config, |record| records.push(record));

        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ReportKind::Answered, ReportKind::Progress]);
        for record in &records {
            assert_eq!(record.score_achieved, 1.0);
            assert_eq!(record.score_max, 1.0);
            assert!(record.response);
            assert!(record.success);
            assert_eq!(record.response_text, "Done");
        }
        assert_eq!(records[0].definition, records[1].definition);
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let config = Configuration::default();
        let record = emitter(&config).build_record(
            ReportKind::Progress,
            &state_with(&config, true, false),
            &config,
        );
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["kind"], "progress");
        assert_eq!(value["scoreAchieved"], 1.0);
        assert_eq!(value["responseText"], "I have completed the content.");
        assert_eq!(value["definition"]["interactionType"], "true-false");
    }
}
