use confirm_core::model::{
    Configuration, ConfigurationDraft, ConfirmationState, ContentId, Definition, PersistedState,
    ReportEmitter, ReportKind, ReportRecord,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::dispatcher::EventDispatcher;
use crate::view::{Container, ContainerView, PlainTitle, TitleFormatter, WRAPPER_CLASS};

/// Content metadata the host passes alongside params.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentMetadata {
    pub title: Option<String>,
}

/// Extras supplied at construction: a previously saved state and content metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentData {
    /// Raw saved state; read leniently.
    pub previous_state: Option<Value>,
    pub metadata: Option<ContentMetadata>,
}

impl ContentData {
    #[must_use]
    pub fn with_previous_state(mut self, state: PersistedState) -> Self {
        self.previous_state = Some(serde_json::json!({
            "checked": state.checked,
            "disabled": state.disabled,
        }));
        self
    }

    #[must_use]
    pub fn with_metadata_title(mut self, title: impl Into<String>) -> Self {
        self.metadata = Some(ContentMetadata {
            title: Some(title.into()),
        });
        self
    }
}

/// One self-reported completion checkbox.
#[derive(Debug)]
pub struct CompletionConfirmation {
    content_id: ContentId,
    config: Configuration,
    state: ConfirmationState,
    emitter: ReportEmitter,
    dispatcher: EventDispatcher,
    attached: bool,
}

impl CompletionConfirmation {
    #[must_use]
    pub fn new(config: Configuration, content_id: ContentId, data: ContentData) -> Self {
        Self::with_title_formatter(config, content_id, data, &PlainTitle::default())
    }

    #[must_use]
    pub fn from_params(params: &Value, content_id: ContentId, data: ContentData) -> Self {
        Self::new(
            ConfigurationDraft::from_params(params).apply_defaults(),
            content_id,
            data,
        )
    }

    #[must_use]
    pub fn with_title_formatter(
        config: Configuration,
        content_id: ContentId,
        data: ContentData,
        formatter: &dyn TitleFormatter,
    ) -> Self {
        let previous = data.previous_state.as_ref().map(|raw| {
            if !raw.is_object() {
                warn!(%content_id, "previous state is not an object; ignoring it");
            }
            PersistedState::from_value(raw)
        });
        let state = ConfirmationState::initialize(&config, previous.as_ref());

        let metadata_title = data.metadata.as_ref().and_then(|m| m.title.as_deref());
        let title = formatter.format(config.resolve_title(metadata_title));
        let emitter = ReportEmitter::new(Definition::for_config(&config, title));

        debug!(
            %content_id,
            checked = state.toggle(),
            disabled = state.locked(),
            "confirmation.init"
        );

        Self {
            content_id,
            config,
            state,
            emitter,
            dispatcher: EventDispatcher::new(),
            attached: false,
        }
    }

    /// Subscribe to one record kind.
    pub fn on<F>(&mut self, kind: ReportKind, handler: F)
    where
        F: FnMut(&ReportRecord) + Send + 'static,
    {
        self.dispatcher.on(kind, handler);
    }

    /// Subscribe to every record.
    pub fn on_any<F>(&mut self, handler: F)
    where
        F: FnMut(&ReportRecord) + Send + 'static,
    {
        self.dispatcher.on_any(handler);
    }

    /// Render into the host container. Only the first call renders.
    pub fn attach(&mut self, container: &mut dyn Container) {
        if self.attached {
            warn!(content_id = %self.content_id, "attach called twice; ignoring");
            return;
        }
        container.add_class(WRAPPER_CLASS);
        container.append(ContainerView::build(
            &self.config,
            self.content_id,
            self.state.current_state(),
        ));
        self.attached = true;
    }

    /// Handle one click on the checkbox. `checked` is the control's value after the click.
    ///
    /// State is updated first, then the `answered` and `progress` records are dispatched.
    pub fn toggle(&mut self, checked: bool) -> PersistedState {
        self.state.on_user_toggle(checked);

        let Self {
            state,
            config,
            emitter,
            dispatcher,
            ..
        } = self;
        emitter.emit_on_toggle(state, config, |record| dispatcher.trigger(&record));

        self.state.current_state()
    }

    #[must_use]
    pub fn current_state(&self) -> PersistedState {
        self.state.current_state()
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.state.is_interactive()
    }

    #[must_use]
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Formatted title reported as the activity name.
    #[must_use]
    pub fn title(&self) -> &str {
        self.emitter.definition().name()
    }
}
