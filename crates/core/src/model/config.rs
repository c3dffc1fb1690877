use serde_json::Value;

/// Fallback title and activity description when neither params nor metadata supply one.
pub const DEFAULT_TITLE: &str = "Completion Confirmation";

pub const DEFAULT_LABEL_TEXT: &str = "I have completed the content.";

pub const DEFAULT_SCORE_REPORTED: f64 = 1.0;

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// Fully-populated, immutable configuration of one confirmation instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    disable_on_check: bool,
    score_reported: f64,
    label_text: String,
    description_text: Option<String>,
    title: Option<String>,
}

impl Configuration {
    /// Whether checking the box locks it for the rest of the session.
    #[must_use]
    pub fn disable_on_check(&self) -> bool {
        self.disable_on_check
    }

    /// Score attributed to a checked answer. An unchecked answer always scores 0.
    #[must_use]
    pub fn score_reported(&self) -> f64 {
        self.score_reported
    }

    #[must_use]
    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description_text.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Raw (unformatted) title: explicit title, then the content metadata title, then
    /// [`DEFAULT_TITLE`].
    #[must_use]
    pub fn resolve_title<'a>(&'a self, metadata_title: Option<&'a str>) -> &'a str {
        self.title()
            .or_else(|| metadata_title.filter(|t| !t.trim().is_empty()))
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Description reported in the activity definition.
    #[must_use]
    pub fn activity_description(&self) -> &str {
        self.description_text().unwrap_or(DEFAULT_TITLE)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        ConfigurationDraft::default().apply_defaults()
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Partial configuration as supplied by the caller; every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationDraft {
    pub disable_on_check: Option<bool>,
    pub score_reported: Option<f64>,
    pub label_text: Option<String>,
    pub description_text: Option<String>,
    pub title: Option<String>,
}

impl ConfigurationDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a draft out of content params JSON.
    ///
    /// Recognizes both the host's params keys (`behaviour`, `l10n`, `description`) and the
    /// descriptive names (`labelText`, `descriptionText`). A bare boolean `behaviour` is the
    /// pre-1.1 shape and maps to `disableOnCheck`. Fields of the wrong type count as absent.
    #[must_use]
    pub fn from_params(params: &Value) -> Self {
        let (disable_on_check, score_reported) = match params.get("behaviour") {
            Some(Value::Object(behaviour)) => (
                behaviour.get("disableOnCheck").and_then(Value::as_bool),
                behaviour.get("scoreReported").and_then(score_from_value),
            ),
            Some(Value::Bool(flag)) => (Some(*flag), None),
            _ => (None, None),
        };

        Self {
            disable_on_check,
            score_reported,
            label_text: string_field(params, &["labelText", "l10n"]),
            description_text: string_field(params, &["descriptionText", "description"]),
            title: string_field(params, &["title"]),
        }
    }

    #[must_use]
    pub fn with_disable_on_check(mut self, value: bool) -> Self {
        self.disable_on_check = Some(value);
        self
    }

    #[must_use]
    pub fn with_score_reported(mut self, value: f64) -> Self {
        self.score_reported = Some(value);
        self
    }

    #[must_use]
    pub fn with_label_text(mut self, value: impl Into<String>) -> Self {
        self.label_text = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_description_text(mut self, value: impl Into<String>) -> Self {
        self.description_text = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    /// Fill every missing field with its default. Never fails.
    #[must_use]
    pub fn apply_defaults(self) -> Configuration {
        Configuration {
            disable_on_check: self.disable_on_check.unwrap_or(false),
            score_reported: self.score_reported.unwrap_or(DEFAULT_SCORE_REPORTED),
            label_text: non_blank(self.label_text)
                .unwrap_or_else(|| DEFAULT_LABEL_TEXT.to_string()),
            description_text: non_blank(self.description_text),
            title: non_blank(self.title),
        }
    }
}

fn string_field(params: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| params.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn score_from_value(value: &Value) -> Option<f64> {
    value.as_f64().filter(|f| f.is_finite() && *f >= 0.0)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|val| !val.trim().is_empty())
}
