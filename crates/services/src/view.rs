//! Render tree handed to the host container, and title formatting.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use confirm_core::model::{Configuration, ContentId, PersistedState};

pub const WRAPPER_CLASS: &str = "h5p-completion-confirmation";
const CONTAINER_CLASS: &str = "h5p-completion-confirmation-container";
const DESCRIPTION_CLASS: &str = "h5p-completion-confirmation-box-description";
const CHECKBOX_CLASS: &str = "h5p-completion-confirmation-checkbox";
const LABEL_CLASS: &str = "h5p-completion-confirmation-checkbox-label";

const DEFAULT_TITLE_MAX_CHARS: usize = 60;

/// Host-provided element the component renders into.
pub trait Container {
    fn add_class(&mut self, class: &str);
    fn append(&mut self, view: ContainerView);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxView {
    pub id: String,
    pub checked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelView {
    pub for_id: String,
    pub html: String,
}

/// Description box, checkbox and label, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerView {
    pub description_html: Option<String>,
    pub checkbox: CheckboxView,
    pub label: LabelView,
}

impl ContainerView {
    #[must_use]
    pub fn build(config: &Configuration, content_id: ContentId, state: PersistedState) -> Self {
        let id = checkbox_id(content_id);
        Self {
            description_html: config
                .description_text()
                .map(sanitize_html)
                .filter(|html| !html.trim().is_empty()),
            checkbox: CheckboxView {
                id: id.clone(),
                checked: state.checked,
                disabled: state.disabled,
            },
            label: LabelView {
                for_id: id,
                html: sanitize_html(config.label_text()),
            },
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = format!(r#"<div class="{CONTAINER_CLASS}">"#);
        if let Some(description) = &self.description_html {
            let _ = write!(out, r#"<div class="{DESCRIPTION_CLASS}">{description}</div>"#);
        }
        let _ = write!(
            out,
            r#"<input class="{CHECKBOX_CLASS}" id="{}" type="checkbox"{}{}>"#,
            self.checkbox.id,
            if self.checkbox.checked { " checked" } else { "" },
            if self.checkbox.disabled { " disabled" } else { "" },
        );
        let _ = write!(
            out,
            r#"<label class="{LABEL_CLASS}" for="{}">{}</label></div>"#,
            self.label.for_id, self.label.html
        );
        out
    }
}

#[must_use]
pub fn checkbox_id(content_id: ContentId) -> String {
    format!("{WRAPPER_CLASS}-{content_id}")
}

/// Minimal container that collects views and serializes them as HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlContainer {
    pub classes: Vec<String>,
    pub children: Vec<ContainerView>,
}

impl HtmlContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let body: String = self.children.iter().map(ContainerView::to_html).collect();
        format!(r#"<div class="{}">{body}</div>"#, self.classes.join(" "))
    }
}

impl Container for HtmlContainer {
    fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    fn append(&mut self, view: ContainerView) {
        self.children.push(view);
    }
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "u", "sub", "sup", "ul", "ol", "li",
        "a",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href", "target"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

//
// ─── TITLES ────────────────────────────────────────────────────────────────────
//

/// Turns a raw (possibly marked-up) title into the name reported in the activity definition.
pub trait TitleFormatter {
    fn format(&self, raw: &str) -> String;
}

/// Strips markup and truncates long titles with `...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainTitle {
    max_chars: usize,
}

impl PlainTitle {
    #[must_use]
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for PlainTitle {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_MAX_CHARS)
    }
}

impl TitleFormatter for PlainTitle {
    fn format(&self, raw: &str) -> String {
        let escaped = ammonia::Builder::empty().clean(raw).to_string();
        let text = unescape_text(&escaped);
        if text.chars().count() <= self.max_chars {
            return text;
        }
        let mut truncated: String = text
            .chars()
            .take(self.max_chars.saturating_sub(3))
            .collect();
        truncated.push_str("...");
        truncated
    }
}

// Undo the escaping the HTML serializer applies to text nodes.
fn unescape_text(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
