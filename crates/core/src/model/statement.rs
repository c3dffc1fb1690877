//! Structured statements built from report records.
//!
//! Hosts that speak another statement dialect implement [`StatementFactory`] themselves; the
//! crate ships an xAPI flavour.

use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::model::{ContentId, InteractionType, ReportKind, ReportRecord};
use crate::time::Clock;

const VERB_BASE: &str = "http://adlnet.gov/expapi/verbs/";
const INTERACTION_ACTIVITY: &str = "http://adlnet.gov/expapi/activities/cmi.interaction";
const LANGUAGE: &str = "en-US";

pub type LanguageMap = BTreeMap<String, String>;

fn language_map(text: &str) -> LanguageMap {
    BTreeMap::from([(LANGUAGE.to_string(), text.to_string())])
}

/// Turns a record into whatever statement object the host dispatches.
pub trait StatementFactory {
    type Statement;

    fn build(&self, content_id: ContentId, record: &ReportRecord) -> Self::Statement;
}

//
// ─── VERBS ─────────────────────────────────────────────────────────────────────
//

/// Short verb ids per record kind. Host integrations pin these, so they are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbs {
    pub answered: String,
    pub progress: String,
}

impl Verbs {
    /// `answered` + `progressed`.
    #[must_use]
    pub fn current() -> Self {
        Self {
            answered: "answered".to_string(),
            progress: "progressed".to_string(),
        }
    }

    /// Hosts that predate the two-verb protocol only understand `completed`.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            answered: "completed".to_string(),
            progress: "completed".to_string(),
        }
    }

    #[must_use]
    pub fn for_kind(&self, kind: ReportKind) -> &str {
        match kind {
            ReportKind::Answered => &self.answered,
            ReportKind::Progress => &self.progress,
        }
    }
}

impl Default for Verbs {
    fn default() -> Self {
        Self::current()
    }
}

//
// ─── XAPI SHAPE ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub verb: Verb,
    pub object: Activity,
    pub result: StatementResult,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verb {
    pub id: String,
    pub display: LanguageMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "objectType")]
    pub object_type: &'static str,
    pub definition: ActivityDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityDefinition {
    pub name: LanguageMap,
    pub description: LanguageMap,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(rename = "interactionType")]
    pub interaction_type: InteractionType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementResult {
    pub score: Score,
    pub success: bool,
    pub completion: bool,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub min: f64,
    pub max: f64,
    pub raw: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,
}

impl Score {
    /// `scaled` is rounded to four decimals and omitted when `max` is 0.
    #[must_use]
    pub fn new(raw: f64, max: f64) -> Self {
        let scaled = (max > 0.0).then(|| (raw / max * 10_000.0).round() / 10_000.0);
        Self {
            min: 0.0,
            max,
            raw,
            scaled,
        }
    }
}

/// Builds xAPI statements; the activity id is the base URL joined with the content id.
#[derive(Debug, Clone)]
pub struct XapiStatementFactory {
    activity_base: Url,
    clock: Clock,
    verbs: Verbs,
}

impl XapiStatementFactory {
    #[must_use]
    pub fn new(mut activity_base: Url) -> Self {
        if !activity_base.path().ends_with('/') {
            let path = format!("{}/", activity_base.path());
            activity_base.set_path(&path);
        }
        Self {
            activity_base,
            clock: Clock::default(),
            verbs: Verbs::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_verbs(mut self, verbs: Verbs) -> Self {
        self.verbs = verbs;
        self
    }

    #[must_use]
    pub fn activity_id(&self, content_id: ContentId) -> String {
        self.activity_base
            .join(&content_id.to_string())
            .map_or_else(|_| self.activity_base.to_string(), |url| url.to_string())
    }
}

impl StatementFactory for XapiStatementFactory {
    type Statement = Statement;

    fn build(&self, content_id: ContentId, record: &ReportRecord) -> Statement {
        let verb = self.verbs.for_kind(record.kind);
        Statement {
            verb: Verb {
                id: format!("{VERB_BASE}{verb}"),
                display: language_map(verb),
            },
            object: Activity {
                id: self.activity_id(content_id),
                object_type: "Activity",
                definition: ActivityDefinition {
                    name: language_map(record.definition.name()),
                    description: language_map(record.definition.description()),
                    activity_type: INTERACTION_ACTIVITY.to_string(),
                    interaction_type: record.definition.interaction_type(),
                },
            },
            result: StatementResult {
                score: Score::new(record.score_achieved, record.score_max),
                success: record.success,
                completion: record.response,
                response: record.response_text.clone(),
            },
            timestamp: self.clock.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Definition, ReportKind};
    use crate::time::fixed_now;

    fn record(kind: ReportKind, checked: bool) -> ReportRecord {
        ReportRecord {
            kind,
            score_achieved: if checked { 2.0 } else { 0.0 },
            score_max: 2.0,
            response: checked,
            success: checked,
            response_text: "Done".to_string(),
            definition: Definition::new("Chapter 1", "Read it"),
        }
    }

    fn factory() -> XapiStatementFactory {
        XapiStatementFactory::new(Url::parse("https://lms.example.org/h5p/content").unwrap())
            .with_clock(Clock::fixed(fixed_now()))
    }

    #[test]
    fn answered_record_becomes_answered_statement() {
        let statement = factory().build(ContentId::new(7), &record(ReportKind::Answered, true));
        let value = serde_json::to_value(&statement).unwrap();

        assert_eq!(value["verb"]["id"], "http://adlnet.gov/expapi/verbs/answered");
        assert_eq!(value["verb"]["display"]["en-US"], "answered");
        assert_eq!(value["object"]["id"], "https://lms.example.org/h5p/content/7");
        assert_eq!(value["object"]["definition"]["name"]["en-US"], "Chapter 1");
        assert_eq!(value["object"]["definition"]["interactionType"], "true-false");
        assert_eq!(
            value["object"]["definition"]["type"],
            "http://adlnet.gov/expapi/activities/cmi.interaction"
        );
        assert_eq!(value["result"]["score"]["raw"], 2.0);
        assert_eq!(value["result"]["score"]["scaled"], 1.0);
        assert_eq!(value["result"]["response"], "Done");
        assert_eq!(value["timestamp"], "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn progress_record_uses_progressed_verb() {
        let statement = factory().build(ContentId::new(7), &record(ReportKind::Progress, false));
        assert_eq!(statement.verb.id, "http://adlnet.gov/expapi/verbs/progressed");
        assert_eq!(statement.result.score.raw, 0.0);
        assert!(!statement.result.completion);
    }

    #[test]
    fn legacy_verbs_report_completed() {
        let factory = factory().with_verbs(Verbs::legacy());
        for kind in ReportKind::ORDER {
            let statement = factory.build(ContentId::new(1), &record(kind, true));
            assert_eq!(statement.verb.id, "http://adlnet.gov/expapi/verbs/completed");
        }
    }

    #[test]
    fn zero_max_score_omits_scaled() {
        let score = Score::new(0.0, 0.0);
        assert_eq!(score.scaled, None);
        let value = serde_json::to_value(&score).unwrap();
        assert!(value.get("scaled").is_none());
    }

    #[test]
    fn scaled_score_is_rounded() {
        assert_eq!(Score::new(1.0, 3.0).scaled, Some(0.3333));
        assert_eq!(Score::new(1.25, 2.5).scaled, Some(0.5));
    }

    #[test]
    fn fractional_scores_serialize_as_decimals() {
        let mut half = record(ReportKind::Answered, true);
        half.score_achieved = 0.5;
        half.score_max = 0.5;
        let statement = factory().build(ContentId::new(3), &half);
        let value = serde_json::to_value(&statement).unwrap();

        assert_eq!(value["result"]["score"]["raw"], 0.5);
        assert_eq!(value["result"]["score"]["max"], 0.5);
        assert_eq!(value["result"]["score"]["min"], 0.0);
    }
}
