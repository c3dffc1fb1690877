use std::fmt;

use confirm_core::model::{ReportKind, ReportRecord};
use tracing::info;

type Handler = Box<dyn FnMut(&ReportRecord) + Send>;

/// In-process publish/subscribe for report records.
///
/// Handlers run synchronously, in registration order, on the thread that triggers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<(Option<ReportKind>, Handler)>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one record kind.
    pub fn on<F>(&mut self, kind: ReportKind, handler: F)
    where
        F: FnMut(&ReportRecord) + Send + 'static,
    {
        self.handlers.push((Some(kind), Box::new(handler)));
    }

    /// Subscribe to every record.
    pub fn on_any<F>(&mut self, handler: F)
    where
        F: FnMut(&ReportRecord) + Send + 'static,
    {
        self.handlers.push((None, Box::new(handler)));
    }

    pub fn trigger(&mut self, record: &ReportRecord) {
        for (filter, handler) in &mut self.handlers {
            if filter.is_none_or(|kind| kind == record.kind) {
                handler(record);
            }
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.handlers.len())
            .finish()
    }
}

/// Handler that writes each record to the tracing log.
pub fn log_record(record: &ReportRecord) {
    info!(
        kind = record.kind.as_str(),
        score = record.score_achieved,
        max = record.score_max,
        success = record.success,
        "report.record"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use confirm_core::model::Definition;
    use std::sync::{Arc, Mutex};

    fn record(kind: ReportKind) -> ReportRecord {
        ReportRecord {
            kind,
            score_achieved: 1.0,
            score_max: 1.0,
            response: true,
            success: true,
            response_text: "Done".to_string(),
            definition: Definition::new("Title", "Description"),
        }
    }

    #[test]
    fn kind_filter_routes_records() {
        let answered = Arc::new(Mutex::new(0));
        let everything = Arc::new(Mutex::new(0));

        let mut dispatcher = EventDispatcher::new();
        let counter = Arc::clone(&answered);
        dispatcher.on(ReportKind::Answered, move |_| *counter.lock().unwrap() += 1);
        let counter = Arc::clone(&everything);
        dispatcher.on_any(move |_| *counter.lock().unwrap() += 1);

        dispatcher.trigger(&record(ReportKind::Answered));
        dispatcher.trigger(&record(ReportKind::Progress));

        assert_eq!(*answered.lock().unwrap(), 1);
        assert_eq!(*everything.lock().unwrap(), 2);
        assert_eq!(dispatcher.listener_count(), 2);
    }

    #[test]
    fn trigger_without_listeners_is_a_no_op() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.trigger(&record(ReportKind::Progress));
        assert_eq!(dispatcher.listener_count(), 0);
    }
}
