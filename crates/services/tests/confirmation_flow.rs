use std::sync::{Arc, Mutex};

use confirm_core::model::{ContentId, PersistedState, ReportKind};
use confirm_core::model::statement::{StatementFactory, XapiStatementFactory};
use confirm_core::time::fixed_now;
use serde_json::json;
use services::{Clock, ConfirmationService, ContentMetadata, HtmlContainer};
use storage::repository::Storage;

#[tokio::test]
async fn confirmation_flow_persists_across_sessions() {
    let storage = Storage::sqlite("sqlite:file:memdb_confirmation_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let service = ConfirmationService::new(Clock::fixed(fixed_now()), Arc::clone(&storage.states));
    let content_id = ContentId::new(11);
    let params = json!({
        "behaviour": { "disableOnCheck": true, "scoreReported": 1 },
        "l10n": "Done",
        "description": "<p>Finish the chapter</p>"
    });
    let metadata = ContentMetadata {
        title: Some("Chapter 4".to_string()),
    };

    let mut component = service
        .open(content_id, &params, Some(metadata.clone()))
        .await
        .expect("open");
    assert_eq!(component.current_state(), PersistedState::new(false, false));

    let factory = XapiStatementFactory::new(
        "https://lms.example.org/h5p/content/".parse().expect("url"),
    )
    .with_clock(Clock::fixed(fixed_now()));
    let statements = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statements);
    component.on_any(move |record| {
        sink.lock().unwrap().push(factory.build(content_id, record));
    });

    let mut container = HtmlContainer::new();
    component.attach(&mut container);
    assert!(container.to_html().contains("<p>Finish the chapter</p>"));

    let state = service.toggle(&mut component, true).await.expect("toggle");
    assert_eq!(state, PersistedState::new(true, true));

    let statements = statements.lock().unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].verb.id, "http://adlnet.gov/expapi/verbs/answered");
    assert_eq!(statements[1].verb.id, "http://adlnet.gov/expapi/verbs/progressed");
    for statement in statements.iter() {
        assert_eq!(statement.object.id, "https://lms.example.org/h5p/content/11");
        assert_eq!(statement.object.definition.name["en-US"], "Chapter 4");
        assert_eq!(statement.result.score.raw, 1.0);
        assert_eq!(statement.result.score.max, 1.0);
        assert!(statement.result.success);
        assert_eq!(statement.result.response, "Done");
    }

    let reopened = service
        .open(content_id, &params, Some(metadata))
        .await
        .expect("reopen");
    assert_eq!(reopened.current_state(), PersistedState::new(true, true));
}

#[tokio::test]
async fn unchecking_reports_zero_score() {
    let storage = Storage::in_memory();
    let service = ConfirmationService::new(Clock::fixed(fixed_now()), Arc::clone(&storage.states));
    let mut component = service
        .open(ContentId::new(1), &json!({ "behaviour": { "scoreReported": 3 } }), None)
        .await
        .unwrap();

    let scores = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&scores);
    component.on(ReportKind::Answered, move |record| {
        sink.lock().unwrap().push((record.score_achieved, record.score_max));
    });

    service.toggle(&mut component, true).await.unwrap();
    service.toggle(&mut component, false).await.unwrap();

    assert_eq!(*scores.lock().unwrap(), vec![(3.0, 3.0), (0.0, 3.0)]);
    assert_eq!(
        service.saved_state(ContentId::new(1)).await.unwrap(),
        Some(PersistedState::new(false, false))
    );
}
