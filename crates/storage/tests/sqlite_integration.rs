use confirm_core::model::{ContentId, PersistedState};
use confirm_core::time::fixed_now;
use storage::repository::{StateRecord, StateRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_state_verbatim() {
    let repo = connect("memdb_state_roundtrip").await;
    let content_id = ContentId::new(42);

    assert!(repo.get_state(content_id).await.unwrap().is_none());

    let record = StateRecord {
        content_id,
        state: PersistedState::new(true, true),
        saved_at: fixed_now(),
    };
    repo.save_state(&record).await.unwrap();

    let fetched = repo.get_state(content_id).await.unwrap().expect("stored");
    assert_eq!(fetched, record);
}

#[tokio::test]
async fn sqlite_save_replaces_previous_state() {
    let repo = connect("memdb_state_replace").await;
    let content_id = ContentId::new(7);

    for (checked, disabled) in [(true, false), (false, false)] {
        repo.save_state(&StateRecord {
            content_id,
            state: PersistedState::new(checked, disabled),
            saved_at: fixed_now(),
        })
        .await
        .unwrap();
    }

    let fetched = repo.get_state(content_id).await.unwrap().unwrap();
    assert_eq!(fetched.state, PersistedState::new(false, false));
}

#[tokio::test]
async fn sqlite_delete_state() {
    let repo = connect("memdb_state_delete").await;
    let content_id = ContentId::new(3);
    repo.save_state(&StateRecord {
        content_id,
        state: PersistedState::new(true, false),
        saved_at: fixed_now(),
    })
    .await
    .unwrap();

    repo.delete_state(content_id).await.unwrap();
    assert!(repo.get_state(content_id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_state(content_id).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn migrations_are_rerunnable() {
    let repo = connect("memdb_state_rerun").await;
    repo.migrate().await.expect("second migrate");
}
