use aiva::error::SessionError;
use aiva::session::{SessionState, SessionStatus, SessionStore, TOKEN_KEY};
use aiva::storage::{KeyValueStore, MemoryStore};
use std::sync::{Arc, Mutex};

fn store_over(storage: &Arc<MemoryStore>) -> SessionStore {
    SessionStore::new(Arc::clone(storage) as Arc<dyn KeyValueStore>)
}

fn state(token: Option<&str>, is_loading: bool) -> SessionState {
    SessionState {
        token: token.map(str::to_string),
        is_loading,
    }
}

/// Collect every state a subscriber is handed
fn record(store: &SessionStore) -> (Arc<Mutex<Vec<SessionState>>>, aiva::observer::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = store.subscribe(move |state| sink.lock().unwrap().push(state.clone()));
    (seen, subscription)
}

#[tokio::test]
async fn test_starts_loading() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);

    assert_eq!(store.state(), state(None, true));
    assert_eq!(store.status(), SessionStatus::Loading);
}

#[tokio::test]
async fn test_initialize_with_empty_store() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);

    store.initialize().await;

    assert_eq!(store.state(), state(None, false));
    assert_eq!(store.status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_initialize_keeps_stored_values_verbatim() {
    for stored in ["", "abc"] {
        let storage = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, stored)]));
        let store = store_over(&storage);

        store.initialize().await;

        assert_eq!(store.state(), state(Some(stored), false), "stored {:?}", stored);
    }
}

#[tokio::test]
async fn test_initialize_read_failure_is_signed_out() {
    let storage = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, "abc")]));
    storage.fail_reads(true);
    let store = store_over(&storage);

    store.initialize().await;

    assert_eq!(store.state(), state(None, false));
}

#[tokio::test]
async fn test_initialize_only_runs_once() {
    let storage = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, "abc")]));
    let store = store_over(&storage);
    let (seen, _subscription) = record(&store);

    store.initialize().await;
    storage.set(TOKEN_KEY, "changed-behind-our-back").await.unwrap();
    store.initialize().await;

    assert_eq!(store.state(), state(Some("abc"), false));
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sign_in_sign_out_round_trip() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;

    store.sign_in("tok-1").await.unwrap();
    assert_eq!(store.token().as_deref(), Some("tok-1"));
    assert_eq!(storage.peek(TOKEN_KEY).as_deref(), Some("tok-1"));

    store.sign_out().await.unwrap();
    assert_eq!(store.token(), None);
    assert_eq!(storage.peek(TOKEN_KEY), None);
}

#[tokio::test]
async fn test_sign_in_survives_restart() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;
    store.sign_in("tok-1").await.unwrap();
    drop(store);

    let restarted = store_over(&storage);
    restarted.initialize().await;

    assert_eq!(restarted.state(), state(Some("tok-1"), false));
}

#[tokio::test]
async fn test_sign_in_rejects_empty_token() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;

    let result = store.sign_in("").await;

    assert!(matches!(result, Err(SessionError::EmptyToken)));
    assert_eq!(store.token(), None);
    assert_eq!(storage.peek(TOKEN_KEY), None);
}

#[tokio::test]
async fn test_failed_write_leaves_state_unchanged() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;
    store.sign_in("old").await.unwrap();
    let (seen, _subscription) = record(&store);

    storage.fail_writes(true);
    let result = store.sign_in("new").await;

    assert!(matches!(result, Err(SessionError::Persistence(_))));
    assert_eq!(store.token().as_deref(), Some("old"));
    assert_eq!(storage.peek(TOKEN_KEY).as_deref(), Some("old"));
    // Only the immediate delivery on subscribe
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_remove_leaves_state_unchanged() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;
    store.sign_in("tok").await.unwrap();

    storage.fail_removes(true);
    let result = store.sign_out().await;

    assert!(matches!(result, Err(SessionError::Persistence(_))));
    assert_eq!(store.token().as_deref(), Some("tok"));
    assert_eq!(store.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_sign_in_is_idempotent() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;

    store.sign_in("abc").await.unwrap();
    store.sign_in("abc").await.unwrap();

    assert_eq!(store.token().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_observers_see_every_change_in_order() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    let (first, _first_sub) = record(&store);
    let (second, _second_sub) = record(&store);

    store.initialize().await;
    store.sign_in("a").await.unwrap();
    store.sign_out().await.unwrap();
    store.sign_in("b").await.unwrap();

    let expected = vec![
        state(None, true),
        state(None, false),
        state(Some("a"), false),
        state(None, false),
        state(Some("b"), false),
    ];
    assert_eq!(*first.lock().unwrap(), expected);
    assert_eq!(*second.lock().unwrap(), expected);
}

#[tokio::test]
async fn test_late_subscriber_gets_current_state_first() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    store.initialize().await;
    store.sign_in("tok").await.unwrap();

    let (seen, _subscription) = record(&store);

    assert_eq!(*seen.lock().unwrap(), vec![state(Some("tok"), false)]);
}

#[tokio::test]
async fn test_dropping_subscription_stops_delivery() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    let (seen, subscription) = record(&store);
    assert_eq!(store.subscriber_count(), 1);

    subscription.unsubscribe();
    store.initialize().await;

    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_changes_channel_yields_states() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);
    let (mut rx, subscription) = store.changes();

    store.initialize().await;
    store.sign_in("tok").await.unwrap();
    drop(subscription);

    assert_eq!(rx.recv().await, Some(state(None, true)));
    assert_eq!(rx.recv().await, Some(state(None, false)));
    assert_eq!(rx.recv().await, Some(state(Some("tok"), false)));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_concurrent_sign_ins_keep_storage_and_memory_in_step() {
    let storage = Arc::new(MemoryStore::new());
    let store = Arc::new(store_over(&storage));
    store.initialize().await;

    let calls = (0..16).map(|i| {
        let store = Arc::clone(&store);
        async move {
            if i % 3 == 0 {
                store.sign_out().await
            } else {
                store.sign_in(format!("tok-{}", i)).await
            }
        }
    });
    for result in futures::future::join_all(calls).await {
        result.unwrap();
    }

    assert_eq!(store.token(), storage.peek(TOKEN_KEY));
}

#[tokio::test]
async fn test_sign_in_before_initialize_is_not_lost() {
    let storage = Arc::new(MemoryStore::new());
    let store = store_over(&storage);

    store.sign_in("early").await.unwrap();
    assert!(store.state().is_loading);
    store.initialize().await;

    assert_eq!(store.state(), state(Some("early"), false));
}

#[tokio::test]
async fn test_restart_scenario() {
    let storage = Arc::new(MemoryStore::new());

    let store = store_over(&storage);
    store.initialize().await;
    assert_eq!(store.state(), state(None, false));
    store.sign_in("tok-1").await.unwrap();
    assert_eq!(store.state(), state(Some("tok-1"), false));
    drop(store);

    let store = store_over(&storage);
    store.initialize().await;
    assert_eq!(store.state(), state(Some("tok-1"), false));
    store.sign_out().await.unwrap();
    assert_eq!(store.state(), state(None, false));
    assert_eq!(storage.peek(TOKEN_KEY), None);
}
