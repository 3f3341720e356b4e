use std::time::Duration;

use super::*;
use crate::paper::{Paper, ScoredPaper};

fn store() -> SessionStore {
    SessionStore::new(Duration::from_secs(60), 100)
}

fn ranked_one() -> (FetchedBatch, RankedSet) {
    let paper = Paper::new("T", "S", "http://arxiv.org/abs/1", "2024-01-01T00:00:00Z");
    let batch = FetchedBatch::new("topic", vec![paper.clone()]);
    let ranked = RankedSet::new(vec![ScoredPaper { paper, score: 1.0 }]);
    (batch, ranked)
}

#[test]
fn test_session_id_roundtrip_through_cookie_value() {
    let id = SessionId::new();
    assert_eq!(SessionId::parse(&id.to_string()), Some(id));
}

#[test]
fn test_session_id_rejects_garbage() {
    assert_eq!(SessionId::parse("not-a-uuid"), None);
    assert_eq!(SessionId::parse(""), None);
}

#[test]
fn test_missing_cookie_starts_empty_session() {
    let store = store();
    let session = store.resolve(None);

    assert!(session.created);
    assert!(session.context.read().ranked().is_none());
    assert!(session.context.read().batch.is_none());
}

#[test]
fn test_known_cookie_resumes_session() {
    let store = store();
    let first = store.resolve(None);
    let (batch, ranked) = ranked_one();
    first.context.write().store(batch, ranked.clone());

    let again = store.resolve(Some(&first.id.to_string()));
    assert!(!again.created);
    assert_eq!(again.id, first.id);
    assert_eq!(again.context.read().ranked(), Some(&ranked));
}

#[test]
fn test_unknown_cookie_starts_new_session() {
    let store = store();
    let stale = SessionId::new().to_string();

    let session = store.resolve(Some(&stale));
    assert!(session.created);
    assert_ne!(session.id.to_string(), stale);
}

#[test]
fn test_sessions_are_isolated() {
    let store = store();
    let a = store.resolve(None);
    let b = store.resolve(None);
    let (batch, ranked) = ranked_one();
    a.context.write().store(batch, ranked);

    assert_ne!(a.id, b.id);
    assert!(b.context.read().ranked().is_none());
}

#[test]
fn test_store_overwrites_previous_results() {
    let mut context = SessionContext::default();
    let (batch, ranked) = ranked_one();
    context.store(batch, ranked);
    context.store(FetchedBatch::new("other", vec![]), RankedSet::default());

    assert_eq!(context.batch.as_ref().map(|b| b.topic.as_str()), Some("other"));
    assert_eq!(context.ranked().map(RankedSet::len), Some(0));
}

#[test]
fn test_remove_and_len() {
    let store = store();
    let session = store.resolve(None);
    store.run_pending_tasks();
    assert_eq!(store.len(), 1);

    store.remove(&session.id);
    store.run_pending_tasks();
    assert!(store.is_empty());
    assert!(store.get(&session.id).is_none());
}

#[test]
fn test_idle_sessions_expire() {
    let store = SessionStore::new(Duration::from_millis(50), 10);
    let session = store.resolve(None);

    std::thread::sleep(Duration::from_millis(120));
    store.run_pending_tasks();

    assert!(store.get(&session.id).is_none());
    assert!(store.resolve(Some(&session.id.to_string())).created);
}
