use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::ttl::{CacheKey, TtlCache};
use super::types::CacheStatus;
use crate::hashing::hash_fetch_args;

fn cache(ttl: Duration) -> TtlCache<Arc<Vec<String>>> {
    TtlCache::new("fetch_papers", ttl, 16)
}

#[test]
fn test_cache_status_header_values() {
    assert_eq!(CacheStatus::Hit.as_header_value(), "HIT");
    assert_eq!(CacheStatus::Miss.as_header_value(), "MISS");
    assert_eq!(CacheStatus::Bypass.as_header_value(), "BYPASS");
    assert_eq!(format!("{}", CacheStatus::Hit), "HIT");
}

#[test]
fn test_cache_status_combine() {
    assert_eq!(CacheStatus::Hit.combine(CacheStatus::Hit), CacheStatus::Hit);
    assert_eq!(CacheStatus::Hit.combine(CacheStatus::Miss), CacheStatus::Miss);
    assert_eq!(CacheStatus::Miss.combine(CacheStatus::Hit), CacheStatus::Miss);
    assert!(!CacheStatus::Bypass.is_hit());
}

#[test]
fn test_key_carries_function_identity() {
    let args = hash_fetch_args("topic", 50);
    let fetch: TtlCache<u32> = TtlCache::new("fetch_papers", Duration::from_secs(60), 4);
    let rank: TtlCache<u32> = TtlCache::new("rank_papers", Duration::from_secs(60), 4);

    assert_ne!(fetch.key(args), rank.key(args));
    assert_eq!(fetch.key(args), CacheKey::new("fetch_papers", args));
}

#[tokio::test]
async fn test_insert_and_get() {
    let cache = cache(Duration::from_secs(60));
    let args = hash_fetch_args("graph neural networks", 50);

    assert!(cache.get(&args).await.is_none());
    cache.insert(args, Arc::new(vec!["a".to_string()])).await;

    let value = cache.get(&args).await.expect("value should be cached");
    assert_eq!(value.as_slice(), ["a".to_string()]);
    assert!(cache.contains(&args));
}

#[tokio::test]
async fn test_entries_expire_after_ttl() {
    let cache = cache(Duration::from_millis(50));
    let args = hash_fetch_args("diffusion models", 50);

    cache.insert(args, Arc::new(vec![])).await;
    assert!(cache.get(&args).await.is_some());

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(cache.get(&args).await.is_none());
}

#[tokio::test]
async fn test_invalidate_and_clear() {
    let cache = cache(Duration::from_secs(60));
    let a = hash_fetch_args("a", 50);
    let b = hash_fetch_args("b", 50);
    cache.insert(a, Arc::new(vec![])).await;
    cache.insert(b, Arc::new(vec![])).await;

    cache.invalidate(&a).await;
    assert!(cache.get(&a).await.is_none());
    assert!(cache.get(&b).await.is_some());

    cache.clear();
    cache.run_pending_tasks().await;
    assert!(cache.get(&b).await.is_none());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_get_or_try_insert_with_computes_once() {
    let cache = cache(Duration::from_secs(60));
    let args = hash_fetch_args("transformer attention mechanisms", 50);
    let calls = AtomicUsize::new(0);

    let (first, status) = cache
        .get_or_try_insert_with(args, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(Arc::new(vec!["paper".to_string()]))
        })
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Miss);

    let (second, status) = cache
        .get_or_try_insert_with(args, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(Arc::new(vec![]))
        })
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Hit);

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_misses_compute_once() {
    let cache = cache(Duration::from_secs(60));
    let args = hash_fetch_args("transformer attention mechanisms", 50);
    let calls = AtomicUsize::new(0);

    let compute = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, std::io::Error>(Arc::new(vec!["paper".to_string()]))
    };

    let (a, b) = tokio::join!(
        cache.get_or_try_insert_with(args, compute),
        cache.get_or_try_insert_with(args, compute),
    );
    let (a, a_status) = a.unwrap();
    let (b, b_status) = b.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a, b);

    let mut statuses = [a_status, b_status];
    statuses.sort_by_key(|s| s.is_hit());
    assert_eq!(statuses, [CacheStatus::Miss, CacheStatus::Hit]);
}

#[tokio::test]
async fn test_get_or_try_insert_with_does_not_cache_errors() {
    let cache = cache(Duration::from_secs(60));
    let args = hash_fetch_args("flaky", 50);

    let err = cache
        .get_or_try_insert_with(args, || async {
            Err::<Arc<Vec<String>>, _>(std::io::Error::other("upstream down"))
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upstream down");
    assert!(!cache.contains(&args));

    let (_, status) = cache
        .get_or_try_insert_with(args, || async {
            Ok::<_, std::io::Error>(Arc::new(vec![]))
        })
        .await
        .unwrap();
    assert_eq!(status, CacheStatus::Miss);
}

#[test]
fn test_debug_output() {
    let cache = cache(Duration::from_secs(5));
    let debug = format!("{:?}", cache);
    assert!(debug.contains("TtlCache"));
    assert!(debug.contains("fetch_papers"));
}
