mod helpers;

use async_trait::async_trait;
use helpers::ManualClock;
use ipmon_application::ports::{Clock, ResolutionSource};
use ipmon_application::use_cases::ResolveDomainUseCase;
use ipmon_domain::{DomainError, IpDisplayState, ResolutionOptions, ResolutionResult, ResolverKind};
use ipmon_infrastructure::dns::LruResolutionCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// System source that answers every name with one address and counts calls.
struct CountingSystemSource {
    clock: Arc<ManualClock>,
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl ResolutionSource for CountingSystemSource {
    fn kind(&self) -> ResolverKind {
        ResolverKind::System
    }

    async fn lookup(&self, domain: &str) -> Result<ResolutionResult, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::TransportUnavailable(format!("no host for {domain}")));
        }
        Ok(ResolutionResult::resolved(
            ResolverKind::System,
            vec!["203.0.113.10".to_string()],
            vec![],
            self.clock.now(),
        ))
    }
}

fn pipeline(fail: bool) -> (ResolveDomainUseCase, Arc<CountingSystemSource>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let source = Arc::new(CountingSystemSource {
        clock: clock.clone(),
        calls: AtomicUsize::new(0),
        fail,
    });
    let cache = Arc::new(LruResolutionCache::new(
        100,
        Duration::from_secs(300),
        clock.clone(),
    ));
    let resolver = ResolveDomainUseCase::new(
        vec![source.clone() as Arc<dyn ResolutionSource>],
        cache,
        clock.clone(),
    );
    (resolver, source, clock)
}

#[tokio::test]
async fn test_repeat_lookup_within_ttl_is_served_from_cache() {
    let (resolver, source, clock) = pipeline(false);
    let options = ResolutionOptions::default();

    let first = resolver.execute("example.com", options).await;
    clock.advance_millis(60_000);
    let second = resolver.execute("example.com", options).await;

    assert_eq!(first, second);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_entry_triggers_new_lookup() {
    let (resolver, source, clock) = pipeline(false);
    let options = ResolutionOptions::default();

    let first = resolver.execute("example.com", options).await;
    clock.advance_millis(300_001);
    let second = resolver.execute("example.com", options).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(second.timestamp() > first.timestamp());
}

#[tokio::test]
async fn test_local_name_never_reaches_source() {
    let (resolver, source, _clock) = pipeline(false);

    let result = resolver
        .execute("nas.local", ResolutionOptions::default())
        .await;

    assert!(result.is_local());
    assert_eq!(result.display_state(), IpDisplayState::Local);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert!(resolver.cache().get("nas.local", true).is_some());
}

#[tokio::test]
async fn test_every_source_failing_is_unknown_and_uncached() {
    let (resolver, source, _clock) = pipeline(true);

    let result = resolver
        .execute("example.com", ResolutionOptions::default())
        .await;

    assert_eq!(result.resolver(), ResolverKind::Unknown);
    assert_eq!(result.display_state(), IpDisplayState::Unknown);
    assert!(resolver.cache().is_empty());

    resolver
        .execute("example.com", ResolutionOptions::default())
        .await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}
