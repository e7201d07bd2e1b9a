use crate::ports::{Clock, ResolutionCachePort, ResolutionSource};
use dashmap::DashMap;
use ipmon_domain::{AddressClassifier, ResolutionOptions, ResolutionResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

type InflightSender = Arc<watch::Sender<Option<ResolutionResult>>>;
type InflightMap = DashMap<String, InflightSender>;

struct InflightLeaderGuard {
    inflight: Arc<InflightMap>,
    key: String,
}

impl Drop for InflightLeaderGuard {
    fn drop(&mut self) {
        if let Some((_, tx)) = self.inflight.remove(&self.key) {
            let _ = tx.send(None);
        }
    }
}

/// Resolves a domain to its candidate addresses.
///
/// Order per call:
/// 1. local name with exclusion on: synthesize a local result, cache it
/// 2. fresh cache entry
/// 3. each source in turn; a source that refuses local names ends the
///    chain for them with a cached local result
/// 4. nothing answered: an `unknown` result that is not cached
///
/// Never fails; every error is logged and turned into the next stage.
pub struct ResolveDomainUseCase {
    sources: Vec<Arc<dyn ResolutionSource>>,
    cache: Arc<dyn ResolutionCachePort>,
    clock: Arc<dyn Clock>,
    inflight: Option<Arc<InflightMap>>,
}

impl ResolveDomainUseCase {
    pub fn new(
        sources: Vec<Arc<dyn ResolutionSource>>,
        cache: Arc<dyn ResolutionCachePort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            cache,
            clock,
            inflight: None,
        }
    }

    /// Collapses concurrent lookups of the same domain onto one pending task.
    pub fn with_inflight_coalescing(mut self) -> Self {
        self.inflight = Some(Arc::new(DashMap::new()));
        self
    }

    pub fn cache(&self) -> &Arc<dyn ResolutionCachePort> {
        &self.cache
    }

    pub async fn execute(&self, domain: &str, options: ResolutionOptions) -> ResolutionResult {
        if domain.trim().is_empty() {
            return ResolutionResult::unknown(self.clock.now());
        }

        if options.exclude_local_domains && AddressClassifier::is_local_domain_name(domain) {
            debug!(domain = %domain, "Local domain, no lookup");
            let result = ResolutionResult::local(self.clock.now());
            self.cache.put(domain, result.clone());
            return result;
        }

        if let Some(cached) = self.cache.get(domain, options.exclude_local_domains) {
            debug!(domain = %domain, resolver = %cached.resolver(), "Cache HIT");
            return cached;
        }

        match &self.inflight {
            Some(inflight) => self.resolve_coalesced(domain, inflight).await,
            None => self.resolve_through_sources(domain).await,
        }
    }

    async fn resolve_through_sources(&self, domain: &str) -> ResolutionResult {
        let is_local = AddressClassifier::is_local_domain_name(domain);

        for source in &self.sources {
            if is_local && !source.accepts_local_domains() {
                debug!(domain = %domain, source = %source.kind(), "Local domain kept off remote source");
                break;
            }

            match source.lookup(domain).await {
                Ok(result) => {
                    debug!(domain = %domain, resolver = %result.resolver(), "Resolved");
                    self.cache.put(domain, result.clone());
                    return result;
                }
                Err(e) if e.is_unavailable() => {
                    debug!(error = %e, domain = %domain, source = %source.kind(), "Source unavailable");
                }
                Err(e) => {
                    warn!(error = %e, domain = %domain, source = %source.kind(), "Source lookup failed");
                }
            }
        }

        if is_local {
            let result = ResolutionResult::local(self.clock.now());
            self.cache.put(domain, result.clone());
            return result;
        }

        ResolutionResult::unknown(self.clock.now())
    }

    fn register_or_join_inflight(
        inflight: &InflightMap,
        domain: &str,
    ) -> (bool, watch::Receiver<Option<ResolutionResult>>) {
        match inflight.entry(domain.to_string()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                (false, rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, rx) = watch::channel(None::<ResolutionResult>);
                e.insert(Arc::new(tx));
                (true, rx)
            }
        }
    }

    async fn resolve_coalesced(
        &self,
        domain: &str,
        inflight: &Arc<InflightMap>,
    ) -> ResolutionResult {
        let (is_leader, mut rx) = Self::register_or_join_inflight(inflight, domain);

        if !is_leader {
            if rx.changed().await.is_ok() {
                if let Some(result) = rx.borrow().clone() {
                    return result;
                }
            }
            // Leader went away without an answer; run the chain ourselves.
            return self.resolve_through_sources(domain).await;
        }

        let guard = InflightLeaderGuard {
            inflight: Arc::clone(inflight),
            key: domain.to_string(),
        };

        let result = self.resolve_through_sources(domain).await;

        if let Some((_, tx)) = inflight.remove(domain) {
            let _ = tx.send(Some(result.clone()));
        }

        drop(guard);
        result
    }
}
