use ipmon_application::ports::{Clock, ResolutionSource};
use ipmon_application::use_cases::ResolveDomainUseCase;
use ipmon_domain::config::NativeMode;
use ipmon_domain::Config;
use ipmon_infrastructure::dns::{DohResolver, HttpsJsonTransport, LruResolutionCache};
use ipmon_infrastructure::native::{
    InProcessMessenger, NativeHost, NativeMessenger, NativeResolverBridge, ProcessMessenger,
};
use ipmon_infrastructure::system::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct ResolverServices {
    pub clock: Arc<dyn Clock>,
    pub cache: Arc<LruResolutionCache>,
    pub native: Arc<NativeResolverBridge>,
    pub resolver: Arc<ResolveDomainUseCase>,
}

impl ResolverServices {
    pub fn new(config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let cache = Arc::new(LruResolutionCache::new(
            config.resolver.cache_capacity,
            Duration::from_secs(config.resolver.cache_ttl_secs),
            clock.clone(),
        ));

        let native = Arc::new(Self::build_native_bridge(config, clock.clone()));
        let doh = Arc::new(DohResolver::new(
            Arc::new(HttpsJsonTransport::new(
                config.doh.endpoint.clone(),
                Duration::from_millis(config.doh.timeout_ms),
            )),
            clock.clone(),
        ));

        let mut sources: Vec<Arc<dyn ResolutionSource>> = Vec::with_capacity(2);
        if native.is_available() {
            sources.push(native.clone());
        }
        sources.push(doh);

        let mut resolver = ResolveDomainUseCase::new(sources, cache.clone(), clock.clone());
        if config.resolver.coalesce_inflight {
            resolver = resolver.with_inflight_coalescing();
        }

        info!(
            native_mode = %config.native.mode,
            doh_endpoint = %config.doh.endpoint,
            cache_capacity = config.resolver.cache_capacity,
            cache_ttl_secs = config.resolver.cache_ttl_secs,
            "Resolver pipeline ready"
        );

        Self {
            clock,
            cache,
            native,
            resolver: Arc::new(resolver),
        }
    }

    fn build_native_bridge(config: &Config, clock: Arc<dyn Clock>) -> NativeResolverBridge {
        let timeout = Duration::from_millis(config.native.timeout_ms);
        let messenger: Arc<dyn NativeMessenger> = match config.native.mode {
            NativeMode::Disabled => return NativeResolverBridge::unavailable(clock),
            NativeMode::InProcess => Arc::new(InProcessMessenger::new(NativeHost::new(timeout))),
            NativeMode::Process => Arc::new(ProcessMessenger::new(
                config.native.host_command.clone(),
                timeout,
            )),
        };
        NativeResolverBridge::new(messenger, clock)
    }
}
