mod helpers;

use helpers::{ManualClock, MockResolutionCache, MockSettingsStore, MockSnapshotStore, MockSource};
use ipmon_application::ports::{ResolutionCachePort, ResolutionSource};
use ipmon_application::services::DomainRegistry;
use ipmon_application::use_cases::{
    HandleMessageUseCase, Request, RequestEnvelope, ResolveDomainUseCase, Response,
};
use ipmon_domain::{Ipv6Support, ResolverKind, Settings, SettingsUpdate};
use std::sync::Arc;

struct Harness {
    router: HandleMessageUseCase,
    registry: Arc<DomainRegistry>,
    native: Arc<MockSource>,
    cache: Arc<MockResolutionCache>,
    settings: Arc<MockSettingsStore>,
    snapshots: Arc<MockSnapshotStore>,
}

fn harness_with(native: MockSource, settings: Settings) -> Harness {
    let clock = Arc::new(ManualClock::new());
    let native = Arc::new(native);
    let cache = Arc::new(MockResolutionCache::new());
    let settings = Arc::new(MockSettingsStore::with_settings(settings));
    let snapshots = Arc::new(MockSnapshotStore::new());

    let sources: Vec<Arc<dyn ResolutionSource>> = vec![native.clone() as Arc<dyn ResolutionSource>];
    let resolver = Arc::new(ResolveDomainUseCase::new(sources, cache.clone(), clock.clone()));
    let registry = Arc::new(DomainRegistry::new(
        snapshots.clone(),
        clock.clone(),
        chrono::Duration::minutes(30),
    ));
    let router = HandleMessageUseCase::new(registry.clone(), resolver, settings.clone(), clock);

    Harness {
        router,
        registry,
        native,
        cache,
        settings,
        snapshots,
    }
}

fn harness() -> Harness {
    harness_with(
        MockSource::native().answer("example.com", &["93.184.216.34"], &["2606:2800:220:1::1"]),
        Settings::default(),
    )
}

fn parse(json: &str) -> Request {
    serde_json::from_str(json).unwrap()
}

// ── wire format ────────────────────────────────────────────────────────────

#[test]
fn test_request_json_tags() {
    assert_eq!(
        parse(r#"{"action":"tabLoading","tabId":3}"#),
        Request::TabLoading { tab_id: 3 }
    );
    assert_eq!(
        parse(r#"{"action":"resolveIps","domain":"example.com","tabId":3}"#),
        Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: Some(3)
        }
    );
    assert_eq!(
        parse(r#"{"action":"clearDnsCache"}"#),
        Request::ClearDnsCache { tab_id: None }
    );
    assert_eq!(
        parse(r#"{"action":"updateSettings","dnsExcludeLocal":false}"#),
        Request::UpdateSettings(SettingsUpdate {
            dns_resolve_enabled: None,
            dns_exclude_local: Some(false),
        })
    );
    assert!(matches!(
        parse(r#"{"action":"requestObserved","tabId":1,"url":"https://a.example/","type":"image"}"#),
        Request::RequestObserved(_)
    ));
    assert!(serde_json::from_str::<Request>(r#"{"action":"selfDestruct"}"#).is_err());
}

#[tokio::test]
async fn test_envelope_id_is_echoed() {
    let h = harness();
    let envelope: RequestEnvelope =
        serde_json::from_str(r#"{"id":"req-9","action":"getSettings"}"#).unwrap();
    assert_eq!(envelope.request, Request::GetSettings);

    let reply = h.router.handle_envelope(envelope).await;

    assert_eq!(reply.id, Some(serde_json::json!("req-9")));
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["id"], "req-9");
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_envelope_without_id_serializes_bare_response() {
    let h = harness();
    let envelope: RequestEnvelope =
        serde_json::from_str(r#"{"action":"tabLoading","tabId":1}"#).unwrap();

    let reply = h.router.handle_envelope(envelope).await;

    assert_eq!(serde_json::to_string(&reply).unwrap(), r#"{"success":true}"#);
}

// ── dispatch ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_observed_requests_show_up_in_tab_data() {
    let h = harness();

    h.router
        .handle(parse(
            r#"{"action":"requestObserved","tabId":5,"url":"https://example.com/","type":"main_frame"}"#,
        ))
        .await;
    let response = h
        .router
        .handle(Request::GetTabData {
            tab_id: 5,
            live_url: Some("https://example.com/".to_string()),
        })
        .await;

    match response {
        Response::TabData {
            success: true,
            data: Some(data),
        } => {
            assert_eq!(data.main_domain.as_deref(), Some("example.com"));
            assert_eq!(data.domains.len(), 1);
            assert_eq!(data.total_requests, 1);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(h.snapshots.saves(), 1);
}

#[tokio::test]
async fn test_get_tab_data_for_unknown_tab() {
    let h = harness();

    let response = h
        .router
        .handle(Request::GetTabData {
            tab_id: 99,
            live_url: None,
        })
        .await;

    assert_eq!(
        response,
        Response::TabData {
            success: false,
            data: None
        }
    );
}

#[tokio::test]
async fn test_resolve_ips_attaches_result() {
    let h = harness();
    h.registry
        .record_request(5, "example.com", "https", ipmon_domain::RequestType::MainFrame)
        .await;

    let response = h
        .router
        .handle(Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: Some(5),
        })
        .await;

    match response {
        Response::Resolution { success, ips } => {
            assert!(success);
            assert_eq!(ips.resolver(), ResolverKind::System);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    let tab = h.registry.snapshot(5).await.unwrap();
    assert_eq!(tab.domains["example.com"].ipv6_support, Ipv6Support::Supported);
    assert!(tab.domains["example.com"].resolution.is_some());
}

#[tokio::test]
async fn test_resolve_ips_disabled_skips_pipeline() {
    let h = harness_with(
        MockSource::native().answer("example.com", &["93.184.216.34"], &[]),
        Settings {
            dns_resolve_enabled: false,
            dns_exclude_local: true,
        },
    );

    let response = h
        .router
        .handle(Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: None,
        })
        .await;

    match response {
        Response::Resolution { ips, .. } => {
            assert!(!ips.has_addresses());
            assert_eq!(ips.resolver(), ResolverKind::Unknown);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(h.native.calls(), 0);
}

#[tokio::test]
async fn test_resolve_ips_honours_local_exclusion_setting() {
    let h = harness_with(
        MockSource::native().answer("nas.lan", &["192.168.1.9"], &[]),
        Settings {
            dns_resolve_enabled: true,
            dns_exclude_local: false,
        },
    );

    let response = h
        .router
        .handle(Request::ResolveIps {
            domain: "nas.lan".to_string(),
            tab_id: None,
        })
        .await;

    match response {
        Response::Resolution { ips, .. } => assert_eq!(ips.ipv4(), ["192.168.1.9"]),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn test_check_ipv6_support() {
    let h = harness();
    h.registry
        .record_request(2, "example.com", "https", ipmon_domain::RequestType::Script)
        .await;

    let response = h
        .router
        .handle(Request::CheckIpv6Support {
            domain: "example.com".to_string(),
            tab_id: Some(2),
        })
        .await;

    assert_eq!(
        response,
        Response::Ipv6Support {
            success: true,
            supported: true
        }
    );
    let tab = h.registry.snapshot(2).await.unwrap();
    assert_eq!(tab.domains["example.com"].ipv6_support, Ipv6Support::Supported);
    assert!(tab.domains["example.com"].resolution.is_none());
}

#[tokio::test]
async fn test_clear_dns_cache_clears_cache_and_tab() {
    let h = harness();
    h.registry
        .record_request(5, "example.com", "https", ipmon_domain::RequestType::MainFrame)
        .await;
    h.router
        .handle(Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: Some(5),
        })
        .await;
    assert_eq!(h.cache.len(), 1);

    let response = h.router.handle(Request::ClearDnsCache { tab_id: Some(5) }).await;

    assert!(response.is_success());
    assert_eq!(h.cache.len(), 0);
    let tab = h.registry.snapshot(5).await.unwrap();
    assert!(tab.domains["example.com"].resolution.is_none());
}

#[tokio::test]
async fn test_tab_loading_discards_tab() {
    let h = harness();
    h.registry
        .record_request(5, "example.com", "https", ipmon_domain::RequestType::MainFrame)
        .await;

    h.router.handle(Request::TabLoading { tab_id: 5 }).await;

    assert!(h.registry.snapshot(5).await.is_none());
    assert!(h.snapshots.stored().is_empty());
}

#[tokio::test]
async fn test_tab_loading_keeps_resolution_cache() {
    let h = harness();
    h.router
        .handle(Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: Some(5),
        })
        .await;
    assert_eq!(h.cache.len(), 1);

    h.router.handle(Request::TabLoading { tab_id: 5 }).await;

    assert_eq!(h.cache.len(), 1);
}

#[tokio::test]
async fn test_user_ip_detected_stored() {
    let h = harness();

    h.router
        .handle(parse(
            r#"{"action":"userIpDetected","ipv4":"203.0.113.7","ipv6":null,"local":["192.168.1.4"],"hasIpv6Connectivity":false,"timestamp":1700000000000}"#,
        ))
        .await;

    let ip = h.registry.user_public_ip().await.unwrap();
    assert_eq!(ip.ipv4.as_deref(), Some("203.0.113.7"));
    assert!(!ip.has_ipv6_connectivity);
}

// ── settings ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_settings_toggle_clears_cache() {
    let h = harness();
    h.router
        .handle(Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: None,
        })
        .await;
    assert_eq!(h.cache.len(), 1);

    let response = h
        .router
        .handle(Request::UpdateSettings(SettingsUpdate {
            dns_resolve_enabled: None,
            dns_exclude_local: Some(false),
        }))
        .await;

    assert!(response.is_success());
    assert_eq!(h.cache.len(), 0);
    assert!(!h.settings.current().dns_exclude_local);
}

#[tokio::test]
async fn test_settings_unchanged_keeps_cache() {
    let h = harness();
    h.router
        .handle(Request::ResolveIps {
            domain: "example.com".to_string(),
            tab_id: None,
        })
        .await;

    h.router
        .handle(Request::UpdateSettings(SettingsUpdate {
            dns_resolve_enabled: Some(true),
            dns_exclude_local: None,
        }))
        .await;

    assert_eq!(h.cache.len(), 1);
    assert_eq!(h.cache.clears(), 0);
}

#[tokio::test]
async fn test_get_settings() {
    let h = harness();

    let response = h.router.handle(Request::GetSettings).await;

    assert_eq!(
        response,
        Response::Settings {
            success: true,
            settings: Settings::default()
        }
    );
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "success": true,
            "settings": {"dnsResolveEnabled": true, "dnsExcludeLocal": true}
        })
    );
}
