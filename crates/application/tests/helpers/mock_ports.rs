#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ipmon_application::ports::{
    Clock, ConnectivityProbe, PeerConnection, ResolutionCachePort, ResolutionSource,
    SettingsStore, SnapshotStore,
};
use ipmon_domain::{
    DomainError, ResolutionResult, ResolverKind, Settings, TabSnapshots,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

pub const T0_MS: i64 = 1_700_000_000_000;

// ── Clock ──────────────────────────────────────────────────────────────────

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::at_millis(T0_MS)
    }

    pub fn at_millis(ms: i64) -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_millis_opt(ms).unwrap()),
        }
    }

    pub fn advance_millis(&self, ms: i64) {
        *self.now.lock().unwrap() += Duration::milliseconds(ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── Resolution sources ─────────────────────────────────────────────────────

/// Source stub with a per-domain answer table and a call counter.
pub struct MockSource {
    kind: ResolverKind,
    accepts_local: bool,
    answers: RwLock<HashMap<String, (Vec<String>, Vec<String>)>>,
    failure: RwLock<Option<DomainError>>,
    delay: Option<std::time::Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(kind: ResolverKind) -> Self {
        Self {
            kind,
            accepts_local: kind != ResolverKind::Doh,
            answers: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn native() -> Self {
        Self::new(ResolverKind::System)
    }

    pub fn doh() -> Self {
        Self::new(ResolverKind::Doh)
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn answer(self, domain: &str, ipv4: &[&str], ipv6: &[&str]) -> Self {
        self.answers.write().unwrap().insert(
            domain.to_string(),
            (
                ipv4.iter().map(|s| s.to_string()).collect(),
                ipv6.iter().map(|s| s.to_string()).collect(),
            ),
        );
        self
    }

    pub fn failing(self, error: DomainError) -> Self {
        *self.failure.write().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResolutionSource for MockSource {
    fn kind(&self) -> ResolverKind {
        self.kind
    }

    fn accepts_local_domains(&self) -> bool {
        self.accepts_local
    }

    async fn lookup(&self, domain: &str) -> Result<ResolutionResult, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failure.read().unwrap().clone() {
            return Err(error);
        }

        let answer = self.answers.read().unwrap().get(domain).cloned();
        match answer {
            Some((ipv4, ipv6)) => Ok(ResolutionResult::resolved(
                self.kind,
                ipv4,
                ipv6,
                Utc.timestamp_millis_opt(T0_MS).unwrap(),
            )),
            None => Err(DomainError::ResolutionFailed(format!(
                "no mock answer for {domain}"
            ))),
        }
    }
}

// ── Cache ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockResolutionCache {
    entries: RwLock<HashMap<String, ResolutionResult>>,
    clears: AtomicUsize,
}

impl MockResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.entries.read().unwrap().contains_key(domain)
    }

    pub fn raw(&self, domain: &str) -> Option<ResolutionResult> {
        self.entries.read().unwrap().get(domain).cloned()
    }
}

impl ResolutionCachePort for MockResolutionCache {
    fn get(&self, domain: &str, exclude_local_domains: bool) -> Option<ResolutionResult> {
        self.entries
            .read()
            .unwrap()
            .get(domain)
            .filter(|r| exclude_local_domains || !r.is_local())
            .cloned()
    }

    fn put(&self, domain: &str, result: ResolutionResult) {
        self.entries
            .write()
            .unwrap()
            .insert(domain.to_string(), result);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.entries.write().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

// ── Stores ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSnapshotStore {
    snapshots: Mutex<TabSnapshots>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MockSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: TabSnapshots) -> Self {
        Self {
            snapshots: Mutex::new(snapshots),
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> TabSnapshots {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotStore for MockSnapshotStore {
    async fn load(&self) -> Result<TabSnapshots, DomainError> {
        Ok(self.snapshots.lock().unwrap().clone())
    }

    async fn save(&self, snapshots: &TabSnapshots) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("mock save failure".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.snapshots.lock().unwrap() = snapshots.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSettingsStore {
    settings: Mutex<Settings>,
}

impl MockSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    pub fn current(&self) -> Settings {
        *self.settings.lock().unwrap()
    }
}

#[async_trait]
impl SettingsStore for MockSettingsStore {
    async fn load(&self) -> Result<Settings, DomainError> {
        Ok(*self.settings.lock().unwrap())
    }

    async fn save(&self, settings: &Settings) -> Result<(), DomainError> {
        *self.settings.lock().unwrap() = *settings;
        Ok(())
    }
}

// ── WebRTC ─────────────────────────────────────────────────────────────────

pub struct MockPeer {
    closes: Arc<AtomicUsize>,
}

impl MockPeer {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                closes: Arc::clone(&closes),
            },
            closes,
        )
    }
}

impl PeerConnection for MockPeer {
    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockProbe {
    pub has_ipv6: bool,
}

#[async_trait]
impl ConnectivityProbe for MockProbe {
    async fn has_ipv6_connectivity(&self) -> bool {
        self.has_ipv6
    }
}
