use crate::ports::{Clock, SnapshotStore};
use ipmon_domain::{
    DomainError, RequestType, ResolutionResult, SecuritySummary, TabId, TabSnapshot,
    TabSnapshots, TabState, UserPublicIp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

const EXTENSION_SCHEMES: &[&str] = &["safari-web-extension://", "safari-extension://"];

/// Hosts this service talks to on its own behalf; never attributed to a tab.
const SERVICE_DOMAINS: &[&str] = &[
    "dns.google",
    "stun.l.google.com",
    "stun1.l.google.com",
    "stun2.l.google.com",
    "stun3.l.google.com",
    "stun4.l.google.com",
    "ipv6.google.com",
];

/// A request seen by the browser's interception hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedRequest {
    pub tab_id: TabId,
    pub url: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[serde(default)]
    pub initiator: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub origin_url: Option<String>,
}

impl ObservedRequest {
    fn is_extension_initiated(&self) -> bool {
        [&self.initiator, &self.document_url, &self.origin_url]
            .into_iter()
            .flatten()
            .any(|origin| EXTENSION_SCHEMES.iter().any(|s| origin.starts_with(s)))
    }
}

/// Per-tab inventory of contacted domains plus the user's own public address.
pub struct DomainRegistry {
    tabs: RwLock<HashMap<TabId, TabState>>,
    user_public_ip: RwLock<Option<UserPublicIp>>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    max_snapshot_age: chrono::Duration,
    dirty: AtomicBool,
    flush_lock: Mutex<()>,
}

impl DomainRegistry {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        max_snapshot_age: chrono::Duration,
    ) -> Self {
        Self {
            tabs: RwLock::new(HashMap::new()),
            user_public_ip: RwLock::new(None),
            store,
            clock,
            max_snapshot_age,
            dirty: AtomicBool::new(false),
            flush_lock: Mutex::new(()),
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Records one request. Background requests (negative tab ids) are dropped.
    pub async fn record_request(
        &self,
        tab_id: TabId,
        domain: &str,
        protocol: &str,
        request_type: RequestType,
    ) -> bool {
        if tab_id < 0 || domain.is_empty() {
            return false;
        }

        let now = self.clock.now();
        let mut tabs = self.tabs.write().await;
        let tab = tabs.entry(tab_id).or_insert_with(|| TabState::new(now));
        tab.record_request(domain, protocol, request_type);
        drop(tabs);

        self.mark_dirty();
        true
    }

    /// Parses the request URL and records it. Returns the recorded host, or
    /// `None` when the request was filtered out.
    pub async fn record_url_request(&self, request: &ObservedRequest) -> Option<String> {
        if request.tab_id < 0 || request.is_extension_initiated() {
            return None;
        }

        let url = match url::Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, url = %request.url, "Unparseable request URL");
                return None;
            }
        };

        let domain = url.host_str()?.to_string();
        if SERVICE_DOMAINS.contains(&domain.as_str()) {
            return None;
        }

        let now = self.clock.now();
        let mut tabs = self.tabs.write().await;
        let tab = tabs
            .entry(request.tab_id)
            .or_insert_with(|| TabState::new(now));
        if request.request_type == RequestType::MainFrame {
            tab.set_main_frame(&domain, &request.url, now);
        }
        tab.record_request(&domain, url.scheme(), request.request_type);
        drop(tabs);

        self.mark_dirty();
        Some(domain)
    }

    pub async fn snapshot(&self, tab_id: TabId) -> Option<TabState> {
        self.tabs.read().await.get(&tab_id).cloned()
    }

    /// Replaces the domain's resolution. Returns `false` if the tab or the
    /// domain is not known.
    pub async fn attach_resolution(
        &self,
        tab_id: TabId,
        domain: &str,
        result: ResolutionResult,
    ) -> bool {
        let mut tabs = self.tabs.write().await;
        let Some(record) = tabs
            .get_mut(&tab_id)
            .and_then(|tab| tab.domains.get_mut(domain))
        else {
            return false;
        };
        record.attach_resolution(result);
        drop(tabs);

        self.mark_dirty();
        true
    }

    pub async fn set_ipv6_support(&self, tab_id: TabId, domain: &str, supported: bool) -> bool {
        let mut tabs = self.tabs.write().await;
        let Some(record) = tabs
            .get_mut(&tab_id)
            .and_then(|tab| tab.domains.get_mut(domain))
        else {
            return false;
        };
        record.ipv6_support = Some(supported).into();
        drop(tabs);

        self.mark_dirty();
        true
    }

    pub async fn clear_resolutions(&self, tab_id: TabId) {
        let mut tabs = self.tabs.write().await;
        if let Some(tab) = tabs.get_mut(&tab_id) {
            tab.domains.values_mut().for_each(|d| d.clear_resolution());
            drop(tabs);
            self.mark_dirty();
        }
    }

    /// A new top-level navigation started; everything seen so far is stale.
    pub async fn reset_on_navigation(&self, tab_id: TabId) {
        self.tabs.write().await.remove(&tab_id);
        self.mark_dirty();
    }

    pub async fn evict_on_close(&self, tab_id: TabId) {
        if self.tabs.write().await.remove(&tab_id).is_some() {
            self.mark_dirty();
        }
    }

    pub async fn security_summary(&self, tab_id: TabId) -> SecuritySummary {
        self.tabs
            .read()
            .await
            .get(&tab_id)
            .map_or(SecuritySummary::NoData, TabState::security_summary)
    }

    pub async fn set_user_public_ip(&self, ip: UserPublicIp) {
        info!(ipv4 = ?ip.ipv4, ipv6 = ?ip.ipv6, "User public IP updated");
        *self.user_public_ip.write().await = Some(ip);
    }

    pub async fn user_public_ip(&self) -> Option<UserPublicIp> {
        self.user_public_ip.read().await.clone()
    }

    /// Returns the tab's state, reloading persisted snapshots if it is not
    /// in memory. A restored tab whose URL no longer matches `live_url` is
    /// discarded.
    pub async fn restore(
        &self,
        tab_id: TabId,
        live_url: Option<&str>,
    ) -> Result<Option<TabState>, DomainError> {
        if let Some(tab) = self.snapshot(tab_id).await {
            return Ok(Some(tab));
        }

        let snapshots = self.store.load().await?;
        let now = self.clock.now();

        let mut tabs = self.tabs.write().await;
        let mut restored = 0usize;
        for (id, snapshot) in snapshots {
            let state = TabState::from(snapshot);
            if state.is_older_than(now, self.max_snapshot_age) {
                continue;
            }
            if let std::collections::hash_map::Entry::Vacant(slot) = tabs.entry(id) {
                slot.insert(state);
                restored += 1;
            }
        }
        debug!(restored, "Restored tab snapshots");

        let Some(matches) = tabs.get(&tab_id).map(|tab| tab.matches_live_url(live_url)) else {
            return Ok(None);
        };

        if !matches {
            debug!(tab_id, "Restored tab no longer matches its URL");
            tabs.remove(&tab_id);
            drop(tabs);
            self.mark_dirty();
            return Ok(None);
        }

        Ok(tabs.get(&tab_id).cloned())
    }

    /// Writes all tabs through the snapshot store if anything changed since
    /// the last successful flush. Flushes never overlap.
    pub async fn flush(&self) -> Result<(), DomainError> {
        let _guard = self.flush_lock.lock().await;
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let snapshots: TabSnapshots = self
            .tabs
            .read()
            .await
            .iter()
            .map(|(id, tab)| (*id, TabSnapshot::from(tab)))
            .collect();

        if let Err(e) = self.store.save(&snapshots).await {
            warn!(error = %e, "Failed to persist tab snapshots");
            self.mark_dirty();
            return Err(e);
        }
        Ok(())
    }
}
