use crate::ports::{Clock, SettingsStore};
use crate::services::{DomainRegistry, ObservedRequest};
use crate::use_cases::ResolveDomainUseCase;
use ipmon_domain::{
    DomainRecord, PublicIpReport, ResolutionOptions, ResolutionResult, SecuritySummary, Settings,
    SettingsUpdate, TabId, TabState, UserPublicIp,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Every message the service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    RequestObserved(ObservedRequest),
    TabLoading {
        tab_id: TabId,
    },
    TabRemoved {
        tab_id: TabId,
    },
    UserIpDetected(PublicIpReport),
    GetTabData {
        tab_id: TabId,
        #[serde(default)]
        live_url: Option<String>,
    },
    CheckIpv6Support {
        domain: String,
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    ResolveIps {
        domain: String,
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    ClearDnsCache {
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    GetSettings,
    UpdateSettings(SettingsUpdate),
}

impl Request {
    fn mutates_registry(&self) -> bool {
        !matches!(
            self,
            Request::UserIpDetected(_) | Request::GetSettings | Request::UpdateSettings(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDataView {
    pub domains: Vec<DomainRecord>,
    pub main_domain: Option<String>,
    pub total_requests: u64,
    pub security: SecuritySummary,
    #[serde(rename = "userPublicIP")]
    pub user_public_ip: Option<UserPublicIp>,
}

impl TabDataView {
    fn new(tab: TabState, user_public_ip: Option<UserPublicIp>) -> Self {
        Self {
            total_requests: tab.total_requests(),
            security: tab.security_summary(),
            main_domain: tab.main_domain,
            domains: tab.domains.into_values().collect(),
            user_public_ip,
        }
    }
}

/// A request as sent over a long-lived channel. `id` is opaque to the
/// service and is echoed on the matching reply, which may arrive out of order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub response: Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ack {
        success: bool,
    },
    TabData {
        success: bool,
        data: Option<TabDataView>,
    },
    Ipv6Support {
        success: bool,
        supported: bool,
    },
    Resolution {
        success: bool,
        ips: ResolutionResult,
    },
    Settings {
        success: bool,
        settings: Settings,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl Response {
    fn ack() -> Self {
        Response::Ack { success: true }
    }

    pub fn failure(error: impl ToString) -> Self {
        Response::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Ack { success }
            | Response::TabData { success, .. }
            | Response::Ipv6Support { success, .. }
            | Response::Resolution { success, .. }
            | Response::Settings { success, .. }
            | Response::Failure { success, .. } => *success,
        }
    }
}

pub struct HandleMessageUseCase {
    registry: Arc<DomainRegistry>,
    resolver: Arc<ResolveDomainUseCase>,
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
}

impl HandleMessageUseCase {
    pub fn new(
        registry: Arc<DomainRegistry>,
        resolver: Arc<ResolveDomainUseCase>,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            resolver,
            settings,
            clock,
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        let flush = request.mutates_registry();
        let response = self.dispatch(request).await;

        if flush {
            if let Err(e) = self.registry.flush().await {
                warn!(error = %e, "Registry flush failed");
            }
        }
        response
    }

    pub async fn handle_envelope(&self, envelope: RequestEnvelope) -> ResponseEnvelope {
        ResponseEnvelope {
            id: envelope.id,
            response: self.handle(envelope.request).await,
        }
    }

    async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::RequestObserved(observed) => {
                self.registry.record_url_request(&observed).await;
                Response::ack()
            }
            Request::TabLoading { tab_id } => {
                self.registry.reset_on_navigation(tab_id).await;
                Response::ack()
            }
            Request::TabRemoved { tab_id } => {
                self.registry.evict_on_close(tab_id).await;
                Response::ack()
            }
            Request::UserIpDetected(report) => {
                self.registry.set_user_public_ip(report.into()).await;
                Response::ack()
            }
            Request::GetTabData { tab_id, live_url } => {
                self.get_tab_data(tab_id, live_url.as_deref()).await
            }
            Request::CheckIpv6Support { domain, tab_id } => {
                let result = self
                    .resolver
                    .execute(&domain, ResolutionOptions::default())
                    .await;
                let supported = result.supports_ipv6();
                if let Some(tab_id) = tab_id {
                    self.registry
                        .set_ipv6_support(tab_id, &domain, supported)
                        .await;
                }
                Response::Ipv6Support {
                    success: true,
                    supported,
                }
            }
            Request::ResolveIps { domain, tab_id } => self.resolve_ips(&domain, tab_id).await,
            Request::ClearDnsCache { tab_id } => {
                self.resolver.cache().clear();
                if let Some(tab_id) = tab_id {
                    self.registry.clear_resolutions(tab_id).await;
                }
                debug!(?tab_id, "Resolution cache cleared");
                Response::ack()
            }
            Request::GetSettings => Response::Settings {
                success: true,
                settings: self.load_settings().await,
            },
            Request::UpdateSettings(update) => self.update_settings(update).await,
        }
    }

    async fn load_settings(&self) -> Settings {
        match self.settings.load().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            }
        }
    }

    async fn get_tab_data(&self, tab_id: TabId, live_url: Option<&str>) -> Response {
        match self.registry.restore(tab_id, live_url).await {
            Ok(Some(tab)) => Response::TabData {
                success: true,
                data: Some(TabDataView::new(tab, self.registry.user_public_ip().await)),
            },
            Ok(None) => Response::TabData {
                success: false,
                data: None,
            },
            Err(e) => {
                warn!(error = %e, tab_id, "Failed to restore tab data");
                Response::failure(e)
            }
        }
    }

    async fn resolve_ips(&self, domain: &str, tab_id: Option<TabId>) -> Response {
        let settings = self.load_settings().await;

        if !settings.dns_resolve_enabled {
            return Response::Resolution {
                success: true,
                ips: ResolutionResult::unknown(self.clock.now()),
            };
        }

        let options = ResolutionOptions {
            exclude_local_domains: settings.dns_exclude_local,
        };
        let ips = self.resolver.execute(domain, options).await;

        if let Some(tab_id) = tab_id {
            self.registry
                .attach_resolution(tab_id, domain, ips.clone())
                .await;
        }

        Response::Resolution { success: true, ips }
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Response {
        let mut settings = self.load_settings().await;
        let changed = settings.apply(update);

        if let Err(e) = self.settings.save(&settings).await {
            warn!(error = %e, "Failed to save settings");
            return Response::failure(e);
        }

        if changed {
            self.resolver.cache().clear();
            debug!(?settings, "DNS settings changed, resolution cache cleared");
        }

        Response::Settings {
            success: true,
            settings,
        }
    }
}
