use serde::{Deserialize, Serialize};

/// User-facing toggles kept in the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub dns_resolve_enabled: bool,
    #[serde(default = "default_true")]
    pub dns_exclude_local: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dns_resolve_enabled: true,
            dns_exclude_local: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub dns_resolve_enabled: Option<bool>,
    #[serde(default)]
    pub dns_exclude_local: Option<bool>,
}

impl Settings {
    pub const DNS_RESOLVE_ENABLED: &'static str = "dnsResolveEnabled";
    pub const DNS_EXCLUDE_LOCAL: &'static str = "dnsExcludeLocal";

    /// Applies the update and reports whether any DNS-affecting value changed.
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        let mut changed = false;
        if let Some(enabled) = update.dns_resolve_enabled {
            changed |= self.dns_resolve_enabled != enabled;
            self.dns_resolve_enabled = enabled;
        }
        if let Some(exclude) = update.dns_exclude_local {
            changed |= self.dns_exclude_local != exclude;
            self.dns_exclude_local = exclude;
        }
        changed
    }
}

fn default_true() -> bool {
    true
}
