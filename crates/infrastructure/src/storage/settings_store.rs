use async_trait::async_trait;
use ipmon_application::ports::SettingsStore;
use ipmon_domain::{DomainError, Settings};
use std::path::PathBuf;
use toml_edit::{DocumentMut, Item, Value};

/// Settings kept as top-level booleans in a TOML file. Existing comments
/// and unrelated keys are preserved on save.
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> Result<DocumentMut, DomainError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(DomainError::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        contents.parse::<DocumentMut>().map_err(|e| {
            DomainError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }
}

fn read_bool(doc: &DocumentMut, key: &str, default: bool) -> bool {
    doc.get(key).and_then(Item::as_bool).unwrap_or(default)
}

fn set_val(doc: &mut DocumentMut, key: &str, new_val: Value) {
    match doc.get_mut(key) {
        Some(item @ Item::Value(_)) => {
            let suffix = item.as_value().and_then(|v| v.decor().suffix()).cloned();
            *item = Item::Value(new_val);
            if let (Some(s), Some(v)) = (suffix, item.as_value_mut()) {
                v.decor_mut().set_suffix(s);
            }
        }
        Some(item) => *item = Item::Value(new_val),
        None => {
            doc.insert(key, Item::Value(new_val));
        }
    }
}

#[async_trait]
impl SettingsStore for TomlSettingsStore {
    async fn load(&self) -> Result<Settings, DomainError> {
        let doc = self.read_document().await?;
        let defaults = Settings::default();
        Ok(Settings {
            dns_resolve_enabled: read_bool(
                &doc,
                Settings::DNS_RESOLVE_ENABLED,
                defaults.dns_resolve_enabled,
            ),
            dns_exclude_local: read_bool(
                &doc,
                Settings::DNS_EXCLUDE_LOCAL,
                defaults.dns_exclude_local,
            ),
        })
    }

    async fn save(&self, settings: &Settings) -> Result<(), DomainError> {
        let mut doc = self.read_document().await?;
        set_val(
            &mut doc,
            Settings::DNS_RESOLVE_ENABLED,
            Value::from(settings.dns_resolve_enabled),
        );
        set_val(
            &mut doc,
            Settings::DNS_EXCLUDE_LOCAL,
            Value::from(settings.dns_exclude_local),
        );

        tokio::fs::write(&self.path, doc.to_string())
            .await
            .map_err(|e| {
                DomainError::Persistence(format!("Failed to write {}: {}", self.path.display(), e))
            })
    }
}
