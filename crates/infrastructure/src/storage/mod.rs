pub mod memory;
pub mod settings_store;
pub mod snapshot_store;

pub use memory::{InMemorySettingsStore, InMemorySnapshotStore};
pub use settings_store::TomlSettingsStore;
pub use snapshot_store::JsonSnapshotStore;
