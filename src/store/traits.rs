//! Settings-store trait — best-effort key-value persistence.

use async_trait::async_trait;

use crate::error::StorageError;

/// Backend-agnostic settings store.
///
/// The contract is deliberately weak: no transactions, and a write is
/// never assumed durable before the next read. The onboarding manager
/// keeps its in-memory record authoritative and treats the store as
/// best-effort.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a setting value. `None` when the key has never been written.
    async fn get_setting(
        &self,
        user_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError>;

    /// Write (upsert) a setting value.
    async fn set_setting(
        &self,
        user_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), StorageError>;
}
