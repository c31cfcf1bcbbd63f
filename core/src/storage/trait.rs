use async_trait::async_trait;

use crate::error::StorageError;

/// String-keyed, string-valued persisted store.
///
/// Mirrors the platform secure-store primitive: `get` of a missing key is `Ok(None)`,
/// `delete` of a missing key is not an error.
#[async_trait]
pub trait SecureStore: Send + Sync {
    fn name(&self) -> &str;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
