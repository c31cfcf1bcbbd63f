use std::sync::Arc;

use anyhow::Result;

use medport_core::api::{AppConfig, AuthApi, MemoryStore, SecureStore, SessionManager};
use medport_core::config::{StorageConfig, StorageKind};

use crate::http::{HttpAuthApi, HttpClient, PortalClient};
use crate::storage::FileStore;

pub fn build_store(cfg: &StorageConfig) -> Arc<dyn SecureStore> {
    match cfg.kind {
        StorageKind::File => Arc::new(FileStore::new(cfg.resolved_path())),
        StorageKind::Memory => Arc::new(MemoryStore::new()),
    }
}

pub fn build_http_client(cfg: &AppConfig) -> Result<HttpClient> {
    HttpClient::new(cfg.api.base_url.clone(), cfg.api.timeout_ms)
}

pub fn build_auth_api(client: &HttpClient) -> Arc<dyn AuthApi> {
    Arc::new(HttpAuthApi::new(client.clone()))
}

pub fn build_portal(client: &HttpClient, store: Arc<dyn SecureStore>) -> PortalClient {
    PortalClient::new(client.clone(), store)
}

/// Session plus a portal client sharing the same credential store.
pub struct Services {
    pub session: SessionManager,
    pub portal: PortalClient,
}

pub fn build_services(cfg: &AppConfig) -> Result<Services> {
    let store = build_store(&cfg.storage);
    let client = build_http_client(cfg)?;
    tracing::debug!(
        target: "medport.factory",
        store = store.name(),
        base_url = %client.base_url(),
        "services built"
    );
    let session = SessionManager::new(store.clone(), build_auth_api(&client));
    let portal = build_portal(&client, store);
    Ok(Services { session, portal })
}
