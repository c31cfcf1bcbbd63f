#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use medport_core::api::{
    ApiFailure, AuthApi, LoginRequest, LoginResponse, MemoryStore, RegisterRequest, SecureStore,
    StorageError,
};
use tokio::sync::Notify;

/// Routes `tracing` output through the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// AuthApi that replays scripted login results in order, optionally holding each
/// call until `gate` is notified.
#[derive(Default)]
pub struct ScriptedAuthApi {
    logins: Mutex<VecDeque<Result<LoginResponse, ApiFailure>>>,
    register_result: Mutex<Option<ApiFailure>>,
    pub login_calls: Mutex<Vec<String>>,
    pub register_calls: Mutex<Vec<RegisterRequest>>,
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_json(self, body: &str) -> Self {
        let resp: LoginResponse = serde_json::from_str(body).expect("valid login json");
        self.logins.lock().unwrap().push_back(Ok(resp));
        self
    }

    pub fn with_login_failure(self, failure: ApiFailure) -> Self {
        self.logins.lock().unwrap().push_back(Err(failure));
        self
    }

    pub fn with_register_failure(self, failure: ApiFailure) -> Self {
        *self.register_result.lock().unwrap() = Some(failure);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiFailure> {
        self.login_calls.lock().unwrap().push(request.email.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiFailure::transport("no scripted login left")))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiFailure> {
        self.register_calls.lock().unwrap().push(request.clone());
        match self.register_result.lock().unwrap().take() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

/// Store wrapper that fails reads, writes or deletes for selected keys.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_get: Mutex<HashSet<String>>,
    fail_set: Mutex<HashSet<String>>,
    fail_delete: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_get_on(self, key: &str) -> Self {
        self.fail_get.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn fail_set_on(self, key: &str) -> Self {
        self.fail_set.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn fail_delete_on(self, key: &str) -> Self {
        self.fail_delete.lock().unwrap().insert(key.to_string());
        self
    }
}

#[async_trait]
impl SecureStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_get.lock().unwrap().contains(key) {
            return Err(StorageError::Backend(format!("read refused for {key}")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_set.lock().unwrap().contains(key) {
            return Err(StorageError::Backend(format!("write refused for {key}")));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_delete.lock().unwrap().contains(key) {
            return Err(StorageError::Backend(format!("delete refused for {key}")));
        }
        self.inner.delete(key).await
    }
}

pub const PATIENT_LOGIN: &str =
    r#"{"access_token":"t1","user_type":"patient","user_id":42,"profile_id":null}"#;
pub const DOCTOR_LOGIN: &str =
    r#"{"access_token":"t2","user_type":"doctor","user_id":"7","profile_id":11}"#;
