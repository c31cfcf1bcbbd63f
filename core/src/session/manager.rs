//! 会话管理器

use std::sync::Arc;

use tokio::sync::watch;

use super::guard::InFlight;
use super::navigation::{select_screen, Navigator, ScreenGroup};
use super::types::{SessionState, UserType};
use crate::auth::{AuthApi, LoginRequest, LoginResponse, RegisterRequest};
use crate::error::{AuthError, StorageError};
use crate::storage::{
    is_placeholder, SecureStore, PROFILE_ID_KEY, SESSION_KEYS, TOKEN_KEY, USER_ID_KEY,
    USER_TYPE_KEY,
};

const LOGIN_FALLBACK: &str = "Login failed";
const REGISTER_FALLBACK: &str = "Registration failed";

/// 会话管理器
///
/// 克隆得到的是同一会话的句柄；每个运行中的应用只应构造一个。
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    /// 持久化存储
    store: Arc<dyn SecureStore>,
    /// 认证 API
    api: Arc<dyn AuthApi>,
    /// 当前状态及变更通知
    state_tx: watch::Sender<SessionState>,
    /// login / register / logout 在途标记
    in_flight: InFlight,
}

impl SessionManager {
    /// 创建会话管理器，初始状态为加载中
    pub fn new(store: Arc<dyn SecureStore>, api: Arc<dyn AuthApi>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::loading());

        let inner = SessionManagerInner {
            store,
            api,
            state_tx,
            in_flight: InFlight::default(),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// 当前状态快照
    pub fn state(&self) -> SessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// 订阅状态变更
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// 基于当前订阅的导航器
    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.subscribe())
    }

    /// 当前应显示的界面分组
    pub fn screen(&self) -> ScreenGroup {
        select_screen(&self.inner.state_tx.borrow())
    }

    /// 共享的持久化存储（门户 API 客户端用它读取 token）
    pub fn store(&self) -> Arc<dyn SecureStore> {
        Arc::clone(&self.inner.store)
    }

    /// 是否有命令在途
    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.is_busy()
    }

    fn publish(&self, next: SessionState) {
        self.inner.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    /// 启动时从持久化存储恢复会话
    ///
    /// 读取失败按“无数据”处理；
    /// 无论结果如何，结束后都不再处于加载中。
    pub async fn restore(&self) -> SessionState {
        tracing::debug!(
            target: "medport.session",
            stage = "session.restore.in",
            store = %self.inner.store.name()
        );

        let token = self.read_key(TOKEN_KEY).await;
        let user_type = self.read_key(USER_TYPE_KEY).await;
        let user_id = self.read_key(USER_ID_KEY).await;
        let mut profile_id = self.read_raw(PROFILE_ID_KEY).await;

        // 修复旧版本写入的 "null" / "undefined" / 空串
        if profile_id.as_deref().is_some_and(is_placeholder) {
            profile_id = None;
            match self.inner.store.delete(PROFILE_ID_KEY).await {
                Ok(()) => tracing::info!(
                    target: "medport.session",
                    stage = "session.restore.repair",
                    key = PROFILE_ID_KEY,
                    "removed placeholder profile id"
                ),
                Err(err) => tracing::warn!(
                    target: "medport.session",
                    stage = "session.restore.repair",
                    key = PROFILE_ID_KEY,
                    error = %err,
                    "failed to remove placeholder profile id"
                ),
            }
        }

        let state = match (token, user_type, user_id) {
            (Some(token), Some(user_type), Some(user_id)) => {
                SessionState::authenticated(token, UserType::from(user_type), user_id, profile_id)
            }
            _ => SessionState::signed_out(),
        };

        tracing::info!(
            target: "medport.session",
            stage = "session.restore.out",
            authenticated = state.is_authenticated(),
            user_type = state.user_type().map(UserType::as_str).unwrap_or("-"),
            has_profile = state.profile_id().is_some()
        );

        self.publish(state.clone());
        state
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        self.read_raw(key).await.filter(|v| !v.is_empty())
    }

    /// 原样读取；读取失败记录后按缺失处理
    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.inner.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    target: "medport.session",
                    stage = "session.storage.read",
                    key = key,
                    error = %err,
                    "storage read failed, treating as absent"
                );
                None
            }
        }
    }

    /// 登录；成功后持久化四项凭据并替换会话状态
    ///
    /// 失败时会话状态与存储保持调用前的样子。
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionState, AuthError> {
        let guard = self
            .inner
            .in_flight
            .try_begin("login")
            .ok_or(AuthError::Busy)?;
        let request_id = guard.request_id();

        let request = LoginRequest::new(email, password);
        request.validate().map_err(AuthError::Validation)?;

        tracing::info!(
            target: "medport.session",
            stage = "session.login.in",
            request_id = %request_id,
            api = %self.inner.api.name(),
            email_len = email.len()
        );

        let response = self.inner.api.login(&request).await.map_err(|failure| {
            tracing::warn!(
                target: "medport.session",
                stage = "session.login.failed",
                request_id = %request_id,
                status = ?failure.status,
                reason = %failure.reason
            );
            AuthError::Api {
                status: failure.status,
                message: failure.message_or(LOGIN_FALLBACK),
            }
        })?;

        let next = SessionState::authenticated(
            response.access_token.clone(),
            response.user_type.clone(),
            response.user_id.clone(),
            response.profile_id.clone(),
        );
        if !next.is_authenticated() {
            tracing::warn!(
                target: "medport.session",
                stage = "session.login.incomplete",
                request_id = %request_id,
                "login response missing token, role or user id"
            );
            return Err(AuthError::Api {
                status: None,
                message: LOGIN_FALLBACK.to_string(),
            });
        }

        self.persist(&response).await.inspect_err(|err| {
            tracing::error!(
                target: "medport.session",
                stage = "session.login.persist",
                request_id = %request_id,
                error = %err
            );
        })?;

        self.publish(next.clone());

        tracing::info!(
            target: "medport.session",
            stage = "session.login.out",
            request_id = %request_id,
            command = guard.command(),
            user_type = %response.user_type,
            has_profile = response.profile_id.is_some()
        );
        Ok(next)
    }

    /// 写入四项凭据；缺失的 profile id 删除而不是写占位符。
    /// 任一写入失败时把已改动的键恢复为调用前的值。
    async fn persist(&self, response: &LoginResponse) -> Result<(), StorageError> {
        let previous = self.read_previous().await;
        let writes = [
            (TOKEN_KEY, Some(response.access_token.as_str())),
            (USER_TYPE_KEY, Some(response.user_type.as_str())),
            (USER_ID_KEY, Some(response.user_id.as_str())),
            (PROFILE_ID_KEY, response.profile_id.as_deref()),
        ];

        for (key, value) in writes {
            let result = match value {
                Some(value) => self.inner.store.set(key, value).await,
                None => self.inner.store.delete(key).await,
            };
            if let Err(err) = result {
                self.rollback(&previous).await;
                return Err(err);
            }
        }
        Ok(())
    }

    async fn read_previous(&self) -> Vec<(&'static str, Option<String>)> {
        let mut previous = Vec::with_capacity(SESSION_KEYS.len());
        for key in SESSION_KEYS {
            // 读不到的键无法恢复，跳过
            if let Ok(value) = self.inner.store.get(key).await {
                previous.push((key, value));
            }
        }
        previous
    }

    async fn rollback(&self, previous: &[(&'static str, Option<String>)]) {
        for (key, value) in previous {
            let result = match value {
                Some(value) => self.inner.store.set(key, value).await,
                None => self.inner.store.delete(key).await,
            };
            if let Err(err) = result {
                tracing::warn!(
                    target: "medport.session",
                    stage = "session.storage.rollback",
                    key = *key,
                    error = %err
                );
            }
        }
    }

    /// 注册新账户；不改变会话状态（注册不等于登录）
    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        let guard = self
            .inner
            .in_flight
            .try_begin("register")
            .ok_or(AuthError::Busy)?;
        let request_id = guard.request_id();

        request.validate().map_err(AuthError::Validation)?;
        let payload = request.to_payload();

        tracing::info!(
            target: "medport.session",
            stage = "session.register.in",
            request_id = %request_id,
            user_type = %payload.user_type,
            has_specialization = payload.specialization.is_some()
        );

        self.inner.api.register(&payload).await.map_err(|failure| {
            tracing::warn!(
                target: "medport.session",
                stage = "session.register.failed",
                request_id = %request_id,
                status = ?failure.status,
                reason = %failure.reason
            );
            AuthError::Api {
                status: failure.status,
                message: failure.message_or(REGISTER_FALLBACK),
            }
        })?;

        tracing::info!(
            target: "medport.session",
            stage = "session.register.out",
            request_id = %request_id,
            command = guard.command()
        );
        Ok(())
    }

    /// 登出：无条件删除四个键并重置状态，可重复调用
    pub async fn logout(&self) -> Result<(), AuthError> {
        let guard = self
            .inner
            .in_flight
            .try_begin("logout")
            .ok_or(AuthError::Busy)?;

        for key in SESSION_KEYS {
            if let Err(err) = self.inner.store.delete(key).await {
                tracing::warn!(
                    target: "medport.session",
                    stage = "session.logout.delete",
                    request_id = %guard.request_id(),
                    key = key,
                    error = %err
                );
            }
        }

        self.publish(SessionState::signed_out());
        tracing::info!(
            target: "medport.session",
            stage = "session.logout.out",
            request_id = %guard.request_id(),
            command = guard.command()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ApiFailure;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct StubApi {
        login: Mutex<Option<Result<LoginResponse, ApiFailure>>>,
        register_calls: Mutex<Vec<RegisterRequest>>,
    }

    impl StubApi {
        fn login_ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                login: Mutex::new(Some(Ok(serde_json::from_str(body).unwrap()))),
                register_calls: Mutex::new(Vec::new()),
            })
        }

        fn login_err(failure: ApiFailure) -> Arc<Self> {
            Arc::new(Self {
                login: Mutex::new(Some(Err(failure))),
                register_calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AuthApi for StubApi {
        fn name(&self) -> &str {
            "stub"
        }

        async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, ApiFailure> {
            self.login
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ApiFailure::transport("no scripted response")))
        }

        async fn register(&self, request: &RegisterRequest) -> Result<(), ApiFailure> {
            self.register_calls.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_restore_empty_store_is_signed_out() {
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(store, StubApi::login_err(ApiFailure::transport("x")));
        assert_eq!(manager.screen(), ScreenGroup::Loading);

        let state = manager.restore().await;
        assert_eq!(state, SessionState::signed_out());
        assert_eq!(manager.screen(), ScreenGroup::Auth);
    }

    #[tokio::test]
    async fn test_restore_repairs_null_profile_id() {
        let store = Arc::new(MemoryStore::with_entries([
            (TOKEN_KEY, "t1"),
            (USER_TYPE_KEY, "doctor"),
            (USER_ID_KEY, "5"),
            (PROFILE_ID_KEY, "null"),
        ]));
        let manager = SessionManager::new(
            store.clone(),
            StubApi::login_err(ApiFailure::transport("x")),
        );

        let state = manager.restore().await;
        assert!(state.is_authenticated());
        assert_eq!(state.profile_id(), None);
        assert!(!store.contains(PROFILE_ID_KEY).await);
        assert_eq!(manager.screen(), ScreenGroup::Doctor);
    }

    #[tokio::test]
    async fn test_login_success_replaces_state_and_persists() {
        let store = Arc::new(MemoryStore::with_entries([(PROFILE_ID_KEY, "old")]));
        let api = StubApi::login_ok(
            r#"{"access_token":"t1","user_type":"patient","user_id":42,"profile_id":null}"#,
        );
        let manager = SessionManager::new(store.clone(), api);
        manager.restore().await;

        let state = manager
            .login("patient1@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(
            state,
            SessionState::authenticated("t1", UserType::Patient, "42", None)
        );
        assert_eq!(manager.state(), state);
        assert_eq!(manager.screen(), ScreenGroup::Patient);

        let saved = store.snapshot().await;
        assert_eq!(saved.get(TOKEN_KEY).map(String::as_str), Some("t1"));
        assert_eq!(saved.get(USER_ID_KEY).map(String::as_str), Some("42"));
        assert!(!saved.contains_key(PROFILE_ID_KEY));
    }

    #[tokio::test]
    async fn test_login_failure_leaves_state_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let api = StubApi::login_err(ApiFailure::rejected(
            401,
            Some("Invalid credentials".to_string()),
            "401 Unauthorized",
        ));
        let manager = SessionManager::new(store.clone(), api);
        let before = manager.restore().await;

        let err = manager
            .login("patient1@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(manager.state(), before);
        assert!(store.snapshot().await.is_empty());
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn test_login_empty_credentials_rejected_without_call() {
        let api = StubApi::login_ok(r#"{"access_token":"t1","user_type":"patient","user_id":1}"#);
        let manager = SessionManager::new(Arc::new(MemoryStore::new()), api.clone());
        manager.restore().await;

        let err = manager.login("", "password123").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        // scripted response was not consumed
        assert!(api.login.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_does_not_touch_session() {
        let api = StubApi::login_err(ApiFailure::transport("x"));
        let manager = SessionManager::new(Arc::new(MemoryStore::new()), api.clone());
        let before = manager.restore().await;

        manager
            .register(RegisterRequest {
                email: "new@example.com".to_string(),
                phone: "9876543210".to_string(),
                password: "password1".to_string(),
                name: "New User".to_string(),
                user_type: UserType::Pharmacy,
                location: "Delhi".to_string(),
                specialization: Some("ignored".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(manager.state(), before);
        let calls = api.register_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].specialization, None);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let store = Arc::new(MemoryStore::with_entries([
            (TOKEN_KEY, "t1"),
            (USER_TYPE_KEY, "pharmacy"),
            (USER_ID_KEY, "8"),
            (PROFILE_ID_KEY, "3"),
        ]));
        let manager = SessionManager::new(
            store.clone(),
            StubApi::login_err(ApiFailure::transport("x")),
        );
        manager.restore().await;
        assert_eq!(manager.screen(), ScreenGroup::Pharmacy);

        manager.logout().await.unwrap();
        manager.logout().await.unwrap();
        assert_eq!(manager.state(), SessionState::signed_out());
        assert!(store.snapshot().await.is_empty());
    }
}
