//! 会话状态类型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 角色标签
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserType {
    /// 患者
    Patient,
    /// 医生
    Doctor,
    /// 药房
    Pharmacy,
    /// 无法识别的角色标签（原样保留，导航时视为未登录）
    Unknown(String),
}

impl UserType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Pharmacy => "pharmacy",
            Self::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for UserType {
    fn from(tag: &str) -> Self {
        match tag {
            "patient" => Self::Patient,
            "doctor" => Self::Doctor,
            "pharmacy" => Self::Pharmacy,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for UserType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "patient" | "doctor" | "pharmacy" => Self::from(tag.as_str()),
            _ => Self::Unknown(tag),
        }
    }
}

impl From<UserType> for String {
    fn from(user_type: UserType) -> Self {
        match user_type {
            UserType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会话状态
///
/// 字段只能通过构造函数设置，从而保证 `is_authenticated` 与三项凭据一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// 不透明的 bearer 凭据
    token: Option<String>,
    /// 角色标签
    user_type: Option<UserType>,
    /// 账户 ID（字符串化）
    user_id: Option<String>,
    /// 角色档案 ID，登录后也可能为空
    profile_id: Option<String>,
    /// token / user_type / user_id 全部存在且非空
    is_authenticated: bool,
    /// 仅在启动恢复完成前为 true
    is_loading: bool,
}

impl SessionState {
    /// 进程启动时的初始状态
    pub fn loading() -> Self {
        Self {
            token: None,
            user_type: None,
            user_id: None,
            profile_id: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    /// 未登录（恢复完成或已登出）
    pub fn signed_out() -> Self {
        Self {
            is_loading: false,
            ..Self::loading()
        }
    }

    /// 已登录状态；任一凭据为空时退化为未登录
    pub fn authenticated(
        token: impl Into<String>,
        user_type: UserType,
        user_id: impl Into<String>,
        profile_id: Option<String>,
    ) -> Self {
        let token = token.into();
        let user_id = user_id.into();
        if token.is_empty() || user_id.is_empty() || user_type.as_str().is_empty() {
            return Self::signed_out();
        }
        Self {
            token: Some(token),
            user_type: Some(user_type),
            user_id: Some(user_id),
            profile_id: profile_id.filter(|p| !p.is_empty()),
            is_authenticated: true,
            is_loading: false,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_type(&self) -> Option<&UserType> {
        self.user_type.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}
