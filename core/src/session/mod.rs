//! # 会话管理模块
//!
//! 负责客户端登录会话的持有、启动恢复与变更，并据此选择顶层界面分组。
//!
//! ## 设计原则
//!
//! 1. **单一所有者**：会话状态只由 `SessionManager` 修改，其余部分只读
//! 2. **显式注入**：存储与认证 API 通过 trait 对象注入，不使用全局单例
//! 3. **变更通知**：每次状态变更都会推送给订阅者，由导航选择器重新求值
//! 4. **互斥命令**：login / register / logout 同一时刻只允许一个在途

mod guard;
pub mod manager;
pub mod navigation;
pub mod types;

pub use manager::SessionManager;
pub use navigation::{select_screen, Navigator, Screen, ScreenGroup};
pub use types::{SessionState, UserType};
