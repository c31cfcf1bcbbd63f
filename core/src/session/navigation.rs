//! 导航选择器：由会话状态决定顶层界面分组

use serde::Serialize;
use tokio::sync::watch;

use super::types::{SessionState, UserType};

/// 顶层界面分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenGroup {
    /// 启动恢复尚未完成
    Loading,
    /// 登录 / 注册
    Auth,
    Patient,
    Doctor,
    Pharmacy,
}

/// 分组内的界面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    PatientDashboard,
    FindDoctors,
    ScanPrescription,
    Insurance,
    Schemes,
    DoctorDashboard,
    MedicinesList,
    MedicineDetail,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::PatientDashboard => "Dashboard",
            Self::FindDoctors => "Find Doctors",
            Self::ScanPrescription => "Scan Rx",
            Self::Insurance => "Insurance",
            Self::Schemes => "Schemes",
            Self::DoctorDashboard => "Doctor Dashboard",
            Self::MedicinesList => "Pharmacy Stock",
            Self::MedicineDetail => "Medicine Details",
        }
    }
}

impl ScreenGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Auth => "auth",
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Pharmacy => "pharmacy",
        }
    }

    /// 分组内的界面，第一个为入口
    pub fn screens(self) -> &'static [Screen] {
        match self {
            Self::Loading => &[],
            Self::Auth => &[Screen::Login, Screen::Register],
            Self::Patient => &[
                Screen::PatientDashboard,
                Screen::FindDoctors,
                Screen::ScanPrescription,
                Screen::Insurance,
                Screen::Schemes,
            ],
            Self::Doctor => &[Screen::DoctorDashboard],
            Self::Pharmacy => &[Screen::MedicinesList, Screen::MedicineDetail],
        }
    }
}

/// 按优先级选择分组：加载中 > 未登录 > 角色分组 > 未知角色回退到登录
pub fn select_screen(state: &SessionState) -> ScreenGroup {
    if state.is_loading() {
        return ScreenGroup::Loading;
    }
    if !state.is_authenticated() {
        return ScreenGroup::Auth;
    }
    match state.user_type() {
        Some(UserType::Patient) => ScreenGroup::Patient,
        Some(UserType::Doctor) => ScreenGroup::Doctor,
        Some(UserType::Pharmacy) => ScreenGroup::Pharmacy,
        Some(UserType::Unknown(_)) | None => ScreenGroup::Auth,
    }
}

/// 订阅会话变更并重新求值的导航器
pub struct Navigator {
    rx: watch::Receiver<SessionState>,
}

impl Navigator {
    pub(crate) fn new(rx: watch::Receiver<SessionState>) -> Self {
        Self { rx }
    }

    pub fn current(&self) -> ScreenGroup {
        select_screen(&self.rx.borrow())
    }

    /// 等待下一次会话变更；会话管理器被销毁时返回 None
    pub async fn changed(&mut self) -> Option<ScreenGroup> {
        self.rx.changed().await.ok()?;
        let group = select_screen(&self.rx.borrow_and_update());
        Some(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_overrides_everything() {
        assert_eq!(select_screen(&SessionState::loading()), ScreenGroup::Loading);
    }

    #[test]
    fn test_signed_out_goes_to_auth() {
        assert_eq!(select_screen(&SessionState::signed_out()), ScreenGroup::Auth);
    }

    #[test]
    fn test_role_groups() {
        let cases = [
            (UserType::Patient, ScreenGroup::Patient),
            (UserType::Doctor, ScreenGroup::Doctor),
            (UserType::Pharmacy, ScreenGroup::Pharmacy),
            (UserType::Unknown("admin".to_string()), ScreenGroup::Auth),
        ];
        for (role, expected) in cases {
            let state = SessionState::authenticated("t", role, "1", None);
            assert_eq!(select_screen(&state), expected);
        }
    }

    #[test]
    fn test_group_screens() {
        assert_eq!(ScreenGroup::Patient.screens().len(), 5);
        assert_eq!(ScreenGroup::Auth.screens()[0], Screen::Login);
        assert!(ScreenGroup::Loading.screens().is_empty());
        assert_eq!(ScreenGroup::Pharmacy.screens()[1].title(), "Medicine Details");
    }

    #[tokio::test]
    async fn test_navigator_follows_changes() {
        let (tx, rx) = watch::channel(SessionState::loading());
        let mut nav = Navigator::new(rx);
        assert_eq!(nav.current(), ScreenGroup::Loading);

        tx.send_replace(SessionState::authenticated("t", UserType::Doctor, "9", None));
        assert_eq!(nav.changed().await, Some(ScreenGroup::Doctor));

        drop(tx);
        assert_eq!(nav.changed().await, None);
    }
}
