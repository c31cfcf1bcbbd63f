use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use medport_core::api as core_api;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    Patient,
    Doctor,
    Pharmacy,
}

impl From<RoleArg> for core_api::UserType {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Patient => core_api::UserType::Patient,
            RoleArg::Doctor => core_api::UserType::Doctor,
            RoleArg::Pharmacy => core_api::UserType::Pharmacy,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "medport", version, about = "Patient / doctor / pharmacy portal client")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL including the `/api` prefix. Overrides config and MEDPORT_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file path. Overrides config and MEDPORT_STORAGE_PATH.
    #[arg(long, global = true, conflicts_with = "memory_store")]
    pub store: Option<String>,

    /// Keep the session in memory only; nothing survives the process.
    #[arg(long, global = true, default_value_t = false)]
    pub memory_store: bool,
}

impl Args {
    /// Flags win over the config file and environment.
    pub fn apply_overrides(&self, cfg: &mut core_api::AppConfig) {
        if let Some(url) = self.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            cfg.api.base_url = url.to_string();
        }
        if let Some(path) = self.store.as_deref().filter(|p| !p.trim().is_empty()) {
            cfg.storage.kind = core_api::StorageKind::File;
            cfg.storage.path = path.to_string();
        }
        if self.memory_store {
            cfg.storage.kind = core_api::StorageKind::Memory;
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,

    /// 10-digit phone number.
    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub password: String,

    /// Full name.
    #[arg(long)]
    pub name: String,

    #[arg(long, value_enum, default_value_t = RoleArg::Patient)]
    pub role: RoleArg,

    /// City or area; sent with every registration.
    #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub location: String,

    /// Required for doctors, ignored for other roles.
    #[arg(long)]
    pub specialization: Option<String>,
}

impl RegisterArgs {
    pub fn into_request(self) -> core_api::RegisterRequest {
        core_api::RegisterRequest {
            email: self.email,
            phone: self.phone,
            password: self.password,
            name: self.name,
            user_type: self.role.into(),
            location: self.location,
            specialization: self.specialization,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct MedicineArgs {
    pub id: i64,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScanArgs {
    /// Prescription photo (JPEG).
    pub image: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Login(LoginArgs),
    Register(RegisterArgs),
    Logout,
    Status(StatusArgs),
    /// Available doctors (patient).
    Doctors,
    /// Pharmacy stock (pharmacy).
    Medicines,
    /// One medicine with its explanation (pharmacy).
    Medicine(MedicineArgs),
    /// Insurance recommendations (patient).
    Insurance,
    /// Government schemes (patient).
    Schemes,
    /// Analyze a prescription photo (patient).
    Scan(ScanArgs),
}
