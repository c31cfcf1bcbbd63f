use std::io::Write;

use crate::commands::cli::{Args, Commands};
use crate::commands::{portal, session};
use medport_core::api as core_api;
use medport_plugins::factory;

/// Builds the services from `cfg` (after flag overrides), restores the session and
/// runs one command. Output goes to `out`.
pub async fn run_app_with_config(
    args: Args,
    mut cfg: core_api::AppConfig,
    out: &mut dyn Write,
) -> Result<i32, core_api::CliError> {
    args.apply_overrides(&mut cfg);
    let services = factory::build_services(&cfg)?;

    let state = services.session.restore().await;
    tracing::debug!(
        target: "medport.cli",
        authenticated = state.is_authenticated(),
        screen = services.session.screen().as_str(),
        "session restored"
    );

    dispatch(args.command, &services, out).await?;
    Ok(0)
}

async fn dispatch(
    cmd: Commands,
    services: &factory::Services,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    let sess = &services.session;
    let portal_client = &services.portal;
    match cmd {
        Commands::Login(a) => session::handle_login(a, sess, out).await,
        Commands::Register(a) => session::handle_register(a, sess, out).await,
        Commands::Logout => session::handle_logout(sess, out).await,
        Commands::Status(a) => session::handle_status(a, sess, out),
        Commands::Doctors => portal::handle_doctors(sess, portal_client, out).await,
        Commands::Medicines => portal::handle_medicines(sess, portal_client, out).await,
        Commands::Medicine(a) => portal::handle_medicine(a, sess, portal_client, out).await,
        Commands::Insurance => portal::handle_insurance(sess, portal_client, out).await,
        Commands::Schemes => portal::handle_schemes(sess, portal_client, out).await,
        Commands::Scan(a) => portal::handle_scan(&a.image, sess, portal_client, out).await,
    }
}

pub fn exit_code_for_error(e: &core_api::CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: IO / storage error
    // 30: auth rejected / validation / not permitted
    // 50: internal/uncategorized
    match e {
        core_api::CliError::Config(_) => 11,
        core_api::CliError::Io(_) => 20,
        core_api::CliError::Storage(_) => 20,
        core_api::CliError::Auth(ae) => match ae {
            core_api::AuthError::Storage(_) => 20,
            core_api::AuthError::Validation(_)
            | core_api::AuthError::Api { .. }
            | core_api::AuthError::Busy => 30,
        },
        core_api::CliError::Unauthorized(_) => 30,
        core_api::CliError::Command(_) => 50,
        core_api::CliError::Anyhow(_) => 50,
    }
}

/// What the user sees on stderr for a failed command.
pub fn error_message(e: &core_api::CliError) -> String {
    match e {
        core_api::CliError::Auth(ae) => ae.user_message(),
        other => other.to_string(),
    }
}
