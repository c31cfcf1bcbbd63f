//! login / register / logout / status
use std::io::Write;

use crate::commands::cli::{LoginArgs, OutputFormat, RegisterArgs, StatusArgs};
use medport_core::api as core_api;
use serde_json::json;

/// Handle login command
pub async fn handle_login(
    args: LoginArgs,
    session: &core_api::SessionManager,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    let state = session.login(&args.email, &args.password).await?;
    let role = state.user_type().map(|t| t.as_str()).unwrap_or("unknown");
    writeln!(
        out,
        "Logged in as {} (user {})",
        role,
        state.user_id().unwrap_or("-")
    )?;
    writeln!(out, "screen: {}", session.screen().as_str())?;
    Ok(())
}

/// Handle register command
pub async fn handle_register(
    args: RegisterArgs,
    session: &core_api::SessionManager,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    session.register(args.into_request()).await?;
    writeln!(out, "Registration successful! Please login.")?;
    Ok(())
}

/// Handle logout command
pub async fn handle_logout(
    session: &core_api::SessionManager,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    session.logout().await?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Handle status command
pub fn handle_status(
    args: StatusArgs,
    session: &core_api::SessionManager,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    let state = session.state();
    let screen = core_api::select_screen(&state);
    match args.format {
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(&status_json(&state, screen))
                .map_err(|e| core_api::CliError::Command(e.to_string()))?;
            writeln!(out, "{body}")?;
        }
        OutputFormat::Text => {
            write!(out, "{}", status_text(&state, screen))?;
        }
    }
    Ok(())
}

/// The token is never printed, only whether one is held.
pub fn status_json(
    state: &core_api::SessionState,
    screen: core_api::ScreenGroup,
) -> serde_json::Value {
    json!({
        "authenticated": state.is_authenticated(),
        "loading": state.is_loading(),
        "has_token": state.token().is_some(),
        "user_type": state.user_type().map(|t| t.as_str()),
        "user_id": state.user_id(),
        "profile_id": state.profile_id(),
        "screen": screen,
        "screens": screen.screens().iter().map(|s| s.title()).collect::<Vec<_>>(),
    })
}

pub fn status_text(state: &core_api::SessionState, screen: core_api::ScreenGroup) -> String {
    let mut s = String::new();
    if state.is_authenticated() {
        s.push_str("status: logged in\n");
        s.push_str(&format!(
            "role: {}\n",
            state.user_type().map(|t| t.as_str()).unwrap_or("-")
        ));
        s.push_str(&format!("user_id: {}\n", state.user_id().unwrap_or("-")));
        s.push_str(&format!("profile_id: {}\n", state.profile_id().unwrap_or("-")));
    } else {
        s.push_str("status: logged out\n");
    }
    let titles: Vec<&str> = screen.screens().iter().map(|s| s.title()).collect();
    s.push_str(&format!("screen: {} [{}]\n", screen.as_str(), titles.join(", ")));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_logged_out() {
        let text = status_text(
            &core_api::SessionState::signed_out(),
            core_api::ScreenGroup::Auth,
        );
        assert_eq!(text, "status: logged out\nscreen: auth [Login, Register]\n");
    }

    #[test]
    fn test_status_json_hides_token() {
        let state = core_api::SessionState::authenticated(
            "secret-token",
            core_api::UserType::Doctor,
            "7",
            Some("11".to_string()),
        );
        let value = status_json(&state, core_api::select_screen(&state));
        assert_eq!(value["screen"], "doctor");
        assert_eq!(value["user_id"], "7");
        assert_eq!(value["profile_id"], "11");
        assert_eq!(value["has_token"], true);
        assert!(!value.to_string().contains("secret-token"));
    }
}
