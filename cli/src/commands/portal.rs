//! Role-screen commands backed by the portal API
use std::io::Write;
use std::path::Path;

use crate::commands::cli::MedicineArgs;
use medport_core::api as core_api;
use medport_plugins::http::{
    Doctor, GovernmentSchemes, InsuranceRecommendations, Medicine, MedicineDetails,
    PortalClient, PortalHttpError, PrescriptionAnalysis,
};

/// Returns the signed-in user id when the session lands on `group`.
pub fn require_group(
    state: &core_api::SessionState,
    group: core_api::ScreenGroup,
) -> Result<String, core_api::CliError> {
    let current = core_api::select_screen(state);
    if current == group {
        return Ok(state.user_id().unwrap_or_default().to_string());
    }
    if !state.is_authenticated() {
        return Err(core_api::CliError::Unauthorized(
            "not logged in; run `medport login` first".to_string(),
        ));
    }
    let role = state.user_type().map(|t| t.as_str()).unwrap_or("unknown");
    Err(core_api::CliError::Unauthorized(format!(
        "this command is for {} accounts (signed in as {})",
        group.as_str(),
        role
    )))
}

fn portal_error(what: &str, err: PortalHttpError) -> core_api::CliError {
    let msg = err.detail().map(str::to_string).unwrap_or_else(|| err.to_string());
    core_api::CliError::Command(format!("{what} failed: {msg}"))
}

/// Handle doctors command
pub async fn handle_doctors(
    session: &core_api::SessionManager,
    portal: &PortalClient,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    require_group(&session.state(), core_api::ScreenGroup::Patient)?;
    let doctors = portal
        .available_doctors()
        .await
        .map_err(|e| portal_error("Loading doctors", e))?;
    write!(out, "{}", render_doctors(&doctors))?;
    Ok(())
}

/// Handle medicines command
pub async fn handle_medicines(
    session: &core_api::SessionManager,
    portal: &PortalClient,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    require_group(&session.state(), core_api::ScreenGroup::Pharmacy)?;
    let medicines = portal
        .medicines()
        .await
        .map_err(|e| portal_error("Loading medicines", e))?;
    write!(out, "{}", render_medicines(&medicines))?;
    Ok(())
}

/// Handle medicine command
pub async fn handle_medicine(
    args: MedicineArgs,
    session: &core_api::SessionManager,
    portal: &PortalClient,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    require_group(&session.state(), core_api::ScreenGroup::Pharmacy)?;
    let details = portal
        .medicine_details(args.id)
        .await
        .map_err(|e| portal_error("Loading medicine details", e))?;
    write!(out, "{}", render_medicine_details(&details))?;
    Ok(())
}

/// Handle insurance command
pub async fn handle_insurance(
    session: &core_api::SessionManager,
    portal: &PortalClient,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    let user_id = require_group(&session.state(), core_api::ScreenGroup::Patient)?;
    let recs = portal
        .insurance_recommendations(&user_id)
        .await
        .map_err(|e| portal_error("Loading insurance recommendations", e))?;
    write!(out, "{}", render_insurance(&recs))?;
    Ok(())
}

/// Handle schemes command
pub async fn handle_schemes(
    session: &core_api::SessionManager,
    portal: &PortalClient,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    let user_id = require_group(&session.state(), core_api::ScreenGroup::Patient)?;
    let schemes = portal
        .government_schemes(&user_id)
        .await
        .map_err(|e| portal_error("Loading government schemes", e))?;
    write!(out, "{}", render_schemes(&schemes))?;
    Ok(())
}

/// Handle scan command
pub async fn handle_scan(
    image: &Path,
    session: &core_api::SessionManager,
    portal: &PortalClient,
    out: &mut dyn Write,
) -> Result<(), core_api::CliError> {
    let user_id = require_group(&session.state(), core_api::ScreenGroup::Patient)?;
    let bytes = tokio::fs::read(image).await?;
    tracing::debug!(
        target: "medport.cli",
        image = %image.display(),
        bytes = bytes.len(),
        "uploading prescription"
    );
    let analysis = portal
        .analyze_prescription(&user_id, bytes)
        .await
        .map_err(|e| portal_error("Prescription analysis", e))?;
    write!(out, "{}", render_analysis(&analysis))?;
    Ok(())
}

pub fn render_doctors(doctors: &[Doctor]) -> String {
    if doctors.is_empty() {
        return "No doctors available.\n".to_string();
    }
    let mut s = String::new();
    for d in doctors {
        s.push_str(&format!(
            "#{} {} - {}\n",
            d.id,
            d.name,
            d.specialization.as_deref().unwrap_or("General")
        ));
        let mut facts = Vec::new();
        if let Some(years) = d.experience {
            facts.push(format!("{years} yrs"));
        }
        if let Some(loc) = d.location.as_deref() {
            facts.push(loc.to_string());
        }
        if let Some(fee) = d.consultation_fee {
            facts.push(format!("fee {fee}"));
        }
        if let Some(wa) = d.whatsapp.as_deref() {
            facts.push(format!("https://wa.me/{wa}"));
        }
        if !facts.is_empty() {
            s.push_str(&format!("   {}\n", facts.join(" | ")));
        }
    }
    s
}

pub fn render_medicines(medicines: &[Medicine]) -> String {
    if medicines.is_empty() {
        return "No medicines in stock.\n".to_string();
    }
    medicines
        .iter()
        .map(|m| {
            format!(
                "#{} {} ({})\n",
                m.id,
                m.name,
                m.category.as_deref().unwrap_or("uncategorized")
            )
        })
        .collect()
}

pub fn render_medicine_details(details: &MedicineDetails) -> String {
    let m = &details.medicine;
    let mut s = format!("{}\n", m.name);
    if let Some(g) = m.generic_name.as_deref() {
        s.push_str(&format!("generic: {g}\n"));
    }
    if let Some(u) = m.usage.as_deref() {
        s.push_str(&format!("usage: {u}\n"));
    }
    if let Some(d) = m.dosage.as_deref() {
        s.push_str(&format!("dosage: {d}\n"));
    }
    let explanation = details
        .ai_explanation
        .as_ref()
        .and_then(|e| e.explanation.as_deref());
    if let Some(text) = explanation {
        s.push_str(&format!("\n{text}\n"));
    }
    s
}

pub fn render_insurance(recs: &InsuranceRecommendations) -> String {
    let mut s = String::new();
    for p in &recs.available_plans {
        s.push_str(&format!(
            "#{} {} ({}) cover {} premium {}\n",
            p.id,
            p.name,
            p.provider.as_deref().unwrap_or("-"),
            p.coverage_amount,
            p.premium
        ));
    }
    if let Some(text) = recs
        .ai_recommendations
        .as_ref()
        .and_then(|r| r.recommendations.as_deref())
    {
        s.push_str(&format!("\n{text}\n"));
    }
    if s.is_empty() {
        s.push_str("No insurance plans found.\n");
    }
    s
}

pub fn render_schemes(schemes: &GovernmentSchemes) -> String {
    match schemes.text() {
        Some(text) => format!("{text}\n"),
        None => "No schemes found.\n".to_string(),
    }
}

pub fn render_analysis(result: &PrescriptionAnalysis) -> String {
    let Some(analysis) = result.analysis.as_ref() else {
        return "No analysis returned.\n".to_string();
    };
    let mut s = String::new();
    if let Some(summary) = analysis.summary.as_deref() {
        s.push_str(&format!("summary: {summary}\n"));
    }
    if let Some(notes) = analysis.doctor_notes.as_deref() {
        s.push_str(&format!("doctor notes: {notes}\n"));
    }
    s
}
