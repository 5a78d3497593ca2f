use anyhow::Result;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;
use tzplan_core::timezone::{self, DEFAULT_TIMEZONE, SUPPORTED_TIMEZONES};
use tzplan_core::{App, ClientConfig, Gateway, ProfileDraft};

use crate::render::{Render, render_profile_row};
use crate::utils::tui;

pub fn list<G: Gateway>(app: &App<G>) -> Result<()> {
    let state = app.store().state();

    if state.profiles.is_empty() {
        println!("{}", "No profiles yet".dimmed());
        println!("\nCreate one with:\n  tzplan profiles create <name> --timezone <zone>");
        return Ok(());
    }

    let selected = state.current_profile.as_ref().map(|p| p.id.as_str());
    for profile in &state.profiles {
        println!("{}", render_profile_row(profile, selected == Some(profile.id.as_str())));
    }

    Ok(())
}

pub async fn create<G: Gateway>(
    app: &App<G>,
    name: Option<String>,
    timezone: Option<String>,
) -> Result<()> {
    let interactive = name.is_none();

    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("  Name")
            .interact_text()?,
    };

    let timezone = match timezone {
        Some(tz) => tz,
        None if interactive => prompt_timezone()?,
        None => DEFAULT_TIMEZONE.to_string(),
    };

    if !timezone::is_supported(&timezone) {
        println!(
            "{}",
            format!("  {} is not in the usual list; see `tzplan timezones`", timezone).dimmed()
        );
    }

    let draft = ProfileDraft::new(name, timezone);
    let profile = tui::with_spinner("Creating profile", app.create_profile(&draft)).await?;

    println!("{}", format!("  Created: {}", profile.render()).green());
    Ok(())
}

fn prompt_timezone() -> Result<String> {
    let default = SUPPORTED_TIMEZONES
        .iter()
        .position(|z| *z == DEFAULT_TIMEZONE)
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("  Timezone")
        .items(SUPPORTED_TIMEZONES)
        .default(default)
        .interact()?;

    Ok(SUPPORTED_TIMEZONES[idx].to_string())
}

/// Select a profile now and remember it as the default for later runs.
pub async fn select<G: Gateway>(app: &App<G>, id: &str) -> Result<()> {
    let profile = tui::with_spinner("Selecting profile", app.select_profile(id)).await?;

    let path = ClientConfig::config_path()?;
    ClientConfig::remember_profile(&path, &profile.id)?;

    println!("{}", format!("  Selected: {}", profile.render()).green());
    Ok(())
}

pub async fn change_timezone<G: Gateway>(app: &App<G>, zone: &str) -> Result<()> {
    let profile = tui::with_spinner("Updating timezone", app.change_timezone(zone)).await?;

    println!("{}", format!("  Updated: {}", profile.render()).green());
    println!("  Now: {}", app.clock()?.bold());
    Ok(())
}
