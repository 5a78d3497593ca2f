use anyhow::Result;
use owo_colors::OwoColorize;
use tzplan_core::{App, Gateway};

use crate::render::RenderIn;
use crate::utils::tui;

pub async fn run<G: Gateway>(app: &App<G>, event_id: Option<&str>) -> Result<()> {
    let logs = match event_id {
        Some(id) => tui::with_spinner("Loading history", app.event_logs(id)).await?,
        None => tui::with_spinner("Loading history", app.all_logs()).await?,
    };

    if logs.is_empty() {
        println!("{}", "No changes recorded".dimmed());
        return Ok(());
    }

    let zone = app.viewing_zone();
    for (i, entry) in logs.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", entry.render_in(&zone));
    }

    Ok(())
}
