use anyhow::Result;
use chrono::Utc;
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;
use tzplan_core::timezone;
use tzplan_core::validation::ValidationError;
use tzplan_core::{App, Event, EventDraft, Gateway, TzPlanError};

use crate::EventFields;
use crate::render::{RenderIn, day_label};
use crate::utils::tui;

pub async fn list<G: Gateway>(app: &App<G>, all: bool, upcoming: bool) -> Result<()> {
    if all || app.store().read(|s| s.current_profile.is_none()) {
        tui::with_spinner("Loading events", app.events().load(None)).await?;
    }

    let zone = app.viewing_zone();
    let state = app.store().state();
    let today = timezone::project_to_zone(Utc::now(), &zone)?.date;

    let cutoff = if upcoming {
        Some(timezone::start_of_day(today, &zone)?)
    } else {
        None
    };

    let events: Vec<&Event> = state
        .events_by_start()
        .into_iter()
        .filter(|e| cutoff.is_none_or(|c| e.end_date >= c))
        .collect();

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day in the viewer's zone
    let mut current_date = None;

    for event in events {
        let date = timezone::project_to_zone(event.start_date, &zone)?.date;

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", day_label(date, today).bold());
            current_date = Some(date);
        }

        println!("{}", event.render_in(&zone));
    }

    println!("\n{}", format!("Times in {}", zone).dimmed());
    Ok(())
}

pub async fn create<G: Gateway>(app: &App<G>, fields: EventFields) -> Result<()> {
    let interactive = fields.title.is_none() || fields.start_date.is_none();

    let mut draft = app.event_form(None)?;
    apply_fields(&mut draft, fields);

    if interactive {
        prompt_missing(&mut draft)?;
    }

    let event = save(app, &draft, None).await?;

    if interactive {
        println!();
    }
    println!("{}", format!("  Created: {}", event.title).green());
    println!("{}", event.render_in(&app.viewing_zone()));
    Ok(())
}

pub async fn edit<G: Gateway>(app: &App<G>, id: &str, fields: EventFields) -> Result<()> {
    if app.store().read(|s| s.event(id).is_none()) {
        tui::with_spinner("Loading events", app.events().load(None)).await?;
    }

    let mut draft = app.event_form(Some(id))?;
    apply_fields(&mut draft, fields);

    let event = save(app, &draft, Some(id)).await?;

    println!("{}", format!("  Updated: {}", event.title).green());
    println!("{}", event.render_in(&app.viewing_zone()));
    Ok(())
}

pub async fn delete<G: Gateway>(app: &App<G>, id: &str, yes: bool) -> Result<()> {
    let title = app
        .store()
        .read(|s| s.event(id).map(|e| e.title.clone()))
        .unwrap_or_else(|| id.to_string());

    // Confirm unless --yes
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", title))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    tui::with_spinner("Deleting event", app.delete_event(id)).await?;

    println!("{}", format!("  Deleted: {}", title).green());
    Ok(())
}

/// Save the draft, printing each invalid field before failing.
async fn save<G: Gateway>(app: &App<G>, draft: &EventDraft, editing: Option<&str>) -> Result<Event> {
    match tui::with_spinner("Saving event", app.save_event(draft, editing)).await {
        Ok(event) => Ok(event),
        Err(TzPlanError::Validation(ValidationError::Fields(errors))) => {
            for (field, error) in errors.iter() {
                eprintln!("  {}: {}", field.as_str().bold(), error.to_string().red());
            }
            anyhow::bail!("Event not saved")
        }
        Err(e) => Err(e.into()),
    }
}

/// Overlay command-line values on the form. A start date without an end
/// date means a same-day event.
fn apply_fields(draft: &mut EventDraft, fields: EventFields) {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(zone) = fields.timezone {
        draft.timezone = zone;
    }
    if let Some(start_time) = fields.start_time {
        draft.start_time = start_time;
    }
    if let Some(end_time) = fields.end_time {
        draft.end_time = end_time;
    }
    if !fields.profiles.is_empty() {
        draft.profiles = fields.profiles;
    }

    match (fields.start_date, fields.end_date) {
        (Some(start), Some(end)) => {
            draft.start_date = start;
            draft.end_date = end;
        }
        (Some(start), None) => {
            if draft.end_date.is_empty() || draft.end_date == draft.start_date {
                draft.end_date = start.clone();
            }
            draft.start_date = start;
        }
        (None, Some(end)) => draft.end_date = end,
        (None, None) => {}
    }
}

fn prompt_missing(draft: &mut EventDraft) -> Result<()> {
    if draft.title.is_empty() {
        draft.title = Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?;
    }

    if draft.start_date.is_empty() {
        draft.start_date = Input::<String>::new()
            .with_prompt("  Date (YYYY-MM-DD)")
            .interact_text()?;
        draft.end_date = draft.start_date.clone();
    }

    draft.start_time = Input::<String>::new()
        .with_prompt(format!("  Starts ({})", draft.timezone))
        .default(draft.start_time.clone())
        .interact_text()?;

    draft.end_time = Input::<String>::new()
        .with_prompt("  Ends")
        .default(draft.end_time.clone())
        .interact_text()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn start_date_alone_makes_a_same_day_event() {
        let mut draft = EventDraft::blank(None);
        apply_fields(
            &mut draft,
            EventFields {
                title: Some("Review".into()),
                start_date: Some("2024-06-01".into()),
                ..EventFields::default()
            },
        );

        assert_eq!(draft.title, "Review");
        assert_eq!(draft.start_date, "2024-06-01");
        assert_eq!(draft.end_date, "2024-06-01");
        assert_eq!(draft.start_time, "09:00");
        assert_eq!(draft.end_time, "17:00");
    }

    #[test]
    fn moving_a_multi_day_event_keeps_its_end_date() {
        let mut draft = EventDraft {
            start_date: "2024-06-01".into(),
            end_date: "2024-06-03".into(),
            ..EventDraft::blank(None)
        };
        apply_fields(
            &mut draft,
            EventFields {
                start_date: Some("2024-06-02".into()),
                ..EventFields::default()
            },
        );

        assert_eq!(draft.start_date, "2024-06-02");
        assert_eq!(draft.end_date, "2024-06-03");
    }

    #[test]
    fn profiles_replace_only_when_given() {
        let mut draft = EventDraft {
            profiles: vec!["p1".into()],
            ..EventDraft::blank(None)
        };

        apply_fields(&mut draft, EventFields::default());
        assert_eq!(draft.profiles, vec!["p1".to_string()]);

        apply_fields(
            &mut draft,
            EventFields {
                profiles: vec!["p2".into(), "p3".into()],
                ..EventFields::default()
            },
        );
        assert_eq!(draft.profiles, vec!["p2".to_string(), "p3".to_string()]);
    }
}
