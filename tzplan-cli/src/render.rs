//! TUI rendering traits for tzplan types.
//!
//! Times are always shown in the viewer's zone, so most renderers take it as
//! an argument.

use chrono::{DateTime, NaiveDate, Utc};
use owo_colors::OwoColorize;
use tzplan_core::model::{ChangedField, EventRef, PartialEvent};
use tzplan_core::timezone;
use tzplan_core::{ChangeLogEntry, Event, Profile};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Rendering that depends on the zone the reader is in.
pub trait RenderIn {
    fn render_in(&self, zone: &str) -> String;
}

impl Render for Profile {
    fn render(&self) -> String {
        format!("{} {} {}", self.name, self.timezone.dimmed(), format!("[{}]", self.id).dimmed())
    }
}

/// Profile list entry, marking the selected one.
pub fn render_profile_row(profile: &Profile, selected: bool) -> String {
    if selected {
        format!("{} {}", "*".green(), profile.render().green())
    } else {
        format!("  {}", profile.render())
    }
}

fn time_in(instant: DateTime<Utc>, zone: &str) -> String {
    timezone::format_in_zone(instant, zone, timezone::TIME_FORMAT)
        .unwrap_or_else(|_| instant.format("%H:%MZ").to_string())
}

fn display_in(instant: DateTime<Utc>, zone: &str) -> String {
    timezone::display_in_zone(instant, zone).unwrap_or_else(|_| instant.to_rfc3339())
}

impl RenderIn for Event {
    fn render_in(&self, zone: &str) -> String {
        let start = time_in(self.start_date, zone);
        let same_day = timezone::project_to_zone(self.start_date, zone)
            .ok()
            .map(|w| w.date)
            == timezone::project_to_zone(self.end_date, zone).ok().map(|w| w.date);
        let end = if same_day {
            time_in(self.end_date, zone)
        } else {
            display_in(self.end_date, zone)
        };

        let mut line = format!(
            "  {:>5} - {} {} {}",
            start,
            end,
            self.title,
            format!("[{}]", self.id).dimmed()
        );
        if self.timezone != zone {
            line.push_str(&format!(" {}", format!("(set in {})", self.timezone).dimmed()));
        }
        line
    }
}

/// Heading for a day of events: "Today", "Tomorrow", or e.g. "Sat Jun 1".
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d, %Y").to_string(),
    }
}

impl RenderIn for ChangeLogEntry {
    fn render_in(&self, zone: &str) -> String {
        let event = match &self.event_id {
            EventRef::Populated {
                title: Some(title), ..
            } => title.clone(),
            other => other.id().to_string(),
        };

        let mut lines = vec![format!(
            "{} {}",
            display_in(self.timestamp, zone).dimmed(),
            event.bold()
        )];

        for field in self.changed_fields() {
            let old = field_value(&self.previous_values, field, zone);
            let new = field_value(&self.new_values, field, zone);
            lines.push(format!(
                "   {}: {} → {}",
                field.label().dimmed(),
                old.red(),
                new.green()
            ));
        }

        if lines.len() == 1 {
            lines.push(format!("   {}", "No tracked fields changed".dimmed()));
        }

        lines.join("\n")
    }
}

fn field_value(values: &PartialEvent, field: ChangedField, zone: &str) -> String {
    let value = match field {
        ChangedField::Title => values.title.clone(),
        ChangedField::StartDate => values.start_date.map(|d| display_in(d, zone)),
        ChangedField::EndDate => values.end_date.map(|d| display_in(d, zone)),
    };
    value.unwrap_or_else(|| "(none)".to_string())
}
