//! Unvalidated form input for profiles and events.

use crate::model::{Event, EventPayload, NewProfile, Profile};
use crate::timezone::{self, DEFAULT_TIMEZONE};
use crate::validation::{self, Field, FieldErrors, ValidationError};

const DEFAULT_START_TIME: &str = "09:00";
const DEFAULT_END_TIME: &str = "17:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub timezone: String,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        ProfileDraft {
            name: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl ProfileDraft {
    pub fn new(name: impl Into<String>, timezone: impl Into<String>) -> Self {
        ProfileDraft {
            name: name.into(),
            timezone: timezone.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors.check(Field::Name, validation::validate_profile_name(&self.name));
        errors.check(Field::Timezone, validation::validate_timezone(&self.timezone));
        errors.into_result()
    }

    /// Validate and build the creation request. The name is trimmed.
    pub fn to_request(&self) -> Result<NewProfile, ValidationError> {
        self.validate()?;
        Ok(NewProfile {
            name: self.name.trim().to_string(),
            timezone: self.timezone.clone(),
        })
    }
}

/// Event form state: wall-clock strings as typed, in `timezone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub profiles: Vec<String>,
    pub timezone: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        EventDraft::blank(None)
    }
}

impl EventDraft {
    /// New-event defaults: the current profile preselected and its zone
    /// used for entry, a 09:00–17:00 slot, dates left empty.
    pub fn blank(current_profile: Option<&Profile>) -> Self {
        EventDraft {
            title: String::new(),
            description: String::new(),
            profiles: current_profile.map(|p| vec![p.id.clone()]).unwrap_or_default(),
            timezone: current_profile
                .map(|p| p.timezone.clone())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            start_date: String::new(),
            start_time: DEFAULT_START_TIME.to_string(),
            end_date: String::new(),
            end_time: DEFAULT_END_TIME.to_string(),
        }
    }

    /// Populate the form from a stored event, reading its instants on the
    /// viewer's wall clock. The draft's zone becomes the viewer's zone so that
    /// saving the form unchanged reproduces the same instants.
    ///
    /// Saving the edit also re-stamps the event's authoring zone: the
    /// payload's `timezone` is the editor's zone, not the one the event was
    /// created in.
    pub fn for_edit(event: &Event, viewing_zone: &str) -> Result<Self, ValidationError> {
        let start = timezone::project_to_zone(event.start_date, viewing_zone)?;
        let end = timezone::project_to_zone(event.end_date, viewing_zone)?;

        Ok(EventDraft {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            profiles: event.profile_ids(),
            timezone: viewing_zone.to_string(),
            start_date: start.date_string(),
            start_time: start.time_string(),
            end_date: end.date_string(),
            end_time: end.time_string(),
        })
    }

    /// Run every field check, reporting all failures at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors.check(Field::Title, validation::validate_event_title(&self.title));
        errors.check(Field::Profiles, validation::validate_profiles(&self.profiles));
        errors.check(
            Field::Dates,
            validation::validate_event_dates(
                &self.start_date,
                &self.start_time,
                &self.end_date,
                &self.end_time,
                &self.timezone,
            ),
        );
        errors.into_result()
    }

    /// Validate, then convert the wall-clock fields to instants in the
    /// draft's zone.
    pub fn to_payload(&self) -> Result<EventPayload, ValidationError> {
        self.validate()?;

        let start_date =
            timezone::local_to_instant(&self.start_date, &self.start_time, &self.timezone)?;
        let end_date = timezone::local_to_instant(&self.end_date, &self.end_time, &self.timezone)?;

        Ok(EventPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            profiles: self
                .profiles
                .iter()
                .filter(|p| !p.trim().is_empty())
                .cloned()
                .collect(),
            timezone: self.timezone.clone(),
            start_date,
            end_date,
        })
    }
}
