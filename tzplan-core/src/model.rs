//! Entities mirrored from the backend and the payloads sent to it.
//!
//! Field names follow the backend's JSON (`_id`, camelCase). Instants are
//! always UTC; an event's `timezone` only records the zone its author typed
//! the wall-clock values in.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A timezone-bound identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, timezone: impl Into<String>) -> Self {
        Profile {
            id: id.into(),
            name: name.into(),
            timezone: timezone.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields of a profile that can change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub timezone: Option<String>,
}

impl ProfilePatch {
    pub fn timezone(zone: impl Into<String>) -> Self {
        ProfilePatch {
            name: None,
            timezone: Some(zone.into()),
        }
    }

    pub fn apply(&self, profile: &mut Profile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(zone) = &self.timezone {
            profile.timezone = zone.clone();
        }
    }
}

impl From<&Profile> for ProfilePatch {
    fn from(p: &Profile) -> Self {
        ProfilePatch {
            name: Some(p.name.clone()),
            timezone: Some(p.timezone.clone()),
        }
    }
}

/// Profiles on an event arrive either as bare ids or populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileRef {
    Id(String),
    Populated(Profile),
}

impl ProfileRef {
    pub fn id(&self) -> &str {
        match self {
            ProfileRef::Id(id) => id,
            ProfileRef::Populated(p) => &p.id,
        }
    }
}

/// A time range shared across profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub profiles: Vec<ProfileRef>,
    pub timezone: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn profile_ids(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn includes_profile(&self, profile_id: &str) -> bool {
        self.profiles.iter().any(|p| p.id() == profile_id)
    }
}

/// A subset of event fields: a store patch, or one side of a change log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<ProfileRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl PartialEvent {
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(profiles) = &self.profiles {
            event.profiles = profiles.clone();
        }
        if let Some(zone) = &self.timezone {
            event.timezone = zone.clone();
        }
        if let Some(start) = self.start_date {
            event.start_date = start;
        }
        if let Some(end) = self.end_date {
            event.end_date = end;
        }
    }
}

impl From<&Event> for PartialEvent {
    fn from(e: &Event) -> Self {
        PartialEvent {
            title: Some(e.title.clone()),
            description: Some(e.description.clone()),
            profiles: Some(e.profiles.clone()),
            timezone: Some(e.timezone.clone()),
            start_date: Some(e.start_date),
            end_date: Some(e.end_date),
        }
    }
}

/// The event a log entry belongs to, bare or populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl EventRef {
    pub fn id(&self) -> &str {
        match self {
            EventRef::Id(id) => id,
            EventRef::Populated { id, .. } => id,
        }
    }
}

/// Event fields whose changes the backend records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangedField {
    Title,
    StartDate,
    EndDate,
}

impl ChangedField {
    pub fn label(&self) -> &'static str {
        match self {
            ChangedField::Title => "Title",
            ChangedField::StartDate => "Start",
            ChangedField::EndDate => "End",
        }
    }
}

/// `changes` object of a log entry: one flag per tracked field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFlags {
    #[serde(default)]
    pub title: bool,
    #[serde(default)]
    pub start_date: bool,
    #[serde(default)]
    pub end_date: bool,
}

/// An append-only audit record of one event update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_id: EventRef,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub changes: ChangeFlags,
    #[serde(default)]
    pub previous_values: PartialEvent,
    #[serde(default)]
    pub new_values: PartialEvent,
}

impl ChangeLogEntry {
    pub fn changed_fields(&self) -> Vec<ChangedField> {
        let mut fields = Vec::new();
        if self.changes.title {
            fields.push(ChangedField::Title);
        }
        if self.changes.start_date {
            fields.push(ChangedField::StartDate);
        }
        if self.changes.end_date {
            fields.push(ChangedField::EndDate);
        }
        fields
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub name: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimezoneUpdate {
    pub timezone: String,
}

/// Body of `POST /events` and `PUT /events/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub profiles: Vec<String>,
    pub timezone: String,
    #[serde(serialize_with = "iso_millis")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis")]
    pub end_date: DateTime<Utc>,
}

/// `2024-06-01T13:00:00.000Z`, the shape JavaScript's `toISOString` emits.
fn iso_millis<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
