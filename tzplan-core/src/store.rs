//! Client-side mirror of server state.
//!
//! [`MirrorState`] is plain data. It only changes through [`reduce`], which
//! maps a state and an [`Action`] to a new state. [`Store`] applies actions
//! one at a time and publishes every new state to subscribers.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{ChangeLogEntry, Event, PartialEvent, Profile, ProfilePatch};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorState {
    pub profiles: Vec<Profile>,
    pub current_profile: Option<Profile>,
    pub events: Vec<Event>,
    pub logs: Vec<ChangeLogEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MirrorState {
    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Events sorted by start instant.
    pub fn events_by_start(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        events.sort_by_key(|e| e.start_date);
        events
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SetProfiles(Vec<Profile>),
    AddProfile(Profile),
    SetCurrentProfile(Option<Profile>),
    UpdateProfile { id: String, patch: ProfilePatch },
    SetEvents(Vec<Event>),
    AddEvent(Event),
    UpdateEvent { id: String, patch: PartialEvent },
    DeleteEvent(String),
    SetLogs(Vec<ChangeLogEntry>),
    SetLoading(bool),
    SetError(Option<String>),
}

/// Apply `action` to `state`. Never leaves two entries with the same id.
pub fn reduce(state: &MirrorState, action: Action) -> MirrorState {
    let mut next = state.clone();

    match action {
        Action::SetProfiles(profiles) => {
            next.profiles = dedup_by_id(profiles, |p| &p.id);
        }
        Action::AddProfile(profile) => {
            upsert(&mut next.profiles, profile, |p| &p.id);
        }
        Action::SetCurrentProfile(profile) => {
            next.current_profile = profile;
        }
        Action::UpdateProfile { id, patch } => {
            if let Some(profile) = next.profiles.iter_mut().find(|p| p.id == id) {
                patch.apply(profile);
            }
            if let Some(current) = next.current_profile.as_mut().filter(|p| p.id == id) {
                patch.apply(current);
            }
        }
        Action::SetEvents(events) => {
            next.events = dedup_by_id(events, |e| &e.id);
        }
        Action::AddEvent(event) => {
            upsert(&mut next.events, event, |e| &e.id);
        }
        Action::UpdateEvent { id, patch } => {
            if let Some(event) = next.events.iter_mut().find(|e| e.id == id) {
                patch.apply(event);
            }
        }
        Action::DeleteEvent(id) => {
            next.events.retain(|e| e.id != id);
        }
        Action::SetLogs(logs) => {
            next.logs = dedup_by_id(logs, |l| &l.id);
        }
        Action::SetLoading(loading) => {
            next.loading = loading;
        }
        Action::SetError(error) => {
            next.error = error;
        }
    }

    next
}

/// Replace the entry with the same id in place, or append.
fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

/// Keep the last occurrence of each id, in order of those occurrences.
fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut kept: Vec<T> = Vec::with_capacity(items.len());

    for item in items.into_iter().rev() {
        if seen.insert(id(&item).to_string()) {
            kept.push(item);
        }
    }

    kept.reverse();
    kept
}

/// Shared handle to the mirror state.
#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<MirrorState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(MirrorState::default())
    }

    pub fn with_state(state: MirrorState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Store { tx: Arc::new(tx) }
    }

    /// Apply one action atomically and notify subscribers.
    pub fn dispatch(&self, action: Action) {
        self.tx.send_modify(|state| *state = reduce(state, action));
    }

    /// A copy of the current state.
    pub fn state(&self) -> MirrorState {
        self.tx.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&MirrorState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<MirrorState> {
        self.tx.subscribe()
    }
}
