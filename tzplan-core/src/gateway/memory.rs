//! In-memory backend for exercising resources without a server.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;

use super::{Gateway, GatewayResult};
use crate::error::GatewayError;
use crate::model::{
    ChangeFlags, ChangeLogEntry, Event, EventPayload, EventRef, NewProfile, PartialEvent, Profile,
    ProfileRef,
};

#[derive(Default)]
struct Data {
    profiles: Vec<Profile>,
    events: Vec<Event>,
    logs: Vec<ChangeLogEntry>,
    next_id: usize,
}

impl Data {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:03}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub(crate) struct MemoryGateway {
    data: Mutex<Data>,
    calls: AtomicUsize,
    delays: Mutex<VecDeque<Duration>>,
    failures: Mutex<VecDeque<(u16, String)>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let gw = Self::new();
        gw.data.lock().unwrap().profiles = profiles;
        gw
    }

    pub fn insert_event(&self, event: Event) {
        self.data.lock().unwrap().events.push(event);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Delay the next calls, one queued duration per call.
    pub fn delay_next(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    /// Fail the next call with an HTTP error.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .push_back((status, message.to_string()));
    }

    async fn enter(&self) -> GatewayResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().unwrap().pop_front();
        match failure {
            Some((status, message)) => Err(GatewayError::Http { status, message }),
            None => Ok(()),
        }
    }

    fn not_found(what: &str) -> GatewayError {
        GatewayError::Http {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

fn event_from_payload(id: String, payload: &EventPayload) -> Event {
    Event {
        id,
        title: payload.title.clone(),
        description: Some(payload.description.clone()),
        profiles: payload.profiles.iter().cloned().map(ProfileRef::Id).collect(),
        timezone: payload.timezone.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

impl Gateway for MemoryGateway {
    async fn list_profiles(&self) -> GatewayResult<Vec<Profile>> {
        self.enter().await?;
        Ok(self.data.lock().unwrap().profiles.clone())
    }

    async fn get_profile(&self, id: &str) -> GatewayResult<Profile> {
        self.enter().await?;
        let data = self.data.lock().unwrap();
        data.profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Profile"))
    }

    async fn create_profile(&self, profile: &NewProfile) -> GatewayResult<Profile> {
        self.enter().await?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id("p");
        let created = Profile::new(id, &profile.name, &profile.timezone);
        data.profiles.push(created.clone());
        Ok(created)
    }

    async fn update_profile_timezone(&self, id: &str, timezone: &str) -> GatewayResult<Profile> {
        self.enter().await?;
        let mut data = self.data.lock().unwrap();
        let profile = data
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::not_found("Profile"))?;
        profile.timezone = timezone.to_string();
        Ok(profile.clone())
    }

    async fn list_events(&self) -> GatewayResult<Vec<Event>> {
        self.enter().await?;
        Ok(self.data.lock().unwrap().events.clone())
    }

    async fn list_events_for_profile(&self, profile_id: &str) -> GatewayResult<Vec<Event>> {
        self.enter().await?;
        let data = self.data.lock().unwrap();
        Ok(data
            .events
            .iter()
            .filter(|e| e.includes_profile(profile_id))
            .cloned()
            .collect())
    }

    async fn create_event(&self, event: &EventPayload) -> GatewayResult<Event> {
        self.enter().await?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id("e");
        let created = event_from_payload(id, event);
        data.events.push(created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: &str, payload: &EventPayload) -> GatewayResult<Event> {
        self.enter().await?;
        let mut data = self.data.lock().unwrap();
        let log_id = data.next_id("l");

        let event = data
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::not_found("Event"))?;
        let previous = event.clone();
        *event = Event {
            created_at: previous.created_at,
            updated_at: Some(Utc::now()),
            ..event_from_payload(id.to_string(), payload)
        };
        let updated = event.clone();

        let changes = ChangeFlags {
            title: previous.title != updated.title,
            start_date: previous.start_date != updated.start_date,
            end_date: previous.end_date != updated.end_date,
        };
        if changes != ChangeFlags::default() {
            data.logs.push(ChangeLogEntry {
                id: log_id,
                event_id: EventRef::Id(id.to_string()),
                timestamp: Utc::now(),
                changes,
                previous_values: PartialEvent::from(&previous),
                new_values: PartialEvent::from(&updated),
            });
        }

        Ok(updated)
    }

    async fn delete_event(&self, id: &str) -> GatewayResult<()> {
        self.enter().await?;
        let mut data = self.data.lock().unwrap();
        let before = data.events.len();
        data.events.retain(|e| e.id != id);
        if data.events.len() == before {
            return Err(Self::not_found("Event"));
        }
        Ok(())
    }

    async fn list_event_logs(&self, event_id: &str) -> GatewayResult<Vec<ChangeLogEntry>> {
        self.enter().await?;
        let data = self.data.lock().unwrap();
        Ok(data
            .logs
            .iter()
            .filter(|l| l.event_id.id() == event_id)
            .cloned()
            .collect())
    }

    async fn list_logs(&self) -> GatewayResult<Vec<ChangeLogEntry>> {
        self.enter().await?;
        Ok(self.data.lock().unwrap().logs.clone())
    }
}
