//! Application controller: the handlers a front-end calls.
//!
//! [`App`] owns the mirror store and the resource operations built on it.
//! Views read state through [`App::store`] and act through the methods here.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::draft::{EventDraft, ProfileDraft};
use crate::error::{TzPlanError, TzPlanResult};
use crate::gateway::{Gateway, HttpGateway};
use crate::model::{ChangeLogEntry, Event, Profile};
use crate::resource::{Events, Logs, Profiles};
use crate::store::{Action, Store};
use crate::timezone;
use crate::validation;

pub struct App<G> {
    config: ClientConfig,
    store: Store,
    profiles: Profiles<G>,
    events: Events<G>,
    logs: Logs<G>,
}

impl App<HttpGateway> {
    /// Controller talking to the backend at `config.api_url`.
    pub fn connect(config: ClientConfig) -> TzPlanResult<Self> {
        let gateway = HttpGateway::new(&config)?;
        Ok(App::new(gateway, config))
    }
}

impl<G: Gateway> App<G> {
    pub fn new(gateway: G, config: ClientConfig) -> Self {
        Self::with_gateway(Arc::new(gateway), config)
    }

    pub fn with_gateway(gateway: Arc<G>, config: ClientConfig) -> Self {
        let store = Store::new();

        App {
            profiles: Profiles::new(gateway.clone(), store.clone()),
            events: Events::new(gateway.clone(), store.clone()),
            logs: Logs::new(gateway, store.clone()),
            config,
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn profiles(&self) -> &Profiles<G> {
        &self.profiles
    }

    pub fn events(&self) -> &Events<G> {
        &self.events
    }

    pub fn logs(&self) -> &Logs<G> {
        &self.logs
    }

    /// Zone the user reads times in: the selected profile's, else the
    /// configured default.
    pub fn viewing_zone(&self) -> String {
        self.store.read(|s| {
            s.current_profile
                .as_ref()
                .map(|p| p.timezone.clone())
                .unwrap_or_else(|| self.config.default_timezone.clone())
        })
    }

    /// Load profiles, then select one if nothing is selected yet.
    pub async fn start(&self) -> TzPlanResult<Option<Profile>> {
        self.profiles.load().await?;
        self.select_initial_profile().await
    }

    /// With profiles loaded and none selected, select `default_profile` when
    /// it exists, otherwise the first profile, and load its events.
    pub async fn select_initial_profile(&self) -> TzPlanResult<Option<Profile>> {
        let (current, candidate) = self.store.read(|s| {
            let preferred = self
                .config
                .default_profile
                .as_deref()
                .and_then(|id| s.profile(id));
            (
                s.current_profile.clone(),
                preferred.or(s.profiles.first()).cloned(),
            )
        });

        if current.is_some() {
            return Ok(current);
        }

        match candidate {
            Some(profile) => self.select_profile(&profile.id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Switch the selection and reload the events of the new profile.
    pub async fn select_profile(&self, id: &str) -> TzPlanResult<Profile> {
        let known = self.store.read(|s| s.profile(id).cloned());
        let profile = match known {
            Some(profile) => profile,
            None => self.profiles.get(id).await.map_err(|e| match e {
                TzPlanError::Gateway(ref g) if g.status() == Some(404) => {
                    TzPlanError::ProfileNotFound(id.to_string())
                }
                other => other,
            })?,
        };

        tracing::debug!(profile = %profile.id, zone = %profile.timezone, "selecting profile");
        self.store
            .dispatch(Action::SetCurrentProfile(Some(profile.clone())));
        self.events.load(Some(&profile.id)).await?;

        Ok(profile)
    }

    /// Validate and create a profile. It becomes the selection when nothing
    /// is selected.
    pub async fn create_profile(&self, draft: &ProfileDraft) -> TzPlanResult<Profile> {
        let request = draft.to_request()?;
        let profile = self.profiles.create(&request).await?;

        if self.store.read(|s| s.current_profile.is_none()) {
            self.select_profile(&profile.id).await?;
        }

        Ok(profile)
    }

    /// Change the selected profile's zone.
    pub async fn change_timezone(&self, zone: &str) -> TzPlanResult<Profile> {
        validation::validate_timezone(zone)?;

        let id = self
            .store
            .read(|s| s.current_profile.as_ref().map(|p| p.id.clone()))
            .ok_or(TzPlanError::NoProfileSelected)?;

        self.profiles.change_timezone(&id, zone).await
    }

    /// Reload the events in view: the selected profile's, or all of them.
    pub async fn refresh_events(&self) -> TzPlanResult<Vec<Event>> {
        let current = self
            .store
            .read(|s| s.current_profile.as_ref().map(|p| p.id.clone()));
        self.events.load(current.as_deref()).await
    }

    /// Form state for a new event, or for editing the mirrored event `editing`.
    pub fn event_form(&self, editing: Option<&str>) -> TzPlanResult<EventDraft> {
        match editing {
            None => Ok(self
                .store
                .read(|s| EventDraft::blank(s.current_profile.as_ref()))),
            Some(id) => {
                let event = self
                    .store
                    .read(|s| s.event(id).cloned())
                    .ok_or_else(|| TzPlanError::EventNotFound(id.to_string()))?;
                Ok(EventDraft::for_edit(&event, &self.viewing_zone())?)
            }
        }
    }

    /// Validate `draft` and create the event, or update `editing`. Nothing
    /// is sent when validation fails.
    pub async fn save_event(
        &self,
        draft: &EventDraft,
        editing: Option<&str>,
    ) -> TzPlanResult<Event> {
        let payload = draft.to_payload()?;

        match editing {
            Some(id) => self.events.update(id, &payload).await,
            None => self.events.create(&payload).await,
        }
    }

    pub async fn delete_event(&self, id: &str) -> TzPlanResult<()> {
        self.events.delete(id).await
    }

    pub async fn event_logs(&self, event_id: &str) -> TzPlanResult<Vec<ChangeLogEntry>> {
        self.logs.load_for_event(event_id).await
    }

    pub async fn all_logs(&self) -> TzPlanResult<Vec<ChangeLogEntry>> {
        self.logs.load_all().await
    }

    /// Current time in the viewing zone, in the display format.
    pub fn clock(&self) -> TzPlanResult<String> {
        Ok(timezone::current_time(&self.viewing_zone())?)
    }
}
