use std::sync::Arc;

use super::{COLLECTION, InFlight, request};
use crate::error::TzPlanResult;
use crate::gateway::Gateway;
use crate::model::{Event, EventPayload, PartialEvent};
use crate::store::{Action, Store};

pub struct Events<G> {
    gateway: Arc<G>,
    store: Store,
    inflight: InFlight,
}

impl<G: Gateway> Events<G> {
    pub fn new(gateway: Arc<G>, store: Store) -> Self {
        Events {
            gateway,
            store,
            inflight: InFlight::default(),
        }
    }

    /// Fetch one profile's events, or all events, and replace the mirrored
    /// collection. A newer load (e.g. after switching profile) supersedes
    /// this one.
    pub async fn load(&self, profile_id: Option<&str>) -> TzPlanResult<Vec<Event>> {
        let events = match profile_id {
            Some(id) => {
                request(
                    &self.store,
                    &self.inflight,
                    Some(COLLECTION),
                    "load profile events",
                    self.gateway.list_events_for_profile(id),
                )
                .await?
            }
            None => {
                request(
                    &self.store,
                    &self.inflight,
                    Some(COLLECTION),
                    "load events",
                    self.gateway.list_events(),
                )
                .await?
            }
        };

        self.store.dispatch(Action::SetEvents(events.clone()));
        Ok(events)
    }

    pub async fn create(&self, data: &EventPayload) -> TzPlanResult<Event> {
        let event = request(
            &self.store,
            &self.inflight,
            None,
            "create event",
            self.gateway.create_event(data),
        )
        .await?;

        self.store.dispatch(Action::AddEvent(event.clone()));
        Ok(event)
    }

    pub async fn update(&self, id: &str, data: &EventPayload) -> TzPlanResult<Event> {
        let event = request(
            &self.store,
            &self.inflight,
            Some(id),
            "update event",
            self.gateway.update_event(id, data),
        )
        .await?;

        self.store.dispatch(Action::UpdateEvent {
            id: id.to_string(),
            patch: PartialEvent::from(&event),
        });
        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> TzPlanResult<()> {
        request(
            &self.store,
            &self.inflight,
            Some(id),
            "delete event",
            self.gateway.delete_event(id),
        )
        .await?;

        self.store.dispatch(Action::DeleteEvent(id.to_string()));
        Ok(())
    }
}
