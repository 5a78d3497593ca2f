use std::sync::Arc;

use super::{COLLECTION, InFlight, request};
use crate::error::TzPlanResult;
use crate::gateway::Gateway;
use crate::model::ChangeLogEntry;
use crate::store::{Action, Store};

pub struct Logs<G> {
    gateway: Arc<G>,
    store: Store,
    inflight: InFlight,
}

impl<G: Gateway> Logs<G> {
    pub fn new(gateway: Arc<G>, store: Store) -> Self {
        Logs {
            gateway,
            store,
            inflight: InFlight::default(),
        }
    }

    /// Change history of one event, oldest first.
    pub async fn load_for_event(&self, event_id: &str) -> TzPlanResult<Vec<ChangeLogEntry>> {
        let logs = request(
            &self.store,
            &self.inflight,
            Some(COLLECTION),
            "load event logs",
            self.gateway.list_event_logs(event_id),
        )
        .await?;

        Ok(self.replace(logs))
    }

    pub async fn load_all(&self) -> TzPlanResult<Vec<ChangeLogEntry>> {
        let logs = request(
            &self.store,
            &self.inflight,
            Some(COLLECTION),
            "load logs",
            self.gateway.list_logs(),
        )
        .await?;

        Ok(self.replace(logs))
    }

    fn replace(&self, mut logs: Vec<ChangeLogEntry>) -> Vec<ChangeLogEntry> {
        logs.sort_by_key(|l| l.timestamp);
        self.store.dispatch(Action::SetLogs(logs.clone()));
        logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;
    use crate::model::{ChangedField, Event, EventPayload, ProfileRef};
    use crate::resource::Events;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn updates_produce_history() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.insert_event(Event {
            id: "e1".into(),
            title: "Standup".into(),
            description: None,
            profiles: vec![ProfileRef::Id("p1".into())],
            timezone: "UTC".into(),
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            created_at: None,
            updated_at: None,
        });
        let store = Store::new();
        let events = Events::new(gateway.clone(), store.clone());
        let logs = Logs::new(gateway.clone(), store.clone());

        events
            .update(
                "e1",
                &EventPayload {
                    title: "Daily standup".into(),
                    description: String::new(),
                    profiles: vec!["p1".into()],
                    timezone: "UTC".into(),
                    start_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
                    end_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
                },
            )
            .await
            .unwrap();

        let history = logs.load_for_event("e1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].changed_fields(),
            vec![ChangedField::Title, ChangedField::EndDate]
        );
        assert_eq!(store.state().logs, history);

        assert!(logs.load_for_event("e2").await.unwrap().is_empty());
        assert!(store.state().logs.is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_previous_logs() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = Store::new();
        let logs = Logs::new(gateway.clone(), store.clone());
        assert!(logs.load_all().await.unwrap().is_empty());

        gateway.fail_next(404, "Event not found");
        assert!(logs.load_for_event("missing").await.is_err());

        let state = store.state();
        assert!(state.logs.is_empty());
        assert_eq!(
            state.error.as_deref(),
            Some("Request failed with status code 404: Event not found")
        );
    }
}
