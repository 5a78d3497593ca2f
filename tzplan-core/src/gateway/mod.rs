//! Typed access to the REST backend.
//!
//! One method per (resource, operation) pair. Each performs exactly one
//! request and returns the decoded body; there is no retry, caching, or
//! batching at this layer.

mod http;
#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;

pub use http::HttpGateway;

use crate::error::GatewayError;
use crate::model::{ChangeLogEntry, Event, EventPayload, NewProfile, Profile};

pub type GatewayResult<T> = Result<T, GatewayError>;

pub trait Gateway: Send + Sync {
    /// GET /profiles
    fn list_profiles(&self) -> impl Future<Output = GatewayResult<Vec<Profile>>> + Send;

    /// GET /profiles/{id}
    fn get_profile(&self, id: &str) -> impl Future<Output = GatewayResult<Profile>> + Send;

    /// POST /profiles
    fn create_profile(
        &self,
        profile: &NewProfile,
    ) -> impl Future<Output = GatewayResult<Profile>> + Send;

    /// PATCH /profiles/{id}/timezone
    fn update_profile_timezone(
        &self,
        id: &str,
        timezone: &str,
    ) -> impl Future<Output = GatewayResult<Profile>> + Send;

    /// GET /events
    fn list_events(&self) -> impl Future<Output = GatewayResult<Vec<Event>>> + Send;

    /// GET /events/profile/{id}
    fn list_events_for_profile(
        &self,
        profile_id: &str,
    ) -> impl Future<Output = GatewayResult<Vec<Event>>> + Send;

    /// POST /events
    fn create_event(
        &self,
        event: &EventPayload,
    ) -> impl Future<Output = GatewayResult<Event>> + Send;

    /// PUT /events/{id}
    fn update_event(
        &self,
        id: &str,
        event: &EventPayload,
    ) -> impl Future<Output = GatewayResult<Event>> + Send;

    /// DELETE /events/{id}
    fn delete_event(&self, id: &str) -> impl Future<Output = GatewayResult<()>> + Send;

    /// GET /logs/event/{id}
    fn list_event_logs(
        &self,
        event_id: &str,
    ) -> impl Future<Output = GatewayResult<Vec<ChangeLogEntry>>> + Send;

    /// GET /logs
    fn list_logs(&self) -> impl Future<Output = GatewayResult<Vec<ChangeLogEntry>>> + Send;
}
