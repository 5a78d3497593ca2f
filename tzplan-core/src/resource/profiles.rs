use std::sync::Arc;

use super::{COLLECTION, InFlight, request};
use crate::error::TzPlanResult;
use crate::gateway::Gateway;
use crate::model::{NewProfile, Profile, ProfilePatch};
use crate::store::{Action, Store};

pub struct Profiles<G> {
    gateway: Arc<G>,
    store: Store,
    inflight: InFlight,
}

impl<G: Gateway> Profiles<G> {
    pub fn new(gateway: Arc<G>, store: Store) -> Self {
        Profiles {
            gateway,
            store,
            inflight: InFlight::default(),
        }
    }

    /// Fetch every profile and replace the mirrored collection.
    pub async fn load(&self) -> TzPlanResult<Vec<Profile>> {
        let profiles = request(
            &self.store,
            &self.inflight,
            Some(COLLECTION),
            "load profiles",
            self.gateway.list_profiles(),
        )
        .await?;

        self.store.dispatch(Action::SetProfiles(profiles.clone()));
        Ok(profiles)
    }

    /// Fetch one profile and refresh its mirrored entry.
    pub async fn get(&self, id: &str) -> TzPlanResult<Profile> {
        let profile = request(
            &self.store,
            &self.inflight,
            Some(id),
            "get profile",
            self.gateway.get_profile(id),
        )
        .await?;

        self.store.dispatch(Action::AddProfile(profile.clone()));
        Ok(profile)
    }

    pub async fn create(&self, data: &NewProfile) -> TzPlanResult<Profile> {
        let profile = request(
            &self.store,
            &self.inflight,
            None,
            "create profile",
            self.gateway.create_profile(data),
        )
        .await?;

        self.store.dispatch(Action::AddProfile(profile.clone()));
        Ok(profile)
    }

    /// Change a profile's zone. The selected profile, if it is this one, is
    /// refreshed in the same store update.
    pub async fn change_timezone(&self, id: &str, timezone: &str) -> TzPlanResult<Profile> {
        let profile = request(
            &self.store,
            &self.inflight,
            Some(id),
            "update timezone",
            self.gateway.update_profile_timezone(id, timezone),
        )
        .await?;

        self.store.dispatch(Action::UpdateProfile {
            id: id.to_string(),
            patch: ProfilePatch::from(&profile),
        });
        Ok(profile)
    }
}
