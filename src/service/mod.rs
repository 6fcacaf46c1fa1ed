//! Conference service façade.
//!
//! Every operation takes the caller explicitly. Identity-requiring operations
//! reject an absent caller before touching the store.

use std::sync::Arc;

use crate::auth::Caller;
use crate::db::{IdAllocator, Repository};
use crate::errors::AppError;
use crate::models::{
    Conference, ConferenceForm, ConferenceKey, Profile, ProfileForm, ProfileKey, TeeShirtSize,
};

/// Display name derived from an email: everything before the first `@`.
///
/// `lemoncake@example.com` becomes `lemoncake`.
pub fn default_display_name(email: &str) -> String {
    email
        .split_once('@')
        .map_or(email, |(local, _)| local)
        .to_string()
}

/// In-memory profile for a caller who has never saved one. Not persisted.
pub fn default_profile(user_id: &str, email: &str) -> Profile {
    Profile::new(
        user_id,
        default_display_name(email),
        email,
        TeeShirtSize::NotSpecified,
    )
}

fn require_caller(caller: Option<&Caller>) -> Result<&Caller, AppError> {
    caller.ok_or_else(AppError::authorization_required)
}

/// Profile and conference operations over the store.
#[derive(Clone)]
pub struct ConferenceService {
    repo: Arc<Repository>,
    allocator: Arc<dyn IdAllocator>,
}

impl ConferenceService {
    /// Service whose conference ids come from the repository itself.
    pub fn new(repo: Arc<Repository>) -> Self {
        Self::with_allocator(repo.clone(), repo)
    }

    pub fn with_allocator(repo: Arc<Repository>, allocator: Arc<dyn IdAllocator>) -> Self {
        Self { repo, allocator }
    }

    /// Create the caller's profile, or update name and size of an existing one.
    pub async fn save_profile(
        &self,
        caller: Option<&Caller>,
        form: &ProfileForm,
    ) -> Result<Profile, AppError> {
        let caller = require_caller(caller)?;

        let tee_shirt_size = form.tee_shirt_size.unwrap_or_default();
        let display_name = form.display_name();

        let profile = match self.get_profile(Some(caller)).await? {
            Some(mut existing) => {
                existing.update(display_name, tee_shirt_size);
                tracing::debug!(user_id = %caller.user_id, "Updating profile");
                existing
            }
            None => {
                let display_name =
                    display_name.unwrap_or_else(|| default_display_name(&caller.email));
                tracing::info!(user_id = %caller.user_id, "Creating profile");
                Profile::new(
                    caller.user_id.as_str(),
                    display_name,
                    caller.email.as_str(),
                    tee_shirt_size,
                )
            }
        };

        self.repo.save_profile(&profile).await?;
        Ok(profile)
    }

    /// Load the caller's profile without creating one.
    pub async fn get_profile(&self, caller: Option<&Caller>) -> Result<Option<Profile>, AppError> {
        let caller = require_caller(caller)?;
        self.repo
            .get_profile(&ProfileKey::new(caller.user_id.as_str()))
            .await
    }

    /// Stored profile of `caller`, or a default one that has not been saved.
    pub async fn profile_or_default(&self, caller: &Caller) -> Result<Profile, AppError> {
        Ok(self
            .get_profile(Some(caller))
            .await?
            .unwrap_or_else(|| default_profile(&caller.user_id, &caller.email)))
    }

    /// Create a conference organized by the caller. The organizer's profile
    /// is written in the same transaction, materializing it if needed.
    pub async fn create_conference(
        &self,
        caller: Option<&Caller>,
        form: &ConferenceForm,
    ) -> Result<Conference, AppError> {
        let caller = require_caller(caller)?;

        let profile = self.profile_or_default(caller).await?;
        let profile_key = profile.key();
        let id = self.allocator.allocate_id(&profile_key).await?;
        let conference = Conference::new(ConferenceKey::new(profile_key, id), form);

        self.repo
            .save_profile_and_conference(&profile, &conference)
            .await?;

        tracing::info!(
            user_id = %caller.user_id,
            conference_id = id,
            name = %conference.name,
            "Created conference"
        );
        Ok(conference)
    }

    /// All conferences ordered by name.
    pub async fn query_conferences(&self) -> Result<Vec<Conference>, AppError> {
        self.repo.list_conferences().await
    }
}
