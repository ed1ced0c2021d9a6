use crate::api::Backend;
use crate::error::Result;
use crate::models::UserProfile;
use crate::storage::Storage;

/// Who is using the dashboard, as far as this client knows.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticated(UserProfile),
}

impl SessionState {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated(profile) => Some(profile),
            SessionState::Anonymous => None,
        }
    }
}

/// Session context handed to every view. Owns the persisted profile cache.
pub struct Session {
    storage: Storage,
}

impl Session {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn load(&self) -> Result<Option<UserProfile>> {
        self.storage.load_profile()
    }

    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        self.storage.save_profile(profile)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.clear_profile()
    }

    /// Resolves the session once: a cached profile wins, otherwise the
    /// backend is asked and whatever it answers is cached. Not re-checked
    /// afterwards; an expired cookie surfaces on the next failing call.
    pub async fn bootstrap(&self, backend: &dyn Backend) -> Result<SessionState> {
        if let Some(profile) = self.load()? {
            if let Some(cached_at) = self.storage.profile_cached_at()? {
                tracing::debug!("Using profile for {} cached at {}", profile.login, cached_at);
            }
            return Ok(SessionState::Authenticated(profile));
        }

        let profile = match backend.check_session().await {
            Ok(profile) => profile.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Session check failed: {}", e);
                UserProfile::default()
            }
        };
        self.save(&profile)?;

        if profile.is_empty() {
            Ok(SessionState::Anonymous)
        } else {
            tracing::info!("Signed in as {}", profile.login);
            Ok(SessionState::Authenticated(profile))
        }
    }

    /// Drops the local profile first, then tells the backend. A failed remote
    /// logout is logged and does not restore the cache.
    pub async fn logout(&self, backend: &dyn Backend) -> Result<()> {
        self.clear()?;
        if let Err(e) = backend.logout().await {
            tracing::warn!("Backend logout failed: {}", e);
        }
        Ok(())
    }
}
