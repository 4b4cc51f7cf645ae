//! Ordered, immutable set of validated profiles

use std::collections::HashSet;
use std::sync::Arc;

use super::entity::{ProfileConfig, ProviderProfile};
use super::validation::ProfileValidationError;
use crate::domain::DomainError;

/// Process-wide profile list, loaded once before the first call
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: Vec<Arc<ProviderProfile>>,
    default_id: Option<String>,
}

impl ProfileCatalog {
    /// Validate every profile, keeping configured order
    pub fn from_configs(
        configs: Vec<ProfileConfig>,
        default_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        let mut profiles = Vec::with_capacity(configs.len());

        for config in configs {
            let profile = ProviderProfile::from_config(config)?;
            if !seen.insert(profile.id().to_string()) {
                return Err(ProfileValidationError::DuplicateId {
                    id: profile.id().to_string(),
                }
                .into());
            }
            profiles.push(Arc::new(profile));
        }

        let default_id = default_id.filter(|id| !id.trim().is_empty());
        if let Some(id) = &default_id {
            if !seen.contains(id) {
                return Err(DomainError::configuration(format!(
                    "Default profile '{}' is not defined",
                    id
                )));
            }
        }

        Ok(Self {
            profiles,
            default_id,
        })
    }

    /// All profiles in configured order
    pub fn list(&self) -> &[Arc<ProviderProfile>] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<Arc<ProviderProfile>> {
        self.profiles.iter().find(|p| p.id() == id).cloned()
    }

    pub fn get_required(&self, id: &str) -> Result<Arc<ProviderProfile>, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::configuration(format!("Profile '{}' not found", id)))
    }

    /// Explicit default if configured, else the first profile
    pub fn default_profile(&self) -> Option<Arc<ProviderProfile>> {
        match &self.default_id {
            Some(id) => self.get(id),
            None => self.profiles.first().cloned(),
        }
    }

    /// Resolve an optional profile ID, falling back to the default profile
    pub fn resolve(&self, id: Option<&str>) -> Result<Arc<ProviderProfile>, DomainError> {
        match id {
            Some(id) => self.get_required(id),
            None => self
                .default_profile()
                .ok_or_else(|| DomainError::configuration("No provider profiles configured")),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
