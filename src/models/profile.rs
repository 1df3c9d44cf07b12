//! User Profile Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promptbook_llm::ProviderKind;

/// UI theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

/// Per-user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub theme_preference: ThemePreference,
    /// Provider used for generation when a request does not name one
    pub preferred_provider: Option<ProviderKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A profile with every setting at its default.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: None,
            full_name: None,
            avatar_url: None,
            theme_preference: ThemePreference::default(),
            preferred_provider: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: ProfileUpdate) {
        if let Some(email) = update.email {
            self.email = Some(email).filter(|v| !v.trim().is_empty());
        }
        if let Some(name) = update.full_name {
            self.full_name = Some(name).filter(|v| !v.trim().is_empty());
        }
        if let Some(url) = update.avatar_url {
            self.avatar_url = Some(url).filter(|v| !v.trim().is_empty());
        }
        if let Some(theme) = update.theme_preference {
            self.theme_preference = theme;
        }
        if let Some(provider) = update.preferred_provider {
            self.preferred_provider = Some(provider);
        }
        self.updated_at = Utc::now();
    }
}

/// Partial profile update. Empty strings clear text fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub theme_preference: Option<ThemePreference>,
    pub preferred_provider: Option<ProviderKind>,
}
