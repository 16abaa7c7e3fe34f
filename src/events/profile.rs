//! Profile Domain Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::registry::EventTypeRegistry;
use super::DomainEvent;

/// Profile Domain Events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProfileEvent {
    /// Profile was created for a registered user
    ProfileCreated(ProfileCreated),

    /// Display name was replaced
    DisplayNameUpdated(DisplayNameUpdated),

    /// Summary ("about me") was replaced
    SummaryUpdated(SummaryUpdated),
}

/// Profile was created for a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCreated {
    /// Aggregate identity
    pub id: Uuid,

    /// Public display name
    pub display_name: String,

    /// Contact email
    pub email: String,

    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

/// Display name was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNameUpdated {
    pub display_name: String,
}

/// Summary was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryUpdated {
    pub summary: String,
}

impl DomainEvent for ProfileEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProfileEvent::ProfileCreated(_) => "ProfileCreated",
            ProfileEvent::DisplayNameUpdated(_) => "DisplayNameUpdated",
            ProfileEvent::SummaryUpdated(_) => "SummaryUpdated",
        }
    }

    fn payload(&self) -> serde_json::Result<Value> {
        match self {
            ProfileEvent::ProfileCreated(e) => serde_json::to_value(e),
            ProfileEvent::DisplayNameUpdated(e) => serde_json::to_value(e),
            ProfileEvent::SummaryUpdated(e) => serde_json::to_value(e),
        }
    }
}

impl ProfileEvent {
    /// Build the registry of all Profile event types
    pub fn registry() -> EventTypeRegistry<ProfileEvent> {
        let mut registry = EventTypeRegistry::new();

        registry.register("ProfileCreated", |data| {
            Ok(ProfileEvent::ProfileCreated(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("DisplayNameUpdated", |data| {
            Ok(ProfileEvent::DisplayNameUpdated(serde_json::from_value(
                data.clone(),
            )?))
        });
        registry.register("SummaryUpdated", |data| {
            Ok(ProfileEvent::SummaryUpdated(serde_json::from_value(
                data.clone(),
            )?))
        });

        registry
    }
}
