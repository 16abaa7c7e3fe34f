//! Tag Domain Events

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::registry::EventTypeRegistry;
use super::DomainEvent;

/// Tag Domain Events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TagEvent {
    /// Tag was created in the catalog
    TagCreated(TagCreated),

    /// Tag name was replaced
    NameUpdated(NameUpdated),

    /// Tag description was replaced
    DescriptionUpdated(DescriptionUpdated),
}

/// Tag was created in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCreated {
    /// Aggregate identity
    pub id: Uuid,

    /// Unique tag name
    pub name: String,

    /// Human-readable description
    pub description: String,
}

/// Tag name was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameUpdated {
    pub name: String,
}

/// Tag description was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionUpdated {
    pub description: String,
}

impl DomainEvent for TagEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TagEvent::TagCreated(_) => "TagCreated",
            TagEvent::NameUpdated(_) => "NameUpdated",
            TagEvent::DescriptionUpdated(_) => "DescriptionUpdated",
        }
    }

    fn payload(&self) -> serde_json::Result<Value> {
        match self {
            TagEvent::TagCreated(e) => serde_json::to_value(e),
            TagEvent::NameUpdated(e) => serde_json::to_value(e),
            TagEvent::DescriptionUpdated(e) => serde_json::to_value(e),
        }
    }
}

impl TagEvent {
    /// Build the registry of all Tag event types
    pub fn registry() -> EventTypeRegistry<TagEvent> {
        let mut registry = EventTypeRegistry::new();

        registry.register("TagCreated", |data| {
            Ok(TagEvent::TagCreated(serde_json::from_value(data.clone())?))
        });
        registry.register("NameUpdated", |data| {
            Ok(TagEvent::NameUpdated(serde_json::from_value(data.clone())?))
        });
        registry.register("DescriptionUpdated", |data| {
            Ok(TagEvent::DescriptionUpdated(serde_json::from_value(
                data.clone(),
            )?))
        });

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_event_type() {
        let registry = TagEvent::registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("TagCreated"));
        assert!(registry.contains("NameUpdated"));
        assert!(registry.contains("DescriptionUpdated"));
    }

    #[test]
    fn test_payload_round_trips_through_registry() {
        let registry = TagEvent::registry();
        let event = TagEvent::TagCreated(TagCreated {
            id: Uuid::now_v7(),
            name: "rust".to_string(),
            description: "Questions about the Rust language".to_string(),
        });

        let payload = event.payload().unwrap();
        let decoded = registry.decode(event.event_type(), &payload).unwrap();
        assert_eq!(decoded, event);
    }
}
