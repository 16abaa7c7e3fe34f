//! Tag Aggregate
//!
//! Catalog entry for a tag name. Name uniqueness is a catalog-wide rule, so
//! creation consults the external [`TagService`] rather than any state local
//! to one aggregate instance.

use uuid::Uuid;

use crate::aggregate::{AggregateRoot, Journal};
use crate::errors::{DomainError, DomainResult};
use crate::events::tag::{DescriptionUpdated, NameUpdated, TagCreated, TagEvent};
use crate::events::EventTypeRegistry;
use crate::services::TagService;

/// A tag in the catalog
#[derive(Debug, Clone)]
pub struct Tag {
    id: Uuid,
    name: String,
    description: String,
    created: bool,
    journal: Journal<TagEvent>,
}

impl Tag {
    /// Create a tag, rejecting names already present in the catalog
    pub async fn create(
        name: &str,
        description: &str,
        catalog: &dyn TagService,
    ) -> DomainResult<Self> {
        non_blank(name, "name")?;
        non_blank(description, "description")?;
        if catalog.exists(name).await? {
            return Err(DomainError::DuplicateTag(name.to_string()));
        }

        let mut tag = Self::empty();
        tag.append(TagEvent::TagCreated(TagCreated {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: description.to_string(),
        }))?;

        Ok(tag)
    }

    /// Rename the tag, keeping catalog-wide uniqueness
    pub async fn update_name(&mut self, name: &str, catalog: &dyn TagService) -> DomainResult<()> {
        non_blank(name, "name")?;
        if name != self.name && catalog.exists(name).await? {
            return Err(DomainError::DuplicateTag(name.to_string()));
        }

        self.append(TagEvent::NameUpdated(NameUpdated {
            name: name.to_string(),
        }))
    }

    /// Replace the description
    pub fn update_description(&mut self, description: &str) -> DomainResult<()> {
        non_blank(description, "description")?;
        self.append(TagEvent::DescriptionUpdated(DescriptionUpdated {
            description: description.to_string(),
        }))
    }

    /// Tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag description
    pub fn description(&self) -> &str {
        &self.description
    }

    fn ensure_created(&self, event: &TagEvent) -> DomainResult<()> {
        use crate::events::DomainEvent;

        if !self.created {
            return Err(DomainError::UnsupportedEvent(
                event.event_type().to_string(),
            ));
        }
        Ok(())
    }
}

impl AggregateRoot for Tag {
    const AGGREGATE_TYPE: &'static str = "Tag";
    type Event = TagEvent;

    fn empty() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            description: String::new(),
            created: false,
            journal: Journal::new(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn journal(&self) -> &Journal<TagEvent> {
        &self.journal
    }

    fn journal_mut(&mut self) -> &mut Journal<TagEvent> {
        &mut self.journal
    }

    fn when(&mut self, event: &TagEvent) -> DomainResult<()> {
        use crate::events::DomainEvent;

        match event {
            TagEvent::TagCreated(e) => {
                if self.created {
                    return Err(DomainError::UnsupportedEvent(
                        event.event_type().to_string(),
                    ));
                }
                self.id = e.id;
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.created = true;
            }
            TagEvent::NameUpdated(e) => {
                self.ensure_created(event)?;
                self.name = e.name.clone();
            }
            TagEvent::DescriptionUpdated(e) => {
                self.ensure_created(event)?;
                self.description = e.description.clone();
            }
        }

        Ok(())
    }

    fn event_registry() -> EventTypeRegistry<TagEvent> {
        TagEvent::registry()
    }
}

fn non_blank(value: &str, field: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidArgument(format!(
            "{field} must not be blank"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FixedTagService;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_new_tag() {
        let catalog = FixedTagService::default();
        let tag = Tag::create("rust", "The Rust language", &catalog)
            .await
            .unwrap();

        assert_eq!(tag.name(), "rust");
        assert_eq!(tag.description(), "The Rust language");
        assert_eq!(tag.version(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_fails() {
        let catalog = FixedTagService::with_tags(["rust"]);
        let err = Tag::create("rust", "dup", &catalog).await.unwrap_err();
        assert_eq!(err, DomainError::DuplicateTag("rust".to_string()));
    }

    #[tokio::test]
    async fn test_rename_checks_catalog() {
        let catalog = FixedTagService::with_tags(["sql"]);
        let mut tag = Tag::create("rust", "The Rust language", &catalog)
            .await
            .unwrap();

        let err = tag.update_name("sql", &catalog).await.unwrap_err();
        assert_eq!(err, DomainError::DuplicateTag("sql".to_string()));

        tag.update_name("rustlang", &catalog).await.unwrap();
        assert_eq!(tag.name(), "rustlang");
    }

    #[tokio::test]
    async fn test_replay_reproduces_state() {
        let catalog = FixedTagService::default();
        let mut tag = Tag::create("rust", "v1", &catalog).await.unwrap();
        tag.update_description("v2").unwrap();

        let replayed = Tag::replay(tag.uncommitted_events().to_vec()).unwrap();
        assert_eq!(replayed.description(), "v2");
        assert_eq!(replayed.version(), 2);
    }
}
