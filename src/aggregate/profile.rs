//! Profile Aggregate

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::{AggregateRoot, Journal};
use crate::errors::{DomainError, DomainResult};
use crate::events::profile::{
    DisplayNameUpdated, ProfileCreated, ProfileEvent, SummaryUpdated,
};
use crate::events::EventTypeRegistry;

/// A registered user's public profile
#[derive(Debug, Clone)]
pub struct Profile {
    id: Uuid,
    display_name: String,
    email: String,
    summary: String,
    created_at: Option<DateTime<Utc>>,
    journal: Journal<ProfileEvent>,
}

impl Profile {
    /// Create a profile for a registered user.
    ///
    /// The identity comes from the identity subsystem, so it is supplied
    /// rather than minted here.
    pub fn create(id: Uuid, display_name: &str, email: &str) -> DomainResult<Self> {
        if id.is_nil() {
            return Err(DomainError::InvalidArgument(
                "id must not be nil".to_string(),
            ));
        }
        non_blank(display_name, "display_name")?;
        non_blank(email, "email")?;
        if !email.contains('@') {
            return Err(DomainError::InvalidArgument(
                "email must contain '@'".to_string(),
            ));
        }

        let mut profile = Self::empty();
        profile.append(ProfileEvent::ProfileCreated(ProfileCreated {
            id,
            display_name: display_name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        }))?;

        Ok(profile)
    }

    /// Replace the display name
    pub fn update_display_name(&mut self, display_name: &str) -> DomainResult<()> {
        non_blank(display_name, "display_name")?;
        self.append(ProfileEvent::DisplayNameUpdated(DisplayNameUpdated {
            display_name: display_name.to_string(),
        }))
    }

    /// Replace the summary ("about me" text); blank clears it
    pub fn update_summary(&mut self, summary: &str) -> DomainResult<()> {
        self.append(ProfileEvent::SummaryUpdated(SummaryUpdated {
            summary: summary.to_string(),
        }))
    }

    /// Public display name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Contact email
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Summary text
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// When the profile was created
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl AggregateRoot for Profile {
    const AGGREGATE_TYPE: &'static str = "Profile";
    type Event = ProfileEvent;

    fn empty() -> Self {
        Self {
            id: Uuid::nil(),
            display_name: String::new(),
            email: String::new(),
            summary: String::new(),
            created_at: None,
            journal: Journal::new(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn journal(&self) -> &Journal<ProfileEvent> {
        &self.journal
    }

    fn journal_mut(&mut self) -> &mut Journal<ProfileEvent> {
        &mut self.journal
    }

    fn when(&mut self, event: &ProfileEvent) -> DomainResult<()> {
        use crate::events::DomainEvent;

        match event {
            ProfileEvent::ProfileCreated(e) => {
                if self.created_at.is_some() {
                    return Err(DomainError::UnsupportedEvent(
                        event.event_type().to_string(),
                    ));
                }
                self.id = e.id;
                self.display_name = e.display_name.clone();
                self.email = e.email.clone();
                self.created_at = Some(e.created_at);
            }
            ProfileEvent::DisplayNameUpdated(e) => {
                self.ensure_created(event)?;
                self.display_name = e.display_name.clone();
            }
            ProfileEvent::SummaryUpdated(e) => {
                self.ensure_created(event)?;
                self.summary = e.summary.clone();
            }
        }

        Ok(())
    }

    fn event_registry() -> EventTypeRegistry<ProfileEvent> {
        ProfileEvent::registry()
    }
}

impl Profile {
    fn ensure_created(&self, event: &ProfileEvent) -> DomainResult<()> {
        use crate::events::DomainEvent;

        if self.created_at.is_none() {
            return Err(DomainError::UnsupportedEvent(
                event.event_type().to_string(),
            ));
        }
        Ok(())
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
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_initializes_state() {
        let id = Uuid::now_v7();
        let profile = Profile::create(id, "ada", "ada@example.com").unwrap();

        assert_eq!(profile.id(), id);
        assert_eq!(profile.display_name(), "ada");
        assert_eq!(profile.email(), "ada@example.com");
        assert_eq!(profile.version(), 1);
    }

    #[test]
    fn test_create_rejects_invalid_email() {
        let err = Profile::create(Uuid::now_v7(), "ada", "not-an-email").unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn test_updates_and_replay() {
        let mut profile = Profile::create(Uuid::now_v7(), "ada", "ada@example.com").unwrap();
        profile.update_display_name("ada.l").unwrap();
        profile.update_summary("First programmer.").unwrap();

        let replayed = Profile::replay(profile.uncommitted_events().to_vec()).unwrap();
        assert_eq!(replayed.display_name(), "ada.l");
        assert_eq!(replayed.summary(), "First programmer.");
        assert_eq!(replayed.version(), 3);
    }
}
