//! Boundary Existence Checks
//!
//! Vote and tag-creation operations validate identities against collaborators
//! outside this core (the profile directory, the tag catalog). These traits
//! are that boundary: implementations answer "does this exist?" and nothing
//! more. A negative answer is a normal validation outcome for the caller; a
//! [`ServiceError`] is a transport fault.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Transport failure while consulting an external existence check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("existence check failed: {0}")]
pub struct ServiceError(pub String);

/// Result type for existence checks
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Lookup into the profile directory
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Whether a profile exists for the given identity
    async fn exists(&self, profile_id: Uuid) -> ServiceResult<bool>;
}

/// Lookup into the tag catalog
#[async_trait]
pub trait TagService: Send + Sync {
    /// Whether a tag with the given name already exists
    async fn exists(&self, name: &str) -> ServiceResult<bool>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic in-memory stand-ins used across the unit tests

    use std::collections::HashSet;

    use super::*;

    #[derive(Debug, Default)]
    pub struct FixedProfileService {
        known: HashSet<Uuid>,
    }

    impl FixedProfileService {
        pub fn with_profiles(ids: impl IntoIterator<Item = Uuid>) -> Self {
            Self {
                known: ids.into_iter().collect(),
            }
        }
    }

    #[async_trait]
    impl ProfileService for FixedProfileService {
        async fn exists(&self, profile_id: Uuid) -> ServiceResult<bool> {
            Ok(self.known.contains(&profile_id))
        }
    }

    #[derive(Debug, Default)]
    pub struct FixedTagService {
        known: HashSet<String>,
    }

    impl FixedTagService {
        pub fn with_tags(names: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                known: names.into_iter().map(String::from).collect(),
            }
        }
    }

    #[async_trait]
    impl TagService for FixedTagService {
        async fn exists(&self, name: &str) -> ServiceResult<bool> {
            Ok(self.known.contains(name))
        }
    }
}
