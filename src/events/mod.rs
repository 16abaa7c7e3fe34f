//! Domain Events
//!
//! All state changes to aggregates are represented as immutable events.
//! Events follow event sourcing principles:
//! - Immutable: once created, events never change
//! - Past tense: named for what happened (TitleUpdated, not UpdateTitle)
//! - Minimal: each event carries only the data needed to reconstruct one
//!   state transition
//! - Named: the wire-level type name is the event's identity, used for
//!   stream-record tagging and registry lookup
//!
//! # Module Organization
//!
//! - [`question`] - Question aggregate events
//! - [`profile`] - Profile aggregate events
//! - [`tag`] - Tag aggregate events
//! - [`registry`] - wire-name to decoder lookup used on the read path

pub mod profile;
pub mod question;
pub mod registry;
pub mod tag;

pub use profile::ProfileEvent;
pub use question::QuestionEvent;
pub use registry::EventTypeRegistry;
pub use tag::TagEvent;

/// Trait for domain events of one aggregate type.
///
/// An event's identity is its wire-level type name; two processes must agree
/// on these names for a stream written by one to be readable by the other.
pub trait DomainEvent: Clone + std::fmt::Debug + Send + Sync {
    /// Wire-level type name, matching a key in the aggregate's
    /// [`EventTypeRegistry`]
    fn event_type(&self) -> &'static str;

    /// Serialized payload stored alongside the type name
    fn payload(&self) -> serde_json::Result<serde_json::Value>;
}
