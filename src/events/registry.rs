//! Event Type Registry
//!
//! Process-wide lookup from a wire-level event-type name to a decoder for
//! the concrete event shape. Required to deserialize a heterogeneous stream
//! of records back into typed events.
//!
//! Registration is explicit: each aggregate's event enum ships a
//! `registry()` constructor listing every wire name and its decoder, so the
//! registry's contents are auditable and testable in isolation. There is no
//! runtime discovery and no mutation after construction.

use std::collections::HashMap;

use crate::errors::{PersistenceError, PersistenceResult};

/// Decoder from a stored JSON payload to a typed event
pub type DecodeFn<E> = fn(&serde_json::Value) -> serde_json::Result<E>;

/// Lookup table from event-type name to decoder for one aggregate's event
/// vocabulary.
///
/// Built once at startup and shared read-only for the process lifetime.
/// An unregistered name is a structural persistence error
/// ([`PersistenceError::UnknownEventType`]): the stream contains an event
/// type the current binary does not know about, and the read must fail
/// rather than skip the record.
#[derive(Debug, Clone)]
pub struct EventTypeRegistry<E> {
    decoders: HashMap<&'static str, DecodeFn<E>>,
}

impl<E> EventTypeRegistry<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a decoder under its wire-level event-type name.
    ///
    /// Called only during construction; the built registry is never mutated
    /// afterwards.
    pub fn register(&mut self, name: &'static str, decode: DecodeFn<E>) {
        self.decoders.insert(name, decode);
    }

    /// Look up the decoder for a wire name
    pub fn lookup(&self, name: &str) -> PersistenceResult<DecodeFn<E>> {
        self.decoders
            .get(name)
            .copied()
            .ok_or_else(|| PersistenceError::UnknownEventType(name.to_string()))
    }

    /// Decode a stored payload into a typed event.
    ///
    /// Fails with [`PersistenceError::UnknownEventType`] for unregistered
    /// names and [`PersistenceError::Serialization`] for malformed payloads.
    pub fn decode(&self, name: &str, data: &serde_json::Value) -> PersistenceResult<E> {
        let decode = self.lookup(name)?;
        decode(data).map_err(PersistenceError::from)
    }

    /// Whether a wire name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    /// Number of registered event types
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl<E> Default for EventTypeRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
