//! Change events recorded in a change memory.

use crate::resource::Resource;
use crate::types::{ChangeKind, SequenceId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single immutable change event.
///
/// Events are created by [`ChangeMemory::append`](crate::ChangeMemory::append),
/// which assigns the sequence id. Decoders reconstruct events from a change
/// feed with [`ChangeEvent::from_parts`].
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    sequence: SequenceId,
    kind: ChangeKind,
    resource: Resource,
    timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Reassembles an event from its parts.
    pub fn from_parts(
        sequence: SequenceId,
        kind: ChangeKind,
        resource: Resource,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence,
            kind,
            resource,
            timestamp,
        }
    }

    /// Returns the sequence id.
    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    /// Returns the kind of change.
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Returns the resource as of the event.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Returns when the event was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl PartialEq for ChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
            && self.kind == other.kind
            && self.timestamp == other.timestamp
            && self.resource.same_fields(&other.resource)
    }
}

impl Eq for ChangeEvent {}
