use crate::error::CivicError;
use crate::types::{EventFilter, EventId, EventRecord};

/// Durable event storage. The in-memory [`crate::EventStore`] is an index
/// over what this repository holds; callers keep the two in step.
pub trait EventRepository {
    fn create(&self, event: &EventRecord) -> Result<(), CivicError>;
    fn get(&self, id: &EventId) -> Result<Option<EventRecord>, CivicError>;
    fn list(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, CivicError>;
    fn list_all(&self) -> Result<Vec<EventRecord>, CivicError>;
    fn update(&self, event: &EventRecord) -> Result<(), CivicError>;
    /// Returns `false` when no row matched.
    fn delete(&self, id: &EventId) -> Result<bool, CivicError>;
    fn count(&self) -> Result<u64, CivicError>;
}
