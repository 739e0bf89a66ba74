use crate::error::StoreError;
use crate::types::{EventFilter, EventId, EventQuery, LogEvent, NewEvent};

/// Read access to the append-only event log, plus `append` for the
/// producers that feed it.
pub trait EventRepository {
    fn append(&self, event: NewEvent) -> Result<LogEvent, StoreError>;
    fn get(&self, id: EventId) -> Result<Option<LogEvent>, StoreError>;
    /// One page of rows matching `query`, at most [`crate::types::PAGE_SIZE`].
    fn list(&self, query: &EventQuery) -> Result<Vec<LogEvent>, StoreError>;
    /// Rows matching `filter`, ignoring pagination.
    fn count(&self, filter: &EventFilter) -> Result<u64, StoreError>;
    /// Every distinct type in the log, sorted.
    fn types(&self) -> Result<Vec<String>, StoreError>;
}
