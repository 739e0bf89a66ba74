use crate::error::{DblogError, EventError, StoreError};
use crate::events::EventRepository;
use crate::format::{LIST_MESSAGE_LENGTH, format_message, format_short_date, truncate_words};
use crate::store::Store;
use crate::types::{
    EventDetail, EventId, EventListParams, EventPage, EventSummary, LogEvent, NewEvent, UserAccount,
    UserId, UserRef,
};
use crate::users::UserDirectory;
use crate::validation::parse_event_query;
use std::collections::HashMap;

pub struct Dblog<S: Store> {
    store: S,
}

impl<S: Store> Dblog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolve_users(
        &self,
        rows: &[LogEvent],
    ) -> Result<HashMap<UserId, UserAccount>, StoreError> {
        let mut ids: Vec<UserId> = rows
            .iter()
            .filter_map(|row| row.user_id)
            .filter(|id| !id.is_anonymous())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.store.users().resolve(&ids)
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Dblog<S>,
}

impl<S: Store> EventsApi<'_, S> {
    /// One filtered, sorted page plus the total match count and every known
    /// type.
    pub fn list(&self, params: &EventListParams) -> Result<EventPage, DblogError> {
        let query = parse_event_query(params)?;
        let events = self.core.store.events();
        let total = events.count(&query.filter)?;
        let rows = events.list(&query)?;
        let type_options = events.types()?;
        let accounts = self.core.resolve_users(&rows)?;
        tracing::debug!(
            order = %query.order,
            sort = %query.sort,
            page = query.page,
            total,
            rows = rows.len(),
            "listed events"
        );

        let data = rows
            .iter()
            .map(|row| summarize(row, &accounts))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EventPage {
            data,
            total,
            type_options,
        })
    }

    pub fn get(&self, id: EventId) -> Result<EventDetail, DblogError> {
        let row = self
            .core
            .store
            .events()
            .get(id)?
            .ok_or(EventError::NotFound)?;
        let accounts = self.core.resolve_users(std::slice::from_ref(&row))?;
        Ok(EventDetail {
            user: UserRef::resolve(row.user_id, &accounts),
            date: short_date(&row)?,
            message: format_message(&row.message, row.variables.as_deref()),
            severity: row.severity,
            event_type: row.event_type,
            referrer: row.referrer,
            hostname: row.hostname,
            location: row.location,
            link: row.link,
        })
    }

    pub fn append(&self, event: NewEvent) -> Result<EventId, DblogError> {
        if event.event_type.trim().is_empty() {
            return Err(EventError::InvalidInput {
                message: "type must not be empty".to_string(),
            }
            .into());
        }
        let row = self.core.store.events().append(event)?;
        tracing::info!(id = %row.id, event_type = %row.event_type, "appended event");
        Ok(row.id)
    }
}

fn summarize(
    row: &LogEvent,
    accounts: &HashMap<UserId, UserAccount>,
) -> Result<EventSummary, StoreError> {
    let message = format_message(&row.message, row.variables.as_deref());
    Ok(EventSummary {
        id: row.id,
        event_type: row.event_type.clone(),
        user: UserRef::resolve(row.user_id, accounts),
        date: short_date(row)?,
        message: truncate_words(&message, LIST_MESSAGE_LENGTH),
        severity_class: row.severity.css_class().to_string(),
        link: row.link.clone(),
    })
}

fn short_date(row: &LogEvent) -> Result<String, StoreError> {
    format_short_date(row.timestamp).ok_or_else(|| StoreError::CorruptRow {
        message: format!("event {} has invalid timestamp {}", row.id, row.timestamp),
    })
}
