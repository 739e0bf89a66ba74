use crate::util::{corrupt, encode_variables, placeholders, query_err};
use dl_core::error::StoreError;
use dl_core::events::EventRepository;
use dl_core::types::{
    EventFilter, EventId, EventOrder, EventQuery, LogEvent, NewEvent, PAGE_SIZE, Severity,
    SortDirection, UserId,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};

const COLUMNS: &str =
    "wid, type, uid, timestamp, message, variables, severity, link, location, referer, hostname";

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for EventRepo<'_> {
    fn append(&self, event: NewEvent) -> Result<LogEvent, StoreError> {
        let sql = "INSERT INTO watchdog (uid, type, message, variables, severity, link, location, referer, hostname, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
        let variables = encode_variables(event.variables.as_ref());
        let params = (
            event.user_id.map(UserId::get),
            event.event_type.as_str(),
            event.message.as_str(),
            variables.as_deref(),
            i64::from(event.severity.level()),
            event.link.as_deref(),
            event.location.as_str(),
            event.referrer.as_deref(),
            event.hostname.as_str(),
            event.timestamp,
        );
        self.conn.execute(sql, params).map_err(query_err)?;
        let id = EventId::new(self.conn.last_insert_rowid());

        Ok(LogEvent {
            id,
            event_type: event.event_type,
            user_id: event.user_id,
            timestamp: event.timestamp,
            message: event.message,
            variables,
            severity: event.severity,
            link: event.link,
            location: event.location,
            referrer: event.referrer,
            hostname: event.hostname,
        })
    }

    fn get(&self, id: EventId) -> Result<Option<LogEvent>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM watchdog WHERE wid = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(query_err)?;
        let mut rows = stmt.query([id.get()]).map_err(query_err)?;
        let Some(row) = rows.next().map_err(query_err)? else {
            return Ok(None);
        };
        map_event_row(row).map(Some)
    }

    fn list(&self, query: &EventQuery) -> Result<Vec<LogEvent>, StoreError> {
        let mut params: Vec<Value> = Vec::new();
        let mut sql = format!("SELECT {COLUMNS} FROM watchdog");
        sql.push_str(&where_clause(&query.filter, &mut params));
        sql.push_str(&order_clause(query.order, query.sort));
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(i64::from(PAGE_SIZE)));
        params.push(Value::Integer(
            i64::try_from(query.offset()).map_err(|_| corrupt("page offset overflow"))?,
        ));

        let mut stmt = self.conn.prepare(&sql).map_err(query_err)?;
        let mut rows = stmt.query(params_from_iter(params)).map_err(query_err)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }

    fn count(&self, filter: &EventFilter) -> Result<u64, StoreError> {
        let mut params: Vec<Value> = Vec::new();
        let mut sql = String::from("SELECT COUNT(*) FROM watchdog");
        sql.push_str(&where_clause(filter, &mut params));
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| row.get(0))
            .map_err(query_err)?;
        u64::try_from(count).map_err(|_| corrupt(format!("negative count {count}")))
    }

    fn types(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT type FROM watchdog ORDER BY type")
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_err)?;
        let mut types = Vec::new();
        for row in rows {
            types.push(row.map_err(query_err)?);
        }
        Ok(types)
    }
}

fn where_clause(filter: &EventFilter, params: &mut Vec<Value>) -> String {
    let mut conditions = Vec::new();
    if !filter.types.is_empty() {
        conditions.push(format!("type IN ({})", placeholders(filter.types.len())));
        params.extend(filter.types.iter().cloned().map(Value::Text));
    }
    if !filter.severities.is_empty() {
        conditions.push(format!(
            "severity IN ({})",
            placeholders(filter.severities.len())
        ));
        params.extend(
            filter
                .severities
                .iter()
                .map(|severity| Value::Integer(i64::from(severity.level()))),
        );
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Sorting on `wid` doubles as sorting by date; other columns fall back to
/// insertion order on ties.
fn order_clause(order: EventOrder, sort: SortDirection) -> String {
    let direction = match sort {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    match order {
        EventOrder::Date => format!(" ORDER BY wid {direction}"),
        EventOrder::Type => format!(" ORDER BY type {direction}, wid ASC"),
        EventOrder::User => format!(" ORDER BY uid {direction}, wid ASC"),
    }
}

fn map_event_row(row: &Row<'_>) -> Result<LogEvent, StoreError> {
    let id: i64 = row.get(0).map_err(query_err)?;
    let severity: i64 = row.get(6).map_err(query_err)?;
    let severity = Severity::from_level(severity)
        .map_err(|err| corrupt(format!("event {id}: {err}")))?;
    Ok(LogEvent {
        id: EventId::new(id),
        event_type: row.get(1).map_err(query_err)?,
        user_id: row
            .get::<_, Option<i64>>(2)
            .map_err(query_err)?
            .map(UserId::new),
        timestamp: row.get(3).map_err(query_err)?,
        message: row.get(4).map_err(query_err)?,
        variables: row.get(5).map_err(query_err)?,
        severity,
        link: row.get(7).map_err(query_err)?,
        location: row.get(8).map_err(query_err)?,
        referrer: row.get(9).map_err(query_err)?,
        hostname: row.get(10).map_err(query_err)?,
    })
}
