use crate::util::{
    DbError, decode_enum, decode_json, encode_enum, encode_json, from_timestamp, to_timestamp,
};
use civic_core::error::CivicError;
use civic_core::events::EventRepository;
use civic_core::types::{EventFilter, EventId, EventRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};
use std::str::FromStr;

const COLUMNS: &str = "id, title, description, location, category, starts_at, ends_at, status, media_urls_json, contact_info, max_attendees, requires_registration, created_at, updated_at";

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn query(&self, sql: &str, values: Vec<Value>) -> Result<Vec<EventRecord>, CivicError> {
        let mut stmt = self.conn.prepare(sql).map_err(internal)?;
        let mut rows = stmt.query(params_from_iter(values)).map_err(internal)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(internal)? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }

    fn row_values(event: &EventRecord) -> Result<Vec<Value>, CivicError> {
        Ok(vec![
            Value::Text(event.id.as_str().to_string()),
            Value::Text(event.title.clone()),
            Value::Text(event.description.clone()),
            Value::Text(event.location.clone()),
            Value::Text(encode_enum(&event.category).map_err(codec_failed)?),
            Value::Text(to_timestamp(&event.starts_at)),
            event
                .ends_at
                .as_ref()
                .map_or(Value::Null, |at| Value::Text(to_timestamp(at))),
            Value::Text(encode_enum(&event.status).map_err(codec_failed)?),
            Value::Text(encode_json(&event.media_urls).map_err(codec_failed)?),
            event
                .contact_info
                .clone()
                .map_or(Value::Null, Value::Text),
            Value::Integer(i64::from(event.max_attendees)),
            Value::Integer(i64::from(event.requires_registration)),
            Value::Text(to_timestamp(&event.created_at)),
            event
                .updated_at
                .as_ref()
                .map_or(Value::Null, |at| Value::Text(to_timestamp(at))),
        ])
    }
}

impl EventRepository for EventRepo<'_> {
    fn create(&self, event: &EventRecord) -> Result<(), CivicError> {
        let sql = format!(
            "INSERT INTO events ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        );
        self.conn
            .execute(&sql, params_from_iter(Self::row_values(event)?))
            .map_err(|err| match err {
                rusqlite::Error::SqliteFailure(code, _)
                    if code.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    CivicError::invalid_input(format!("event {} already exists", event.id))
                }
                other => internal(other),
            })?;
        Ok(())
    }

    fn get(&self, id: &EventId) -> Result<Option<EventRecord>, CivicError> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE id = ?1");
        let mut found = self.query(&sql, vec![Value::Text(id.as_str().to_string())])?;
        Ok(found.pop())
    }

    fn list(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, CivicError> {
        let mut sql = format!("SELECT {COLUMNS} FROM events");
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(status) = filter.status {
            clauses.push("status = ?");
            values.push(Value::Text(encode_enum(&status).map_err(codec_failed)?));
        }
        if let Some(category) = filter.category {
            clauses.push("category = ?");
            values.push(Value::Text(encode_enum(&category).map_err(codec_failed)?));
        }
        if let Some(from) = filter.from_date {
            clauses.push("starts_at >= ?");
            values.push(Value::Text(to_timestamp(&from)));
        }
        if let Some(to) = filter.to_date {
            clauses.push("starts_at <= ?");
            values.push(Value::Text(to_timestamp(&to)));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY starts_at ASC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(i64::from(limit)));
        }
        self.query(&sql, values)
    }

    fn list_all(&self) -> Result<Vec<EventRecord>, CivicError> {
        self.list(&EventFilter::default())
    }

    fn update(&self, event: &EventRecord) -> Result<(), CivicError> {
        let sql = "UPDATE events SET title = ?2, description = ?3, location = ?4, category = ?5, starts_at = ?6, ends_at = ?7, status = ?8, media_urls_json = ?9, contact_info = ?10, max_attendees = ?11, requires_registration = ?12, created_at = ?13, updated_at = ?14 WHERE id = ?1";
        let changed = self
            .conn
            .execute(sql, params_from_iter(Self::row_values(event)?))
            .map_err(internal)?;
        if changed == 0 {
            return Err(civic_core::error::EventError::NotFound.into());
        }
        Ok(())
    }

    fn delete(&self, id: &EventId) -> Result<bool, CivicError> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1", [id.as_str()])
            .map_err(internal)?;
        Ok(changed > 0)
    }

    fn count(&self) -> Result<u64, CivicError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .map_err(internal)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn map_event_row(row: &Row<'_>) -> Result<EventRecord, CivicError> {
    let text = |idx: usize| row.get::<_, String>(idx).map_err(internal);
    let optional = |idx: usize| row.get::<_, Option<String>>(idx).map_err(internal);

    let id = text(0)?;
    let ends_at = optional(6)?;
    let updated_at = optional(13)?;
    let max_attendees: i64 = row.get(10).map_err(internal)?;
    let requires_registration: i64 = row.get(11).map_err(internal)?;

    Ok(EventRecord {
        id: EventId::from_str(&id)
            .map_err(|_| codec_failed(DbError::InvalidId { value: id.clone() }))?,
        title: text(1)?,
        description: text(2)?,
        location: text(3)?,
        category: decode_enum(&text(4)?).map_err(codec_failed)?,
        starts_at: from_timestamp(&text(5)?).map_err(codec_failed)?,
        ends_at: ends_at
            .as_deref()
            .map(from_timestamp)
            .transpose()
            .map_err(codec_failed)?,
        status: decode_enum(&text(7)?).map_err(codec_failed)?,
        media_urls: decode_json(&text(8)?).map_err(codec_failed)?,
        contact_info: optional(9)?,
        max_attendees: u32::try_from(max_attendees).unwrap_or(0),
        requires_registration: requires_registration != 0,
        created_at: from_timestamp(&text(12)?).map_err(codec_failed)?,
        updated_at: updated_at
            .as_deref()
            .map(from_timestamp)
            .transpose()
            .map_err(codec_failed)?,
    })
}

fn internal(err: rusqlite::Error) -> CivicError {
    CivicError::internal(err.to_string())
}

fn codec_failed(err: DbError) -> CivicError {
    CivicError::internal(err.to_string())
}
