use crate::types::enums::{Category, EventStatus};
use crate::types::ids::EventId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Category,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub media_urls: Vec<String>,
    pub contact_info: Option<String>,
    /// Zero means unlimited.
    pub max_attendees: u32,
    pub requires_registration: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventRecord {
    /// Chronological bucket key.
    pub fn start_date(&self) -> NaiveDate {
        self.starts_at.date_naive()
    }

    /// First comma-delimited segment of the location, trimmed.
    pub fn area(&self) -> &str {
        self.location.split(',').next().unwrap_or("").trim()
    }
}
