use crate::types::enums::{Category, EventStatus};
use crate::types::event::EventRecord;
use crate::types::ids::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub location: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub max_attendees: u32,
    #[serde(default)]
    pub requires_registration: bool,
}

fn default_category() -> Category {
    Category::Community
}

impl CreateEventInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("location must not be empty".to_string());
        }
        check_window(self.starts_at, self.ends_at)
    }

    /// New events are published immediately so they show up in listings.
    pub fn into_record(self, id: EventId, now: DateTime<Utc>) -> EventRecord {
        EventRecord {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            category: self.category,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            status: EventStatus::Published,
            media_urls: self.media_urls.unwrap_or_default(),
            contact_info: self.contact_info,
            max_attendees: self.max_attendees,
            requires_registration: self.requires_registration,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Partial update. Blank strings leave the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<Category>,
    pub media_urls: Option<Vec<String>>,
    pub contact_info: Option<String>,
    pub max_attendees: Option<u32>,
    pub requires_registration: Option<bool>,
}

impl UpdateEventInput {
    pub fn apply(self, current: &EventRecord, now: DateTime<Utc>) -> Result<EventRecord, String> {
        let mut next = current.clone();
        if let Some(title) = non_blank(self.title) {
            next.title = title;
        }
        if let Some(description) = non_blank(self.description) {
            next.description = description;
        }
        if let Some(starts_at) = self.starts_at {
            next.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            next.ends_at = Some(ends_at);
        }
        if let Some(location) = non_blank(self.location) {
            next.location = location;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(media_urls) = self.media_urls {
            next.media_urls = media_urls;
        }
        if let Some(contact_info) = self.contact_info {
            next.contact_info = Some(contact_info);
        }
        if let Some(max_attendees) = self.max_attendees {
            next.max_attendees = max_attendees;
        }
        if let Some(requires_registration) = self.requires_registration {
            next.requires_registration = requires_registration;
        }
        check_window(next.starts_at, next.ends_at)?;
        next.updated_at = Some(now);
        Ok(next)
    }
}

/// Persistence-side listing filter. Unparseable strings never reach here;
/// the HTTP layer drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub category: Option<Category>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Store-side search. `category` stays a raw string: an unknown category
/// disables that filter instead of failing the search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EventSearch {
    pub query: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn check_window(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Result<(), String> {
    match ends_at {
        Some(ends_at) if ends_at < starts_at => {
            Err("endsAt must not be before startsAt".to_string())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_input() -> CreateEventInput {
        CreateEventInput {
            title: "Beach Clean-Up".to_string(),
            description: "Bring gloves".to_string(),
            starts_at: Utc::now() + Duration::days(2),
            ends_at: None,
            location: "Durban Beachfront".to_string(),
            category: Category::Environment,
            media_urls: None,
            contact_info: None,
            max_attendees: 0,
            requires_registration: false,
        }
    }

    #[test]
    fn create_rejects_inverted_window() {
        let mut input = create_input();
        input.ends_at = Some(input.starts_at - Duration::hours(1));
        assert!(input.validate().is_err());
    }

    #[test]
    fn created_record_is_published() {
        let now = Utc::now();
        let record = create_input().into_record(EventId::generate(), now);
        assert_eq!(record.status, EventStatus::Published);
        assert_eq!(record.created_at, now);
        assert!(record.media_urls.is_empty());
    }

    #[test]
    fn update_skips_blank_fields() {
        let now = Utc::now();
        let record = create_input().into_record(EventId::generate(), now);
        let update = UpdateEventInput {
            title: Some("   ".to_string()),
            location: Some("Phoenix Community Park".to_string()),
            max_attendees: Some(40),
            ..UpdateEventInput::default()
        };
        let next = update.apply(&record, now).unwrap();
        assert_eq!(next.title, "Beach Clean-Up");
        assert_eq!(next.location, "Phoenix Community Park");
        assert_eq!(next.max_attendees, 40);
        assert_eq!(next.updated_at, Some(now));
        assert_eq!(next.id, record.id);
    }

    #[test]
    fn search_deserializes_camel_case() {
        let search: EventSearch = serde_json::from_str(
            r#"{"query":"water","startDate":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(search.query.as_deref(), Some("water"));
        assert!(search.start_date.is_some());
        assert!(search.category.is_none());
    }
}
