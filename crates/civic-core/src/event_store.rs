use crate::types::{Category, EventId, EventRecord, EventSearch};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

pub const RECENTLY_VIEWED_CAPACITY: usize = 20;
const TOP_SEARCH_TERMS: usize = 3;

/// In-memory index over event records.
///
/// Every operation runs under one mutex, so callers observe a fully
/// serialized store. Records handed out are clones; mutating them never
/// reaches the index.
pub struct EventStore {
    inner: Mutex<Indexes>,
}

#[derive(Debug, Clone, Copy)]
struct SearchCount {
    count: u64,
    first_seen: u64,
}

#[derive(Default)]
struct Indexes {
    by_id: HashMap<EventId, EventRecord>,
    by_date: BTreeMap<NaiveDate, Vec<EventId>>,
    // category -> number of indexed records using it
    categories: BTreeMap<Category, usize>,
    // most recent first
    recently_viewed: VecDeque<EventId>,
    upcoming: VecDeque<EventId>,
    search_frequency: HashMap<String, SearchCount>,
    searches_tracked: u64,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Indexes::default()),
        }
    }

    /// Bulk insert used by startup code; there is no implicit seeding.
    pub fn seed(&self, records: impl IntoIterator<Item = EventRecord>) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let mut added = 0usize;
        for record in records {
            inner.add(record, now);
            added += 1;
        }
        debug!(added, total = inner.by_id.len(), "seeded event store");
    }

    pub fn add_event(&self, record: EventRecord) -> EventRecord {
        self.add_event_at(record, Utc::now())
    }

    /// Like [`Self::add_event`], deciding "upcoming" relative to `now`.
    pub fn add_event_at(&self, record: EventRecord, now: DateTime<Utc>) -> EventRecord {
        debug!(id = %record.id, starts_at = %record.starts_at, "indexing event");
        self.inner.lock().add(record, now)
    }

    pub fn all_events(&self) -> Vec<EventRecord> {
        self.inner.lock().all_events()
    }

    /// Looks up a record and records the view in the recently-viewed history.
    pub fn get_event_by_id(&self, id: &EventId) -> Option<EventRecord> {
        self.inner.lock().view(id)
    }

    pub fn search_events(&self, search: &EventSearch) -> Vec<EventRecord> {
        self.inner.lock().search(search)
    }

    pub fn recommendations(&self, count: usize, area: Option<&str>) -> Vec<EventRecord> {
        self.recommendations_at(count, area, Utc::now())
    }

    pub fn recommendations_at(
        &self,
        count: usize,
        area: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<EventRecord> {
        self.inner.lock().recommendations(count, area, now)
    }

    pub fn location_recommendations(
        &self,
        count: usize,
        location: &str,
        category: Option<&str>,
    ) -> Vec<EventRecord> {
        self.location_recommendations_at(count, location, category, Utc::now())
    }

    pub fn location_recommendations_at(
        &self,
        count: usize,
        location: &str,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<EventRecord> {
        self.inner
            .lock()
            .location_recommendations(count, location, category, now)
    }

    pub fn recently_viewed(&self, count: usize) -> Vec<EventRecord> {
        self.inner.lock().recently_viewed(count)
    }

    /// Peeks the head of the upcoming queue without consuming it.
    pub fn upcoming_events(&self, count: usize) -> Vec<EventRecord> {
        self.inner.lock().peek_upcoming(count)
    }

    pub fn categories(&self) -> Vec<String> {
        self.inner
            .lock()
            .categories
            .keys()
            .map(|category| category.as_str().to_string())
            .collect()
    }

    pub fn track_search(&self, term: &str) {
        self.inner.lock().track_search(term);
    }

    /// Count recorded for `term`, matched case-insensitively after trimming.
    pub fn search_count(&self, term: &str) -> u64 {
        let key = term.trim().to_lowercase();
        self.inner
            .lock()
            .search_frequency
            .get(&key)
            .map_or(0, |entry| entry.count)
    }

    pub fn update_event(&self, id: &EventId, record: EventRecord) -> Option<EventRecord> {
        let updated = self.inner.lock().update(id, record);
        if updated.is_some() {
            debug!(%id, "reindexed updated event");
        }
        updated
    }

    pub fn remove_event(&self, id: &EventId) -> Option<EventRecord> {
        let removed = self.inner.lock().remove(id);
        if removed.is_some() {
            debug!(%id, "dropped event from index");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Indexes {
    fn add(&mut self, record: EventRecord, now: DateTime<Utc>) -> EventRecord {
        if let Some(previous) = self.by_id.remove(&record.id) {
            self.unlink(&previous);
            self.upcoming.retain(|id| id != &record.id);
        }
        if record.starts_at >= now {
            self.upcoming.push_back(record.id.clone());
        }
        self.link(record.clone());
        record
    }

    fn update(&mut self, id: &EventId, mut record: EventRecord) -> Option<EventRecord> {
        let previous = self.by_id.remove(id)?;
        self.unlink(&previous);
        record.id = id.clone();
        self.link(record.clone());
        Some(record)
    }

    fn remove(&mut self, id: &EventId) -> Option<EventRecord> {
        let previous = self.by_id.remove(id)?;
        self.unlink(&previous);
        self.recently_viewed.retain(|viewed| viewed != id);
        self.upcoming.retain(|queued| queued != id);
        Some(previous)
    }

    fn link(&mut self, record: EventRecord) {
        self.by_date
            .entry(record.start_date())
            .or_default()
            .push(record.id.clone());
        *self.categories.entry(record.category).or_insert(0) += 1;
        self.by_id.insert(record.id.clone(), record);
    }

    fn unlink(&mut self, record: &EventRecord) {
        let date = record.start_date();
        if let Some(bucket) = self.by_date.get_mut(&date) {
            bucket.retain(|id| id != &record.id);
            if bucket.is_empty() {
                self.by_date.remove(&date);
            }
        }
        if let Some(uses) = self.categories.get_mut(&record.category) {
            *uses = uses.saturating_sub(1);
            if *uses == 0 {
                self.categories.remove(&record.category);
            }
        }
    }

    fn all_events(&self) -> Vec<EventRecord> {
        let mut events: Vec<EventRecord> = self
            .by_date
            .values()
            .flatten()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect();
        // stable: equal start times keep bucket insertion order
        events.sort_by_key(|event| event.starts_at);
        events
    }

    fn view(&mut self, id: &EventId) -> Option<EventRecord> {
        let record = self.by_id.get(id).cloned()?;
        self.recently_viewed.push_front(id.clone());
        self.recently_viewed.truncate(RECENTLY_VIEWED_CAPACITY);
        Some(record)
    }

    fn search(&mut self, search: &EventSearch) -> Vec<EventRecord> {
        let mut results = self.all_events();

        if let Some(raw) = non_blank(search.category.as_deref()) {
            if let Some(category) = Category::parse(raw) {
                results.retain(|event| event.category == category);
                self.track_search(raw);
            }
        }
        if let Some(start) = search.start_date {
            results.retain(|event| event.starts_at >= start);
        }
        if let Some(end) = search.end_date {
            results.retain(|event| event.starts_at <= end);
        }
        if let Some(query) = non_blank(search.query.as_deref()) {
            results.retain(|event| {
                contains_ci(&event.title, query)
                    || contains_ci(&event.description, query)
                    || contains_ci(&event.location, query)
            });
            self.track_search(query);
        }
        results
    }

    fn track_search(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        let seq = self.searches_tracked;
        self.searches_tracked += 1;
        self.search_frequency
            .entry(term.to_lowercase())
            .or_insert(SearchCount {
                count: 0,
                first_seen: seq,
            })
            .count += 1;
    }

    /// Highest counts first; ties go to the term tracked earliest.
    fn top_search_terms(&self, limit: usize) -> Vec<&str> {
        let mut terms: Vec<(&String, &SearchCount)> = self.search_frequency.iter().collect();
        terms.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        terms
            .into_iter()
            .take(limit)
            .map(|(term, _)| term.as_str())
            .collect()
    }

    fn recommendations(
        &self,
        count: usize,
        area: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<EventRecord> {
        let area = non_blank(area).map(str::trim);
        if self.search_frequency.is_empty() && area.is_none() {
            return self.peek_upcoming(count);
        }

        let future: Vec<EventRecord> = self
            .all_events()
            .into_iter()
            .filter(|event| event.starts_at >= now)
            .collect();

        if let Some(area) = area {
            let near: Vec<EventRecord> = future
                .iter()
                .filter(|event| {
                    contains_ci(&event.location, area) || contains_ci(&event.title, area)
                })
                .take(count)
                .cloned()
                .collect();
            if !near.is_empty() {
                return near;
            }
        }

        let mut result = Vec::new();
        let mut picked = HashSet::new();
        for term in self.top_search_terms(TOP_SEARCH_TERMS) {
            for event in &future {
                if matches_term(event, term) && picked.insert(event.id.clone()) {
                    result.push(event.clone());
                }
            }
        }

        for event in &future {
            if result.len() >= count {
                break;
            }
            if picked.insert(event.id.clone()) {
                result.push(event.clone());
            }
        }

        if result.is_empty() {
            result = self
                .upcoming_records()
                .filter(|event| event.starts_at >= now)
                .take(count)
                .cloned()
                .collect();
        }

        result.truncate(count);
        result
    }

    fn location_recommendations(
        &self,
        count: usize,
        location: &str,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<EventRecord> {
        let location = location.trim();
        // Some(None) means a category was asked for but names nothing we know.
        let wanted = non_blank(category)
            .filter(|value| !value.trim().eq_ignore_ascii_case("all"))
            .map(Category::parse);

        let mut matches: Vec<EventRecord> = self
            .all_events()
            .into_iter()
            .filter(|event| location_matches(event, location))
            .filter(|event| wanted.is_none_or(|parsed| parsed == Some(event.category)))
            .filter(|event| event.starts_at > now)
            .collect();

        matches.sort_by(|a, b| {
            a.starts_at
                .cmp(&b.starts_at)
                .then_with(|| self.title_searches(b).cmp(&self.title_searches(a)))
        });
        matches.truncate(count);
        matches
    }

    fn title_searches(&self, event: &EventRecord) -> u64 {
        self.search_frequency
            .get(&event.title.to_lowercase())
            .map_or(0, |entry| entry.count)
    }

    fn recently_viewed(&self, count: usize) -> Vec<EventRecord> {
        let mut seen = HashSet::new();
        self.recently_viewed
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.by_id.get(id).cloned())
            .take(count)
            .collect()
    }

    fn upcoming_records(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.upcoming.iter().filter_map(|id| self.by_id.get(id))
    }

    fn peek_upcoming(&self, count: usize) -> Vec<EventRecord> {
        self.upcoming_records().take(count).cloned().collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_term(event: &EventRecord, term: &str) -> bool {
    contains_ci(event.category.as_str(), term)
        || contains_ci(&event.title, term)
        || contains_ci(&event.description, term)
}

fn location_matches(event: &EventRecord, location: &str) -> bool {
    if contains_ci(&event.location, location) {
        return true;
    }
    let area = event.area();
    !area.is_empty() && contains_ci(location, area)
}
