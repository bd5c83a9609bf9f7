pub mod sample;
pub mod store;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{SiteError, SiteResult};
use crate::posts::store::DocumentStore;

/// Club posts without a category are listed here.
pub const DEFAULT_CLUB_CATEGORY: &str = "general";

/// Posts grouped by category key (`upcoming`, `technical`, ...).
pub type PostsByCategory = BTreeMap<String, Vec<PostRecord>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventCategory {
    pub const ALL: [EventCategory; 3] = [
        EventCategory::Upcoming,
        EventCategory::Ongoing,
        EventCategory::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Upcoming => "upcoming",
            EventCategory::Ongoing => "ongoing",
            EventCategory::Completed => "completed",
        }
    }

    /// Category of a single-day event held on `date`, as seen on `today`.
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Greater => EventCategory::Upcoming,
            std::cmp::Ordering::Equal => EventCategory::Ongoing,
            std::cmp::Ordering::Less => EventCategory::Completed,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event or club listing. Fields this site does not know about are kept in
/// `extra` and handed to the templates untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    pub category: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Event,
    Club,
}

impl PostKind {
    /// Value of the `type` field on stored documents.
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Event => "event",
            PostKind::Club => "club",
        }
    }
}

#[derive(Clone)]
enum PostSource {
    Sample,
    Store(DocumentStore),
}

/// Read-only access to event and club posts, either from the built-in sample
/// set or from the document store. The choice is fixed at construction.
#[derive(Clone)]
pub struct PostRepository {
    source: PostSource,
}

impl PostRepository {
    pub fn sample() -> Self {
        Self {
            source: PostSource::Sample,
        }
    }

    pub fn from_store(store: DocumentStore) -> Self {
        Self {
            source: PostSource::Store(store),
        }
    }

    pub fn uses_real_data(&self) -> bool {
        matches!(self.source, PostSource::Store(_))
    }

    pub async fn event_posts(&self) -> SiteResult<PostsByCategory> {
        match &self.source {
            PostSource::Sample => Ok(sample::events()),
            PostSource::Store(store) => {
                let docs = store.find_by_type(PostKind::Event).await?;
                debug!("Loaded {} event documents", docs.len());
                let today = chrono::Local::now().date_naive();
                group_events(docs, today)
            }
        }
    }

    pub async fn club_posts(&self) -> SiteResult<PostsByCategory> {
        match &self.source {
            PostSource::Sample => Ok(sample::clubs()),
            PostSource::Store(store) => {
                let docs = store.find_by_type(PostKind::Club).await?;
                debug!("Loaded {} club documents", docs.len());
                group_clubs(docs)
            }
        }
    }
}

/// Group raw event documents. Every event category is present in the result,
/// possibly with no posts.
pub fn group_events(docs: Vec<Value>, today: NaiveDate) -> SiteResult<PostsByCategory> {
    let mut grouped: PostsByCategory = EventCategory::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), Vec::new()))
        .collect();

    for doc in docs {
        let record = map_document(doc, |fields| {
            let date = fields.get("date").and_then(Value::as_str).ok_or_else(|| {
                "event has neither a category nor a date".to_string()
            })?;
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| format!("invalid event date '{}': {}", date, e))?;
            Ok(EventCategory::for_date(date, today).as_str().to_string())
        })?;
        grouped.entry(record.category.clone()).or_default().push(record);
    }
    Ok(grouped)
}

pub fn group_clubs(docs: Vec<Value>) -> SiteResult<PostsByCategory> {
    let mut grouped = PostsByCategory::new();
    for doc in docs {
        let record = map_document(doc, |_| Ok(DEFAULT_CLUB_CATEGORY.to_string()))?;
        grouped.entry(record.category.clone()).or_default().push(record);
    }
    Ok(grouped)
}

/// Turn one stored document into a `PostRecord`. `fallback_category` is asked
/// for a category when the document has none.
fn map_document<F>(doc: Value, fallback_category: F) -> SiteResult<PostRecord>
where
    F: FnOnce(&Map<String, Value>) -> Result<String, String>,
{
    let malformed = |message: String| SiteError::MalformedData {
        origin: "post document".to_string(),
        message,
    };

    let Value::Object(mut fields) = doc else {
        return Err(malformed("document is not an object".to_string()));
    };

    let title = take_string(&mut fields, "title")
        .or_else(|| take_string(&mut fields, "name"))
        .ok_or_else(|| malformed("document has no title or name".to_string()))?;

    let category = match take_string(&mut fields, "category") {
        Some(c) => c.to_lowercase(),
        None => fallback_category(&fields).map_err(malformed)?,
    };

    let date = take_string(&mut fields, "date");
    let description = take_string(&mut fields, "description");
    let image = take_string(&mut fields, "image");
    let host = take_string(&mut fields, "host");

    fields.remove("_id");
    fields.remove("type");

    Ok(PostRecord {
        title,
        date,
        description,
        image,
        host,
        category,
        extra: fields.into_iter().collect(),
    })
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(other @ Value::Number(_)) => Some(other.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_category_for_date() {
        let today = day("2026-03-10");
        assert_eq!(
            EventCategory::for_date(day("2026-03-11"), today),
            EventCategory::Upcoming
        );
        assert_eq!(
            EventCategory::for_date(today, today),
            EventCategory::Ongoing
        );
        assert_eq!(
            EventCategory::for_date(day("2025-12-31"), today),
            EventCategory::Completed
        );
    }

    #[test]
    fn test_group_events_uses_explicit_category_first() {
        let docs = vec![json!({
            "_id": "abc",
            "type": "event",
            "title": "Hackathon",
            "date": "2020-01-01",
            "category": "Upcoming",
            "venue": "Main hall"
        })];
        let grouped = group_events(docs, day("2026-03-10")).unwrap();

        let upcoming = &grouped["upcoming"];
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Hackathon");
        assert_eq!(upcoming[0].extra["venue"], json!("Main hall"));
        assert!(!upcoming[0].extra.contains_key("_id"));
        assert!(!upcoming[0].extra.contains_key("type"));
    }

    #[test]
    fn test_group_events_derives_category_from_date() {
        let docs = vec![
            json!({"title": "Past", "date": "2026-03-01"}),
            json!({"title": "Today", "date": "2026-03-10"}),
            json!({"title": "Future", "date": "2026-04-01"}),
        ];
        let grouped = group_events(docs, day("2026-03-10")).unwrap();
        assert_eq!(grouped["completed"][0].title, "Past");
        assert_eq!(grouped["ongoing"][0].title, "Today");
        assert_eq!(grouped["upcoming"][0].title, "Future");
    }

    #[test]
    fn test_group_events_always_has_every_category() {
        let grouped = group_events(Vec::new(), day("2026-03-10")).unwrap();
        for category in EventCategory::ALL {
            assert!(grouped[category.as_str()].is_empty());
        }
    }

    #[test]
    fn test_event_without_date_or_category_is_malformed() {
        let err = group_events(vec![json!({"title": "Mystery"})], day("2026-03-10"))
            .unwrap_err();
        assert!(matches!(err, SiteError::MalformedData { .. }));
    }

    #[test]
    fn test_non_object_document_is_malformed() {
        assert!(group_clubs(vec![json!(["not", "an", "object"])]).is_err());
        assert!(group_clubs(vec![json!({"description": "no name"})]).is_err());
    }

    #[test]
    fn test_clubs_use_name_and_default_category() {
        let docs = vec![
            json!({"name": "Coding Club", "category": "technical"}),
            json!({"name": "Chess Club"}),
        ];
        let grouped = group_clubs(docs).unwrap();
        assert_eq!(grouped["technical"][0].title, "Coding Club");
        assert_eq!(grouped[DEFAULT_CLUB_CATEGORY][0].title, "Chess Club");
    }

    #[tokio::test]
    async fn test_sample_repository_is_deterministic() {
        let posts = PostRepository::sample();
        assert!(!posts.uses_real_data());

        assert_eq!(
            posts.event_posts().await.unwrap(),
            posts.event_posts().await.unwrap()
        );
        assert_eq!(
            posts.club_posts().await.unwrap(),
            posts.club_posts().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_store_repository_reads_documents() {
        let store = DocumentStore::open_in_memory("posts").unwrap();
        store
            .insert_one(json!({"type": "event", "title": "Fest", "category": "ongoing"}))
            .await
            .unwrap();
        store
            .insert_one(json!({"type": "club", "name": "Robotics", "category": "technical"}))
            .await
            .unwrap();

        let posts = PostRepository::from_store(store);
        assert!(posts.uses_real_data());

        let events = posts.event_posts().await.unwrap();
        assert_eq!(events["ongoing"][0].title, "Fest");
        assert!(events["upcoming"].is_empty());

        let clubs = posts.club_posts().await.unwrap();
        assert_eq!(clubs["technical"][0].title, "Robotics");
    }
}
