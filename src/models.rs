use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an entry adds to the running total (meal) or subtracts from it (workout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Meal,
    Workout,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Meal => "meal",
            EntryKind::Workout => "workout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub calories: i64,
}

impl Entry {
    pub fn new(name: impl Into<String>, calories: i64) -> Self {
        Self::with_id(EntryId::generate(), name, calories)
    }

    pub fn with_id(id: impl Into<EntryId>, name: impl Into<String>, calories: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calories,
        }
    }

    /// Case-insensitive substring match on the name. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Normal,
    Danger,
}

/// Derived quantities shown on the page, recomputed from state on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Summary {
    pub limit: i64,
    pub total: i64,
    pub consumed: i64,
    pub burned: i64,
    pub remaining: i64,
    pub progress_percent: f64,
    pub alert: AlertLevel,
}

/// Change notifications emitted by the tracker for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    LimitInput { limit: i64 },
    LimitChanged { limit: i64 },
    SummaryChanged { summary: Summary },
    EntryAdded { kind: EntryKind, entry: Entry },
    EntryRemoved { kind: EntryKind, id: EntryId },
    Cleared,
}

#[derive(Debug, Deserialize)]
pub struct NewEntryRequest {
    pub name: String,
    pub calories: i64,
}

#[derive(Debug, Deserialize)]
pub struct LimitRequest {
    pub limit: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct FilterQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackerView {
    pub summary: Summary,
    pub meals: Vec<Entry>,
    pub workouts: Vec<Entry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub view: TrackerView,
    pub events: Vec<TrackerEvent>,
}
