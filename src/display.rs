//! Presentation adapter that follows tracker events.
//!
//! The board holds exactly what the page shows: the numeric displays, the
//! progress bar, the limit input value and one row per entry keyed by id.

use crate::models::{AlertLevel, Entry, EntryKind, Summary, TrackerEvent};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayBoard {
    pub limit_input: i64,
    pub limit: i64,
    pub total: i64,
    pub consumed: i64,
    pub burned: i64,
    pub remaining: i64,
    pub progress_width: f64,
    pub alert: AlertLevel,
    pub meal_rows: Vec<Entry>,
    pub workout_rows: Vec<Entry>,
}

impl DisplayBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a TrackerEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: &TrackerEvent) {
        match event {
            TrackerEvent::LimitInput { limit } => self.limit_input = *limit,
            TrackerEvent::LimitChanged { limit } => self.limit = *limit,
            TrackerEvent::SummaryChanged { summary } => self.show_summary(summary),
            TrackerEvent::EntryAdded { kind, entry } => self.rows_mut(*kind).push(entry.clone()),
            TrackerEvent::EntryRemoved { kind, id } => self.rows_mut(*kind).retain(|row| &row.id != id),
            TrackerEvent::Cleared => {
                self.meal_rows.clear();
                self.workout_rows.clear();
            }
        }
    }

    pub fn rows(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Meal => &self.meal_rows,
            EntryKind::Workout => &self.workout_rows,
        }
    }

    fn show_summary(&mut self, summary: &Summary) {
        self.limit = summary.limit;
        self.total = summary.total;
        self.consumed = summary.consumed;
        self.burned = summary.burned;
        self.remaining = summary.remaining;
        self.progress_width = summary.progress_percent;
        self.alert = summary.alert;
    }

    fn rows_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Meal => &mut self.meal_rows,
            EntryKind::Workout => &mut self.workout_rows,
        }
    }
}
