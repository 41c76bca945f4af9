//! Calorie bookkeeping core.
//!
//! [`Tracker`] owns the calorie limit, the running total and the meal and
//! workout lists. Every mutation is written to the injected [`Storage`] before
//! the in-memory state changes, and returns the [`TrackerEvent`]s the
//! presentation layer needs to catch up. The tracker never renders anything
//! itself.
//!
//! After every completed operation the running total equals the sum of meal
//! calories minus the sum of workout calories.

use crate::config::{TrackerConfig, MAX_CALORIES};
use crate::errors::TrackerError;
use crate::models::{AlertLevel, Entry, EntryId, EntryKind, Summary, TrackerEvent};
use crate::storage::Storage;
use tracing::{debug, info, warn};

pub struct Tracker<S> {
    storage: S,
    calorie_limit: i64,
    total_calories: i64,
    meals: Vec<Entry>,
    workouts: Vec<Entry>,
}

impl<S: Storage> Tracker<S> {
    /// Loads persisted state (falling back to `config` defaults) and returns the
    /// events that bring a fresh display up to date.
    ///
    /// A stored total that disagrees with the stored entries is replaced by the
    /// derived sum and written back.
    pub fn load(mut storage: S, config: TrackerConfig) -> Result<(Self, Vec<TrackerEvent>), TrackerError> {
        let calorie_limit = storage.get_calorie_limit(config.default_calorie_limit)?;
        let stored_total = storage.get_total_calories(config.default_total_calories)?;
        let meals = storage.get_meals()?;
        let workouts = storage.get_workouts()?;

        let derived = net_calories(&meals, &workouts);
        if stored_total != derived {
            warn!(stored_total, derived, "stored total disagrees with entries, using derived total");
            storage.update_total_calories(derived)?;
        }

        let tracker = Self {
            storage,
            calorie_limit,
            total_calories: derived,
            meals,
            workouts,
        };
        info!(
            limit = tracker.calorie_limit,
            total = tracker.total_calories,
            meals = tracker.meals.len(),
            workouts = tracker.workouts.len(),
            "tracker loaded"
        );

        let events = vec![
            TrackerEvent::LimitInput { limit: calorie_limit },
            TrackerEvent::LimitChanged { limit: calorie_limit },
            tracker.summary_event(),
        ];
        Ok((tracker, events))
    }

    pub fn add_meal(&mut self, meal: Entry) -> Result<Vec<TrackerEvent>, TrackerError> {
        self.add_entry(EntryKind::Meal, meal)
    }

    pub fn add_workout(&mut self, workout: Entry) -> Result<Vec<TrackerEvent>, TrackerError> {
        self.add_entry(EntryKind::Workout, workout)
    }

    /// Removing an id that is not present is a no-op and yields no events.
    pub fn remove_meal(&mut self, id: &EntryId) -> Result<Vec<TrackerEvent>, TrackerError> {
        self.remove_entry(EntryKind::Meal, id)
    }

    pub fn remove_workout(&mut self, id: &EntryId) -> Result<Vec<TrackerEvent>, TrackerError> {
        self.remove_entry(EntryKind::Workout, id)
    }

    /// Zeroes the total and drops every entry. The calorie limit is kept.
    pub fn reset(&mut self) -> Result<Vec<TrackerEvent>, TrackerError> {
        self.storage.clear_all()?;
        self.total_calories = 0;
        self.meals.clear();
        self.workouts.clear();
        info!(limit = self.calorie_limit, "tracker reset");

        Ok(vec![TrackerEvent::Cleared, self.summary_event()])
    }

    pub fn set_limit(&mut self, limit: i64) -> Result<Vec<TrackerEvent>, TrackerError> {
        if !(0..=MAX_CALORIES).contains(&limit) {
            return Err(TrackerError::InvalidLimit(limit));
        }
        self.storage.set_calorie_limit(limit)?;
        self.calorie_limit = limit;
        info!(limit, "calorie limit updated");

        Ok(vec![
            TrackerEvent::LimitInput { limit },
            TrackerEvent::LimitChanged { limit },
            self.summary_event(),
        ])
    }

    /// One `EntryAdded` per stored meal, then per stored workout, in stored
    /// order. Totals are left alone.
    pub fn load_items(&self) -> Vec<TrackerEvent> {
        let meals = self.meals.iter().map(|entry| TrackerEvent::EntryAdded {
            kind: EntryKind::Meal,
            entry: entry.clone(),
        });
        let workouts = self.workouts.iter().map(|entry| TrackerEvent::EntryAdded {
            kind: EntryKind::Workout,
            entry: entry.clone(),
        });
        meals.chain(workouts).collect()
    }

    pub fn summary(&self) -> Summary {
        let consumed = sum_calories(&self.meals);
        let burned = sum_calories(&self.workouts);
        let remaining = self.calorie_limit.saturating_sub(self.total_calories);

        Summary {
            limit: self.calorie_limit,
            total: self.total_calories,
            consumed,
            burned,
            remaining,
            progress_percent: progress_percent(self.total_calories, self.calorie_limit),
            alert: if remaining <= 0 {
                AlertLevel::Danger
            } else {
                AlertLevel::Normal
            },
        }
    }

    pub fn calorie_limit(&self) -> i64 {
        self.calorie_limit
    }

    pub fn total_calories(&self) -> i64 {
        self.total_calories
    }

    pub fn meals(&self) -> &[Entry] {
        &self.meals
    }

    pub fn workouts(&self) -> &[Entry] {
        &self.workouts
    }

    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Meal => &self.meals,
            EntryKind::Workout => &self.workouts,
        }
    }

    pub fn filter(&self, kind: EntryKind, query: &str) -> Vec<&Entry> {
        self.entries(kind)
            .iter()
            .filter(|entry| entry.matches(query))
            .collect()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn add_entry(&mut self, kind: EntryKind, entry: Entry) -> Result<Vec<TrackerEvent>, TrackerError> {
        self.validate(kind, &entry)?;
        let total = match kind {
            EntryKind::Meal => self.total_calories.checked_add(entry.calories),
            EntryKind::Workout => self.total_calories.checked_sub(entry.calories),
        }
        .ok_or_else(|| overflow(kind))?;

        match kind {
            EntryKind::Meal => self.storage.save_meal(&entry)?,
            EntryKind::Workout => self.storage.save_workout(&entry)?,
        }
        if let Err(err) = self.storage.update_total_calories(total) {
            let rollback = match kind {
                EntryKind::Meal => self.storage.remove_meal(&entry.id),
                EntryKind::Workout => self.storage.remove_workout(&entry.id),
            };
            if let Err(rollback_err) = rollback {
                warn!(id = %entry.id, "failed to roll back saved {}: {rollback_err}", kind.as_str());
            }
            return Err(err.into());
        }

        debug!(kind = kind.as_str(), id = %entry.id, calories = entry.calories, total, "entry added");
        self.total_calories = total;
        self.entries_mut(kind).push(entry.clone());

        Ok(vec![self.summary_event(), TrackerEvent::EntryAdded { kind, entry }])
    }

    fn remove_entry(&mut self, kind: EntryKind, id: &EntryId) -> Result<Vec<TrackerEvent>, TrackerError> {
        let Some(index) = self.entries(kind).iter().position(|entry| &entry.id == id) else {
            debug!(kind = kind.as_str(), %id, "remove ignored, no such entry");
            return Ok(Vec::new());
        };
        let calories = self.entries(kind)[index].calories;
        let total = match kind {
            EntryKind::Meal => self.total_calories.checked_sub(calories),
            EntryKind::Workout => self.total_calories.checked_add(calories),
        }
        .ok_or_else(|| overflow(kind))?;

        self.storage.update_total_calories(total)?;
        let removed = match kind {
            EntryKind::Meal => self.storage.remove_meal(id),
            EntryKind::Workout => self.storage.remove_workout(id),
        };
        if let Err(err) = removed {
            if let Err(restore_err) = self.storage.update_total_calories(self.total_calories) {
                warn!(%id, "failed to restore total after {} removal error: {restore_err}", kind.as_str());
            }
            return Err(err.into());
        }

        debug!(kind = kind.as_str(), %id, calories, total, "entry removed");
        self.total_calories = total;
        self.entries_mut(kind).remove(index);

        Ok(vec![
            self.summary_event(),
            TrackerEvent::EntryRemoved { kind, id: id.clone() },
        ])
    }

    fn validate(&self, kind: EntryKind, entry: &Entry) -> Result<(), TrackerError> {
        if entry.name.trim().is_empty() {
            return Err(TrackerError::InvalidEntry(format!("{} name must not be empty", kind.as_str())));
        }
        if !(0..=MAX_CALORIES).contains(&entry.calories) {
            return Err(TrackerError::InvalidEntry(format!(
                "{} calories must be within 0..={MAX_CALORIES}, got {}",
                kind.as_str(),
                entry.calories
            )));
        }
        if self.entries(kind).iter().any(|existing| existing.id == entry.id) {
            return Err(TrackerError::InvalidEntry(format!("duplicate {} id {}", kind.as_str(), entry.id)));
        }
        Ok(())
    }

    fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Meal => &mut self.meals,
            EntryKind::Workout => &mut self.workouts,
        }
    }

    fn summary_event(&self) -> TrackerEvent {
        TrackerEvent::SummaryChanged {
            summary: self.summary(),
        }
    }
}

// Saturating so that records written by hand or by older builds cannot panic a load.
fn sum_calories(entries: &[Entry]) -> i64 {
    entries
        .iter()
        .fold(0i64, |sum, entry| sum.saturating_add(entry.calories))
}

fn net_calories(meals: &[Entry], workouts: &[Entry]) -> i64 {
    sum_calories(meals).saturating_sub(sum_calories(workouts))
}

fn overflow(kind: EntryKind) -> TrackerError {
    TrackerError::InvalidEntry(format!("{} would overflow the running total", kind.as_str()))
}

/// Share of the limit used so far, clamped to `0..=100` for the progress bar.
/// A limit of zero means no limit is set and reports 0%.
pub fn progress_percent(total: i64, limit: i64) -> f64 {
    if limit <= 0 {
        return 0.0;
    }
    (total as f64 / limit as f64 * 100.0).clamp(0.0, 100.0)
}
