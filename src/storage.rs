use crate::errors::StorageError;
use crate::models::{Entry, EntryId};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error};

/// Durable key-value persistence consumed by the tracker.
///
/// Reads take a default where a record may be absent. `clear_all` drops the
/// running total and both entry lists but keeps the calorie limit.
pub trait Storage {
    fn get_calorie_limit(&self, default: i64) -> Result<i64, StorageError>;
    fn set_calorie_limit(&mut self, limit: i64) -> Result<(), StorageError>;
    fn get_total_calories(&self, default: i64) -> Result<i64, StorageError>;
    fn update_total_calories(&mut self, total: i64) -> Result<(), StorageError>;
    fn get_meals(&self) -> Result<Vec<Entry>, StorageError>;
    fn save_meal(&mut self, meal: &Entry) -> Result<(), StorageError>;
    fn remove_meal(&mut self, id: &EntryId) -> Result<(), StorageError>;
    fn get_workouts(&self) -> Result<Vec<Entry>, StorageError>;
    fn save_workout(&mut self, workout: &Entry) -> Result<(), StorageError>;
    fn remove_workout(&mut self, id: &EntryId) -> Result<(), StorageError>;
    fn clear_all(&mut self) -> Result<(), StorageError>;
}

/// The persisted records, one field per key.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoredData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorie_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<i64>,
    #[serde(default)]
    pub meals: Vec<Entry>,
    #[serde(default)]
    pub workouts: Vec<Entry>,
}

impl StoredData {
    fn clear(&mut self) {
        self.total_calories = None;
        self.meals.clear();
        self.workouts.clear();
    }
}

/// Keeps every record in a single JSON document on disk.
///
/// Each write serializes the whole document to a sibling temp file and renames
/// it into place; the in-memory copy only changes once that has succeeded.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    data: StoredData,
}

impl JsonFileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load_data(&path);
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, change: impl FnOnce(&mut StoredData)) -> Result<(), StorageError> {
        let mut next = self.data.clone();
        change(&mut next);
        persist_data(&self.path, &next)?;
        self.data = next;
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn get_calorie_limit(&self, default: i64) -> Result<i64, StorageError> {
        Ok(self.data.calorie_limit.unwrap_or(default))
    }

    fn get_total_calories(&self, default: i64) -> Result<i64, StorageError> {
        Ok(self.data.total_calories.unwrap_or(default))
    }

    fn get_meals(&self) -> Result<Vec<Entry>, StorageError> {
        Ok(self.data.meals.clone())
    }

    fn get_workouts(&self) -> Result<Vec<Entry>, StorageError> {
        Ok(self.data.workouts.clone())
    }

    fn set_calorie_limit(&mut self, limit: i64) -> Result<(), StorageError> {
        self.write(|data| data.calorie_limit = Some(limit))
    }

    fn update_total_calories(&mut self, total: i64) -> Result<(), StorageError> {
        self.write(|data| data.total_calories = Some(total))
    }

    fn save_meal(&mut self, meal: &Entry) -> Result<(), StorageError> {
        self.write(|data| data.meals.push(meal.clone()))
    }

    fn remove_meal(&mut self, id: &EntryId) -> Result<(), StorageError> {
        self.write(|data| data.meals.retain(|meal| &meal.id != id))
    }

    fn save_workout(&mut self, workout: &Entry) -> Result<(), StorageError> {
        self.write(|data| data.workouts.push(workout.clone()))
    }

    fn remove_workout(&mut self, id: &EntryId) -> Result<(), StorageError> {
        self.write(|data| data.workouts.retain(|workout| &workout.id != id))
    }

    fn clear_all(&mut self) -> Result<(), StorageError> {
        self.write(StoredData::clear)
    }
}

pub fn load_data(path: &Path) -> StoredData {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file {}: {err}", path.display());
                StoredData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredData::default(),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            StoredData::default()
        }
    }
}

pub fn persist_data(path: &Path, data: &StoredData) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "persisted tracker data");
    Ok(())
}

/// Storage operations that write, used to inject failures into [`MemoryStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    SetCalorieLimit,
    UpdateTotalCalories,
    SaveMeal,
    RemoveMeal,
    SaveWorkout,
    RemoveWorkout,
    ClearAll,
}

/// Volatile storage for tests and embedding. Writes can be made to fail on demand,
/// either all of them or only selected operations.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: StoredData,
    fail_writes: bool,
    failing_ops: Vec<WriteOp>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoredData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn data(&self) -> &StoredData {
        &self.data
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
        if !fail {
            self.failing_ops.clear();
        }
    }

    /// Makes every later `op` fail while other writes keep succeeding.
    pub fn fail_on(&mut self, op: WriteOp) {
        if !self.failing_ops.contains(&op) {
            self.failing_ops.push(op);
        }
    }

    fn write(&mut self, op: WriteOp, change: impl FnOnce(&mut StoredData)) -> Result<(), StorageError> {
        if self.fail_writes || self.failing_ops.contains(&op) {
            return Err(StorageError::Unavailable(format!("{op:?} disabled")));
        }
        change(&mut self.data);
        self.writes += 1;
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn get_calorie_limit(&self, default: i64) -> Result<i64, StorageError> {
        Ok(self.data.calorie_limit.unwrap_or(default))
    }

    fn get_total_calories(&self, default: i64) -> Result<i64, StorageError> {
        Ok(self.data.total_calories.unwrap_or(default))
    }

    fn get_meals(&self) -> Result<Vec<Entry>, StorageError> {
        Ok(self.data.meals.clone())
    }

    fn get_workouts(&self) -> Result<Vec<Entry>, StorageError> {
        Ok(self.data.workouts.clone())
    }

    fn set_calorie_limit(&mut self, limit: i64) -> Result<(), StorageError> {
        self.write(WriteOp::SetCalorieLimit, |data| data.calorie_limit = Some(limit))
    }

    fn update_total_calories(&mut self, total: i64) -> Result<(), StorageError> {
        self.write(WriteOp::UpdateTotalCalories, |data| data.total_calories = Some(total))
    }

    fn save_meal(&mut self, meal: &Entry) -> Result<(), StorageError> {
        self.write(WriteOp::SaveMeal, |data| data.meals.push(meal.clone()))
    }

    fn remove_meal(&mut self, id: &EntryId) -> Result<(), StorageError> {
        self.write(WriteOp::RemoveMeal, |data| data.meals.retain(|meal| &meal.id != id))
    }

    fn save_workout(&mut self, workout: &Entry) -> Result<(), StorageError> {
        self.write(WriteOp::SaveWorkout, |data| data.workouts.push(workout.clone()))
    }

    fn remove_workout(&mut self, id: &EntryId) -> Result<(), StorageError> {
        self.write(WriteOp::RemoveWorkout, |data| {
            data.workouts.retain(|workout| &workout.id != id)
        })
    }

    fn clear_all(&mut self) -> Result<(), StorageError> {
        self.write(WriteOp::ClearAll, StoredData::clear)
    }
}
