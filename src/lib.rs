pub mod app;
pub mod config;
pub mod display;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::{AppConfig, TrackerConfig};
pub use errors::{StorageError, TrackerError};
pub use models::{Entry, EntryId, EntryKind, Summary, TrackerEvent};
pub use state::{AppState, Session};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use tracker::Tracker;
