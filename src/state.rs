use crate::config::TrackerConfig;
use crate::display::DisplayBoard;
use crate::errors::TrackerError;
use crate::models::{TrackerEvent, TrackerView};
use crate::storage::JsonFileStorage;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The tracker together with the board that mirrors it for the page.
pub struct Session {
    pub tracker: Tracker<JsonFileStorage>,
    pub board: DisplayBoard,
}

impl Session {
    pub fn load(storage: JsonFileStorage, config: TrackerConfig) -> Result<Self, TrackerError> {
        let (tracker, events) = Tracker::load(storage, config)?;
        let mut board = DisplayBoard::new();
        board.apply_all(&events);
        board.apply_all(&tracker.load_items());
        Ok(Self { tracker, board })
    }

    pub fn publish(&mut self, events: &[TrackerEvent]) {
        self.board.apply_all(events);
    }

    pub fn view(&self) -> TrackerView {
        TrackerView {
            summary: self.tracker.summary(),
            meals: self.tracker.meals().to_vec(),
            workouts: self.tracker.workouts().to_vec(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}
