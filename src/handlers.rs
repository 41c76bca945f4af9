use crate::errors::{AppError, TrackerError};
use crate::models::{
    Entry, EntryId, EntryKind, FilterQuery, LimitRequest, NewEntryRequest, TrackerEvent,
    TrackerView, UpdateResponse,
};
use crate::state::{AppState, Session};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Local;
use std::sync::Arc;
use tracing::info;

pub async fn index(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_index(&today_string(), &session.board, filter.q.as_deref()))
}

pub async fn get_tracker(State(state): State<AppState>) -> Json<TrackerView> {
    let session = state.session.lock().await;
    Json(session.view())
}

pub async fn list_meals(State(state): State<AppState>, Query(filter): Query<FilterQuery>) -> Json<Vec<Entry>> {
    list_entries(&state, EntryKind::Meal, filter).await
}

pub async fn list_workouts(
    State(state): State<AppState>,
    Query(filter): Query<FilterQuery>,
) -> Json<Vec<Entry>> {
    list_entries(&state, EntryKind::Workout, filter).await
}

pub async fn add_meal(
    State(state): State<AppState>,
    Json(payload): Json<NewEntryRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = apply_add(&state, EntryKind::Meal, payload).await?;
    Ok(Json(response))
}

pub async fn add_workout(
    State(state): State<AppState>,
    Json(payload): Json<NewEntryRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = apply_add(&state, EntryKind::Workout, payload).await?;
    Ok(Json(response))
}

pub async fn remove_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = EntryId::from(id);
    let response = apply(&state, move |session| session.tracker.remove_meal(&id)).await?;
    Ok(Json(response))
}

pub async fn remove_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = EntryId::from(id);
    let response = apply(&state, move |session| session.tracker.remove_workout(&id)).await?;
    Ok(Json(response))
}

pub async fn set_limit(
    State(state): State<AppState>,
    Json(payload): Json<LimitRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    let response = apply(&state, move |session| session.tracker.set_limit(payload.limit)).await?;
    Ok(Json(response))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<UpdateResponse>, AppError> {
    let response = apply(&state, |session| session.tracker.reset()).await?;
    Ok(Json(response))
}

pub async fn meal_form(
    State(state): State<AppState>,
    Form(payload): Form<NewEntryRequest>,
) -> Result<Redirect, AppError> {
    apply_add(&state, EntryKind::Meal, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn workout_form(
    State(state): State<AppState>,
    Form(payload): Form<NewEntryRequest>,
) -> Result<Redirect, AppError> {
    apply_add(&state, EntryKind::Workout, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn limit_form(
    State(state): State<AppState>,
    Form(payload): Form<LimitRequest>,
) -> Result<Redirect, AppError> {
    apply(&state, move |session| session.tracker.set_limit(payload.limit)).await?;
    Ok(Redirect::to("/"))
}

pub async fn reset_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply(&state, |session| session.tracker.reset()).await?;
    Ok(Redirect::to("/"))
}

async fn list_entries(state: &AppState, kind: EntryKind, filter: FilterQuery) -> Json<Vec<Entry>> {
    let session = state.session.lock().await;
    let query = filter.q.unwrap_or_default();
    let entries = session
        .tracker
        .filter(kind, &query)
        .into_iter()
        .cloned()
        .collect();
    Json(entries)
}

async fn apply_add(
    state: &AppState,
    kind: EntryKind,
    payload: NewEntryRequest,
) -> Result<UpdateResponse, AppError> {
    let entry = Entry::new(payload.name.trim(), payload.calories);
    info!(kind = kind.as_str(), name = %entry.name, calories = entry.calories, "adding entry");
    apply(state, move |session| match kind {
        EntryKind::Meal => session.tracker.add_meal(entry),
        EntryKind::Workout => session.tracker.add_workout(entry),
    })
    .await
}

/// Runs one tracker operation under the session lock and forwards its events
/// to the display board before answering.
///
/// Storage is synchronous file I/O, so the operation runs on the blocking pool.
async fn apply<F>(state: &AppState, op: F) -> Result<UpdateResponse, AppError>
where
    F: FnOnce(&mut Session) -> Result<Vec<TrackerEvent>, TrackerError> + Send + 'static,
{
    let session = Arc::clone(&state.session);
    tokio::task::spawn_blocking(move || -> Result<UpdateResponse, AppError> {
        let mut session = session.blocking_lock();
        let events = op(&mut *session)?;
        session.publish(&events);

        Ok(UpdateResponse {
            view: session.view(),
            events,
        })
    })
    .await
    .map_err(AppError::internal)?
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}
