use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/meal/add", post(handlers::meal_form))
        .route("/workout/add", post(handlers::workout_form))
        .route("/limit", post(handlers::limit_form))
        .route("/reset", post(handlers::reset_form))
        .route("/api/tracker", get(handlers::get_tracker))
        .route("/api/meals", get(handlers::list_meals).post(handlers::add_meal))
        .route("/api/meals/:id", delete(handlers::remove_meal))
        .route("/api/workouts", get(handlers::list_workouts).post(handlers::add_workout))
        .route("/api/workouts/:id", delete(handlers::remove_workout))
        .route("/api/limit", put(handlers::set_limit))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
