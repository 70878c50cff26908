// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout routes. All of them require a logged-in user; update and delete
//! additionally require that user to own the workout.

use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{User, UserId, Workout, WorkoutEntry, WorkoutId};
use crate::routes::envelope::WorkoutEnvelope;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Workout routes. The login gate is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts", post(create_workout))
        .route(
            "/workouts/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

// ─── Request Bodies ──────────────────────────────────────────

/// One exercise entry as sent by the client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_entry_measure"))]
pub struct WorkoutEntryRequest {
    #[validate(length(min = 1, message = "exercise_name cannot be empty"))]
    pub exercise_name: String,
    #[validate(range(min = 1, message = "sets must be at least 1"))]
    pub sets: i32,
    #[validate(range(min = 0, message = "reps cannot be negative"))]
    pub reps: Option<i32>,
    #[validate(range(min = 0, message = "duration_seconds cannot be negative"))]
    pub duration_seconds: Option<i32>,
    #[validate(range(min = 0.0, message = "weight cannot be negative"))]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub order_index: i32,
}

/// An entry is either rep-based or time-based, never both or neither.
fn validate_entry_measure(entry: &WorkoutEntryRequest) -> std::result::Result<(), ValidationError> {
    if entry.reps.is_some() == entry.duration_seconds.is_some() {
        return Err(ValidationError::new("entry_measure")
            .with_message("exactly one of reps or duration_seconds must be set".into()));
    }
    Ok(())
}

impl From<WorkoutEntry> for WorkoutEntryRequest {
    fn from(entry: WorkoutEntry) -> Self {
        Self {
            exercise_name: entry.exercise_name,
            sets: entry.sets,
            reps: entry.reps,
            duration_seconds: entry.duration_seconds,
            weight: entry.weight,
            notes: entry.notes,
            order_index: entry.order_index,
        }
    }
}

/// A complete workout: the body of `POST /workouts`, and the merged result of
/// an update before it is written.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WorkoutPayload {
    #[validate(length(min = 1, message = "title cannot be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0, message = "duration_minutes cannot be negative"))]
    pub duration_minutes: i32,
    #[validate(range(min = 0, message = "calories_burned cannot be negative"))]
    pub calories_burned: i32,
    #[serde(default)]
    #[validate(nested)]
    pub entries: Vec<WorkoutEntryRequest>,
}

impl WorkoutPayload {
    fn into_workout(self, id: WorkoutId, user_id: UserId) -> Workout {
        Workout {
            id,
            user_id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            calories_burned: self.calories_burned,
            entries: self
                .entries
                .into_iter()
                .map(|e| WorkoutEntry {
                    id: 0,
                    workout_id: id,
                    exercise_name: e.exercise_name,
                    sets: e.sets,
                    reps: e.reps,
                    duration_seconds: e.duration_seconds,
                    weight: e.weight,
                    notes: e.notes,
                    order_index: e.order_index,
                })
                .collect(),
        }
    }
}

impl From<Workout> for WorkoutPayload {
    fn from(workout: Workout) -> Self {
        Self {
            title: workout.title,
            description: workout.description,
            duration_minutes: workout.duration_minutes,
            calories_burned: workout.calories_burned,
            entries: workout.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body of `PUT /workouts/{id}`.
///
/// Each field is tri-state: omitted (`None`) keeps the stored value, `null`
/// (`Some(None)`) clears it where that makes sense, and a value replaces it.
/// `entries`, when given, is the complete new entry list.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub calories_burned: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub entries: Option<Option<Vec<WorkoutEntryRequest>>>,
}

/// Marks a field as present, so an explicit `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateWorkoutRequest {
    /// Merge into `current`. `null` is accepted for `description` (cleared to
    /// empty) and `entries` (all removed); other fields cannot be null.
    fn apply_to(self, current: &mut WorkoutPayload) -> Result<()> {
        fn required<T>(field: &str, value: Option<T>) -> Result<T> {
            value.ok_or_else(|| AppError::BadRequest(format!("{} cannot be null", field)))
        }

        if let Some(title) = self.title {
            current.title = required("title", title)?;
        }
        if let Some(description) = self.description {
            current.description = description.unwrap_or_default();
        }
        if let Some(duration) = self.duration_minutes {
            current.duration_minutes = required("duration_minutes", duration)?;
        }
        if let Some(calories) = self.calories_burned {
            current.calories_burned = required("calories_burned", calories)?;
        }
        if let Some(entries) = self.entries {
            current.entries = entries.unwrap_or_default();
        }
        Ok(())
    }
}

// ─── Handlers ────────────────────────────────────────────────

/// Storage error to HTTP error, logging anything other than not-found with context.
fn workout_store_error(
    operation: &'static str,
    workout_id: WorkoutId,
) -> impl FnOnce(StoreError) -> AppError {
    move |err| match err {
        StoreError::NotFound => AppError::NotFound("workout not found".to_string()),
        other => {
            tracing::error!(operation, workout_id, error = %other, "Workout storage failure");
            other.into()
        }
    }
}

/// Fail unless `user` owns the workout.
async fn ensure_owner(state: &AppState, workout_id: WorkoutId, user: &User) -> Result<()> {
    let owner = state
        .db
        .get_workout_owner(workout_id)
        .await
        .map_err(workout_store_error("get_workout_owner", workout_id))?;

    if owner != user.id {
        tracing::warn!(
            workout_id,
            user_id = user.id,
            owner_id = owner,
            "Rejected access to another user's workout"
        );
        return Err(AppError::Forbidden(
            "you are not authorized to modify this workout".to_string(),
        ));
    }
    Ok(())
}

/// Get a workout with its entries.
async fn get_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    path: std::result::Result<Path<WorkoutId>, PathRejection>,
) -> Result<Json<WorkoutEnvelope>> {
    let Path(id) = path?;

    let workout = state
        .db
        .get_workout_by_id(id)
        .await
        .map_err(workout_store_error("get_workout_by_id", id))?
        .ok_or_else(|| AppError::NotFound("workout not found".to_string()))?;

    Ok(Json(WorkoutEnvelope { workout }))
}

/// Create a workout owned by the caller.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<WorkoutPayload>, JsonRejection>,
) -> Result<Json<WorkoutEnvelope>> {
    let Json(payload) = payload?;
    payload.validate()?;

    let workout = state
        .db
        .create_workout(payload.into_workout(0, user.id))
        .await
        .map_err(|err| {
            tracing::error!(operation = "create_workout", user_id = user.id, error = %err, "Workout storage failure");
            AppError::from(err)
        })?;

    tracing::info!(workout_id = workout.id, user_id = user.id, "Workout created");
    Ok(Json(WorkoutEnvelope { workout }))
}

/// Update a workout the caller owns.
async fn update_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    path: std::result::Result<Path<WorkoutId>, PathRejection>,
    payload: std::result::Result<Json<UpdateWorkoutRequest>, JsonRejection>,
) -> Result<Json<WorkoutEnvelope>> {
    let Path(id) = path?;
    let Json(request) = payload?;

    ensure_owner(&state, id, &user).await?;

    let existing = state
        .db
        .get_workout_by_id(id)
        .await
        .map_err(workout_store_error("get_workout_by_id", id))?
        .ok_or_else(|| AppError::NotFound("workout not found".to_string()))?;
    let owner = existing.user_id;

    let mut merged = WorkoutPayload::from(existing);
    request.apply_to(&mut merged)?;
    merged.validate()?;

    let mut workout = merged.into_workout(id, owner);
    state
        .db
        .update_workout(&mut workout)
        .await
        .map_err(workout_store_error("update_workout", id))?;

    tracing::info!(workout_id = id, user_id = user.id, "Workout updated");
    Ok(Json(WorkoutEnvelope { workout }))
}

/// Delete a workout the caller owns.
async fn delete_workout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    path: std::result::Result<Path<WorkoutId>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = path?;

    ensure_owner(&state, id, &user).await?;

    state
        .db
        .delete_workout(id)
        .await
        .map_err(workout_store_error("delete_workout", id))?;

    tracing::info!(workout_id = id, user_id = user.id, "Workout deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(reps: Option<i32>, duration_seconds: Option<i32>) -> WorkoutEntryRequest {
        WorkoutEntryRequest {
            exercise_name: "Plank".to_string(),
            sets: 3,
            reps,
            duration_seconds,
            weight: None,
            notes: String::new(),
            order_index: 1,
        }
    }

    fn payload() -> WorkoutPayload {
        WorkoutPayload {
            title: "Core".to_string(),
            description: "Abs".to_string(),
            duration_minutes: 30,
            calories_burned: 150,
            entries: vec![entry(Some(10), None)],
        }
    }

    #[test]
    fn test_entry_needs_exactly_one_measure() {
        assert!(entry(Some(10), None).validate().is_ok());
        assert!(entry(None, Some(60)).validate().is_ok());
        assert!(entry(Some(10), Some(60)).validate().is_err());
        assert!(entry(None, None).validate().is_err());
    }

    #[test]
    fn test_payload_validation_reaches_entries() {
        assert!(payload().validate().is_ok());

        let mut bad = payload();
        bad.entries[0].sets = 0;
        assert!(bad.validate().is_err());

        let mut bad = payload();
        bad.entries[0].exercise_name.clear();
        assert!(bad.validate().is_err());

        let mut bad = payload();
        bad.calories_burned = -1;
        assert!(bad.validate().is_err());

        let mut long = payload();
        long.title = "x".repeat(500);
        assert!(long.validate().is_ok());

        let mut bad = payload();
        bad.title.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_distinguishes_omitted_from_null() {
        let request: UpdateWorkoutRequest =
            serde_json::from_str(r#"{"title": "Legs", "description": null}"#).unwrap();
        assert_eq!(request.title, Some(Some("Legs".to_string())));
        assert_eq!(request.description, Some(None));
        assert_eq!(request.duration_minutes, None);
        assert!(request.entries.is_none());

        let mut merged = payload();
        request.apply_to(&mut merged).unwrap();
        assert_eq!(merged.title, "Legs");
        assert_eq!(merged.description, "");
        assert_eq!(merged.duration_minutes, 30);
        assert_eq!(merged.entries.len(), 1);
    }

    #[test]
    fn test_update_rejects_null_for_required_fields() {
        let request: UpdateWorkoutRequest = serde_json::from_str(r#"{"title": null}"#).unwrap();
        let err = request.apply_to(&mut payload()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_update_null_entries_clears_them() {
        let request: UpdateWorkoutRequest = serde_json::from_str(r#"{"entries": null}"#).unwrap();
        let mut merged = payload();
        request.apply_to(&mut merged).unwrap();
        assert!(merged.entries.is_empty());
    }
}
