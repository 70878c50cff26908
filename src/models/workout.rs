// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout model for storage and API.

use crate::models::UserId;
use serde::Serialize;

pub type WorkoutId = i64;

/// Workout row plus its ordered entries.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Workout {
    /// Generated on insert; ignored when creating
    pub id: WorkoutId,
    /// Owner, fixed at creation
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    /// Sorted by `order_index` when read back
    #[sqlx(skip)]
    pub entries: Vec<WorkoutEntry>,
}

/// One exercise inside a workout. Only ever written through its parent workout.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct WorkoutEntry {
    pub id: i64,
    #[serde(skip)]
    pub workout_id: WorkoutId,
    pub exercise_name: String,
    pub sets: i32,
    /// Present for rep-based exercises
    pub reps: Option<i32>,
    /// Present for time-based exercises
    pub duration_seconds: Option<i32>,
    pub weight: Option<f64>,
    pub notes: String,
    /// Caller-supplied position; stored verbatim, not required to be unique
    pub order_index: i32,
}
