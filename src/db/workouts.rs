// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout persistence.
//!
//! A workout and its entries are always written together inside one
//! transaction. Dropping an uncommitted `sqlx::Transaction` rolls it back, so
//! every early return via `?` leaves the database untouched.

use super::{Db, StoreError};
use crate::models::{UserId, Workout, WorkoutEntry, WorkoutId};
use chrono::Utc;
use sqlx::{Sqlite, Transaction};

impl Db {
    // ─── Writes ──────────────────────────────────────────────────

    /// Insert a workout and all of its entries atomically.
    ///
    /// Returns the workout with the generated workout and entry ids filled in.
    pub async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        workout.id = sqlx::query_scalar(
            "INSERT INTO workouts (user_id, title, description, duration_minutes, calories_burned, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(workout.user_id)
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        insert_entries(&mut tx, workout.id, &mut workout.entries).await?;
        tx.commit().await?;

        tracing::debug!(
            workout_id = workout.id,
            user_id = workout.user_id,
            entries = workout.entries.len(),
            "Workout created"
        );
        Ok(workout)
    }

    /// Replace a workout's scalar fields and its complete entry list.
    ///
    /// Existing entries are deleted and `workout.entries` inserted in their
    /// place; entry ids are written back into `workout`. The owner is never
    /// changed.
    pub async fn update_workout(&self, workout: &mut Workout) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE workouts
             SET title = ?, description = ?, duration_minutes = ?, calories_burned = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(Utc::now())
        .bind(workout.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        let cleared = sqlx::query("DELETE FROM workout_entries WHERE workout_id = ?")
            .bind(workout.id)
            .execute(&mut *tx)
            .await?;

        insert_entries(&mut tx, workout.id, &mut workout.entries).await?;
        tx.commit().await?;

        tracing::debug!(
            workout_id = workout.id,
            removed_entries = cleared.rows_affected(),
            entries = workout.entries.len(),
            "Workout updated"
        );
        Ok(())
    }

    /// Delete a workout. Its entries go with it (`ON DELETE CASCADE`).
    pub async fn delete_workout(&self, id: WorkoutId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(workout_id = id, "Workout deleted");
        Ok(())
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Get a workout with its entries sorted by `order_index`.
    ///
    /// `Ok(None)` means no such workout.
    pub async fn get_workout_by_id(&self, id: WorkoutId) -> Result<Option<Workout>, StoreError> {
        // One read transaction so the workout and its entries come from the same snapshot.
        let mut tx = self.pool.begin().await?;

        let workout: Option<Workout> = sqlx::query_as(
            "SELECT id, user_id, title, description, duration_minutes, calories_burned
             FROM workouts
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut workout) = workout else {
            return Ok(None);
        };

        workout.entries = sqlx::query_as(
            "SELECT id, workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index
             FROM workout_entries
             WHERE workout_id = ?
             ORDER BY order_index ASC, id ASC",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(workout))
    }

    /// Owner of a workout, for authorization checks.
    pub async fn get_workout_owner(&self, id: WorkoutId) -> Result<UserId, StoreError> {
        sqlx::query_scalar("SELECT user_id FROM workouts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

/// Insert entries in the order given, recording each generated id.
async fn insert_entries(
    tx: &mut Transaction<'_, Sqlite>,
    workout_id: WorkoutId,
    entries: &mut [WorkoutEntry],
) -> Result<(), StoreError> {
    for entry in entries.iter_mut() {
        entry.id = sqlx::query_scalar(
            "INSERT INTO workout_entries (workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(workout_id)
        .bind(&entry.exercise_name)
        .bind(entry.sets)
        .bind(entry.reps)
        .bind(entry.duration_seconds)
        .bind(entry.weight)
        .bind(&entry.notes)
        .bind(entry.order_index)
        .fetch_one(&mut **tx)
        .await?;
        entry.workout_id = workout_id;
    }
    Ok(())
}
