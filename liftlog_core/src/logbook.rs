//! Workout log creation and reconciliation.
//!
//! Two entry points share the scoring logic: `log_workout` persists a new
//! attempt, `update_workout_log` diffs the edited sets against the rows
//! already stored and issues delete-then-upsert so the persisted set ends
//! up exactly matching the edit. The multi-step update is not atomic; a
//! failure partway leaves the earlier steps applied, and a retry with the
//! same sets converges to the same end state.

use crate::scoring::compute_score;
use crate::session::Session;
use crate::store::{Filter, RecordStore};
use crate::types::{ExerciseLog, ExerciseScore, WorkoutLog, WorkoutPlan};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Stateful handle for logging and editing workout attempts
///
/// `logging` is true only while an entry point is running and is reset on
/// every exit path, success or failure.
pub struct WorkoutLogger<'a, S: RecordStore> {
    store: &'a S,
    session: &'a Session,
    logging: bool,
}

impl<'a, S: RecordStore> WorkoutLogger<'a, S> {
    pub fn new(store: &'a S, session: &'a Session) -> Self {
        Self {
            store,
            session,
            logging: false,
        }
    }

    /// True while a log or update operation is in flight
    pub fn is_logging(&self) -> bool {
        self.logging
    }

    /// Persist a new workout attempt
    ///
    /// Computes the score, inserts the workout log row, then inserts one
    /// exercise score row per logged set. If the second insert fails the
    /// workout log row is not rolled back.
    pub fn log_workout(
        &mut self,
        plan: &WorkoutPlan,
        logs: &[ExerciseLog],
        notes: &str,
    ) -> Result<WorkoutLog> {
        self.logging = true;
        let result = self.create_inner(plan, logs, notes);
        self.logging = false;

        if let Err(ref e) = result {
            tracing::error!("Failed to log workout: {}", e);
        }
        result
    }

    /// Reconcile an existing workout log against an edited set list
    ///
    /// After this returns Ok, the persisted exercise score rows for the
    /// log are exactly those implied by `logs` - no orphans, no
    /// duplicates.
    pub fn update_workout_log(
        &mut self,
        log_id: Uuid,
        plan: &WorkoutPlan,
        logs: &[ExerciseLog],
        notes: &str,
    ) -> Result<WorkoutLog> {
        self.logging = true;
        let result = self.update_inner(log_id, plan, logs, notes);
        self.logging = false;

        if let Err(ref e) = result {
            tracing::error!("Failed to update workout log {}: {}", log_id, e);
        }
        result
    }

    fn create_inner(
        &mut self,
        plan: &WorkoutPlan,
        logs: &[ExerciseLog],
        notes: &str,
    ) -> Result<WorkoutLog> {
        let user_id = self.session.require_user()?;
        let workout_id = plan
            .workout
            .id
            .ok_or_else(|| Error::Validation("workout has no identifier".into()))?;

        let score = compute_score(logs, plan);

        let mut inserted = self.store.insert(vec![WorkoutLog {
            id: None,
            user_id,
            workout_id,
            notes: notes.to_string(),
            completed_at: Utc::now(),
            score,
            total: score,
        }])?;
        let log = inserted
            .pop()
            .ok_or_else(|| Error::Store("workout log insert returned no row".into()))?;
        let log_id = log
            .id
            .ok_or_else(|| Error::Store("workout log insert assigned no id".into()))?;

        let rows = score_rows(user_id, log_id, logs);
        if !rows.is_empty() {
            self.store.insert(rows)?;
        }

        tracing::info!("Logged workout {} with score {}", log_id, score);
        Ok(log)
    }

    fn update_inner(
        &mut self,
        log_id: Uuid,
        plan: &WorkoutPlan,
        logs: &[ExerciseLog],
        notes: &str,
    ) -> Result<WorkoutLog> {
        let user_id = self.session.require_user()?;

        let score = compute_score(logs, plan);

        // Scoped by log id AND owning user: another user's log is
        // indistinguishable from a missing one.
        let scope = Filter::all().eq("id", log_id).eq("user_id", user_id);
        let mut found: Vec<WorkoutLog> = self.store.select(&scope, None, Some(1))?;
        let mut log = found
            .pop()
            .ok_or_else(|| Error::NotFound(format!("workout log {}", log_id)))?;

        log.notes = notes.to_string();
        log.score = score;
        log.total = score;
        log.completed_at = Utc::now();
        let log = self.store.update(&log, &scope)?;

        let existing: Vec<ExerciseScore> =
            self.store
                .select(&Filter::all().eq("workout_log_id", log_id), None, None)?;
        let existing_ids: HashSet<Uuid> = existing.iter().filter_map(|r| r.id).collect();

        let desired = score_rows(user_id, log_id, logs);
        let kept_ids: HashSet<Uuid> = desired.iter().filter_map(|r| r.id).collect();

        // Delete before upsert: rows dropped from the edit must go away
        // first, then the full desired set lands in one batch.
        let doomed: Vec<Uuid> = existing_ids.difference(&kept_ids).copied().collect();
        if !doomed.is_empty() {
            self.store
                .delete::<ExerciseScore>(&Filter::all().is_in("id", doomed))?;
        }

        if !desired.is_empty() {
            self.store.upsert(desired)?;
        }

        tracing::info!("Updated workout log {} with score {}", log_id, score);
        Ok(log)
    }
}

/// Flatten exercise logs into persistable score rows
///
/// Sets that already carry an identifier keep it (update-in-place
/// targets); id-less sets become new rows.
fn score_rows(user_id: Uuid, log_id: Uuid, logs: &[ExerciseLog]) -> Vec<ExerciseScore> {
    logs.iter()
        .flat_map(|log| {
            let exercise_id = log.exercise_id;
            log.sets.iter().map(move |set| ExerciseScore {
                id: set.id,
                user_id,
                workout_log_id: log_id,
                exercise_id,
                weight: set.weight,
                reps: set.reps,
                distance: set.distance,
                time_seconds: set.time_seconds,
                calories: set.calories,
            })
        })
        .collect()
}
