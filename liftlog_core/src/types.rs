//! Core domain types for the Liftlog system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their scoring strategies
//! - Workout templates and their exercise slots
//! - Logged sets and persisted score rows
//! - Workout log attempts, profiles, and board messages

use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Types
// ============================================================================

/// How a set contributes to a workout score
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Sum of distance across sets
    DistanceBased,
    /// Sum of calories across sets
    CalorieBased,
    /// Sum of weight x reps across sets
    WeightReps,
}

/// Broad classification of a workout template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    WeightTraining,
    Conditioning,
    Mixed,
}

/// A catalog exercise (e.g., "Back Squat")
///
/// The scoring strategy is declared here, at data-definition time. Rows
/// without one fall back to name matching and then to the workout kind
/// when scored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Option<Uuid>,
    pub name: String,
    pub strategy: Option<ScoringStrategy>,
    pub demo_url: Option<String>,
}

/// A reusable workout template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workout {
    pub id: Option<Uuid>,
    pub name: String,
    pub kind: WorkoutKind,
    pub description: Option<String>,
}

/// One exercise slot within a workout template
///
/// Targets are defaults for "as planned" logging; all of them are
/// optional because not every metric applies to every exercise.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: Option<Uuid>,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub position: u32,
    pub target_sets: u32,
    pub target_weight: Option<f64>,
    pub target_reps: Option<u32>,
    pub target_distance: Option<f64>,
    pub target_time_seconds: Option<u32>,
    pub target_calories: Option<f64>,
}

/// A workout template resolved against its catalog exercises
///
/// Slot order is the scoring order: the nth logged exercise pairs with
/// the nth slot.
#[derive(Clone, Debug)]
pub struct WorkoutPlan {
    pub workout: Workout,
    pub slots: Vec<PlanSlot>,
}

/// One resolved slot of a [`WorkoutPlan`]
#[derive(Clone, Debug)]
pub struct PlanSlot {
    pub entry: WorkoutExercise,
    pub exercise: Exercise,
}

// ============================================================================
// Logging Types
// ============================================================================

/// One performed set
///
/// An absent `id` means the set has not been persisted yet; the store
/// assigns one on insert. Absent numeric fields count as zero when
/// scoring.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoggedSet {
    pub id: Option<Uuid>,
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub distance: Option<f64>,
    pub time_seconds: Option<u32>,
    pub calories: Option<f64>,
}

impl LoggedSet {
    /// Build a set from a slot's default targets
    pub fn from_targets(entry: &WorkoutExercise) -> Self {
        Self {
            id: None,
            weight: entry.target_weight,
            reps: entry.target_reps,
            distance: entry.target_distance,
            time_seconds: entry.target_time_seconds,
            calories: entry.target_calories,
        }
    }
}

/// Sets performed for one exercise within one workout attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub exercise_id: Uuid,
    pub sets: Vec<LoggedSet>,
}

/// A persisted workout attempt
///
/// The computed score is duplicated into `score` and `total` for
/// compatibility with consumers that read either field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub notes: String,
    pub completed_at: DateTime<Utc>,
    pub score: f64,
    pub total: f64,
}

/// One persisted performed set, linked to a workout log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseScore {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub workout_log_id: Uuid,
    pub exercise_id: Uuid,
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub distance: Option<f64>,
    pub time_seconds: Option<u32>,
    pub calories: Option<f64>,
}

impl ExerciseScore {
    /// View the row as a logged set (the reverse of persistence)
    pub fn as_logged_set(&self) -> LoggedSet {
        LoggedSet {
            id: self.id,
            weight: self.weight,
            reps: self.reps,
            distance: self.distance,
            time_seconds: self.time_seconds,
            calories: self.calories,
        }
    }
}

// ============================================================================
// Identity and Board Types
// ============================================================================

/// A user identity row
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Option<Uuid>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// A message-board post
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Record impls (table bindings)
// ============================================================================

impl Record for Exercise {
    const TABLE: &'static str = "exercises";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl Record for Workout {
    const TABLE: &'static str = "workouts";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl Record for WorkoutExercise {
    const TABLE: &'static str = "workout_exercises";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl Record for WorkoutLog {
    const TABLE: &'static str = "workout_logs";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl Record for ExerciseScore {
    const TABLE: &'static str = "exercise_scores";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl Record for Profile {
    const TABLE: &'static str = "profiles";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}

impl Record for Message {
    const TABLE: &'static str = "messages";

    fn id(&self) -> Option<Uuid> {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}
