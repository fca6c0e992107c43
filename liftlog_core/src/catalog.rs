//! Built-in catalog of exercises and workout templates.
//!
//! The catalog is the read-only side of the system: workouts are
//! templates users attempt, exercises carry their scoring strategy.

use crate::store::{Filter, RecordStore};
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use uuid::Uuid;

/// The complete catalog of exercises and workout templates
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<Uuid, Exercise>,
    pub workouts: HashMap<Uuid, Workout>,
    pub slots: Vec<WorkoutExercise>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of exercises and workouts
///
/// **Note**: For production use, prefer `get_default_catalog()` which
/// returns a cached reference. This function is retained for testing and
/// custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(name: &str, strategy: Option<ScoringStrategy>, demo_url: Option<&str>) -> Exercise {
    Exercise {
        id: Some(Uuid::new_v4()),
        name: name.into(),
        strategy,
        demo_url: demo_url.map(Into::into),
    }
}

struct SlotSpec {
    exercise_id: Uuid,
    target_sets: u32,
    target_weight: Option<f64>,
    target_reps: Option<u32>,
    target_distance: Option<f64>,
    target_calories: Option<f64>,
}

fn slots_for(workout_id: Uuid, specs: Vec<SlotSpec>) -> Vec<WorkoutExercise> {
    specs
        .into_iter()
        .enumerate()
        .map(|(position, spec)| WorkoutExercise {
            id: Some(Uuid::new_v4()),
            workout_id,
            exercise_id: spec.exercise_id,
            position: position as u32,
            target_sets: spec.target_sets,
            target_weight: spec.target_weight,
            target_reps: spec.target_reps,
            target_distance: spec.target_distance,
            target_time_seconds: None,
            target_calories: spec.target_calories,
        })
        .collect()
}

fn build_default_catalog_internal() -> Catalog {
    let mut exercises = HashMap::new();
    let mut workouts = HashMap::new();
    let mut slots = Vec::new();

    // ========================================================================
    // Exercises
    // ========================================================================

    let back_squat = exercise(
        "Back Squat",
        Some(ScoringStrategy::WeightReps),
        Some("https://www.youtube.com/watch?v=ultWZbUMPL8"),
    );
    let bench_press = exercise(
        "Bench Press",
        Some(ScoringStrategy::WeightReps),
        Some("https://www.youtube.com/watch?v=rT7DgCr-3pg"),
    );
    let deadlift = exercise(
        "Deadlift",
        Some(ScoringStrategy::WeightReps),
        Some("https://www.youtube.com/watch?v=op9kVnSso6Q"),
    );
    let run = exercise(
        "Run",
        Some(ScoringStrategy::DistanceBased),
        None,
    );
    let assault_bike = exercise(
        "Assault Bike",
        Some(ScoringStrategy::CalorieBased),
        None,
    );
    // Deliberately undeclared: resolved through the workout-kind fallback
    let farmer_carry = exercise("Farmer Carry", None, None);

    // ========================================================================
    // Workout Templates
    // ========================================================================

    let heavy_triples_id = Uuid::new_v4();
    workouts.insert(
        heavy_triples_id,
        Workout {
            id: Some(heavy_triples_id),
            name: "Heavy Triples".into(),
            kind: WorkoutKind::WeightTraining,
            description: Some("Squat, bench, and deadlift triples at working weight".into()),
        },
    );
    slots.extend(slots_for(
        heavy_triples_id,
        vec![
            SlotSpec {
                exercise_id: back_squat.id.unwrap_or_default(),
                target_sets: 3,
                target_weight: Some(100.0),
                target_reps: Some(3),
                target_distance: None,
                target_calories: None,
            },
            SlotSpec {
                exercise_id: bench_press.id.unwrap_or_default(),
                target_sets: 3,
                target_weight: Some(80.0),
                target_reps: Some(3),
                target_distance: None,
                target_calories: None,
            },
            SlotSpec {
                exercise_id: deadlift.id.unwrap_or_default(),
                target_sets: 3,
                target_weight: Some(120.0),
                target_reps: Some(3),
                target_distance: None,
                target_calories: None,
            },
        ],
    ));

    let engine_builder_id = Uuid::new_v4();
    workouts.insert(
        engine_builder_id,
        Workout {
            id: Some(engine_builder_id),
            name: "Engine Builder".into(),
            kind: WorkoutKind::Conditioning,
            description: Some("Run intervals plus assault bike calorie sprints".into()),
        },
    );
    slots.extend(slots_for(
        engine_builder_id,
        vec![
            SlotSpec {
                exercise_id: run.id.unwrap_or_default(),
                target_sets: 4,
                target_weight: None,
                target_reps: None,
                target_distance: Some(400.0),
                target_calories: None,
            },
            SlotSpec {
                exercise_id: assault_bike.id.unwrap_or_default(),
                target_sets: 4,
                target_weight: None,
                target_reps: None,
                target_distance: None,
                target_calories: Some(15.0),
            },
        ],
    ));

    let odd_object_id = Uuid::new_v4();
    workouts.insert(
        odd_object_id,
        Workout {
            id: Some(odd_object_id),
            name: "Odd Object Day".into(),
            kind: WorkoutKind::Mixed,
            description: Some("Carries and a short run to finish".into()),
        },
    );
    slots.extend(slots_for(
        odd_object_id,
        vec![
            SlotSpec {
                exercise_id: farmer_carry.id.unwrap_or_default(),
                target_sets: 5,
                target_weight: Some(32.0),
                target_reps: Some(1),
                target_distance: None,
                target_calories: None,
            },
            SlotSpec {
                exercise_id: run.id.unwrap_or_default(),
                target_sets: 1,
                target_weight: None,
                target_reps: None,
                target_distance: Some(800.0),
                target_calories: None,
            },
        ],
    ));

    for ex in [back_squat, bench_press, deadlift, run, assault_bike, farmer_carry] {
        if let Some(id) = ex.id {
            exercises.insert(id, ex);
        }
    }

    Catalog {
        exercises,
        workouts,
        slots,
    }
}

impl Catalog {
    /// Validate catalog integrity, returning human-readable problems
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, ex) in &self.exercises {
            if ex.name.is_empty() {
                errors.push(format!("Exercise {} has empty name", id));
            }
            if ex.id != Some(*id) {
                errors.push(format!("Exercise key {} doesn't match exercise.id", id));
            }
        }

        for (id, workout) in &self.workouts {
            if workout.name.is_empty() {
                errors.push(format!("Workout {} has empty name", id));
            }
            if workout.id != Some(*id) {
                errors.push(format!("Workout key {} doesn't match workout.id", id));
            }

            let mut positions: Vec<u32> = self
                .slots
                .iter()
                .filter(|s| s.workout_id == *id)
                .map(|s| s.position)
                .collect();
            positions.sort_unstable();

            if positions.is_empty() {
                errors.push(format!("Workout '{}' has no exercise slots", workout.name));
            }
            for (expected, actual) in positions.iter().enumerate() {
                if *actual != expected as u32 {
                    errors.push(format!(
                        "Workout '{}' has a gap in slot positions (expected {}, found {})",
                        workout.name, expected, actual
                    ));
                    break;
                }
            }
        }

        for slot in &self.slots {
            if !self.workouts.contains_key(&slot.workout_id) {
                errors.push(format!(
                    "Slot references non-existent workout {}",
                    slot.workout_id
                ));
            }
            if !self.exercises.contains_key(&slot.exercise_id) {
                errors.push(format!(
                    "Slot references non-existent exercise {}",
                    slot.exercise_id
                ));
            }
            if slot.target_sets == 0 {
                errors.push(format!(
                    "Slot for workout {} has zero target sets",
                    slot.workout_id
                ));
            }
        }

        errors
    }

    /// Find a workout by its display name
    pub fn workout_by_name(&self, name: &str) -> Option<&Workout> {
        self.workouts.values().find(|w| w.name == name)
    }

    /// Resolve a workout into an ordered plan, in memory
    pub fn plan(&self, workout_id: Uuid) -> Result<WorkoutPlan> {
        let workout = self
            .workouts
            .get(&workout_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("workout {}", workout_id)))?;

        let mut entries: Vec<WorkoutExercise> = self
            .slots
            .iter()
            .filter(|s| s.workout_id == workout_id)
            .cloned()
            .collect();
        entries.sort_by_key(|s| s.position);

        let slots = entries
            .into_iter()
            .map(|entry| {
                let exercise = self
                    .exercises
                    .get(&entry.exercise_id)
                    .cloned()
                    .ok_or_else(|| {
                        Error::CatalogValidation(format!(
                            "slot references unknown exercise {}",
                            entry.exercise_id
                        ))
                    })?;
                Ok(PlanSlot { entry, exercise })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WorkoutPlan { workout, slots })
    }
}

/// Write the catalog into the store if it has not been seeded yet
///
/// Returns the number of rows written (0 when the exercises table is
/// already populated).
pub fn seed<S: RecordStore>(store: &S, catalog: &Catalog) -> Result<usize> {
    let existing: Vec<Exercise> = store.select(&Filter::all(), None, Some(1))?;
    if !existing.is_empty() {
        tracing::debug!("Catalog already seeded, leaving store untouched");
        return Ok(0);
    }

    let exercises: Vec<Exercise> = catalog.exercises.values().cloned().collect();
    let workouts: Vec<Workout> = catalog.workouts.values().cloned().collect();
    let slots: Vec<WorkoutExercise> = catalog.slots.clone();

    let mut written = 0;
    written += store.insert(exercises)?.len();
    written += store.insert(workouts)?.len();
    written += store.insert(slots)?.len();

    tracing::info!("Seeded catalog: {} rows", written);
    Ok(written)
}

/// Resolve a workout and its ordered slots from the store
pub fn load_workout_plan<S: RecordStore>(store: &S, workout_id: Uuid) -> Result<WorkoutPlan> {
    let mut workouts: Vec<Workout> =
        store.select(&Filter::all().eq("id", workout_id), None, Some(1))?;
    let workout = workouts
        .pop()
        .ok_or_else(|| Error::NotFound(format!("workout {}", workout_id)))?;

    let mut entries: Vec<WorkoutExercise> =
        store.select(&Filter::all().eq("workout_id", workout_id), None, None)?;
    entries.sort_by_key(|s| s.position);

    let exercises: Vec<Exercise> = store.select(&Filter::all(), None, None)?;
    let by_id: HashMap<Uuid, Exercise> = exercises
        .into_iter()
        .filter_map(|ex| ex.id.map(|id| (id, ex)))
        .collect();

    let slots = entries
        .into_iter()
        .map(|entry| {
            let exercise = by_id.get(&entry.exercise_id).cloned().ok_or_else(|| {
                Error::CatalogValidation(format!(
                    "slot references unknown exercise {}",
                    entry.exercise_id
                ))
            })?;
            Ok(PlanSlot { entry, exercise })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WorkoutPlan { workout, slots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonstore::JsonStore;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.exercises.len(), 6);
        assert_eq!(catalog.workouts.len(), 3);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_all_slots_reference_real_exercises() {
        let catalog = build_default_catalog();
        for slot in &catalog.slots {
            assert!(
                catalog.exercises.contains_key(&slot.exercise_id),
                "Exercise {} referenced but not found",
                slot.exercise_id
            );
        }
    }

    #[test]
    fn test_plan_orders_slots_by_position() {
        let catalog = build_default_catalog();
        let workout = catalog.workout_by_name("Heavy Triples").unwrap();
        let plan = catalog.plan(workout.id.unwrap()).unwrap();

        assert_eq!(plan.slots.len(), 3);
        for (idx, slot) in plan.slots.iter().enumerate() {
            assert_eq!(slot.entry.position, idx as u32);
        }
        assert_eq!(plan.slots[0].exercise.name, "Back Squat");
    }

    #[test]
    fn test_seed_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(temp_dir.path()).unwrap();
        let catalog = build_default_catalog();

        let first = seed(&store, &catalog).unwrap();
        assert!(first > 0);

        let second = seed(&store, &catalog).unwrap();
        assert_eq!(second, 0);
    }

    #[test]
    fn test_load_workout_plan_from_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(temp_dir.path()).unwrap();
        let catalog = build_default_catalog();
        seed(&store, &catalog).unwrap();

        let workout = catalog.workout_by_name("Engine Builder").unwrap();
        let plan = load_workout_plan(&store, workout.id.unwrap()).unwrap();

        assert_eq!(plan.workout.name, "Engine Builder");
        assert_eq!(plan.slots.len(), 2);
        assert_eq!(plan.slots[0].exercise.name, "Run");
        assert_eq!(plan.slots[1].exercise.name, "Assault Bike");
    }

    #[test]
    fn test_load_missing_workout_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(temp_dir.path()).unwrap();

        let result = load_workout_plan(&store, Uuid::new_v4());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
