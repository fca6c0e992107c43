//! Activity feed, leaderboards, and personal records.
//!
//! All three are straight-line transformations: fetch rows, join by
//! foreign key in memory, group, pick a maximum, sort.

use crate::scoring::{declared_or_name_strategy, set_contribution};
use crate::store::{Filter, RecordStore};
use crate::types::{Exercise, ExerciseScore, Profile, ScoringStrategy, Workout, WorkoutLog};
use crate::Result;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// One line of the recent-activity feed
#[derive(Clone, Debug)]
pub struct ActivityEntry {
    pub log: WorkoutLog,
    pub athlete: Option<String>,
    pub workout_name: Option<String>,
}

/// One line of a workout leaderboard
#[derive(Clone, Debug)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub athlete: Option<String>,
    pub best: WorkoutLog,
}

/// A personal record for one exercise
#[derive(Clone, Debug)]
pub struct ExerciseRecord {
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub strategy: ScoringStrategy,
    pub best: f64,
    pub sets_counted: usize,
}

fn profile_names<S: RecordStore>(store: &S) -> Result<HashMap<Uuid, String>> {
    let profiles: Vec<Profile> = store.select(&Filter::all(), None, None)?;
    Ok(profiles
        .into_iter()
        .filter_map(|p| p.id.map(|id| (id, p.display_name)))
        .collect())
}

/// Workout logs from the last `days` days, newest first
pub fn recent_activity<S: RecordStore>(
    store: &S,
    days: i64,
    limit: usize,
) -> Result<Vec<ActivityEntry>> {
    let cutoff = Utc::now() - Duration::days(days);

    let mut logs: Vec<WorkoutLog> = store.select(&Filter::all(), None, None)?;
    logs.retain(|log| log.completed_at >= cutoff);
    logs.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    logs.truncate(limit);

    let names = profile_names(store)?;
    let workouts: Vec<Workout> = store.select(&Filter::all(), None, None)?;
    let workout_names: HashMap<Uuid, String> = workouts
        .into_iter()
        .filter_map(|w| w.id.map(|id| (id, w.name)))
        .collect();

    tracing::debug!("Loaded {} activity entries from last {} days", logs.len(), days);

    Ok(logs
        .into_iter()
        .map(|log| ActivityEntry {
            athlete: names.get(&log.user_id).cloned(),
            workout_name: workout_names.get(&log.workout_id).cloned(),
            log,
        })
        .collect())
}

/// Best score per user for one workout, descending
///
/// Ties within a user resolve to the earlier attempt.
pub fn leaderboard<S: RecordStore>(
    store: &S,
    workout_id: Uuid,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let logs: Vec<WorkoutLog> =
        store.select(&Filter::all().eq("workout_id", workout_id), None, None)?;

    let mut best_by_user: HashMap<Uuid, WorkoutLog> = HashMap::new();
    for log in logs {
        match best_by_user.get(&log.user_id) {
            Some(current) if current.score >= log.score => {}
            _ => {
                best_by_user.insert(log.user_id, log);
            }
        }
    }

    let names = profile_names(store)?;
    let mut entries: Vec<LeaderboardEntry> = best_by_user
        .into_iter()
        .map(|(user_id, best)| LeaderboardEntry {
            athlete: names.get(&user_id).cloned(),
            user_id,
            best,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.best
            .score
            .partial_cmp(&a.best.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(limit);
    Ok(entries)
}

/// Best single set per exercise for one user
///
/// The "best" measure follows the exercise's scoring strategy: heaviest
/// weight x reps, longest distance, or most calories. Rows referencing
/// unknown exercises are skipped.
pub fn exercise_records<S: RecordStore>(store: &S, user_id: Uuid) -> Result<Vec<ExerciseRecord>> {
    let scores: Vec<ExerciseScore> =
        store.select(&Filter::all().eq("user_id", user_id), None, None)?;

    let exercises: Vec<Exercise> = store.select(&Filter::all(), None, None)?;
    let by_id: HashMap<Uuid, Exercise> = exercises
        .into_iter()
        .filter_map(|ex| ex.id.map(|id| (id, ex)))
        .collect();

    let mut records: HashMap<Uuid, ExerciseRecord> = HashMap::new();
    for row in scores {
        let Some(exercise) = by_id.get(&row.exercise_id) else {
            tracing::warn!(
                "Score row {:?} references unknown exercise {}",
                row.id,
                row.exercise_id
            );
            continue;
        };

        let strategy =
            declared_or_name_strategy(exercise).unwrap_or(ScoringStrategy::WeightReps);
        let value = set_contribution(&row.as_logged_set(), &strategy);

        let record = records
            .entry(row.exercise_id)
            .or_insert_with(|| ExerciseRecord {
                exercise_id: row.exercise_id,
                exercise_name: exercise.name.clone(),
                strategy: strategy.clone(),
                best: value,
                sets_counted: 0,
            });
        record.sets_counted += 1;
        if value > record.best {
            record.best = value;
        }
    }

    let mut out: Vec<ExerciseRecord> = records.into_values().collect();
    out.sort_by(|a, b| a.exercise_name.cmp(&b.exercise_name));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_default_catalog, seed};
    use crate::jsonstore::JsonStore;
    use crate::logbook::WorkoutLogger;
    use crate::session::{lookup_or_create_profile, Session};
    use crate::types::{ExerciseLog, LoggedSet, WorkoutPlan};

    struct Fixture {
        _temp_dir: tempfile::TempDir,
        store: JsonStore,
        plan: WorkoutPlan,
        cardio_plan: WorkoutPlan,
    }

    fn fixture() -> Fixture {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(temp_dir.path()).unwrap();
        let catalog = build_default_catalog();
        seed(&store, &catalog).unwrap();

        let strength = catalog.workout_by_name("Heavy Triples").unwrap();
        let cardio = catalog.workout_by_name("Engine Builder").unwrap();

        Fixture {
            _temp_dir: temp_dir,
            plan: catalog.plan(strength.id.unwrap()).unwrap(),
            cardio_plan: catalog.plan(cardio.id.unwrap()).unwrap(),
            store,
        }
    }

    fn session_for(store: &JsonStore, name: &str) -> Session {
        let profile = lookup_or_create_profile(store, name).unwrap();
        Session::signed_in(profile.id.unwrap())
    }

    fn log_strength(fx: &Fixture, session: &Session, weight: f64, reps: u32) -> WorkoutLog {
        let mut logger = WorkoutLogger::new(&fx.store, session);
        let logs = vec![ExerciseLog {
            exercise_id: fx.plan.slots[0].entry.exercise_id,
            sets: vec![LoggedSet {
                weight: Some(weight),
                reps: Some(reps),
                ..LoggedSet::default()
            }],
        }];
        logger.log_workout(&fx.plan, &logs, "").unwrap()
    }

    #[test]
    fn test_recent_activity_joins_and_sorts() {
        let fx = fixture();
        let alex = session_for(&fx.store, "alex");

        log_strength(&fx, &alex, 100.0, 5);
        log_strength(&fx, &alex, 110.0, 3);

        let entries = recent_activity(&fx.store, 7, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].athlete.as_deref(), Some("alex"));
        assert_eq!(entries[0].workout_name.as_deref(), Some("Heavy Triples"));
        // Newest first
        assert!(entries[0].log.completed_at >= entries[1].log.completed_at);
    }

    #[test]
    fn test_recent_activity_window_excludes_old_logs() {
        let fx = fixture();
        let alex = session_for(&fx.store, "alex");

        let log = log_strength(&fx, &alex, 100.0, 5);

        // Age the log well past the window by rewriting its timestamp
        let mut aged = log.clone();
        aged.completed_at = Utc::now() - Duration::days(30);
        fx.store
            .update(&aged, &Filter::all().eq("id", log.id.unwrap()))
            .unwrap();

        let entries = recent_activity(&fx.store, 7, 10).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_leaderboard_keeps_best_per_user() {
        let fx = fixture();
        let alex = session_for(&fx.store, "alex");
        let sam = session_for(&fx.store, "sam");

        log_strength(&fx, &alex, 100.0, 5); // 500
        log_strength(&fx, &alex, 120.0, 5); // 600, alex's best
        log_strength(&fx, &sam, 140.0, 5); // 700, sam's best

        let workout_id = fx.plan.workout.id.unwrap();
        let entries = leaderboard(&fx.store, workout_id, 10).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].athlete.as_deref(), Some("sam"));
        assert_eq!(entries[0].best.score, 700.0);
        assert_eq!(entries[1].athlete.as_deref(), Some("alex"));
        assert_eq!(entries[1].best.score, 600.0);
    }

    #[test]
    fn test_leaderboard_scoped_to_one_workout() {
        let fx = fixture();
        let alex = session_for(&fx.store, "alex");

        log_strength(&fx, &alex, 100.0, 5);

        let other_workout = fx.cardio_plan.workout.id.unwrap();
        let entries = leaderboard(&fx.store, other_workout, 10).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_exercise_records_follow_strategy() {
        let fx = fixture();
        let alex = session_for(&fx.store, "alex");
        let user_id = alex.user_id().unwrap();

        // Strength sets: 100x5 = 500 beats 110x3 = 330
        log_strength(&fx, &alex, 100.0, 5);
        log_strength(&fx, &alex, 110.0, 3);

        // Cardio sets: best run distance is 600
        let mut logger = WorkoutLogger::new(&fx.store, &alex);
        let cardio_logs = vec![ExerciseLog {
            exercise_id: fx.cardio_plan.slots[0].entry.exercise_id,
            sets: vec![
                LoggedSet {
                    distance: Some(400.0),
                    ..LoggedSet::default()
                },
                LoggedSet {
                    distance: Some(600.0),
                    ..LoggedSet::default()
                },
            ],
        }];
        logger.log_workout(&fx.cardio_plan, &cardio_logs, "").unwrap();

        let records = exercise_records(&fx.store, user_id).unwrap();
        assert_eq!(records.len(), 2);

        let squat = records
            .iter()
            .find(|r| r.exercise_name == "Back Squat")
            .unwrap();
        assert_eq!(squat.strategy, ScoringStrategy::WeightReps);
        assert_eq!(squat.best, 500.0);
        assert_eq!(squat.sets_counted, 2);

        let run = records.iter().find(|r| r.exercise_name == "Run").unwrap();
        assert_eq!(run.strategy, ScoringStrategy::DistanceBased);
        assert_eq!(run.best, 600.0);
    }

    #[test]
    fn test_records_empty_for_unknown_user() {
        let fx = fixture();
        let records = exercise_records(&fx.store, Uuid::new_v4()).unwrap();
        assert!(records.is_empty());
    }
}
