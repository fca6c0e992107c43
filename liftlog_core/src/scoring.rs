//! Workout score calculator.
//!
//! One number per workout attempt: each logged exercise pairs with the
//! plan slot at the same position, a scoring strategy is resolved for
//! that slot, and per-set contributions are summed. Pure over its
//! inputs; absent numeric fields degrade to zero rather than failing.

use crate::types::{Exercise, ExerciseLog, LoggedSet, ScoringStrategy, WorkoutKind, WorkoutPlan};

/// Strategy declared on the exercise, else inferred from its name
///
/// The name matching exists for catalog rows predating declared
/// strategies; new exercise types should declare one instead.
pub fn declared_or_name_strategy(exercise: &Exercise) -> Option<ScoringStrategy> {
    if let Some(strategy) = &exercise.strategy {
        return Some(strategy.clone());
    }
    match exercise.name.as_str() {
        "Run" => Some(ScoringStrategy::DistanceBased),
        "Assault Bike" => Some(ScoringStrategy::CalorieBased),
        _ => None,
    }
}

/// Full strategy resolution for one slot of a workout
///
/// Order: declared strategy, name fallback, then the workout kind. The
/// default rule is the weight-training rule, so unclassified work scores
/// identically to weight training.
pub fn resolve_strategy(exercise: &Exercise, kind: &WorkoutKind) -> ScoringStrategy {
    declared_or_name_strategy(exercise).unwrap_or(match kind {
        WorkoutKind::WeightTraining => ScoringStrategy::WeightReps,
        WorkoutKind::Conditioning | WorkoutKind::Mixed => ScoringStrategy::WeightReps,
    })
}

/// Contribution of a single set under a strategy
pub fn set_contribution(set: &LoggedSet, strategy: &ScoringStrategy) -> f64 {
    match strategy {
        ScoringStrategy::DistanceBased => set.distance.unwrap_or(0.0),
        ScoringStrategy::CalorieBased => set.calories.unwrap_or(0.0),
        ScoringStrategy::WeightReps => {
            set.weight.unwrap_or(0.0) * f64::from(set.reps.unwrap_or(0))
        }
    }
}

/// Compute the score of one workout attempt
///
/// Correspondence is positional: the nth exercise log pairs with the nth
/// plan slot. A log with no slot at its position contributes zero.
pub fn compute_score(logs: &[ExerciseLog], plan: &WorkoutPlan) -> f64 {
    logs.iter()
        .enumerate()
        .map(|(position, log)| {
            let Some(slot) = plan.slots.get(position) else {
                return 0.0;
            };
            let strategy = resolve_strategy(&slot.exercise, &plan.workout.kind);
            log.sets
                .iter()
                .map(|set| set_contribution(set, &strategy))
                .sum::<f64>()
        })
        .sum()
}
