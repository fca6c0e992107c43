use clap::{Parser, Subcommand};
use liftlog_core::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout logging and leaderboard system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as this user (created on first use)
    #[arg(long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in catalog into the store
    Seed,

    /// List the workout catalog
    Workouts,

    /// Log a workout attempt
    Log {
        /// Workout name, as shown by `workouts`
        workout: String,

        /// JSON file with the performed sets
        #[arg(long, conflicts_with = "as_planned")]
        sets_file: Option<PathBuf>,

        /// Log the workout's target sets as performed
        #[arg(long, conflicts_with = "sets_file")]
        as_planned: bool,

        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Edit a previously logged workout
    Edit {
        /// Identifier of the workout log to edit
        log_id: Uuid,

        /// JSON file with the full new set list
        #[arg(long)]
        sets_file: PathBuf,

        /// Replacement notes (keeps the old notes when omitted)
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show recent activity
    Recent {
        /// Window in days
        #[arg(long)]
        days: Option<i64>,

        /// Maximum entries to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the leaderboard for a workout
    Leaderboard {
        /// Workout name
        workout: String,
    },

    /// Show personal records per exercise
    Records,

    /// Message board
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },

    /// Export workout logs to CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum BoardAction {
    /// Post a message
    Post { body: String },

    /// List recent messages
    List,

    /// Like a message
    Like { message_id: Uuid },

    /// Dislike a message
    Dislike { message_id: Uuid },

    /// Delete a message
    Delete { message_id: Uuid },
}

fn main() -> ExitCode {
    liftlog_core::logging::init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = JsonStore::open(&data_dir)?;

    let session = match &cli.user {
        Some(name) => {
            let profile = lookup_or_create_profile(&store, name)?;
            match profile.id {
                Some(id) => Session::signed_in(id),
                None => Session::anonymous(),
            }
        }
        None => Session::anonymous(),
    };

    match cli.command {
        Commands::Seed => cmd_seed(&store),
        Commands::Workouts => cmd_workouts(&store),
        Commands::Log {
            workout,
            sets_file,
            as_planned,
            notes,
        } => cmd_log(&store, &session, &workout, sets_file, as_planned, &notes),
        Commands::Edit {
            log_id,
            sets_file,
            notes,
        } => cmd_edit(&store, &session, log_id, &sets_file, notes),
        Commands::Recent { days, limit } => cmd_recent(&store, &config, days, limit),
        Commands::Leaderboard { workout } => cmd_leaderboard(&store, &config, &workout),
        Commands::Records => cmd_records(&store, &session),
        Commands::Board { action } => cmd_board(&store, &config, &session, action),
        Commands::Export { out } => cmd_export(&store, &out),
    }
}

/// Seed the catalog unless the store already has one
fn ensure_catalog(store: &JsonStore) -> Result<()> {
    catalog::seed(store, get_default_catalog())?;
    Ok(())
}

fn find_workout_by_name(store: &JsonStore, name: &str) -> Result<Workout> {
    let mut found: Vec<Workout> =
        store.select(&Filter::all().eq("name", name), None, Some(1))?;
    found
        .pop()
        .ok_or_else(|| Error::NotFound(format!("workout '{}'", name)))
}

fn cmd_seed(store: &JsonStore) -> Result<()> {
    let written = catalog::seed(store, get_default_catalog())?;
    if written == 0 {
        println!("Catalog already seeded.");
    } else {
        println!("✓ Seeded catalog ({} rows)", written);
    }
    Ok(())
}

fn cmd_workouts(store: &JsonStore) -> Result<()> {
    ensure_catalog(store)?;

    let workouts: Vec<Workout> =
        store.select(&Filter::all(), Some(&Order::asc("name")), None)?;

    for workout in workouts {
        let Some(workout_id) = workout.id else {
            continue;
        };
        let plan = load_workout_plan(store, workout_id)?;

        println!("\n{}  [{:?}]", workout.name, workout.kind);
        if let Some(ref description) = workout.description {
            println!("  {}", description);
        }
        for slot in &plan.slots {
            let mut targets = Vec::new();
            if let Some(weight) = slot.entry.target_weight {
                targets.push(format!("{}kg", weight));
            }
            if let Some(reps) = slot.entry.target_reps {
                targets.push(format!("{} reps", reps));
            }
            if let Some(distance) = slot.entry.target_distance {
                targets.push(format!("{}m", distance));
            }
            if let Some(calories) = slot.entry.target_calories {
                targets.push(format!("{} cal", calories));
            }
            println!(
                "  → {} x{} {}",
                slot.exercise.name,
                slot.entry.target_sets,
                targets.join(", ")
            );
        }
    }
    println!();
    Ok(())
}

/// One exercise entry in a sets file
#[derive(Debug, Deserialize)]
struct SetsFileEntry {
    /// Exercise name; defaults to the plan slot at the same position
    exercise: Option<String>,
    #[serde(default)]
    sets: Vec<LoggedSet>,
}

/// Read a sets file and resolve exercise names against the store
fn read_sets_file(
    store: &JsonStore,
    plan: &WorkoutPlan,
    path: &std::path::Path,
) -> Result<Vec<ExerciseLog>> {
    let contents = std::fs::read_to_string(path)?;
    let entries: Vec<SetsFileEntry> = serde_json::from_str(&contents)?;

    let exercises: Vec<Exercise> = store.select(&Filter::all(), None, None)?;
    let by_name: HashMap<String, Uuid> = exercises
        .into_iter()
        .filter_map(|ex| ex.id.map(|id| (ex.name, id)))
        .collect();

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            let exercise_id = match &entry.exercise {
                Some(name) => *by_name
                    .get(name)
                    .ok_or_else(|| Error::NotFound(format!("exercise '{}'", name)))?,
                None => {
                    plan.slots
                        .get(position)
                        .map(|slot| slot.entry.exercise_id)
                        .ok_or_else(|| {
                            Error::Validation(format!(
                                "entry {} names no exercise and the workout has no slot there",
                                position
                            ))
                        })?
                }
            };
            Ok(ExerciseLog {
                exercise_id,
                sets: entry.sets,
            })
        })
        .collect()
}

/// Build logs from the plan's own targets
fn planned_logs(plan: &WorkoutPlan) -> Vec<ExerciseLog> {
    plan.slots
        .iter()
        .map(|slot| ExerciseLog {
            exercise_id: slot.entry.exercise_id,
            sets: (0..slot.entry.target_sets)
                .map(|_| LoggedSet::from_targets(&slot.entry))
                .collect(),
        })
        .collect()
}

fn cmd_log(
    store: &JsonStore,
    session: &Session,
    workout_name: &str,
    sets_file: Option<PathBuf>,
    as_planned: bool,
    notes: &str,
) -> Result<()> {
    ensure_catalog(store)?;

    let workout = find_workout_by_name(store, workout_name)?;
    let workout_id = workout
        .id
        .ok_or_else(|| Error::Store("workout row has no id".into()))?;
    let plan = load_workout_plan(store, workout_id)?;

    let logs = match sets_file {
        Some(ref path) => read_sets_file(store, &plan, path)?,
        None if as_planned => planned_logs(&plan),
        None => {
            return Err(Error::Validation(
                "pass --sets-file or --as-planned".into(),
            ))
        }
    };

    let mut logger = WorkoutLogger::new(store, session);
    let log = logger.log_workout(&plan, &logs, notes)?;

    println!("✓ Logged '{}'", plan.workout.name);
    println!("  Score: {}", log.score);
    if let Some(id) = log.id {
        println!("  Log id: {}", id);
    }
    Ok(())
}

fn cmd_edit(
    store: &JsonStore,
    session: &Session,
    log_id: Uuid,
    sets_file: &std::path::Path,
    notes: Option<String>,
) -> Result<()> {
    let mut found: Vec<WorkoutLog> =
        store.select(&Filter::all().eq("id", log_id), None, Some(1))?;
    let existing = found
        .pop()
        .ok_or_else(|| Error::NotFound(format!("workout log {}", log_id)))?;

    let plan = load_workout_plan(store, existing.workout_id)?;
    let logs = read_sets_file(store, &plan, sets_file)?;
    let notes = notes.unwrap_or(existing.notes);

    let mut logger = WorkoutLogger::new(store, session);
    let updated = logger.update_workout_log(log_id, &plan, &logs, &notes)?;

    println!("✓ Updated '{}'", plan.workout.name);
    println!("  Score: {}", updated.score);
    Ok(())
}

fn cmd_recent(
    store: &JsonStore,
    config: &Config,
    days: Option<i64>,
    limit: Option<usize>,
) -> Result<()> {
    let days = days.unwrap_or(config.history.recent_days);
    let limit = limit.unwrap_or(config.board.page_size);

    let entries = recent_activity(store, days, limit)?;
    if entries.is_empty() {
        println!("No activity in the last {} days.", days);
        return Ok(());
    }

    println!("\nRecent activity ({} days):", days);
    for entry in entries {
        println!(
            "  {}  {:<12} {:<20} score {}",
            entry.log.completed_at.format("%Y-%m-%d %H:%M"),
            entry.athlete.as_deref().unwrap_or("(unknown)"),
            entry.workout_name.as_deref().unwrap_or("(unknown)"),
            entry.log.score
        );
        if !entry.log.notes.is_empty() {
            println!("      {}", entry.log.notes);
        }
    }
    println!();
    Ok(())
}

fn cmd_leaderboard(store: &JsonStore, config: &Config, workout_name: &str) -> Result<()> {
    ensure_catalog(store)?;

    let workout = find_workout_by_name(store, workout_name)?;
    let workout_id = workout
        .id
        .ok_or_else(|| Error::Store("workout row has no id".into()))?;

    let entries = leaderboard(store, workout_id, config.history.leaderboard_size)?;
    if entries.is_empty() {
        println!("No attempts logged for '{}' yet.", workout_name);
        return Ok(());
    }

    println!("\nLeaderboard: {}", workout_name);
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "  {}. {:<12} {}",
            rank + 1,
            entry.athlete.as_deref().unwrap_or("(unknown)"),
            entry.best.score
        );
    }
    println!();
    Ok(())
}

fn cmd_records(store: &JsonStore, session: &Session) -> Result<()> {
    let user_id = session.require_user()?;

    let records = exercise_records(store, user_id)?;
    if records.is_empty() {
        println!("No records yet - log a workout first.");
        return Ok(());
    }

    println!("\nPersonal records:");
    for record in records {
        let unit = match record.strategy {
            ScoringStrategy::DistanceBased => "m",
            ScoringStrategy::CalorieBased => "cal",
            ScoringStrategy::WeightReps => "kg·reps",
        };
        println!(
            "  {:<16} {} {}  ({} sets)",
            record.exercise_name, record.best, unit, record.sets_counted
        );
    }
    println!();
    Ok(())
}

fn cmd_board(
    store: &JsonStore,
    config: &Config,
    session: &Session,
    action: BoardAction,
) -> Result<()> {
    match action {
        BoardAction::Post { body } => {
            post_message(store, session, &body)?;
            println!("✓ Posted.");
            Ok(())
        }
        BoardAction::List => {
            let feed = board_feed(store, config.board.page_size)?;
            if feed.is_empty() {
                println!("The board is empty.");
                return Ok(());
            }
            println!();
            for post in feed {
                println!(
                    "  {}  {}",
                    post.message.created_at.format("%Y-%m-%d %H:%M"),
                    post.author.as_deref().unwrap_or("(unknown)")
                );
                println!("      {}", post.message.body);
            }
            println!();
            Ok(())
        }
        BoardAction::Like { message_id } => board::like_message(store, session, message_id),
        BoardAction::Dislike { message_id } => {
            board::dislike_message(store, session, message_id)
        }
        BoardAction::Delete { message_id } => board::delete_message(store, session, message_id),
    }
}

fn cmd_export(store: &JsonStore, out: &std::path::Path) -> Result<()> {
    let count = export_logs(store, out)?;
    println!("✓ Exported {} workout logs", count);
    println!("  CSV: {}", out.display());
    Ok(())
}
