//! CSV export for workout logs.
//!
//! Appends logs to a CSV file with athlete and workout names resolved,
//! writing headers only when the file starts empty, and syncing to disk
//! before returning.

use crate::store::{Filter, RecordStore};
use crate::types::{Profile, Workout, WorkoutLog};
use crate::Result;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    athlete: Option<String>,
    workout: Option<String>,
    completed_at: String,
    score: f64,
    notes: String,
}

impl CsvRow {
    fn from_log(
        log: &WorkoutLog,
        names: &HashMap<Uuid, String>,
        workouts: &HashMap<Uuid, String>,
    ) -> Self {
        CsvRow {
            id: log.id.map(|id| id.to_string()).unwrap_or_default(),
            athlete: names.get(&log.user_id).cloned(),
            workout: workouts.get(&log.workout_id).cloned(),
            completed_at: log.completed_at.to_rfc3339(),
            score: log.score,
            notes: log.notes.clone(),
        }
    }
}

/// Export all workout logs to a CSV file
///
/// Returns the number of logs written. Appends on repeat runs; the
/// header row is only written when the file starts empty.
pub fn export_logs<S: RecordStore>(store: &S, csv_path: &Path) -> Result<usize> {
    let mut logs: Vec<WorkoutLog> = store.select(&Filter::all(), None, None)?;

    if logs.is_empty() {
        tracing::info!("No workout logs to export");
        return Ok(0);
    }

    logs.sort_by(|a, b| a.completed_at.cmp(&b.completed_at));

    let profiles: Vec<Profile> = store.select(&Filter::all(), None, None)?;
    let names: HashMap<Uuid, String> = profiles
        .into_iter()
        .filter_map(|p| p.id.map(|id| (id, p.display_name)))
        .collect();

    let workouts: Vec<Workout> = store.select(&Filter::all(), None, None)?;
    let workout_names: HashMap<Uuid, String> = workouts
        .into_iter()
        .filter_map(|w| w.id.map(|id| (id, w.name)))
        .collect();

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for log in &logs {
        writer.serialize(CsvRow::from_log(log, &names, &workout_names))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} workout logs to {:?}", logs.len(), csv_path);
    Ok(logs.len())
}
