//! File-backed record store.
//!
//! Each table lives in one JSONL (JSON Lines) file under the data
//! directory. Reads take a shared lock and skip corrupt lines; mutations
//! rewrite the table through a locked temp file and an atomic rename.

use crate::store::{Filter, Order, Record, RecordStore};
use crate::{Error, Result};
use fs2::FileExt;
use serde_json::Value;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// JSONL-per-table store rooted at a data directory
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory the table files live in
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", table))
    }

    /// Read every row of a table, skipping lines that fail to parse
    fn read_table<R: Record>(&self) -> Result<Vec<R>> {
        let path = self.table_path(R::TABLE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        // Shared lock: concurrent readers are fine
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut rows = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<R>(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {} row at line {}: {}",
                        R::TABLE,
                        line_num + 1,
                        e
                    );
                    // Keep reading; one bad line must not hide the table
                }
            }
        }

        file.unlock()?;
        Ok(rows)
    }

    /// Rewrite a table atomically: locked temp file, sync, rename
    fn write_table<R: Record>(&self, rows: &[R]) -> Result<()> {
        let path = self.table_path(R::TABLE);
        let temp = NamedTempFile::new_in(&self.root)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for row in rows {
                let line = serde_json::to_string(row)?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} rows to {}", rows.len(), R::TABLE);
        Ok(())
    }
}

impl RecordStore for JsonStore {
    fn select<R: Record>(
        &self,
        filter: &Filter,
        order: Option<&Order>,
        limit: Option<usize>,
    ) -> Result<Vec<R>> {
        let rows = self.read_table::<R>()?;

        let mut keep = Vec::new();
        for row in rows {
            let image = serde_json::to_value(&row)?;
            if filter.matches(&image) {
                keep.push((image, row));
            }
        }

        if let Some(order) = order {
            keep.sort_by(|(a, _), (b, _)| {
                let left = a.get(&order.field).unwrap_or(&Value::Null);
                let right = b.get(&order.field).unwrap_or(&Value::Null);
                let ordering = compare_values(left, right);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let mut out: Vec<R> = keep.into_iter().map(|(_, row)| row).collect();
        if let Some(limit) = limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    fn insert<R: Record>(&self, mut rows: Vec<R>) -> Result<Vec<R>> {
        if rows.is_empty() {
            return Ok(rows);
        }

        let mut table = self.read_table::<R>()?;

        for row in &mut rows {
            match row.id() {
                Some(id) => {
                    if table.iter().any(|existing| existing.id() == Some(id)) {
                        return Err(Error::Store(format!(
                            "duplicate id {} in {}",
                            id,
                            R::TABLE
                        )));
                    }
                }
                None => row.assign_id(Uuid::new_v4()),
            }
            table.push(row.clone());
        }

        self.write_table::<R>(&table)?;
        tracing::debug!("Inserted {} rows into {}", rows.len(), R::TABLE);
        Ok(rows)
    }

    fn update<R: Record>(&self, row: &R, filter: &Filter) -> Result<R> {
        let mut table = self.read_table::<R>()?;

        let mut matched = Vec::new();
        for (idx, existing) in table.iter().enumerate() {
            let image = serde_json::to_value(existing)?;
            if filter.matches(&image) {
                matched.push(idx);
            }
        }

        match matched.as_slice() {
            [] => Err(Error::NotFound(format!(
                "no {} row matches the update filter",
                R::TABLE
            ))),
            [idx] => {
                let mut updated = row.clone();
                if updated.id().is_none() {
                    if let Some(id) = table[*idx].id() {
                        updated.assign_id(id);
                    }
                }
                table[*idx] = updated.clone();
                self.write_table::<R>(&table)?;
                Ok(updated)
            }
            many => Err(Error::Store(format!(
                "update filter matched {} {} rows, expected one",
                many.len(),
                R::TABLE
            ))),
        }
    }

    fn delete<R: Record>(&self, filter: &Filter) -> Result<usize> {
        let table = self.read_table::<R>()?;

        let mut keep = Vec::with_capacity(table.len());
        let mut removed = 0;
        for row in table {
            let image = serde_json::to_value(&row)?;
            if filter.matches(&image) {
                removed += 1;
            } else {
                keep.push(row);
            }
        }

        if removed > 0 {
            self.write_table::<R>(&keep)?;
            tracing::debug!("Deleted {} rows from {}", removed, R::TABLE);
        }
        Ok(removed)
    }

    fn upsert<R: Record>(&self, mut rows: Vec<R>) -> Result<Vec<R>> {
        if rows.is_empty() {
            return Ok(rows);
        }

        let mut table = self.read_table::<R>()?;

        for row in &mut rows {
            match row.id() {
                Some(id) => {
                    let slot = table.iter_mut().find(|existing| existing.id() == Some(id));
                    match slot {
                        Some(existing) => *existing = row.clone(),
                        None => table.push(row.clone()),
                    }
                }
                None => {
                    row.assign_id(Uuid::new_v4());
                    table.push(row.clone());
                }
            }
        }

        self.write_table::<R>(&table)?;
        tracing::debug!("Upserted {} rows into {}", rows.len(), R::TABLE);
        Ok(rows)
    }
}

/// Total order over JSON values, good enough for sort directives
///
/// Null sorts first; numbers compare numerically; strings and bools
/// compare naturally. Mixed-type fields compare as equal.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exercise, Message, ScoringStrategy};
    use chrono::Utc;

    fn open_test_store() -> (tempfile::TempDir, JsonStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(temp_dir.path().join("tables")).unwrap();
        (temp_dir, store)
    }

    fn exercise(name: &str) -> Exercise {
        Exercise {
            id: None,
            name: name.into(),
            strategy: Some(ScoringStrategy::WeightReps),
            demo_url: None,
        }
    }

    #[test]
    fn test_insert_assigns_ids() {
        let (_dir, store) = open_test_store();

        let rows = store
            .insert(vec![exercise("Back Squat"), exercise("Deadlift")])
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.id.is_some()));
        assert_ne!(rows[0].id, rows[1].id);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let (_dir, store) = open_test_store();

        let rows = store.insert(vec![exercise("Back Squat")]).unwrap();
        let result = store.insert(vec![rows[0].clone()]);

        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_select_filters_by_field() {
        let (_dir, store) = open_test_store();

        store
            .insert(vec![exercise("Back Squat"), exercise("Run")])
            .unwrap();

        let found: Vec<Exercise> = store
            .select(&Filter::all().eq("name", "Run"), None, None)
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Run");
    }

    #[test]
    fn test_select_order_and_limit() {
        let (_dir, store) = open_test_store();

        store
            .insert(vec![exercise("Cc"), exercise("Aa"), exercise("Bb")])
            .unwrap();

        let found: Vec<Exercise> = store
            .select(&Filter::all(), Some(&Order::asc("name")), Some(2))
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Aa");
        assert_eq!(found[1].name, "Bb");
    }

    #[test]
    fn test_select_missing_table_is_empty() {
        let (_dir, store) = open_test_store();

        let found: Vec<Exercise> = store.select(&Filter::all(), None, None).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_update_requires_exactly_one_match() {
        let (_dir, store) = open_test_store();

        let rows = store.insert(vec![exercise("Back Squat")]).unwrap();
        let id = rows[0].id.unwrap();

        let mut changed = rows[0].clone();
        changed.name = "Front Squat".into();
        let updated = store
            .update(&changed, &Filter::all().eq("id", id))
            .unwrap();
        assert_eq!(updated.name, "Front Squat");

        // Zero matches is NotFound
        let missing = store.update(&changed, &Filter::all().eq("id", Uuid::new_v4()));
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_by_id_set() {
        let (_dir, store) = open_test_store();

        let rows = store
            .insert(vec![exercise("A"), exercise("B"), exercise("C")])
            .unwrap();
        let doomed: Vec<Uuid> = rows[..2].iter().filter_map(|r| r.id).collect();

        let removed = store
            .delete::<Exercise>(&Filter::all().is_in("id", doomed))
            .unwrap();
        assert_eq!(removed, 2);

        let remaining: Vec<Exercise> = store.select(&Filter::all(), None, None).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "C");
    }

    #[test]
    fn test_upsert_replaces_and_inserts() {
        let (_dir, store) = open_test_store();

        let rows = store.insert(vec![exercise("Back Squat")]).unwrap();

        let mut replacement = rows[0].clone();
        replacement.name = "Box Squat".into();
        let upserted = store
            .upsert(vec![replacement, exercise("Deadlift")])
            .unwrap();

        assert!(upserted.iter().all(|r| r.id.is_some()));

        let all: Vec<Exercise> = store
            .select(&Filter::all(), Some(&Order::asc("name")), None)
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Box Squat");
        assert_eq!(all[1].name, "Deadlift");
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let (_dir, store) = open_test_store();

        store.insert(vec![exercise("Back Squat")]).unwrap();

        // Damage the table file with a garbage line
        let path = store.table_path("exercises");
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("{ not json }\n");
        std::fs::write(&path, contents).unwrap();

        let found: Vec<Exercise> = store.select(&Filter::all(), None, None).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_tables_do_not_bleed_into_each_other() {
        let (_dir, store) = open_test_store();

        store.insert(vec![exercise("Back Squat")]).unwrap();
        store
            .insert(vec![Message {
                id: None,
                user_id: Uuid::new_v4(),
                body: "first".into(),
                created_at: Utc::now(),
            }])
            .unwrap();

        let exercises: Vec<Exercise> = store.select(&Filter::all(), None, None).unwrap();
        let messages: Vec<Message> = store.select(&Filter::all(), None, None).unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(messages.len(), 1);
    }
}
