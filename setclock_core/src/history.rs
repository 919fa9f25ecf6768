//! Completed-workout history log.
//!
//! Records are appended to a JSONL (JSON Lines) file with file locking so
//! concurrent runs never interleave partial lines. The engine never writes
//! here itself; front ends append a record from the completion stats.

use crate::{Error, Result, WorkoutStats};
use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One completed workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub title: String,
    pub completed_at: DateTime<Utc>,
    pub total_time_seconds: u32,
    pub exercises_completed: usize,
    pub total_exercises: usize,
}

impl WorkoutRecord {
    pub fn from_stats(title: impl Into<String>, stats: &WorkoutStats) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed_at: Utc::now(),
            total_time_seconds: stats.total_time,
            exercises_completed: stats.exercises_completed,
            total_exercises: stats.total_exercises,
        }
    }
}

/// Destination for completed-workout records
pub trait HistorySink {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()>;
}

/// JSONL-based history log with file locking
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl HistorySink for JsonlHistory {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended workout {} to history", record.id);
        Ok(())
    }
}

/// Read every record from a history file
///
/// Malformed lines are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<WorkoutRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from history", records.len());
    Ok(records)
}

/// Records completed within the last `days` days, newest first
pub fn load_recent_records(path: &Path, days: i64) -> Result<Vec<WorkoutRecord>> {
    let cutoff = Duration::try_days(days)
        .filter(|window| *window >= Duration::zero())
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| {
            Error::Config(format!("history window of {} days is out of range", days))
        })?;

    let mut records: Vec<_> = read_records(path)?
        .into_iter()
        .filter(|r| r.completed_at >= cutoff)
        .collect();
    records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    Ok(records)
}
