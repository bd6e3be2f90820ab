//! Completion accounting: closing a chunk and crediting the task.
//!
//! Credit is the time that actually passed since the chunk's scheduled start,
//! not its planned length: finishing early credits less, working past the end
//! credits the overtime. The task total is still clamped at its estimate.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::error::{Result, ScheduleError};
use crate::schedule::{Schedule, ScheduleStatus};
use crate::task::Task;
use crate::time::round_minutes_between;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub chunk_id: String,
    /// False when the chunk was already completed; nothing changed.
    pub newly_completed: bool,
    pub task_id: Option<String>,
    /// Elapsed minutes measured for a task chunk (at least 1).
    pub elapsed_minutes: u32,
    /// Minutes actually added to the task after clamping.
    pub credited_minutes: u32,
    pub schedule_completed: bool,
}

/// Minutes between the chunk start and `now`, rounded, floored at 1, uncapped.
pub fn elapsed_minutes(chunk_start: NaiveDateTime, now: NaiveDateTime) -> u32 {
    let minutes = round_minutes_between(chunk_start, now).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

pub fn complete_chunk(
    schedule: &mut Schedule,
    tasks: &mut [Task],
    chunk_id: &str,
    now: NaiveDateTime,
) -> Result<Completion> {
    let date = schedule.date;
    let chunk = schedule
        .chunks
        .iter_mut()
        .find(|c| c.id == chunk_id)
        .ok_or_else(|| ScheduleError::UnknownChunk(chunk_id.to_string()))?;

    let task_id = chunk.task_id().map(str::to_string);
    if chunk.completed {
        return Ok(Completion {
            chunk_id: chunk_id.to_string(),
            newly_completed: false,
            task_id,
            elapsed_minutes: 0,
            credited_minutes: 0,
            schedule_completed: schedule.status == ScheduleStatus::Completed,
        });
    }

    chunk.completed = true;
    chunk.completed_at = Some(now);
    let chunk_start = chunk.start.on(date);

    let mut elapsed = 0;
    let mut credited = 0;
    if let Some(ref id) = task_id {
        elapsed = elapsed_minutes(chunk_start, now);
        match tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                credited = task.record_progress(elapsed);
                info!(
                    task = %id,
                    elapsed,
                    credited,
                    completed = task.completed_minutes,
                    estimated = task.estimated_minutes,
                    "credited task progress"
                );
            }
            None => warn!(task = %id, chunk = %chunk_id, "completed chunk refers to an unknown task; nothing credited"),
        }
    }

    let schedule_completed = schedule.settle_status();
    Ok(Completion {
        chunk_id: chunk_id.to_string(),
        newly_completed: true,
        task_id,
        elapsed_minutes: elapsed,
        credited_minutes: credited,
        schedule_completed,
    })
}
