//! Allocator: priority-weighted round-robin over a bounded time window.
//!
//! Single forward sweep:
//! - tasks with remaining time are ordered by priority, then least progress first
//! - the sweep hands out one chunk per turn, rotating through the pool
//! - a break whose time has arrived always wins over the next task chunk
//! - a task leaves the pool once its remaining minutes are fully allotted
//!
//! Pure: identical inputs yield identical chunk boundaries (ids aside).

use tracing::debug;

use crate::chunk::Chunk;
use crate::error::{Result, ScheduleError};
use crate::task::{Break, Task};
use crate::time::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationDefaults {
    pub chunk_minutes: u32,
    pub nag_interval_minutes: u32,
}

impl Default for AllocationDefaults {
    fn default() -> Self {
        Self {
            chunk_minutes: 30,
            nag_interval_minutes: 10,
        }
    }
}

struct PoolEntry<'a> {
    task: &'a Task,
    remaining: u32,
}

/// Report the first break whose time falls outside `[window.start, window.end)`.
pub fn validate_breaks(window: Window, breaks: &[Break]) -> Result<()> {
    for b in breaks {
        if b.time_of_day < window.start || b.time_of_day >= window.end {
            return Err(ScheduleError::BreakOutsideWindow {
                at: b.time_of_day,
                start: window.start,
                end: window.end,
            });
        }
    }
    Ok(())
}

/// Round-robin starting order: priority, then least-progressed first.
fn starting_order(tasks: &[Task]) -> Vec<PoolEntry<'_>> {
    let mut pool: Vec<PoolEntry<'_>> = tasks
        .iter()
        .filter(|t| t.is_available())
        .map(|task| PoolEntry {
            task,
            remaining: task.remaining_minutes(),
        })
        .collect();

    // Stable sort keeps caller order for exact ties.
    pool.sort_by(|a, b| {
        a.task
            .priority
            .cmp(&b.task.priority)
            .then_with(|| a.task.completion_ratio().total_cmp(&b.task.completion_ratio()))
    });
    pool
}

pub fn allocate(tasks: &[Task], window: Window, breaks: &[Break], defaults: AllocationDefaults) -> Vec<Chunk> {
    let mut pool = starting_order(tasks);
    if pool.is_empty() {
        debug!("no tasks with remaining time; nothing to allocate");
        return Vec::new();
    }

    let mut pending_breaks: Vec<&Break> = breaks
        .iter()
        .filter(|b| b.duration_minutes > 0 && window.start <= b.time_of_day && b.time_of_day < window.end)
        .collect();
    pending_breaks.sort_by_key(|b| b.time_of_day);

    let mut chunks = Vec::new();
    let mut cursor = window.start;
    let mut next_break = 0usize;
    let mut idx = 0usize;

    while cursor < window.end && !pool.is_empty() {
        if let Some(brk) = pending_breaks.get(next_break) {
            if cursor >= brk.time_of_day {
                let end = cursor.add_minutes(brk.duration_minutes).min(window.end);
                debug!(start = %cursor, end = %end, "break chunk");
                chunks.push(Chunk::pause(brk, cursor, end));
                cursor = end;
                next_break += 1;
                continue;
            }
        }

        let entry = &mut pool[idx];
        let task = entry.task;

        let mut max_len = i64::from(task.effective_chunk_size(defaults.chunk_minutes))
            .min(i64::from(entry.remaining))
            .min(cursor.minutes_until(window.end));
        if let Some(brk) = pending_breaks.get(next_break) {
            max_len = max_len.min(cursor.minutes_until(brk.time_of_day));
        }
        if max_len <= 0 {
            debug!(task = %task.id, at = %cursor, "no room for another chunk; stopping sweep");
            break;
        }

        // max_len is bounded by u32 inputs above.
        let len = max_len as u32;
        let end = cursor.add_minutes(len);
        let nag = task.effective_nag_interval(defaults.nag_interval_minutes);
        debug!(task = %task.id, start = %cursor, end = %end, "task chunk");
        chunks.push(Chunk::task(task, cursor, end, nag));
        cursor = end;
        entry.remaining -= len;

        if entry.remaining == 0 {
            // The slot now holds the next task; only wrap if we fell off the end.
            pool.remove(idx);
            if idx >= pool.len() {
                idx = 0;
            }
        } else {
            idx = (idx + 1) % pool.len();
        }
    }

    debug!(
        chunks = chunks.len(),
        covered_until = %cursor,
        unscheduled_tasks = pool.len(),
        "allocation finished"
    );
    chunks
}
