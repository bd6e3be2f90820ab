//! Timeline mutations over an ordered chunk sequence.
//!
//! Every operation takes the full prior sequence and returns a new one; the
//! input is never touched, so a rejected edit leaves nothing half-applied.
//!
//! Two flavours of edit exist on purpose:
//! - structural (move, delete): the whole list is re-laid from the window start,
//!   each chunk keeping its duration
//! - local (resize): only the dragged chunk and at most its next neighbour change
//!
//! Manual edits are the expert path: validated, then sorted, never re-laid.

use tracing::debug;

use crate::chunk::{Chunk, ChunkKind};
use crate::error::{Result, ScheduleError};
use crate::task::Task;
use crate::time::{TimeOfDay, Window};

/// Shortest chunk a resize or manual edit may leave behind.
pub const MIN_CHUNK_MINUTES: u32 = 5;

/// Where a dragged chunk lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Insert at the index currently held by this chunk.
    BeforeChunk(String),
    /// Dropped on open timeline space: insert before the first chunk starting after this time.
    AtTime(TimeOfDay),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

impl std::str::FromStr for Edge {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "start" => Ok(Edge::Start),
            "end" => Ok(Edge::End),
            other => Err(format!("unknown edge '{other}' (expected start|end)")),
        }
    }
}

/// Direct field replacement for one chunk.
#[derive(Debug, Clone, Copy)]
pub struct ChunkEdit<'a> {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// `None` keeps the current interval.
    pub nag_interval_minutes: Option<u32>,
    /// Re-point the chunk at another task, snapshotting its title and priority.
    pub task: Option<&'a Task>,
}

pub fn position(chunks: &[Chunk], id: &str) -> Result<usize> {
    chunks
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| ScheduleError::UnknownChunk(id.to_string()))
}

/// Lay chunks end to end from the window start, preserving each duration.
pub fn reflow(mut chunks: Vec<Chunk>, window: Window) -> Result<Vec<Chunk>> {
    let needed: u32 = chunks.iter().map(Chunk::duration_minutes).sum();
    if needed > window.length_minutes() {
        return Err(ScheduleError::WindowOverflow {
            needed,
            available: window.length_minutes(),
        });
    }

    let mut cursor = window.start;
    for chunk in chunks.iter_mut() {
        chunk.shift_to(cursor);
        cursor = chunk.end;
    }
    Ok(chunks)
}

pub fn move_chunk(chunks: &[Chunk], window: Window, id: &str, target: &DropTarget) -> Result<Vec<Chunk>> {
    let from = position(chunks, id)?;
    let mut out = chunks.to_vec();
    let moved = out.remove(from);

    let to = match target {
        DropTarget::BeforeChunk(target_id) if target_id == id => from,
        DropTarget::BeforeChunk(target_id) => position(&out, target_id)?,
        DropTarget::AtTime(at) => out.iter().position(|c| c.start > *at).unwrap_or(out.len()),
        DropTarget::End => out.len(),
    };

    debug!(chunk = %id, from, to, "move chunk");
    out.insert(to, moved);
    reflow(out, window)
}

pub fn resize_chunk(chunks: &[Chunk], window: Window, id: &str, edge: Edge, to: TimeOfDay) -> Result<Vec<Chunk>> {
    let idx = position(chunks, id)?;
    let mut out = chunks.to_vec();

    // Bounds always include the edge's current position, so a drag never moves
    // the edge against the pointer when a neighbour is already short.
    match edge {
        Edge::Start => {
            let current = out[idx].start;
            let lower = match idx {
                0 => window.start,
                _ => out[idx - 1].end,
            }
            .min(current);
            let upper = out[idx].end.sub_minutes(MIN_CHUNK_MINUTES).max(current);
            out[idx].start = to.clamp(lower, upper);
        }
        Edge::End => {
            let current = out[idx].end;
            let lower = out[idx].start.add_minutes(MIN_CHUNK_MINUTES).min(current);
            // The next chunk may be pushed, but never below the minimum. A
            // neighbour already under the minimum is not pushed at all.
            let upper = match out.get(idx + 1) {
                Some(next) => next.end.sub_minutes(MIN_CHUNK_MINUTES).max(next.start),
                None => window.end,
            }
            .max(current);
            let new_end = to.clamp(lower, upper);
            out[idx].end = new_end;
            if let Some(next) = out.get_mut(idx + 1) {
                if new_end > next.start {
                    debug!(pushed = %next.id, to = %new_end, "push next chunk start");
                    next.start = new_end;
                }
            }
        }
    }

    debug!(chunk = %id, ?edge, start = %out[idx].start, end = %out[idx].end, "resize chunk");
    Ok(out)
}

pub fn delete_chunk(chunks: &[Chunk], window: Window, id: &str) -> Result<Vec<Chunk>> {
    let idx = position(chunks, id)?;
    let mut out = chunks.to_vec();
    let removed = out.remove(idx);
    debug!(chunk = %id, minutes = removed.duration_minutes(), "delete chunk");
    reflow(out, window)
}

pub fn edit_chunk(chunks: &[Chunk], window: Window, id: &str, edit: ChunkEdit<'_>) -> Result<Vec<Chunk>> {
    let idx = position(chunks, id)?;

    let minutes = edit.start.minutes_until(edit.end);
    if minutes < i64::from(MIN_CHUNK_MINUTES) {
        return Err(ScheduleError::ChunkTooShort {
            minutes,
            min: MIN_CHUNK_MINUTES,
        });
    }
    if !window.contains(edit.start) || !window.contains(edit.end) {
        return Err(ScheduleError::OutsideWindow {
            start: edit.start,
            end: edit.end,
            window_start: window.start,
            window_end: window.end,
        });
    }

    let mut out = chunks.to_vec();
    let chunk = &mut out[idx];
    chunk.start = edit.start;
    chunk.end = edit.end;
    if let Some(nag) = edit.nag_interval_minutes {
        chunk.nag_interval_minutes = nag;
    }
    if let Some(task) = edit.task {
        chunk.kind = ChunkKind::for_task(task);
    }

    debug!(chunk = %id, start = %edit.start, end = %edit.end, "manual edit");
    out.sort_by_key(|c| c.start);
    Ok(out)
}

/// Verify the strict layout: chunks tile the window from its start, without gaps
/// or overlaps, and every chunk has positive length.
pub fn check_contiguity(chunks: &[Chunk], window: Window) -> Result<()> {
    let mut expected = window.start;
    for chunk in chunks {
        if chunk.start != expected {
            return Err(ScheduleError::Discontiguous {
                expected,
                found: chunk.start,
            });
        }
        if chunk.end <= chunk.start {
            return Err(ScheduleError::ChunkTooShort {
                minutes: chunk.start.minutes_until(chunk.end),
                min: 1,
            });
        }
        if chunk.end > window.end {
            return Err(ScheduleError::OutsideWindow {
                start: chunk.start,
                end: chunk.end,
                window_start: window.start,
                window_end: window.end,
            });
        }
        expected = chunk.end;
    }
    Ok(())
}

/// Uncovered stretches between consecutive chunks (manual edits and resizes can
/// leave these behind).
pub fn gaps(chunks: &[Chunk]) -> Vec<(TimeOfDay, TimeOfDay)> {
    chunks
        .windows(2)
        .filter(|pair| pair[0].end < pair[1].start)
        .map(|pair| (pair[0].end, pair[1].start))
        .collect()
}
