//! Schedule: a chunk sequence bound to a window on one calendar day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::allocator::{allocate, validate_breaks, AllocationDefaults};
use crate::chunk::Chunk;
use crate::error::{Result, ScheduleError};
use crate::task::{Break, Task};
use crate::time::{TimeOfDay, Window};
use crate::timeline::{self, ChunkEdit, DropTarget, Edge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Active,
    Completed,
    /// Ended early by the user.
    Abandoned,
}

/// Inputs for a fresh schedule.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub date: NaiveDate,
    pub window: Window,
    pub breaks: Vec<Break>,
    pub defaults: AllocationDefaults,
}

impl ScheduleRequest {
    pub fn new(date: NaiveDate, window: Window) -> Self {
        Self {
            date,
            window,
            breaks: Vec::new(),
            defaults: AllocationDefaults::default(),
        }
    }

    pub fn with_breaks(mut self, breaks: Vec<Break>) -> Self {
        self.breaks = breaks;
        self
    }

    pub fn with_defaults(mut self, defaults: AllocationDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub date: NaiveDate,
    pub window: Window,
    pub breaks: Vec<Break>,
    pub default_chunk_minutes: u32,
    pub default_nag_minutes: u32,
    pub status: ScheduleStatus,
    pub chunks: Vec<Chunk>,
}

/// Per-task totals across a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTotals {
    pub title: String,
    pub planned_minutes: u32,
    pub completed_chunk_minutes: u32,
    pub chunks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub task_minutes: u32,
    pub break_minutes: u32,
    pub uncovered_minutes: u32,
    /// Keyed by task id.
    pub per_task: BTreeMap<String, TaskTotals>,
}

impl Schedule {
    pub fn generate(request: ScheduleRequest, tasks: &[Task]) -> Result<Self> {
        validate_breaks(request.window, &request.breaks)?;
        for task in tasks {
            task.validate()?;
        }

        let chunks = allocate(tasks, request.window, &request.breaks, request.defaults);
        info!(
            date = %request.date,
            start = %request.window.start,
            end = %request.window.end,
            chunks = chunks.len(),
            "generated schedule"
        );

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date: request.date,
            window: request.window,
            breaks: request.breaks,
            default_chunk_minutes: request.defaults.chunk_minutes,
            default_nag_minutes: request.defaults.nag_interval_minutes,
            status: ScheduleStatus::Active,
            chunks,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == ScheduleStatus::Active
    }

    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.id == id)
    }

    /// Resolve a full id or a unique prefix of one.
    pub fn resolve_chunk_id(&self, needle: &str) -> Result<String> {
        if self.chunk(needle).is_some() {
            return Ok(needle.to_string());
        }
        let mut matches = self.chunks.iter().filter(|c| c.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(c), None) if !needle.is_empty() => Ok(c.id.clone()),
            _ => Err(ScheduleError::UnknownChunk(needle.to_string())),
        }
    }

    pub fn move_chunk(&mut self, id: &str, target: &DropTarget) -> Result<()> {
        self.ensure_active()?;
        self.chunks = timeline::move_chunk(&self.chunks, self.window, id, target)?;
        Ok(())
    }

    pub fn resize_chunk(&mut self, id: &str, edge: Edge, to: TimeOfDay) -> Result<()> {
        self.ensure_active()?;
        self.chunks = timeline::resize_chunk(&self.chunks, self.window, id, edge, to)?;
        Ok(())
    }

    pub fn delete_chunk(&mut self, id: &str) -> Result<()> {
        self.ensure_active()?;
        self.chunks = timeline::delete_chunk(&self.chunks, self.window, id)?;
        Ok(())
    }

    pub fn edit_chunk(&mut self, id: &str, edit: ChunkEdit<'_>) -> Result<()> {
        self.ensure_active()?;
        self.chunks = timeline::edit_chunk(&self.chunks, self.window, id, edit)?;
        Ok(())
    }

    /// End the schedule early. No invariant is enforced afterwards.
    pub fn abandon(&mut self) {
        if self.is_active() {
            info!(schedule = %self.id, "schedule abandoned");
            self.status = ScheduleStatus::Abandoned;
        }
    }

    /// Flip to completed once every chunk is done. Returns whether it flipped.
    pub(crate) fn settle_status(&mut self) -> bool {
        if self.is_active() && !self.chunks.is_empty() && self.chunks.iter().all(|c| c.completed) {
            info!(schedule = %self.id, "all chunks completed");
            self.status = ScheduleStatus::Completed;
            return true;
        }
        false
    }

    /// The chunk whose `[start, end)` covers `now` on the schedule's day.
    pub fn current_chunk(&self, now: NaiveDateTime) -> Option<&Chunk> {
        if now.date() != self.date {
            return None;
        }
        let at = TimeOfDay::from_datetime(now);
        self.chunks.iter().find(|c| c.covers(at))
    }

    /// The pending chunk that should own reminders right now: the one in
    /// progress, else the next one to start.
    pub fn next_pending_chunk(&self, now: NaiveDateTime) -> Option<&Chunk> {
        if !self.is_active() {
            return None;
        }
        self.chunks
            .iter()
            .filter(|c| !c.completed)
            .filter(|c| c.end.on(self.date) > now)
            .min_by_key(|c| c.start)
    }

    pub fn summary(&self) -> ScheduleSummary {
        let mut summary = ScheduleSummary {
            total_chunks: self.chunks.len(),
            ..ScheduleSummary::default()
        };

        for chunk in &self.chunks {
            let minutes = chunk.duration_minutes();
            if chunk.completed {
                summary.completed_chunks += 1;
            }
            match chunk.task_id() {
                Some(task_id) => {
                    summary.task_minutes += minutes;
                    let totals = summary.per_task.entry(task_id.to_string()).or_default();
                    if totals.title.is_empty() {
                        totals.title = chunk.title().to_string();
                    }
                    totals.planned_minutes += minutes;
                    totals.chunks += 1;
                    if chunk.completed {
                        totals.completed_chunk_minutes += minutes;
                    }
                }
                None => summary.break_minutes += minutes,
            }
        }

        let covered = summary.task_minutes + summary.break_minutes;
        summary.uncovered_minutes = self.window.length_minutes().saturating_sub(covered);
        debug!(schedule = %self.id, ?summary, "summary");
        summary
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ScheduleError::NotActive)
        }
    }
}
