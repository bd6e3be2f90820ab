//! Chunk: the atomic, time-bounded unit of a schedule.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{Break, Priority, Task};
use crate::time::TimeOfDay;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkKind {
    /// Title and priority are snapshotted when the chunk is created, so later
    /// task edits do not rewrite the plan.
    Task {
        task_id: String,
        title: String,
        priority: Priority,
    },
    Break {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl ChunkKind {
    pub fn for_task(task: &Task) -> Self {
        ChunkKind::Task {
            task_id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkState {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    #[serde(flatten)]
    pub kind: ChunkKind,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// 0 means no reminders.
    pub nag_interval_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
}

impl Chunk {
    pub fn task(task: &Task, start: TimeOfDay, end: TimeOfDay, nag_interval_minutes: u32) -> Self {
        Self::with_kind(ChunkKind::for_task(task), start, end, nag_interval_minutes)
    }

    pub fn pause(brk: &Break, start: TimeOfDay, end: TimeOfDay) -> Self {
        let kind = ChunkKind::Break {
            label: brk.label.clone(),
        };
        Self::with_kind(kind, start, end, 0)
    }

    pub fn with_kind(kind: ChunkKind, start: TimeOfDay, end: TimeOfDay, nag_interval_minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            start,
            end,
            nag_interval_minutes,
            completed: false,
            completed_at: None,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    pub fn state(&self) -> ChunkState {
        if self.completed {
            ChunkState::Completed
        } else {
            ChunkState::Pending
        }
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, ChunkKind::Task { .. })
    }

    pub fn task_id(&self) -> Option<&str> {
        match &self.kind {
            ChunkKind::Task { task_id, .. } => Some(task_id),
            ChunkKind::Break { .. } => None,
        }
    }

    pub fn title(&self) -> &str {
        match &self.kind {
            ChunkKind::Task { title, .. } => title,
            ChunkKind::Break { label } => label.as_deref().unwrap_or("Break"),
        }
    }

    /// `[start, end)` contains `t`.
    pub fn covers(&self, t: TimeOfDay) -> bool {
        self.start <= t && t < self.end
    }

    /// Place the chunk at `start`, keeping its duration.
    pub(crate) fn shift_to(&mut self, start: TimeOfDay) {
        let duration = self.duration_minutes();
        self.start = start;
        self.end = start.add_minutes(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn task_chunk_snapshots_task_fields() {
        let mut task = Task::new("t1", "draft essay").with_priority(Priority::High);
        let chunk = Chunk::task(&task, t("09:00"), t("09:30"), 10);
        task.title = "renamed".into();

        assert_eq!(chunk.title(), "draft essay");
        assert_eq!(chunk.task_id(), Some("t1"));
        assert_eq!(chunk.duration_minutes(), 30);
        assert_eq!(chunk.state(), ChunkState::Pending);
    }

    #[test]
    fn shift_preserves_duration() {
        let brk = Break::new(t("12:00"), 20);
        let mut chunk = Chunk::pause(&brk, t("12:00"), t("12:20"));
        chunk.shift_to(t("11:40"));
        assert_eq!((chunk.start, chunk.end), (t("11:40"), t("12:00")));
        assert!(!chunk.is_task());
        assert_eq!(chunk.title(), "Break");
    }

    #[test]
    fn serializes_with_type_tag() {
        let task = Task::new("t1", "x");
        let chunk = Chunk::task(&task, t("09:00"), t("09:30"), 0);
        let v = serde_json::to_value(&chunk).unwrap();
        assert_eq!(v["type"], "task");
        assert_eq!(v["start"], "09:00");
        let back: Chunk = serde_json::from_value(v).unwrap();
        assert_eq!(back, chunk);
    }
}
