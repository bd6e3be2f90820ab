//! Task and break model consumed by the allocator.
//!
//! Tasks are owned by the caller. The allocator only reads them; progress is
//! written back through `crate::progress`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::time::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(ScheduleError::InvalidTask(format!("unknown priority '{other}'"))),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub priority: Priority,

    /// Minutes of work the task needs in total.
    pub estimated_minutes: u32,

    /// Minutes already credited. Never exceeds `estimated_minutes`.
    #[serde(default)]
    pub completed_minutes: u32,

    /// Overrides the schedule's default chunk size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_minutes: Option<u32>,

    /// Overrides the schedule's default nag interval. 0 disables reminders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nag_interval_minutes: Option<u32>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority: Priority::Medium,
            estimated_minutes: 60,
            completed_minutes: 0,
            chunk_minutes: None,
            nag_interval_minutes: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn with_completed(mut self, minutes: u32) -> Self {
        self.completed_minutes = minutes;
        self
    }

    pub fn with_chunk_size(mut self, minutes: u32) -> Self {
        self.chunk_minutes = Some(minutes);
        self
    }

    pub fn with_nag_interval(mut self, minutes: u32) -> Self {
        self.nag_interval_minutes = Some(minutes);
        self
    }

    pub fn remaining_minutes(&self) -> u32 {
        self.estimated_minutes.saturating_sub(self.completed_minutes)
    }

    pub fn is_available(&self) -> bool {
        self.completed_minutes < self.estimated_minutes
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.estimated_minutes == 0 {
            return 0.0;
        }
        f64::from(self.completed_minutes) / f64::from(self.estimated_minutes)
    }

    pub fn effective_chunk_size(&self, default: u32) -> u32 {
        self.chunk_minutes.unwrap_or(default)
    }

    pub fn effective_nag_interval(&self, default: u32) -> u32 {
        self.nag_interval_minutes.unwrap_or(default)
    }

    /// Credit worked minutes, clamped at the estimate. Returns what was credited.
    pub fn record_progress(&mut self, minutes: u32) -> u32 {
        let credited = minutes.min(self.remaining_minutes());
        self.completed_minutes += credited;
        credited
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ScheduleError::InvalidTask("task.id must not be empty".into()));
        }
        if self.title.trim().is_empty() {
            return Err(ScheduleError::InvalidTask(format!("task {} has an empty title", self.id)));
        }
        if self.completed_minutes > self.estimated_minutes {
            return Err(ScheduleError::InvalidTask(format!(
                "task {}: completed minutes ({}) exceed estimate ({})",
                self.id, self.completed_minutes, self.estimated_minutes
            )));
        }
        Ok(())
    }
}

/// A fixed-time pause in the working window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub time_of_day: TimeOfDay,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Break {
    pub fn new(time_of_day: TimeOfDay, duration_minutes: u32) -> Self {
        Self {
            time_of_day,
            duration_minutes,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parse the `HH:MM=MIN` shorthand, e.g. `12:30=45`.
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let (at, minutes) = spec
            .split_once('=')
            .ok_or_else(|| ScheduleError::InvalidTime(spec.to_string()))?;
        let minutes: u32 = minutes
            .trim()
            .parse()
            .map_err(|_| ScheduleError::InvalidTime(spec.to_string()))?;
        Ok(Self::new(TimeOfDay::parse(at)?, minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, vec![Priority::High, Priority::Medium, Priority::Low]);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn record_progress_clamps_at_estimate() {
        let mut t = Task::new("t1", "write report").with_estimate(60).with_completed(50);
        assert_eq!(t.record_progress(25), 10);
        assert_eq!(t.completed_minutes, 60);
        assert!(!t.is_available());
        assert_eq!(t.record_progress(5), 0);
    }

    #[test]
    fn completion_ratio_handles_zero_estimate() {
        let t = Task::new("t1", "empty").with_estimate(0);
        assert_eq!(t.completion_ratio(), 0.0);
        let t = Task::new("t2", "half").with_estimate(90).with_completed(45);
        assert!((t.completion_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn overrides_fall_back_to_defaults() {
        let t = Task::new("t1", "focus").with_chunk_size(45);
        assert_eq!(t.effective_chunk_size(30), 45);
        assert_eq!(t.effective_nag_interval(10), 10);
    }

    #[test]
    fn validate_rejects_overcompleted() {
        let t = Task::new("t1", "x").with_estimate(10).with_completed(20);
        assert!(t.validate().is_err());
        assert!(Task::new("", "x").validate().is_err());
    }

    #[test]
    fn parses_break_shorthand() {
        let b = Break::parse_spec("12:30=45").unwrap();
        assert_eq!(b.time_of_day.to_string(), "12:30");
        assert_eq!(b.duration_minutes, 45);
        assert!(Break::parse_spec("12:30").is_err());
    }
}
