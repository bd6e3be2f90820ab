//! Error type shared by every scheduling operation.

use thiserror::Error;

use crate::time::TimeOfDay;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid time of day '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow { start: TimeOfDay, end: TimeOfDay },

    #[error("break at {at} falls outside the window {start}-{end}")]
    BreakOutsideWindow {
        at: TimeOfDay,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    #[error("chunk must last at least {min} minutes (got {minutes})")]
    ChunkTooShort { minutes: i64, min: u32 },

    #[error("{start}-{end} is outside the schedule window {window_start}-{window_end}")]
    OutsideWindow {
        start: TimeOfDay,
        end: TimeOfDay,
        window_start: TimeOfDay,
        window_end: TimeOfDay,
    },

    #[error("chunks are not contiguous: expected a chunk at {expected}, found {found}")]
    Discontiguous { expected: TimeOfDay, found: TimeOfDay },

    #[error("no chunk with id {0}")]
    UnknownChunk(String),

    #[error("chunks need {needed} minutes but the window only has {available}")]
    WindowOverflow { needed: u32, available: u32 },

    #[error("schedule is no longer active")]
    NotActive,

    #[error("invalid task: {0}")]
    InvalidTask(String),
}

impl ScheduleError {
    /// Validation errors are user-correctable; everything else points at a
    /// stale identifier or a caller bug.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidTime(_)
                | ScheduleError::InvalidWindow { .. }
                | ScheduleError::BreakOutsideWindow { .. }
                | ScheduleError::ChunkTooShort { .. }
                | ScheduleError::OutsideWindow { .. }
                | ScheduleError::InvalidTask(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
