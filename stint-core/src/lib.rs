//! stint-core: chunked day scheduling.
//!
//! - `allocator` turns tasks + a time window + breaks into a chunk sequence
//! - `timeline` keeps that sequence consistent under move/resize/delete/edit
//! - `progress` closes chunks and credits worked time back to tasks
//! - `nag` and `reminders` compute and own the reminder timeline of the active chunk
//!
//! Everything here is synchronous and free of I/O.

pub mod error;
pub mod time;
pub mod task;
pub mod chunk;
pub mod allocator;
pub mod timeline;
pub mod schedule;
pub mod progress;
pub mod nag;
pub mod reminders;

pub use error::{Result, ScheduleError};
pub use time::{TimeOfDay, Window, MINUTES_PER_DAY};
pub use task::{Break, Priority, Task};
pub use chunk::{Chunk, ChunkKind, ChunkState};
pub use allocator::{allocate, validate_breaks, AllocationDefaults};
pub use timeline::{
    check_contiguity, delete_chunk, edit_chunk, move_chunk, reflow, resize_chunk, ChunkEdit,
    DropTarget, Edge, MIN_CHUNK_MINUTES,
};
pub use schedule::{Schedule, ScheduleRequest, ScheduleStatus, ScheduleSummary, TaskTotals};
pub use progress::{complete_chunk, Completion};
pub use nag::{
    compute_nag_schedule, render_message, MessageChooser, MessageTier, NagEvent, NagEventKind,
    NagSchedule, RandomChooser,
};
pub use reminders::ReminderSession;
