use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Subcommand;
use tracing::info;

use stint_core::{
    complete_chunk, timeline::gaps, ChunkEdit, ChunkState, DropTarget, Edge, Schedule, ScheduleStatus,
    TimeOfDay,
};

use crate::state::{read_tasks, write_schedule, write_tasks};
use crate::{load_schedule, resolve_now};

#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    /// Drag a chunk to a new position; the timeline is re-laid from the start
    Move {
        chunk: String,

        /// Insert before this chunk
        #[arg(long, conflicts_with_all = ["at", "end"])]
        before: Option<String>,

        /// Drop on open timeline space at HH:MM
        #[arg(long, conflicts_with = "end")]
        at: Option<String>,

        /// Move to the end
        #[arg(long, default_value_t = false)]
        end: bool,
    },

    /// Drag one edge of a chunk
    Resize {
        chunk: String,

        /// start | end
        #[arg(long)]
        edge: Edge,

        /// New boundary, HH:MM
        #[arg(long)]
        to: String,
    },

    /// Delete a chunk; later chunks shift earlier
    Delete { chunk: String },

    /// Set a chunk's times directly (no re-layout)
    Edit {
        chunk: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,

        /// Nag interval in minutes (0 disables)
        #[arg(long)]
        nag: Option<u32>,

        /// Re-assign to another task id
        #[arg(long)]
        task: Option<String>,
    },

    /// Mark a chunk done and credit the elapsed time to its task
    Complete {
        chunk: String,

        /// Completion time, HH:MM or "YYYY-MM-DD HH:MM" (default now)
        #[arg(long)]
        at: Option<String>,
    },

    /// End the schedule early
    Abandon,
}

pub fn run(cmd: TimelineCommand) -> Result<()> {
    let mut schedule = load_schedule()?;

    match cmd {
        TimelineCommand::Move { chunk, before, at, end } => {
            let id = schedule.resolve_chunk_id(&chunk)?;
            let target = match (before, at, end) {
                (Some(before), _, _) => DropTarget::BeforeChunk(schedule.resolve_chunk_id(&before)?),
                (None, Some(at), _) => DropTarget::AtTime(TimeOfDay::parse(&at)?),
                (None, None, true) => DropTarget::End,
                (None, None, false) => bail!("pass one of --before <chunk>, --at HH:MM or --end"),
            };
            schedule.move_chunk(&id, &target)?;
        }
        TimelineCommand::Resize { chunk, edge, to } => {
            let id = schedule.resolve_chunk_id(&chunk)?;
            schedule.resize_chunk(&id, edge, TimeOfDay::parse(&to)?)?;
        }
        TimelineCommand::Delete { chunk } => {
            let id = schedule.resolve_chunk_id(&chunk)?;
            schedule.delete_chunk(&id)?;
        }
        TimelineCommand::Edit {
            chunk,
            start,
            end,
            nag,
            task,
        } => {
            let id = schedule.resolve_chunk_id(&chunk)?;
            let tasks = read_tasks()?;
            let task = match task {
                Some(task_id) => Some(
                    tasks
                        .iter()
                        .find(|t| t.id == task_id)
                        .with_context(|| format!("no task with id {task_id}"))?,
                ),
                None => None,
            };
            let edit = ChunkEdit {
                start: TimeOfDay::parse(&start)?,
                end: TimeOfDay::parse(&end)?,
                nag_interval_minutes: nag,
                task,
            };
            schedule.edit_chunk(&id, edit)?;
        }
        TimelineCommand::Complete { chunk, at } => {
            let id = schedule.resolve_chunk_id(&chunk)?;
            let now = resolve_now(at.as_deref(), schedule.date)?;
            let mut tasks = read_tasks()?;
            let done = complete_chunk(&mut schedule, &mut tasks, &id, now)?;
            if !done.newly_completed {
                println!("Chunk {} was already completed.", short_id(&id));
                return Ok(());
            }
            write_tasks(&tasks)?;
            if let Some(task_id) = &done.task_id {
                println!(
                    "Completed {} after {} min; credited {} min to {}.",
                    short_id(&id),
                    done.elapsed_minutes,
                    done.credited_minutes,
                    task_id
                );
            }
            if done.schedule_completed {
                println!("Every chunk is done. Schedule complete.");
            }
        }
        TimelineCommand::Abandon => {
            schedule.abandon();
            info!(schedule = %schedule.id, "schedule ended early");
        }
    }

    write_schedule(&schedule)?;
    print_schedule(&schedule);
    Ok(())
}

pub fn show() -> Result<()> {
    let schedule = load_schedule()?;
    print_schedule(&schedule);
    if let Some(current) = schedule.current_chunk(Local::now().naive_local()) {
        println!("Now: {} ({})", current.title(), short_id(&current.id));
    }
    Ok(())
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn print_schedule(schedule: &Schedule) {
    let status = match schedule.status {
        ScheduleStatus::Active => "active",
        ScheduleStatus::Completed => "completed",
        ScheduleStatus::Abandoned => "ended early",
    };
    println!(
        "# {} {}-{} ({})\n",
        schedule.date, schedule.window.start, schedule.window.end, status
    );

    if schedule.chunks.is_empty() {
        println!("(no chunks)");
        return;
    }

    for c in &schedule.chunks {
        let mark = match c.state() {
            ChunkState::Completed => "x",
            ChunkState::Pending => " ",
        };
        let nag = match c.nag_interval_minutes {
            0 => String::new(),
            n => format!("  nag/{n}m"),
        };
        println!(
            "[{mark}] {}  {}-{}  {:>3}m  {}{nag}",
            short_id(&c.id),
            c.start,
            c.end,
            c.duration_minutes(),
            c.title()
        );
    }

    let holes = gaps(&schedule.chunks);
    if !holes.is_empty() {
        let list: Vec<String> = holes.iter().map(|(a, b)| format!("{a}-{b}")).collect();
        println!("\nGaps: {}", list.join(", "));
    }

    let summary = schedule.summary();
    println!(
        "\n{}/{} chunks done | task {}m | break {}m | free {}m",
        summary.completed_chunks,
        summary.total_chunks,
        summary.task_minutes,
        summary.break_minutes,
        summary.uncovered_minutes
    );
}
