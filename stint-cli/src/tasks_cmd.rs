use anyhow::{bail, Result};
use clap::Subcommand;

use stint_core::{Priority, Task};

use crate::state::{read_tasks, write_tasks};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,

        /// Estimated total minutes of work
        #[arg(long, default_value_t = 60)]
        minutes: u32,

        /// high | medium | low
        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Chunk size override in minutes
        #[arg(long)]
        chunk: Option<u32>,

        /// Nag interval override in minutes (0 disables)
        #[arg(long)]
        nag: Option<u32>,

        /// Explicit id (default: next free tN)
        #[arg(long)]
        id: Option<String>,
    },

    /// List tasks with progress
    List,

    /// Remove a task
    Remove { id: String },
}

pub fn run(cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            minutes,
            priority,
            chunk,
            nag,
            id,
        } => add(title, minutes, priority, chunk, nag, id),
        TaskCommand::List => list(),
        TaskCommand::Remove { id } => remove(&id),
    }
}

fn next_id(tasks: &[Task]) -> String {
    let max = tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix('t').and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    format!("t{}", max + 1)
}

fn add(
    title: String,
    minutes: u32,
    priority: Priority,
    chunk: Option<u32>,
    nag: Option<u32>,
    id: Option<String>,
) -> Result<()> {
    let mut tasks = read_tasks()?;
    let id = id.unwrap_or_else(|| next_id(&tasks));
    if tasks.iter().any(|t| t.id == id) {
        bail!("task id already exists: {id}");
    }

    let mut task = Task::new(id, title)
        .with_estimate(minutes)
        .with_priority(priority);
    task.chunk_minutes = chunk;
    task.nag_interval_minutes = nag;
    task.validate()?;

    println!("Added {} ({} min, {})", task.id, task.estimated_minutes, task.priority);
    tasks.push(task);
    write_tasks(&tasks)
}

fn list() -> Result<()> {
    let tasks = read_tasks()?;
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for t in &tasks {
        println!(
            "{:<6} [{:<6}] {:>4}/{:<4} min {:>3.0}%  {}",
            t.id,
            t.priority,
            t.completed_minutes,
            t.estimated_minutes,
            t.completion_ratio() * 100.0,
            t.title
        );
    }
    Ok(())
}

fn remove(id: &str) -> Result<()> {
    let mut tasks = read_tasks()?;
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == before {
        bail!("no task with id {id}");
    }
    write_tasks(&tasks)?;
    println!("Removed {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_skips_past_highest_numeric_id() {
        let tasks = vec![Task::new("t2", "a"), Task::new("custom", "b"), Task::new("t7", "c")];
        assert_eq!(next_id(&tasks), "t8");
        assert_eq!(next_id(&[]), "t1");
    }
}
