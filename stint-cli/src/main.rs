use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stint_core::{Break, Schedule, ScheduleRequest, TimeOfDay, Window};

mod config;
mod state;
mod tasks_cmd;
mod timeline_cmd;
mod watch;

#[derive(Parser, Debug)]
#[command(
    name = "stint",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STINT_BUILD_SHA"), ")"),
    about = "Chunked day planner with nag reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.stint/config.toml
    Init,

    /// Manage the task list
    Task {
        #[command(subcommand)]
        command: tasks_cmd::TaskCommand,
    },

    /// Allocate today's window into chunks (replaces the current schedule)
    Plan {
        /// Window start, HH:MM (default from config)
        #[arg(long)]
        start: Option<String>,

        /// Window end, HH:MM (default from config)
        #[arg(long)]
        end: Option<String>,

        /// Fixed break as HH:MM=MINUTES, repeatable
        #[arg(long = "break", value_name = "HH:MM=MIN")]
        breaks: Vec<String>,

        /// Default chunk size in minutes
        #[arg(long)]
        chunk: Option<u32>,

        /// Default nag interval in minutes (0 disables)
        #[arg(long)]
        nag: Option<u32>,

        /// Calendar day, YYYY-MM-DD (default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the current schedule
    Show,

    #[command(flatten)]
    Timeline(timeline_cmd::TimelineCommand),

    /// Print the reminder timeline for a chunk (default: current or next pending)
    Nag {
        chunk: Option<String>,

        /// Pretend the time is HH:MM (or "YYYY-MM-DD HH:MM")
        #[arg(long)]
        at: Option<String>,
    },

    /// Stay in the foreground and print reminders as they come due
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stint=info,stint_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => config::init_config()?,
        Command::Task { command } => tasks_cmd::run(command)?,
        Command::Plan {
            start,
            end,
            breaks,
            chunk,
            nag,
            date,
        } => plan(start, end, breaks, chunk, nag, date)?,
        Command::Show => timeline_cmd::show()?,
        Command::Timeline(command) => timeline_cmd::run(command)?,
        Command::Nag { chunk, at } => watch::print_nag(chunk, at)?,
        Command::Watch => {
            let cfg = config::load_config()?;
            watch::run(&cfg).await?;
        }
    }

    Ok(())
}

fn plan(
    start: Option<String>,
    end: Option<String>,
    breaks: Vec<String>,
    chunk: Option<u32>,
    nag: Option<u32>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let cfg = config::load_config()?;

    let window = match (start, end) {
        (None, None) => cfg.schedule.window()?,
        (start, end) => {
            let start = match start {
                Some(s) => TimeOfDay::parse(&s)?,
                None => cfg.schedule.window_start,
            };
            let end = match end {
                Some(s) => TimeOfDay::parse(&s)?,
                None => cfg.schedule.window_end,
            };
            Window::new(start, end)?
        }
    };

    let breaks = breaks
        .iter()
        .map(|b| Break::parse_spec(b).with_context(|| format!("--break {b}")))
        .collect::<Result<Vec<_>>>()?;

    let mut defaults = cfg.schedule.defaults();
    if let Some(minutes) = chunk {
        defaults.chunk_minutes = minutes;
    }
    if let Some(minutes) = nag {
        defaults.nag_interval_minutes = minutes;
    }
    if defaults.chunk_minutes == 0 {
        bail!("chunk size must be at least 1 minute");
    }

    let tasks = state::read_tasks()?;
    if !tasks.iter().any(|t| t.is_available()) {
        println!("No tasks with remaining time. Add one with: stint task add <title> --minutes N");
    }

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let request = ScheduleRequest::new(date, window)
        .with_breaks(breaks)
        .with_defaults(defaults);
    let schedule = Schedule::generate(request, &tasks)?;
    state::write_schedule(&schedule)?;

    timeline_cmd::print_schedule(&schedule);
    Ok(())
}

/// Wall-clock now, or an override: "HH:MM" on `date`, or "YYYY-MM-DD HH:MM".
pub(crate) fn resolve_now(at: Option<&str>, date: NaiveDate) -> Result<NaiveDateTime> {
    let Some(at) = at else {
        return Ok(Local::now().naive_local());
    };
    if let Ok(dt) = NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    let t = TimeOfDay::parse(at).with_context(|| format!("--at {at}"))?;
    Ok(t.on(date))
}

pub(crate) fn load_schedule() -> Result<Schedule> {
    match state::read_schedule()? {
        Some(s) => Ok(s),
        None => bail!("No schedule yet. Run: stint plan"),
    }
}
