//! Reminder dispatch: the host-side timer loop around `ReminderSession`.

use anyhow::{bail, Result};
use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tracing::{debug, info};

use stint_core::{
    compute_nag_schedule, render_message, Chunk, MessageChooser, NagEvent, NagEventKind,
    RandomChooser, ReminderSession, Schedule,
};

use crate::config::Config;
use crate::state::read_schedule;
use crate::timeline_cmd::short_id;
use crate::{load_schedule, resolve_now};

/// `stint nag`: print what would fire, without waiting.
pub fn print_nag(chunk: Option<String>, at: Option<String>) -> Result<()> {
    let schedule = load_schedule()?;
    let now = resolve_now(at.as_deref(), schedule.date)?;

    let chunk = match chunk {
        Some(needle) => {
            let id = schedule.resolve_chunk_id(&needle)?;
            schedule.chunk(&id).cloned()
        }
        None => schedule.next_pending_chunk(now).cloned(),
    };
    let Some(chunk) = chunk else {
        println!("No pending chunk at {}.", now.format("%H:%M"));
        return Ok(());
    };

    let plan = compute_nag_schedule(&chunk, schedule.date, now);
    println!(
        "{} {}-{} \"{}\" (nag every {} min)",
        short_id(&chunk.id),
        chunk.start,
        chunk.end,
        chunk.title(),
        chunk.nag_interval_minutes
    );
    if plan.in_progress && plan.end_event.is_some() {
        println!("  now    in progress");
    }
    if plan.is_empty() {
        println!("  (chunk is over; nothing to schedule)");
        return Ok(());
    }

    let mut chooser = RandomChooser;
    for event in plan.events() {
        println!("  {}  {:<5}  {}", event.at.format("%H:%M"), label(&event), render_message(&event, &chunk, &mut chooser));
    }
    if let Some(next) = &plan.next_event {
        println!("\nNext: {} at {}", label(next), next.at.format("%H:%M"));
    }
    Ok(())
}

fn label(event: &NagEvent) -> String {
    match event.kind {
        NagEventKind::Start => "start".to_string(),
        NagEventKind::End => "end".to_string(),
        NagEventKind::Nag { progress, .. } => format!("{:.0}%", progress * 100.0),
    }
}

fn notify(event: &NagEvent, chunk: &Chunk, chooser: &mut impl MessageChooser) {
    println!("[{}] {}", event.at.format("%H:%M"), render_message(event, chunk, chooser));
}

/// Re-target the session at the chunk that should own reminders now.
/// Returns false once there is nothing left to watch.
fn retarget(session: &mut ReminderSession, schedule: &Schedule, now: NaiveDateTime) -> bool {
    if !schedule.is_active() {
        session.stop();
        return false;
    }
    match schedule.next_pending_chunk(now) {
        Some(chunk) if session.active_chunk() == Some(chunk.id.as_str()) => true,
        Some(chunk) => {
            let plan = session.start(chunk, schedule.date, now);
            debug!(chunk = %chunk.id, generation = session.generation(), "reminders re-targeted");
            if plan.in_progress {
                println!("[{}] In progress: {}", now.format("%H:%M"), chunk.title());
            }
            true
        }
        None => {
            session.stop();
            false
        }
    }
}

/// `stint watch`: sleep until the next reminder, print it, repeat.
///
/// The schedule file is re-read every tick so edits from another shell move the
/// session to the right chunk; the session itself guarantees only one chunk's
/// reminders are ever live.
pub async fn run(cfg: &Config) -> Result<()> {
    if !cfg.reminders.enabled {
        bail!("reminders are disabled in config ([reminders] enabled = false)");
    }
    let poll = Duration::from_secs(cfg.reminders.poll_seconds.max(1));

    let mut session = ReminderSession::new();
    let mut chooser = RandomChooser;
    info!("watching schedule; Ctrl-C to stop");

    loop {
        let now = Local::now().naive_local();
        let Some(schedule) = read_schedule()? else {
            bail!("No schedule yet. Run: stint plan");
        };

        // Fire what is due before re-targeting, so a chunk's end notice is not
        // dropped when the next chunk takes over at the same minute.
        for event in session.take_due(now) {
            if let Some(chunk) = schedule.chunk(&event.chunk_id) {
                notify(&event, chunk, &mut chooser);
            }
        }

        if !retarget(&mut session, &schedule, now) {
            info!("no pending chunks left; stopping");
            return Ok(());
        }

        let wait = session
            .next_due()
            .and_then(|e| (e.at - now).to_std().ok())
            .unwrap_or(poll)
            .min(poll);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                session.stop();
                info!("stopped");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stint_core::{AllocationDefaults, ScheduleRequest, Task, TimeOfDay, Window};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        TimeOfDay::parse(s).unwrap().on(day())
    }

    fn schedule() -> Schedule {
        let tasks = vec![Task::new("a", "A").with_estimate(60)];
        let req = ScheduleRequest::new(day(), Window::parse("09:00", "10:00").unwrap()).with_defaults(
            AllocationDefaults {
                chunk_minutes: 30,
                nag_interval_minutes: 10,
            },
        );
        Schedule::generate(req, &tasks).unwrap()
    }

    #[test]
    fn retarget_follows_the_next_pending_chunk() {
        let mut s = schedule();
        let mut session = ReminderSession::new();

        assert!(retarget(&mut session, &s, at("08:55")));
        assert_eq!(session.active_chunk(), Some(s.chunks[0].id.as_str()));

        // Same chunk: the session is left alone.
        let g = session.generation();
        assert!(retarget(&mut session, &s, at("09:05")));
        assert_eq!(session.generation(), g);

        s.chunks[0].completed = true;
        assert!(retarget(&mut session, &s, at("09:10")));
        assert_eq!(session.active_chunk(), Some(s.chunks[1].id.as_str()));
    }

    #[test]
    fn retarget_stops_when_schedule_ends() {
        let mut s = schedule();
        let mut session = ReminderSession::new();
        assert!(retarget(&mut session, &s, at("09:00")));
        s.abandon();
        assert!(!retarget(&mut session, &s, at("09:01")));
        assert!(!session.is_active());
    }

    #[test]
    fn nag_labels() {
        let s = schedule();
        let plan = compute_nag_schedule(&s.chunks[0], s.date, at("08:00"));
        let labels: Vec<String> = plan.events().iter().map(label).collect();
        assert_eq!(labels, vec!["start", "33%", "67%", "end"]);
    }
}
