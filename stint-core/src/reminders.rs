//! Reminder session: the single live set of nag events.
//!
//! Only one chunk may have reminders scheduled at a time. The session is an
//! owned value held by whoever manages the active schedule; starting it for a
//! chunk replaces whatever was scheduled before.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::chunk::Chunk;
use crate::nag::{compute_nag_schedule, NagEvent, NagSchedule};

#[derive(Debug, Default)]
pub struct ReminderSession {
    chunk_id: Option<String>,
    /// Remaining events, earliest first.
    queue: Vec<NagEvent>,
    /// Bumped on every start/stop so an async dispatcher can tell its pending
    /// timer has been superseded.
    generation: u64,
}

impl ReminderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any previous chunk's events and schedule this chunk's.
    pub fn start(&mut self, chunk: &Chunk, date: NaiveDate, now: NaiveDateTime) -> NagSchedule {
        self.stop();
        let schedule = compute_nag_schedule(chunk, date, now);
        self.chunk_id = Some(chunk.id.clone());
        self.queue = schedule.events();
        debug!(
            chunk = %chunk.id,
            events = self.queue.len(),
            generation = self.generation,
            "reminder session started"
        );
        schedule
    }

    /// Cancel everything. Calling it on an idle session is a no-op.
    pub fn stop(&mut self) {
        if self.chunk_id.is_none() && self.queue.is_empty() {
            return;
        }
        debug!(chunk = ?self.chunk_id, dropped = self.queue.len(), "reminder session stopped");
        self.chunk_id = None;
        self.queue.clear();
        self.generation += 1;
    }

    pub fn active_chunk(&self) -> Option<&str> {
        self.chunk_id.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.chunk_id.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> &[NagEvent] {
        &self.queue
    }

    pub fn next_due(&self) -> Option<&NagEvent> {
        self.queue.first()
    }

    /// Drain events whose time has arrived. The session goes idle once its last
    /// event has been handed out.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Vec<NagEvent> {
        let split = self.queue.partition_point(|e| e.at <= now);
        let due: Vec<NagEvent> = self.queue.drain(..split).collect();
        if self.queue.is_empty() && self.chunk_id.is_some() && !due.is_empty() {
            self.chunk_id = None;
            self.generation += 1;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nag::NagEventKind;
    use crate::task::Task;
    use crate::time::TimeOfDay;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        t(s).on(day())
    }

    fn chunk(id: &str, start: &str, end: &str) -> Chunk {
        let mut c = Chunk::task(&Task::new("a", "Write"), t(start), t(end), 20);
        c.id = id.to_string();
        c
    }

    #[test]
    fn start_replaces_previous_chunk() {
        let mut session = ReminderSession::new();
        session.start(&chunk("one", "09:00", "10:00"), day(), at("08:00"));
        let g1 = session.generation();
        assert_eq!(session.active_chunk(), Some("one"));

        session.start(&chunk("two", "10:00", "11:00"), day(), at("08:00"));
        assert_eq!(session.active_chunk(), Some("two"));
        assert!(session.generation() > g1);
        assert!(session.pending().iter().all(|e| e.chunk_id == "two"));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut session = ReminderSession::new();
        session.stop();
        assert_eq!(session.generation(), 0);

        session.start(&chunk("one", "09:00", "10:00"), day(), at("08:00"));
        session.stop();
        let g = session.generation();
        session.stop();
        assert_eq!(session.generation(), g);
        assert!(!session.is_active());
        assert!(session.pending().is_empty());
    }

    #[test]
    fn take_due_drains_in_order() {
        let mut session = ReminderSession::new();
        session.start(&chunk("one", "09:00", "10:00"), day(), at("08:00"));
        // start 09:00, nags 09:20 09:40, end 10:00
        assert_eq!(session.pending().len(), 4);

        let due = session.take_due(at("09:25"));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].kind, NagEventKind::Start);
        assert_eq!(session.next_due().unwrap().at, at("09:40"));

        let rest = session.take_due(at("10:00"));
        assert_eq!(rest.len(), 2);
        assert!(!session.is_active());
        assert!(session.take_due(at("11:00")).is_empty());
    }
}
