//! Nag timer: the reminder timeline for one chunk.
//!
//! Nothing here fires. `compute_nag_schedule` returns every future
//! notification timestamp and the caller's timer facility dispatches them.
//! Nag boundaries are anchored on the chunk start, so a late computation does
//! not drift them.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageTier {
    /// < 25%
    Starting,
    /// 25% - 50%
    Underway,
    /// 50% - 75%
    Halfway,
    /// >= 75%
    Closing,
}

impl MessageTier {
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.25 {
            MessageTier::Starting
        } else if progress < 0.5 {
            MessageTier::Underway
        } else if progress < 0.75 {
            MessageTier::Halfway
        } else {
            MessageTier::Closing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NagEventKind {
    Start,
    Nag { progress: f64, tier: MessageTier },
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NagEvent {
    pub chunk_id: String,
    pub at: NaiveDateTime,
    #[serde(flatten)]
    pub kind: NagEventKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NagSchedule {
    /// The chunk had already begun when computed (an immediate "in progress"
    /// notice is implied).
    pub in_progress: bool,
    pub start_event: Option<NagEvent>,
    pub nag_events: Vec<NagEvent>,
    pub end_event: Option<NagEvent>,
    pub next_event: Option<NagEvent>,
}

impl NagSchedule {
    /// All events in firing order.
    pub fn events(&self) -> Vec<NagEvent> {
        let mut out: Vec<NagEvent> = self
            .start_event
            .iter()
            .chain(self.nag_events.iter())
            .chain(self.end_event.iter())
            .cloned()
            .collect();
        out.sort_by_key(|e| e.at);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.start_event.is_none() && self.nag_events.is_empty() && self.end_event.is_none()
    }
}

pub fn compute_nag_schedule(chunk: &Chunk, date: NaiveDate, now: NaiveDateTime) -> NagSchedule {
    let start = chunk.start.on(date);
    let end = chunk.end.on(date);

    if now > end {
        return NagSchedule::default();
    }

    let mut schedule = NagSchedule {
        in_progress: start <= now,
        ..NagSchedule::default()
    };

    if now < start {
        schedule.start_event = Some(event(chunk, start, NagEventKind::Start));
    }

    let interval = chunk.nag_interval_minutes;
    let total = (end - start).num_seconds();
    if interval > 0 && chunk.is_task() && total > 0 {
        let step = Duration::minutes(i64::from(interval));
        let mut boundary = start + step;
        while boundary < end {
            if boundary > now {
                let progress = (boundary - start).num_seconds() as f64 / total as f64;
                let kind = NagEventKind::Nag {
                    progress,
                    tier: MessageTier::from_progress(progress),
                };
                schedule.nag_events.push(event(chunk, boundary, kind));
            }
            boundary += step;
        }
    }

    if end > now {
        schedule.end_event = Some(event(chunk, end, NagEventKind::End));
    }

    schedule.next_event = schedule.events().into_iter().find(|e| e.at > now);
    schedule
}

fn event(chunk: &Chunk, at: NaiveDateTime, kind: NagEventKind) -> NagEvent {
    NagEvent {
        chunk_id: chunk.id.clone(),
        at,
        kind,
    }
}

/// Picks one of `len` message variants.
pub trait MessageChooser {
    fn choose(&mut self, len: usize) -> usize;
}

/// Uniform pick from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChooser;

impl MessageChooser for RandomChooser {
    fn choose(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

impl<F: FnMut(usize) -> usize> MessageChooser for F {
    fn choose(&mut self, len: usize) -> usize {
        self(len)
    }
}

const START_MESSAGES: &[&str] = &[
    "Time to start: {title}",
    "Up next, {title}. Let's go.",
    "{title} starts now.",
];

const STARTING_MESSAGES: &[&str] = &[
    "Settling in on {title}?",
    "Early days on {title}. Keep the momentum.",
    "Just getting going with {title}.",
];

const UNDERWAY_MESSAGES: &[&str] = &[
    "A quarter through {title}. Still on it?",
    "{title} is underway. Stay with it.",
    "Making progress on {title}?",
];

const HALFWAY_MESSAGES: &[&str] = &[
    "Halfway through {title}.",
    "Past the midpoint of {title}. Keep going.",
    "More done than left on {title}.",
];

const CLOSING_MESSAGES: &[&str] = &[
    "Final stretch of {title}.",
    "Almost there with {title}. Wrap it up.",
    "{title} is nearly done.",
];

const END_MESSAGES: &[&str] = &[
    "Time's up for {title}. Mark it done?",
    "{title} has ended.",
    "That's the end of {title}. How did it go?",
];

const BREAK_START_MESSAGES: &[&str] = &["Break time. Step away for a bit.", "Take a breather."];

const BREAK_END_MESSAGES: &[&str] = &["Break's over.", "Back to it."];

fn pool(chunk: &Chunk, kind: &NagEventKind) -> &'static [&'static str] {
    match (chunk.is_task(), kind) {
        (false, NagEventKind::Start) => BREAK_START_MESSAGES,
        (false, NagEventKind::End) => BREAK_END_MESSAGES,
        (_, NagEventKind::Start) => START_MESSAGES,
        (_, NagEventKind::End) => END_MESSAGES,
        (_, NagEventKind::Nag { tier, .. }) => match tier {
            MessageTier::Starting => STARTING_MESSAGES,
            MessageTier::Underway => UNDERWAY_MESSAGES,
            MessageTier::Halfway => HALFWAY_MESSAGES,
            MessageTier::Closing => CLOSING_MESSAGES,
        },
    }
}

/// Notification text for an event. Cosmetic; the variant is up to `chooser`.
pub fn render_message(event: &NagEvent, chunk: &Chunk, chooser: &mut impl MessageChooser) -> String {
    let variants = pool(chunk, &event.kind);
    let idx = chooser.choose(variants.len()).min(variants.len() - 1);
    variants[idx].replace("{title}", chunk.title())
}
