//! Property checks over random task sets and edit sequences.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use stint_core::{
    allocate, check_contiguity, complete_chunk, delete_chunk, move_chunk, resize_chunk,
    AllocationDefaults, Break, Chunk, DropTarget, Edge, Priority, Schedule, ScheduleRequest,
    Task, TimeOfDay, Window,
};

fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

fn task_set() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec((priority(), 1u32..240, 0u32..240, prop::option::of(5u32..60)), 0..6).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (p, estimate, done, chunk))| {
                    let mut t = Task::new(format!("t{i}"), format!("Task {i}"))
                        .with_priority(p)
                        .with_estimate(estimate)
                        .with_completed(done.min(estimate));
                    t.chunk_minutes = chunk;
                    t
                })
                .collect()
        },
    )
}

fn window() -> impl Strategy<Value = Window> {
    (360u32..720, 0u32..600).prop_map(|(start, len)| {
        let start = TimeOfDay::from_minutes(start).unwrap();
        Window::new(start, start.add_minutes(len)).unwrap()
    })
}

fn breaks_in(w: Window) -> impl Strategy<Value = Vec<Break>> {
    let span = w.length_minutes().max(1);
    prop::collection::vec((0..span, 1u32..45), 0..3).prop_map(move |raw| {
        raw.into_iter()
            .map(|(offset, minutes)| Break::new(w.start.add_minutes(offset), minutes))
            .collect()
    })
}

fn scenario() -> impl Strategy<Value = (Vec<Task>, Window, Vec<Break>, u32)> {
    (task_set(), window(), 5u32..60).prop_flat_map(|(tasks, w, chunk)| {
        breaks_in(w).prop_map(move |b| (tasks.clone(), w, b, chunk))
    })
}

fn defaults(chunk: u32) -> AllocationDefaults {
    AllocationDefaults {
        chunk_minutes: chunk,
        nag_interval_minutes: 10,
    }
}

fn shape(chunks: &[Chunk]) -> Vec<(Option<String>, TimeOfDay, TimeOfDay, u32)> {
    chunks
        .iter()
        .map(|c| (c.task_id().map(str::to_string), c.start, c.end, c.nag_interval_minutes))
        .collect()
}

fn assert_in_bounds(chunks: &[Chunk], w: Window) {
    for c in chunks {
        assert!(c.start < c.end, "non-positive chunk {c:?}");
        assert!(w.start <= c.start && c.end <= w.end, "chunk {c:?} outside {w:?}");
    }
    for pair in chunks.windows(2) {
        assert!(pair[0].end <= pair[1].start, "overlap {pair:?}");
    }
}

proptest! {
    #[test]
    fn allocation_is_contiguous_and_bounded((tasks, w, breaks, chunk) in scenario()) {
        let chunks = allocate(&tasks, w, &breaks, defaults(chunk));
        prop_assert!(check_contiguity(&chunks, w).is_ok());
        assert_in_bounds(&chunks, w);
    }

    #[test]
    fn allocation_is_deterministic((tasks, w, breaks, chunk) in scenario()) {
        let a = allocate(&tasks, w, &breaks, defaults(chunk));
        let b = allocate(&tasks, w, &breaks, defaults(chunk));
        prop_assert_eq!(shape(&a), shape(&b));
    }

    #[test]
    fn allocation_never_exceeds_remaining_time((tasks, w, breaks, chunk) in scenario()) {
        let chunks = allocate(&tasks, w, &breaks, defaults(chunk));
        let mut per_task: HashMap<&str, u32> = HashMap::new();
        for c in &chunks {
            if let Some(id) = c.task_id() {
                *per_task.entry(id).or_default() += c.duration_minutes();
            }
        }
        for t in &tasks {
            let planned = per_task.get(t.id.as_str()).copied().unwrap_or(0);
            prop_assert!(planned <= t.remaining_minutes());
        }
    }

    #[test]
    fn structural_edits_keep_contiguity(
        (tasks, w, breaks, chunk) in scenario(),
        picks in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>(), any::<bool>()), 1..6),
    ) {
        let mut chunks = allocate(&tasks, w, &breaks, defaults(chunk));
        for (which, target, delete) in picks {
            if chunks.is_empty() {
                break;
            }
            let id = chunks[which.index(chunks.len())].id.clone();
            chunks = if delete {
                delete_chunk(&chunks, w, &id).unwrap()
            } else {
                let target = chunks[target.index(chunks.len())].id.clone();
                move_chunk(&chunks, w, &id, &DropTarget::BeforeChunk(target)).unwrap()
            };
            prop_assert!(check_contiguity(&chunks, w).is_ok());
        }
    }

    #[test]
    fn resizes_never_overlap_or_escape_window(
        (tasks, w, breaks, chunk) in scenario(),
        drags in prop::collection::vec((any::<prop::sample::Index>(), any::<bool>(), 0u32..1440), 1..8),
    ) {
        let mut chunks = allocate(&tasks, w, &breaks, defaults(chunk));
        for (which, start_edge, minute) in drags {
            if chunks.is_empty() {
                break;
            }
            let id = chunks[which.index(chunks.len())].id.clone();
            let edge = if start_edge { Edge::Start } else { Edge::End };
            let to = TimeOfDay::from_minutes(minute).unwrap();
            let before = chunks.clone();
            chunks = resize_chunk(&chunks, w, &id, edge, to).unwrap();
            assert_in_bounds(&chunks, w);
            // Only the dragged chunk and its next neighbour may change.
            let idx = chunks.iter().position(|c| c.id == id).unwrap();
            // The dragged edge follows the pointer or stays put.
            let (old_edge, new_edge) = match edge {
                Edge::Start => (before[idx].start, chunks[idx].start),
                Edge::End => (before[idx].end, chunks[idx].end),
            };
            if to >= old_edge {
                prop_assert!(new_edge >= old_edge && new_edge <= to);
            } else {
                prop_assert!(new_edge <= old_edge && new_edge >= to);
            }
            for (i, (old, new)) in before.iter().zip(&chunks).enumerate() {
                if i != idx && i != idx + 1 {
                    prop_assert_eq!(old, new);
                }
            }
        }
    }

    #[test]
    fn completion_never_overcredits(
        tasks in task_set(),
        minutes in prop::collection::vec(0u32..1440, 1..10),
    ) {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let w = Window::parse("08:00", "18:00").unwrap();
        let req = ScheduleRequest::new(day, w).with_defaults(defaults(25));
        let mut schedule = Schedule::generate(req, &tasks).unwrap();
        let mut tasks = tasks;
        let ids: Vec<String> = schedule.chunks.iter().map(|c| c.id.clone()).collect();
        for (id, minute) in ids.iter().zip(minutes.iter().cycle()) {
            let now = TimeOfDay::from_minutes(*minute).unwrap().on(day);
            complete_chunk(&mut schedule, &mut tasks, id, now).unwrap();
            complete_chunk(&mut schedule, &mut tasks, id, now).unwrap();
            for t in &tasks {
                prop_assert!(t.completed_minutes <= t.estimated_minutes);
            }
        }
    }
}
