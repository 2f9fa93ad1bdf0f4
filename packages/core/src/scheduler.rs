//! The scheduler.
//!
//! This crate's ancestor ran a four-lane priority scheduler modeled on
//! React's RAIL-guided fiber scheduler: `Immediate`/`High`/`Medium`/`Low`
//! lanes, each drained in order, so urgent input handling could cut ahead of
//! background work. That model assumes a renderer that can yield mid-tree
//! to a host event loop. This core makes the opposite, stricter guarantee:
//! updates apply in the exact order they were scheduled, with no lane ever
//! cutting in front of another, so two effects that each schedule an update
//! are guaranteed to commit in scheduling order. The lane system is dropped
//! rather than generalized; see the design notes for why it doesn't survive
//! the flattening.
//!
//! Re-entrant scheduling - a component whose render schedules a further
//! update to itself - is coalesced: scheduling the same scope twice before
//! it has been flushed enqueues it once. Once it starts rendering again the
//! next flush, a fresh schedule is accepted and will run again in a later
//! pass; an unconditional self-schedule therefore keeps re-queuing rather
//! than looping forever within a single pop, and is instead caught by the
//! flush loop's update-depth guard.

use crate::arena::ScopeId;
use crate::resource::TaskId;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// One unit of work the flush loop can pop and run. A render and a resource
/// poll are both "tasks" in the same sense - ordinary scope updates and
/// resource continuations resuming after a suspension point share the same
/// FIFO queue, so their relative order is exactly scheduling order with no
/// lane ever cutting in front of another.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Job {
    Render(ScopeId),
    PollTask(TaskId),
}

pub(crate) struct Scheduler {
    queue: VecDeque<Job>,
    queued: FxHashSet<Job>,
    /// Bumped every time [`Scheduler::flush_started`] begins a new flush;
    /// exposed so callers can tell whether a given enqueue happened during
    /// the flush currently in progress.
    flush_version: u64,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            queued: FxHashSet::default(),
            flush_version: 0,
        }
    }

    /// Enqueues a re-render of `id` for the next flush. A no-op if `id` is
    /// already queued (§4.1 coalescing).
    pub(crate) fn enqueue(&mut self, id: ScopeId) {
        self.enqueue_job(Job::Render(id));
    }

    /// Enqueues a resource/task poll. A no-op if already queued - a waker
    /// firing twice before the poll runs collapses to one queued poll, the
    /// same coalescing a state write gets.
    pub(crate) fn enqueue_task(&mut self, id: TaskId) {
        self.enqueue_job(Job::PollTask(id));
    }

    fn enqueue_job(&mut self, job: Job) {
        if self.queued.insert(job) {
            self.queue.push_back(job);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Job> {
        let job = self.queue.pop_front()?;
        self.queued.remove(&job);
        Some(job)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn flush_started(&mut self) -> u64 {
        self.flush_version += 1;
        self.flush_version
    }

    pub(crate) fn flush_version(&self) -> u64 {
        self.flush_version
    }
}
