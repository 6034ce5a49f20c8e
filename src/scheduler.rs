//! Deferred tasks over a virtual clock.
//!
//! Every timer in the application (feed reconnect, directory poll, toast
//! dismissal, reload after send) is a [`Task`] held here rather than a sleeping
//! thread. Time is a [`Duration`] since the application started; the runtime
//! feeds real elapsed time, tests feed whatever they like.
//!
//! A task kind is pending at most once: scheduling it again supersedes the
//! earlier deadline.

use crate::state::notifications::ToastId;
use std::time::Duration;

/// Work the scheduler can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Re-open the live feed after a transport failure.
    Reconnect,
    /// Periodic session directory refresh.
    DirectoryPoll,
    /// Full reload of the active session after a message was sent.
    ReloadAfterSend,
    /// Remove one toast from the notification queue.
    DismissToast(ToastId),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    task: Task,
    deadline: Duration,
    seq: u64,
}

/// Pending tasks keyed by [`Task`] value.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire `delay` after `now`, replacing any pending
    /// instance of the same task. Returns the deadline.
    pub fn schedule(&mut self, task: Task, delay: Duration, now: Duration) -> Duration {
        self.cancel(task);
        let deadline = now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            task,
            deadline,
            seq,
        });
        deadline
    }

    /// Schedule `task` only if it is not already pending.
    ///
    /// Returns `true` when a new timer was armed.
    pub fn schedule_if_idle(&mut self, task: Task, delay: Duration, now: Duration) -> bool {
        if self.is_pending(task) {
            return false;
        }
        self.schedule(task, delay, now);
        true
    }

    /// Cancel a pending task. Returns `true` if one was removed.
    pub fn cancel(&mut self, task: Task) -> bool {
        let before = self.pending.len();
        self.pending.retain(|scheduled| scheduled.task != task);
        self.pending.len() != before
    }

    /// Whether `task` is waiting to fire.
    pub fn is_pending(&self, task: Task) -> bool {
        self.pending.iter().any(|scheduled| scheduled.task == task)
    }

    /// Deadline of a pending task.
    pub fn deadline(&self, task: Task) -> Option<Duration> {
        self.pending
            .iter()
            .find(|scheduled| scheduled.task == task)
            .map(|scheduled| scheduled.deadline)
    }

    /// Earliest deadline among all pending tasks.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|scheduled| scheduled.deadline).min()
    }

    /// Remove and return every task whose deadline is at or before `now`,
    /// earliest first. Ties fire in scheduling order.
    pub fn due(&mut self, now: Duration) -> Vec<Task> {
        let (mut fired, waiting): (Vec<Scheduled>, Vec<Scheduled>) = self
            .pending
            .drain(..)
            .partition(|scheduled| scheduled.deadline <= now);
        self.pending = waiting;

        fired.sort_by_key(|scheduled| (scheduled.deadline, scheduled.seq));
        fired.into_iter().map(|scheduled| scheduled.task).collect()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
