use crate::core::FieldId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Delay between scrolling a field into view and focusing it.
pub const FOCUS_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    ScrollToFirstError,
    Focus(FieldId),
}

impl Deferred {
    fn key(&self) -> &'static str {
        match self {
            Self::ScrollToFirstError => "scroll",
            Self::Focus(_) => "focus",
        }
    }
}

#[derive(Debug, Clone)]
struct DelayedTask {
    due_at: Instant,
    version: u64,
    task: Deferred,
}

/// Deferred work the engine hands back to the adapter's event loop.
///
/// Tasks of the same kind debounce: scheduling a new one supersedes any that is still pending.
#[derive(Debug, Default)]
pub struct Scheduler {
    delayed: Vec<DelayedTask>,
    key_versions: HashMap<&'static str, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: Deferred, now: Instant, delay: Duration) {
        let version = self.bump_version(task.key());
        self.delayed.push(DelayedTask {
            due_at: now + delay,
            version,
            task,
        });
    }

    pub fn drain_ready(&mut self, now: Instant) -> Vec<Deferred> {
        let mut ready = Vec::new();
        let mut idx = 0usize;
        while idx < self.delayed.len() {
            if self.delayed[idx].due_at <= now {
                let task = self.delayed.swap_remove(idx);
                if self.task_is_valid(&task) {
                    ready.push(task.task);
                }
            } else {
                idx += 1;
            }
        }

        ready
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        let mut next = default_timeout;

        for task in &self.delayed {
            let due_in = task.due_at.saturating_duration_since(now);
            if due_in < next {
                next = due_in;
            }
        }

        next
    }

    fn task_is_valid(&self, task: &DelayedTask) -> bool {
        let current = self.key_versions.get(task.task.key()).copied().unwrap_or(0);
        current == task.version
    }

    fn bump_version(&mut self, key: &'static str) -> u64 {
        let entry = self.key_versions.entry(key).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }
}
