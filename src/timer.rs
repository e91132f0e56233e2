//! Deferred tasks: notification expiry and the post-create reload.

use std::cell::{Cell, RefCell};
use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;

pub trait Timer {
    fn schedule(&self, delay: Duration, task: Task);
}

/// A clock that only moves when told to.
#[derive(Default)]
pub struct ManualTimer {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    pending: RefCell<Vec<(Duration, u64, Task)>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Moves the clock forward, running every task that falls due in
    /// deadline order. Tasks scheduled while advancing run too if they fall
    /// inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let due = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, (deadline, _, _))| *deadline <= target)
                    .min_by_key(|(_, (deadline, id, _))| (*deadline, *id))
                    .map(|(index, _)| index);
                due.map(|index| pending.remove(index))
            };
            let Some((deadline, _, task)) = next else {
                break;
            };
            self.now.set(deadline);
            task();
        }
        self.now.set(target);
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: Task) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.pending
            .borrow_mut()
            .push((self.now.get() + delay, id, task));
    }
}

/// Runs tasks on the current tokio `LocalSet`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, task: Task) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimer;

#[cfg(target_arch = "wasm32")]
impl Timer for BrowserTimer {
    fn schedule(&self, delay: Duration, task: Task) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Timeout::new(millis, task).forget();
    }
}
