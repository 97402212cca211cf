//! Deferred task scheduling for coalesced notifications.
//!
//! Coalesced deliveries are not run inside the setter that accepted the change.
//! They are handed to a [`Scheduler`] which runs them once the current
//! synchronous unit of work has finished.
//!
//! The default [`Microtask`] scheduler pushes tasks onto a thread local FIFO
//! queue. The embedding event loop drains it with [`run_microtasks`] after
//! each unit of work:
//!
//! ```
//! use reactivate::{run_microtasks, ReactiveValue};
//! use std::{cell::RefCell, rc::Rc};
//!
//! let r = ReactiveValue::new(5);
//! let seen: Rc<RefCell<Vec<i32>>> = Default::default();
//! let _sub = r.subscribe({
//!     let seen = seen.clone();
//!     move |val| seen.borrow_mut().push(*val)
//! });
//!
//! r.set_value(1);
//! r.set_value(2);
//! r.set_value(3);
//! assert!(seen.borrow().is_empty());
//!
//! run_microtasks();
//! assert_eq!(vec![3], *seen.borrow());
//! ```

use std::{cell::RefCell, collections::VecDeque};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Runs tasks after the code that scheduled them has finished its current
/// unit of work, in the order they were scheduled.
pub trait Scheduler {
    fn schedule(&self, task: Task);
}

thread_local! {
    static MICROTASKS: RefCell<VecDeque<Task>> = RefCell::new(VecDeque::new());
}

/// Queues `task` on this thread's microtask queue.
pub fn queue_microtask(task: impl FnOnce() + 'static) {
    MICROTASKS.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Runs queued microtasks until the queue is empty, including tasks queued by
/// the tasks themselves. Returns the number of tasks that ran.
pub fn run_microtasks() -> usize {
    let mut ran = 0;
    // the queue is not borrowed while a task runs, so tasks may queue more work
    while let Some(task) = MICROTASKS.with(|queue| queue.borrow_mut().pop_front()) {
        task();
        ran += 1;
    }
    if ran > 0 {
        tracing::trace!(ran, "drained microtask queue");
    }
    ran
}

/// Number of microtasks waiting on this thread.
pub fn pending_microtasks() -> usize {
    MICROTASKS.with(|queue| queue.borrow().len())
}

/// The default scheduler: this thread's microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Microtask;

impl Scheduler for Microtask {
    fn schedule(&self, task: Task) {
        MICROTASKS.with(|queue| queue.borrow_mut().push_back(task));
    }
}

/// Schedules tasks on the current tokio [`LocalSet`](tokio::task::LocalSet).
///
/// Every call to [`Scheduler::schedule`] must happen from inside a `LocalSet`.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTaskScheduler;

#[cfg(feature = "tokio")]
impl Scheduler for LocalTaskScheduler {
    fn schedule(&self, task: Task) {
        // detached; the task runs to completion on the LocalSet
        drop(tokio::task::spawn_local(async move { task() }));
    }
}
