//! Reactive value container with coalesced change notification.
//!
//! A [`ReactiveValue`] holds one value and tells its observers when it changes.
//! By default bursts of changes made within one unit of work are coalesced:
//! observers receive a single delivery of the latest value once the deferred
//! delivery point is reached (see [`run_microtasks`]). In spam mode every
//! accepted change is delivered synchronously instead.
//!
//! Values can optionally be clamped or validated by a transform, compared
//! with a custom equality predicate, and read or written as text or as a
//! [`JsonPrimitive`].
//!
//! ```
//! use reactivate::{run_microtasks, ReactiveValue};
//! use std::{cell::RefCell, rc::Rc};
//!
//! let r = ReactiveValue::new(5);
//! let change_log: Rc<RefCell<Vec<i32>>> = Default::default();
//! r.add_observer({
//!     let change_log = change_log.clone();
//!     move |val| change_log.borrow_mut().push(*val)
//! });
//!
//! r.set_value(1);
//! r.set_value(2);
//! r.set_value(3);
//! run_microtasks();
//!
//! assert_eq!(vec![3], *change_log.borrow());
//! ```

mod error;
mod macros;
mod observers;
mod primitive;
mod reactive;
mod scheduler;

pub use error::{BoxError, Error, Result};
pub use observers::{ObserverId, ObserverList, Subscription};
pub use primitive::{is_primitive_json_value, JsonPrimitive, Primitive, ValueKind};
pub use reactive::{Builder, ReactiveValue};
#[cfg(feature = "tokio")]
pub use scheduler::LocalTaskScheduler;
pub use scheduler::{
    pending_microtasks, queue_microtask, run_microtasks, Microtask, Scheduler, Task,
};
