use std::{
    cell::RefCell,
    fmt::{self, Debug},
    rc::Rc,
};

type Observer<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Identifies an observer inside an [`ObserverList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered set of listeners. Every delivered value reaches every observer,
/// in the order they subscribed.
///
/// # Examples
/// ```
/// use reactivate::ObserverList;
/// use std::{cell::RefCell, rc::Rc};
///
/// let seen: Rc<RefCell<Vec<i32>>> = Default::default();
/// let mut list = ObserverList::new();
/// let id = list.subscribe({
///     let seen = seen.clone();
///     move |val: &i32| seen.borrow_mut().push(*val)
/// });
///
/// list.deliver(&1);
/// assert!(list.unsubscribe(id));
/// list.deliver(&2);
///
/// assert_eq!(vec![1], *seen.borrow());
/// ```
pub struct ObserverList<T> {
    next_id: u64,
    entries: Vec<(ObserverId, Observer<T>)>,
}

impl<T> ObserverList<T> {
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            entries: vec![],
        }
    }

    pub fn subscribe(&mut self, f: impl FnMut(&T) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Rc::new(RefCell::new(f))));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn deliver(&self, value: &T) {
        self.snapshot().deliver(value, || true);
    }

    /// Removes every observer without resetting id allocation. The observers
    /// are handed back so they can be dropped after the list is released.
    pub(crate) fn take(&mut self) -> Snapshot<T> {
        Snapshot(self.entries.drain(..).map(|(_, obs)| obs).collect())
    }

    /// Captures the current observers so they can be called after the list
    /// itself is no longer borrowed.
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        Snapshot(self.entries.iter().map(|(_, obs)| obs.clone()).collect())
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for ObserverList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.entries.len())
            .finish()
    }
}

pub(crate) struct Snapshot<T>(Vec<Observer<T>>);

impl<T> Snapshot<T> {
    /// Calls each observer in turn while `is_live` holds.
    pub(crate) fn deliver(&self, value: &T, is_live: impl Fn() -> bool) {
        for obs in &self.0 {
            if !is_live() {
                return;
            }
            match obs.try_borrow_mut() {
                Ok(mut f) => f(value),
                // the observer is further up the stack, delivering an earlier value
                Err(_) => tracing::warn!("skipped re-entrant delivery to a busy observer"),
            }
        }
    }
}

/// Handle returned by [`ReactiveValue::subscribe`](crate::ReactiveValue::subscribe).
///
/// The observer stays registered until the handle is cancelled or dropped.
/// Cancelling more than once is a no-op.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// A handle with nothing to cancel.
    pub(crate) fn inert() -> Self {
        Self {
            cancel: RefCell::new(None),
        }
    }

    pub fn cancel(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// `false` once the handle has been cancelled.
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }

    /// Keeps the observer registered for the rest of the value's lifetime.
    pub fn detach(self) {
        self.cancel.borrow_mut().take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
