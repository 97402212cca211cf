use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    rc::{Rc, Weak},
};

use crate::{
    error::{BoxError, Error, Result},
    observers::{ObserverList, Subscription},
    primitive::{JsonPrimitive, Primitive, ValueKind},
    scheduler::{Microtask, Scheduler},
};

type EqualityFn<T> = Rc<dyn Fn(&T, &T) -> bool>;
type TransformFn<T> = Rc<dyn Fn(T) -> T>;
type ParseFn<T> = Rc<dyn Fn(&str) -> Result<T, BoxError>>;
type FormatFn<T> = Rc<dyn Fn(&T) -> String>;

/// Reactive value container.
///
/// Holds a single value, hands every accepted change to its observers and,
/// unless spam mode is on, coalesces bursts of changes into one delivery of
/// the latest value.
///
/// # Examples
/// ```
/// use reactivate::{run_microtasks, ReactiveValue};
/// use std::{cell::RefCell, rc::Rc};
///
/// let r = ReactiveValue::builder(0).transform(|n: i32| n.min(5)).build();
/// let seen: Rc<RefCell<Vec<i32>>> = Default::default();
/// let _sub = r.subscribe({
///     let seen = seen.clone();
///     move |val| seen.borrow_mut().push(*val)
/// });
///
/// r.set_value(4);
/// r.set_value(10);
/// assert_eq!(5, r.value());
///
/// run_microtasks();
/// assert_eq!(vec![5], *seen.borrow());
/// ```
pub struct ReactiveValue<T> {
    state: Rc<RefCell<State<T>>>,
    settings: Rc<Settings<T>>,
}

struct State<T> {
    value: T,
    spam_mode: bool,
    pending: bool,
    disposed: bool,
    /// Set while spam deliveries are running; nested changes queue behind them.
    delivering: bool,
    queued: VecDeque<T>,
    observers: ObserverList<T>,
    teardowns: Vec<Teardown>,
}

/// Everything fixed at construction.
struct Settings<T> {
    name: Option<Rc<str>>,
    equality: Option<EqualityFn<T>>,
    transform: Option<TransformFn<T>>,
    parse: Option<ParseFn<T>>,
    format: Option<FormatFn<T>>,
    conversion: Conversion<T>,
    scheduler: Rc<dyn Scheduler>,
}

enum Teardown {
    CloseChannel,
    Action(Box<dyn FnOnce()>),
}

/// Built-in conversions, resolved once from the payload type.
enum Conversion<T> {
    Primitive(PrimitiveConversion<T>),
    Custom,
}

struct PrimitiveConversion<T> {
    kind: ValueKind,
    parse: fn(&str) -> Result<Option<T>>,
    format: fn(&T) -> String,
    to_json: fn(&T) -> JsonPrimitive,
    from_json: fn(&JsonPrimitive) -> Option<T>,
}

impl<T: Primitive> PrimitiveConversion<T> {
    fn of() -> Self {
        Self {
            kind: T::KIND,
            parse: T::parse_text,
            format: T::format_text,
            to_json: T::to_json,
            from_json: T::from_json,
        }
    }
}

impl<T> Conversion<T> {
    fn kind(&self) -> ValueKind {
        match self {
            Conversion::Primitive(p) => p.kind,
            Conversion::Custom => ValueKind::Custom,
        }
    }
}

/// Configures and constructs a [`ReactiveValue`].
pub struct Builder<T> {
    seed: T,
    spam_mode: bool,
    name: Option<String>,
    equality: Option<EqualityFn<T>>,
    transform: Option<TransformFn<T>>,
    parse: Option<ParseFn<T>>,
    format: Option<FormatFn<T>>,
    conversion: Conversion<T>,
    scheduler: Option<Rc<dyn Scheduler>>,
    teardowns: Vec<Box<dyn FnOnce()>>,
}

impl<T: Primitive> Builder<T> {
    /// Starts a builder with the built-in text and JSON conversions of `T`.
    pub fn primitive(seed: T) -> Self {
        Self::with_conversion(seed, Conversion::Primitive(PrimitiveConversion::of()))
    }
}

impl<T: Clone + PartialEq + 'static> Builder<T> {
    /// Starts a builder for a payload type without built-in conversions.
    /// Text and JSON access only work through [`Builder::parse_from_text`]
    /// and [`Builder::format_to_text`].
    pub fn opaque(seed: T) -> Self {
        Self::with_conversion(seed, Conversion::Custom)
    }

    fn with_conversion(seed: T, conversion: Conversion<T>) -> Self {
        Self {
            seed,
            spam_mode: false,
            name: None,
            equality: None,
            transform: None,
            parse: None,
            format: None,
            conversion,
            scheduler: None,
            teardowns: vec![],
        }
    }

    /// Deliver every accepted change synchronously instead of coalescing.
    pub fn spam_mode(mut self, spam_mode: bool) -> Self {
        self.spam_mode = spam_mode;
        self
    }

    /// Diagnostic label, shown in logs and `Debug` output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces `PartialEq` when deciding whether a candidate is a change.
    /// Called as `f(candidate, current)`.
    pub fn equality(mut self, f: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.equality = Some(Rc::new(f));
        self
    }

    /// Applied to every accepted candidate before it is stored.
    /// The seed is stored as given.
    pub fn transform(mut self, f: impl Fn(T) -> T + 'static) -> Self {
        self.transform = Some(Rc::new(f));
        self
    }

    pub fn parse_from_text<E>(mut self, f: impl Fn(&str) -> Result<T, E> + 'static) -> Self
    where
        E: Into<BoxError>,
    {
        let parse: ParseFn<T> =
            Rc::new(move |text: &str| f(text).map_err(Into::<BoxError>::into));
        self.parse = Some(parse);
        self
    }

    pub fn format_to_text(mut self, f: impl Fn(&T) -> String + 'static) -> Self {
        self.format = Some(Rc::new(f));
        self
    }

    /// Where coalesced deliveries are deferred to. Defaults to [`Microtask`].
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Rc::new(scheduler));
        self
    }

    /// Registers an action to run on [`ReactiveValue::dispose`].
    pub fn on_dispose(mut self, f: impl FnOnce() + 'static) -> Self {
        self.teardowns.push(Box::new(f));
        self
    }

    pub fn build(self) -> ReactiveValue<T> {
        let mut teardowns = vec![Teardown::CloseChannel];
        teardowns.extend(self.teardowns.into_iter().map(Teardown::Action));

        ReactiveValue {
            state: Rc::new(RefCell::new(State {
                value: self.seed,
                spam_mode: self.spam_mode,
                pending: false,
                disposed: false,
                delivering: false,
                queued: VecDeque::new(),
                observers: ObserverList::new(),
                teardowns,
            })),
            settings: Rc::new(Settings {
                name: self.name.map(Rc::from),
                equality: self.equality,
                transform: self.transform,
                parse: self.parse,
                format: self.format,
                conversion: self.conversion,
                scheduler: self.scheduler.unwrap_or_else(default_scheduler),
            }),
        }
    }
}

fn default_scheduler() -> Rc<dyn Scheduler> {
    Rc::new(Microtask)
}

impl<T: Primitive> ReactiveValue<T> {
    /// Constructs a coalescing `ReactiveValue` with built-in conversions.
    ///
    /// # Examples
    /// ```
    /// use reactivate::ReactiveValue;
    ///
    /// let r = ReactiveValue::new(String::from("🦀"));
    /// assert_eq!("🦀", r.value());
    /// ```
    pub fn new(seed: T) -> Self {
        Builder::primitive(seed).build()
    }

    pub fn builder(seed: T) -> Builder<T> {
        Builder::primitive(seed)
    }
}

impl<T: Primitive + Default> Default for ReactiveValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveValue<T> {
    /// Builder for payload types without built-in conversions.
    ///
    /// # Examples
    /// ```
    /// use reactivate::ReactiveValue;
    ///
    /// #[derive(Clone, PartialEq)]
    /// struct Point(i32, i32);
    ///
    /// let r = ReactiveValue::opaque(Point(1, 2))
    ///     .format_to_text(|p| format!("{},{}", p.0, p.1))
    ///     .build();
    /// assert_eq!("1,2", r.text_value().unwrap());
    /// ```
    pub fn opaque(seed: T) -> Builder<T> {
        Builder::opaque(seed)
    }

    /// Returns a clone/copy of the current value.
    pub fn value(&self) -> T {
        self.state.borrow().value.clone()
    }

    /// Perform some action with the reference to the current value.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow().value)
    }

    /// Proposes `candidate` as the new value.
    ///
    /// Ignored if it equals the current value (by the equality predicate if
    /// one was given). Otherwise the transformed candidate is stored and the
    /// observers are notified: immediately in spam mode, or once the
    /// scheduler runs the coalesced delivery.
    ///
    /// # Examples
    /// ```
    /// use reactivate::ReactiveValue;
    /// use std::{cell::RefCell, rc::Rc};
    ///
    /// let r = ReactiveValue::builder(String::from("Karl"))
    ///     .spam_mode(true)
    ///     .equality(|a: &String, b: &String| a.chars().next() == b.chars().next())
    ///     .build();
    /// let seen: Rc<RefCell<Vec<String>>> = Default::default();
    /// r.add_observer({
    ///     let seen = seen.clone();
    ///     move |val| seen.borrow_mut().push(val.clone())
    /// });
    ///
    /// for name in ["Anna", "Arno", "Berta", "Bernd"] {
    ///     r.set_value(name.to_owned());
    /// }
    ///
    /// assert_eq!(vec!["Anna", "Berta"], *seen.borrow());
    /// ```
    pub fn set_value(&self, candidate: T) {
        if self.is_disposed() {
            tracing::warn!(name = self.name(), "ignoring write to a disposed value");
            return;
        }

        let unchanged = {
            let state = self.state.borrow();
            match &self.settings.equality {
                Some(eq) => eq(&candidate, &state.value),
                None => candidate == state.value,
            }
        };
        if unchanged {
            return;
        }

        let resolved = match &self.settings.transform {
            Some(transform) => transform(candidate),
            None => candidate,
        };
        self.state.borrow_mut().value = resolved;
        tracing::trace!(name = self.name(), "accepted change");

        self.dispatch();
    }

    /// Proposes `f(current)` as the new value. See [`ReactiveValue::set_value`].
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let candidate = self.with_value(f);
        self.set_value(candidate);
    }

    /// Sends the current value through the notification policy without
    /// changing it.
    pub fn notify(&self) {
        if !self.is_disposed() {
            self.dispatch();
        }
    }

    fn dispatch(&self) {
        let mut state = self.state.borrow_mut();
        if state.spam_mode {
            let value = state.value.clone();
            state.queued.push_back(value);
            if state.delivering {
                return;
            }
            state.delivering = true;
            drop(state);
            self.drain_queued();
        } else if !state.pending {
            state.pending = true;
            drop(state);

            let weak = Rc::downgrade(&self.state);
            let name = self.settings.name.clone();
            self.settings
                .scheduler
                .schedule(Box::new(move || deliver_pending(&weak, name.as_deref())));
            tracing::trace!(name = self.name(), "scheduled coalesced delivery");
        }
    }

    /// Delivers queued spam changes in order, one value to every observer
    /// before the next value starts.
    fn drain_queued(&self) {
        loop {
            let (value, observers) = {
                let mut state = self.state.borrow_mut();
                let next = if state.disposed {
                    None
                } else {
                    state.queued.pop_front()
                };
                match next {
                    Some(value) => (value, state.observers.snapshot()),
                    None => {
                        state.queued.clear();
                        state.delivering = false;
                        return;
                    }
                }
            };
            observers.deliver(&value, || !self.is_disposed());
        }
    }

    /// Adds a new observer. It receives every value delivered from now on
    /// until the returned [`Subscription`] is cancelled or dropped.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return Subscription::inert();
        }

        let id = state.observers.subscribe(f);
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().observers.unsubscribe(id);
            }
        })
    }

    /// Adds an observer that stays registered until the value is disposed
    /// or [`ReactiveValue::clear_observers`] is called.
    pub fn add_observer(&self, f: impl FnMut(&T) + 'static) {
        self.subscribe(f).detach();
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn clear_observers(&self) {
        let observers = self.state.borrow_mut().observers.take();
        drop(observers);
    }

    /// Text form of the current value: the `format_to_text` function if one
    /// was given, else the built-in conversion.
    ///
    /// # Examples
    /// ```
    /// use reactivate::ReactiveValue;
    ///
    /// let r = ReactiveValue::new(0);
    /// r.set_text_value("42").unwrap();
    /// assert_eq!(42, r.value());
    /// assert_eq!("42", r.text_value().unwrap());
    /// ```
    pub fn text_value(&self) -> Result<String> {
        if let Some(format) = &self.settings.format {
            return Ok(self.with_value(|value| format(value)));
        }
        match &self.settings.conversion {
            Conversion::Primitive(p) => Ok(self.with_value(p.format)),
            Conversion::Custom => Err(Error::unsupported_conversion::<T>()),
        }
    }

    /// Parses `text` and proposes the result through [`ReactiveValue::set_value`].
    ///
    /// Boolean values accept `true`/`1`/`yes` and `false`/`0`/`no` in any
    /// case. Any other token leaves a boolean value unchanged.
    pub fn set_text_value(&self, text: &str) -> Result<()> {
        let parsed = match &self.settings.parse {
            Some(parse) => Some(parse(text).map_err(Error::Callback)?),
            None => match &self.settings.conversion {
                Conversion::Primitive(p) => (p.parse)(text)?,
                Conversion::Custom => return Err(Error::unsupported_conversion::<T>()),
            },
        };

        match parsed {
            Some(value) => self.set_value(value),
            None => tracing::debug!(name = self.name(), text, "unrecognized token, value kept"),
        }
        Ok(())
    }

    /// The current value as a JSON primitive. Payload types without built-in
    /// conversions are returned in their text form.
    pub fn json_value(&self) -> Result<JsonPrimitive> {
        match &self.settings.conversion {
            Conversion::Primitive(p) => Ok(self.with_value(p.to_json)),
            Conversion::Custom => self.text_value().map(JsonPrimitive::Text),
        }
    }

    /// Text is parsed as by [`ReactiveValue::set_text_value`]. Numbers and
    /// booleans are proposed directly if the payload type can hold them.
    ///
    /// # Examples
    /// ```
    /// use reactivate::{Error, ReactiveValue};
    /// use serde_json::json;
    ///
    /// let r = ReactiveValue::new(1.5);
    /// r.set_json_value(json!(2)).unwrap();
    /// assert_eq!(2.0, r.value());
    ///
    /// r.set_json_value(json!("3.25")).unwrap();
    /// assert_eq!(3.25, r.value());
    ///
    /// let err = r.set_json_value(json!([1])).unwrap_err();
    /// assert!(matches!(err, Error::UnsupportedJsonValue(_)));
    /// ```
    pub fn set_json_value(&self, value: serde_json::Value) -> Result<()> {
        self.set_json_primitive(JsonPrimitive::try_from(value)?)
    }

    pub fn set_json_primitive(&self, value: JsonPrimitive) -> Result<()> {
        if let JsonPrimitive::Text(text) = &value {
            return self.set_text_value(text);
        }
        let converted = match &self.settings.conversion {
            Conversion::Primitive(p) => (p.from_json)(&value),
            Conversion::Custom => None,
        };
        match converted {
            Some(v) => {
                self.set_value(v);
                Ok(())
            }
            None => Err(Error::UnsupportedJsonValue(value.into())),
        }
    }

    /// Registers an action to run on [`ReactiveValue::dispose`].
    /// Runs immediately if the value is already disposed.
    pub fn on_dispose(&self, f: impl FnOnce() + 'static) {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            drop(state);
            f();
        } else {
            state.teardowns.push(Teardown::Action(Box::new(f)));
        }
    }
}

impl<T> ReactiveValue<T> {
    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    pub fn kind(&self) -> ValueKind {
        self.settings.conversion.kind()
    }

    pub fn is_spam_mode(&self) -> bool {
        self.state.borrow().spam_mode
    }

    pub fn set_spam_mode(&self, spam_mode: bool) {
        self.state.borrow_mut().spam_mode = spam_mode;
    }

    /// `true` between an accepted change and its coalesced delivery.
    pub fn has_pending_notification(&self) -> bool {
        self.state.borrow().pending
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Closes the notification channel and runs the registered teardown
    /// actions, most recently registered first. Only the first call has any
    /// effect. A coalesced delivery that is still pending is dropped.
    pub fn dispose(&self) {
        let teardowns = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.pending = false;
            state.queued.clear();
            std::mem::take(&mut state.teardowns)
        };
        tracing::debug!(name = self.name(), "disposing");

        for teardown in teardowns.into_iter().rev() {
            match teardown {
                Teardown::CloseChannel => {
                    let observers = self.state.borrow_mut().observers.take();
                    drop(observers);
                }
                Teardown::Action(f) => f(),
            }
        }
    }
}

fn deliver_pending<T: Clone>(state: &Weak<RefCell<State<T>>>, name: Option<&str>) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let (value, observers) = {
        let mut state = state.borrow_mut();
        if state.disposed {
            return;
        }
        state.pending = false;
        if state.observers.is_empty() {
            tracing::trace!(name, "no observers, dropping coalesced delivery");
            return;
        }
        (state.value.clone(), state.observers.snapshot())
    };

    tracing::trace!(name, "delivering coalesced change");
    observers.deliver(&value, || !state.borrow().disposed);
}

impl<T> Drop for ReactiveValue<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Equal iff the current values are equal, by `self`'s equality predicate if
/// it has one.
impl<T: PartialEq> PartialEq for ReactiveValue<T> {
    fn eq(&self, other: &Self) -> bool {
        let this = self.state.borrow();
        let that = other.state.borrow();
        match &self.settings.equality {
            Some(eq) => eq(&that.value, &this.value),
            None => this.value == that.value,
        }
    }
}

/// Hashes the current value only. Consistent with `PartialEq` only for
/// values without a custom equality predicate.
impl<T: Hash> Hash for ReactiveValue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state.borrow().value.hash(state);
    }
}

impl<T: Debug> Debug for ReactiveValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReactiveValue")
            .field("name", &self.settings.name)
            .field("value", &state.value)
            .field("spam_mode", &state.spam_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::run_microtasks;
    use std::cell::Cell;

    fn record<T: Clone + PartialEq + 'static>(
        r: &ReactiveValue<T>,
    ) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let log: Rc<RefCell<Vec<T>>> = Default::default();
        let sub = r.subscribe({
            let log = log.clone();
            move |val| log.borrow_mut().push(val.clone())
        });
        (log, sub)
    }

    #[test]
    fn pending_flag_tracks_scheduled_delivery() {
        run_microtasks();
        let r = ReactiveValue::new(0);
        assert!(!r.has_pending_notification());

        r.set_value(1);
        assert!(r.has_pending_notification());
        r.set_value(2);

        assert_eq!(1, run_microtasks());
        assert!(!r.has_pending_notification());
    }

    #[test]
    fn only_one_task_is_scheduled_per_burst() {
        run_microtasks();
        let r = ReactiveValue::new(0);
        for i in 1..=10 {
            r.set_value(i);
        }
        assert_eq!(1, crate::scheduler::pending_microtasks());
        run_microtasks();
    }

    #[test]
    fn pending_delivery_is_dropped_after_dispose() {
        let r = ReactiveValue::new(0);
        let (log, _sub) = record(&r);

        r.set_value(1);
        r.dispose();
        run_microtasks();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn pending_delivery_is_dropped_after_drop() {
        run_microtasks();
        let r = ReactiveValue::new(0);
        r.set_value(1);
        drop(r);
        assert_eq!(1, run_microtasks());
    }

    #[test]
    fn teardowns_run_in_reverse_order_once() {
        let log: Rc<RefCell<Vec<&'static str>>> = Default::default();
        let r = ReactiveValue::builder(0)
            .on_dispose({
                let log = log.clone();
                move || log.borrow_mut().push("first")
            })
            .build();
        r.on_dispose({
            let log = log.clone();
            move || log.borrow_mut().push("second")
        });

        r.dispose();
        r.dispose();
        drop(r);

        assert_eq!(vec!["second", "first"], *log.borrow());
    }

    #[test]
    fn channel_closes_after_custom_teardowns() {
        let seen_observers = Rc::new(Cell::new(usize::MAX));
        let r = ReactiveValue::new(0);
        r.add_observer(|_| {});

        let state = Rc::downgrade(&r.state);
        r.on_dispose({
            let seen_observers = seen_observers.clone();
            move || {
                let state = state.upgrade().unwrap();
                seen_observers.set(state.borrow().observers.len());
            }
        });
        r.dispose();

        assert_eq!(1, seen_observers.get());
        assert_eq!(0, r.observer_count());
    }

    #[test]
    fn stale_subscription_does_not_cancel_newer_observer() {
        let r = ReactiveValue::builder(0).spam_mode(true).build();
        let (_, stale) = record(&r);
        r.clear_observers();

        let (log, _sub) = record(&r);
        stale.cancel();
        r.set_value(1);

        assert_eq!(vec![1], *log.borrow());
    }

    #[test]
    fn on_dispose_after_dispose_runs_immediately() {
        let ran = Rc::new(Cell::new(false));
        let r = ReactiveValue::new(0);
        r.dispose();
        r.on_dispose({
            let ran = ran.clone();
            move || ran.set(true)
        });
        assert!(ran.get());
    }

    #[test]
    fn writes_after_dispose_are_ignored() {
        let r = ReactiveValue::builder(1).spam_mode(true).build();
        let (log, _sub) = record(&r);
        r.dispose();

        r.set_value(2);

        assert_eq!(1, r.value());
        assert!(log.borrow().is_empty());
        assert!(!r.subscribe(|_| {}).is_active());
    }

    #[test]
    fn custom_scheduler_receives_deferred_task() {
        #[derive(Clone, Default)]
        struct Manual(Rc<RefCell<Vec<crate::scheduler::Task>>>);
        impl Scheduler for Manual {
            fn schedule(&self, task: crate::scheduler::Task) {
                self.0.borrow_mut().push(task);
            }
        }

        let manual = Manual::default();
        let r = ReactiveValue::builder(0).scheduler(manual.clone()).build();
        let (log, _sub) = record(&r);

        r.set_value(7);
        assert_eq!(0, run_microtasks());
        assert_eq!(1, manual.0.borrow().len());

        let tasks = std::mem::take(&mut *manual.0.borrow_mut());
        for task in tasks {
            task();
        }
        assert_eq!(vec![7], *log.borrow());
    }

    #[test]
    fn observer_write_during_spam_delivery_is_queued_in_order() {
        let r = Rc::new(ReactiveValue::builder(0).spam_mode(true).build());
        let writer_log: Rc<RefCell<Vec<i32>>> = Default::default();
        let log: Rc<RefCell<Vec<i32>>> = Default::default();
        r.add_observer({
            let r = Rc::downgrade(&r);
            let writer_log = writer_log.clone();
            move |val| {
                writer_log.borrow_mut().push(*val);
                if *val == 1 {
                    if let Some(r) = r.upgrade() {
                        r.set_value(2);
                    }
                }
            }
        });
        r.add_observer({
            let log = log.clone();
            move |val| log.borrow_mut().push(*val)
        });

        r.set_value(1);

        assert_eq!(2, r.value());
        assert_eq!(vec![1, 2], *writer_log.borrow());
        assert_eq!(vec![1, 2], *log.borrow());
        assert!(!r.state.borrow().delivering);
    }

    #[test]
    fn dispose_inside_spam_delivery_stops_queued_values() {
        let r = Rc::new(ReactiveValue::builder(0).spam_mode(true).build());
        let log: Rc<RefCell<Vec<i32>>> = Default::default();
        r.add_observer({
            let r = Rc::downgrade(&r);
            move |val| {
                if let Some(r) = r.upgrade() {
                    if *val == 1 {
                        r.set_value(2);
                        r.dispose();
                    }
                }
            }
        });
        r.add_observer({
            let log = log.clone();
            move |val| log.borrow_mut().push(*val)
        });

        r.set_value(1);

        assert!(r.is_disposed());
        assert!(log.borrow().is_empty());
        assert!(r.state.borrow().queued.is_empty());
    }

    #[test]
    fn kind_is_resolved_at_construction() {
        assert_eq!(ValueKind::Integer, ReactiveValue::new(1u8).kind());
        assert_eq!(ValueKind::Real, ReactiveValue::new(1.0f32).kind());
        assert_eq!(ValueKind::Boolean, ReactiveValue::new(true).kind());
        assert_eq!(ValueKind::Text, ReactiveValue::<String>::default().kind());
        assert_eq!(ValueKind::Custom, ReactiveValue::opaque(vec![1]).build().kind());
    }
}
