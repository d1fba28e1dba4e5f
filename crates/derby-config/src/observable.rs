//! Change-notifying value cell.
//!
//! # Design
//! - The value lock is held only to swap the value and copy the subscriber
//!   list. Callbacks run after it is released, so they may read any cell,
//!   including the one notifying them.
//! - A second per-cell lock is held across the whole fan-out, so a subscriber
//!   still sees updates in `set` order. A callback must not `set` or
//!   `subscribe` to the cell that is notifying it.
//! - Subscriptions hold a weak reference so an outstanding handle never keeps
//!   a dropped cell alive.

use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<Mutex<Box<dyn FnMut(&T) + Send>>>;
type Remover = Box<dyn FnOnce() + Send>;

struct Slot<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

impl<T> Slot<T> {
    fn callbacks(&self) -> Vec<Callback<T>> {
        self.subscribers
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

/// Shared value that notifies subscribers whenever it is replaced.
///
/// Cloning an `Observable` yields another handle to the same cell.
pub struct Observable<T> {
    slot: Arc<Mutex<Slot<T>>>,
    notify: Arc<Mutex<()>>,
}

impl<T> Observable<T>
where
    T: Clone + Send + 'static,
{
    /// Create a cell holding `value` with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
            notify: Arc::new(Mutex::new(())),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.slot).value.clone()
    }

    /// Replace the value and notify every current subscriber before returning.
    pub fn set(&self, value: T) {
        let _order = lock(&self.notify);
        let (current, callbacks) = {
            let mut slot = lock(&self.slot);
            slot.value = value;
            (slot.value.clone(), slot.callbacks())
        };
        for callback in callbacks {
            let mut callback = lock(&callback);
            (*callback)(&current);
        }
    }

    /// Register `callback`, invoking it immediately with the current value and
    /// again after every subsequent [`set`](Self::set).
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        let boxed: Box<dyn FnMut(&T) + Send> = Box::new(callback);
        let callback: Callback<T> = Arc::new(Mutex::new(boxed));
        let order = lock(&self.notify);
        let (id, current) = {
            let mut slot = lock(&self.slot);
            let id = slot.next_id;
            slot.next_id += 1;
            slot.subscribers.push((id, Arc::clone(&callback)));
            (id, slot.value.clone())
        };
        {
            let mut callback = lock(&callback);
            (*callback)(&current);
        }
        drop(order);

        let weak: Weak<Mutex<Slot<T>>> = Arc::downgrade(&self.slot);
        Subscription::from_remover(Box::new(move || {
            if let Some(slot) = weak.upgrade() {
                lock(&slot).subscribers.retain(|(sid, _)| *sid != id);
            }
        }))
    }

    /// Number of callbacks currently registered.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.slot).subscribers.len()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        formatter
            .debug_struct("Observable")
            .field("value", &slot.value)
            .field("subscribers", &slot.subscribers.len())
            .finish()
    }
}

// Poisoning only means a callback panicked; the guarded data is still valid.
fn lock<M: ?Sized>(mutex: &Mutex<M>) -> MutexGuard<'_, M> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by [`Observable::subscribe`].
///
/// Dropping the handle leaves the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[must_use = "call `unsubscribe` to stop notifications"]
pub struct Subscription {
    removers: Vec<Remover>,
}

impl Subscription {
    fn from_remover(remover: Remover) -> Self {
        Self {
            removers: vec![remover],
        }
    }

    /// Combine several handles into one that removes all of them.
    pub fn merge<I>(subscriptions: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self {
            removers: subscriptions
                .into_iter()
                .flat_map(|subscription| subscription.removers)
                .collect(),
        }
    }

    /// Remove the callback(s). Safe to call after the cell has been dropped.
    pub fn unsubscribe(self) {
        for remover in self.removers {
            remover();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("callbacks", &self.removers.len())
            .finish()
    }
}
