use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Holds the latest published value and fans every new value out to
/// subscribers. Handles are cheap to clone and all share the same value.
#[derive(Debug)]
pub struct Watch<T> {
    shared: Arc<Mutex<WatchState<T>>>,
}

#[derive(Debug)]
struct WatchState<T> {
    latest: T,
    subscribers: Vec<UnboundedSender<T>>,
}

impl<T> Clone for Watch<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> Watch<T> {
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Mutex::new(WatchState {
                latest: initial,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn latest(&self) -> T {
        self.lock().latest.clone()
    }

    /// Stream of values, starting with the current one.
    pub fn subscribe(&self) -> UnboundedReceiver<T> {
        let (sender, receiver) = mpsc::unbounded();
        let mut state = self.lock();
        // a fresh channel cannot be closed yet
        let _ = sender.unbounded_send(state.latest.clone());
        state.subscribers.push(sender);
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub(crate) fn publish(&self, value: T) {
        let mut state = self.lock();
        state
            .subscribers
            .retain(|subscriber| subscriber.unbounded_send(value.clone()).is_ok());
        state.latest = value;
    }

    fn lock(&self) -> MutexGuard<'_, WatchState<T>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
