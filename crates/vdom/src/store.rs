//! Minimal reducer store with change notification.
//!
//! Single-threaded companion to the renderer: `dispatch` runs the reducer
//! and notifies subscribers only when the state actually changed. The
//! subscriber list is snapshotted before notification, so callbacks may
//! subscribe or unsubscribe while being notified.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub struct Store<S, A> {
    state: RefCell<S>,
    reducer: Box<dyn Fn(&S, &A) -> S>,
    observers: Rc<RefCell<Vec<Observer>>>,
    next_id: Cell<u64>,
}

struct Observer {
    id: u64,
    callback: Rc<dyn Fn()>,
}

/// Handle returned by [`Store::subscribe`]; call [`Subscription::unsubscribe`]
/// to stop receiving notifications. Dropping the handle keeps the
/// subscription alive.
pub struct Subscription {
    id: u64,
    observers: Weak<RefCell<Vec<Observer>>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.borrow_mut().retain(|o| o.id != self.id);
        }
    }
}

impl<S: Clone + PartialEq, A> Store<S, A> {
    pub fn new(reducer: impl Fn(&S, &A) -> S + 'static, initial: S) -> Self {
        Store {
            state: RefCell::new(initial),
            reducer: Box::new(reducer),
            observers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> S {
        self.state.borrow().clone()
    }

    /// Runs the reducer; subscribers are notified only when the reduced
    /// state differs from the current one.
    pub fn dispatch(&self, action: A) {
        let next = (self.reducer)(&self.state.borrow(), &action);
        if next == *self.state.borrow() {
            return;
        }
        *self.state.borrow_mut() = next;
        self.notify();
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().push(Observer {
            id,
            callback: Rc::new(callback),
        });
        Subscription {
            id,
            observers: Rc::downgrade(&self.observers),
        }
    }

    fn notify(&self) {
        let snapshot: Vec<Rc<dyn Fn()>> = self
            .observers
            .borrow()
            .iter()
            .map(|o| o.callback.clone())
            .collect();
        for callback in snapshot {
            callback();
        }
    }
}
