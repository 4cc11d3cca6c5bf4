use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    pub struct SubId;
}

type Subscriber<T> = Rc<dyn Fn(&T)>;

pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

struct Inner<T> {
    value: T,
    subs: SlotMap<SubId, Subscriber<T>>,
    /// Published while a notification pass was running; delivered in order
    /// once it returns.
    queued: VecDeque<T>,
    notifying: bool,
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            subs: SlotMap::with_key(),
            queued: VecDeque::new(),
            notifying: false,
        })))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow().value)
    }

    pub fn set(&self, v: T)
    where
        T: Clone,
    {
        {
            let mut inner = self.0.borrow_mut();
            inner.value = v.clone();
            inner.queued.push_back(v);
        }
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F)
    where
        T: Clone,
    {
        {
            let mut inner = self.0.borrow_mut();
            f(&mut inner.value);
            let v = inner.value.clone();
            inner.queued.push_back(v);
        }
        self.notify();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.borrow_mut().subs.insert(Rc::new(f))
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.0.borrow_mut().subs.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    // Subscribers run with no borrow held, so they may read, publish or
    // (un)subscribe re-entrantly. A nested publish only queues its value;
    // the outermost call delivers every queued value to every subscriber,
    // in publish order.
    fn notify(&self)
    where
        T: Clone,
    {
        if std::mem::replace(&mut self.0.borrow_mut().notifying, true) {
            return;
        }
        let _reset = NotifyGuard(&self.0);
        loop {
            let next = {
                let mut inner = self.0.borrow_mut();
                inner.queued.pop_front().map(|value| {
                    let subs: SmallVec<[(SubId, Subscriber<T>); 4]> = inner
                        .subs
                        .iter()
                        .map(|(id, s)| (id, s.clone()))
                        .collect();
                    (value, subs)
                })
            };
            let Some((value, subs)) = next else {
                return;
            };
            for (id, s) in subs {
                if !self.0.borrow().subs.contains_key(id) {
                    continue;
                }
                s(&value);
            }
        }
    }
}

/// Clears the in-progress flag even if a subscriber panics, so the signal
/// keeps notifying afterwards.
struct NotifyGuard<'a, T>(&'a RefCell<Inner<T>>);

impl<T> Drop for NotifyGuard<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.0.borrow_mut();
        inner.notifying = false;
        inner.queued.clear();
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
