//! UI-thread mailbox.
//!
//! Signals and channels are `Rc`-based and never leave the UI thread. Work
//! finished on a worker is handed back through a [`Poster`], which only
//! touches an unbounded tokio channel and the looper's wake flag. The UI
//! thread then calls [`pump`] (or [`run_until_idle`]) to move queued results
//! into their channels, which is where observers get notified.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Something the looper drains on the UI thread.
pub trait Pump {
    /// Delivers queued work; returns how many items were handled.
    fn drain(&self) -> usize;
}

thread_local! {
    static LOOPER: Looper = Looper::new();
}

struct Looper {
    waker: Waker,
    pumps: RefCell<Vec<Weak<dyn Pump>>>,
}

impl Looper {
    fn new() -> Self {
        Self {
            waker: Waker::default(),
            pumps: RefCell::new(Vec::new()),
        }
    }
}

/// Cross-thread wake flag shared by every poster of one looper.
#[derive(Clone, Default)]
pub struct Waker(Arc<WakeInner>);

#[derive(Default)]
struct WakeInner {
    pending: Mutex<bool>,
    cv: Condvar,
}

impl Waker {
    pub fn wake(&self) {
        *self.0.pending.lock() = true;
        self.0.cv.notify_all();
    }

    /// Blocks until woken or `timeout` elapses. Clears the flag.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut pending = self.0.pending.lock();
        if !*pending {
            let _ = self.0.cv.wait_for(&mut pending, timeout);
        }
        std::mem::replace(&mut *pending, false)
    }

    fn clear(&self) {
        *self.0.pending.lock() = false;
    }
}

/// Waker of the calling thread's looper.
pub fn waker() -> Waker {
    LOOPER.with(|l| l.waker.clone())
}

/// Registers a pump with the calling thread's looper. Dropped pumps are
/// pruned on the next [`pump`].
pub fn register(pump: Weak<dyn Pump>) {
    LOOPER.with(|l| l.pumps.borrow_mut().push(pump));
}

/// Number of live pumps on this thread.
pub fn pump_count() -> usize {
    LOOPER.with(|l| {
        l.pumps
            .borrow()
            .iter()
            .filter(|p| p.strong_count() > 0)
            .count()
    })
}

/// Drains every registered pump until none of them has anything left.
///
/// Observers may start new work while being notified; with an inline
/// executor that work is already queued, so draining repeats until quiet.
pub fn pump() -> usize {
    let mut total = 0;
    loop {
        let live: Vec<Rc<dyn Pump>> = LOOPER.with(|l| {
            let mut pumps = l.pumps.borrow_mut();
            pumps.retain(|p| p.strong_count() > 0);
            pumps.iter().filter_map(Weak::upgrade).collect()
        });
        LOOPER.with(|l| l.waker.clear());
        let handled: usize = live.iter().map(|p| p.drain()).sum();
        if handled == 0 {
            return total;
        }
        total += handled;
    }
}

/// Pumps; if nothing was pending, waits up to `timeout` for a worker to post
/// and pumps again.
pub fn run_until_idle(timeout: Duration) -> usize {
    let handled = pump();
    if handled > 0 {
        return handled;
    }
    if waker().wait(timeout) {
        return pump();
    }
    // a post may have raced with the flag being cleared inside `pump`
    pump()
}

/// UI-thread end of a queue fed from workers.
pub struct Mailbox<T> {
    tx: UnboundedSender<T>,
    rx: RefCell<UnboundedReceiver<T>>,
    waker: Waker,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    /// Creates a mailbox bound to the calling thread's looper.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: RefCell::new(rx),
            waker: waker(),
        }
    }

    pub fn poster(&self) -> Poster<T> {
        Poster {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Everything posted so far, oldest first. Never blocks.
    pub fn take_all(&self) -> Vec<T> {
        let mut rx = self.rx.borrow_mut();
        let mut items = Vec::with_capacity(rx.len());
        while let Ok(item) = rx.try_recv() {
            items.push(item);
        }
        items
    }

    pub fn len(&self) -> usize {
        self.rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.borrow().is_empty()
    }
}

/// Worker end of a [`Mailbox`].
pub struct Poster<T> {
    tx: UnboundedSender<T>,
    waker: Waker,
}

impl<T> Clone for Poster<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }
}

impl<T> Poster<T> {
    /// Queues `msg` and wakes the looper. A message for a mailbox that has
    /// already been dropped is discarded.
    pub fn post(&self, msg: T) {
        if self.tx.send(msg).is_err() {
            log::trace!("mailbox gone; dropping posted result");
            return;
        }
        self.waker.wake();
    }
}
