//! # Result channels
//!
//! A [`ResultChannel`] carries the outcome of invoking a [`UseCase`] from a
//! worker back to UI observers:
//!
//! ```rust
//! use std::sync::Arc;
//! use encore_core::*;
//!
//! struct Double;
//! impl UseCase for Double {
//!     type Params = u32;
//!     type Output = u32;
//!     fn execute(&self, n: u32) -> Result<u32, UseCaseError> {
//!         Ok(n * 2)
//!     }
//! }
//!
//! let channel = ResultChannel::<u32>::new("double", Arc::new(Inline));
//! let _sub = channel.observe(|s| println!("{s:?}"));
//! channel.invoke(Arc::new(Double), 21); // prints Loading
//! looper::pump();                       // prints Success(42)
//! assert_eq!(channel.state(), Some(ResultState::Success(42)));
//! ```
//!
//! Each invocation publishes exactly one `Loading` and later exactly one
//! terminal state. Invocations are tagged with a sequence number and only the
//! most recently *started* one may publish its outcome; a newer invocation
//! also cancels the older one's token so a worker that has not picked it up
//! yet skips it.
//!
//! Observers get the current state immediately on `observe` (if anything has
//! been published) and then every publish, in order. There is no history.

use std::cell::{Cell, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use web_time::Instant;

use crate::effects::Dispose;
use crate::error::Failure;
use crate::executor::Executor;
use crate::looper::{self, Mailbox, Pump};
use crate::result::ResultState;
use crate::scope::Scope;
use crate::signal::{Signal, SubId, signal};
use crate::usecase::UseCase;

/// Channel for commands that only report completion.
pub type CompletableChannel = ResultChannel<()>;

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Delivery<T> {
    seq: u64,
    outcome: Result<T, Failure>,
    elapsed: Duration,
}

pub struct ResultChannel<T: Clone + 'static> {
    inner: Rc<ChannelInner<T>>,
}

impl<T: Clone + 'static> Clone for ResultChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct ChannelInner<T: Clone + 'static> {
    name: &'static str,
    state: Signal<Option<ResultState<T>>>,
    latest: Cell<u64>,
    in_flight: RefCell<Option<CancelToken>>,
    mailbox: Mailbox<Delivery<T>>,
    executor: Arc<dyn Executor>,
}

impl<T: Clone + 'static> ResultChannel<T> {
    /// Creates a channel bound to the calling (UI) thread's looper.
    pub fn new(name: &'static str, executor: Arc<dyn Executor>) -> Self {
        let inner = Rc::new(ChannelInner {
            name,
            state: signal(None),
            latest: Cell::new(0),
            in_flight: RefCell::new(None),
            mailbox: Mailbox::new(),
            executor,
        });
        let as_pump: Rc<dyn Pump> = inner.clone();
        looper::register(Rc::downgrade(&as_pump));
        Self { inner }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Last published state; `None` before the first invocation.
    pub fn state(&self) -> Option<ResultState<T>> {
        self.inner.state.get()
    }

    pub fn is_loading(&self) -> bool {
        self.inner
            .state
            .with(|s| matches!(s, Some(ResultState::Loading)))
    }

    /// Sequence number of the most recent invocation (0 if never invoked).
    pub fn latest_seq(&self) -> u64 {
        self.inner.latest.get()
    }

    /// Starts `use_case` on the executor and publishes `Loading`.
    ///
    /// Returns the invocation's sequence number.
    pub fn invoke<U>(&self, use_case: Arc<U>, params: U::Params) -> u64
    where
        U: UseCase<Output = T>,
        T: Send,
    {
        let inner = &self.inner;
        let seq = inner.latest.get() + 1;
        inner.latest.set(seq);

        let token = CancelToken::new();
        if let Some(prev) = inner.in_flight.replace(Some(token.clone())) {
            log::debug!("{}#{}: superseding in-flight invocation", inner.name, seq - 1);
            prev.cancel();
        }

        log::debug!("{}#{seq}: loading", inner.name);
        inner.state.set(Some(ResultState::Loading));

        let poster = inner.mailbox.poster();
        let name = inner.name;
        let started = Instant::now();
        inner.executor.spawn(Box::new(move || {
            if token.is_cancelled() {
                log::debug!("{name}#{seq}: cancelled before start");
                return;
            }
            let outcome = match catch_unwind(AssertUnwindSafe(|| use_case.execute(params))) {
                Ok(Ok(v)) => Ok(v),
                Ok(Err(e)) => {
                    let failure = e.failure();
                    log::debug!("{name}#{seq}: {e} -> {failure}");
                    Err(failure)
                }
                Err(_) => {
                    log::error!("{name}#{seq}: use case panicked");
                    Err(Failure::UnexpectedFailure)
                }
            };
            poster.post(Delivery {
                seq,
                outcome,
                elapsed: started.elapsed(),
            });
        }));
        seq
    }

    /// Receives the current state (if any) now and every later publish.
    pub fn observe(&self, f: impl Fn(&ResultState<T>) + 'static) -> Subscription {
        let f = Rc::new(f);
        let id = self.inner.state.subscribe({
            let f = f.clone();
            move |s| {
                if let Some(s) = s {
                    f(s)
                }
            }
        });
        let current = self.inner.state.get();
        if let Some(s) = current {
            f(&s);
        }
        let state = self.inner.state.clone();
        Subscription {
            dispose: Dispose::new(move || {
                state.unsubscribe(id);
            }),
            id,
        }
    }

    /// Like [`observe`](Self::observe), unsubscribing when `scope` is disposed.
    pub fn observe_in(&self, scope: &Scope, f: impl Fn(&ResultState<T>) + 'static) {
        let sub = self.observe(f);
        scope.add_disposer(move || sub.dispose());
    }

    pub fn observer_count(&self) -> usize {
        self.inner.state.subscriber_count()
    }
}

impl<T: Clone + 'static> Pump for ChannelInner<T> {
    fn drain(&self) -> usize {
        let deliveries = self.mailbox.take_all();
        let mut published = 0;
        for d in deliveries {
            let latest = self.latest.get();
            if d.seq != latest {
                log::debug!(
                    "{}#{}: discarding stale result (latest is #{latest})",
                    self.name,
                    d.seq
                );
                continue;
            }
            self.in_flight.borrow_mut().take();
            log::debug!(
                "{}#{}: {} after {:?}",
                self.name,
                d.seq,
                if d.outcome.is_ok() { "success" } else { "error" },
                d.elapsed
            );
            self.state.set(Some(d.outcome.into()));
            published += 1;
        }
        published
    }
}

impl<T: Clone + 'static> Drop for ChannelInner<T> {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.get_mut().take() {
            token.cancel();
        }
    }
}

/// Handle for one observer. Dropping it does not unsubscribe; call
/// [`dispose`](Self::dispose) or use [`ResultChannel::observe_in`].
pub struct Subscription {
    dispose: Dispose,
    id: SubId,
}

impl Subscription {
    pub fn id(&self) -> SubId {
        self.id
    }

    pub fn dispose(&self) {
        self.dispose.run();
    }

    pub fn into_dispose(self) -> Dispose {
        self.dispose
    }
}
