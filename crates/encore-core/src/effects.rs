//! One-shot cleanup handles.

use std::cell::Cell;
use std::rc::Rc;

type Cleanup = Box<dyn FnOnce()>;

/// Cleanup that runs once. Clones share the same slot, so whichever clone
/// runs first wins and the rest become no-ops.
#[derive(Clone)]
pub struct Dispose {
    slot: Rc<Cell<Option<Cleanup>>>,
}

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            slot: Rc::new(Cell::new(Some(Box::new(f)))),
        }
    }

    pub fn run(&self) {
        // taken before calling so a re-entrant run sees an empty slot
        if let Some(cleanup) = self.slot.take() {
            cleanup();
        }
    }
}

/// Calls `setup` now. The returned handle is also tied to the current scope,
/// when there is one, so it runs on scope disposal at the latest.
pub fn effect(setup: impl FnOnce() -> Dispose) -> Dispose {
    let dispose = setup();
    match crate::scope::current_scope() {
        Some(scope) => {
            let d = dispose.clone();
            scope.add_disposer(move || d.run());
        }
        None => log::trace!("effect outside any scope; caller owns its cleanup"),
    }
    dispose
}

/// Wraps `f` as a [`Dispose`] without tying it to a scope.
pub fn on_dispose(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}
