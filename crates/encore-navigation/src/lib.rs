use std::{cell::RefCell, fmt::Debug, rc::Rc};

use encore_core::*;
use serde::{Deserialize, Serialize};

mod route;

pub use route::Route;

pub trait NavKey: Clone + Debug + 'static + Serialize + for<'de> Deserialize<'de> {}
impl<T> NavKey for T where T: Clone + Debug + 'static + Serialize + for<'de> Deserialize<'de> {}

struct Entry<K: NavKey> {
    id: u64,
    key: K,
    /// Disposed when the entry is popped, which tears down every
    /// subscription the entry's screen registered with `observe_in`.
    scope: Scope,
}

struct BackState<K: NavKey> {
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K: NavKey> BackState<K> {
    fn entry(&mut self, key: K) -> Entry<K> {
        let id = self.next_id;
        self.next_id += 1;
        Entry {
            id,
            key,
            scope: Scope::new(),
        }
    }
}

#[derive(Clone)]
pub struct NavBackStack<K: NavKey> {
    inner: Rc<RefCell<BackState<K>>>,
    version: Signal<u64>,
}

impl<K: NavKey> NavBackStack<K> {
    pub fn new(start: K) -> Self {
        let mut state = BackState {
            entries: Vec::new(),
            next_id: 1,
        };
        let root = state.entry(start);
        state.entries.push(root);
        Self {
            inner: Rc::new(RefCell::new(state)),
            version: signal(0),
        }
    }

    pub fn top(&self) -> Option<(u64, K, Scope)> {
        let s = self.inner.borrow();
        s.entries
            .last()
            .map(|e| (e.id, e.key.clone(), e.scope.clone()))
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn size(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Called after every change to the stack.
    pub fn subscribe(&self, f: impl Fn(u64) + 'static) -> SubId {
        self.version.subscribe(move |v| f(*v))
    }

    fn contains(&self, id: u64) -> bool {
        self.inner.borrow().entries.iter().any(|e| e.id == id)
    }

    fn bump(&self) {
        let v = self.version.get();
        self.version.set(v.wrapping_add(1));
    }

    fn push_inner(&self, key: K) {
        let mut s = self.inner.borrow_mut();
        let entry = s.entry(key);
        s.entries.push(entry);
    }

    /// Pop the top entry (if any) and dispose its scope.
    fn pop_inner(&self) -> bool {
        let entry = self.inner.borrow_mut().entries.pop();
        if let Some(e) = entry {
            e.scope.dispose();
            true
        } else {
            false
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let s = self.inner.borrow();
        let keys: Vec<&K> = s.entries.iter().map(|e| &e.key).collect();
        serde_json::to_string(&keys)
    }

    /// Rebuilds the stack from `to_json` output. An empty list is rejected
    /// so the stack always keeps a root.
    pub fn from_json(&self, json: &str) -> Result<(), serde_json::Error> {
        let keys = serde_json::from_str::<Vec<K>>(json)?;
        if keys.is_empty() {
            log::warn!("ignoring empty saved back stack");
            return Ok(());
        }
        let old_entries = std::mem::take(&mut self.inner.borrow_mut().entries);
        for e in old_entries {
            e.scope.dispose();
        }

        {
            let mut s = self.inner.borrow_mut();
            for k in keys {
                let entry = s.entry(k);
                s.entries.push(entry);
            }
        }
        self.bump();
        Ok(())
    }
}

#[derive(Clone)]
pub struct Navigator<K: NavKey> {
    pub stack: NavBackStack<K>,
}

impl<K: NavKey> Navigator<K> {
    pub fn new(stack: NavBackStack<K>) -> Self {
        Self { stack }
    }

    pub fn push(&self, k: K) {
        log::info!("navigate -> {k:?}");
        self.stack.push_inner(k);
        self.stack.bump();
    }

    pub fn pop(&self) -> bool {
        // Don't pop if only one entry is present
        if self.stack.size() <= 1 {
            return false;
        }
        let ok = self.stack.pop_inner();
        if ok {
            log::info!("navigate back ({} entries left)", self.stack.size());
            self.stack.bump();
        }
        ok
    }

    /// Pops down to the newest entry matching `pred`, also popping that entry
    /// when `inclusive`. Never pops the root.
    pub fn pop_to<F: Fn(&K) -> bool>(&self, pred: F, inclusive: bool) {
        let count = {
            let s = self.stack.inner.borrow();
            match s.entries.iter().rposition(|e| pred(&e.key)) {
                Some(idx) => {
                    let n = s.entries.len() - idx - usize::from(!inclusive);
                    n.min(s.entries.len() - 1)
                }
                None => 0,
            }
        };
        for _ in 0..count {
            let _ = self.stack.pop_inner();
        }
        if count > 0 {
            self.stack.bump();
        }
    }
}

/// Navigation capability handed to screens.
pub trait Navigate<K> {
    fn navigate(&self, to: K);
    /// Returns `false` when already at the root.
    fn navigate_up(&self) -> bool;
}

impl<K: NavKey> Navigate<K> for Navigator<K> {
    fn navigate(&self, to: K) {
        self.push(to)
    }

    fn navigate_up(&self) -> bool {
        self.pop()
    }
}

pub struct EntryScope<K: NavKey> {
    id: u64,
    key: K,
    scope: Scope,
    nav: Navigator<K>,
}

impl<K: NavKey> EntryScope<K> {
    pub fn id(&self) -> u64 {
        self.id
    }
    pub fn key(&self) -> &K {
        &self.key
    }
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
    pub fn navigator(&self) -> Navigator<K> {
        self.nav.clone()
    }
}

pub type ScreenFactory<K, S> = Rc<dyn Fn(&EntryScope<K>) -> S>;

/// Keeps one screen alive per entry that has been on top of the stack.
///
/// Screens are built inside their entry's scope when the entry first becomes
/// the top, and dropped once the entry leaves the stack.
pub struct NavHost<K: NavKey, S: 'static> {
    stack: NavBackStack<K>,
    live: Rc<RefCell<Vec<(u64, Rc<S>)>>>,
    sub: SubId,
}

impl<K: NavKey, S: 'static> NavHost<K, S> {
    pub fn new(stack: NavBackStack<K>, factory: ScreenFactory<K, S>) -> Self {
        let live: Rc<RefCell<Vec<(u64, Rc<S>)>>> = Rc::new(RefCell::new(Vec::new()));
        let sync = {
            let stack = stack.clone();
            let live = live.clone();
            move || sync_screens(&stack, &live, &factory)
        };
        sync();
        let sub = stack.subscribe(move |_| sync());
        Self { stack, live, sub }
    }

    pub fn navigator(&self) -> Navigator<K> {
        Navigator::new(self.stack.clone())
    }

    /// Screen of the top entry.
    pub fn current(&self) -> Option<Rc<S>> {
        let (id, ..) = self.stack.top()?;
        self.live
            .borrow()
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, s)| s.clone())
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

impl<K: NavKey, S: 'static> Drop for NavHost<K, S> {
    fn drop(&mut self) {
        self.stack.version.unsubscribe(self.sub);
    }
}

fn sync_screens<K: NavKey, S>(
    stack: &NavBackStack<K>,
    live: &RefCell<Vec<(u64, Rc<S>)>>,
    factory: &ScreenFactory<K, S>,
) {
    // detach first so screens drop without a borrow held
    let gone: Vec<(u64, Rc<S>)> = {
        let mut live = live.borrow_mut();
        let (keep, gone) = std::mem::take(&mut *live)
            .into_iter()
            .partition(|(id, _)| stack.contains(*id));
        *live = keep;
        gone
    };
    drop(gone);

    let Some((id, key, scope)) = stack.top() else {
        return;
    };
    if live.borrow().iter().any(|(eid, _)| *eid == id) {
        return;
    }
    let entry = EntryScope {
        id,
        key,
        scope: scope.clone(),
        nav: Navigator::new(stack.clone()),
    };
    let screen = scope.run(|| factory(&entry));
    live.borrow_mut().push((id, Rc::new(screen)));
}

/// Back-dispatcher
///
/// platform calls handle(); app installs a handler for the displayed stack.
pub mod back {
    use std::{cell::RefCell, rc::Rc};

    type Handler = Rc<dyn Fn() -> bool>;

    thread_local! {
        static H: RefCell<Option<Handler>> = const { RefCell::new(None) };
    }

    pub fn set(handler: Option<Handler>) {
        H.with(|h| *h.borrow_mut() = handler);
    }

    pub fn handle() -> bool {
        let handler = H.with(|h| h.borrow().clone());
        match handler {
            Some(handler) => handler(),
            None => false,
        }
    }
}

/// Installs the global back handler for `stack`. When called inside a scope
/// the handler is uninstalled again as that scope is disposed.
pub fn install_back_handler<K: NavKey>(stack: NavBackStack<K>) -> Dispose {
    effect(move || {
        let nav = Navigator::new(stack);
        back::set(Some(Rc::new(move || nav.pop())));
        on_dispose(|| back::set(None))
    })
}
