//! Keyed list reconciliation.
//!
//! [`ListReconciler::swap_items`] replaces the displayed rows and tells the
//! attached [`ListSurface`] exactly which rows went away, arrived, moved or
//! changed, so the surface can animate those and keep its scroll position.
//!
//! The edit script is applied in order: removals (back to front), then
//! insertions and moves (front row last), then in-place changes against the
//! final positions. Rows that keep their relative order are the longest
//! increasing subsequence of the survivors, so every other survivor costs
//! exactly one move.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use encore_core::{Album, Artist, Track};
use smallvec::SmallVec;

use crate::ports::{ImageLoader, ImageTarget};

/// Something that can be shown as a list row.
pub trait Row: Clone + PartialEq + 'static {
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;

    fn artwork_url(&self) -> Option<&str> {
        None
    }
}

impl Row for Artist {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Row for Album {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }
}

impl Row for Track {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

/// One step of an edit script. `Move` removes at `from`, then inserts at
/// `to` in the shortened list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOp {
    Remove(usize),
    Insert(usize),
    Move { from: usize, to: usize },
    Change(usize),
}

pub type Edits = SmallVec<[RowOp; 8]>;

/// The recycler-side view of a list.
pub trait ListSurface {
    fn apply(&mut self, op: RowOp);

    /// Row currently at the top of the viewport, if known.
    fn first_visible(&self) -> Option<usize> {
        None
    }

    fn scroll_to(&mut self, _position: usize) {}
}

/// Capabilities a list needs from its screen.
pub trait ItemDelegate<T> {
    fn on_item_clicked(&self, item: &T, position: usize);
    fn image_loader(&self) -> Rc<dyn ImageLoader>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapOutcome {
    pub ops: Edits,
    /// New position of the row that was at the top before the swap.
    pub anchor: Option<usize>,
}

pub struct ListReconciler<T: Row> {
    items: RefCell<Vec<T>>,
    delegate: Rc<dyn ItemDelegate<T>>,
    surface: RefCell<Option<Rc<RefCell<dyn ListSurface>>>>,
}

impl<T: Row> ListReconciler<T> {
    pub fn new(delegate: Rc<dyn ItemDelegate<T>>) -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            delegate,
            surface: RefCell::new(None),
        }
    }

    pub fn attach(&self, surface: Rc<RefCell<dyn ListSurface>>) {
        *self.surface.borrow_mut() = Some(surface);
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn item_at(&self, position: usize) -> Option<T> {
        self.items.borrow().get(position).cloned()
    }

    /// Replaces the displayed rows with `new`, in `new`'s order.
    pub fn swap_items(&self, new: Vec<T>) -> SwapOutcome {
        let surface = self.surface.borrow().clone();
        let anchor_key = surface
            .as_ref()
            .and_then(|s| s.borrow().first_visible())
            .and_then(|p| self.items.borrow().get(p).map(Row::key));

        let ops = diff(&self.items.borrow(), &new);
        let anchor = anchor_key.and_then(|k| new.iter().position(|r| r.key() == k));
        *self.items.borrow_mut() = new;

        if let Some(surface) = surface {
            let mut surface = surface.borrow_mut();
            for op in &ops {
                surface.apply(*op);
            }
            if let Some(p) = anchor {
                surface.scroll_to(p);
            }
        }
        log::debug!("swap_items: {} rows, {} ops", self.len(), ops.len());
        SwapOutcome { ops, anchor }
    }

    /// Forwards a tap on `position` to the delegate with the row shown there.
    pub fn click(&self, position: usize) -> bool {
        let Some(item) = self.item_at(position) else {
            log::warn!("click on row {position} ignored; {} rows shown", self.len());
            return false;
        };
        self.delegate.on_item_clicked(&item, position);
        true
    }

    /// Starts loading the row's artwork into `target`, if it has any.
    pub fn bind(&self, position: usize, target: ImageTarget) -> bool {
        let url = self
            .items
            .borrow()
            .get(position)
            .and_then(|r| r.artwork_url().map(str::to_owned));
        match url {
            Some(url) => {
                self.delegate.image_loader().load_image(&url, target);
                true
            }
            None => false,
        }
    }
}

/// Edit script turning `old` into `new`.
pub fn diff<T: Row>(old: &[T], new: &[T]) -> Edits {
    let new_index: HashMap<T::Key, usize> =
        new.iter().enumerate().map(|(i, r)| (r.key(), i)).collect();
    let old_rows: HashMap<T::Key, &T> = old.iter().map(|r| (r.key(), r)).collect();
    if new_index.len() != new.len() || old_rows.len() != old.len() {
        log::warn!("duplicate row keys; reloading the whole list");
        return full_reload(old.len(), new.len());
    }

    let mut ops = Edits::new();

    for (i, row) in old.iter().enumerate().rev() {
        if !new_index.contains_key(&row.key()) {
            ops.push(RowOp::Remove(i));
        }
    }

    let mut cur: Vec<T::Key> = old
        .iter()
        .map(Row::key)
        .filter(|k| new_index.contains_key(k))
        .collect();
    let targets: Vec<usize> = cur.iter().map(|k| new_index[k]).collect();
    let stable: HashSet<usize> = longest_increasing(&targets)
        .into_iter()
        .map(|i| targets[i])
        .collect();

    for j in (0..new.len()).rev() {
        let key = new[j].key();
        let anchor = match new.get(j + 1) {
            Some(next) => position_of(&cur, &next.key()),
            None => cur.len(),
        };
        if !old_rows.contains_key(&key) {
            ops.push(RowOp::Insert(anchor));
            cur.insert(anchor, key);
        } else if !stable.contains(&j) {
            let from = position_of(&cur, &key);
            let to = if from < anchor { anchor - 1 } else { anchor };
            cur.remove(from);
            cur.insert(to, key);
            if from != to {
                ops.push(RowOp::Move { from, to });
            }
        }
    }

    for (j, row) in new.iter().enumerate() {
        if let Some(prev) = old_rows.get(&row.key())
            && *prev != row
        {
            ops.push(RowOp::Change(j));
        }
    }
    ops
}

fn full_reload(old_len: usize, new_len: usize) -> Edits {
    (0..old_len)
        .rev()
        .map(RowOp::Remove)
        .chain((0..new_len).map(RowOp::Insert))
        .collect()
}

fn position_of<K: PartialEq>(keys: &[K], key: &K) -> usize {
    // every key looked up here was placed in `keys` earlier in `diff`
    keys.iter().position(|k| k == key).unwrap_or(keys.len())
}

/// Indices into `seq` of one longest strictly increasing subsequence.
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &v) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&t| seq[t] < v);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }
    let mut out = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        out.push(i);
        cursor = prev[i];
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ImageRequests;
    use proptest::prelude::*;
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Row for Item {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
        fn artwork_url(&self) -> Option<&str> {
            (self.id % 2 == 0).then_some("https://img.example/even.jpg")
        }
    }

    fn items(ids: &[u32]) -> Vec<Item> {
        ids.iter().map(|&id| Item { id, label: "x" }).collect()
    }

    /// Replays `ops` over `old` and checks the result lines up with `new`.
    fn replay(old: &[Item], new: &[Item], ops: &[RowOp]) {
        let mut rows: Vec<Option<u32>> = old.iter().map(|r| Some(r.id)).collect();
        for op in ops {
            match *op {
                RowOp::Remove(i) => {
                    rows.remove(i);
                }
                RowOp::Insert(i) => rows.insert(i, None),
                RowOp::Move { from, to } => {
                    let r = rows.remove(from);
                    rows.insert(to, r);
                }
                RowOp::Change(i) => assert!(i < rows.len()),
            }
        }
        assert_eq!(rows.len(), new.len());
        let old_ids: HashSet<u32> = old.iter().map(|r| r.id).collect();
        for (slot, row) in rows.iter().zip(new) {
            match slot {
                Some(id) => assert_eq!(*id, row.id),
                None => assert!(!old_ids.contains(&row.id)),
            }
        }
    }

    fn moves(ops: &[RowOp]) -> usize {
        ops.iter()
            .filter(|op| matches!(op, RowOp::Move { .. }))
            .count()
    }

    #[test]
    fn identical_lists_need_no_ops() {
        assert!(diff(&items(&[1, 2, 3]), &items(&[1, 2, 3])).is_empty());
    }

    #[test]
    fn removals_come_back_to_front() {
        let ops = diff(&items(&[1, 2, 3, 4]), &items(&[2, 4]));
        assert_eq!(ops.as_slice(), &[RowOp::Remove(2), RowOp::Remove(0)]);
    }

    #[test]
    fn inserts_into_empty_list() {
        let old = items(&[]);
        let new = items(&[5, 6, 7]);
        let ops = diff(&old, &new);
        assert_eq!(ops.len(), 3);
        replay(&old, &new, &ops);
    }

    #[test]
    fn rotation_costs_one_move() {
        let old = items(&[1, 2, 3, 4, 5]);
        let new = items(&[5, 1, 2, 3, 4]);
        let ops = diff(&old, &new);
        assert_eq!(ops.as_slice(), &[RowOp::Move { from: 4, to: 0 }]);
        replay(&old, &new, &ops);
    }

    #[test]
    fn reversal_moves_all_but_one() {
        let old = items(&[1, 2, 3, 4]);
        let new = items(&[4, 3, 2, 1]);
        let ops = diff(&old, &new);
        assert_eq!(moves(&ops), 3);
        replay(&old, &new, &ops);
    }

    #[test]
    fn mixed_edit_scripts_replay_correctly() {
        let cases: &[(&[u32], &[u32])] = &[
            (&[1, 2, 3], &[3, 1, 2]),
            (&[1, 9, 2], &[1, 2, 9]),
            (&[2, 9, 1], &[9, 2, 1]),
            (&[1, 2, 3, 4, 5, 6], &[6, 10, 2, 4, 11, 1]),
            (&[7, 8, 9], &[]),
            (&[1, 2, 3, 4, 5], &[3, 12, 5, 1, 13, 2, 4]),
        ];
        for (old, new) in cases {
            let (old, new) = (items(old), items(new));
            let ops = diff(&old, &new);
            replay(&old, &new, &ops);
        }
    }

    #[test]
    fn content_changes_are_reported_at_final_positions() {
        let old = items(&[1, 2]);
        let mut new = items(&[2, 1]);
        new[0].label = "renamed";
        let ops = diff(&old, &new);
        assert!(ops.contains(&RowOp::Change(0)));
        assert!(!ops.contains(&RowOp::Change(1)));
    }

    #[test]
    fn duplicate_keys_fall_back_to_reload() {
        let ops = diff(&items(&[1, 2]), &items(&[3, 3]));
        let rendered: Vec<String> = ops.iter().map(|op| format!("{op:?}")).collect();
        insta::assert_snapshot!(rendered.join(" "), @"Remove(1) Remove(0) Insert(0) Insert(1)");
    }

    #[test]
    fn lis_picks_a_longest_run() {
        let seq = [3, 1, 4, 1, 5, 9, 2, 6];
        let idx = longest_increasing(&seq);
        let run: Vec<usize> = idx.iter().map(|&i| seq[i]).collect();
        assert_eq!(run.len(), 4);
        assert!(run.windows(2).all(|w| w[0] < w[1]));
    }

    struct Clicks {
        seen: RefCell<Vec<(u32, usize)>>,
        images: Rc<ImageRequests>,
    }

    impl ItemDelegate<Item> for Clicks {
        fn on_item_clicked(&self, item: &Item, position: usize) {
            self.seen.borrow_mut().push((item.id, position));
        }
        fn image_loader(&self) -> Rc<dyn ImageLoader> {
            self.images.clone()
        }
    }

    fn reconciler() -> (ListReconciler<Item>, Rc<Clicks>) {
        let clicks = Rc::new(Clicks {
            seen: RefCell::new(Vec::new()),
            images: Rc::new(ImageRequests::default()),
        });
        (ListReconciler::new(clicks.clone()), clicks)
    }

    #[test]
    fn click_targets_the_row_currently_at_position() {
        let (rec, clicks) = reconciler();
        rec.swap_items(items(&[1, 2, 3]));
        rec.swap_items(items(&[3, 1, 2]));
        assert!(rec.click(0));
        assert!(!rec.click(3));
        assert_eq!(*clicks.seen.borrow(), vec![(3, 0)]);
    }

    #[test]
    fn bind_loads_artwork_only_for_rows_with_art() {
        let (rec, clicks) = reconciler();
        rec.swap_items(items(&[1, 2]));
        assert!(!rec.bind(0, ImageTarget(10)));
        assert!(rec.bind(1, ImageTarget(11)));
        assert_eq!(
            clicks.images.requests(),
            vec![("https://img.example/even.jpg".to_owned(), ImageTarget(11))]
        );
    }

    #[derive(Default)]
    struct Recycler {
        applied: Vec<RowOp>,
        top: Option<usize>,
        scrolled: Cell<Option<usize>>,
    }

    impl ListSurface for Recycler {
        fn apply(&mut self, op: RowOp) {
            self.applied.push(op);
        }
        fn first_visible(&self) -> Option<usize> {
            self.top
        }
        fn scroll_to(&mut self, position: usize) {
            self.scrolled.set(Some(position));
        }
    }

    #[test]
    fn surface_receives_ops_and_keeps_top_row_in_view() {
        let (rec, _) = reconciler();
        let surface = Rc::new(RefCell::new(Recycler::default()));
        rec.attach(surface.clone());
        rec.swap_items(items(&[1, 2, 3]));
        surface.borrow_mut().top = Some(1);

        let outcome = rec.swap_items(items(&[0, 3, 1, 2]));
        assert_eq!(outcome.anchor, Some(3));
        assert_eq!(surface.borrow().scrolled.get(), Some(3));
        assert_eq!(surface.borrow().applied.len(), 3 + outcome.ops.len());
    }

    fn keys() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::hash_set(0u32..40, 0..24)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn any_keyed_edit_replays_to_the_new_list(old in keys(), new in keys()) {
            let (old, new) = (items(&old), items(&new));
            let ops = diff(&old, &new);
            replay(&old, &new, &ops);
            prop_assert!(moves(&ops) <= new.len());
            prop_assert!(ops.iter().all(|op| !matches!(op, RowOp::Change(_))));
        }
    }
}
