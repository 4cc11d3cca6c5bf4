use crate::reconciler::{ListSurface, RowOp};

/// Widgets a list screen toggles.
pub trait ScreenSurface {
    fn set_refreshing(&mut self, on: bool);
    fn set_list_visible(&mut self, visible: bool);
    fn set_empty_visible(&mut self, visible: bool);
}

/// Retained view state of one list screen. The platform draws from this;
/// headless runs and tests read it directly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceState {
    pub refreshing: bool,
    pub list_visible: bool,
    pub empty_visible: bool,
    pub rows: usize,
    pub first_visible: Option<usize>,
    /// Every row op applied, oldest first.
    pub ops: Vec<RowOp>,
    /// Every value `refreshing` was set to, oldest first.
    pub refresh_log: Vec<bool>,
}

impl ScreenSurface for SurfaceState {
    fn set_refreshing(&mut self, on: bool) {
        self.refreshing = on;
        self.refresh_log.push(on);
    }

    fn set_list_visible(&mut self, visible: bool) {
        self.list_visible = visible;
    }

    fn set_empty_visible(&mut self, visible: bool) {
        self.empty_visible = visible;
    }
}

impl ListSurface for SurfaceState {
    fn apply(&mut self, op: RowOp) {
        match op {
            RowOp::Insert(_) => self.rows += 1,
            RowOp::Remove(_) => self.rows = self.rows.saturating_sub(1),
            RowOp::Move { .. } | RowOp::Change(_) => {}
        }
        self.ops.push(op);
    }

    fn first_visible(&self) -> Option<usize> {
        self.first_visible
    }

    fn scroll_to(&mut self, position: usize) {
        self.first_visible = Some(position);
    }
}
