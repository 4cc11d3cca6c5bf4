//! Rendering a result channel into a list screen.
//!
//! ```text
//! Idle ──▶ Loading ──▶ Showing(rows)
//!            ▲   └───▶ ShowingError(failure)
//!            └──────── refresh
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use encore_core::{Failure, ResultState};

use crate::ports::{Connectivity, Message, Toaster, error_message};
use crate::reconciler::{ListReconciler, Row};
use crate::surface::{ScreenSurface, SurfaceState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScreenState<T> {
    Idle,
    Loading,
    Showing(T),
    ShowingError(Failure),
}

/// Shared by every screen of one app instance.
#[derive(Clone)]
pub struct Feedback {
    pub connectivity: Rc<dyn Connectivity>,
    pub toaster: Rc<dyn Toaster>,
}

impl Feedback {
    /// Toast for `failure`, picked with connectivity as of now.
    pub fn report(&self, failure: Failure) -> Message {
        log::debug!("reporting {failure:?}");
        let message = error_message(self.connectivity.is_network_available());
        self.toaster.toast(message);
        message
    }
}

type Arrange<T> = Box<dyn Fn(&mut Vec<T>)>;

pub struct ScreenController<T: Row> {
    state: RefCell<ScreenState<Vec<T>>>,
    surface: Rc<RefCell<SurfaceState>>,
    reconciler: ListReconciler<T>,
    feedback: Feedback,
    arrange: Option<Arrange<T>>,
}

impl<T: Row> ScreenController<T> {
    pub fn new(reconciler: ListReconciler<T>, feedback: Feedback) -> Self {
        let surface = Rc::new(RefCell::new(SurfaceState::default()));
        reconciler.attach(surface.clone());
        Self {
            state: RefCell::new(ScreenState::Idle),
            surface,
            reconciler,
            feedback,
            arrange: None,
        }
    }

    /// Ordering applied to every successful payload before it is shown.
    pub fn arrange_with(mut self, f: impl Fn(&mut Vec<T>) + 'static) -> Self {
        self.arrange = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> ScreenState<Vec<T>> {
        self.state.borrow().clone()
    }

    pub fn surface(&self) -> SurfaceState {
        self.surface.borrow().clone()
    }

    pub fn reconciler(&self) -> &ListReconciler<T> {
        &self.reconciler
    }

    pub fn render(&self, result: &ResultState<Vec<T>>) {
        match result {
            ResultState::Loading => {
                // re-entering Loading keeps the indicator up with no terminal in between
                self.surface.borrow_mut().set_refreshing(true);
                *self.state.borrow_mut() = ScreenState::Loading;
            }
            ResultState::Success(rows) => {
                let mut rows = rows.clone();
                if let Some(arrange) = &self.arrange {
                    arrange(&mut rows);
                }
                {
                    let mut surface = self.surface.borrow_mut();
                    surface.set_refreshing(false);
                    surface.set_list_visible(!rows.is_empty());
                    surface.set_empty_visible(rows.is_empty());
                }
                self.reconciler.swap_items(rows.clone());
                *self.state.borrow_mut() = ScreenState::Showing(rows);
            }
            ResultState::Error(failure) => {
                self.surface.borrow_mut().set_refreshing(false);
                *self.state.borrow_mut() = ScreenState::ShowingError(*failure);
                self.feedback.report(*failure);
            }
        }
    }

    /// Outcome of a command such as like/unlike. Returns `true` on success.
    pub fn render_command(&self, result: &ResultState<()>, done: Message) -> bool {
        match result {
            ResultState::Loading => false,
            ResultState::Success(()) => {
                self.feedback.toaster.toast(done);
                true
            }
            ResultState::Error(failure) => {
                self.feedback.report(*failure);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ImageLoader, ImageRequests, SharedConnectivity, ToastLog};
    use crate::reconciler::ItemDelegate;
    use encore_core::Artist;

    struct Ignore;

    impl ItemDelegate<Artist> for Ignore {
        fn on_item_clicked(&self, _: &Artist, _: usize) {}
        fn image_loader(&self) -> Rc<dyn ImageLoader> {
            Rc::new(ImageRequests::default())
        }
    }

    fn controller(online: bool) -> (ScreenController<Artist>, Rc<ToastLog>, SharedConnectivity) {
        let toasts = Rc::new(ToastLog::default());
        let net = SharedConnectivity::new(online);
        let feedback = Feedback {
            connectivity: Rc::new(net.clone()),
            toaster: toasts.clone(),
        };
        (
            ScreenController::new(ListReconciler::new(Rc::new(Ignore)), feedback),
            toasts,
            net,
        )
    }

    #[test]
    fn empty_result_shows_placeholder() {
        let (c, _, _) = controller(true);
        c.render(&ResultState::Loading);
        c.render(&ResultState::Success(vec![]));
        let s = c.surface();
        assert!(s.empty_visible);
        assert!(!s.list_visible);
        assert!(!s.refreshing);
        assert_eq!(c.state(), ScreenState::Showing(vec![]));
    }

    #[test]
    fn rows_hide_placeholder() {
        let (c, _, _) = controller(true);
        c.render(&ResultState::Success(vec![Artist::new(1, "Low")]));
        let s = c.surface();
        assert!(s.list_visible);
        assert!(!s.empty_visible);
        assert_eq!(s.rows, 1);
    }

    #[test]
    fn connection_failure_while_online_reads_as_temporary() {
        let (c, toasts, _) = controller(true);
        c.render(&ResultState::Loading);
        c.render(&ResultState::Error(Failure::ConnectionFailure));
        assert_eq!(toasts.messages(), vec![Message::ConnectionFailure]);
        assert_eq!(
            c.state(),
            ScreenState::ShowingError(Failure::ConnectionFailure)
        );
        assert!(!c.surface().refreshing);
    }

    #[test]
    fn connectivity_is_checked_when_rendering() {
        let (c, toasts, net) = controller(true);
        net.set_online(false);
        c.render(&ResultState::Error(Failure::UnexpectedFailure));
        assert_eq!(toasts.last(), Some(Message::NoConnection));
    }

    #[test]
    fn reloading_keeps_indicator_on() {
        let (c, _, _) = controller(true);
        c.render(&ResultState::Loading);
        c.render(&ResultState::Loading);
        c.render(&ResultState::Success(vec![Artist::new(1, "Low")]));
        assert_eq!(c.surface().refresh_log, vec![true, true, false]);
    }

    #[test]
    fn arrange_runs_before_rows_are_shown() {
        let (c, _, _) = controller(true);
        let c = c.arrange_with(|rows: &mut Vec<Artist>| rows.sort_by(|a, b| a.name.cmp(&b.name)));
        c.render(&ResultState::Success(vec![
            Artist::new(1, "Wire"),
            Artist::new(2, "Can"),
        ]));
        let names: Vec<String> = c.reconciler().items().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Can", "Wire"]);
    }

    #[test]
    fn commands_toast_on_completion() {
        let (c, toasts, _) = controller(true);
        assert!(!c.render_command(&ResultState::Loading, Message::Liked));
        assert!(c.render_command(&ResultState::Success(()), Message::Liked));
        assert!(!c.render_command(
            &ResultState::Error(Failure::UnexpectedFailure),
            Message::Liked
        ));
        assert_eq!(
            toasts.messages(),
            vec![Message::Liked, Message::ConnectionFailure]
        );
    }

    #[test]
    fn unexpected_failure_online_reads_as_temporary() {
        let (c, toasts, _) = controller(true);
        c.render(&ResultState::Error(Failure::UnexpectedFailure));
        assert_eq!(toasts.messages(), vec![Message::ConnectionFailure]);
        assert_eq!(
            c.state(),
            ScreenState::ShowingError(Failure::UnexpectedFailure)
        );
    }
}
