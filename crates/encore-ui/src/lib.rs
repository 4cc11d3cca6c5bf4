//! Screens for browsing the catalog.
//!
//! A screen owns a view-model (result channels bound to use cases) and a
//! [`ScreenController`](screen::ScreenController) that turns channel states
//! into surface updates. Row changes go through the
//! [`ListReconciler`](reconciler::ListReconciler), which emits the smallest
//! set of row operations it can.

pub mod ports;
pub mod reconciler;
pub mod screen;
pub mod screens;
pub mod surface;
pub mod viewmodel;


pub use ports::{Connectivity, ImageLoader, ImageTarget, Message, Toaster, error_message};
pub use reconciler::{ItemDelegate, ListReconciler, ListSurface, Row, RowOp};
pub use screen::{Feedback, ScreenController, ScreenState};
pub use screens::{Screen, ScreenEnv};
pub use surface::{ScreenSurface, SurfaceState};
pub use viewmodel::UseCases;
