//! Capabilities the platform provides to screens, plus small in-process
//! implementations used by headless runs and tests.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Queried synchronously when an error is rendered.
pub trait Connectivity {
    fn is_network_available(&self) -> bool;
}

/// Opaque handle for the view an image should be drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageTarget(pub u64);

/// Fire-and-forget image loading.
pub trait ImageLoader {
    fn load_image(&self, url: &str, target: ImageTarget);
}

/// Transient user-facing messages.
pub trait Toaster {
    fn toast(&self, message: Message);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    NoConnection,
    ConnectionFailure,
    Liked,
    Unliked,
}

impl Message {
    pub fn text(&self) -> &'static str {
        match self {
            Message::NoConnection => "No internet connection",
            Message::ConnectionFailure => "Temporary connection failure, try again",
            Message::Liked => "Added to favorites",
            Message::Unliked => "Removed from favorites",
        }
    }
}

/// Picks the toast for a failed load. Only connectivity at render time
/// matters; the failure kind never changes the wording.
pub fn error_message(network_available: bool) -> Message {
    if network_available {
        Message::ConnectionFailure
    } else {
        Message::NoConnection
    }
}

/// Connectivity flag shared with whoever simulates the network.
#[derive(Clone, Debug)]
pub struct SharedConnectivity(Arc<AtomicBool>);

impl SharedConnectivity {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for SharedConnectivity {
    fn is_network_available(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Keeps every toast in order; logs them as they arrive.
#[derive(Default)]
pub struct ToastLog(RefCell<Vec<Message>>);

impl ToastLog {
    pub fn messages(&self) -> Vec<Message> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.0.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Toaster for ToastLog {
    fn toast(&self, message: Message) {
        log::info!("toast: {}", message.text());
        self.0.borrow_mut().push(message);
    }
}

/// Records image requests instead of fetching anything.
#[derive(Default)]
pub struct ImageRequests(RefCell<Vec<(String, ImageTarget)>>);

impl ImageRequests {
    pub fn requests(&self) -> Vec<(String, ImageTarget)> {
        self.0.borrow().clone()
    }
}

impl ImageLoader for ImageRequests {
    fn load_image(&self, url: &str, target: ImageTarget) {
        log::debug!("load image {url} into {target:?}");
        self.0.borrow_mut().push((url.to_owned(), target));
    }
}
