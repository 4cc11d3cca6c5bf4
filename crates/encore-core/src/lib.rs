//! # Signals, channels and the UI thread
//!
//! Encore's presentation layer is built from a few small pieces:
//!
//! - [`Signal<T>`]: observable value with a subscriber list.
//! - [`ResultChannel<T>`]: a signal of [`ResultState<T>`] fed by use cases
//!   running on an [`Executor`].
//! - [`looper`]: the UI-thread mailbox that moves finished work back into
//!   channels, so observers are only ever called on the UI thread.
//! - [`Scope`] / [`Dispose`]: lifetimes for subscriptions, usually one scope
//!   per navigation entry.
//!
//! ## Signals
//!
//! ```rust
//! use encore_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! ## Scopes
//!
//! Observers registered through `observe_in` are dropped with their scope:
//!
//! ```rust
//! use std::sync::Arc;
//! use encore_core::*;
//!
//! let scope = Scope::new();
//! let albums = ResultChannel::<Vec<Album>>::new("albums", Arc::new(Inline));
//! albums.observe_in(&scope, |state| log::debug!("{state:?}"));
//! assert_eq!(albums.observer_count(), 1);
//! scope.dispose();
//! assert_eq!(albums.observer_count(), 0);
//! ```
//!
//! ## Domain
//!
//! [`model`] holds the catalog value types, [`repository`] the data ports and
//! [`usecase`] the operations screens invoke.

pub mod channel;
pub mod config;
pub mod effects;
pub mod error;
pub mod executor;
pub mod looper;
pub mod model;
pub mod repository;
pub mod result;
pub mod scope;
pub mod signal;
pub mod tests;
pub mod usecase;

pub use channel::*;
pub use config::*;
pub use effects::*;
pub use error::*;
pub use executor::*;
pub use model::*;
pub use repository::*;
pub use result::*;
pub use scope::*;
pub use signal::*;
pub use usecase::*;
