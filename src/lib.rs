//! # rivulet: push-based reactive streams
//!
//! Observables describe value sequences, observers consume them, and
//! subscriptions cancel them. Nothing runs until someone subscribes.
//!
//! ## Quick Start
//!
//! ```rust
//! use rivulet::prelude::*;
//!
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy description of a value sequence |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle that cancels one running execution |
//! | [`Subject`] | Hub that multicasts one execution to many observers |
//!
//! Most types come in pairs: a single-threaded flavor built on `Rc`, and a
//! `*Threads` flavor built on `Arc` whose pieces may cross threads.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): schedulers on top of the `futures`
//!   executor pools
//! - **`tokio-scheduler`**: scheduler on top of a tokio runtime handle
//! - **`timer`** (default): the timer source and the time-shifting operators
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject

pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscription;
pub mod type_hint;

pub use prelude::*;

pub use crate::scheduler::{Duration, Instant};

// README code blocks are compiled as doctests.
#[cfg(doctest)]
mod readme_doctests {
  #![doc = include_str!("../README.md")]
}
