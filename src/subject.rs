//! Multicast hubs.
//!
//! A subject is both an observer and an observable: values pushed into it
//! fan out to every registered observer of the same hub. [`Subject`] is the
//! single-thread flavor; re-entrant emission from inside a callback is
//! queued and replayed in arrival order once the current fan-out returns.
//! [`SubjectThreads`] serializes producers and subscribers on one mutex
//! instead, held for the whole fan-out; it must not be re-entered from its
//! own callbacks.

use smallvec::SmallVec;

pub mod behavior_subject;
pub mod local_subject;
pub mod replay_subject;
pub mod shared_subject;

pub use behavior_subject::{BehaviorSubject, BehaviorSubjectThreads};
pub use local_subject::{Subject, SubjectSubscription};
pub use replay_subject::{ReplaySubject, ReplaySubjectThreads};
pub use shared_subject::{SubjectSubscriptionThreads, SubjectThreads};

/// Where a hub is in its lifecycle. Once a terminal is accepted the registry
/// is gone and only the terminal itself remains, so late subscribers can be
/// handed it directly.
pub(crate) enum SubjectState<E, Err> {
  Active(SmallVec<[E; 2]>),
  Completed,
  Errored(Err),
}
