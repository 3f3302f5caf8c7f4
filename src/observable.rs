use crate::observer::Observer;
#[cfg(feature = "timer")]
use crate::ops::delay::{DelayOp, DelayOpThreads, DelaySubscriptionOp};
use crate::ops::{
  filter::FilterOp,
  finalize::{FinalizeOp, FinalizeOpThreads},
  map::MapOp,
  map_with_err::MapWithErrOp,
  on_complete::OnCompleteOp,
  on_error::OnErrorOp,
  switch_map::{SwitchMapOp, SwitchMapOpThreads},
  take::TakeOp,
};
#[cfg(feature = "timer")]
use crate::scheduler::Duration;
use crate::subscription::Subscription;
use crate::type_hint::TypeHint;

pub mod create;
pub mod from_iter;
pub mod of;
mod subscribe_all;
mod subscribe_comp;
mod subscribe_err;
mod subscribe_item;
#[cfg(feature = "timer")]
pub mod timer;
pub mod trivial;

pub use create::*;
pub use from_iter::*;
pub use of::*;
pub use subscribe_all::*;
pub use subscribe_comp::*;
pub use subscribe_err::*;
pub use subscribe_item::*;
#[cfg(feature = "timer")]
pub use timer::*;
pub use trivial::*;

/// A push-based value sequence.
///
/// An observable is only a description; every `actual_subscribe` starts an
/// independent execution for the given observer and returns the handle that
/// cancels exactly that execution. Subjects are the one exception, they
/// multicast a single execution to all of their observers.
pub trait Observable<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  type Unsub: Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Combinator constructors, implemented by every observable for its emitted
/// `Item`/`Err` pair. Construction never subscribes anything; all bounds that
/// matter are checked where the built chain is finally subscribed.
pub trait ObservableExt<Item, Err>: Sized {
  /// Transforms every value with `f`.
  ///
  /// ```
  /// use rivulet::prelude::*;
  ///
  /// let mut sum = 0;
  /// observable::from_iter(1..=3).map(|v| v * 2).subscribe(|v| sum += v);
  /// assert_eq!(sum, 12);
  /// ```
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp { source: self, func: f, _hint: TypeHint::new() }
  }

  /// Transforms every value with a fallible `f`; the first `Err` is delivered
  /// as the downstream error and ends this link of the chain.
  #[inline]
  fn map_with_err<B, F>(self, f: F) -> MapWithErrOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, Err>,
  {
    MapWithErrOp { source: self, func: f, _hint: TypeHint::new() }
  }

  /// Keeps the values `f` approves; errors and completion pass through
  /// untouched.
  ///
  /// ```
  /// use rivulet::prelude::*;
  ///
  /// let mut evens = vec![];
  /// observable::from_iter(1..=4).filter(|v| v % 2 == 0).subscribe(|v| evens.push(v));
  /// assert_eq!(evens, vec![2, 4]);
  /// ```
  #[inline]
  fn filter<F>(self, f: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp { source: self, filter: f }
  }

  /// Maps every value to an inner observable and mirrors only the most recent
  /// one. The previous inner subscription is disposed before the next inner
  /// is subscribed; the composed stream completes once the outer completed
  /// and the latest inner completed.
  #[inline]
  fn switch_map<Inner, F>(self, f: F) -> SwitchMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    SwitchMapOp { source: self, func: f, _hint: TypeHint::new() }
  }

  /// [`switch_map`](ObservableExt::switch_map) for chains that cross threads.
  #[inline]
  fn switch_map_threads<Inner, F>(self, f: F) -> SwitchMapOpThreads<Self, F, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    SwitchMapOpThreads { source: self, func: f, _hint: TypeHint::new() }
  }

  /// Passes along the first `count` values, then completes.
  #[inline]
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp { source: self, count } }

  /// Calls `f` when the stream completes.
  #[inline]
  fn on_complete<F>(self, f: F) -> OnCompleteOp<Self, F>
  where
    F: FnOnce(),
  {
    OnCompleteOp { source: self, func: f }
  }

  /// Consumes the stream's error with `f`. The chain downstream of this
  /// operator can no longer error, so plain
  /// [`subscribe`](crate::observable::ObservableItem::subscribe) on it drops
  /// nothing.
  #[inline]
  fn on_error<F>(self, f: F) -> OnErrorOp<Self, F, Err>
  where
    F: FnOnce(Err),
  {
    OnErrorOp::new(self, f)
  }

  /// Calls `f` exactly once when the stream ends for any reason: complete,
  /// error, or unsubscribe.
  #[inline]
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOp::new(self, f)
  }

  /// [`finalize`](ObservableExt::finalize) for chains that cross threads.
  #[inline]
  fn finalize_threads<F>(self, f: F) -> FinalizeOpThreads<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOpThreads::new(self, f)
  }

  /// Reschedules every value, error, and completion onto `scheduler`, each
  /// postponed by `delay`.
  #[cfg(feature = "timer")]
  #[inline]
  fn delay<SD>(self, delay: Duration, scheduler: SD) -> DelayOp<Self, SD> {
    DelayOp::new(self, delay, scheduler)
  }

  /// [`delay`](ObservableExt::delay) for chains that cross threads.
  #[cfg(feature = "timer")]
  #[inline]
  fn delay_threads<SD>(self, delay: Duration, scheduler: SD) -> DelayOpThreads<Self, SD> {
    DelayOpThreads::new(self, delay, scheduler)
  }

  /// Postpones only the subscription to the source by `delay`; the values
  /// themselves flow undelayed.
  #[cfg(feature = "timer")]
  #[inline]
  fn delay_subscription<SD>(self, delay: Duration, scheduler: SD) -> DelaySubscriptionOp<Self, SD> {
    DelaySubscriptionOp::new(self, delay, scheduler)
  }
}
