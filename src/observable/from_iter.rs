use std::{
  convert::Infallible,
  iter::{Repeat, Take},
};

use crate::prelude::*;

/// Creates an observable that pushes every value of an iterator, then
/// completes. Never errors.
///
/// Emission stops early when the downstream chain reports itself finished,
/// so an infinite iterator composes with operators such as
/// [`take`](ObservableExt::take).
///
/// # Arguments
///
/// * `iter` - The iterator the values come from.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let mut collected = vec![];
/// observable::from_iter(0..4).subscribe(|v| collected.push(v));
/// assert_eq!(collected, vec![0, 1, 2, 3]);
/// ```
pub fn from_iter<Iter>(iter: Iter) -> IterObservable<Iter>
where
  Iter: IntoIterator,
{
  IterObservable(iter)
}

#[derive(Clone)]
pub struct IterObservable<Iter>(Iter);

impl<O, Iter> Observable<Iter::Item, Infallible, O> for IterObservable<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_finished() {
        return;
      }
      observer.next(v);
    }
    observer.complete();
  }
}

impl<Iter> ObservableExt<Iter::Item, Infallible> for IterObservable<Iter> where Iter: IntoIterator {}

/// Creates an observable that pushes the same value `n` times, then
/// completes.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let mut sum = 0;
/// observable::repeat(7, 3).subscribe(|v| sum += v);
/// assert_eq!(sum, 21);
/// ```
pub fn repeat<Item>(v: Item, n: usize) -> IterObservable<Take<Repeat<Item>>>
where
  Item: Clone,
{
  from_iter(std::iter::repeat(v).take(n))
}
