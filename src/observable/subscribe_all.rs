use crate::prelude::*;

#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  fn next(&mut self, value: Item) { (self.next)(value); }

  fn error(self, err: Err) { (self.error)(err); }

  fn complete(self) { (self.complete)(); }

  #[inline]
  fn is_finished(&self) -> bool { false }
}

pub trait ObservableAll<Item, Err, N, E, C> {
  type Unsub: Subscription;

  /// Invokes an execution of an observable with handlers for all three kinds
  /// of notification.
  fn subscribe_all(self, next: N, error: E, complete: C) -> Self::Unsub;
}

impl<S, Item, Err, N, E, C> ObservableAll<Item, Err, N, E, C> for S
where
  S: Observable<Item, Err, ObserverAll<N, E, C>>,
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  type Unsub = S::Unsub;

  fn subscribe_all(self, next: N, error: E, complete: C) -> Self::Unsub {
    self.actual_subscribe(ObserverAll { next, error, complete })
  }
}
