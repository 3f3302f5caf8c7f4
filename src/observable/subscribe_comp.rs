use crate::prelude::*;

#[derive(Clone)]
pub struct ObserverComp<N, C> {
  next: N,
  complete: C,
}

impl<Item, Err, N, C> Observer<Item, Err> for ObserverComp<N, C>
where
  N: FnMut(Item),
  C: FnOnce(),
{
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(self, _err: Err) {}

  fn complete(self) { (self.complete)(); }

  #[inline]
  fn is_finished(&self) -> bool { false }
}

pub trait ObservableComp<Item, Err, N, C> {
  type Unsub: Subscription;

  /// Invokes an execution of an observable with handlers for its values and
  /// its completion. Errors are dropped, as with
  /// [`subscribe`](crate::observable::ObservableItem::subscribe).
  fn subscribe_complete(self, next: N, complete: C) -> Self::Unsub;
}

impl<S, Item, Err, N, C> ObservableComp<Item, Err, N, C> for S
where
  S: Observable<Item, Err, ObserverComp<N, C>>,
  N: FnMut(Item),
  C: FnOnce(),
{
  type Unsub = S::Unsub;

  fn subscribe_complete(self, next: N, complete: C) -> Self::Unsub {
    self.actual_subscribe(ObserverComp { next, complete })
  }
}
