use crate::prelude::*;

#[derive(Clone)]
pub struct ObserverItem<N> {
  next: N,
}

impl<Item, Err, N> Observer<Item, Err> for ObserverItem<N>
where
  N: FnMut(Item),
{
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(self, _err: Err) {}

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { false }
}

pub trait ObservableItem<Item, Err, F> {
  type Unsub: Subscription;

  /// Invokes an execution of an observable with a handler for its values.
  ///
  /// Errors are dropped on the floor here; chains whose error is worth
  /// looking at subscribe through
  /// [`subscribe_err`](crate::observable::ObservableErr::subscribe_err) or
  /// [`subscribe_all`](crate::observable::ObservableAll::subscribe_all).
  fn subscribe(self, next: F) -> Self::Unsub;
}

impl<S, Item, Err, F> ObservableItem<Item, Err, F> for S
where
  S: Observable<Item, Err, ObserverItem<F>>,
  F: FnMut(Item),
{
  type Unsub = S::Unsub;

  fn subscribe(self, next: F) -> Self::Unsub { self.actual_subscribe(ObserverItem { next }) }
}

#[test]
fn raii() {
  use std::{cell::Cell, rc::Rc};

  let times = Rc::new(Cell::new(0));
  {
    let mut subject = Subject::<(), ()>::default();
    {
      let c_times = times.clone();
      let _ = subject
        .clone()
        .subscribe(move |_| {
          c_times.set(c_times.get() + 1);
        })
        .unsubscribe_when_dropped();
    } // <-- guard is dropped here!
    subject.next(());
  }
  assert_eq!(times.get(), 0);
}
