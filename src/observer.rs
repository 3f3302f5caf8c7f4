use crate::rc::{MutArc, MutRc, RcDeref, RcDerefMut};

/// The receiving half of a stream.
///
/// `next` delivers one value; `error` and `complete` consume the observer,
/// so a second terminal call is unrepresentable and nothing can be delivered
/// after one. `is_finished` lets long-running producers probe whether the
/// downstream chain still wants values and stop early when it does not.
pub trait Observer<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(self, err: Err);
  fn complete(self);
  fn is_finished(&self) -> bool;
}

/// Object-safe mirror of [`Observer`].
///
/// `Observer` is not object safe because its terminal methods take `self` by
/// value; this shim routes them through `Box<Self>` so heterogeneous
/// observers can live in one registry.
pub trait DynObserver<Item, Err> {
  fn dyn_next(&mut self, value: Item);
  fn dyn_error(self: Box<Self>, err: Err);
  fn dyn_complete(self: Box<Self>);
  fn dyn_is_finished(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  #[inline]
  fn dyn_next(&mut self, value: Item) { self.next(value) }
  #[inline]
  fn dyn_error(self: Box<Self>, err: Err) { (*self).error(err) }
  #[inline]
  fn dyn_complete(self: Box<Self>) { (*self).complete() }
  #[inline]
  fn dyn_is_finished(&self) -> bool { self.is_finished() }
}

/// Type-erased observer for single-threaded use.
pub type BoxObserver<'a, Item, Err> = Box<dyn DynObserver<Item, Err> + 'a>;
/// Type-erased observer that may cross threads.
pub type BoxObserverThreads<Item, Err> = Box<dyn DynObserver<Item, Err> + Send>;

macro_rules! impl_box_observer {
  ($ty: ty) => {
    impl<'a, Item, Err> Observer<Item, Err> for $ty {
      #[inline]
      fn next(&mut self, value: Item) { (**self).dyn_next(value) }
      #[inline]
      fn error(self, err: Err) { self.dyn_error(err) }
      #[inline]
      fn complete(self) { self.dyn_complete() }
      #[inline]
      fn is_finished(&self) -> bool { (**self).dyn_is_finished() }
    }
  };
}

impl_box_observer!(Box<dyn DynObserver<Item, Err> + 'a>);
impl_box_observer!(Box<dyn DynObserver<Item, Err> + Send + 'a>);

/// `None` swallows every event; `Some` delegates. Operators lean on this to
/// drop their downstream exactly once on a terminal edge.
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_finished(&self) -> bool { self.as_ref().map_or(true, Observer::is_finished) }
}

macro_rules! impl_shared_option_observer {
  ($rc: ident) => {
    impl<O, Item, Err> Observer<Item, Err> for $rc<Option<O>>
    where
      O: Observer<Item, Err>,
    {
      fn next(&mut self, value: Item) { self.rc_deref_mut().next(value) }

      fn error(self, err: Err) {
        if let Some(inner) = self.rc_deref_mut().take() {
          inner.error(err);
        }
      }

      fn complete(self) {
        if let Some(inner) = self.rc_deref_mut().take() {
          inner.complete();
        }
      }

      fn is_finished(&self) -> bool { self.rc_deref().is_none() }
    }
  };
}

impl_shared_option_observer!(MutRc);
impl_shared_option_observer!(MutArc);

#[cfg(test)]
mod tests {
  use super::*;

  struct Collect(Vec<i32>, bool);

  impl Observer<i32, ()> for Collect {
    fn next(&mut self, value: i32) { self.0.push(value); }
    fn error(self, _: ()) {}
    fn complete(self) {}
    fn is_finished(&self) -> bool { self.1 }
  }

  #[test]
  fn option_observer_takes_once() {
    let shared = MutRc::own(Some(Collect(vec![], false)));
    let mut proxy = shared.clone();
    proxy.next(1);
    proxy.next(2);
    assert!(!shared.is_finished());

    shared.clone().complete();
    assert!(shared.is_finished());
    // the inner observer is gone, later values fall through
    proxy.next(3);
    assert!(shared.rc_deref().is_none());
  }

  #[test]
  fn boxed_observer_round_trip() {
    let mut boxed: BoxObserver<'_, i32, ()> = Box::new(Collect(vec![], false));
    boxed.next(1);
    assert!(!boxed.is_finished());
    boxed.error(());
  }
}
