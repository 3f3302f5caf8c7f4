use crate::prelude::*;

#[derive(Clone)]
pub struct ObserverErr<N, E> {
  next: N,
  error: E,
}

impl<Item, Err, N, E> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnOnce(Err),
{
  fn next(&mut self, value: Item) { (self.next)(value); }

  fn error(self, err: Err) { (self.error)(err); }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { false }
}

pub trait ObservableErr<Item, Err, N, E> {
  type Unsub: Subscription;

  /// Invokes an execution of an observable with handlers for its values and
  /// its error.
  fn subscribe_err(self, next: N, error: E) -> Self::Unsub;
}

impl<S, Item, Err, N, E> ObservableErr<Item, Err, N, E> for S
where
  S: Observable<Item, Err, ObserverErr<N, E>>,
  N: FnMut(Item),
  E: FnOnce(Err),
{
  type Unsub = S::Unsub;

  fn subscribe_err(self, next: N, error: E) -> Self::Unsub {
    self.actual_subscribe(ObserverErr { next, error })
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn error_reaches_handler() {
    use std::{cell::RefCell, rc::Rc};

    let values = Rc::new(RefCell::new(vec![]));
    let error = Rc::new(RefCell::new(None));
    let c_values = values.clone();
    let c_error = error.clone();
    let mut subject = Subject::default();
    subject.clone().subscribe_err(
      move |v| c_values.borrow_mut().push(v),
      move |e| *c_error.borrow_mut() = Some(e),
    );

    subject.next(1);
    subject.error("boom");

    assert_eq!(*values.borrow(), vec![1]);
    assert_eq!(*error.borrow(), Some("boom"));
  }
}
