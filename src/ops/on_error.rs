use std::convert::Infallible;

use crate::prelude::*;
use crate::type_hint::TypeHint;

pub struct OnErrorOp<S, F, Err> {
  pub(crate) source: S,
  pub(crate) func: F,
  _hint: TypeHint<Err>,
}

impl<S, F, Err> OnErrorOp<S, F, Err> {
  pub fn new(source: S, func: F) -> Self {
    OnErrorOp { source, func, _hint: TypeHint::new() }
  }
}

impl<S, F, Item, Err, O> Observable<Item, Infallible, O> for OnErrorOp<S, F, Err>
where
  O: Observer<Item, Infallible>,
  S: Observable<Item, Err, OnErrorObserver<O, F>>,
  F: FnOnce(Err),
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(OnErrorObserver { observer, func: self.func })
  }
}

impl<S, F, Item, Err> ObservableExt<Item, Infallible> for OnErrorOp<S, F, Err> where
  S: ObservableExt<Item, Err>
{
}

pub struct OnErrorObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for OnErrorObserver<O, F>
where
  O: Observer<Item, Infallible>,
  F: FnOnce(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { (self.func)(err); }

  #[inline]
  fn complete(self) { self.observer.complete(); }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn swallows_error() {
    let mut error = None;
    let mut completed = false;
    observable::throw("oh no")
      .on_error(|e| error = Some(e))
      .on_complete(|| completed = true)
      .subscribe(|_: ()| {});

    assert_eq!(error, Some("oh no"));
    assert!(!completed);
  }

  #[test]
  fn untouched_on_complete() {
    use std::{cell::Cell, rc::Rc};

    let error: Rc<Cell<Option<&str>>> = Rc::new(Cell::new(None));
    let sum = Rc::new(Cell::new(0));
    let c_error = error.clone();
    let c_sum = sum.clone();
    let mut subject = Subject::default();
    subject
      .clone()
      .on_error(move |e| c_error.set(Some(e)))
      .subscribe(move |v| c_sum.set(c_sum.get() + v));

    subject.next(1);
    subject.next(2);
    subject.complete();

    assert_eq!(sum.get(), 3);
    assert_eq!(error.get(), None);
  }
}
