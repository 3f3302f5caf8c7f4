use crate::prelude::*;

#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FilterOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FilterObserver<O, F>>,
  F: FnMut(&Item) -> bool,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FilterOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn odd_rejected() {
    let mut collected = vec![];
    let mut completed = false;
    observable::from_iter(0..10)
      .filter(|v| v % 2 == 0)
      .subscribe_complete(|v| collected.push(v), || completed = true);

    assert_eq!(collected, vec![0, 2, 4, 6, 8]);
    assert!(completed);
  }

  #[test]
  fn pass_error() {
    use std::{cell::RefCell, rc::Rc};

    let error = Rc::new(RefCell::new(None));
    let c_error = error.clone();
    let subject = Subject::default();
    subject
      .clone()
      .filter(|_: &i32| true)
      .subscribe_err(|_| {}, move |e| *c_error.borrow_mut() = Some(e));

    subject.error("pass");
    assert_eq!(*error.borrow(), Some("pass"));
  }

  #[test]
  fn predicate_sees_a_borrow() {
    let mut lengths = vec![];
    observable::from_iter(vec![String::from("a"), String::from("bbb")])
      .filter(|s| s.len() > 1)
      .subscribe(|s| lengths.push(s.len()));

    assert_eq!(lengths, vec![3]);
  }
}
