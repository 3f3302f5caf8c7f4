use crate::prelude::*;

#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TakeOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    // `take(0)` completes without waiting for a first value.
    let observer = if self.count == 0 {
      observer.complete();
      None
    } else {
      Some(observer)
    };
    self
      .source
      .actual_subscribe(TakeObserver { observer, count: self.count, hits: 0 })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TakeOp<S> where S: ObservableExt<Item, Err> {}

pub struct TakeObserver<O> {
  observer: Option<O>,
  count: usize,
  hits: usize,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.hits >= self.count {
      return;
    }
    self.hits += 1;
    if let Some(observer) = &mut self.observer {
      observer.next(value);
    }
    if self.hits == self.count {
      if let Some(observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.observer {
      observer.error(err)
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete()
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.as_ref().map_or(true, Observer::is_finished) }
}
