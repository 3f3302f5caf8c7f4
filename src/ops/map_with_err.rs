use crate::prelude::*;
use crate::type_hint::TypeHint;

#[derive(Clone)]
pub struct MapWithErrOp<S, F, Item> {
  pub(crate) source: S,
  pub(crate) func: F,
  pub(crate) _hint: TypeHint<Item>,
}

impl<Item, Err, O, S, F, B> Observable<B, Err, O> for MapWithErrOp<S, F, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, MapWithErrObserver<O, F>>,
  F: FnMut(Item) -> Result<B, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(MapWithErrObserver { observer: Some(observer), func: self.func })
  }
}

impl<Item, Err, S, F, B> ObservableExt<B, Err> for MapWithErrOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
}

pub struct MapWithErrObserver<O, F> {
  observer: Option<O>,
  func: F,
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapWithErrObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.func)(value) {
      Ok(v) => {
        if let Some(observer) = &mut self.observer {
          observer.next(v)
        }
      }
      Err(e) => {
        if let Some(observer) = self.observer.take() {
          observer.error(e)
        }
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
