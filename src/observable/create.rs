use crate::prelude::*;
use crate::type_hint::TypeHint;

/// The push capability handed to a [`create`] producer.
///
/// Unlike [`Observer`], all methods take `&mut self`, which keeps the
/// producer closure free of the concrete observer type (`&mut dyn Emitter`)
/// and lets it emit in a loop. The first `error` or `complete` consumes the
/// inner observer; everything pushed afterwards is dropped.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);
  /// True once the downstream chain stopped wanting values, either because a
  /// terminal was pushed or because it finished on its own. Long-running
  /// producers should poll this and stop.
  fn is_finished(&self) -> bool;
}

/// Creates an observable from a producer function.
///
/// The producer receives the push capability and returns its teardown, which
/// becomes the subscription handle; producers without anything to tear down
/// simply return `()`.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let mut collected = vec![];
/// observable::create(|emitter: &mut dyn Emitter<i32, ()>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// })
/// .subscribe(|v| collected.push(v));
/// assert_eq!(collected, vec![1, 2]);
/// ```
pub fn create<F, Item, Err>(producer: F) -> CreateObservable<F, Item, Err> {
  CreateObservable { producer, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct CreateObservable<F, Item, Err> {
  producer: F,
  _hint: TypeHint<(Item, Err)>,
}

struct CreateEmitter<O>(Option<O>);

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(observer) = &mut self.0 {
      observer.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) {
    if let Some(observer) = self.0.take() {
      observer.error(err);
    }
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(observer) = self.0.take() {
      observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.0.as_ref().map_or(true, Observer::is_finished) }
}

impl<F, Item, Err, O, U> Observable<Item, Err, O> for CreateObservable<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> U,
  U: Subscription,
{
  type Unsub = U;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut emitter = CreateEmitter(Some(observer));
    (self.producer)(&mut emitter)
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for CreateObservable<F, Item, Err> {}
