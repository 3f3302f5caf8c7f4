use std::convert::Infallible;

use crate::prelude::*;
use crate::type_hint::TypeHint;

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `e` - An error to emit and terminate with
pub fn throw<Err>(e: Err) -> ThrowObservable<Err> { ThrowObservable(e) }

#[derive(Clone)]
pub struct ThrowObservable<Err>(Err);

impl<Err, O> Observable<(), Err, O> for ThrowObservable<Err>
where
  O: Observer<(), Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.error(self.0); }
}

impl<Err> ObservableExt<(), Err> for ThrowObservable<Err> {}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// # Examples
/// ```
/// use rivulet::prelude::*;
///
/// observable::empty().subscribe(|v: i32| println!("{v}"));
///
/// // Result: nothing printed
/// ```
pub fn empty<Item>() -> EmptyObservable<Item> { EmptyObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct EmptyObservable<Item>(TypeHint<Item>);

impl<Item, O> Observable<Item, Infallible, O> for EmptyObservable<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.complete(); }
}

impl<Item> ObservableExt<Item, Infallible> for EmptyObservable<Item> {}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error. The returned
/// handle is inert; there is nothing running to cancel.
pub fn never() -> NeverObservable { NeverObservable }

#[derive(Clone)]
pub struct NeverObservable;

impl<O> Observable<(), Infallible, O> for NeverObservable
where
  O: Observer<(), Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, _: O) -> Self::Unsub {}
}

impl ObservableExt<(), Infallible> for NeverObservable {}
