use std::convert::Infallible;

use crate::prelude::*;

/// Creates an observable that pushes the values given, then completes. Never
/// errors.
///
/// # Examples
///
/// ```
/// use rivulet::of_sequence;
/// use rivulet::prelude::*;
///
/// let mut sum = 0;
/// of_sequence!(1, 2, 3).subscribe(|v| sum += v);
/// assert_eq!(sum, 6);
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* ) => {
    $crate::observable::from_iter([$($item),*])
  };
}

/// Creates an observable that pushes a single value, then completes. Never
/// errors.
///
/// # Arguments
///
/// * `v` - The value to push.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let mut value = 0;
/// observable::of(123).subscribe(|v| value = v);
/// assert_eq!(value, 123);
/// ```
pub fn of<Item>(v: Item) -> OfObservable<Item> { OfObservable(v) }

#[derive(Clone)]
pub struct OfObservable<Item>(Item);

impl<Item, O> Observable<Item, Infallible, O> for OfObservable<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.next(self.0);
    observer.complete();
  }
}

impl<Item> ObservableExt<Item, Infallible> for OfObservable<Item> {}

/// Creates an observable that pushes the value of a [`Result`] then
/// completes, or pushes its error instead.
///
/// # Arguments
///
/// * `r` - The result the single emission comes from.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let r: Result<i32, &str> = Ok(1234);
/// observable::of_result(r).subscribe(|v| println!("{v}"));
/// ```
pub fn of_result<Item, Err>(r: Result<Item, Err>) -> ResultObservable<Item, Err> {
  ResultObservable(r)
}

#[derive(Clone)]
pub struct ResultObservable<Item, Err>(Result<Item, Err>);

impl<Item, Err, O> Observable<Item, Err, O> for ResultObservable<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    match self.0 {
      Ok(v) => {
        observer.next(v);
        observer.complete();
      }
      Err(e) => observer.error(e),
    }
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ResultObservable<Item, Err> {}

/// Creates an observable that pushes the value of an [`Option`] if there is
/// one, then completes. Never errors.
///
/// # Arguments
///
/// * `o` - The option the emission comes from.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let mut value = 0;
/// observable::of_option(Some(1234)).subscribe(|v| value = v);
/// assert_eq!(value, 1234);
/// ```
pub fn of_option<Item>(o: Option<Item>) -> OptionObservable<Item> { OptionObservable(o) }

#[derive(Clone)]
pub struct OptionObservable<Item>(Option<Item>);

impl<Item, O> Observable<Item, Infallible, O> for OptionObservable<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    if let Some(v) = self.0 {
      observer.next(v);
    }
    observer.complete();
  }
}

impl<Item> ObservableExt<Item, Infallible> for OptionObservable<Item> {}

/// Creates an observable that calls `f` on subscribe and pushes its return
/// value, then completes. Never errors.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// let mut value = 0;
/// observable::of_fn(|| 1234).subscribe(|v| value = v);
/// assert_eq!(value, 1234);
/// ```
pub fn of_fn<F, Item>(f: F) -> CallableObservable<F>
where
  F: FnOnce() -> Item,
{
  CallableObservable(f)
}

#[derive(Clone)]
pub struct CallableObservable<F>(F);

impl<Item, F, O> Observable<Item, Infallible, O> for CallableObservable<F>
where
  F: FnOnce() -> Item,
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.next((self.0)());
    observer.complete();
  }
}

impl<Item, F> ObservableExt<Item, Infallible> for CallableObservable<F> where F: FnOnce() -> Item {}

#[cfg(test)]
mod test {
  use bencher::{benchmark_group, Bencher};

  use crate::prelude::*;

  #[test]
  fn of_fn() {
    let mut value = 0;
    let mut completed = false;
    observable::of_fn(|| 123).subscribe_complete(|v| value = v, || completed = true);

    assert_eq!(value, 123);
    assert!(completed);
  }

  #[test]
  fn of_option() {
    let mut value1 = 0;
    let mut completed1 = false;
    observable::of_option(Some(123)).subscribe_complete(|v| value1 = v, || completed1 = true);

    assert_eq!(value1, 123);
    assert!(completed1);

    let mut value2 = 0;
    let mut completed2 = false;
    observable::of_option(None).subscribe_complete(|v| value2 = v, || completed2 = true);

    assert_eq!(value2, 0);
    assert!(completed2);
  }

  #[test]
  fn of_result() {
    let mut value1 = 0;
    let mut completed1 = false;
    let r: Result<i32, &str> = Ok(123);
    observable::of_result(r).subscribe_all(|v| value1 = v, |_| {}, || completed1 = true);

    assert_eq!(value1, 123);
    assert!(completed1);

    let mut value2 = 0;
    let mut error_reported = false;
    let r: Result<i32, &str> = Err("error");
    observable::of_result(r).subscribe_err(|_| value2 = 123, |_| error_reported = true);

    assert_eq!(value2, 0);
    assert!(error_reported);
  }

  #[test]
  fn of() {
    let mut value = 0;
    let mut completed = false;
    observable::of(100).subscribe_complete(|v| value = v, || completed = true);

    assert_eq!(value, 100);
    assert!(completed);
  }

  #[test]
  fn of_macros() {
    let mut value = 0;
    of_sequence!(1, 2, 3).subscribe(|v| value += v);

    assert_eq!(value, 6);
  }

  #[test]
  fn bench() { do_bench(); }

  benchmark_group!(do_bench, bench_of);

  fn bench_of(b: &mut Bencher) {
    b.iter(|| {
      let mut value = 0;
      observable::of(100).subscribe(|v| value = v);
      value
    });
  }
}
