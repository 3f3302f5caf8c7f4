//! Ordered-sequence composition: `pipe(source, (stage, stage, ..))` wires a
//! tuple of stage descriptors over a source, first stage innermost. The stage
//! set is closed; anything else composes through the method chain.

use crate::{
  observable::ObservableExt,
  ops::{filter::FilterOp, map::MapOp, switch_map::SwitchMapOp},
  type_hint::TypeHint,
};

/// One link of a pipe: knows how to wrap a source whose values are `Item`
/// and whose errors are `Err`.
pub trait Stage<S, Item, Err> {
  /// Value type the wrapped link emits.
  type OutItem;
  /// The observable produced by wiring this stage over `source`.
  type Output;

  fn apply(self, source: S) -> Self::Output;
}

/// An ordered tuple of stages, each consuming the previous one's output.
pub trait Pipeline<S, Item, Err> {
  type OutItem;
  type Output;

  fn compose(self, source: S) -> Self::Output;
}

/// Stage descriptor for [`map`](crate::observable::ObservableExt::map).
pub struct MapStage<F>(F);

/// Stage descriptor for [`filter`](crate::observable::ObservableExt::filter).
pub struct FilterStage<F>(F);

/// Stage descriptor for
/// [`switch_map`](crate::observable::ObservableExt::switch_map).
pub struct SwitchMapStage<F, B>(F, TypeHint<B>);

pub fn map<F>(f: F) -> MapStage<F> { MapStage(f) }

pub fn filter<F>(f: F) -> FilterStage<F> { FilterStage(f) }

pub fn switch_map<F, B>(f: F) -> SwitchMapStage<F, B> { SwitchMapStage(f, TypeHint::new()) }

/// Wires `stages` over `source` in order and returns the composed
/// observable; nothing runs until it is subscribed. Unsubscribing the
/// composed subscription tears down every link exactly once.
///
/// ```
/// use rivulet::prelude::*;
/// use rivulet::ops::pipe::{filter, map, pipe};
///
/// let mut collected = vec![];
/// pipe(
///   observable::from_iter([3, 6, 9]),
///   (map(|x: i32| x * 2), filter(|v: &i32| *v > 10)),
/// )
/// .subscribe(|v| collected.push(v));
///
/// assert_eq!(collected, vec![12, 18]);
/// ```
pub fn pipe<S, Item, Err, P>(source: S, stages: P) -> P::Output
where
  S: ObservableExt<Item, Err>,
  P: Pipeline<S, Item, Err>,
{
  stages.compose(source)
}

impl<S, Item, Err, F, B> Stage<S, Item, Err> for MapStage<F>
where
  F: FnMut(Item) -> B,
{
  type OutItem = B;
  type Output = MapOp<S, F, Item>;

  fn apply(self, source: S) -> Self::Output {
    MapOp { source, func: self.0, _hint: TypeHint::new() }
  }
}

impl<S, Item, Err, F> Stage<S, Item, Err> for FilterStage<F>
where
  F: FnMut(&Item) -> bool,
{
  type OutItem = Item;
  type Output = FilterOp<S, F>;

  fn apply(self, source: S) -> Self::Output { FilterOp { source, filter: self.0 } }
}

impl<S, Item, Err, F, Inner, B> Stage<S, Item, Err> for SwitchMapStage<F, B>
where
  F: FnMut(Item) -> Inner,
  Inner: ObservableExt<B, Err>,
{
  type OutItem = B;
  type Output = SwitchMapOp<S, F, Item>;

  fn apply(self, source: S) -> Self::Output {
    SwitchMapOp { source, func: self.0, _hint: TypeHint::new() }
  }
}

impl<S, Item, Err, A> Pipeline<S, Item, Err> for (A,)
where
  A: Stage<S, Item, Err>,
{
  type OutItem = A::OutItem;
  type Output = A::Output;

  fn compose(self, source: S) -> Self::Output { self.0.apply(source) }
}

impl<S, Item, Err, A, B> Pipeline<S, Item, Err> for (A, B)
where
  A: Stage<S, Item, Err>,
  B: Stage<A::Output, A::OutItem, Err>,
{
  type OutItem = B::OutItem;
  type Output = B::Output;

  fn compose(self, source: S) -> Self::Output { self.1.apply(self.0.apply(source)) }
}

impl<S, Item, Err, A, B, C> Pipeline<S, Item, Err> for (A, B, C)
where
  A: Stage<S, Item, Err>,
  B: Stage<A::Output, A::OutItem, Err>,
  C: Stage<B::Output, B::OutItem, Err>,
{
  type OutItem = C::OutItem;
  type Output = C::Output;

  fn compose(self, source: S) -> Self::Output {
    self.2.apply(self.1.apply(self.0.apply(source)))
  }
}

impl<S, Item, Err, A, B, C, D> Pipeline<S, Item, Err> for (A, B, C, D)
where
  A: Stage<S, Item, Err>,
  B: Stage<A::Output, A::OutItem, Err>,
  C: Stage<B::Output, B::OutItem, Err>,
  D: Stage<C::Output, C::OutItem, Err>,
{
  type OutItem = D::OutItem;
  type Output = D::Output;

  fn compose(self, source: S) -> Self::Output {
    self.3.apply(self.2.apply(self.1.apply(self.0.apply(source))))
  }
}

impl<S, Item, Err, A, B, C, D, E> Pipeline<S, Item, Err> for (A, B, C, D, E)
where
  A: Stage<S, Item, Err>,
  B: Stage<A::Output, A::OutItem, Err>,
  C: Stage<B::Output, B::OutItem, Err>,
  D: Stage<C::Output, C::OutItem, Err>,
  E: Stage<D::Output, D::OutItem, Err>,
{
  type OutItem = E::OutItem;
  type Output = E::Output;

  fn compose(self, source: S) -> Self::Output {
    self
      .4
      .apply(self.3.apply(self.2.apply(self.1.apply(self.0.apply(source)))))
  }
}
