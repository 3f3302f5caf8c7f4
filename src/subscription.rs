use smallvec::SmallVec;

use crate::rc::{MutArc, MutRc, RcDeref, RcDerefMut};

/// A handle on a running subscription.
///
/// `unsubscribe` consumes the handle and tears the execution down; shared
/// handles (subjects, [`MultiSubscription`]) stay idempotent through their
/// interior state, so disposing an already finished chain is a no-op
/// everywhere. Disposal is not a terminal event: no `error` or `complete`
/// is synthesized for the downstream observer.
pub trait Subscription {
  fn unsubscribe(self);
  fn is_closed(&self) -> bool;

  /// Binds the teardown to a scope: the returned guard unsubscribes when
  /// dropped.
  #[inline]
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard(Some(self))
  }
}

/// Sources that finish synchronously inside `actual_subscribe` hand back
/// `()`: there is nothing left to cancel.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}
  #[inline]
  fn is_closed(&self) -> bool { true }
}

/// Pairs the upstream handle of an operator with the handle of the resource
/// the operator manages itself.
pub struct ZipSubscription<A, B> {
  a: A,
  b: B,
}

impl<A, B> ZipSubscription<A, B> {
  #[inline]
  pub fn new(a: A, b: B) -> Self { ZipSubscription { a, b } }
}

impl<A, B> Subscription for ZipSubscription<A, B>
where
  A: Subscription,
  B: Subscription,
{
  fn unsubscribe(self) {
    self.a.unsubscribe();
    self.b.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.a.is_closed() && self.b.is_closed() }
}

/// Object-safe mirror of [`Subscription`]; `unsubscribe` consumes `self`,
/// which a vtable cannot express directly.
pub trait DynSubscription {
  fn dyn_unsubscribe(self: Box<Self>);
  fn dyn_is_closed(&self) -> bool;
}

impl<T: Subscription> DynSubscription for T {
  #[inline]
  fn dyn_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn dyn_is_closed(&self) -> bool { self.is_closed() }
}

/// Type-erased subscription. Erased handles are `'static`: they are control
/// handles meant to outlive the scope that created them, not data views.
pub struct BoxSubscription(Box<dyn DynSubscription>);

/// Type-erased subscription that may cross threads.
pub struct BoxSubscriptionThreads(Box<dyn DynSubscription + Send>);

impl BoxSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }
}

impl BoxSubscriptionThreads {
  #[inline]
  pub fn new(subscription: impl Subscription + Send + 'static) -> Self {
    Self(Box::new(subscription))
  }
}

macro_rules! impl_box_subscription {
  ($ty: ty) => {
    impl Subscription for $ty {
      #[inline]
      fn unsubscribe(self) { self.0.dyn_unsubscribe() }

      #[inline]
      fn is_closed(&self) -> bool { self.0.dyn_is_closed() }
    }
  };
}

impl_box_subscription!(BoxSubscription);
impl_box_subscription!(BoxSubscriptionThreads);

macro_rules! impl_multi_subscription {
  ($name: ident, $rc: ident, $box_unsub: ident) => {
    /// A growable teardown list behind a shared cell, so an observer can keep
    /// registering handles after the composite handle was given away.
    ///
    /// Appending to an already unsubscribed list disposes the newcomer on the
    /// spot.
    pub struct $name($rc<Option<SmallVec<[$box_unsub; 1]>>>);

    impl Default for $name {
      #[inline]
      fn default() -> Self { Self($rc::own(Some(SmallVec::new()))) }
    }

    impl Clone for $name {
      #[inline]
      fn clone(&self) -> Self { Self(self.0.clone()) }
    }

    impl $name {
      pub fn append(&mut self, subscription: $box_unsub) {
        let mut inner = self.0.rc_deref_mut();
        match &mut *inner {
          Some(list) => list.push(subscription),
          None => {
            drop(inner);
            subscription.unsubscribe();
          }
        }
      }

      /// Drops the handles that already finished on their own.
      pub fn retain(&mut self) {
        if let Some(list) = &mut *self.0.rc_deref_mut() {
          list.retain(|s| !s.is_closed());
        }
      }
    }

    impl Subscription for $name {
      fn unsubscribe(self) {
        let list = self.0.rc_deref_mut().take();
        if let Some(list) = list {
          for subscription in list {
            subscription.unsubscribe();
          }
        }
      }

      fn is_closed(&self) -> bool { self.0.rc_deref().is_none() }
    }
  };
}

impl_multi_subscription!(MultiSubscription, MutRc, BoxSubscription);
impl_multi_subscription!(MultiSubscriptionThreads, MutArc, BoxSubscriptionThreads);

/// Wraps a teardown closure, the shape `observable::create` producers hand
/// back.
pub struct ClosureSubscription<F>(Option<F>);

impl<F: FnOnce()> ClosureSubscription<F> {
  #[inline]
  pub fn new(teardown: F) -> Self { Self(Some(teardown)) }
}

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  fn unsubscribe(self) {
    if let Some(teardown) = self.0 {
      teardown();
    }
  }

  fn is_closed(&self) -> bool { self.0.is_none() }
}

/// An RAII "scoped subscription": when the guard is dropped the subscription
/// is unsubscribed. Wrap it in its own scope to dispose immediately.
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(pub(crate) Option<T>);

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  struct Flag(Rc<Cell<bool>>);

  impl Flag {
    fn new() -> (Self, Rc<Cell<bool>>) {
      let tripped = Rc::new(Cell::new(false));
      (Self(tripped.clone()), tripped)
    }
  }

  impl Subscription for Flag {
    fn unsubscribe(self) { self.0.set(true); }
    fn is_closed(&self) -> bool { self.0.get() }
  }

  #[test]
  fn zip_tears_both_down() {
    let (a, a_tripped) = Flag::new();
    let (b, b_tripped) = Flag::new();
    let zip = ZipSubscription::new(a, b);

    assert!(!zip.is_closed());
    zip.unsubscribe();
    assert!(a_tripped.get());
    assert!(b_tripped.get());
  }

  #[test]
  fn boxed_erasure() {
    let (flag, tripped) = Flag::new();
    let boxed = BoxSubscription::new(flag);
    assert!(!boxed.is_closed());
    boxed.unsubscribe();
    assert!(tripped.get());
  }

  #[test]
  fn multi_disposes_late_append() {
    let mut multi = MultiSubscription::default();
    let (early, early_tripped) = Flag::new();
    multi.append(BoxSubscription::new(early));

    multi.clone().unsubscribe();
    assert!(early_tripped.get());
    assert!(multi.is_closed());

    // the composite already ended, a late handle is disposed on the spot
    let (late, late_tripped) = Flag::new();
    multi.append(BoxSubscription::new(late));
    assert!(late_tripped.get());
  }

  #[test]
  fn multi_retain_prunes_closed() {
    let mut multi = MultiSubscription::default();
    let (done, done_tripped) = Flag::new();
    done_tripped.set(true);
    multi.append(BoxSubscription::new(done));
    let (live, live_tripped) = Flag::new();
    multi.append(BoxSubscription::new(live));

    multi.retain();
    multi.unsubscribe();
    assert!(live_tripped.get());
  }

  #[test]
  fn closure_teardown_runs_once() {
    let tripped = Rc::new(Cell::new(0));
    let teardown = tripped.clone();
    let subscription = ClosureSubscription::new(move || teardown.set(teardown.get() + 1));
    assert!(!subscription.is_closed());
    subscription.unsubscribe();
    assert_eq!(tripped.get(), 1);
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let (flag, tripped) = Flag::new();
    {
      let _guard = flag.unsubscribe_when_dropped();
      assert!(!tripped.get());
    }
    assert!(tripped.get());
  }

  #[test]
  fn unit_subscription_is_spent() {
    let unsub = ();
    assert!(unsub.is_closed());
    unsub.unsubscribe();
  }
}
