use crate::prelude::*;
use crate::rc::{MutArc, MutRc, RcDerefMut};

#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  source: S,
  func: F,
}

#[derive(Clone)]
pub struct FinalizeOpThreads<S, F> {
  source: S,
  func: F,
}

macro_rules! impl_finalize_op {
  ($op:ident, $observer:ident, $subscription:ident, $rc:ident) => {
    impl<S, F> $op<S, F> {
      #[inline]
      pub fn new(source: S, func: F) -> Self { Self { source, func } }
    }

    impl<Item, Err, O, S, F> Observable<Item, Err, O> for $op<S, F>
    where
      O: Observer<Item, Err>,
      S: Observable<Item, Err, $observer<O, F>>,
      F: FnOnce(),
    {
      type Unsub = $subscription<S::Unsub, F>;

      fn actual_subscribe(self, observer: O) -> Self::Unsub {
        let func = $rc::own(Some(self.func));
        let subscription = self
          .source
          .actual_subscribe($observer { observer, func: func.clone() });
        $subscription { subscription, func }
      }
    }

    impl<Item, Err, S, F> ObservableExt<Item, Err> for $op<S, F> where S: ObservableExt<Item, Err> {}

    pub struct $observer<O, F> {
      observer: O,
      func: $rc<Option<F>>,
    }

    impl<Item, Err, O, F> Observer<Item, Err> for $observer<O, F>
    where
      O: Observer<Item, Err>,
      F: FnOnce(),
    {
      #[inline]
      fn next(&mut self, value: Item) { self.observer.next(value); }

      fn error(self, err: Err) {
        self.observer.error(err);
        if let Some(func) = self.func.rc_deref_mut().take() {
          func()
        }
      }

      fn complete(self) {
        self.observer.complete();
        if let Some(func) = self.func.rc_deref_mut().take() {
          func()
        }
      }

      #[inline]
      fn is_finished(&self) -> bool { self.observer.is_finished() }
    }

    pub struct $subscription<U, F> {
      subscription: U,
      func: $rc<Option<F>>,
    }

    impl<U, F> Subscription for $subscription<U, F>
    where
      U: Subscription,
      F: FnOnce(),
    {
      fn unsubscribe(self) {
        self.subscription.unsubscribe();
        if let Some(func) = self.func.rc_deref_mut().take() {
          func()
        }
      }

      #[inline]
      fn is_closed(&self) -> bool { self.subscription.is_closed() }
    }
  };
}

impl_finalize_op!(FinalizeOp, FinalizerObserver, FinalizerSubscription, MutRc);
impl_finalize_op!(
  FinalizeOpThreads,
  FinalizerObserverThreads,
  FinalizerSubscriptionThreads,
  MutArc
);
