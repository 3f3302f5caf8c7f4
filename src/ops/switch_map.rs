//! Maps every source value to an inner observable and mirrors only the most
//! recent one. Producing a new inner disposes the previous inner before the
//! new one is subscribed; the composed stream completes once the outer source
//! completed and the latest inner completed.

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, MutRc, RcDeref, RcDerefMut},
  subscription::{BoxSubscription, BoxSubscriptionThreads, Subscription, ZipSubscription},
  type_hint::TypeHint,
};

#[derive(Clone)]
pub struct SwitchMapOp<S, F, Item> {
  pub(crate) source: S,
  pub(crate) func: F,
  pub(crate) _hint: TypeHint<Item>,
}

/// [`SwitchMapOp`] for chains that cross threads.
#[derive(Clone)]
pub struct SwitchMapOpThreads<S, F, Item> {
  pub(crate) source: S,
  pub(crate) func: F,
  pub(crate) _hint: TypeHint<Item>,
}

macro_rules! impl_switch_map_op {
  ($op: ident, $ctx: ident, $observer: ident, $inner_observer: ident,
   $subscription: ident, $rc: ident, $box_unsub: ident $(, $send: ident)?) => {
    #[doc(hidden)]
    pub struct $ctx<O> {
      observer: O,
      inner: Option<$box_unsub>,
      // An inner is subscribed and has not yet terminated. Tracked apart from
      // `inner` because a synchronous inner terminates before its handle can
      // be stored.
      inner_alive: bool,
      outer_done: bool,
      generation: usize,
    }

    #[doc(hidden)]
    pub struct $observer<O, F, B> {
      ctx: $rc<Option<$ctx<O>>>,
      func: F,
      _hint: TypeHint<B>,
    }

    #[doc(hidden)]
    pub struct $inner_observer<O> {
      ctx: $rc<Option<$ctx<O>>>,
      generation: usize,
    }

    /// Watches the shared switch state; unsubscribing drops the downstream
    /// observer and disposes whichever inner is live.
    pub struct $subscription<O>($rc<Option<$ctx<O>>>);

    impl<Item, Err, B, O, S, F, Inner> Observable<B, Err, O> for $op<S, F, Item>
    where
      O: Observer<B, Err>,
      S: Observable<Item, Err, $observer<O, F, B>>,
      F: FnMut(Item) -> Inner,
      Inner: Observable<B, Err, $inner_observer<O>>,
      Inner::Unsub: $($send +)? 'static,
    {
      type Unsub = ZipSubscription<S::Unsub, $subscription<O>>;

      fn actual_subscribe(self, observer: O) -> Self::Unsub {
        let ctx = $rc::own(Some($ctx {
          observer,
          inner: None,
          inner_alive: false,
          outer_done: false,
          generation: 0,
        }));
        let watcher = $subscription(ctx.clone());
        let outer = $observer { ctx, func: self.func, _hint: TypeHint::new() };
        ZipSubscription::new(self.source.actual_subscribe(outer), watcher)
      }
    }

    impl<Item, Err, B, S, F, Inner> ObservableExt<B, Err> for $op<S, F, Item>
    where
      S: ObservableExt<Item, Err>,
      F: FnMut(Item) -> Inner,
      Inner: ObservableExt<B, Err>,
    {
    }

    impl<Item, Err, B, O, F, Inner> Observer<Item, Err> for $observer<O, F, B>
    where
      O: Observer<B, Err>,
      F: FnMut(Item) -> Inner,
      Inner: Observable<B, Err, $inner_observer<O>>,
      Inner::Unsub: $($send +)? 'static,
    {
      fn next(&mut self, value: Item) {
        let previous;
        let generation;
        {
          let mut guard = self.ctx.rc_deref_mut();
          match guard.as_mut() {
            Some(ctx) => {
              ctx.generation += 1;
              ctx.inner_alive = true;
              previous = ctx.inner.take();
              generation = ctx.generation;
            }
            None => return,
          }
        }
        if let Some(previous) = previous {
          previous.unsubscribe();
        }

        let inner = (self.func)(value);
        let inner_observer = $inner_observer { ctx: self.ctx.clone(), generation };
        let unsub = inner.actual_subscribe(inner_observer);

        // A synchronous inner may have terminated, or a re-entrant outer value
        // may have switched again while we subscribed. Its handle is stale
        // then and must not shadow the live one.
        let mut guard = self.ctx.rc_deref_mut();
        let live = guard
          .as_ref()
          .map_or(false, |ctx| ctx.generation == generation && ctx.inner_alive);
        if live {
          if let Some(ctx) = guard.as_mut() {
            ctx.inner = Some($box_unsub::new(unsub));
          }
        } else {
          drop(guard);
          unsub.unsubscribe();
        }
      }

      fn error(self, err: Err) {
        let taken = self.ctx.rc_deref_mut().take();
        if let Some(mut ctx) = taken {
          if let Some(inner) = ctx.inner.take() {
            inner.unsubscribe();
          }
          ctx.observer.error(err);
        }
      }

      fn complete(self) {
        let mut guard = self.ctx.rc_deref_mut();
        match guard.as_mut() {
          Some(ctx) => {
            ctx.outer_done = true;
            if ctx.inner_alive {
              return;
            }
          }
          None => return,
        }
        let taken = guard.take();
        drop(guard);
        if let Some(ctx) = taken {
          ctx.observer.complete();
        }
      }

      #[inline]
      fn is_finished(&self) -> bool {
        self
          .ctx
          .rc_deref()
          .as_ref()
          .map_or(true, |ctx| ctx.observer.is_finished())
      }
    }

    impl<Item, Err, O> Observer<Item, Err> for $inner_observer<O>
    where
      O: Observer<Item, Err>,
    {
      fn next(&mut self, value: Item) {
        if let Some(ctx) = self.ctx.rc_deref_mut().as_mut() {
          if ctx.generation == self.generation {
            ctx.observer.next(value);
          }
        }
      }

      fn error(self, err: Err) {
        let mut guard = self.ctx.rc_deref_mut();
        let stale = guard
          .as_ref()
          .map_or(true, |ctx| ctx.generation != self.generation);
        if stale {
          return;
        }
        let taken = guard.take();
        drop(guard);
        if let Some(mut ctx) = taken {
          let _ = ctx.inner.take();
          ctx.observer.error(err);
        }
      }

      fn complete(self) {
        let mut guard = self.ctx.rc_deref_mut();
        match guard.as_mut() {
          Some(ctx) if ctx.generation == self.generation => {
            ctx.inner_alive = false;
            ctx.inner = None;
            if !ctx.outer_done {
              return;
            }
          }
          _ => return,
        }
        let taken = guard.take();
        drop(guard);
        if let Some(ctx) = taken {
          ctx.observer.complete();
        }
      }

      #[inline]
      fn is_finished(&self) -> bool {
        self
          .ctx
          .rc_deref()
          .as_ref()
          .map_or(true, |ctx| ctx.generation != self.generation || ctx.observer.is_finished())
      }
    }

    impl<O> Subscription for $subscription<O> {
      fn unsubscribe(self) {
        let taken = self.0.rc_deref_mut().take();
        if let Some(mut ctx) = taken {
          if let Some(inner) = ctx.inner.take() {
            inner.unsubscribe();
          }
        }
      }

      #[inline]
      fn is_closed(&self) -> bool { self.0.rc_deref().is_none() }
    }
  };
}

impl_switch_map_op!(
  SwitchMapOp,
  SwitchContext,
  SwitchMapObserver,
  SwitchMapInnerObserver,
  SwitchSubscription,
  MutRc,
  BoxSubscription
);
impl_switch_map_op!(
  SwitchMapOpThreads,
  SwitchContextThreads,
  SwitchMapObserverThreads,
  SwitchMapInnerObserverThreads,
  SwitchSubscriptionThreads,
  MutArc,
  BoxSubscriptionThreads,
  Send
);
