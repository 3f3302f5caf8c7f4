//! Subject flavor shared between threads.

use std::mem;

use smallvec::SmallVec;

use crate::{
  observable::{Observable, ObservableExt},
  observer::{DynObserver, Observer},
  rc::{MutArc, RcDeref, RcDerefMut, WeakArc},
  subject::SubjectState,
  subscription::Subscription,
};

/// [`Subject`](crate::subject::Subject) for hubs fed and observed from
/// several threads.
///
/// One mutex serializes everything: `next` holds it across the whole
/// fan-out, so by the time it returns every observer registered at entry has
/// seen the value, and a subscriber joining concurrently waits for the
/// running round instead of landing in the middle of it. Unsubscribing never
/// waits on that mutex; it flips a flag that suppresses further deliveries
/// and lets the hub prune the entry afterwards. A delivery already running
/// on another thread is not interrupted.
///
/// The hub's own callbacks run inside the critical section. Calling back
/// into the same hub from one of them deadlocks; use the single-thread
/// [`Subject`](crate::subject::Subject) when callbacks need to re-enter.
pub struct SubjectThreads<Item: 'static, Err: 'static> {
  cell: MutArc<SubjectCellThreads<Item, Err>>,
}

/// Handle detaching one observer from its hub.
pub struct SubjectSubscriptionThreads<Item: 'static, Err: 'static> {
  id: usize,
  detached: MutArc<bool>,
  cell: WeakArc<SubjectCellThreads<Item, Err>>,
}

struct SubjectEntryThreads<Item: 'static, Err: 'static> {
  id: usize,
  detached: MutArc<bool>,
  observer: Box<dyn DynObserver<Item, Err> + Send>,
}

impl<Item, Err> SubjectEntryThreads<Item, Err> {
  #[inline]
  fn is_live(&self) -> bool { !*self.detached.rc_deref() && !self.observer.dyn_is_finished() }
}

struct SubjectCellThreads<Item: 'static, Err: 'static> {
  state: SubjectState<SubjectEntryThreads<Item, Err>, Err>,
  /// Fed every value ahead of the fan-out; backs the replay flavors.
  sink: Option<Box<dyn DynObserver<Item, Err> + Send>>,
  next_id: usize,
}

impl<Item, Err> SubjectCellThreads<Item, Err> {
  fn new(sink: Option<Box<dyn DynObserver<Item, Err> + Send>>) -> Self {
    SubjectCellThreads { state: SubjectState::Active(SmallVec::new()), sink, next_id: 0 }
  }
}

impl<Item, Err> SubjectThreads<Item, Err> {
  pub(crate) fn with_sink(sink: Box<dyn DynObserver<Item, Err> + Send>) -> Self {
    SubjectThreads { cell: MutArc::own(SubjectCellThreads::new(Some(sink))) }
  }

  /// How many observers are currently registered.
  pub fn subscribed_size(&self) -> usize {
    match &self.cell.rc_deref().state {
      SubjectState::Active(entries) => entries.len(),
      _ => 0,
    }
  }

  /// Adds `observer` to the hub. On a live hub `on_live` runs and the entry
  /// is pushed inside one critical section, so no concurrent emission can
  /// land between the hook and the registration. On a terminated hub
  /// `on_done` runs instead and the latched terminal follows.
  pub(crate) fn register<O, L, D>(
    &self,
    observer: O,
    on_live: L,
    on_done: D,
  ) -> SubjectSubscriptionThreads<Item, Err>
  where
    O: Observer<Item, Err> + Send + 'static,
    Err: Clone,
    L: FnOnce(&mut (dyn DynObserver<Item, Err> + Send)),
    D: FnOnce(&mut (dyn DynObserver<Item, Err> + Send)),
  {
    let mut boxed: Box<dyn DynObserver<Item, Err> + Send> = Box::new(observer);
    let stored_err;
    {
      let mut guard = self.cell.rc_deref_mut();
      let cell = &mut *guard;
      match &mut cell.state {
        SubjectState::Active(entries) => {
          on_live(&mut *boxed);
          let id = cell.next_id;
          cell.next_id += 1;
          let detached = MutArc::own(false);
          entries.push(SubjectEntryThreads { id, detached: detached.clone(), observer: boxed });
          return SubjectSubscriptionThreads { id, detached, cell: self.cell.downgrade() };
        }
        SubjectState::Completed => stored_err = None,
        SubjectState::Errored(err) => stored_err = Some(err.clone()),
      }
    }
    on_done(&mut *boxed);
    match stored_err {
      Some(err) => boxed.dyn_error(err),
      None => boxed.dyn_complete(),
    }
    SubjectSubscriptionThreads {
      id: usize::MAX,
      detached: MutArc::own(true),
      cell: self.cell.downgrade(),
    }
  }
}

impl<Item, Err> SubjectThreads<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn broadcast(&self, value: Item) {
    let mut guard = self.cell.rc_deref_mut();
    let cell = &mut *guard;
    let entries = match &mut cell.state {
      SubjectState::Active(entries) => entries,
      _ => return,
    };
    if let Some(sink) = cell.sink.as_mut() {
      sink.dyn_next(value.clone());
    }
    entries.retain(|entry| {
      let live = entry.is_live();
      if live {
        entry.observer.dyn_next(value.clone());
      }
      // an observer may finish or detach inside its own callback
      live && entry.is_live()
    });
  }

  /// Latches the terminal and empties the registry inside the critical
  /// section, then delivers outside of it. A producer racing in sees the
  /// latched state and drops its value; a subscriber racing in is handed the
  /// terminal by `register`.
  fn settle(
    &self,
    state: SubjectState<SubjectEntryThreads<Item, Err>, Err>,
  ) -> Option<(
    Option<Box<dyn DynObserver<Item, Err> + Send>>,
    SmallVec<[SubjectEntryThreads<Item, Err>; 2]>,
  )> {
    let mut guard = self.cell.rc_deref_mut();
    let cell = &mut *guard;
    let staged = match &mut cell.state {
      SubjectState::Active(entries) => mem::take(entries),
      _ => return None,
    };
    cell.state = state;
    Some((cell.sink.take(), staged))
  }
}

impl<Item, Err> Default for SubjectThreads<Item, Err> {
  #[inline]
  fn default() -> Self { SubjectThreads { cell: MutArc::own(SubjectCellThreads::new(None)) } }
}

impl<Item, Err> Clone for SubjectThreads<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { SubjectThreads { cell: self.cell.clone() } }
}

impl<Item, Err> Observer<Item, Err> for SubjectThreads<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  #[inline]
  fn next(&mut self, value: Item) { self.broadcast(value); }

  fn error(self, err: Err) {
    if let Some((sink, staged)) = self.settle(SubjectState::Errored(err.clone())) {
      if let Some(sink) = sink {
        sink.dyn_error(err.clone());
      }
      for entry in staged {
        if !*entry.detached.rc_deref() {
          entry.observer.dyn_error(err.clone());
        }
      }
    }
  }

  fn complete(self) {
    if let Some((sink, staged)) = self.settle(SubjectState::Completed) {
      if let Some(sink) = sink {
        sink.dyn_complete();
      }
      for entry in staged {
        if !*entry.detached.rc_deref() {
          entry.observer.dyn_complete();
        }
      }
    }
  }

  #[inline]
  fn is_finished(&self) -> bool {
    !matches!(self.cell.rc_deref().state, SubjectState::Active(_))
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for SubjectThreads<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  Err: Clone,
{
  type Unsub = SubjectSubscriptionThreads<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.register(observer, |_| {}, |_| {}) }
}

impl<Item, Err> ObservableExt<Item, Err> for SubjectThreads<Item, Err> {}

impl<Item, Err> Subscription for SubjectSubscriptionThreads<Item, Err> {
  fn unsubscribe(self) {
    *self.detached.rc_deref_mut() = true;
    if let Some(cell) = self.cell.upgrade() {
      // never wait here: a broadcast on another thread may hold the cell for
      // as long as its observers take, the flag already cut us off
      if let Some(mut cell) = cell.try_rc_deref_mut() {
        if let SubjectState::Active(entries) = &mut cell.state {
          entries.retain(|entry| entry.id != self.id);
        }
      }
    }
  }

  fn is_closed(&self) -> bool {
    if *self.detached.rc_deref() {
      return true;
    }
    match self.cell.upgrade() {
      Some(cell) => !matches!(cell.rc_deref().state, SubjectState::Active(_)),
      None => true,
    }
  }
}
