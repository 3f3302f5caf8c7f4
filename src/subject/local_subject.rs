//! Single-thread subject flavor.

use std::{collections::VecDeque, mem};

use smallvec::SmallVec;

use crate::{
  observable::{Observable, ObservableExt},
  observer::{DynObserver, Observer},
  rc::{MutRc, RcDeref, RcDerefMut, WeakRc},
  subject::SubjectState,
  subscription::Subscription,
};

/// Push values by hand; every clone reaches the same hub.
///
/// A subject multicasts one execution: each `next` reaches every observer
/// registered at that moment, in registration order. The first terminal
/// latches, later emissions are dropped and late subscribers are handed the
/// latched terminal on arrival.
///
/// Emissions are serialized through an internal queue. Calling `next` from
/// inside one of the hub's own callbacks does not deliver immediately; the
/// value is queued and fanned out after the current round, preserving
/// arrival order. An observer subscribed from inside a callback joins after
/// the running round and sees only later values.
///
/// ```
/// use std::{cell::Cell, rc::Rc};
///
/// use rivulet::prelude::*;
///
/// let sum = Rc::new(Cell::new(0));
/// let c_sum = sum.clone();
/// let subject = Subject::<i32, ()>::default();
/// subject.clone().subscribe(move |v| c_sum.set(c_sum.get() + v));
/// subject.clone().next(1);
/// subject.clone().next(2);
/// assert_eq!(sum.get(), 3);
/// ```
pub struct Subject<Item: 'static, Err: 'static> {
  cell: MutRc<SubjectCell<Item, Err>>,
}

/// Handle detaching one observer from its hub.
pub struct SubjectSubscription<Item: 'static, Err: 'static> {
  id: usize,
  detached: MutRc<bool>,
  cell: WeakRc<SubjectCell<Item, Err>>,
}

struct SubjectEntry<Item: 'static, Err: 'static> {
  id: usize,
  detached: MutRc<bool>,
  observer: Box<dyn DynObserver<Item, Err>>,
}

impl<Item, Err> SubjectEntry<Item, Err> {
  #[inline]
  fn is_live(&self) -> bool { !*self.detached.rc_deref() && !self.observer.dyn_is_finished() }
}

/// An emission waiting for the running fan-out round to finish.
enum PendingEmission<Item, Err> {
  Value(Item),
  Completed,
  Errored(Err),
}

struct SubjectCell<Item: 'static, Err: 'static> {
  state: SubjectState<SubjectEntry<Item, Err>, Err>,
  /// Set while a drain loop or a replay hook runs; everything arriving
  /// meanwhile goes through `pending` and `joiners` instead of the registry.
  busy: bool,
  joiners: SmallVec<[SubjectEntry<Item, Err>; 2]>,
  pending: VecDeque<PendingEmission<Item, Err>>,
  /// Fed every value ahead of the fan-out; backs the replay flavors.
  sink: Option<Box<dyn DynObserver<Item, Err>>>,
  next_id: usize,
}

impl<Item, Err> SubjectCell<Item, Err> {
  fn new(sink: Option<Box<dyn DynObserver<Item, Err>>>) -> Self {
    SubjectCell {
      state: SubjectState::Active(SmallVec::new()),
      busy: false,
      joiners: SmallVec::new(),
      pending: VecDeque::new(),
      sink,
      next_id: 0,
    }
  }
}

enum Gate<Err> {
  Live { id: usize, was_busy: bool },
  Done(Option<Err>),
}

impl<Item, Err> Subject<Item, Err> {
  pub(crate) fn with_sink(sink: Box<dyn DynObserver<Item, Err>>) -> Self {
    Subject { cell: MutRc::own(SubjectCell::new(Some(sink))) }
  }

  /// How many observers are currently registered.
  pub fn subscribed_size(&self) -> usize {
    let cell = self.cell.rc_deref();
    match &cell.state {
      SubjectState::Active(entries) => entries.len() + cell.joiners.len(),
      _ => 0,
    }
  }

  /// Adds `observer` to the hub. `on_live` runs against the observer right
  /// before it joins a live hub; on a terminated hub `on_done` runs instead
  /// and the latched terminal follows. Either hook fires at most once, and
  /// no hub value lands between the hook and the registration.
  pub(crate) fn register<O, L, D>(&self, observer: O, on_live: L, on_done: D) -> SubjectSubscription<Item, Err>
  where
    O: Observer<Item, Err> + 'static,
    Item: Clone,
    Err: Clone,
    L: FnOnce(&mut dyn DynObserver<Item, Err>),
    D: FnOnce(&mut dyn DynObserver<Item, Err>),
  {
    let mut boxed: Box<dyn DynObserver<Item, Err>> = Box::new(observer);
    let gate = {
      let mut guard = self.cell.rc_deref_mut();
      let cell = &mut *guard;
      match &cell.state {
        SubjectState::Active(_) => {
          let id = cell.next_id;
          cell.next_id += 1;
          let was_busy = cell.busy;
          // hooks run user callbacks; emissions from inside them must queue
          cell.busy = true;
          Gate::Live { id, was_busy }
        }
        SubjectState::Completed => Gate::Done(None),
        SubjectState::Errored(err) => Gate::Done(Some(err.clone())),
      }
    };
    match gate {
      Gate::Live { id, was_busy } => {
        on_live(&mut *boxed);
        let detached = MutRc::own(false);
        let run_drain = {
          let mut guard = self.cell.rc_deref_mut();
          let cell = &mut *guard;
          let entry = SubjectEntry { id, detached: detached.clone(), observer: boxed };
          if was_busy {
            cell.joiners.push(entry);
          } else if let SubjectState::Active(entries) = &mut cell.state {
            entries.push(entry);
          }
          if !was_busy && cell.pending.is_empty() {
            cell.busy = false;
          }
          // still busy here means the hook queued emissions we now own
          !was_busy && cell.busy
        };
        if run_drain {
          self.drain();
        }
        SubjectSubscription { id, detached, cell: self.cell.downgrade() }
      }
      Gate::Done(stored_err) => {
        on_done(&mut *boxed);
        match stored_err {
          Some(err) => boxed.dyn_error(err),
          None => boxed.dyn_complete(),
        }
        SubjectSubscription {
          id: usize::MAX,
          detached: MutRc::own(true),
          cell: self.cell.downgrade(),
        }
      }
    }
  }
}

impl<Item, Err> Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn enqueue(&self, emission: PendingEmission<Item, Err>) {
    {
      let mut guard = self.cell.rc_deref_mut();
      let cell = &mut *guard;
      if !matches!(cell.state, SubjectState::Active(_)) {
        return;
      }
      cell.pending.push_back(emission);
      if cell.busy {
        return;
      }
      cell.busy = true;
    }
    self.drain();
  }

  /// Owns the fan-out while `busy` is set. Each round pops one queued
  /// emission and delivers it outside the cell borrow, so callbacks are free
  /// to re-enter the hub; whatever they queue extends the loop.
  fn drain(&self) {
    let mut stage = {
      let mut guard = self.cell.rc_deref_mut();
      match &mut guard.state {
        SubjectState::Active(entries) => mem::take(entries),
        _ => return,
      }
    };
    loop {
      let emission = {
        let mut guard = self.cell.rc_deref_mut();
        let cell = &mut *guard;
        stage.retain(|entry| entry.is_live());
        stage.extend(mem::take(&mut cell.joiners));
        match cell.pending.pop_front() {
          Some(emission) => {
            if let PendingEmission::Value(value) = &emission {
              if let Some(sink) = cell.sink.as_mut() {
                sink.dyn_next(value.clone());
              }
            }
            emission
          }
          None => {
            if let SubjectState::Active(entries) = &mut cell.state {
              *entries = stage;
            }
            cell.busy = false;
            return;
          }
        }
      };
      match emission {
        PendingEmission::Value(value) => {
          for entry in stage.iter_mut() {
            if entry.is_live() {
              entry.observer.dyn_next(value.clone());
            }
          }
        }
        PendingEmission::Completed => {
          let sink = self.latch(SubjectState::Completed);
          if let Some(sink) = sink {
            sink.dyn_complete();
          }
          for entry in stage {
            if !*entry.detached.rc_deref() {
              entry.observer.dyn_complete();
            }
          }
          return;
        }
        PendingEmission::Errored(err) => {
          let sink = self.latch(SubjectState::Errored(err.clone()));
          if let Some(sink) = sink {
            sink.dyn_error(err.clone());
          }
          for entry in stage {
            if !*entry.detached.rc_deref() {
              entry.observer.dyn_error(err.clone());
            }
          }
          return;
        }
      }
    }
  }

  /// Latches the terminal. Emissions still queued behind it are dropped; a
  /// subscriber arriving from a terminal callback already sees the latched
  /// state.
  fn latch(
    &self,
    state: SubjectState<SubjectEntry<Item, Err>, Err>,
  ) -> Option<Box<dyn DynObserver<Item, Err>>> {
    let mut guard = self.cell.rc_deref_mut();
    let cell = &mut *guard;
    cell.state = state;
    cell.pending.clear();
    cell.busy = false;
    cell.sink.take()
  }
}

impl<Item, Err> Default for Subject<Item, Err> {
  #[inline]
  fn default() -> Self { Subject { cell: MutRc::own(SubjectCell::new(None)) } }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Subject { cell: self.cell.clone() } }
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  #[inline]
  fn next(&mut self, value: Item) { self.enqueue(PendingEmission::Value(value)); }

  #[inline]
  fn error(self, err: Err) { self.enqueue(PendingEmission::Errored(err)); }

  #[inline]
  fn complete(self) { self.enqueue(PendingEmission::Completed); }

  #[inline]
  fn is_finished(&self) -> bool {
    !matches!(self.cell.rc_deref().state, SubjectState::Active(_))
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for Subject<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: Clone,
  Err: Clone,
{
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.register(observer, |_| {}, |_| {}) }
}

impl<Item, Err> ObservableExt<Item, Err> for Subject<Item, Err> {}

impl<Item, Err> Subscription for SubjectSubscription<Item, Err> {
  fn unsubscribe(self) {
    *self.detached.rc_deref_mut() = true;
    if let Some(cell) = self.cell.upgrade() {
      // a drain loop further up the stack owns the registry; the flag alone
      // stops deliveries then, and the next round prunes the entry
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

#[cfg(test)]
mod test {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[test]
  fn base_data_flow() {
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    let c_first = first.clone();
    let c_second = second.clone();

    let subject = Subject::<i32, ()>::default();
    subject.clone().subscribe(move |v| c_first.borrow_mut().push(v));
    subject.clone().next(1);
    subject.clone().subscribe(move |v| c_second.borrow_mut().push(v));
    subject.clone().next(2);

    assert_eq!(*first.borrow(), vec![1, 2]);
    assert_eq!(*second.borrow(), vec![2]);
  }

  #[test]
  fn terminal_latches_for_late_subscribers() {
    let completed = Rc::new(Cell::new(false));
    let c_completed = completed.clone();

    let subject = Subject::<i32, ()>::default();
    subject.clone().complete();
    subject
      .clone()
      .subscribe_complete(|_| panic!("no value was ever emitted"), move || c_completed.set(true));

    assert!(completed.get());
    assert!(subject.is_finished());
  }

  #[test]
  fn at_most_one_terminal_wins() {
    let errors = Rc::new(Cell::new(0));
    let completions = Rc::new(Cell::new(0));
    let c_errors = errors.clone();
    let c_completions = completions.clone();

    let subject = Subject::<i32, &str>::default();
    subject.clone().subscribe_all(
      |_| {},
      move |_| c_errors.set(c_errors.get() + 1),
      move || c_completions.set(c_completions.get() + 1),
    );
    subject.clone().error("boom");
    subject.clone().complete();

    assert_eq!(errors.get(), 1);
    assert_eq!(completions.get(), 0);
  }

  #[test]
  fn emission_after_terminal_is_dropped() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let c_got = got.clone();

    let subject = Subject::<i32, ()>::default();
    subject.clone().subscribe(move |v| c_got.borrow_mut().push(v));
    subject.clone().next(1);
    subject.clone().complete();
    subject.clone().next(2);

    assert_eq!(*got.borrow(), vec![1]);
  }

  #[test]
  fn unsubscribe_detaches_one_observer() {
    let kept = Rc::new(RefCell::new(Vec::new()));
    let dropped = Rc::new(RefCell::new(Vec::new()));
    let c_kept = kept.clone();
    let c_dropped = dropped.clone();

    let subject = Subject::<i32, ()>::default();
    subject.clone().subscribe(move |v| c_kept.borrow_mut().push(v));
    let sub = subject.clone().subscribe(move |v| c_dropped.borrow_mut().push(v));
    subject.clone().next(1);
    assert!(!sub.is_closed());
    sub.unsubscribe();
    subject.clone().next(2);

    assert_eq!(*kept.borrow(), vec![1, 2]);
    assert_eq!(*dropped.borrow(), vec![1]);
    assert_eq!(subject.subscribed_size(), 1);
  }

  #[test]
  fn unsubscribe_inside_own_callback() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::new(RefCell::new(None::<SubjectSubscription<i32, ()>>));
    let c_got = got.clone();
    let c_handle = handle.clone();

    let subject = Subject::<i32, ()>::default();
    let sub = subject.clone().subscribe(move |v| {
      c_got.borrow_mut().push(v);
      if let Some(sub) = c_handle.borrow_mut().take() {
        sub.unsubscribe();
      }
    });
    *handle.borrow_mut() = Some(sub);

    subject.clone().next(1);
    subject.clone().next(2);

    assert_eq!(*got.borrow(), vec![1]);
    assert_eq!(subject.subscribed_size(), 0);
  }

  #[test]
  fn reentrant_emission_is_queued_fifo() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let c_got = got.clone();

    let subject = Subject::<i32, ()>::default();
    let feeder = subject.clone();
    subject.clone().subscribe(move |v| {
      c_got.borrow_mut().push(v);
      if v < 100 {
        feeder.clone().next(v + 100);
      }
    });
    subject.clone().next(1);
    subject.clone().next(10);
    subject.clone().next(11);

    assert_eq!(*got.borrow(), vec![1, 101, 10, 110, 11, 111]);
  }

  #[test]
  fn reentrant_subscribe_sees_only_later_values() {
    let outer = Rc::new(RefCell::new(Vec::new()));
    let inner = Rc::new(RefCell::new(Vec::new()));
    let c_outer = outer.clone();

    let subject = Subject::<i32, ()>::default();
    let hub = subject.clone();
    let c_inner = inner.clone();
    subject.clone().subscribe(move |v| {
      c_outer.borrow_mut().push(v);
      if v == 1 {
        let c_inner = c_inner.clone();
        hub.clone().subscribe(move |v| c_inner.borrow_mut().push(v));
      }
    });
    subject.clone().next(1);
    subject.clone().next(2);

    assert_eq!(*outer.borrow(), vec![1, 2]);
    assert_eq!(*inner.borrow(), vec![2]);
  }

  #[test]
  fn reentrant_terminal_runs_after_queued_values() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::new(Cell::new(false));
    let c_got = got.clone();
    let c_completed = completed.clone();

    let subject = Subject::<i32, ()>::default();
    let feeder = subject.clone();
    subject.clone().subscribe_complete(
      move |v| {
        c_got.borrow_mut().push(v);
        if v == 1 {
          feeder.clone().next(2);
          feeder.clone().complete();
          // queued behind the terminal, never delivered
          feeder.clone().next(3);
        }
      },
      move || c_completed.set(true),
    );
    subject.clone().next(1);

    assert_eq!(*got.borrow(), vec![1, 2]);
    assert!(completed.get());
  }

  #[test]
  fn finished_observers_are_pruned() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let c_got = got.clone();

    let subject = Subject::<i32, ()>::default();
    subject.clone().take(2).subscribe(move |v| c_got.borrow_mut().push(v));
    subject.clone().next(1);
    assert_eq!(subject.subscribed_size(), 1);
    // the cap is reached here; the round that delivered 2 also prunes
    subject.clone().next(2);
    assert_eq!(subject.subscribed_size(), 0);
    subject.clone().next(3);

    assert_eq!(*got.borrow(), vec![1, 2]);
  }

  #[test]
  fn subject_relays_from_an_upstream() {
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    let c_first = first.clone();
    let c_second = second.clone();

    let subject = Subject::<i32, std::convert::Infallible>::default();
    subject.clone().subscribe(move |v| c_first.borrow_mut().push(v));
    subject.clone().subscribe(move |v| c_second.borrow_mut().push(v));
    observable::from_iter(1..=3).actual_subscribe(subject);

    assert_eq!(*first.borrow(), vec![1, 2, 3]);
    assert_eq!(*second.borrow(), vec![1, 2, 3]);
  }
}
