//! End-to-end flows across sources, subjects, operators and subscriptions.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  sync::{mpsc::channel, Arc, Mutex},
  thread,
};

use rivulet::ops::pipe::{filter, map, pipe, switch_map};
use rivulet::prelude::*;

#[test]
fn subject_multicasts_and_late_subscribers_miss_history() {
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
fn behavior_subject_hands_newcomers_the_latest_value() {
  let first = Rc::new(RefCell::new(Vec::new()));
  let second = Rc::new(RefCell::new(Vec::new()));
  let c_first = first.clone();
  let c_second = second.clone();

  let subject = BehaviorSubject::<i32, ()>::new(0);
  subject.clone().subscribe(move |v| c_first.borrow_mut().push(v));
  subject.clone().next(1);
  subject.clone().next(2);
  subject.clone().subscribe(move |v| c_second.borrow_mut().push(v));
  subject.clone().next(3);

  assert_eq!(*first.borrow(), vec![0, 1, 2, 3]);
  assert_eq!(*second.borrow(), vec![2, 3]);
}

#[test]
fn replay_subject_hands_newcomers_a_bounded_history() {
  let got = Rc::new(RefCell::new(Vec::new()));
  let c_got = got.clone();

  let subject = ReplaySubject::<i32, ()>::with_capacity(2);
  subject.clone().next(1);
  subject.clone().next(2);
  subject.clone().next(3);
  subject.clone().subscribe(move |v| c_got.borrow_mut().push(v));
  subject.clone().next(4);

  assert_eq!(*got.borrow(), vec![2, 3, 4]);
}

#[test]
fn replay_subject_replays_even_after_completion() {
  let values = Rc::new(RefCell::new(Vec::new()));
  let completed = Rc::new(Cell::new(false));
  let c_values = values.clone();
  let c_completed = completed.clone();

  let subject = ReplaySubject::<i32, ()>::with_capacity(2);
  subject.clone().next(1);
  subject.clone().next(2);
  subject.clone().next(3);
  subject.clone().complete();
  subject.clone().subscribe_complete(
    move |v| c_values.borrow_mut().push(v),
    move || c_completed.set(true),
  );

  assert_eq!(*values.borrow(), vec![2, 3]);
  assert!(completed.get());
}

#[test]
fn the_first_terminal_latches_for_late_subscribers() {
  let seen = Rc::new(RefCell::new(None));
  let completed = Rc::new(Cell::new(false));
  let c_seen = seen.clone();
  let c_completed = completed.clone();

  let subject = Subject::<i32, &'static str>::default();
  subject.clone().error("boom");
  // the terminal already latched, this one is dropped
  subject.clone().complete();

  subject.clone().subscribe_all(
    |_| {},
    move |e| *c_seen.borrow_mut() = Some(e),
    move || c_completed.set(true),
  );

  assert_eq!(*seen.borrow(), Some("boom"));
  assert!(!completed.get());
}

#[test]
fn pipe_stages_apply_in_order_over_a_subject() {
  let collected = Rc::new(RefCell::new(Vec::new()));
  let c = collected.clone();

  let mut source = Subject::<i32, ()>::default();
  let _u = pipe(
    source.clone(),
    (map(|x: i32| x * 2), filter(|v: &i32| *v > 10)),
  )
  .subscribe(move |v| c.borrow_mut().push(v));

  source.next(3);
  source.next(6);
  source.next(9);

  assert_eq!(*collected.borrow(), vec![12, 18]);
}

#[test]
fn switching_disposes_the_old_inner_before_subscribing_the_new() {
  let log = Rc::new(RefCell::new(Vec::new()));
  let for_map = log.clone();

  let mut outer = Subject::<&'static str, ()>::default();
  let _u = outer
    .clone()
    .switch_map(move |name: &'static str| {
      let on_sub = for_map.clone();
      let on_drop = for_map.clone();
      observable::create(move |emitter: &mut dyn Emitter<i32, ()>| {
        on_sub.borrow_mut().push(format!("subscribe {name}"));
        emitter.next(1);
        ClosureSubscription::new(move || on_drop.borrow_mut().push(format!("dispose {name}")))
      })
    })
    .subscribe(|_| {});

  outer.next("a");
  outer.next("b");

  assert_eq!(*log.borrow(), vec!["subscribe a", "dispose a", "subscribe b"]);
}

#[test]
fn switch_in_a_pipe_completes_after_outer_and_inner() {
  let collected = Rc::new(RefCell::new(Vec::new()));
  let completed = Rc::new(Cell::new(false));
  let c = collected.clone();
  let done = completed.clone();

  let mut outer = Subject::<i32, ()>::default();
  let inner = Subject::<i32, ()>::default();
  let for_map = inner.clone();

  let _u = pipe(outer.clone(), (switch_map(move |_| for_map.clone()),))
    .on_complete(move || done.set(true))
    .subscribe(move |v| c.borrow_mut().push(v));

  outer.next(1);
  inner.clone().next(10);
  outer.complete();
  // the latest inner is still live, the composed stream must wait for it
  assert!(!completed.get());

  inner.clone().next(11);
  inner.complete();

  assert_eq!(*collected.borrow(), vec![10, 11]);
  assert!(completed.get());
}

#[test]
fn disposal_is_not_termination() {
  let got = Rc::new(RefCell::new(Vec::new()));
  let finalized = Rc::new(Cell::new(0));
  let completed = Rc::new(Cell::new(false));
  let other = Rc::new(RefCell::new(Vec::new()));
  let c_got = got.clone();
  let c_finalized = finalized.clone();
  let c_completed = completed.clone();
  let c_other = other.clone();

  let subject = Subject::<i32, ()>::default();
  let u = subject
    .clone()
    .finalize(move || c_finalized.set(c_finalized.get() + 1))
    .on_complete(move || c_completed.set(true))
    .subscribe(move |v| c_got.borrow_mut().push(v));
  subject.clone().subscribe(move |v| c_other.borrow_mut().push(v));

  subject.clone().next(1);
  u.unsubscribe();
  subject.clone().next(2);

  assert_eq!(*got.borrow(), vec![1]);
  assert_eq!(finalized.get(), 1);
  assert!(!completed.get());
  // the hub itself is untouched, the second observer keeps receiving
  assert_eq!(*other.borrow(), vec![1, 2]);
}

#[test]
fn infinite_sources_stop_when_downstream_finished() {
  let mut collected = vec![];
  observable::from_iter(0..).take(3).subscribe(|v| collected.push(v));

  assert_eq!(collected, vec![0, 1, 2]);
}

#[test]
fn behavior_threads_joiner_waits_for_the_running_broadcast() {
  let (entered_tx, entered_rx) = channel();
  let (resume_tx, resume_rx) = channel();
  let late = Arc::new(Mutex::new(Vec::new()));
  let c_late = late.clone();

  let subject = BehaviorSubjectThreads::<i32, ()>::new(0);
  subject.clone().subscribe(move |v| {
    if v == 1 {
      entered_tx.send(()).unwrap();
      // hold the broadcast open while another thread tries to join
      resume_rx.recv().unwrap();
    }
  });

  let feeder = subject.clone();
  let worker = thread::spawn(move || feeder.clone().next(1));

  entered_rx.recv().unwrap();
  let joiner = {
    let hub = subject.clone();
    thread::spawn(move || {
      hub.subscribe(move |v| c_late.lock().unwrap().push(v));
    })
  };
  thread::sleep(std::time::Duration::from_millis(50));
  resume_tx.send(()).unwrap();
  worker.join().unwrap();
  joiner.join().unwrap();

  // the joiner replayed the value being broadcast, exactly once and not the
  // seed: the held value advances ahead of the fan-out
  assert_eq!(*late.lock().unwrap(), vec![1]);

  subject.clone().next(2);
  assert_eq!(*late.lock().unwrap(), vec![1, 2]);
}

#[test]
fn threads_subject_relays_across_threads_and_latches() {
  let got = Arc::new(Mutex::new(Vec::new()));
  let completed = Arc::new(Mutex::new(false));
  let c_got = got.clone();
  let c_completed = completed.clone();

  let subject = SubjectThreads::<i32, ()>::default();
  subject.clone().subscribe_complete(
    move |v| c_got.lock().unwrap().push(v),
    move || *c_completed.lock().unwrap() = true,
  );

  let feeder = subject.clone();
  thread::spawn(move || {
    for i in 0..10 {
      feeder.clone().next(i);
    }
    feeder.complete();
  })
  .join()
  .unwrap();

  assert_eq!(*got.lock().unwrap(), (0..10).collect::<Vec<_>>());
  assert!(*completed.lock().unwrap());

  // the terminal latched; a late subscriber is told right away
  let late_completed = Arc::new(Mutex::new(false));
  let c_late = late_completed.clone();
  subject
    .clone()
    .subscribe_complete(|_| {}, move || *c_late.lock().unwrap() = true);
  assert!(*late_completed.lock().unwrap());
}

#[cfg(feature = "timer")]
#[test]
fn delayed_values_arrive_in_order_on_the_pool() {
  let collected = Rc::new(RefCell::new(Vec::new()));
  let c = collected.clone();

  scheduler::run_local(|spawner| {
    observable::from_iter(1..=3)
      .delay(Duration::from_millis(1), spawner.clone())
      .subscribe(move |v| c.borrow_mut().push(v));
  });

  assert_eq!(*collected.borrow(), vec![1, 2, 3]);
}
