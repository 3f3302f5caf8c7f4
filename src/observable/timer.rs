use std::convert::Infallible;

use crate::prelude::*;

/// Creates an observable that emits `item` once after `dur` elapsed on
/// `scheduler`, then completes.
pub fn timer<Item, S>(item: Item, dur: Duration, scheduler: S) -> TimerObservable<Item, S> {
  TimerObservable { item, dur, scheduler }
}

/// Creates an observable that emits `item` once at the timestamp `at`, then
/// completes. A timestamp already in the past emits immediately.
pub fn timer_at<Item, S>(item: Item, at: Instant, scheduler: S) -> TimerObservable<Item, S> {
  TimerObservable { item, dur: duration_until(at), scheduler }
}

fn duration_until(instant: Instant) -> Duration {
  let now = Instant::now();
  if instant > now {
    instant - now
  } else {
    Duration::default()
  }
}

pub struct TimerObservable<Item, S> {
  item: Item,
  dur: Duration,
  scheduler: S,
}

fn timer_task<Item, O>((mut observer, value): (O, Item)) -> NormalReturn<()>
where
  O: Observer<Item, Infallible>,
{
  observer.next(value);
  observer.complete();
  NormalReturn::new(())
}

impl<Item, O, S> Observable<Item, Infallible, O> for TimerObservable<Item, S>
where
  O: Observer<Item, Infallible>,
  S: Scheduler<OnceTask<(O, Item), NormalReturn<()>>>,
{
  type Unsub = TaskHandle<NormalReturn<()>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { item, dur, scheduler } = self;

    scheduler.schedule(OnceTask::new(timer_task, (observer, item)), Some(dur))
  }
}

impl<Item, S> ObservableExt<Item, Infallible> for TimerObservable<Item, S> {}
