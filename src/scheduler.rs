use std::mem;

pub use std::time::{Duration, Instant};

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
#[cfg(feature = "futures-scheduler")]
use futures::executor::ThreadPool;
#[cfg(feature = "futures-scheduler")]
use once_cell::sync::Lazy;

use crate::rc::{MutArc, RcDeref, RcDerefMut};
use crate::subscription::Subscription;

/// A single-shot unit of work: a plain function over owned state.
///
/// Keeping the code a `fn` pointer and the data a separate `state` keeps
/// tasks cheap to move across threads and trivially nameable in `Unsub`
/// types.
pub struct OnceTask<S, R> {
  f: fn(S) -> R,
  state: S,
}

impl<S, R> OnceTask<S, R> {
  #[inline]
  pub fn new(f: fn(S) -> R, state: S) -> Self { OnceTask { f, state } }
}

pub trait Task {
  type Output: TaskReturn;

  fn run(self) -> Self::Output;
}

impl<S, R> Task for OnceTask<S, R>
where
  R: TaskReturn,
{
  type Output = R;

  #[inline]
  fn run(self) -> R { (self.f)(self.state) }
}

/// What a finished task leaves behind in its [`TaskHandle`].
pub trait TaskReturn {
  /// Releases whatever the task's run produced. Called when the handle is
  /// unsubscribed after the task already ran.
  fn teardown(self);

  fn is_done(&self) -> bool;
}

/// A task result with nothing to cancel after the fact.
pub struct NormalReturn<R>(R);

impl<R> NormalReturn<R> {
  #[inline]
  pub fn new(value: R) -> Self { NormalReturn(value) }
}

impl<R> TaskReturn for NormalReturn<R> {
  #[inline]
  fn teardown(self) {}

  #[inline]
  fn is_done(&self) -> bool { true }
}

/// A task whose run subscribed something; tearing the handle down forwards
/// to that inner subscription.
pub struct SubscribeReturn<U>(U);

impl<U> SubscribeReturn<U> {
  #[inline]
  pub fn new(subscription: U) -> Self { SubscribeReturn(subscription) }
}

impl<U> TaskReturn for SubscribeReturn<U>
where
  U: Subscription,
{
  #[inline]
  fn teardown(self) { self.0.unsubscribe() }

  #[inline]
  fn is_done(&self) -> bool { self.0.is_closed() }
}

enum TaskState<R> {
  Pending,
  Finished(R),
  Cancelled,
}

/// The subscription handle of a scheduled task.
///
/// Unsubscribing before the task fired keeps it from running at all;
/// unsubscribing afterwards tears down what the run produced. Dropping the
/// handle cancels nothing.
pub struct TaskHandle<R> {
  state: MutArc<TaskState<R>>,
}

impl<R> Clone for TaskHandle<R> {
  #[inline]
  fn clone(&self) -> Self { TaskHandle { state: self.state.clone() } }
}

impl<R> TaskHandle<R> {
  #[inline]
  pub fn new() -> Self { TaskHandle { state: MutArc::own(TaskState::Pending) } }

  pub fn is_cancelled(&self) -> bool { matches!(*self.state.rc_deref(), TaskState::Cancelled) }

  /// Stores the run's result, or tears it down right away when the handle
  /// was cancelled while the task ran.
  pub fn finish(&self, result: R)
  where
    R: TaskReturn,
  {
    let mut state = self.state.rc_deref_mut();
    if matches!(*state, TaskState::Cancelled) {
      drop(state);
      result.teardown();
    } else {
      *state = TaskState::Finished(result);
    }
  }
}

impl<R> Default for TaskHandle<R> {
  #[inline]
  fn default() -> Self { TaskHandle::new() }
}

impl<R> Subscription for TaskHandle<R>
where
  R: TaskReturn,
{
  fn unsubscribe(self) {
    let prev = mem::replace(&mut *self.state.rc_deref_mut(), TaskState::Cancelled);
    if let TaskState::Finished(result) = prev {
      result.teardown()
    }
  }

  fn is_closed(&self) -> bool {
    match &*self.state.rc_deref() {
      TaskState::Pending => false,
      TaskState::Finished(result) => result.is_done(),
      TaskState::Cancelled => true,
    }
  }
}

/// Hands tasks to an executor, optionally after a delay.
///
/// Honoring `Some(delay)` needs the `timer` feature; without it the task
/// fires as soon as the executor picks it up.
pub trait Scheduler<T: Task> {
  fn schedule(&self, task: T, delay: Option<Duration>) -> TaskHandle<T::Output>;
}

async fn delay_by(delay: Option<Duration>) {
  #[cfg(feature = "timer")]
  if let Some(delay) = delay {
    futures_time::task::sleep(delay.into()).await;
  }
  #[cfg(not(feature = "timer"))]
  let _ = delay;
}

impl<T> Scheduler<T> for LocalSpawner
where
  T: Task + 'static,
  T::Output: 'static,
{
  fn schedule(&self, task: T, delay: Option<Duration>) -> TaskHandle<T::Output> {
    let handle = TaskHandle::new();
    let inner = handle.clone();
    self
      .spawn_local(async move {
        delay_by(delay).await;
        if !inner.is_cancelled() {
          inner.finish(task.run());
        }
      })
      .unwrap();
    handle
  }
}

#[cfg(feature = "futures-scheduler")]
impl<T> Scheduler<T> for ThreadPool
where
  T: Task + Send + 'static,
  T::Output: Send + 'static,
{
  fn schedule(&self, task: T, delay: Option<Duration>) -> TaskHandle<T::Output> {
    let handle = TaskHandle::new();
    let inner = handle.clone();
    self.spawn_ok(async move {
      delay_by(delay).await;
      if !inner.is_cancelled() {
        inner.finish(task.run());
      }
    });
    handle
  }
}

#[cfg(feature = "tokio-scheduler")]
impl<T> Scheduler<T> for tokio::runtime::Handle
where
  T: Task + Send + 'static,
  T::Output: Send + 'static,
{
  fn schedule(&self, task: T, delay: Option<Duration>) -> TaskHandle<T::Output> {
    let handle = TaskHandle::new();
    let inner = handle.clone();
    self.spawn(async move {
      delay_by(delay).await;
      if !inner.is_cancelled() {
        inner.finish(task.run());
      }
    });
    handle
  }
}

#[cfg(feature = "futures-scheduler")]
static SHARED_POOL: Lazy<ThreadPool> =
  Lazy::new(|| ThreadPool::new().expect("create the shared thread pool"));

/// The process-wide pool for chains that do not bring their own scheduler.
#[cfg(feature = "futures-scheduler")]
pub fn shared_pool() -> ThreadPool { SHARED_POOL.clone() }

/// Runs a local executor until every scheduled task drained.
pub fn run_local<F, R>(f: F) -> R
where
  F: FnOnce(&LocalSpawner) -> R,
{
  let mut pool = LocalPool::new();
  let result = f(&pool.spawner());
  pool.run();
  result
}
