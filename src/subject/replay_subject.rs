use std::{
  collections::VecDeque,
  time::{Duration, Instant},
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::{DynObserver, Observer},
  rc::{MutArc, MutRc, RcDerefMut},
  subject::{Subject, SubjectSubscription, SubjectSubscriptionThreads, SubjectThreads},
};

/// Recording of past emissions, trimmed by count or by age.
struct ReplayBuffer<Item> {
  entries: VecDeque<(Instant, Item)>,
  capacity: Option<usize>,
  window: Option<Duration>,
}

impl<Item> ReplayBuffer<Item> {
  fn unbounded() -> Self {
    ReplayBuffer { entries: VecDeque::new(), capacity: None, window: None }
  }

  fn bounded(capacity: usize) -> Self {
    ReplayBuffer { entries: VecDeque::new(), capacity: Some(capacity), window: None }
  }

  fn windowed(window: Duration) -> Self {
    ReplayBuffer { entries: VecDeque::new(), capacity: None, window: Some(window) }
  }

  fn push(&mut self, value: Item) {
    if self.capacity == Some(0) {
      return;
    }
    self.expire();
    if let Some(capacity) = self.capacity {
      while self.entries.len() >= capacity {
        self.entries.pop_front();
      }
    }
    self.entries.push_back((Instant::now(), value));
  }

  fn expire(&mut self) {
    if let Some(window) = self.window {
      while self.entries.front().map_or(false, |(stamp, _)| stamp.elapsed() > window) {
        self.entries.pop_front();
      }
    }
  }
}

macro_rules! impl_replay_subject {
  ($replay: ident, $sink: ident, $subject: ident, $subscription: ident, $rc: ident $(, $send: ident)?) => {
    struct $sink<Item> {
      buffer: $rc<ReplayBuffer<Item>>,
    }

    impl<Item, Err> Observer<Item, Err> for $sink<Item> {
      fn next(&mut self, value: Item) { self.buffer.rc_deref_mut().push(value); }

      fn error(self, _: Err) {}

      fn complete(self) {}

      fn is_finished(&self) -> bool { false }
    }

    /// Subject that replays its recording to every new subscriber.
    ///
    /// The recording is fed ahead of the fan-out, so a subscriber never sees
    /// a value both replayed and live. Subscribing after the stream
    /// terminated still replays the recording, followed by the terminal.
    pub struct $replay<Item: 'static, Err: 'static> {
      subject: $subject<Item, Err>,
      buffer: $rc<ReplayBuffer<Item>>,
    }

    impl<Item: 'static, Err: 'static> $replay<Item, Err> {
      /// Remembers every emission.
      pub fn unbounded() -> Self
      $(where Item: $send)?
      {
        Self::with_buffer(ReplayBuffer::unbounded())
      }

      /// Remembers at most `capacity` emissions, evicting the oldest first.
      pub fn with_capacity(capacity: usize) -> Self
      $(where Item: $send)?
      {
        Self::with_buffer(ReplayBuffer::bounded(capacity))
      }

      /// Remembers the emissions younger than `window`.
      pub fn with_duration(window: Duration) -> Self
      $(where Item: $send)?
      {
        Self::with_buffer(ReplayBuffer::windowed(window))
      }

      fn with_buffer(buffer: ReplayBuffer<Item>) -> Self
      $(where Item: $send)?
      {
        let buffer = $rc::own(buffer);
        let sink = $sink { buffer: buffer.clone() };
        $replay {
          subject: $subject::with_sink(Box::new(sink)),
          buffer,
        }
      }

      fn replay_into(
        buffer: &$rc<ReplayBuffer<Item>>,
        observer: &mut (dyn DynObserver<Item, Err> $(+ $send)?),
      ) where
        Item: Clone,
      {
        let mut buffer = buffer.rc_deref_mut();
        buffer.expire();
        for (_, value) in buffer.entries.iter() {
          observer.dyn_next(value.clone());
        }
      }
    }

    impl<Item: 'static, Err: 'static> Clone for $replay<Item, Err> {
      fn clone(&self) -> Self {
        $replay {
          subject: self.subject.clone(),
          buffer: self.buffer.clone(),
        }
      }
    }

    impl<Item, Err> Observer<Item, Err> for $replay<Item, Err>
    where
      Item: Clone + 'static,
      Err: Clone + 'static,
    {
      fn next(&mut self, value: Item) { self.subject.next(value); }

      fn error(self, err: Err) { self.subject.error(err); }

      fn complete(self) { self.subject.complete(); }

      fn is_finished(&self) -> bool { self.subject.is_finished() }
    }

    impl<Item, Err, O> Observable<Item, Err, O> for $replay<Item, Err>
    where
      O: Observer<Item, Err> $(+ $send)? + 'static,
      Item: Clone + 'static,
      Err: Clone + 'static,
    {
      type Unsub = $subscription<Item, Err>;

      fn actual_subscribe(self, observer: O) -> Self::Unsub {
        let live = self.buffer.clone();
        let done = self.buffer;
        self.subject.register(
          observer,
          move |observer| Self::replay_into(&live, observer),
          move |observer| Self::replay_into(&done, observer),
        )
      }
    }

    impl<Item: 'static, Err: 'static> ObservableExt<Item, Err> for $replay<Item, Err> {}
  };
}

impl_replay_subject!(ReplaySubject, ReplaySink, Subject, SubjectSubscription, MutRc);
impl_replay_subject!(
  ReplaySubjectThreads,
  ReplaySinkThreads,
  SubjectThreads,
  SubjectSubscriptionThreads,
  MutArc,
  Send
);
