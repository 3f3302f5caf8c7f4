use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, MutRc, RcDeref, RcDerefMut},
  subject::{Subject, SubjectSubscription, SubjectSubscriptionThreads, SubjectThreads},
};

macro_rules! impl_behavior_subject {
  ($behavior: ident, $sink: ident, $subject: ident, $subscription: ident, $rc: ident $(, $send: ident)?) => {
    struct $sink<Item> {
      memory: $rc<Item>,
    }

    impl<Item, Err> Observer<Item, Err> for $sink<Item> {
      fn next(&mut self, value: Item) { *self.memory.rc_deref_mut() = value; }

      fn error(self, _: Err) {}

      fn complete(self) {}

      fn is_finished(&self) -> bool { false }
    }

    /// Subject that always holds a current value.
    ///
    /// A fresh subscriber is handed the held value first, then the live
    /// stream resumes. The held value starts out as the seed and tracks every
    /// emission afterwards, ahead of the fan-out to subscribers.
    pub struct $behavior<Item: 'static, Err: 'static> {
      subject: $subject<Item, Err>,
      memory: $rc<Item>,
    }

    impl<Item: 'static, Err: 'static> $behavior<Item, Err> {
      pub fn new(seed: Item) -> Self
      $(where Item: $send)?
      {
        let memory = $rc::own(seed);
        let sink = $sink { memory: memory.clone() };
        $behavior {
          subject: $subject::with_sink(Box::new(sink)),
          memory,
        }
      }

      /// The value a subscriber arriving right now would receive first.
      pub fn peek(&self) -> Item
      where
        Item: Clone,
      {
        self.memory.rc_deref().clone()
      }
    }

    impl<Item: 'static, Err: 'static> Clone for $behavior<Item, Err> {
      fn clone(&self) -> Self {
        $behavior {
          subject: self.subject.clone(),
          memory: self.memory.clone(),
        }
      }
    }

    impl<Item, Err> Observer<Item, Err> for $behavior<Item, Err>
    where
      Item: Clone + 'static,
      Err: Clone + 'static,
    {
      fn next(&mut self, value: Item) { self.subject.next(value); }

      fn error(self, err: Err) { self.subject.error(err); }

      fn complete(self) { self.subject.complete(); }

      fn is_finished(&self) -> bool { self.subject.is_finished() }
    }

    impl<Item, Err, O> Observable<Item, Err, O> for $behavior<Item, Err>
    where
      O: Observer<Item, Err> $(+ $send)? + 'static,
      Item: Clone + 'static,
      Err: Clone + 'static,
    {
      type Unsub = $subscription<Item, Err>;

      fn actual_subscribe(self, observer: O) -> Self::Unsub {
        let memory = self.memory;
        self.subject.register(
          observer,
          move |observer| observer.dyn_next(memory.rc_deref().clone()),
          |_| {},
        )
      }
    }

    impl<Item: 'static, Err: 'static> ObservableExt<Item, Err> for $behavior<Item, Err> {}
  };
}

impl_behavior_subject!(BehaviorSubject, BehaviorSink, Subject, SubjectSubscription, MutRc);
impl_behavior_subject!(
  BehaviorSubjectThreads,
  BehaviorSinkThreads,
  SubjectThreads,
  SubjectSubscriptionThreads,
  MutArc,
  Send
);
