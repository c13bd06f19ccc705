// Work-stealing free list: a global injector queue plus one local deque per
// registered thread. Pops drain the local deque first and refill it in batches
// from the injector; pushes always go to the injector so every thread can see
// them. A thread's leftover local IDs are returned to the injector on detach.

use crate::{FreeList, PushError, SlotId};
use crossbeam::deque::{Injector, Steal, Worker};
use crossbeam::utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct InjectorFreeList {
   injector: Injector<SlotId>,
   // IDs in the injector plus all local deques. Bumped before a push and
   // dropped after a pop, so it may overshoot but never wraps below zero.
   len: CachePadded<AtomicUsize>,
}

impl FreeList for InjectorFreeList {
   type Local = Worker<SlotId>;

   const NEEDS_THREAD_REGISTRATION: bool = true;

   fn with_slots(slots: usize) -> Self {
      let injector = Injector::new();
      for id in 1..slots {
         injector.push(id as SlotId);
      }
      Self {
         injector,
         len: CachePadded::new(AtomicUsize::new(slots.saturating_sub(1))),
      }
   }

   fn attach(&self) -> Worker<SlotId> {
      Worker::new_fifo()
   }

   fn detach(&self, local: Worker<SlotId>) {
      while let Some(id) = local.pop() {
         self.injector.push(id);
      }
   }

   #[inline]
   fn pop(&self, local: &Worker<SlotId>) -> Option<SlotId> {
      let id = local.pop().or_else(|| loop {
         match self.injector.steal_batch_and_pop(local) {
            Steal::Success(id) => break Some(id),
            Steal::Empty => break None,
            Steal::Retry => continue,
         }
      })?;
      self.len.fetch_sub(1, Ordering::Relaxed);
      Some(id)
   }

   #[inline]
   fn push(&self, _local: &Worker<SlotId>, id: SlotId) -> Result<(), PushError> {
      self.len.fetch_add(1, Ordering::Relaxed);
      self.injector.push(id);
      Ok(())
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.len.load(Ordering::Relaxed)
   }
}
