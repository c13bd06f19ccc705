// Bounded lock-free MPMC ring, sized to exactly `N - 1` IDs.

use crate::{FreeList, PushError, SlotId};
use crossbeam::queue::ArrayQueue;

#[derive(Debug)]
pub struct ArrayQueueFreeList {
   queue: ArrayQueue<SlotId>,
}

impl ArrayQueueFreeList {
   pub fn capacity(&self) -> usize {
      self.queue.capacity()
   }
}

impl FreeList for ArrayQueueFreeList {
   type Local = ();

   fn with_slots(slots: usize) -> Self {
      assert!(slots >= 2, "need at least one non-sentinel slot");
      let queue = ArrayQueue::new(slots - 1);
      for id in 1..slots {
         // capacity is exactly slots - 1
         let _ = queue.push(id as SlotId);
      }
      Self { queue }
   }

   fn attach(&self) {}

   #[inline]
   fn pop(&self, _local: &()) -> Option<SlotId> {
      self.queue.pop()
   }

   #[inline]
   fn push(&self, _local: &(), id: SlotId) -> Result<(), PushError> {
      self.queue.push(id).map_err(PushError)
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.queue.len()
   }
}
