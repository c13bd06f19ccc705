// Unbounded lock-free MPMC queue of segments.

use crate::{FreeList, PushError, SlotId};
use crossbeam::queue::SegQueue;

#[derive(Debug)]
pub struct SegQueueFreeList {
   queue: SegQueue<SlotId>,
}

impl FreeList for SegQueueFreeList {
   type Local = ();

   fn with_slots(slots: usize) -> Self {
      let queue = SegQueue::new();
      for id in 1..slots {
         queue.push(id as SlotId);
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
      self.queue.push(id);
      Ok(())
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.queue.len()
   }
}
