// Mutex-protected FIFO, the blocking baseline.

use crate::{FreeList, PushError, SlotId};
use crossbeam::utils::CachePadded;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct LockedFreeList {
   queue: Mutex<VecDeque<SlotId>>,
   len: CachePadded<AtomicUsize>, // mirror of queue.len(), written under the lock
}

impl FreeList for LockedFreeList {
   type Local = ();

   fn with_slots(slots: usize) -> Self {
      let queue: VecDeque<SlotId> = (1..slots).map(|id| id as SlotId).collect();
      let len = queue.len();
      Self {
         queue: Mutex::new(queue),
         len: CachePadded::new(AtomicUsize::new(len)),
      }
   }

   fn attach(&self) {}

   #[inline]
   fn pop(&self, _local: &()) -> Option<SlotId> {
      let mut queue = self.queue.lock();
      let id = queue.pop_front();
      self.len.store(queue.len(), Ordering::Relaxed);
      id
   }

   #[inline]
   fn push(&self, _local: &(), id: SlotId) -> Result<(), PushError> {
      let mut queue = self.queue.lock();
      queue.push_back(id);
      self.len.store(queue.len(), Ordering::Relaxed);
      Ok(())
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.len.load(Ordering::Relaxed)
   }
}
