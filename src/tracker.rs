// src/tracker.rs
//
// Which slots are currently owned by somebody. A set flag means the slot is
// either sitting in the free list or was just claimed by a refilling worker;
// a clear flag means a worker popped it and it may be claimed again.

use crate::SlotId;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct OwnershipTracker {
   flags: Box<[AtomicBool]>,
}

impl OwnershipTracker {
   /// All non-sentinel slots start out marked in use, so the free list seeded
   /// with them is consistent with the tracker from the first iteration.
   pub fn new(slots: usize) -> Self {
      let flags = (0..slots)
         .map(|id| AtomicBool::new(id != 0))
         .collect::<Vec<_>>()
         .into_boxed_slice();
      Self { flags }
   }

   #[inline]
   pub fn slots(&self) -> usize {
      self.flags.len()
   }

   /// Test-and-set. `true` iff this call moved the slot from free to in use.
   #[inline]
   pub fn claim(&self, id: SlotId) -> bool {
      !self.flags[id as usize].swap(true, Ordering::Acquire)
   }

   #[inline]
   pub fn release(&self, id: SlotId) {
      self.flags[id as usize].store(false, Ordering::Release);
   }

   pub fn is_claimed(&self, id: SlotId) -> bool {
      self.flags[id as usize].load(Ordering::Acquire)
   }

   /// Number of set flags, sentinel excluded. Only meaningful at quiescence.
   pub fn claimed_count(&self) -> usize {
      self.flags
         .iter()
         .skip(1)
         .filter(|f| f.load(Ordering::Acquire))
         .count()
   }
}
