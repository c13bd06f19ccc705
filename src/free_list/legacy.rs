// Legacy free list of the buffer pool this benchmark models.
//
// An intrusive singly linked stack threaded through an array indexed by slot
// ID: `links[0]` is the head, `links[id]` the successor of `id`, `0` ends the
// list. Every operation runs under a test-and-test-and-set spin lock.

use crate::{FreeList, PushError, SlotId};
use crossbeam::utils::{Backoff, CachePadded};
use std::{
   cell::UnsafeCell,
   sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/*──────────────────────────────────────────────────────────────────────────*/
/*  TATAS lock                                                              */
/*──────────────────────────────────────────────────────────────────────────*/

#[derive(Debug, Default)]
struct TatasLock {
   locked: CachePadded<AtomicBool>,
}

struct TatasGuard<'a> {
   lock: &'a TatasLock,
}

impl TatasLock {
   #[inline]
   fn acquire(&self) -> TatasGuard<'_> {
      let backoff = Backoff::new();
      loop {
         // spin on a plain load, only then try the RMW
         if !self.locked.load(Ordering::Relaxed)
            && self
               .locked
               .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
               .is_ok()
         {
            return TatasGuard { lock: self };
         }
         backoff.snooze();
      }
   }
}

impl Drop for TatasGuard<'_> {
   #[inline]
   fn drop(&mut self) {
      self.lock.locked.store(false, Ordering::Release);
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Stack                                                                   */
/*──────────────────────────────────────────────────────────────────────────*/

#[derive(Debug)]
pub struct LegacyZeroStack {
   lock : TatasLock,
   links: UnsafeCell<Box<[SlotId]>>,  // guarded by `lock`
   len  : AtomicUsize,                // written under `lock`, read anywhere
}

unsafe impl Sync for LegacyZeroStack {}
unsafe impl Send for LegacyZeroStack {}

impl LegacyZeroStack {
   #[inline]
   fn with_links<R>(&self, f: impl FnOnce(&mut [SlotId]) -> R) -> R {
      let _guard = self.lock.acquire();
      // SAFETY: the guard gives this thread exclusive access to `links`.
      let links = unsafe { &mut *self.links.get() };
      f(links)
   }
}

impl FreeList for LegacyZeroStack {
   type Local = ();

   fn with_slots(slots: usize) -> Self {
      assert!(slots >= 2, "need at least one non-sentinel slot");
      let mut links = vec![0 as SlotId; slots].into_boxed_slice();
      links[0] = 1;
      for id in 1..slots - 1 {
         links[id] = (id + 1) as SlotId;
      }
      links[slots - 1] = 0;

      Self {
         lock : TatasLock::default(),
         links: UnsafeCell::new(links),
         len  : AtomicUsize::new(slots - 1),
      }
   }

   fn attach(&self) {}

   #[inline]
   fn pop(&self, _local: &()) -> Option<SlotId> {
      // cheap unlocked check first, re-checked under the lock
      if self.len.load(Ordering::Relaxed) == 0 {
         return None;
      }
      self.with_links(|links| {
         let len = self.len.load(Ordering::Relaxed);
         if len == 0 {
            return None;
         }
         let id = links[0];
         links[0] = if len == 1 { 0 } else { links[id as usize] };
         self.len.store(len - 1, Ordering::Relaxed);
         Some(id)
      })
   }

   #[inline]
   fn push(&self, _local: &(), id: SlotId) -> Result<(), PushError> {
      self.with_links(|links| {
         links[id as usize] = links[0];
         links[0] = id;
         self.len.fetch_add(1, Ordering::Relaxed);
      });
      Ok(())
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.len.load(Ordering::Relaxed)
   }
}
