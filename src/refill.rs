// src/refill.rs
//
// One benchmark iteration: take a free slot, or, when the free list is
// observed empty, claim random unowned slots and push them back until the
// list holds at least `free_batch` IDs again.

use crate::error::BenchError;
use crate::random::FastRandom;
use crate::tracker::OwnershipTracker;
use crate::{FreeList, PushError, SlotId};
use std::fmt;
use std::time::Duration;
use tracing::trace;

/// Counters one worker accumulates over its iterations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
   pub pops: u64,
   /// Iterations that found the free list empty and entered a refill.
   pub misses: u64,
   pub pushes: u64,
   pub failed_claims: u64,
   /// Smallest and largest occupancy observed, only tracked in debug mode.
   pub occupancy: Option<(usize, usize)>,
}

impl WorkerStats {
   #[inline]
   fn observe(&mut self, len: usize) {
      self.occupancy = Some(match self.occupancy {
         Some((lo, hi)) => (lo.min(len), hi.max(len)),
         None => (len, len),
      });
   }

   pub fn merge(&mut self, other: &WorkerStats) {
      self.pops += other.pops;
      self.misses += other.misses;
      self.pushes += other.pushes;
      self.failed_claims += other.failed_claims;
      if let Some((lo, hi)) = other.occupancy {
         self.observe(lo);
         self.observe(hi);
      }
   }
}

impl fmt::Display for WorkerStats {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(
         f,
         "pops {}, refills {}, pushes {}, failed claims {}",
         self.pops, self.misses, self.pushes, self.failed_claims
      )?;
      if let Some((lo, hi)) = self.occupancy {
         write!(f, ", occupancy {lo}..={hi}")?;
      }
      Ok(())
   }
}

/// Thread-local half of the protocol, created by `attach`.
pub struct RefillWorker<L> {
   local: L,
   rng: FastRandom,
   stats: WorkerStats,
}

impl<L> RefillWorker<L> {
   pub fn stats(&self) -> &WorkerStats {
      &self.stats
   }
}

pub struct RefillProtocol<F: FreeList> {
   free_list: F,
   tracker: OwnershipTracker,
   free_batch: usize,
   work_delay: Duration,
   debug: bool,
}

impl<F: FreeList> RefillProtocol<F> {
   pub fn new(free_list: F, tracker: OwnershipTracker, free_batch: usize, work_delay: Duration) -> Self {
      Self {
         free_list,
         tracker,
         free_batch,
         work_delay,
         debug: false,
      }
   }

   /// Track occupancy observations in the worker stats.
   pub fn with_debug(mut self, debug: bool) -> Self {
      self.debug = debug;
      self
   }

   pub fn free_list(&self) -> &F {
      &self.free_list
   }

   pub fn tracker(&self) -> &OwnershipTracker {
      &self.tracker
   }

   /// Registers the calling thread with the free list and seeds its generator.
   pub fn attach(&self) -> RefillWorker<F::Local> {
      self.attach_with(FastRandom::new(self.tracker.slots()))
   }

   pub fn attach_with(&self, rng: FastRandom) -> RefillWorker<F::Local> {
      RefillWorker {
         local: self.free_list.attach(),
         rng,
         stats: WorkerStats::default(),
      }
   }

   pub fn detach(&self, worker: RefillWorker<F::Local>) -> WorkerStats {
      self.free_list.detach(worker.local);
      worker.stats
   }

   pub fn step(&self, worker: &mut RefillWorker<F::Local>) -> Result<(), BenchError> {
      if let Some(id) = self.free_list.pop(&worker.local) {
         worker.stats.pops += 1;
         self.observe(&mut worker.stats);
         self.tracker.release(id);
         self.work();
         std::hint::black_box(id);
         return Ok(());
      }

      worker.stats.misses += 1;
      while self.free_list.approx_len() < self.free_batch {
         let id = worker.rng.next_slot();
         if !self.tracker.claim(id) {
            worker.stats.failed_claims += 1;
            continue;
         }
         self.push(&worker.local, id)?;
         worker.stats.pushes += 1;
         self.work();
         self.observe(&mut worker.stats);
      }
      Ok(())
   }

   #[inline]
   fn push(&self, local: &F::Local, id: SlotId) -> Result<(), BenchError> {
      self.free_list
         .push(local, id)
         .map_err(|PushError(slot)| BenchError::Capacity {
            backend: std::any::type_name::<F>(),
            slot,
         })
   }

   #[inline]
   fn work(&self) {
      if !self.work_delay.is_zero() {
         std::thread::sleep(self.work_delay);
      }
   }

   #[inline]
   fn observe(&self, stats: &mut WorkerStats) {
      if self.debug {
         let len = self.free_list.approx_len();
         trace!(len, "free list occupancy");
         stats.observe(len);
      }
   }
}
