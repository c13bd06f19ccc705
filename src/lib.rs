pub mod config;
pub mod error;
pub mod free_list;
pub mod random;
pub mod refill;
pub mod report;
pub mod runner;
pub mod tracker;
pub mod watchdog;
pub mod workload;

pub use config::Config;
pub use error::{BenchError, ConfigError};
pub use free_list::{
   BackendKind, ChannelFreeList, InjectorFreeList, LegacyZeroStack, LockedFreeList,
   ArrayQueueFreeList, SegQueueFreeList, UnboundedChannelFreeList,
};
pub use random::FastRandom;
pub use refill::{RefillProtocol, WorkerStats};
pub use runner::{Outcome, Runner, Workload};
pub use tracker::OwnershipTracker;
pub use watchdog::TimeoutWatchdog;
pub use workload::FreeListWorkload;

/// Identity of one page/block. `0` is the sentinel and never handed out.
pub type SlotId = u32;

/// Error on push when a bounded free list has no room left.
#[derive(Debug, PartialEq, Eq)]
pub struct PushError(pub SlotId);

/// Common interface for all free-list backends.
pub trait FreeList: Send + Sync + 'static {
   /// Per-thread registration state handed out by `attach`.
   type Local;

   /// Backends whose algorithm needs threads to register before use.
   const NEEDS_THREAD_REGISTRATION: bool = false;

   /// Build the free list pre-seeded with every non-sentinel ID in `1..slots`.
   fn with_slots(slots: usize) -> Self
   where
      Self: Sized;

   fn attach(&self) -> Self::Local;
   fn detach(&self, local: Self::Local) {
      drop(local);
   }

   /// Non-blocking; `None` when the list was observed empty.
   fn pop(&self, local: &Self::Local) -> Option<SlotId>;
   fn push(&self, local: &Self::Local, id: SlotId) -> Result<(), PushError>;

   /// Approximate number of free IDs. May be stale under concurrency.
   fn approx_len(&self) -> usize;
}
