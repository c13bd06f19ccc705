mod array_queue;
mod channel;
mod injector;
mod legacy;
mod locked;
mod seg_queue;

pub use array_queue::ArrayQueueFreeList;
pub use channel::{ChannelFreeList, UnboundedChannelFreeList};
pub use injector::InjectorFreeList;
pub use legacy::LegacyZeroStack;
pub use locked::LockedFreeList;
pub use seg_queue::SegQueueFreeList;

use crate::error::BenchError;
use crate::FreeList;
use std::fmt;
use std::str::FromStr;

/// Every free list the benchmark can be pointed at. Resolved once from the
/// `--queue` argument; the hot loop is then monomorphized per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
   Legacy,
   SegQueue,
   ArrayQueue,
   BoundedChannel,
   UnboundedChannel,
   Injector,
   Locked,
}

impl BackendKind {
   pub const ALL: [BackendKind; 7] = [
      BackendKind::Legacy,
      BackendKind::SegQueue,
      BackendKind::ArrayQueue,
      BackendKind::BoundedChannel,
      BackendKind::UnboundedChannel,
      BackendKind::Injector,
      BackendKind::Locked,
   ];

   pub fn name(self) -> &'static str {
      match self {
         BackendKind::Legacy => "legacy",
         BackendKind::SegQueue => "crossbeam::queue::SegQueue",
         BackendKind::ArrayQueue => "crossbeam::queue::ArrayQueue",
         BackendKind::BoundedChannel => "crossbeam::channel::bounded",
         BackendKind::UnboundedChannel => "crossbeam::channel::unbounded",
         BackendKind::Injector => "crossbeam::deque::Injector",
         BackendKind::Locked => "parking_lot::Mutex<VecDeque>",
      }
   }

   pub fn needs_thread_registration(self) -> bool {
      match self {
         BackendKind::Legacy => LegacyZeroStack::NEEDS_THREAD_REGISTRATION,
         BackendKind::SegQueue => SegQueueFreeList::NEEDS_THREAD_REGISTRATION,
         BackendKind::ArrayQueue => ArrayQueueFreeList::NEEDS_THREAD_REGISTRATION,
         BackendKind::BoundedChannel => ChannelFreeList::NEEDS_THREAD_REGISTRATION,
         BackendKind::UnboundedChannel => UnboundedChannelFreeList::NEEDS_THREAD_REGISTRATION,
         BackendKind::Injector => InjectorFreeList::NEEDS_THREAD_REGISTRATION,
         BackendKind::Locked => LockedFreeList::NEEDS_THREAD_REGISTRATION,
      }
   }

   /// Comma separated list of every registered name, for error messages.
   pub fn valid_names() -> String {
      Self::ALL
         .iter()
         .map(|k| k.name())
         .collect::<Vec<_>>()
         .join(", ")
   }
}

impl fmt::Display for BackendKind {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.name())
   }
}

impl FromStr for BackendKind {
   type Err = BenchError;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      Self::ALL
         .iter()
         .copied()
         .find(|k| k.name() == s)
         .ok_or_else(|| BenchError::UnknownBackend {
            name: s.to_owned(),
            valid: Self::valid_names(),
         })
   }
}
