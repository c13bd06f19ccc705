// Free lists on top of crossbeam channels. The list owns both ends, so the
// channel never disconnects while it is alive.

use crate::{FreeList, PushError, SlotId};
use crossbeam::channel::{self, Receiver, Sender};

/*────────────────────────────  bounded: N - 1  ────────────────────────────*/

#[derive(Debug)]
pub struct ChannelFreeList {
   tx: Sender<SlotId>,
   rx: Receiver<SlotId>,
}

impl FreeList for ChannelFreeList {
   type Local = ();

   fn with_slots(slots: usize) -> Self {
      assert!(slots >= 2, "need at least one non-sentinel slot");
      let (tx, rx) = channel::bounded(slots - 1);
      for id in 1..slots {
         let _ = tx.try_send(id as SlotId);
      }
      Self { tx, rx }
   }

   fn attach(&self) {}

   #[inline]
   fn pop(&self, _local: &()) -> Option<SlotId> {
      self.rx.try_recv().ok()
   }

   #[inline]
   fn push(&self, _local: &(), id: SlotId) -> Result<(), PushError> {
      self.tx
         .try_send(id)
         .map_err(|e| PushError(e.into_inner()))
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.rx.len()
   }
}

/*───────────────────────────────  unbounded  ──────────────────────────────*/

#[derive(Debug)]
pub struct UnboundedChannelFreeList {
   tx: Sender<SlotId>,
   rx: Receiver<SlotId>,
}

impl FreeList for UnboundedChannelFreeList {
   type Local = ();

   fn with_slots(slots: usize) -> Self {
      let (tx, rx) = channel::unbounded();
      for id in 1..slots {
         let _ = tx.send(id as SlotId);
      }
      Self { tx, rx }
   }

   fn attach(&self) {}

   #[inline]
   fn pop(&self, _local: &()) -> Option<SlotId> {
      self.rx.try_recv().ok()
   }

   #[inline]
   fn push(&self, _local: &(), id: SlotId) -> Result<(), PushError> {
      self.tx.send(id).map_err(|e| PushError(e.into_inner()))
   }

   #[inline]
   fn approx_len(&self) -> usize {
      self.rx.len()
   }
}
