// src/config.rs
//
// The frozen parameter set of one benchmark run. Built once by the driver,
// validated, then shared read-only with every worker.

use crate::error::ConfigError;
use crate::free_list::BackendKind;
use std::time::Duration;

/// Page count of the buffer pool the benchmark models.
pub const DEFAULT_SLOTS: usize = 6523;
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;
pub const DEFAULT_TIMEOUT_NS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
   pub backend: BackendKind,
   pub threads: usize,
   pub iterations: u64,
   /// Slot count `N`, sentinel included.
   pub slots: usize,
   /// Minimum occupancy a refill restores before returning.
   pub free_batch: usize,
   pub work_ns: u64,
   /// Per thread and iteration; `0` disables the watchdog.
   pub timeout_ns: u64,
   pub extended: bool,
   pub debug: bool,
}

impl Config {
   pub fn new(backend: BackendKind) -> Self {
      Self {
         backend,
         threads: default_threads(),
         iterations: DEFAULT_ITERATIONS,
         slots: DEFAULT_SLOTS,
         free_batch: default_free_batch(DEFAULT_SLOTS),
         work_ns: 0,
         timeout_ns: DEFAULT_TIMEOUT_NS,
         extended: false,
         debug: false,
      }
   }

   /// Debug output implies extended output.
   pub fn validate(mut self) -> Result<Self, ConfigError> {
      if self.threads == 0 {
         return Err(ConfigError::ZeroThreads(self.threads));
      }
      if self.iterations == 0 {
         return Err(ConfigError::ZeroIterations(self.iterations));
      }
      let max_slots = u32::MAX as usize;
      if self.slots < 2 || self.slots > max_slots {
         return Err(ConfigError::Slots { slots: self.slots, max: max_slots });
      }
      // The free list never holds more than N - 1 IDs, so a larger batch
      // would keep a refill spinning forever.
      let max_batch = self.slots - 1;
      if self.free_batch == 0 || self.free_batch > max_batch {
         return Err(ConfigError::FreeBatch { batch: self.free_batch, max: max_batch });
      }
      if self.debug {
         self.extended = true;
      }
      Ok(self)
   }

   #[inline]
   pub fn work_delay(&self) -> Duration {
      Duration::from_nanos(self.work_ns)
   }

   /// `threads * iterations * timeout_ns`, `None` when the watchdog is off.
   pub fn watchdog_deadline(&self) -> Option<Duration> {
      if self.timeout_ns == 0 {
         return None;
      }
      let ns = (self.threads as u64)
         .saturating_mul(self.iterations)
         .saturating_mul(self.timeout_ns);
      Some(Duration::from_nanos(ns))
   }
}

pub fn default_threads() -> usize {
   std::thread::available_parallelism()
      .map(|n| n.get())
      .unwrap_or(1)
}

/// A tenth of the pool, at least one slot.
pub fn default_free_batch(slots: usize) -> usize {
   (slots / 10).max(1)
}

#[cfg(test)]
mod tests {
   use super::*;

   fn base() -> Config {
      Config::new(BackendKind::Legacy)
   }

   #[test]
   fn test_defaults_validate() {
      let cfg = base().validate().unwrap();
      assert_eq!(cfg.slots, 6523);
      assert_eq!(cfg.free_batch, 652);
      assert!(cfg.threads >= 1);
   }

   #[test]
   fn test_rejects_zero_threads_and_iterations() {
      let mut cfg = base();
      cfg.threads = 0;
      assert_eq!(cfg.validate(), Err(ConfigError::ZeroThreads(0)));

      let mut cfg = base();
      cfg.iterations = 0;
      assert_eq!(cfg.validate(), Err(ConfigError::ZeroIterations(0)));
   }

   #[test]
   fn test_free_batch_bounds() {
      let mut cfg = base();
      cfg.slots = 8;
      cfg.free_batch = 7;
      assert!(cfg.clone().validate().is_ok());
      cfg.free_batch = 8;
      assert_eq!(cfg.clone().validate(), Err(ConfigError::FreeBatch { batch: 8, max: 7 }));
      cfg.free_batch = 0;
      assert!(cfg.validate().is_err());
   }

   #[test]
   fn test_debug_implies_extended() {
      let mut cfg = base();
      cfg.debug = true;
      assert!(cfg.validate().unwrap().extended);
   }

   #[test]
   fn test_watchdog_deadline() {
      let mut cfg = base();
      cfg.threads = 2;
      cfg.iterations = 1_000;
      cfg.timeout_ns = 3;
      assert_eq!(cfg.watchdog_deadline(), Some(Duration::from_nanos(6_000)));
      cfg.timeout_ns = 0;
      assert_eq!(cfg.watchdog_deadline(), None);
      cfg.timeout_ns = u64::MAX;
      assert_eq!(cfg.watchdog_deadline(), Some(Duration::from_nanos(u64::MAX)));
   }
}
