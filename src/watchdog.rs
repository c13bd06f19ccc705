// src/watchdog.rs
//
// Background timer bounding the duration of a run. It never touches the
// workers or the process: on expiry it only raises a flag and sends the
// deadline to whoever is waiting on `expired()`.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

pub struct TimeoutWatchdog {
   deadline: Duration,
   disarm: Option<Sender<()>>,
   expired: Receiver<Duration>,
   fired: Arc<AtomicBool>,
   handle: Option<JoinHandle<()>>,
}

impl TimeoutWatchdog {
   pub fn start(deadline: Duration) -> io::Result<Self> {
      let (disarm_tx, disarm_rx) = channel::bounded::<()>(0);
      let (expired_tx, expired_rx) = channel::bounded(1);
      let fired = Arc::new(AtomicBool::new(false));

      let flag = Arc::clone(&fired);
      let handle = thread::Builder::new()
         .name("watchdog".into())
         .spawn(move || match disarm_rx.recv_timeout(deadline) {
            Err(RecvTimeoutError::Timeout) => {
               warn!(?deadline, "benchmark did not finish in time");
               flag.store(true, Ordering::Release);
               let _ = expired_tx.send(deadline);
            }
            // disarmed: the sender was dropped
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
               debug!("watchdog disarmed");
            }
         })?;

      Ok(Self {
         deadline,
         disarm: Some(disarm_tx),
         expired: expired_rx,
         fired,
         handle: Some(handle),
      })
   }

   pub fn deadline(&self) -> Duration {
      self.deadline
   }

   /// Yields the deadline once, when it has passed.
   pub fn expired(&self) -> &Receiver<Duration> {
      &self.expired
   }

   pub fn has_fired(&self) -> bool {
      self.fired.load(Ordering::Acquire)
   }

   /// Stops the timer and waits for its thread. Returns whether it had
   /// already fired.
   pub fn disarm(mut self) -> bool {
      self.shutdown();
      self.has_fired()
   }

   fn shutdown(&mut self) {
      drop(self.disarm.take());
      if let Some(handle) = self.handle.take() {
         let _ = handle.join();
      }
   }
}

impl Drop for TimeoutWatchdog {
   fn drop(&mut self) {
      self.shutdown();
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use std::time::Instant;

   #[test]
   fn test_fires_after_deadline() {
      let dog = TimeoutWatchdog::start(Duration::from_millis(10)).unwrap();
      let got = dog.expired().recv_timeout(Duration::from_secs(5)).unwrap();
      assert_eq!(got, Duration::from_millis(10));
      assert!(dog.has_fired());
   }

   #[test]
   fn test_disarm_before_deadline() {
      let start = Instant::now();
      let dog = TimeoutWatchdog::start(Duration::from_secs(60)).unwrap();
      let rx = dog.expired().clone();
      assert!(!dog.disarm());
      assert!(start.elapsed() < Duration::from_secs(30));
      assert!(rx.try_recv().is_err());
   }
}
