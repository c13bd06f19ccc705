// src/runner.rs
//
// Generic multi-threaded benchmark driver. A `Workload` supplies the per
// iteration work and its per-thread setup/teardown; the runner spawns the
// worker pool, times the parallel phase and races it against the watchdog.

use crate::config::Config;
use crate::error::BenchError;
use crate::report::Field;
use crate::watchdog::TimeoutWatchdog;
use crossbeam::channel::{self, select, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub trait Workload: Send + Sync + 'static {
   /// Per-thread state, created and dropped on the worker thread.
   type Worker;
   type Summary: Send + 'static;

   fn before(&self) -> Self::Worker;
   fn work(&self, worker: &mut Self::Worker) -> Result<(), BenchError>;
   fn after(&self, worker: Self::Worker) -> Self::Summary;

   /// Workload specific configuration lines.
   fn config_fields(&self) -> Vec<Field> {
      Vec::new()
   }

   /// Workload specific result lines.
   fn result_fields(&self, _summaries: &[Self::Summary]) -> Vec<Field> {
      Vec::new()
   }
}

#[derive(Debug)]
pub enum Outcome<S> {
   Completed { elapsed: Duration, summaries: Vec<S> },
   /// The watchdog fired first. Workers were left running.
   TimedOut { deadline: Duration },
}

impl<S> Outcome<S> {
   pub fn is_timeout(&self) -> bool {
      matches!(self, Outcome::TimedOut { .. })
   }

   pub fn elapsed(&self) -> Option<Duration> {
      match self {
         Outcome::Completed { elapsed, .. } => Some(*elapsed),
         Outcome::TimedOut { .. } => None,
      }
   }
}

enum RunEvent<S> {
   Finished { elapsed: Duration, summaries: Vec<S> },
   Failed(BenchError),
}

#[derive(Debug, Clone)]
pub struct Runner {
   threads: usize,
   iterations: u64,
   deadline: Option<Duration>,
}

impl Runner {
   pub fn new(threads: usize, iterations: u64) -> Self {
      Self {
         threads,
         iterations,
         deadline: None,
      }
   }

   pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
      self.deadline = deadline;
      self
   }

   pub fn from_config(config: &Config) -> Self {
      Self::new(config.threads, config.iterations).with_deadline(config.watchdog_deadline())
   }

   /// Runs `threads` workers for `iterations` each. Returns as soon as either
   /// all workers joined, one of them failed, or the watchdog fired.
   pub fn run<W: Workload>(&self, workload: Arc<W>) -> Result<Outcome<W::Summary>, BenchError> {
      let watchdog = self.deadline.map(TimeoutWatchdog::start).transpose()?;
      let expired = watchdog
         .as_ref()
         .map(|w| w.expired().clone())
         .unwrap_or_else(channel::never);

      let (events_tx, events_rx) = channel::unbounded();
      let (threads, iterations) = (self.threads, self.iterations);
      let coordinator = thread::Builder::new()
         .name("coordinator".into())
         .spawn(move || run_workers(workload, threads, iterations, events_tx))?;

      select! {
         recv(events_rx) -> event => {
            if let Some(dog) = watchdog {
               dog.disarm();
            }
            match event {
               Ok(RunEvent::Finished { elapsed, summaries }) => {
                  let _ = coordinator.join();
                  Ok(Outcome::Completed { elapsed, summaries })
               }
               Ok(RunEvent::Failed(err)) => Err(err),
               // the coordinator hung up without reporting: a worker panicked
               Err(_) => match coordinator.join() {
                  Err(payload) => std::panic::resume_unwind(payload),
                  Ok(()) => unreachable!("coordinator exited without an event"),
               },
            }
         }
         recv(expired) -> deadline => {
            let deadline = deadline.unwrap_or_default();
            debug!(?deadline, "abandoning worker threads");
            Ok(Outcome::TimedOut { deadline })
         }
      }
   }
}

fn run_workers<W: Workload>(
   workload: Arc<W>,
   threads: usize,
   iterations: u64,
   events: Sender<RunEvent<W::Summary>>,
) {
   let start = Instant::now();

   info!("Start spawning {threads} threads ...");
   let mut handles = Vec::with_capacity(threads);
   for i in 0..threads {
      let w = Arc::clone(&workload);
      let failed = events.clone();
      let spawned = thread::Builder::new()
         .name(format!("worker-{i}"))
         .spawn(move || {
            let mut worker = w.before();
            for _ in 0..iterations {
               if let Err(err) = w.work(&mut worker) {
                  let _ = failed.send(RunEvent::Failed(err));
                  return None;
               }
            }
            Some(w.after(worker))
         });
      match spawned {
         Ok(handle) => handles.push(handle),
         Err(err) => {
            let _ = events.send(RunEvent::Failed(err.into()));
            return;
         }
      }
   }
   info!("Finished spawning {threads} threads ...");

   info!("Waiting for {threads} threads to complete ...");
   let mut summaries = Vec::with_capacity(threads);
   let mut complete = true;
   for handle in handles {
      match handle.join() {
         Ok(Some(summary)) => summaries.push(summary),
         Ok(None) => complete = false,
         Err(payload) => std::panic::resume_unwind(payload),
      }
   }
   let elapsed = start.elapsed();
   info!("All {threads} threads completed ...");

   if complete {
      let _ = events.send(RunEvent::Finished { elapsed, summaries });
   }
}
