// src/workload.rs
//
// The free-list benchmark expressed as a `Workload`, and the entry point that
// resolves the configured backend to a concrete, monomorphized run.

use crate::config::Config;
use crate::error::BenchError;
use crate::free_list::*;
use crate::refill::{RefillProtocol, RefillWorker, WorkerStats};
use crate::report::{Field, Report};
use crate::runner::{Outcome, Runner, Workload};
use crate::tracker::OwnershipTracker;
use crate::FreeList;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub struct FreeListWorkload<F: FreeList> {
   config: Config,
   protocol: RefillProtocol<F>,
}

impl<F: FreeList> FreeListWorkload<F> {
   /// Builds the tracker and the free list seeded with `N - 1` free slots.
   pub fn new(config: Config) -> Self {
      let free = config.slots - 1;
      info!("Start initialization of the free list with {free} free pages.");
      let protocol = RefillProtocol::new(
         F::with_slots(config.slots),
         OwnershipTracker::new(config.slots),
         config.free_batch,
         config.work_delay(),
      )
      .with_debug(config.debug);
      info!("Finished initialization of the free list with {free} free pages.");
      Self { config, protocol }
   }

   pub fn config(&self) -> &Config {
      &self.config
   }

   pub fn protocol(&self) -> &RefillProtocol<F> {
      &self.protocol
   }
}

impl<F: FreeList> Workload for FreeListWorkload<F> {
   type Worker = RefillWorker<F::Local>;
   type Summary = WorkerStats;

   fn before(&self) -> Self::Worker {
      self.protocol.attach()
   }

   #[inline]
   fn work(&self, worker: &mut Self::Worker) -> Result<(), BenchError> {
      self.protocol.step(worker)
   }

   fn after(&self, worker: Self::Worker) -> WorkerStats {
      self.protocol.detach(worker)
   }

   fn config_fields(&self) -> Vec<Field> {
      let registration = if F::NEEDS_THREAD_REGISTRATION { "Yes" } else { "No" };
      vec![
         Field::new("Blocks", self.config.slots),
         Field::new("Free Batch Size", self.config.free_batch),
         Field::new("Concurrent Queue", self.config.backend),
         Field::extended_only("Thread Registration", registration),
         Field::nanos("Work Time", self.config.work_ns),
      ]
   }

   fn result_fields(&self, summaries: &[WorkerStats]) -> Vec<Field> {
      if !self.config.debug {
         return Vec::new();
      }
      let mut total = WorkerStats::default();
      let mut fields = Vec::with_capacity(summaries.len() + 2);
      for (i, stats) in summaries.iter().enumerate() {
         total.merge(stats);
         fields.push(Field::extended_only(format!("Thread {i}"), stats));
      }
      fields.push(Field::extended_only("Total", &total));
      fields.push(Field::extended_only(
         "Free List Length",
         self.protocol.free_list().approx_len(),
      ));
      fields
   }
}

/// Runs one benchmark with the backend named in `config`, writing the
/// configuration before and the result (or timeout) after the timed phase.
pub fn run_benchmark(config: Config, out: &mut dyn Write) -> Result<Outcome<WorkerStats>, BenchError> {
   match config.backend {
      BackendKind::Legacy => run_with::<LegacyZeroStack>(config, out),
      BackendKind::SegQueue => run_with::<SegQueueFreeList>(config, out),
      BackendKind::ArrayQueue => run_with::<ArrayQueueFreeList>(config, out),
      BackendKind::BoundedChannel => run_with::<ChannelFreeList>(config, out),
      BackendKind::UnboundedChannel => run_with::<UnboundedChannelFreeList>(config, out),
      BackendKind::Injector => run_with::<InjectorFreeList>(config, out),
      BackendKind::Locked => run_with::<LockedFreeList>(config, out),
   }
}

pub fn run_with<F: FreeList>(config: Config, out: &mut dyn Write) -> Result<Outcome<WorkerStats>, BenchError> {
   let report = Report::for_terminal(config.extended, config.debug);
   let runner = Runner::from_config(&config);
   let (threads, iterations, timeout_ns) = (config.threads, config.iterations, config.timeout_ns);

   let workload = Arc::new(FreeListWorkload::<F>::new(config));
   out.write_all(report.configuration(threads, iterations, timeout_ns, &workload.config_fields()).as_bytes())?;
   out.flush()?;

   let outcome = runner.run(Arc::clone(&workload))?;
   let text = match &outcome {
      Outcome::Completed { elapsed, summaries } => report.result(*elapsed, &workload.result_fields(summaries)),
      Outcome::TimedOut { deadline } => report.timeout(*deadline),
   };
   out.write_all(text.as_bytes())?;
   out.flush()?;
   Ok(outcome)
}
