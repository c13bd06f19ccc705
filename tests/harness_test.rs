// free_list_bench/tests/harness_test.rs

use free_list_bench::error::{EXIT_CONFIG, EXIT_UNKNOWN_BACKEND};
use free_list_bench::workload::run_benchmark;
use free_list_bench::{
   BackendKind, BenchError, Config, FreeListWorkload, LegacyZeroStack, Outcome, Runner, Workload,
};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn small_config(backend: BackendKind) -> Config {
   let mut cfg = Config::new(backend);
   cfg.threads = 4;
   cfg.iterations = 2_000;
   cfg.slots = 64;
   cfg.free_batch = 8;
   cfg.timeout_ns = 0;
   cfg.validate().unwrap()
}

/// Counts hook invocations.
#[derive(Default)]
struct Counting {
   before: AtomicUsize,
   work: AtomicUsize,
   after: AtomicUsize,
}

impl Workload for Counting {
   type Worker = u64;
   type Summary = u64;

   fn before(&self) -> u64 {
      self.before.fetch_add(1, Ordering::Relaxed);
      0
   }

   fn work(&self, worker: &mut u64) -> Result<(), BenchError> {
      self.work.fetch_add(1, Ordering::Relaxed);
      *worker += 1;
      Ok(())
   }

   fn after(&self, worker: u64) -> u64 {
      self.after.fetch_add(1, Ordering::Relaxed);
      worker
   }
}

#[test]
fn test_runner_calls_hooks_once_per_thread() {
   let workload = Arc::new(Counting::default());
   let outcome = Runner::new(3, 1_000).run(Arc::clone(&workload)).unwrap();

   match outcome {
      Outcome::Completed { summaries, .. } => assert_eq!(summaries, vec![1_000; 3]),
      Outcome::TimedOut { .. } => panic!("no watchdog was armed"),
   }
   assert_eq!(workload.before.load(Ordering::Relaxed), 3);
   assert_eq!(workload.work.load(Ordering::Relaxed), 3_000);
   assert_eq!(workload.after.load(Ordering::Relaxed), 3);
}

#[test]
fn test_generous_deadline_never_fires() {
   let workload = Arc::new(Counting::default());
   let outcome = Runner::new(2, 100)
      .with_deadline(Some(Duration::from_secs(60)))
      .run(workload)
      .unwrap();
   assert!(!outcome.is_timeout());
   assert!(outcome.elapsed().unwrap() < Duration::from_secs(60));
}

#[test]
fn test_zero_budget_completes_every_backend() {
   for kind in BackendKind::ALL {
      let cfg = small_config(kind);
      assert_eq!(cfg.watchdog_deadline(), None);
      let mut out = Vec::new();
      let outcome = run_benchmark(cfg, &mut out).unwrap();
      let Outcome::Completed { summaries, .. } = outcome else {
         panic!("{kind} timed out without a watchdog");
      };
      let steps: u64 = summaries.iter().map(|s| s.pops + s.misses).sum();
      assert_eq!(steps, 4 * 2_000, "{kind}");

      let line = String::from_utf8(out).unwrap();
      let fields: Vec<&str> = line.trim_end().split('\t').collect();
      assert_eq!(fields.len(), 7, "{line:?}");
      assert_eq!(&fields[..6], ["4", "2000", "64", "8", kind.name(), "0"]);
      assert!(fields[6].parse::<u128>().is_ok());
   }
}

#[test]
fn test_concurrent_run_conserves_slots() {
   let cfg = small_config(BackendKind::Legacy);
   let workload = Arc::new(FreeListWorkload::<LegacyZeroStack>::new(cfg.clone()));
   let outcome = Runner::from_config(&cfg).run(Arc::clone(&workload)).unwrap();
   assert!(!outcome.is_timeout());

   let p = workload.protocol();
   let mut in_list = 0;
   while let Some(id) = free_list_bench::FreeList::pop(p.free_list(), &()) {
      assert!(p.tracker().is_claimed(id));
      in_list += 1;
   }
   assert_eq!(p.tracker().claimed_count(), in_list);
}

#[test]
fn test_watchdog_preempts_long_run() {
   let mut cfg = Config::new(BackendKind::Legacy);
   cfg.slots = 8;
   cfg.free_batch = 3;
   cfg.threads = 2;
   cfg.iterations = 1_000_000;
   cfg.timeout_ns = 1;
   let cfg = cfg.validate().unwrap();
   assert_eq!(cfg.watchdog_deadline(), Some(Duration::from_millis(2)));

   let mut out = Vec::new();
   let outcome = run_benchmark(cfg, &mut out).unwrap();
   assert!(outcome.is_timeout());
   let text = String::from_utf8(out).unwrap();
   assert!(text.starts_with("2\t1000000\t8\t3\tlegacy\t0"), "{text:?}");
   assert!(text.ends_with("\ttimeout\n"), "{text:?}");
}

#[test]
fn test_extended_report_in_debug_mode() {
   let mut cfg = small_config(BackendKind::Injector);
   cfg.debug = true;
   let cfg = cfg.validate().unwrap();
   let mut out = Vec::new();
   run_benchmark(cfg, &mut out).unwrap();
   let text = String::from_utf8(out).unwrap();
   for needle in [
      "Configuration:",
      "Threads: 4",
      "Concurrent Queue: crossbeam::deque::Injector",
      "Thread Registration: Yes",
      "Debug: Yes",
      "Results:",
      "Time Elapsed: ",
      "Thread 0: pops ",
      "Total: pops ",
   ] {
      assert!(text.contains(needle), "missing {needle:?} in\n{text}");
   }
}

/// Worker 0 fails after a few iterations; the others would run for minutes.
#[derive(Default)]
struct FailingOnce {
   next_id: AtomicUsize,
}

impl Workload for FailingOnce {
   type Worker = (usize, u64);
   type Summary = ();

   fn before(&self) -> (usize, u64) {
      (self.next_id.fetch_add(1, Ordering::Relaxed), 0)
   }

   fn work(&self, worker: &mut (usize, u64)) -> Result<(), BenchError> {
      worker.1 += 1;
      if worker.0 == 0 && worker.1 == 10 {
         return Err(BenchError::Capacity { backend: "test", slot: 7 });
      }
      std::thread::sleep(Duration::from_millis(1));
      Ok(())
   }

   fn after(&self, _worker: (usize, u64)) {}
}

#[test]
fn test_worker_failure_aborts_run() {
   let start = std::time::Instant::now();
   let err = Runner::new(3, 1_000_000)
      .run(Arc::new(FailingOnce::default()))
      .map(|_| ())
      .unwrap_err();
   assert!(matches!(err, BenchError::Capacity { slot: 7, .. }), "{err}");
   assert_eq!(err.exit_code(), EXIT_CONFIG);
   assert!(start.elapsed() < Duration::from_secs(60));
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  binary                                                                  */
/*──────────────────────────────────────────────────────────────────────────*/

fn bench_bin() -> Command {
   Command::new(env!("CARGO_BIN_EXE_free_list_bench"))
}

#[test]
fn test_cli_unknown_queue_exits_2() {
   let out = bench_bin().args(["-q", "no::such::Queue", "-t", "1", "-i", "1"]).output().unwrap();
   assert_eq!(out.status.code(), Some(EXIT_UNKNOWN_BACKEND));
   let stderr = String::from_utf8_lossy(&out.stderr);
   assert!(stderr.contains("crossbeam::queue::SegQueue"), "{stderr}");
}

#[test]
fn test_cli_invalid_config_exits_1() {
   let zero_threads = bench_bin().args(["-q", "legacy", "-t", "0"]).output().unwrap();
   assert_eq!(zero_threads.status.code(), Some(EXIT_CONFIG));

   let big_batch = bench_bin().args(["-q", "legacy", "-s", "8", "-f", "9"]).output().unwrap();
   assert_eq!(big_batch.status.code(), Some(EXIT_CONFIG));

   let missing_queue = bench_bin().args(["-t", "1"]).output().unwrap();
   assert_eq!(missing_queue.status.code(), Some(EXIT_CONFIG));
}

#[test]
fn test_cli_help_exits_0() {
   let out = bench_bin().arg("--help").output().unwrap();
   assert_eq!(out.status.code(), Some(0));
   assert!(String::from_utf8_lossy(&out.stdout).contains("parking_lot::Mutex<VecDeque>"));
}

#[test]
fn test_cli_compact_run() {
   let out = bench_bin()
      .args(["-q", "crossbeam::queue::ArrayQueue", "-t", "2", "-i", "1000", "-s", "32", "-f", "4", "--timeout", "0"])
      .output()
      .unwrap();
   assert_eq!(out.status.code(), Some(0));
   let stdout = String::from_utf8(out.stdout).unwrap();
   assert!(stdout.starts_with("2\t1000\t32\t4\tcrossbeam::queue::ArrayQueue\t0\t"), "{stdout:?}");
}
