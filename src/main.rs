use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use free_list_bench::config::{default_free_batch, default_threads, DEFAULT_ITERATIONS, DEFAULT_SLOTS, DEFAULT_TIMEOUT_NS};
use free_list_bench::error::{EXIT_CONFIG, EXIT_OK, EXIT_TIMEOUT};
use free_list_bench::workload::run_benchmark;
use free_list_bench::{BackendKind, Config, Outcome};
use std::io;
use std::process;
use tracing::{error, Level};

/// Benchmark Free List Queue Alternatives
#[derive(Debug, Parser)]
#[command(name = "free_list_bench")]
struct Cli {
   /// Number of threads to use.
   #[arg(short, long, default_value_t = default_threads())]
   threads: usize,

   /// Number of iterations per thread.
   #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
   iterations: u64,

   /// Number of blocks managed by the free list (block 0 is never used).
   #[arg(short, long, default_value_t = DEFAULT_SLOTS)]
   slots: usize,

   /// Number of blocks freed at once [default: 10% of --slots].
   #[arg(short, long)]
   free_batch: Option<usize>,

   /// Used concurrent queue/stack (see the list below).
   #[arg(short, long)]
   queue: String,

   /// Work time in ns between operations.
   #[arg(short, long, default_value_t = 0)]
   work: u64,

   /// Timeout in ns per thread and iteration until the running threads get
   /// terminated (0 is no timeout).
   #[arg(long, default_value_t = DEFAULT_TIMEOUT_NS)]
   timeout: u64,

   /// Print additional debug information (implies --extended).
   #[arg(short, long)]
   debug: bool,

   /// Print extended output.
   #[arg(short, long)]
   extended: bool,
}

fn command() -> clap::Command {
   let queues = BackendKind::ALL
      .iter()
      .map(|k| format!("  - {k}"))
      .collect::<Vec<_>>()
      .join("\n");
   Cli::command().after_help(format!("Possible values for --queue:\n{queues}"))
}

fn usage_error(msg: impl std::fmt::Display, code: i32) -> ! {
   eprintln!("ERROR: {msg}\n");
   eprintln!("{}", command().render_help());
   process::exit(code);
}

fn parse() -> Cli {
   let matches: ArgMatches = match command().try_get_matches() {
      Ok(m) => m,
      Err(e) => {
         // clap renders its own message plus usage
         let _ = e.print();
         let code = match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
            _ => EXIT_CONFIG,
         };
         process::exit(code);
      }
   };
   Cli::from_arg_matches(&matches).unwrap_or_else(|e| usage_error(e, EXIT_CONFIG))
}

fn init_tracing(config: &Config) {
   let level = if config.debug {
      Level::TRACE
   } else if config.extended {
      Level::INFO
   } else {
      Level::WARN
   };
   tracing_subscriber::fmt()
      .with_max_level(level)
      .with_target(false)
      .with_writer(io::stderr)
      .init();
}

fn main() {
   let cli = parse();

   let backend = match cli.queue.parse::<BackendKind>() {
      Ok(kind) => kind,
      Err(e) => usage_error(&e, e.exit_code()),
   };

   let config = Config {
      backend,
      threads: cli.threads,
      iterations: cli.iterations,
      slots: cli.slots,
      free_batch: cli.free_batch.unwrap_or_else(|| default_free_batch(cli.slots)),
      work_ns: cli.work,
      timeout_ns: cli.timeout,
      extended: cli.extended,
      debug: cli.debug,
   };
   let config = match config.validate() {
      Ok(config) => config,
      Err(e) => usage_error(e, EXIT_CONFIG),
   };
   init_tracing(&config);

   let stdout = io::stdout();
   let mut out = stdout.lock();
   match run_benchmark(config, &mut out) {
      Ok(Outcome::Completed { .. }) => process::exit(EXIT_OK),
      // workers are still running; the process is torn down under them
      Ok(Outcome::TimedOut { .. }) => process::exit(EXIT_TIMEOUT),
      Err(e) => {
         error!("{e}");
         eprintln!("ERROR: {e}");
         process::exit(e.exit_code());
      }
   }
}
