// src/error.rs
use crate::SlotId;
use thiserror::Error;

pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG: i32 = 1;
pub const EXIT_UNKNOWN_BACKEND: i32 = 2;
pub const EXIT_TIMEOUT: i32 = 512;

/// Invalid benchmark parameter, detected before any thread is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
   #[error("the argument '{0}' is invalid for option --threads (must be > 0)")]
   ZeroThreads(usize),
   #[error("the argument '{0}' is invalid for option --iterations (must be > 0)")]
   ZeroIterations(u64),
   #[error("the argument '{slots}' is invalid for option --slots (must be in [2, {max}])")]
   Slots { slots: usize, max: usize },
   #[error("the argument '{batch}' is invalid for option --free-batch (must be in [1, {max}])")]
   FreeBatch { batch: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum BenchError {
   #[error(transparent)]
   Config(#[from] ConfigError),

   #[error("the argument '{name}' is invalid for option --queue, valid values are: {valid}")]
   UnknownBackend { name: String, valid: String },

   /// A bounded free list refused a push although its capacity is `N - 1`.
   #[error("free list '{backend}' rejected slot {slot}: there isn't enough memory allocated")]
   Capacity { backend: &'static str, slot: SlotId },

   /// Spawning a thread or writing the report failed.
   #[error("I/O error: {0}")]
   Io(#[from] std::io::Error),
}

impl BenchError {
   pub fn exit_code(&self) -> i32 {
      match self {
         BenchError::UnknownBackend { .. } => EXIT_UNKNOWN_BACKEND,
         BenchError::Config(_) | BenchError::Capacity { .. } | BenchError::Io(_) => EXIT_CONFIG,
      }
   }
}
