// src/report.rs
//
// Compact (one tab separated line) and extended (banner delimited block)
// renderings of a run's configuration and result.

use std::fmt::Write as _;
use std::time::Duration;

/// Banner width when stdout is not a terminal.
pub const FALLBACK_WIDTH: usize = 114;

nix::ioctl_read_bad!(window_size, nix::libc::TIOCGWINSZ, libc::winsize);

/// Columns of the terminal attached to stdout.
pub fn terminal_width() -> usize {
   let mut ws = libc::winsize {
      ws_row: 0,
      ws_col: 0,
      ws_xpixel: 0,
      ws_ypixel: 0,
   };
   // SAFETY: TIOCGWINSZ writes exactly one `winsize` into the pointee.
   match unsafe { window_size(libc::STDOUT_FILENO, &mut ws) } {
      Ok(_) if ws.ws_col > 0 => ws.ws_col as usize,
      _ => FALLBACK_WIDTH,
   }
}

/// `HH:MM:SS.mmm.uuu.nnn`
pub fn format_duration(d: Duration) -> String {
   const UNITS: [(u128, usize, &str); 6] = [
      (3_600_000_000_000, 2, ""),
      (60_000_000_000, 2, ":"),
      (1_000_000_000, 2, ":"),
      (1_000_000, 3, "."),
      (1_000, 3, "."),
      (1, 3, "."),
   ];
   let mut rest = d.as_nanos();
   let mut out = String::with_capacity(20);
   for (unit, width, sep) in UNITS {
      let _ = write!(out, "{sep}{:0width$}", rest / unit);
      rest %= unit;
   }
   out
}

/// One workload specific line of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
   pub label: String,
   /// `None` keeps the field out of the compact line.
   pub compact: Option<String>,
   pub extended: String,
}

impl Field {
   pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
      let value = value.to_string();
      Self {
         label: label.into(),
         compact: Some(value.clone()),
         extended: value,
      }
   }

   /// Raw nanoseconds in compact mode, `HH:MM:SS...` in extended mode.
   pub fn nanos(label: impl Into<String>, ns: u64) -> Self {
      Self {
         label: label.into(),
         compact: Some(ns.to_string()),
         extended: format_duration(Duration::from_nanos(ns)),
      }
   }

   pub fn extended_only(label: impl Into<String>, value: impl ToString) -> Self {
      Self {
         label: label.into(),
         compact: None,
         extended: value.to_string(),
      }
   }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
   Compact,
   Extended,
}

#[derive(Debug, Clone)]
pub struct Report {
   mode: OutputMode,
   debug: bool,
   width: usize,
}

impl Report {
   pub fn new(mode: OutputMode, debug: bool, width: usize) -> Self {
      Self { mode, debug, width }
   }

   /// Extended output sizes its banners to the current terminal.
   pub fn for_terminal(extended: bool, debug: bool) -> Self {
      if extended {
         Self::new(OutputMode::Extended, debug, terminal_width())
      } else {
         Self::new(OutputMode::Compact, debug, FALLBACK_WIDTH)
      }
   }

   pub fn mode(&self) -> OutputMode {
      self.mode
   }

   fn banner(&self, out: &mut String) {
      out.extend(std::iter::repeat('#').take(self.width));
      out.push('\n');
   }

   fn extended_fields(out: &mut String, fields: &[Field]) {
      for f in fields {
         let _ = writeln!(out, "{}: {}", f.label, f.extended);
      }
   }

   fn compact_fields(out: &mut String, fields: &[Field]) {
      for v in fields.iter().filter_map(|f| f.compact.as_deref()) {
         out.push('\t');
         out.push_str(v);
      }
   }

   /// Compact mode leaves the line open for the result.
   pub fn configuration(&self, threads: usize, iterations: u64, timeout_ns: u64, fields: &[Field]) -> String {
      let mut out = String::new();
      match self.mode {
         OutputMode::Extended => {
            self.banner(&mut out);
            out.push_str("Configuration:\n");
            let _ = writeln!(out, "Threads: {threads}");
            let _ = writeln!(out, "Iterations: {iterations}");
            Self::extended_fields(&mut out, fields);
            let _ = writeln!(out, "Timeout: {}", format_duration(Duration::from_nanos(timeout_ns)));
            let _ = writeln!(out, "Debug: {}", if self.debug { "Yes" } else { "No" });
            self.banner(&mut out);
         }
         OutputMode::Compact => {
            let _ = write!(out, "{threads}\t{iterations}");
            Self::compact_fields(&mut out, fields);
         }
      }
      out
   }

   pub fn result(&self, elapsed: Duration, fields: &[Field]) -> String {
      let mut out = String::new();
      match self.mode {
         OutputMode::Extended => {
            self.banner(&mut out);
            out.push_str("Results:\n");
            let _ = writeln!(out, "Time Elapsed: {}", format_duration(elapsed));
            Self::extended_fields(&mut out, fields);
            self.banner(&mut out);
         }
         OutputMode::Compact => {
            let _ = write!(out, "\t{}", elapsed.as_nanos());
            Self::compact_fields(&mut out, fields);
            out.push('\n');
         }
      }
      out
   }

   pub fn timeout(&self, deadline: Duration) -> String {
      let mut out = String::new();
      match self.mode {
         OutputMode::Extended => {
            self.banner(&mut out);
            out.push_str("Results:\n");
            let _ = writeln!(out, "Time Elapsed: Timeout after {}", format_duration(deadline));
            self.banner(&mut out);
         }
         OutputMode::Compact => out.push_str("\ttimeout\n"),
      }
      out
   }
}
