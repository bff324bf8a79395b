//! ## Features
//!
//! - Status lines on stderr with coloured level prefixes (info, warn, error, success)
//! - Multi-line message support with consistent formatting
//! - Banner displays for section headers
//! - One-call `tracing` subscriber setup shared by every binary in the workspace
//!
//! ## Usage
//!
//! Status lines: `info()`, `warn()`, `error()`, `success()`
//!
//! Banners: `announce()`, `flourish()`
//!
//! Tracing: `init_tracing("fittrack", verbose)`

use colored::*;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a colored prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7usize.saturating_sub(prefix.len() + 2))
}

fn log_prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Display a message with a banner around it
pub fn as_banner<F>(log_fn: F, message: &str, width: Option<usize>, border_char: Option<char>)
where
  F: Fn(&str),
{
  let width = width.unwrap_or(50);
  let border_char = border_char.unwrap_or('=');

  let banner = banner_line(width, border_char);

  log_fn(&banner);
  log_fn(message);
  log_fn(&banner);
}

/// Info level logging - general information
pub fn info(message: &str) {
  log_prefixed(Color::Blue, "info", message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  log_prefixed(Color::Yellow, "warn", message);
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  log_prefixed(Color::Red, "error", message);
}

/// Success level logging - something completed successfully
pub fn success(message: &str) {
  log_prefixed(Color::Green, "sccs", message);
}

/// Announcement banner for the start of a run
pub fn announce(message: &str) {
  as_banner(|msg| log(&msg.blue().bold().to_string()), message, Some(50), Some('-'));
}

/// Flourish - celebrate successful completion
pub fn flourish(message: &str) {
  as_banner(|msg| log(&msg.green().bold().to_string()), message, Some(45), Some('~'));
}

/// Default filter directive for a binary crate.
///
/// `RUST_LOG` takes precedence over this when set.
pub fn default_directive(crate_name: &str, verbose: bool) -> String {
  if verbose {
    format!("{crate_name}=debug,warn")
  } else {
    format!("{crate_name}=info,warn")
  }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// Calling it a second time is a no-op, so tests can call it freely.
pub fn init_tracing(crate_name: &str, verbose: bool) {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_directive(crate_name, verbose)));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .try_init();
}
