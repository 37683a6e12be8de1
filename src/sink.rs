//! Output sinks for fully decorated lines.
//!
//! A [`Sink`] receives each decorated line exactly once per enabled
//! invocation. Writes are fire-and-forget: failures are neither retried nor
//! reported. The trait is blanket-implemented for `Fn(&str)` closures, so a
//! capturing closure works anywhere a sink is expected:
//!
//! ```
//! let registry = dbug::Registry::new(dbug::env::MemoryEnv::with("DEBUG", "app"));
//! let chan = registry.channel("app");
//! chan.set_sink(|line: &str| println!("{}", line));
//! ```

use std::io::{self, Write};
use std::sync::Arc;

/// A destination for decorated output lines.
pub trait Sink: Send + Sync {
    /// Writes one line. The line carries no trailing newline; sinks that
    /// target a stream append their own.
    fn write_line(&self, line: &str);
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write_line(&self, line: &str) {
        self.as_ref().write_line(line);
    }
}

impl<F> Sink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn write_line(&self, line: &str) {
        self(line);
    }
}

/// Writes lines to standard error with a trailing newline. The fallback
/// when neither the channel nor its registry has a sink configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stderr;

impl Sink for Stderr {
    fn write_line(&self, line: &str) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
    }
}

/// Writes lines to standard output with a trailing newline.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl Sink for Stdout {
    fn write_line(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
    }
}
