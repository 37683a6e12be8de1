//! Per-namespace debug channels.

use crate::cfg_chrono;
use crate::color::{self, ColorCode};
use crate::format::{self, Arg};
use crate::registry::Registry;
use crate::sink::{Sink, Stderr};
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// The state behind a [`Channel`] handle. The registry bookkeeps these with
/// `Weak` references; the handles own them.
pub(crate) struct ChannelState {
    namespace: String,
    color: u8,
    enabled: AtomicBool,
    prev: Mutex<Option<Instant>>,
    sink: Mutex<Option<Arc<dyn Sink>>>,
}

impl ChannelState {
    pub(crate) fn new(namespace: &str, enabled: bool, sink: Option<Arc<dyn Sink>>) -> Self {
        ChannelState {
            namespace: namespace.to_owned(),
            color: color::select_color(namespace),
            enabled: AtomicBool::new(enabled),
            prev: Mutex::new(None),
            sink: Mutex::new(sink),
        }
    }

    pub(crate) fn namespace(&self) -> &str {
        &self.namespace
    }

    pub(crate) fn store_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

/// A named debug channel.
///
/// Channels are created through a [`Registry`], which computes their initial
/// enabled state from the active matcher set and re-evaluates them on every
/// [`Registry::enable`] call. Invoking a disabled channel is a complete
/// no-op; invoking an enabled one formats the message, decorates it with the
/// namespace label and a `+Nms` elapsed-time suffix, and emits it to the
/// channel's sink.
///
/// Cloning a `Channel` yields another handle to the same instance.
///
/// ```
/// use dbug::{dbug, Registry};
/// use dbug::env::MemoryEnv;
///
/// let registry = Registry::new(MemoryEnv::with("DEBUG", "server:*"));
/// let http = registry.channel("server:http");
/// dbug!(http, "listening on %s:%d", "0.0.0.0", 8080);
/// ```
/// ```log
///   server:http listening on 0.0.0.0:8080 +0ms
/// ```
#[derive(Clone)]
pub struct Channel {
    state: Arc<ChannelState>,
    registry: Registry,
}

impl Channel {
    pub(crate) fn new(state: Arc<ChannelState>, registry: Registry) -> Self {
        Channel { state, registry }
    }

    /// The immutable namespace identity, e.g. `"server:http"`.
    pub fn namespace(&self) -> &str {
        &self.state.namespace
    }

    /// The 256-color code derived from the namespace at creation.
    pub fn color(&self) -> u8 {
        self.state.color
    }

    /// Whether this channel currently emits output.
    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Relaxed)
    }

    /// Manually overrides the enabled flag. The override holds until the
    /// next [`Registry::enable`] call recomputes it from the matcher set.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.store_enabled(enabled);
    }

    /// Routes this channel's output to `sink` instead of the registry
    /// default.
    pub fn set_sink(&self, sink: impl Sink + 'static) {
        *crate::lock(&self.state.sink) = Some(Arc::new(sink));
    }

    /// Restores the registry default sink.
    pub fn clear_sink(&self) {
        *crate::lock(&self.state.sink) = None;
    }

    fn sink_snapshot(&self) -> Option<Arc<dyn Sink>> {
        crate::lock(&self.state.sink).clone()
    }

    /// Emits one line.
    ///
    /// The leading argument is the format string when it is [`Arg::Str`],
    /// the rendered error description when it is [`Arg::Error`], and
    /// otherwise becomes the sole argument of a synthesized `%O` directive.
    /// Custom formatters registered on the registry run first; the rest is
    /// handled by [`format`](crate::format()).
    ///
    /// A disabled channel ignores the call entirely: the elapsed-time clock
    /// does not move and no sink is touched. The [`dbug!`] macro is sugar
    /// over this method.
    ///
    /// [`dbug!`]: crate::dbug
    pub fn log(&self, first: impl Into<Arg>, args: &[Arg]) {
        if !self.is_enabled() {
            return;
        }
        self.emit(first.into(), args);
    }

    fn emit(&self, first: Arg, args: &[Arg]) {
        let now = Instant::now();
        let elapsed = crate::lock(&self.state.prev)
            .map_or(Duration::ZERO, |prev| now.duration_since(prev));

        // Classify the leading argument before formatting.
        let mut rest: SmallVec<[Arg; 8]> = SmallVec::new();
        let fmt = match first {
            Arg::Str(text) => text,
            Arg::Error(text) => text,
            other => {
                rest.push(other);
                "%O".to_owned()
            }
        };
        rest.extend(args.iter().cloned());

        let (fmt, rest) = self.registry.apply_formatters(self, fmt, rest);
        let message = format::format(&fmt, &rest);
        let line = self.decorate(&message, elapsed);

        match self.sink_snapshot().or_else(|| self.registry.default_sink()) {
            Some(sink) => sink.write_line(&line),
            None => Stderr.write_line(&line),
        }

        *crate::lock(&self.state.prev) = Some(now);
    }

    /// Prefixes every line of `message` with the namespace label and
    /// appends the elapsed-time suffix.
    fn decorate(&self, message: &str, elapsed: Duration) -> String {
        let elapsed = fmt_elapsed(elapsed);

        if self.registry.colors() {
            let code = ColorCode(self.state.color);
            let prefix = format!("  {};1m{} \u{1b}[0m", code, self.state.namespace);
            let body = message.replace('\n', &format!("\n{}", prefix));
            return format!("{}{} {}m+{}\u{1b}[0m", prefix, body, code, elapsed);
        }

        let label = format!("[{}] ", self.state.namespace);
        let body = message.replace('\n', &format!("\n{}", label));
        let mut line = String::new();
        #[cfg(feature = "chrono")]
        if self.registry.show_date() {
            line.push_str(&timestamp());
            line.push(' ');
        }
        line.push_str(&label);
        line.push_str(&body);
        line.push_str(" +");
        line.push_str(&elapsed);
        line
    }

    /// Unregisters this channel from its registry and forces it disabled,
    /// so any further invocation stays a true no-op. Returns `false` if the
    /// channel was already removed.
    pub fn destroy(&self) -> bool {
        self.state.store_enabled(false);
        self.registry.unregister(&self.state)
    }

    /// Creates a child channel under `namespace:label`.
    ///
    /// ```
    /// # let registry = dbug::Registry::new(dbug::env::MemoryEnv::new());
    /// let server = registry.channel("server");
    /// assert_eq!(server.extend("http").namespace(), "server:http");
    /// ```
    pub fn extend(&self, label: &str) -> Channel {
        self.extend_with(label, ":")
    }

    /// Creates a child channel joining the namespaces with a custom
    /// delimiter. The child snapshots this channel's sink as it is right
    /// now; it is otherwise an independent sibling with its own color,
    /// enabled state, and registry entry.
    pub fn extend_with(&self, label: &str, delimiter: &str) -> Channel {
        let namespace = format!("{}{}{}", self.state.namespace, delimiter, label);
        self.registry
            .channel_with_sink(&namespace, self.sink_snapshot())
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Channel")
            .field("namespace", &self.state.namespace)
            .field("enabled", &self.is_enabled())
            .field("color", &self.state.color)
            .finish_non_exhaustive()
    }
}

cfg_chrono! {
    fn timestamp() -> String {
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

/// Humanized elapsed time: `+0ms`, `+12ms`, `+3s`, `+2m`, rounding at each
/// unit boundary.
fn fmt_elapsed(elapsed: Duration) -> String {
    const SECOND: u128 = 1000;
    const MINUTE: u128 = 60 * SECOND;
    const HOUR: u128 = 60 * MINUTE;
    const DAY: u128 = 24 * HOUR;

    let ms = elapsed.as_millis();
    if ms >= DAY {
        format!("{}d", div_round(ms, DAY))
    } else if ms >= HOUR {
        format!("{}h", div_round(ms, HOUR))
    } else if ms >= MINUTE {
        format!("{}m", div_round(ms, MINUTE))
    } else if ms >= SECOND {
        format!("{}s", div_round(ms, SECOND))
    } else {
        format!("{}ms", ms)
    }
}

fn div_round(n: u128, unit: u128) -> u128 {
    (n + unit / 2) / unit
}
