//! The channel registry: compiled matchers, live instances, and shared
//! collaborators.

use crate::channel::{Channel, ChannelState};
use crate::env::{self, Env, ProcessEnv};
use crate::format::Arg;
use crate::matcher::PatternSet;
use crate::sink::Sink;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Signature of a custom `%<letter>` formatter.
///
/// The first parameter is the channel being invoked; the second is the
/// positional argument the directive consumed, or `None` when the caller
/// supplied too few.
pub type FormatterFn = dyn Fn(&Channel, Option<&Arg>) -> String + Send + Sync;

struct Shared {
    environment: Box<dyn Env>,
    state: Mutex<State>,
    formatters: Mutex<HashMap<char, Arc<FormatterFn>>>,
    default_sink: Mutex<Option<Arc<dyn Sink>>>,
    colors: AtomicBool,
    #[cfg(feature = "chrono")]
    hide_date: bool,
}

// Pattern compilation and the live-channel walk mutate as one unit under
// the state lock, so a caller never observes a channel reflecting stale
// enabled state against new matchers.
struct State {
    patterns: PatternSet,
    channels: Vec<Weak<ChannelState>>,
}

/// A handle to a channel registry.
///
/// The registry owns the compiled allow/deny matcher set, a weak
/// bookkeeping list of every live [`Channel`] (insertion-ordered, used only
/// for mass re-evaluation), the custom formatter table, and the default
/// sink. Clones share the same state. Registry state lives for the life of
/// the process; there is no teardown.
///
/// Most programs use the process-wide default registry through the
/// crate-level functions; tests construct isolated registries over a
/// [`MemoryEnv`](crate::env::MemoryEnv).
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Registry {
    /// Builds a registry over the given environment collaborator, seeding
    /// the matcher set from the `DEBUG` key and the color/date switches
    /// from `DEBUG_COLORS` and `DEBUG_HIDE_DATE`.
    pub fn new(environment: impl Env + 'static) -> Self {
        let environment: Box<dyn Env> = Box::new(environment);
        let spec = environment.get(env::DEBUG).unwrap_or_default();
        let colors = environment
            .get(env::DEBUG_COLORS)
            .as_deref()
            .and_then(env::parse_switch)
            .unwrap_or(true);
        #[cfg(feature = "chrono")]
        let hide_date = environment
            .get(env::DEBUG_HIDE_DATE)
            .as_deref()
            .and_then(env::parse_switch)
            .unwrap_or(false);

        Registry {
            shared: Arc::new(Shared {
                environment,
                state: Mutex::new(State {
                    patterns: PatternSet::compile(&spec),
                    channels: Vec::new(),
                }),
                formatters: Mutex::new(HashMap::new()),
                default_sink: Mutex::new(None),
                colors: AtomicBool::new(colors),
                #[cfg(feature = "chrono")]
                hide_date,
            }),
        }
    }

    /// A registry over the real process environment.
    pub fn from_process_env() -> Self {
        Registry::new(ProcessEnv)
    }

    /// Creates a channel, computing its initial enabled state from the
    /// active matcher set and recording it for mass re-evaluation.
    pub fn channel(&self, namespace: &str) -> Channel {
        self.channel_with_sink(namespace, None)
    }

    pub(crate) fn channel_with_sink(
        &self,
        namespace: &str,
        sink: Option<Arc<dyn Sink>>,
    ) -> Channel {
        let mut state = crate::lock(&self.shared.state);
        let enabled = state.patterns.enabled(namespace);
        let channel = Arc::new(ChannelState::new(namespace, enabled, sink));
        state.channels.push(Arc::downgrade(&channel));
        drop(state);
        Channel::new(channel, self.clone())
    }

    /// Replaces the active matcher set with `spec` and synchronously
    /// recomputes the enabled flag of every live channel, in registration
    /// order, before returning.
    ///
    /// The spec is persisted to the environment collaborator under `DEBUG`;
    /// an empty spec deletes the key instead.
    pub fn enable(&self, spec: &str) {
        if spec.is_empty() {
            self.shared.environment.remove(env::DEBUG);
        } else {
            self.shared.environment.set(env::DEBUG, spec);
        }

        let mut state = crate::lock(&self.shared.state);
        let state = &mut *state;
        state.patterns = PatternSet::compile(spec);

        let patterns = &state.patterns;
        state.channels.retain(|weak| match weak.upgrade() {
            Some(channel) => {
                channel.store_enabled(patterns.enabled(channel.namespace()));
                true
            }
            // Dropped without destroy(); purge the stale entry.
            None => false,
        });
    }

    /// Serializes the active matcher set back into an enable spec, clears
    /// the set (disabling every channel), and returns the serialization.
    /// Feeding the result back to [`enable`](Registry::enable) reproduces
    /// an equivalent set.
    pub fn disable(&self) -> String {
        let spec = crate::lock(&self.shared.state).patterns.to_spec();
        self.enable("");
        spec
    }

    /// Whether `namespace` would be enabled under the active matcher set.
    ///
    /// Matching is case-sensitive and anchored over the literal namespace;
    /// deny matchers win. A namespace that itself ends in `*` always
    /// reports enabled, so `is_enabled("server:*")` answers "is that tree
    /// active" trivially — note that deny rules are *not* consulted for
    /// such namespaces.
    pub fn is_enabled(&self, namespace: &str) -> bool {
        crate::lock(&self.shared.state).patterns.enabled(namespace)
    }

    pub(crate) fn unregister(&self, target: &Arc<ChannelState>) -> bool {
        let mut state = crate::lock(&self.shared.state);
        let position = state.channels.iter().position(|weak| {
            weak.upgrade()
                .is_some_and(|channel| Arc::ptr_eq(&channel, target))
        });
        match position {
            Some(index) => {
                state.channels.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registers a custom formatter for `%<letter>` directives, replacing
    /// any previous one for the same letter. Custom formatters run before
    /// the general directives and consume one positional argument each.
    ///
    /// ```
    /// # use dbug::{Registry, env::MemoryEnv};
    /// let registry = Registry::new(MemoryEnv::with("DEBUG", "*"));
    /// registry.set_formatter('h', |_chan, arg| {
    ///     arg.map_or_else(|| "??".into(), |arg| format!("{:x?}", arg))
    /// });
    /// ```
    pub fn set_formatter(
        &self,
        letter: char,
        formatter: impl Fn(&Channel, Option<&Arg>) -> String + Send + Sync + 'static,
    ) {
        crate::lock(&self.shared.formatters).insert(letter, Arc::new(formatter));
    }

    /// Removes a custom formatter. Returns whether one was registered.
    pub fn remove_formatter(&self, letter: char) -> bool {
        crate::lock(&self.shared.formatters).remove(&letter).is_some()
    }

    /// Rewrites `%<letter>` tokens through the registered custom
    /// formatters, consuming one argument per substitution. Unregistered
    /// letters advance the argument cursor and stay literal for the general
    /// formatter; `%%` is left for the general pass and consumes nothing.
    pub(crate) fn apply_formatters(
        &self,
        channel: &Channel,
        fmt: String,
        mut args: SmallVec<[Arg; 8]>,
    ) -> (String, SmallVec<[Arg; 8]>) {
        let snapshot = {
            let formatters = crate::lock(&self.shared.formatters);
            if formatters.is_empty() {
                return (fmt, args);
            }
            // Snapshot so user formatters run outside the lock and may
            // re-enter the registry.
            formatters.clone()
        };

        let mut out = String::with_capacity(fmt.len());
        let mut index = 0;
        let mut chars = fmt.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }

            match chars.peek().copied() {
                Some('%') => {
                    chars.next();
                    out.push_str("%%");
                }
                Some(letter) if letter.is_ascii_alphabetic() => {
                    chars.next();
                    if let Some(formatter) = snapshot.get(&letter) {
                        let value = if index < args.len() {
                            Some(args.remove(index))
                        } else {
                            None
                        };
                        out.push_str(&formatter(channel, value.as_ref()));
                    } else {
                        index += 1;
                        out.push('%');
                        out.push(letter);
                    }
                }
                _ => out.push('%'),
            }
        }

        (out, args)
    }

    /// Overrides the default sink used by every channel without its own.
    pub fn set_sink(&self, sink: impl Sink + 'static) {
        *crate::lock(&self.shared.default_sink) = Some(Arc::new(sink));
    }

    /// Restores the stderr default sink.
    pub fn clear_sink(&self) {
        *crate::lock(&self.shared.default_sink) = None;
    }

    pub(crate) fn default_sink(&self) -> Option<Arc<dyn Sink>> {
        crate::lock(&self.shared.default_sink).clone()
    }

    /// Suppresses (`false`) or restores (`true`) ANSI color decoration.
    /// Seeded from `DEBUG_COLORS`; colors default to on.
    pub fn set_colors(&self, colors: bool) {
        self.shared.colors.store(colors, Ordering::Relaxed);
    }

    pub(crate) fn colors(&self) -> bool {
        self.shared.colors.load(Ordering::Relaxed)
    }

    #[cfg(feature = "chrono")]
    pub(crate) fn show_date(&self) -> bool {
        !self.shared.hide_date
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::from_process_env()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = crate::lock(&self.shared.state);
        f.debug_struct("Registry")
            .field("patterns", &state.patterns)
            .field("channels", &state.channels.len())
            .finish_non_exhaustive()
    }
}
