//! Namespace-scoped debug channels with pattern-based filtering.
//!
//! # Overview
//!
//! `dbug` is a lightweight diagnostic layer for programs that want many
//! independently named debug channels and runtime control over which of
//! them speak. Each [`Channel`] carries a namespace like `"server:http"`;
//! the `DEBUG` environment variable (or [`enable`]) selects namespaces with
//! glob-like patterns, where `*` matches any run of characters and a
//! leading `-` denies instead of allows:
//!
//! ```text
//! DEBUG="server:*,-server:pool" cargo run
//! ```
//!
//! Enabled channels decorate every message with a colored namespace label
//! and the time elapsed since the channel last spoke; disabled channels
//! cost one atomic load per call and do nothing else.
//!
//! # Getting started
//!
//! ```
//! use dbug::dbug;
//!
//! dbug::enable("server:*");
//!
//! let http = dbug::channel("server:http");
//! dbug!(http, "listening on %s:%d", "0.0.0.0", 8080);
//!
//! let pool = http.extend("pool");
//! dbug!(pool, "%O", serde_json::json!({ "size": 4, "idle": 2 }));
//! ```
//! ```log
//!   server:http listening on 0.0.0.0:8080 +0ms
//!   server:http:pool { size: 4, idle: 2 } +0ms
//! ```
//!
//! The [`dbug!`] macro is sugar over [`Channel::log`]; both accept a
//! printf-style format string with `%s`, `%d`, `%j`, `%o`/`%O`, and `%%`
//! directives (see [`format()`]). Patterns can change at any time —
//! [`enable`] re-evaluates every live channel before it returns, and
//! [`disable`] clears the set and hands back a spec string that restores
//! it.
//!
//! # Registries
//!
//! The functions above operate on a process-wide default [`Registry`]
//! seeded from the environment. Programs (and tests) that want isolated
//! state construct their own over any [`Env`](env::Env) collaborator:
//!
//! ```
//! use dbug::{Registry, env::MemoryEnv};
//!
//! let registry = Registry::new(MemoryEnv::with("DEBUG", "worker:*"));
//! assert!(registry.is_enabled("worker:emails"));
//! assert!(!registry.is_enabled("server:http"));
//! ```
//!
//! Custom single-letter formatters and the default output sink hang off
//! the registry as well; per-channel sinks override it
//! ([`Channel::set_sink`]).
//!
//! # Feature flags
//!
//! * `full`: Enables all features listed below.
//! * `chrono`: Timestamps color-suppressed lines (RFC 3339, UTC),
//!   suppressible with `DEBUG_HIDE_DATE`.

pub mod env;
pub mod sink;
#[doc(hidden)]
#[macro_use]
mod cfg;
mod channel;
mod color;
mod format;
mod matcher;
mod registry;
#[macro_use]
mod macros;

pub use crate::channel::Channel;
pub use crate::format::{format, Arg};
pub use crate::registry::{FormatterFn, Registry};
pub use crate::sink::Sink;

use std::sync::OnceLock;

/// The process-wide default registry, lazily seeded from the process
/// environment on first use.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::default)
}

/// Creates a channel on the default registry.
pub fn channel(namespace: &str) -> Channel {
    registry().channel(namespace)
}

/// Enables namespaces on the default registry. See [`Registry::enable`].
pub fn enable(spec: &str) {
    registry().enable(spec);
}

/// Clears the default registry's matcher set, returning the spec that
/// restores it. See [`Registry::disable`].
pub fn disable() -> String {
    registry().disable()
}

/// Queries the default registry. See [`Registry::is_enabled`].
pub fn is_enabled(namespace: &str) -> bool {
    registry().is_enabled(namespace)
}

// Lock that shrugs off poisoning: a panic mid-write leaves at worst a
// half-updated pattern set, never a torn value.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
