//! Environment collaborator for seeding and persisting enable specs.
//!
//! A [`Registry`] reads its initial enable spec from the [`DEBUG`] key at
//! construction and writes the key back on every [`Registry::enable`] call,
//! so a process restart recovers the same configuration. The collaborator is
//! a trait so tests can run against an isolated [`MemoryEnv`] instead of the
//! real process environment.
//!
//! [`Registry`]: crate::Registry
//! [`Registry::enable`]: crate::Registry::enable

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Key holding the enable spec, e.g. `DEBUG=server:*,-server:pool`.
pub const DEBUG: &str = "DEBUG";

/// Switch key suppressing ANSI color decoration.
pub const DEBUG_COLORS: &str = "DEBUG_COLORS";

/// Switch key suppressing the timestamp prefix on color-suppressed lines.
pub const DEBUG_HIDE_DATE: &str = "DEBUG_HIDE_DATE";

/// Key-value access to an environment.
pub trait Env: Send + Sync {
    /// Returns the value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets `key` to `value`.
    fn set(&self, key: &str, value: &str);

    /// Deletes `key`.
    fn remove(&self, key: &str);
}

impl<E: Env + ?Sized> Env for Arc<E> {
    fn get(&self, key: &str) -> Option<String> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) {
        self.as_ref().set(key, value);
    }

    fn remove(&self, key: &str) {
        self.as_ref().remove(key);
    }
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove(&self, key: &str) {
        std::env::remove_var(key);
    }
}

/// An in-memory environment for isolated registries in tests.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Mutex<HashMap<String, String>>,
}

impl MemoryEnv {
    /// Creates an empty environment.
    pub fn new() -> Self {
        MemoryEnv::default()
    }

    /// Creates an environment with a single key already set.
    pub fn with(key: &str, value: &str) -> Self {
        let env = MemoryEnv::default();
        env.set(key, value);
        env
    }
}

impl Env for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        crate::lock(&self.vars).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        crate::lock(&self.vars).insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        crate::lock(&self.vars).remove(key);
    }
}

/// Truthiness rules for `DEBUG_COLORS`-style switches. Unrecognized values
/// fall through to the caller's default.
pub(crate) fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "on" | "true" | "enabled" => Some(true),
        "no" | "off" | "false" | "disabled" => Some(false),
        _ => None,
    }
}
