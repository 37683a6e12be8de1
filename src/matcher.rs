//! Compiling enable specs into allow and deny matchers.
//!
//! An enable spec is a comma- or whitespace-separated list of namespace
//! patterns where `*` matches any run of characters and a leading `-` marks
//! the pattern as a deny rule: `"server:*,-server:pool"`. The whole set is
//! rebuilt from scratch on every [`Registry::enable`] call; nothing is
//! merged incrementally.
//!
//! [`Registry::enable`]: crate::Registry::enable

use globset::{GlobBuilder, GlobMatcher};

/// A single compiled pattern, kept alongside its source token so the active
/// set can be serialized back into an enable spec.
#[derive(Clone, Debug)]
pub(crate) struct Matcher {
    token: String,
    glob: GlobMatcher,
}

impl Matcher {
    /// Compiles one token. Only `*` is special; every other character
    /// matches literally, anchored over the whole namespace.
    ///
    /// A token that fails to compile yields `None` and is dropped, so
    /// malformed input degrades to "matches nothing" rather than erroring.
    fn compile(token: &str) -> Option<Self> {
        let glob = GlobBuilder::new(&escape_keep_star(token))
            .literal_separator(false)
            .backslash_escape(false)
            .build()
            .ok()?
            .compile_matcher();

        Some(Matcher {
            token: token.to_owned(),
            glob,
        })
    }

    fn matches(&self, namespace: &str) -> bool {
        self.glob.is_match(namespace)
    }
}

/// Neutralizes every glob metacharacter except `*` with a character class,
/// the same device `globset::escape` uses.
fn escape_keep_star(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        match c {
            '?' => escaped.push_str("[?]"),
            '[' => escaped.push_str("[[]"),
            ']' => escaped.push_str("[]]"),
            '{' => escaped.push_str("[{]"),
            '}' => escaped.push_str("[}]"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// The compiled allow (`names`) and deny (`skips`) lists of a registry.
#[derive(Clone, Debug, Default)]
pub(crate) struct PatternSet {
    names: Vec<Matcher>,
    skips: Vec<Matcher>,
}

impl PatternSet {
    /// Builds a full matcher set from a raw enable spec. Blank tokens are
    /// discarded; compiling the same spec twice yields an equivalent set.
    pub(crate) fn compile(spec: &str) -> Self {
        let mut set = PatternSet::default();

        for token in spec.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }

            if let Some(skip) = token.strip_prefix('-') {
                if let Some(matcher) = Matcher::compile(skip) {
                    set.skips.push(matcher);
                }
            } else if let Some(matcher) = Matcher::compile(token) {
                set.names.push(matcher);
            }
        }

        set
    }

    /// Whether `namespace` is enabled under this set.
    ///
    /// Deny rules win and short-circuit; a namespace matching no rule is
    /// disabled. A namespace that itself ends in `*` always reports enabled
    /// without consulting the deny list — a historical shortcut for querying
    /// whole trees, kept as-is (see [`Registry::is_enabled`]).
    ///
    /// [`Registry::is_enabled`]: crate::Registry::is_enabled
    pub(crate) fn enabled(&self, namespace: &str) -> bool {
        if namespace.ends_with('*') {
            return true;
        }

        if self.skips.iter().any(|skip| skip.matches(namespace)) {
            return false;
        }

        self.names.iter().any(|name| name.matches(namespace))
    }

    /// Serializes the set back into an enable spec. The result round-trips
    /// through [`PatternSet::compile`] to an equivalent set.
    pub(crate) fn to_spec(&self) -> String {
        let names = self.names.iter().map(|name| name.token.clone());
        let skips = self.skips.iter().map(|skip| format!("-{}", skip.token));
        names.chain(skips).collect::<Vec<_>>().join(",")
    }
}
