//! Option specifications and the per-token matching contract.
//!
//! An [`OptionSpec`] knows how to recognize itself in a single raw argument
//! token. It never looks at neighbouring tokens: deciding which option owns
//! a trailing value, and whether a cluster is ambiguous, is left to the
//! engine.
//!
//! Recognized token shapes:
//!
//! - `-x`, `-x=value`: short option (inline value only when unclustered)
//! - `-abc`: cluster of short options, each matched independently
//! - `--name`: long option
//! - `--no-name`, `--not-name`: negated long option
//! - `-X`: negated short option (case flip of `-x`)
//!
//! # Examples
//!
//! ```
//! use jargon_core::{MatchKind, OptionSpec};
//!
//! let verbose = OptionSpec::new(Some("v"), Some("verbose"))
//!     .unwrap()
//!     .negatable();
//!
//! let m = verbose.match_token("-v").unwrap().unwrap();
//! assert_eq!(m.kind, MatchKind::Short('v'));
//! assert!(!m.negated);
//!
//! let m = verbose.match_token("--no-verbose").unwrap().unwrap();
//! assert!(m.negated);
//!
//! assert!(verbose.match_token("--quiet").unwrap().is_none());
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::error::{JargonError, Result};

static SHORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^-(\w+)(?:=(.*))?$").expect("static regex must compile"));
static LONG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--([\w-]+)$").expect("static regex must compile"));
static SHORT_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w$").expect("static regex must compile"));
static LONG_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w[\w-]+$").expect("static regex must compile"));

/// Returns the `=value` suffix of a clustered short token such as `-xf=a`.
///
/// Unclustered tokens carry their inline value through the match itself.
pub(crate) fn cluster_suffix(token: &str) -> Option<&str> {
    let caps = SHORT_PATTERN.captures(token)?;
    if caps.get(1)?.as_str().chars().count() < 2 {
        return None;
    }
    caps.get(2).map(|m| m.as_str())
}

/// Converts a raw input string into a value.
///
/// Only applied to values parsed from input, never to defaults. An `Err`
/// carries a message describing why the raw string was rejected.
pub type Formatter = Arc<dyn Fn(&str) -> std::result::Result<Value, String> + Send + Sync>;

/// Which form of an option matched a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Short form; carries the character claimed from the token (the
    /// case-flipped character when negated).
    Short(char),
    /// Long form.
    Long,
}

/// Outcome of a structural match between an option and a token.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Form that matched.
    pub kind: MatchKind,
    /// Whether the negated form matched.
    pub negated: bool,
    /// Copied from the option's value policy.
    pub require_value: bool,
    /// Inline value, already formatted.
    pub value: Option<Value>,
}

/// Describes one option: its short/long forms and value policy.
///
/// Created with [`new`](OptionSpec::new), [`short`](OptionSpec::short) or
/// [`long`](OptionSpec::long), then configured by chaining builder methods.
/// Once attached to a [`Command`](crate::Command) it is no longer mutable.
///
/// # Examples
///
/// ```
/// use jargon_core::{OptionSpec, formatters};
///
/// let port = OptionSpec::long("port")
///     .unwrap()
///     .with_description("Port to listen on")
///     .require_value()
///     .with_formatter(formatters::integer())
///     .with_default(8080)
///     .unwrap();
///
/// assert_eq!(port.key(), "port");
/// assert_eq!(port.display_name(), "--port");
/// assert!(port.requires_value());
/// ```
#[derive(Clone)]
pub struct OptionSpec {
    short: Option<char>,
    long: Option<String>,
    description: String,
    negatable: bool,
    required: bool,
    require_value: bool,
    optional: bool,
    multiple: bool,
    default: Option<Value>,
    formatter: Option<Formatter>,
}

impl OptionSpec {
    /// Creates an option from optional short and long forms, given without
    /// leading dashes (e.g. `"v"` and `"verbose"`).
    ///
    /// # Errors
    ///
    /// - [`InvalidShortOption`](JargonError::InvalidShortOption) if the short
    ///   form is not a single word character.
    /// - [`InvalidLongOption`](JargonError::InvalidLongOption) if the long form
    ///   is shorter than two characters or not made of word characters and
    ///   hyphens.
    /// - [`MissingOptionName`](JargonError::MissingOptionName) if neither is set.
    pub fn new(short: Option<&str>, long: Option<&str>) -> Result<Self> {
        let short = match short {
            Some(s) if SHORT_FORM.is_match(s) => s.chars().next(),
            Some(s) => return Err(JargonError::InvalidShortOption(s.to_string())),
            None => None,
        };
        let long = match long {
            Some(l) if LONG_FORM.is_match(l) => Some(l.to_string()),
            Some(l) => return Err(JargonError::InvalidLongOption(l.to_string())),
            None => None,
        };
        if short.is_none() && long.is_none() {
            return Err(JargonError::MissingOptionName);
        }

        Ok(Self {
            short,
            long,
            description: String::new(),
            negatable: false,
            required: false,
            require_value: false,
            optional: false,
            multiple: false,
            default: None,
            formatter: None,
        })
    }

    /// Creates a short-only option.
    pub fn short(short: &str) -> Result<Self> {
        Self::new(Some(short), None)
    }

    /// Creates a long-only option.
    pub fn long(long: &str) -> Result<Self> {
        Self::new(None, Some(long))
    }

    /// Sets the display description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Lets the option match its negated forms: the case-flipped short form
    /// and the `no-`/`not-` prefixed long form.
    pub fn negatable(mut self) -> Self {
        self.negatable = true;
        self
    }

    /// The option must appear in input unless it has a default.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The option consumes a value, inline or from the next token.
    pub fn require_value(mut self) -> Self {
        self.require_value = true;
        self
    }

    /// A value option that may be left out entirely.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Repeated occurrences collect into an array instead of overwriting.
    pub fn allow_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Sets the value used when the option is absent from input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDefault`](JargonError::InvalidDefault) for `null`.
    pub fn with_default(mut self, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        if value.is_null() {
            return Err(JargonError::InvalidDefault(self.display_name()));
        }
        self.default = Some(value);
        Ok(self)
    }

    /// Sets the formatter applied to values parsed from input.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn short_form(&self) -> Option<char> {
        self.short
    }

    pub fn long_form(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_negatable(&self) -> bool {
        self.negatable
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn requires_value(&self) -> bool {
        self.require_value
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn allows_multiple(&self) -> bool {
        self.multiple
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Key under which resolved values are stored: the long form when set,
    /// otherwise the short character.
    pub fn key(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => unreachable!("constructor rejects options without a form"),
        }
    }

    /// Name as typed on the command line (`--long`, else `-s`).
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => unreachable!("constructor rejects options without a form"),
        }
    }

    /// Case-flipped short form, if the character has a distinct single-char
    /// counterpart.
    pub fn negated_short(&self) -> Option<char> {
        let short = self.short?;
        let flipped: String = if short.is_lowercase() {
            short.to_uppercase().collect()
        } else {
            short.to_lowercase().collect()
        };
        let mut chars = flipped.chars();
        let first = chars.next()?;
        (chars.next().is_none() && first != short).then_some(first)
    }

    /// Tests whether `token` structurally matches this option.
    ///
    /// Returns `Ok(None)` when the token is not this option. A match with a
    /// missing value is still a match; value requirements are checked by the
    /// engine.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidValue`](JargonError::InvalidValue) when an inline value
    /// is rejected by the formatter.
    pub fn match_token(&self, token: &str) -> Result<Option<MatchResult>> {
        let Some((kind, negated, raw)) = self.structural_match(token) else {
            return Ok(None);
        };

        let value = raw.map(|raw| self.format_value(raw)).transpose()?;
        Ok(Some(MatchResult {
            kind,
            negated,
            require_value: self.require_value,
            value,
        }))
    }

    /// Formats a raw input value, passing it through unchanged when no
    /// formatter is set.
    pub fn format_value(&self, raw: &str) -> Result<Value> {
        match &self.formatter {
            Some(formatter) => formatter(raw).map_err(|message| JargonError::InvalidValue {
                option: self.display_name(),
                value: raw.to_string(),
                message,
            }),
            None => Ok(Value::String(raw.to_string())),
        }
    }

    /// Matches `token` without formatting: the kind of match, whether it
    /// was negated, and the raw inline value of an unclustered token.
    pub(crate) fn structural_match<'t>(
        &self,
        token: &'t str,
    ) -> Option<(MatchKind, bool, Option<&'t str>)> {
        if let Some(short) = self.short
            && let Some(caps) = SHORT_PATTERN.captures(token)
        {
            let flags = caps.get(1)?.as_str();
            let inline = if flags.chars().count() == 1 {
                caps.get(2).map(|m| m.as_str())
            } else {
                None
            };

            if flags.contains(short) {
                return Some((MatchKind::Short(short), false, inline));
            }
            if self.negatable
                && let Some(negated) = self.negated_short()
                && flags.contains(negated)
            {
                return Some((MatchKind::Short(negated), true, inline));
            }
            return None;
        }

        if let Some(long) = &self.long
            && let Some(caps) = LONG_PATTERN.captures(token)
        {
            let name = caps.get(1)?.as_str();
            if name == long {
                return Some((MatchKind::Long, false, None));
            }
            if self.negatable
                && (name.strip_prefix("no-") == Some(long.as_str())
                    || name.strip_prefix("not-") == Some(long.as_str()))
            {
                return Some((MatchKind::Long, true, None));
            }
        }

        None
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("description", &self.description)
            .field("negatable", &self.negatable)
            .field("required", &self.required)
            .field("require_value", &self.require_value)
            .field("optional", &self.optional)
            .field("multiple", &self.multiple)
            .field("default", &self.default)
            .field("formatter", &self.formatter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[test]
    fn test_rejects_malformed_forms() {
        assert!(matches!(
            OptionSpec::short("ab"),
            Err(JargonError::InvalidShortOption(s)) if s == "ab"
        ));
        assert!(matches!(
            OptionSpec::short("-v"),
            Err(JargonError::InvalidShortOption(_))
        ));
        assert!(matches!(
            OptionSpec::long("x"),
            Err(JargonError::InvalidLongOption(_))
        ));
        assert!(matches!(
            OptionSpec::long("--install"),
            Err(JargonError::InvalidLongOption(_))
        ));
        assert!(matches!(
            OptionSpec::long("has space"),
            Err(JargonError::InvalidLongOption(_))
        ));
        assert!(matches!(
            OptionSpec::new(None, None),
            Err(JargonError::MissingOptionName)
        ));
    }

    #[test]
    fn test_short_match_without_value() {
        for c in ["a", "i", "Z", "0", "_"] {
            let opt = OptionSpec::short(c).unwrap();
            let m = opt.match_token(&format!("-{c}")).unwrap().unwrap();
            assert_eq!(m.kind, MatchKind::Short(c.chars().next().unwrap()));
            assert!(!m.negated);
            assert_eq!(m.value, None);
        }
    }

    #[test]
    fn test_short_inline_value_only_when_unclustered() {
        let opt = OptionSpec::short("i").unwrap().require_value();

        let m = opt.match_token("-i=pkg").unwrap().unwrap();
        assert_eq!(m.value, Some(json!("pkg")));
        assert!(m.require_value);

        let m = opt.match_token("-ix=pkg").unwrap().unwrap();
        assert_eq!(m.kind, MatchKind::Short('i'));
        assert_eq!(m.value, None);
    }

    #[test]
    fn test_short_inline_empty_value() {
        let opt = OptionSpec::short("o").unwrap();
        let m = opt.match_token("-o=").unwrap().unwrap();
        assert_eq!(m.value, Some(json!("")));
    }

    #[test]
    fn test_short_negation_case_flip() {
        let lower = OptionSpec::short("v").unwrap().negatable();
        let m = lower.match_token("-V").unwrap().unwrap();
        assert!(m.negated);
        assert_eq!(m.kind, MatchKind::Short('V'));

        let upper = OptionSpec::short("Q").unwrap().negatable();
        assert!(upper.match_token("-q").unwrap().unwrap().negated);

        let plain = OptionSpec::short("v").unwrap();
        assert!(plain.match_token("-V").unwrap().is_none());
    }

    #[test]
    fn test_caseless_short_has_no_negated_form() {
        let opt = OptionSpec::short("1").unwrap().negatable();
        assert_eq!(opt.negated_short(), None);
        assert!(!opt.match_token("-1").unwrap().unwrap().negated);
    }

    #[test]
    fn test_negated_short_flips_both_directions() {
        assert_eq!(OptionSpec::short("v").unwrap().negated_short(), Some('V'));
        assert_eq!(OptionSpec::short("Q").unwrap().negated_short(), Some('q'));
        // `ß` upper-cases to "SS", which is not a single character.
        assert_eq!(OptionSpec::short("ß").unwrap().negated_short(), None);
    }

    #[test]
    fn test_long_match_and_negation() {
        let opt = OptionSpec::long("verbose").unwrap().negatable();
        assert_eq!(
            opt.match_token("--verbose").unwrap().unwrap().kind,
            MatchKind::Long
        );
        assert!(opt.match_token("--no-verbose").unwrap().unwrap().negated);
        assert!(opt.match_token("--not-verbose").unwrap().unwrap().negated);
        assert!(opt.match_token("--nope-verbose").unwrap().is_none());
        assert!(opt.match_token("--verbose=1").unwrap().is_none());
        assert!(opt.match_token("-verbose").unwrap().is_none());
    }

    #[test]
    fn test_long_negation_requires_negatable() {
        let opt = OptionSpec::long("verbose").unwrap();
        assert!(opt.match_token("--no-verbose").unwrap().is_none());
    }

    #[test]
    fn test_non_option_tokens_do_not_match() {
        let opt = OptionSpec::new(Some("a"), Some("all")).unwrap();
        for token in ["a", "all", "-", "--", "", "-b"] {
            assert!(opt.match_token(token).unwrap().is_none(), "{token}");
        }
    }

    #[test]
    fn test_formatter_applies_to_inline_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let opt = OptionSpec::short("n")
            .unwrap()
            .with_formatter(Arc::new(move |raw: &str| {
                seen.fetch_add(1, Ordering::SeqCst);
                raw.parse::<i64>().map(Value::from).map_err(|e| e.to_string())
            }))
            .with_default(1)
            .unwrap();

        assert_eq!(
            opt.match_token("-n=42").unwrap().unwrap().value,
            Some(json!(42))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(opt.default_value(), Some(&json!(1)));

        let err = opt.match_token("-n=x").unwrap_err();
        assert!(matches!(err, JargonError::InvalidValue { ref option, .. } if option == "-n"));
    }

    #[test]
    fn test_null_default_rejected() {
        let err = OptionSpec::long("out").unwrap().with_default(Value::Null);
        assert!(matches!(err, Err(JargonError::InvalidDefault(name)) if name == "--out"));
    }

    #[test]
    fn test_key_prefers_long_form() {
        assert_eq!(OptionSpec::new(Some("v"), Some("verbose")).unwrap().key(), "verbose");
        assert_eq!(OptionSpec::short("v").unwrap().key(), "v");
        assert_eq!(OptionSpec::short("v").unwrap().display_name(), "-v");
    }
}
