//! Engine output: the resolved command, option values and positionals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Parsed from the argument vector.
    Input,
    /// Filled from the option's default.
    Default,
}

/// Value resolved for one option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// The value; `true` for an option given without a value.
    pub value: Value,
    /// Whether the last occurrence used a negated form.
    pub negated: bool,
    /// Input or default.
    pub provenance: Provenance,
}

impl ResolvedValue {
    pub(crate) fn from_input(value: Value, negated: bool) -> Self {
        Self {
            value,
            negated,
            provenance: Provenance::Input,
        }
    }

    pub(crate) fn from_default(value: Value) -> Self {
        Self {
            value,
            negated: false,
            provenance: Provenance::Default,
        }
    }
}

/// Result of matching an argument vector against a program.
///
/// Values are keyed by [`OptionSpec::key`](crate::OptionSpec::key): the
/// long form when the option has one, otherwise its short character.
///
/// # Examples
///
/// ```
/// use jargon_core::{Command, OptionSpec, Program, Provenance};
///
/// let mut program = Program::new();
/// program.option(OptionSpec::new(Some("v"), Some("verbose")).unwrap().negatable()).unwrap();
/// program.command(Command::new("build").unwrap()).unwrap();
///
/// let inv = program.parse(["build", "-V", "src"]).unwrap();
/// assert_eq!(inv.command, "build");
/// assert!(inv.values.is_empty()); // -V is not visible inside `build`
/// assert_eq!(inv.positionals, vec!["-V", "src"]);
///
/// let inv = program.parse(["-V"]).unwrap();
/// assert_eq!(inv.flag("verbose"), Some(false));
/// assert_eq!(inv.provenance("verbose"), Some(Provenance::Input));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedInvocation {
    /// Name of the deepest command reached.
    pub command: String,
    /// Names of the subcommands descended into, root excluded.
    pub path: Vec<String>,
    /// Resolved option values.
    pub values: BTreeMap<String, ResolvedValue>,
    /// Tokens that were neither options nor subcommand names.
    pub positionals: Vec<String>,
}

impl ParsedInvocation {
    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.values.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key).map(|v| &v.value)
    }

    /// Presence of a flag, `false` when given in negated form.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.values.get(key).map(|v| !v.negated)
    }

    pub fn is_negated(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| v.negated)
    }

    pub fn provenance(&self, key: &str) -> Option<Provenance> {
        self.values.get(key).map(|v| v.provenance)
    }

    /// Subcommand path as a space-joined string (empty at the root).
    pub fn command_path(&self) -> String {
        self.path.join(" ")
    }
}
