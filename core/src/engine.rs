//! Left-to-right traversal of an argument vector over a command tree.
//!
//! For each token, at the current command (the cursor):
//!
//! 1. `--` switches to positional collection for the rest of the input.
//! 2. Every option owned by the cursor is tried in registration order. A
//!    long token is claimed by the first match. In a short token each
//!    character is claimed by the first option that claims it, so `-ab`
//!    resolves both `-a` and `-b`.
//! 3. A child command name moves the cursor down. Options are local: the
//!    parent's options are not matched below it.
//! 4. Anything else is a positional.
//!
//! At the end of input, options along the path from the root to the cursor
//! are validated and defaults filled in.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::command::CommandId;
use crate::error::{JargonError, Result};
use crate::invocation::{ParsedInvocation, ResolvedValue};
use crate::option::{MatchKind, OptionSpec, cluster_suffix};
use crate::program::Program;

/// Ends option and command interpretation.
pub const TERMINATOR: &str = "--";

#[derive(Debug)]
enum State<'p> {
    ExpectingCommandOrOption,
    AwaitingOptionValue { option: &'p OptionSpec, negated: bool },
    PositionalCollection,
}

pub(crate) struct Engine<'p> {
    program: &'p Program,
    cursor: CommandId,
    path: Vec<CommandId>,
    state: State<'p>,
    values: BTreeMap<String, ResolvedValue>,
    positionals: Vec<String>,
}

impl<'p> Engine<'p> {
    pub(crate) fn new(program: &'p Program) -> Self {
        let root = program.root();
        Self {
            program,
            cursor: root,
            path: vec![root],
            state: State::ExpectingCommandOrOption,
            values: BTreeMap::new(),
            positionals: Vec::new(),
        }
    }

    pub(crate) fn run<I, S>(mut self, tokens: I) -> Result<(CommandId, ParsedInvocation)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.step(token.as_ref())?;
        }
        self.finish()
    }

    fn step(&mut self, token: &str) -> Result<()> {
        match std::mem::replace(&mut self.state, State::ExpectingCommandOrOption) {
            State::PositionalCollection => {
                self.positionals.push(token.to_string());
                self.state = State::PositionalCollection;
            }
            State::AwaitingOptionValue { option, negated } => {
                if token == TERMINATOR {
                    return Err(JargonError::MissingValue(option.display_name()));
                }
                let value = option.format_value(token)?;
                self.record(option, value, negated);
            }
            State::ExpectingCommandOrOption => self.classify(token)?,
        }
        Ok(())
    }

    fn classify(&mut self, token: &str) -> Result<()> {
        if token == TERMINATOR {
            debug!("terminator reached, collecting positionals");
            self.state = State::PositionalCollection;
            return Ok(());
        }

        if self.match_options(token)? {
            return Ok(());
        }

        if let Some(child) = self.program.child_named(self.cursor, token) {
            debug!(command = token, "descending into subcommand");
            self.cursor = child;
            self.path.push(child);
            return Ok(());
        }

        trace!(token, "positional");
        self.positionals.push(token.to_string());
        Ok(())
    }

    /// Returns whether any option claimed the token.
    ///
    /// Claims are settled structurally before any formatter runs, so an
    /// option that loses a character to an earlier one never sees the value.
    fn match_options(&mut self, token: &str) -> Result<bool> {
        let program = self.program;
        let mut claimed: Vec<char> = Vec::new();
        let mut claims: Vec<(&'p OptionSpec, bool, Option<&str>)> = Vec::new();

        for option in program.command_ref(self.cursor).options() {
            let Some((kind, negated, inline)) = option.structural_match(token) else {
                continue;
            };
            if let MatchKind::Short(flag) = kind {
                if claimed.contains(&flag) {
                    continue;
                }
                claimed.push(flag);
            }
            claims.push((option, negated, inline));

            if kind == MatchKind::Long {
                break;
            }
        }

        if claims.is_empty() {
            return Ok(false);
        }

        let value_claims: Vec<usize> = claims
            .iter()
            .enumerate()
            .filter(|(_, (option, _, _))| option.requires_value())
            .map(|(index, _)| index)
            .collect();
        if value_claims.len() > 1 {
            return Err(ambiguous(token, value_claims.iter().map(|&i| claims[i].0)));
        }

        // A clustered `=value` goes to the one option that can own it.
        let suffix = cluster_suffix(token);
        let suffix_owner = match (suffix, value_claims.first()) {
            (None, _) => None,
            (Some(_), Some(&index)) => Some(index),
            (Some(_), None) if claims.len() == 1 => Some(0),
            (Some(_), None) => {
                return Err(ambiguous(token, claims.iter().map(|(option, _, _)| *option)));
            }
        };

        for (index, (option, negated, inline)) in claims.into_iter().enumerate() {
            let raw = if suffix_owner == Some(index) { suffix } else { inline };
            match raw {
                Some(raw) => {
                    let value = option.format_value(raw)?;
                    self.record(option, value, negated);
                }
                None if option.requires_value() => {
                    debug!(option = %option.display_name(), "awaiting option value");
                    self.state = State::AwaitingOptionValue { option, negated };
                }
                None => self.record(option, Value::Bool(true), negated),
            }
        }

        if !claimed.is_empty() {
            let unclaimed: String = token
                .trim_start_matches('-')
                .split('=')
                .next()
                .unwrap_or_default()
                .chars()
                .filter(|c| !claimed.contains(c))
                .collect();
            if !unclaimed.is_empty() {
                trace!(token, unclaimed = %unclaimed, "cluster characters matched no option");
            }
        }

        Ok(true)
    }

    fn record(&mut self, option: &OptionSpec, value: Value, negated: bool) {
        let key = option.key();
        debug!(option = %option.display_name(), %value, negated, "resolved option");

        if option.allows_multiple()
            && let Some(existing) = self.values.get_mut(&key)
            && let Value::Array(items) = &mut existing.value
        {
            items.push(value);
            existing.negated = negated;
            return;
        }

        let value = if option.allows_multiple() {
            Value::Array(vec![value])
        } else {
            value
        };
        self.values
            .insert(key, ResolvedValue::from_input(value, negated));
    }

    fn finish(mut self) -> Result<(CommandId, ParsedInvocation)> {
        // A dangling occurrence only falls back to the default when the
        // option was not already given a value earlier in the input.
        if let State::AwaitingOptionValue { option, .. } = self.state
            && (option.default_value().is_none() || self.values.contains_key(&option.key()))
        {
            return Err(JargonError::MissingValue(option.display_name()));
        }

        self.validate()?;

        let invocation = ParsedInvocation {
            command: self.program.command_ref(self.cursor).name().to_string(),
            path: self.program.command_path(self.cursor),
            values: self.values,
            positionals: self.positionals,
        };
        Ok((self.cursor, invocation))
    }

    /// Checks options from the root down to the cursor, filling defaults.
    fn validate(&mut self) -> Result<()> {
        let program = self.program;
        for &id in &self.path {
            for option in program.command_ref(id).options() {
                let key = option.key();
                if self.values.contains_key(&key) {
                    continue;
                }
                if let Some(default) = option.default_value() {
                    debug!(option = %option.display_name(), "using default value");
                    self.values
                        .insert(key, ResolvedValue::from_default(default.clone()));
                } else if option.is_required() {
                    return Err(JargonError::MissingOption(option.display_name()));
                } else if option.requires_value() && !option.is_optional() {
                    return Err(JargonError::MissingValue(option.display_name()));
                }
            }
        }
        Ok(())
    }
}

fn ambiguous<'a>(token: &str, options: impl Iterator<Item = &'a OptionSpec>) -> JargonError {
    JargonError::AmbiguousCluster {
        token: token.to_string(),
        options: options.map(OptionSpec::display_name).collect(),
    }
}
