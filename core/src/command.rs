//! Command nodes: a name, an ordered option set and a bound action.
//!
//! Commands are linked into a tree by [`Program`](crate::Program), which
//! owns every node and records parent/child links as [`CommandId`] handles.

use std::fmt;

use crate::error::{BoxError, JargonError, Result};
use crate::invocation::ParsedInvocation;
use crate::option::OptionSpec;

/// Callable bound to a command, invoked with the parsed invocation.
pub type Action = Box<dyn Fn(&ParsedInvocation) -> std::result::Result<(), BoxError> + Send + Sync>;

/// Handle to a command registered in a [`Program`](crate::Program).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) usize);

/// A named command with options and an action.
///
/// Options are matched in insertion order; the first structural match wins.
///
/// # Examples
///
/// ```
/// use jargon_core::{Command, OptionSpec};
///
/// let build = Command::new("build")
///     .unwrap()
///     .with_description("Compile the project")
///     .with_option(OptionSpec::new(Some("r"), Some("release")).unwrap())
///     .unwrap();
///
/// assert_eq!(build.name(), "build");
/// assert_eq!(build.options().len(), 1);
/// assert!(build.parent().is_none());
/// ```
pub struct Command {
    name: String,
    description: Option<String>,
    options: Vec<OptionSpec>,
    action: Option<Action>,
    pub(crate) parent: Option<CommandId>,
    pub(crate) children: Vec<CommandId>,
}

impl Command {
    /// Creates a command.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCommandName`](JargonError::InvalidCommandName) if the
    /// name is blank, contains whitespace, or starts with `-`.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
            return Err(JargonError::InvalidCommandName(name.to_string()));
        }
        Ok(Self::unchecked(name))
    }

    pub(crate) fn unchecked(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            options: Vec::new(),
            action: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Builder form of [`attach_option`](Command::attach_option).
    pub fn with_option(mut self, option: OptionSpec) -> Result<Self> {
        self.attach_option(option)?;
        Ok(self)
    }

    /// Builder form of [`bind_action`](Command::bind_action).
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&ParsedInvocation) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.bind_action(action);
        self
    }

    /// Appends an option, preserving registration order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOption`](JargonError::InvalidOption) when the option's
    /// short or long form is already taken on this command.
    pub fn attach_option(&mut self, option: OptionSpec) -> Result<&mut Self> {
        if let Some(short) = option.short_form()
            && self.options.iter().any(|o| o.short_form() == Some(short))
        {
            return Err(JargonError::InvalidOption(format!(
                "duplicate short option -{short} on command `{}`",
                self.name
            )));
        }
        if let Some(long) = option.long_form()
            && self.options.iter().any(|o| o.long_form() == Some(long))
        {
            return Err(JargonError::InvalidOption(format!(
                "duplicate long option --{long} on command `{}`",
                self.name
            )));
        }

        self.options.push(option);
        Ok(self)
    }

    /// Replaces the action (a no-op until bound).
    pub fn bind_action<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn(&ParsedInvocation) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Runs the bound action; a command without one does nothing.
    pub(crate) fn dispatch(&self, invocation: &ParsedInvocation) -> Result<()> {
        let Some(action) = &self.action else {
            return Ok(());
        };
        action(invocation).map_err(|source| JargonError::Action {
            command: self.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("action", &self.action.as_ref().map(|_| "<fn>"))
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_names() {
        for name in ["", "-x", "two words"] {
            assert!(matches!(
                Command::new(name),
                Err(JargonError::InvalidCommandName(_))
            ));
        }
    }

    #[test]
    fn test_options_keep_insertion_order() {
        let mut cmd = Command::new("run").unwrap();
        cmd.attach_option(OptionSpec::short("b").unwrap()).unwrap();
        cmd.attach_option(OptionSpec::short("a").unwrap()).unwrap();
        let shorts: Vec<_> = cmd.options().iter().filter_map(|o| o.short_form()).collect();
        assert_eq!(shorts, vec!['b', 'a']);
    }

    #[test]
    fn test_duplicate_option_forms_rejected() {
        let mut cmd = Command::new("run").unwrap();
        cmd.attach_option(OptionSpec::new(Some("v"), Some("verbose")).unwrap())
            .unwrap();

        let err = cmd.attach_option(OptionSpec::short("v").unwrap()).unwrap_err();
        assert!(matches!(err, JargonError::InvalidOption(_)));

        let err = cmd
            .attach_option(OptionSpec::long("verbose").unwrap())
            .unwrap_err();
        assert!(matches!(err, JargonError::InvalidOption(_)));
        assert_eq!(cmd.options().len(), 1);
    }

    #[test]
    fn test_dispatch_defaults_to_noop() {
        let cmd = Command::new("run").unwrap();
        assert!(!cmd.has_action());
        assert!(cmd.dispatch(&ParsedInvocation::default()).is_ok());
    }

    #[test]
    fn test_dispatch_wraps_action_error() {
        let cmd = Command::new("run")
            .unwrap()
            .with_action(|_| Err("boom".into()));
        let err = cmd.dispatch(&ParsedInvocation::default()).unwrap_err();
        assert!(matches!(err, JargonError::Action { ref command, .. } if command == "run"));
        assert_eq!(err.to_string(), "action for command `run` failed: boom");
    }
}
