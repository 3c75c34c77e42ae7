//! The root command and the command tree it owns.
//!
//! A [`Program`] is configured first (commands, options, actions) and then
//! used read-only by [`parse`](Program::parse) and
//! [`process`](Program::process). Commands live in an arena; parent/child
//! links are [`CommandId`] handles, so a command can be attached at most once
//! and cycles are rejected at attach time.
//!
//! # Example
//!
//! ```
//! use jargon_core::{Command, OptionSpec, Program};
//!
//! let mut program = Program::new();
//! program.usage("app [options] <command>");
//! program.option(OptionSpec::new(Some("q"), Some("quiet")).unwrap()).unwrap();
//!
//! let build = program.command(Command::new("build").unwrap()).unwrap();
//! program
//!     .attach_option(build, OptionSpec::long("verbose").unwrap())
//!     .unwrap();
//!
//! let inv = program.parse(["build", "--verbose"]).unwrap();
//! assert_eq!(inv.command, "build");
//! assert_eq!(inv.flag("verbose"), Some(true));
//!
//! let inv = program.parse(["--verbose", "build"]).unwrap();
//! assert_eq!(inv.positionals, vec!["--verbose"]);
//! ```

use tracing::debug;

use crate::command::{Command, CommandId};
use crate::engine::Engine;
use crate::error::{BoxError, JargonError, Result};
use crate::invocation::ParsedInvocation;
use crate::option::OptionSpec;

/// Name given to the root command.
pub const ROOT_COMMAND_NAME: &str = "_main";

/// Root of a command tree and the entry point for argument processing.
#[derive(Debug)]
pub struct Program {
    commands: Vec<Command>,
    usage: Option<String>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Creates a program whose root command is named [`ROOT_COMMAND_NAME`].
    pub fn new() -> Self {
        Self {
            commands: vec![Command::unchecked(ROOT_COMMAND_NAME)],
            usage: None,
        }
    }

    /// Handle of the root command.
    pub fn root(&self) -> CommandId {
        CommandId(0)
    }

    /// Sets the usage string. Display only; never matched against input.
    pub fn usage(&mut self, usage: &str) -> &mut Self {
        self.usage = Some(usage.to_string());
        self
    }

    pub fn usage_text(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Looks up a command by handle.
    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.0)
    }

    /// Adds a command to the arena without attaching it anywhere.
    pub fn register(&mut self, command: Command) -> CommandId {
        self.commands.push(command);
        CommandId(self.commands.len() - 1)
    }

    /// Registers `command` and attaches it under the root.
    pub fn command(&mut self, command: Command) -> Result<CommandId> {
        self.subcommand(self.root(), command)
    }

    /// Registers `command` and attaches it under `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`attach_child`](Program::attach_child). Nothing is
    /// registered when attaching fails.
    pub fn subcommand(&mut self, parent: CommandId, command: Command) -> Result<CommandId> {
        let parent_command = self.lookup(parent)?;
        if self.child_named(parent, command.name()).is_some() {
            return Err(JargonError::NameCollision(format!(
                "`{}` under `{}`",
                command.name(),
                parent_command.name()
            )));
        }

        let child = self.register(command);
        self.attach_child(parent, child)?;
        Ok(child)
    }

    /// Attaches a registered command under `parent`.
    ///
    /// # Errors
    ///
    /// - [`InvalidChild`](JargonError::InvalidChild) if either handle is
    ///   unknown, `child` is the root, or `child` is `parent` or one of its
    ///   ancestors.
    /// - [`AlreadyAttached`](JargonError::AlreadyAttached) if `child` already
    ///   has a parent.
    /// - [`NameCollision`](JargonError::NameCollision) if `parent` already has
    ///   a child with the same name.
    pub fn attach_child(&mut self, parent: CommandId, child: CommandId) -> Result<&mut Self> {
        self.lookup(parent)?;
        let child_command = self.lookup(child)?;
        if child == self.root() {
            return Err(JargonError::InvalidChild(
                "root command cannot be attached".to_string(),
            ));
        }
        if child_command.parent.is_some() {
            return Err(JargonError::AlreadyAttached(child_command.name().to_string()));
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(JargonError::InvalidChild(format!(
                "attaching `{}` would create a cycle",
                child_command.name()
            )));
        }

        let name = child_command.name().to_string();
        if self.child_named(parent, &name).is_some() {
            return Err(JargonError::NameCollision(format!(
                "`{name}` under `{}`",
                self.commands[parent.0].name()
            )));
        }

        self.commands[child.0].parent = Some(parent);
        self.commands[parent.0].children.push(child);
        Ok(self)
    }

    /// Adds an option to the root command.
    pub fn option(&mut self, option: OptionSpec) -> Result<&mut Self> {
        self.attach_option(self.root(), option)
    }

    /// Adds an option to the command behind `id`.
    ///
    /// # Errors
    ///
    /// [`InvalidOption`](JargonError::InvalidOption) when the handle is unknown
    /// or the option's forms collide with an existing option on the command.
    pub fn attach_option(&mut self, id: CommandId, option: OptionSpec) -> Result<&mut Self> {
        let command = self.commands.get_mut(id.0).ok_or_else(|| {
            JargonError::InvalidOption(format!("unknown command handle {}", id.0))
        })?;
        command.attach_option(option)?;
        Ok(self)
    }

    /// Binds the action run when parsing ends on the command behind `id`.
    ///
    /// # Errors
    ///
    /// [`InvalidAction`](JargonError::InvalidAction) when the handle is unknown.
    pub fn bind_action<F>(&mut self, id: CommandId, action: F) -> Result<&mut Self>
    where
        F: Fn(&ParsedInvocation) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        let command = self.commands.get_mut(id.0).ok_or_else(|| {
            JargonError::InvalidAction(format!("unknown command handle {}", id.0))
        })?;
        command.bind_action(action);
        Ok(self)
    }

    /// Finds a direct child of `parent` by name.
    pub fn child_named(&self, parent: CommandId, name: &str) -> Option<CommandId> {
        self.get(parent)?
            .children()
            .iter()
            .copied()
            .find(|&id| self.commands[id.0].name() == name)
    }

    /// Resolves a path of subcommand names starting below the root.
    ///
    /// An empty path resolves to the root.
    pub fn find_command(&self, path: &[&str]) -> Option<CommandId> {
        path.iter()
            .try_fold(self.root(), |id, name| self.child_named(id, name))
    }

    /// Names from the first subcommand below the root down to `id`.
    pub fn command_path(&self, id: CommandId) -> Vec<String> {
        let mut names: Vec<String> = self
            .ancestors(id)
            .filter(|&ancestor| ancestor != self.root())
            .map(|ancestor| self.commands[ancestor.0].name().to_string())
            .collect();
        names.reverse();
        names
    }

    /// Matches `tokens` against the tree without running any action.
    ///
    /// # Errors
    ///
    /// [`MissingValue`](JargonError::MissingValue),
    /// [`MissingOption`](JargonError::MissingOption),
    /// [`AmbiguousCluster`](JargonError::AmbiguousCluster) or
    /// [`InvalidValue`](JargonError::InvalidValue).
    pub fn parse<I, S>(&self, tokens: I) -> Result<ParsedInvocation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Engine::new(self).run(tokens).map(|(_, invocation)| invocation)
    }

    /// Matches `tokens` and runs the action bound to the resolved command.
    ///
    /// The action runs only when parsing succeeded.
    ///
    /// # Errors
    ///
    /// Any [`parse`](Program::parse) error, or
    /// [`Action`](JargonError::Action) when the action fails.
    pub fn process<I, S>(&self, tokens: I) -> Result<ParsedInvocation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (cursor, invocation) = Engine::new(self).run(tokens)?;
        debug!(command = %invocation.command, "dispatching action");
        self.commands[cursor.0].dispatch(&invocation)?;
        Ok(invocation)
    }

    /// [`process`](Program::process) over the current process arguments,
    /// program name excluded.
    pub fn process_env(&self) -> Result<ParsedInvocation> {
        self.process(std::env::args().skip(1))
    }

    pub(crate) fn command_ref(&self, id: CommandId) -> &Command {
        &self.commands[id.0]
    }

    fn lookup(&self, id: CommandId) -> Result<&Command> {
        self.get(id)
            .ok_or_else(|| JargonError::InvalidChild(format!("unknown command handle {}", id.0)))
    }

    /// `id` followed by its ancestors up to the root.
    fn ancestors(&self, id: CommandId) -> impl Iterator<Item = CommandId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), |&current| {
            self.commands[current.0].parent
        })
    }
}
