//! Declarative command-line argument parsing.
//!
//! This crate matches a raw argument vector against a tree of commands:
//!
//! - [`OptionSpec`]: one option: short/long forms, negation, value policy,
//!   default and formatter. Knows how to match a single token.
//! - [`Command`]: a named node owning an ordered option set and an action.
//! - [`Program`]: the root command and the arena owning the whole tree;
//!   entry point for [`parse`](Program::parse) and
//!   [`process`](Program::process).
//! - [`ParsedInvocation`]: resolved command, option values with
//!   [`Provenance`], and leftover positionals.
//! - [`ProgramDefinition`]: the same tree described in YAML or JSON.
//!
//! Options are scoped to the command that owns them: once a subcommand name
//! is consumed, only that subcommand's options are matched. Defaults and
//! required options are still checked along the whole path from the root.
//!
//! # Example
//!
//! ```
//! use jargon_core::*;
//!
//! let mut program = Program::new();
//! program
//!     .option(OptionSpec::new(Some("v"), Some("verbose")).unwrap().negatable())
//!     .unwrap();
//!
//! let install = program
//!     .command(Command::new("install").unwrap().with_description("Install packages"))
//!     .unwrap();
//! program
//!     .attach_option(
//!         install,
//!         OptionSpec::new(Some("j"), Some("jobs"))
//!             .unwrap()
//!             .require_value()
//!             .with_formatter(formatters::integer())
//!             .with_default(4)
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let inv = program.parse(["-v", "install", "left-pad", "--", "-j"]).unwrap();
//! assert_eq!(inv.command, "install");
//! assert_eq!(inv.flag("verbose"), Some(true));
//! assert_eq!(inv.value("jobs"), Some(&serde_json::json!(4)));
//! assert_eq!(inv.provenance("jobs"), Some(Provenance::Default));
//! assert_eq!(inv.positionals, vec!["left-pad", "-j"]);
//! ```

mod command;
mod definition;
mod engine;
mod error;
pub mod formatters;
mod invocation;
mod option;
mod program;

pub use command::{Action, Command, CommandId};
pub use definition::{CommandDefinition, FormatDefinition, OptionDefinition, ProgramDefinition};
pub use engine::TERMINATOR;
pub use error::{BoxError, JargonError, Result};
pub use invocation::{ParsedInvocation, Provenance, ResolvedValue};
pub use option::{Formatter, MatchKind, MatchResult, OptionSpec};
pub use program::{Program, ROOT_COMMAND_NAME};
