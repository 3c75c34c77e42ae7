//! Error types for program configuration and argument processing.
//!
//! Configuration errors (attaching commands, options and actions) and
//! invocation errors (missing values, ambiguous clusters, failed actions)
//! share one enum so callers can propagate either with `?`.

use thiserror::Error;

/// Boxed error returned by bound actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while configuring a program or processing arguments.
#[derive(Debug, Error)]
pub enum JargonError {
    /// The command handle is unknown, the root, or would create a cycle.
    #[error("invalid command: {0}")]
    InvalidChild(String),

    /// The command already has a parent.
    #[error("command already attached to parent: {0}")]
    AlreadyAttached(String),

    /// A sibling with the same name is already registered.
    #[error("duplicate command in scope: {0}")]
    NameCollision(String),

    /// The option cannot be attached (e.g. its form is already taken).
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The action cannot be bound to the given command.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Short form is not exactly one word character.
    #[error("invalid short option: `{0}`")]
    InvalidShortOption(String),

    /// Long form is too short or contains characters outside `[\w-]`.
    #[error("invalid long option: `{0}`")]
    InvalidLongOption(String),

    /// Option defines neither a short nor a long form.
    #[error("option must define short or long form")]
    MissingOptionName,

    /// Command name is empty or looks like an option.
    #[error("invalid command name: `{0}`")]
    InvalidCommandName(String),

    /// Default values cannot be null.
    #[error("default value cannot be null for option {0}")]
    InvalidDefault(String),

    /// A value-requiring option resolved without input value or default.
    #[error("missing value for option {0}")]
    MissingValue(String),

    /// A required option was not given and has no default.
    #[error("missing required option {0}")]
    MissingOption(String),

    /// A short cluster has no single option that can own its value: either
    /// several value-requiring options claimed it, or an `=value` suffix was
    /// attached to a cluster of flags.
    #[error("ambiguous cluster `{token}`: cannot tell which of {options:?} takes the value")]
    AmbiguousCluster {
        token: String,
        options: Vec<String>,
    },

    /// A formatter rejected a raw value.
    #[error("invalid value `{value}` for option {option}: {message}")]
    InvalidValue {
        option: String,
        value: String,
        message: String,
    },

    /// The bound action failed.
    #[error("action for command `{command}` failed: {source}")]
    Action {
        command: String,
        #[source]
        source: BoxError,
    },

    /// Program definition could not be read.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Program definition JSON could not be parsed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Program definition YAML could not be parsed.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Program definition is structurally unusable.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
}

/// Convenience alias for results with [`JargonError`].
pub type Result<T> = std::result::Result<T, JargonError>;
