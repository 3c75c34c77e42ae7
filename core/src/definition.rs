//! Declarative program definitions.
//!
//! A [`ProgramDefinition`] describes a command tree in YAML or JSON and is
//! turned into a [`Program`] through the regular configuration API, so a
//! malformed definition fails with the same errors as hand-written setup.
//! Actions cannot be expressed in a file; bind them afterwards via
//! [`Program::find_command`].
//!
//! # Example YAML
//!
//! ```yaml
//! usage: "pkg [options] <command>"
//! options:
//!   - short: v
//!     long: verbose
//!     negatable: true
//! commands:
//!   - name: install
//!     description: Install packages
//!     options:
//!       - short: j
//!         long: jobs
//!         require_value: true
//!         default: 4
//!         format: integer
//!       - long: registry
//!         require_value: true
//!         optional: true
//!         format:
//!           choice: [public, mirror]
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::{Command, CommandId};
use crate::error::{JargonError, Result};
use crate::formatters;
use crate::option::{Formatter, OptionSpec};
use crate::program::Program;

/// Stock formatter selectable from a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatDefinition {
    String,
    Integer,
    Number,
    Boolean,
    /// One of the listed values.
    Choice(Vec<String>),
}

impl FormatDefinition {
    fn formatter(&self) -> Formatter {
        match self {
            Self::String => formatters::string(),
            Self::Integer => formatters::integer(),
            Self::Number => formatters::number(),
            Self::Boolean => formatters::boolean(),
            Self::Choice(choices) => {
                let choices: Vec<&str> = choices.iter().map(String::as_str).collect();
                formatters::choice(&choices)
            }
        }
    }
}

/// Serializable description of one option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionDefinition {
    pub short: Option<String>,
    pub long: Option<String>,
    pub description: Option<String>,
    pub negatable: bool,
    pub required: bool,
    pub require_value: bool,
    pub optional: bool,
    pub multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// `integer`, or a single-key map such as `{choice: [a, b]}`.
    #[serde(
        with = "serde_yaml::with::singleton_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub format: Option<FormatDefinition>,
}

impl OptionDefinition {
    /// Builds the option, validating forms and default.
    pub fn to_option(&self) -> Result<OptionSpec> {
        let mut option = OptionSpec::new(self.short.as_deref(), self.long.as_deref())?;
        if let Some(description) = &self.description {
            option = option.with_description(description);
        }
        if self.negatable {
            option = option.negatable();
        }
        if self.required {
            option = option.required();
        }
        if self.require_value {
            option = option.require_value();
        }
        if self.optional {
            option = option.optional();
        }
        if self.multiple {
            option = option.allow_multiple();
        }
        if let Some(default) = &self.default {
            option = option.with_default(default.clone())?;
        }
        if let Some(format) = &self.format {
            option = option.with_formatter(format.formatter());
        }
        Ok(option)
    }
}

/// Serializable description of a subcommand and its descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandDefinition {
    pub name: String,
    pub description: Option<String>,
    pub options: Vec<OptionDefinition>,
    pub commands: Vec<CommandDefinition>,
}

/// Serializable description of a whole program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramDefinition {
    pub usage: Option<String>,
    pub options: Vec<OptionDefinition>,
    pub commands: Vec<CommandDefinition>,
}

impl ProgramDefinition {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Loads a definition file; `.json` is read as JSON, anything else as
    /// YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](JargonError::IoError) if the file cannot be read,
    /// or [`JsonError`](JargonError::JsonError) /
    /// [`YamlError`](JargonError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_reader(reader)?)
        } else {
            Ok(serde_yaml::from_reader(reader)?)
        }
    }

    /// Builds the described program.
    ///
    /// # Errors
    ///
    /// Any configuration error: malformed option forms, duplicate options,
    /// duplicate sibling commands, invalid command names, `null` defaults.
    pub fn into_program(self) -> Result<Program> {
        let mut program = Program::new();
        if let Some(usage) = &self.usage {
            program.usage(usage);
        }
        let root = program.root();
        attach_options(&mut program, root, &self.options)?;
        for command in &self.commands {
            attach_command(&mut program, root, command)?;
        }
        Ok(program)
    }
}

fn attach_options(program: &mut Program, id: CommandId, options: &[OptionDefinition]) -> Result<()> {
    for option in options {
        program.attach_option(id, option.to_option()?)?;
    }
    Ok(())
}

fn attach_command(program: &mut Program, parent: CommandId, def: &CommandDefinition) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(JargonError::InvalidDefinition(
            "command name cannot be empty".to_string(),
        ));
    }

    let mut command = Command::new(&def.name)?;
    if let Some(description) = &def.description {
        command = command.with_description(description);
    }
    let id = program.subcommand(parent, command)?;
    attach_options(program, id, &def.options)?;
    for child in &def.commands {
        attach_command(program, id, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const PKG_YAML: &str = r#"
usage: "pkg [options] <command>"
options:
  - short: v
    long: verbose
    negatable: true
commands:
  - name: install
    options:
      - short: j
        long: jobs
        require_value: true
        default: 4
        format: integer
      - long: registry
        require_value: true
        optional: true
        format:
          choice: [public, mirror]
    commands:
      - name: local
"#;

    #[test]
    fn test_yaml_definition_builds_program() {
        let program = ProgramDefinition::from_yaml_str(PKG_YAML)
            .unwrap()
            .into_program()
            .unwrap();

        assert_eq!(program.usage_text(), Some("pkg [options] <command>"));
        assert!(program.find_command(&["install", "local"]).is_some());

        let inv = program.parse(["-V", "install", "-j", "8"]).unwrap();
        assert_eq!(inv.flag("verbose"), Some(false));
        assert_eq!(inv.value("jobs"), Some(&json!(8)));
        assert!(inv.get("registry").is_none());

        let err = program
            .parse(["install", "--registry", "private"])
            .unwrap_err();
        assert!(matches!(err, JargonError::InvalidValue { .. }));
    }

    #[test]
    fn test_json_definition() {
        let def = ProgramDefinition::from_json_str(
            r#"{"options": [{"short": "q"}], "commands": [{"name": "run"}]}"#,
        )
        .unwrap();
        let program = def.into_program().unwrap();
        assert_eq!(program.parse(["-q", "run"]).unwrap().command, "run");
    }

    #[test]
    fn test_choice_format_as_single_key_map() {
        let yaml = ProgramDefinition::from_yaml_str(PKG_YAML).unwrap();
        let registry = &yaml.commands[0].options[1];
        assert_eq!(
            registry.format,
            Some(FormatDefinition::Choice(vec!["public".into(), "mirror".into()]))
        );

        let json = ProgramDefinition::from_json_str(
            r#"{"options": [{"long": "color", "require_value": true,
                "format": {"choice": ["auto", "never"]}}]}"#,
        )
        .unwrap();
        let program = json.into_program().unwrap();
        assert_eq!(
            program.parse(["--color", "never"]).unwrap().value("color"),
            Some(&json!("never"))
        );

        let written = serde_yaml::to_string(&yaml).unwrap();
        assert!(written.contains("choice:"), "{written}");
        assert_eq!(ProgramDefinition::from_yaml_str(&written).unwrap(), yaml);
    }

    #[test]
    fn test_invalid_definitions_surface_configuration_errors() {
        let dup = ProgramDefinition::from_yaml_str("commands: [{name: a}, {name: a}]").unwrap();
        assert!(matches!(
            dup.into_program(),
            Err(JargonError::NameCollision(_))
        ));

        let bad_short = ProgramDefinition::from_yaml_str("options: [{short: ab}]").unwrap();
        assert!(matches!(
            bad_short.into_program(),
            Err(JargonError::InvalidShortOption(_))
        ));

        let unnamed = ProgramDefinition::from_yaml_str("options: [{negatable: true}]").unwrap();
        assert!(matches!(
            unnamed.into_program(),
            Err(JargonError::MissingOptionName)
        ));

        let empty = ProgramDefinition::from_yaml_str("commands: [{description: x}]").unwrap();
        assert!(matches!(
            empty.into_program(),
            Err(JargonError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = ProgramDefinition::from_yaml_str("options: [{short: a, format: date}]");
        assert!(matches!(err, Err(JargonError::YamlError(_))));
    }
}
