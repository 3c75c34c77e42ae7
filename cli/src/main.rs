use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jargon_core::{CommandId, ParsedInvocation, Program, ProgramDefinition};
use tracing_subscriber::EnvFilter;

/// Output format for parsed invocations.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "jargon")]
#[command(about = "Match argument vectors against declarative command definitions")]
struct Cli {
    /// Log engine decisions to stderr (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse arguments against a definition and print the invocation.
    Parse(ParseArgs),
    /// Load a definition and print its command tree.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Program definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    definition: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse, given after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Program definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    definition: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_program(path: &Path) -> Result<Program> {
    ProgramDefinition::load(path)
        .with_context(|| format!("failed to load definition '{}'", path.display()))?
        .into_program()
        .with_context(|| format!("invalid definition '{}'", path.display()))
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let program = load_program(&args.definition)?;
    let invocation = program.process(&args.args).context("failed to parse arguments")?;
    println!("{}", render(&invocation, args.format)?);
    Ok(())
}

fn render(invocation: &ParsedInvocation, format: CliOutputFormat) -> Result<String> {
    let rendered = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(invocation)?,
        CliOutputFormat::Yaml => serde_yaml::to_string(invocation)?,
    };
    Ok(rendered.trim_end().to_string())
}

fn run_check(args: CheckArgs) -> Result<()> {
    let program = load_program(&args.definition)?;
    if let Some(usage) = program.usage_text() {
        println!("usage: {usage}");
    }
    let mut lines = Vec::new();
    describe(&program, program.root(), 0, &mut lines);
    println!("{}", lines.join("\n"));
    Ok(())
}

/// Appends one line per command and option, indented by depth.
fn describe(program: &Program, id: CommandId, depth: usize, lines: &mut Vec<String>) {
    let Some(command) = program.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match command.description() {
        Some(description) => lines.push(format!("{indent}{} - {description}", command.name())),
        None => lines.push(format!("{indent}{}", command.name())),
    }

    for option in command.options() {
        let mut forms = Vec::new();
        if let Some(short) = option.short_form() {
            forms.push(format!("-{short}"));
        }
        if let Some(long) = option.long_form() {
            forms.push(format!("--{long}"));
        }
        let mut line = format!("{indent}  {}", forms.join(", "));
        if option.requires_value() {
            line.push_str(" <value>");
        }
        if let Some(default) = option.default_value() {
            line.push_str(&format!(" [default: {default}]"));
        }
        if option.is_required() {
            line.push_str(" (required)");
        }
        if !option.description().is_empty() {
            line.push_str(&format!("  {}", option.description()));
        }
        lines.push(line);
    }

    for &child in command.children() {
        describe(program, child, depth + 1, lines);
    }
}
