use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use markup_bridge_core::codec::keys;
use markup_bridge_core::{AnnotationTool, BridgeConfig, DecodePolicy, StyleCodec, StyleProperties};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for payloads that decode but fail validation
pub const EXIT_INVALID: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "markup-bridge-cli")]
#[command(about = "Annotation style bridge CLI")]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reject payloads with malformed fields instead of dropping them.
    #[arg(long, global = true)]
    strict: bool,

    /// Log decode details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decode a style payload and print its canonical mapping.
    Normalize {
        /// Payload file; stdin when omitted.
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Check a style payload against its value domains.
    Validate {
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Layer an override style on top of a base style.
    Merge {
        #[arg(value_name = "BASE")]
        base: PathBuf,
        #[arg(value_name = "OVERRIDE")]
        overlay: PathBuf,
    },
    /// Print the concrete style an annotation would be drawn with.
    Resolve {
        #[arg(long)]
        tool: AnnotationTool,
        /// Annotation style file; the bare tool default when omitted.
        #[arg(long, value_name = "FILE")]
        style: Option<PathBuf>,
    },
    /// Print the default style of every tool.
    Defaults,
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    valid: bool,
    violations: Vec<String>,
    style: Value,
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    tool: AnnotationTool,
    style: Value,
}

pub fn run<I, T>(args: I) -> Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    let policy_override = cli.strict.then_some(DecodePolicy::Strict);
    let config = BridgeConfig::load(cli.config.as_deref(), policy_override)
        .context("failed to load configuration")?;
    let codec = config.codec();
    tracing::debug!(
        policy = %codec.policy(),
        clamp_on_encode = codec.clamp_on_encode(),
        "codec ready"
    );

    match cli.command {
        Commands::Normalize { input } => {
            let style = decode_payload(&codec, input.as_deref())?;
            print_json(&codec.encode_json(&style))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { input } => run_validate(&codec, input.as_deref()),
        Commands::Merge { base, overlay } => {
            let base = decode_payload(&codec, Some(&base))?;
            let overlay = decode_payload(&codec, Some(&overlay))?;
            print_json(&codec.encode_json(&base.merge(&overlay)))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve { tool, style } => run_resolve(&config, &codec, tool, style.as_deref()),
        Commands::Defaults => {
            let defaults: serde_json::Map<String, Value> = config
                .tool_styles()
                .iter()
                .map(|(tool, style)| (tool.to_string(), codec.encode_json(style)))
                .collect();
            print_json(&Value::Object(defaults))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_validate(codec: &StyleCodec, input: Option<&Path>) -> Result<ExitCode> {
    let style = decode_payload(codec, input)?;
    let violations = style.validate();

    let output = ValidateOutput {
        valid: violations.is_empty(),
        violations,
        style: codec.encode_json(&style),
    };
    print_json(&output)?;

    if output.valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INVALID))
    }
}

fn run_resolve(
    config: &BridgeConfig,
    codec: &StyleCodec,
    tool: AnnotationTool,
    style: Option<&Path>,
) -> Result<ExitCode> {
    let annotation = match style {
        Some(path) => decode_payload(codec, Some(path))?,
        None => StyleProperties::new(),
    };

    let resolved = config.tool_styles().resolve(tool, &annotation);
    let mut style = codec.encode_json(&resolved.to_properties());
    if !tool.uses_font() {
        if let Value::Object(map) = &mut style {
            map.remove(keys::FONT_SIZE);
        }
    }

    print_json(&ResolveOutput { tool, style })?;
    Ok(ExitCode::SUCCESS)
}

fn decode_payload(codec: &StyleCodec, input: Option<&Path>) -> Result<StyleProperties> {
    let payload = read_payload(input)?;
    let source = input.map_or_else(|| "stdin".to_string(), |path| path.display().to_string());

    codec
        .decode_json(&payload)
        .with_context(|| format!("failed to decode style from {source}"))
}

fn read_payload(input: Option<&Path>) -> Result<Value> {
    let text = match input {
        Some(path) => {
            ensure_file_exists(path)?;
            fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    serde_json::from_str(&text).context("payload is not valid JSON")
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Stdout carries JSON results, so logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["markup-bridge-cli", "validate", "--strict", "-v"]);
        assert!(cli.strict);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Validate { input: None }));
    }

    #[test]
    fn test_cli_parses_tool_names() {
        let cli = Cli::parse_from(["markup-bridge-cli", "resolve", "--tool", "freeText"]);
        assert!(matches!(
            cli.command,
            Commands::Resolve {
                tool: AnnotationTool::FreeText,
                style: None
            }
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_tool() {
        let result = Cli::try_parse_from(["markup-bridge-cli", "resolve", "--tool", "stamp"]);
        assert!(result.is_err());
    }
}
