//! CLI entry point for the clientgen tool.
//!
//! This binary reads a service description exported by the host loader,
//! builds the client model, and writes it as JSON for a renderer.
//!
//! # Usage
//!
//! ```bash
//! clientgen [OPTIONS] <COMMAND>
//!
//! # Build the model and write one file per client
//! clientgen generate --input service.json --out-path ./Client --pretty
//!
//! # Write the whole model to stdout, with overrides
//! clientgen generate --input service.json --namespace Acme.Client --use-query-models
//!
//! # Print the effective configuration
//! clientgen --config clientgen.json show-config
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod sink;

use std::io::{Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use cg_builder::{BuildResult, ClientModelBuilder, ClientSink};
use cg_core::{Config, GenerateOptions, ServiceDescription};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::sink::{JsonDirectorySink, JsonWriterSink};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Generates a typed client model from a web service's endpoint descriptions.
#[derive(Parser)]
#[command(name = "clientgen", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    #[arg(short, long, global = true, env = "CLIENTGEN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build the client model from a service description.
    Generate {
        /// Service description JSON, or `-` for stdin.
        #[arg(short, long)]
        input: Utf8PathBuf,

        /// Output directory (defaults to stdout).
        #[arg(short, long)]
        out_path: Option<Utf8PathBuf>,

        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,

        /// Builder option overrides.
        #[command(flatten)]
        overrides: OptionOverrides,
    },

    /// Print the effective configuration as JSON.
    ShowConfig {
        /// Builder option overrides.
        #[command(flatten)]
        overrides: OptionOverrides,
    },
}

/// Command-line overrides for [`GenerateOptions`].
#[derive(Args, Default)]
struct OptionOverrides {
    /// Root namespace for generated clients.
    #[arg(long)]
    namespace: Option<String>,

    /// Client name pattern containing `[controller]` or `[group]`.
    #[arg(long)]
    type_name_pattern: Option<String>,

    /// Access modifier for generated clients.
    #[arg(long)]
    access_modifier: Option<String>,

    /// Append a cancellation token parameter to every method.
    #[arg(long)]
    add_cancellation_token_parameters: bool,

    /// Collapse flattened query models into one parameter.
    #[arg(long)]
    use_query_models: bool,

    /// Wrap return types in an API response envelope.
    #[arg(long)]
    use_api_responses: bool,

    /// Exclude controllers whose full type name contains this substring.
    #[arg(long)]
    exclude_types: Option<String>,

    /// Include only controllers whose full type name contains this substring.
    #[arg(long)]
    include_types: Option<String>,

    /// Exclude endpoints whose path contains this substring.
    #[arg(long)]
    exclude_paths: Option<String>,

    /// Include only endpoints whose path contains this substring.
    #[arg(long)]
    include_paths: Option<String>,

    /// Namespace to import in every client (repeatable).
    #[arg(long = "additional-namespace", value_name = "NAMESPACE")]
    additional_namespaces: Vec<String>,

    /// Namespace segment dropped from client sub-paths.
    #[arg(long)]
    namespace_segment_to_strip: Option<String>,

    /// Hosting environment name.
    #[arg(long, env = "ASPNETCORE_ENVIRONMENT")]
    environment: Option<String>,
}

impl OptionOverrides {
    /// Applies every override that was given on the command line.
    fn apply(self, options: &mut GenerateOptions) {
        if let Some(namespace) = self.namespace {
            options.namespace = namespace;
        }
        if let Some(pattern) = self.type_name_pattern {
            options.type_name_pattern = pattern;
        }
        if let Some(modifier) = self.access_modifier {
            options.access_modifier = modifier;
        }
        options.add_cancellation_token_parameters |= self.add_cancellation_token_parameters;
        options.use_query_models |= self.use_query_models;
        options.use_api_responses |= self.use_api_responses;

        if self.exclude_types.is_some() {
            options.exclude_types = self.exclude_types;
        }
        if self.include_types.is_some() {
            options.include_types = self.include_types;
        }
        if self.exclude_paths.is_some() {
            options.exclude_paths = self.exclude_paths;
        }
        if self.include_paths.is_some() {
            options.include_paths = self.include_paths;
        }
        if !self.additional_namespaces.is_empty() {
            options.additional_namespaces = self.additional_namespaces;
        }
        if let Some(segment) = self.namespace_segment_to_strip {
            options.namespace_segment_to_strip = segment;
        }
        if self.environment.is_some() {
            options.environment = self.environment;
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. Logs go
/// to stderr so stdout stays free for the model.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the configuration file, if any, and applies CLI overrides.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be loaded.
fn build_config(path: Option<&Utf8Path>, overrides: OptionOverrides) -> color_eyre::Result<Config> {
    let mut config = match path {
        Some(path) => {
            Config::load(path).wrap_err_with(|| format!("failed to load configuration {path}"))?
        }
        None => Config::default(),
    };
    overrides.apply(&mut config.generate);
    Ok(config)
}

/// Reads and parses the service description.
fn read_service(input: &Utf8Path) -> color_eyre::Result<ServiceDescription> {
    let contents = if input.as_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input.as_std_path())
            .wrap_err_with(|| format!("failed to read service description {input}"))?
    };

    serde_json::from_str(&contents)
        .wrap_err_with(|| format!("failed to parse service description {input}"))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Builds the model and hands it to the configured sink.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the build fails, or the
/// output cannot be written.
fn run_generate(config: &Config, input: &Utf8Path) -> color_eyre::Result<()> {
    info!(input = %input, namespace = %config.generate.namespace, "Generating client model");

    let service = read_service(input)?;
    let builder = ClientModelBuilder::new(config.generate.clone())?;
    let result = builder.build(&service)?;

    print_diagnostics(&result)?;

    if let Some(out_path) = &config.output.out_path {
        let mut sink = JsonDirectorySink::new(out_path, config.output.pretty);
        sink.emit(&result.collection, builder.options())?;
        info!(root = %out_path, files = sink.written().len(), "Client model written");
    } else {
        let stdout = std::io::stdout();
        let mut sink = JsonWriterSink::new(stdout.lock(), config.output.pretty);
        sink.emit(&result.collection, builder.options())?;
    }

    Ok(())
}

/// Prints the effective configuration.
fn run_show_config(config: &Config) -> color_eyre::Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{content}")?;
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints resolved conflicts to stderr.
fn print_diagnostics(result: &BuildResult) -> std::io::Result<()> {
    if !result.has_diagnostics() {
        return Ok(());
    }

    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    writeln!(handle)?;
    writeln!(handle, "Diagnostics ({}):", result.diagnostic_count())?;
    for diagnostic in &result.diagnostics {
        writeln!(handle, "  {diagnostic}")?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to appropriate command
    match cli.command {
        Commands::Generate {
            input,
            out_path,
            pretty,
            overrides,
        } => {
            let mut config = build_config(cli.config.as_deref(), overrides)?;
            if out_path.is_some() {
                config.output.out_path = out_path;
            }
            config.output.pretty |= pretty;
            run_generate(&config, &input)
        }
        Commands::ShowConfig { overrides } => {
            let config = build_config(cli.config.as_deref(), overrides)?;
            run_show_config(&config)
        }
    }
}
