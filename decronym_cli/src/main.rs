use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use decronym_cli::config::{AppConfig, ConfigManager};
use decronym_cli::credentials::PromptCredentials;
use decronym_cli::error::{CliError, ErrorContext, ExitCode};
use decronym_cli::orchestrators::update_orchestrator::format_reports;
use decronym_cli::orchestrators::{FindOptions, FindOrchestrator, UpdateOrchestrator};
use decronym_cli::output::OutputFormat;
use decronym_cli::terminal;
use decronym_core::factory::{PAGE_ID, PATTERN};
use decronym_core::{ProviderDescriptor, ProviderKind, ReqwestTransport};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "decronym")]
#[command(author, version, about = "Look up acronyms across local files, remote feeds and web sources", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Use this configuration file instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one or more acronyms in every enabled source
    Find {
        /// Acronyms to look up
        #[arg(required = true)]
        acronyms: Vec<String>,

        /// Only show matches carrying one of these tags (repeatable)
        #[arg(short = 't', long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Output format (defaults to output.default_format)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Do not suggest similar acronyms when nothing is found
        #[arg(long)]
        no_suggestions: bool,
    },

    /// Probe sources and refresh cached definition tables
    Update {
        /// Disable the progress spinner
        #[arg(long)]
        no_progress: bool,
    },

    /// Delete all cached definitions
    Clean,

    /// Manage definition sources
    Sources {
        #[command(subcommand)]
        command: SourcesCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum SourcesCommand {
    /// List configured sources
    List,

    /// Add a source
    Add {
        /// Source type (json_file, json_path, json_url, timedate, iso_currency, confluence_table, wikipedia)
        kind: String,

        /// File path, directory or URL
        location: String,

        /// Confluence page id (confluence_table)
        #[arg(long)]
        page_id: Option<String>,

        /// File name glob for directory sources (json_path)
        #[arg(long)]
        pattern: Option<String>,

        /// Add the source disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a source
    Remove { kind: String, location: String },

    /// Enable a source
    Enable { kind: String, location: String },

    /// Disable a source
    Disable { kind: String, location: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a configuration file with all defaults
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (e.g., lookup.concurrency)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., lookup.concurrency, tag_map.medical)
        key: String,

        /// Value to set; comma separated keywords for tag_map keys
        value: String,
    },

    /// List all configuration values
    List,

    /// Print the configuration file path
    Path,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("decronym_core", log::LevelFilter::Debug)
            .filter_module("decronym_cli", log::LevelFilter::Debug)
            .filter_module("decronym", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let debug = cli.debug;
    match run(cli).await {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            let error = CliError::from(e);
            eprint!("{}", error.format_for_user(debug));
            error.exit_code().into()
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    match cli.command {
        Commands::Find {
            acronyms,
            tags,
            format,
            no_suggestions,
        } => {
            let mut config = manager.load()?;
            if no_suggestions {
                config.lookup.suggestions = false;
            }
            find_command(&config, &acronyms, tags, format).await?;
        }
        Commands::Update { no_progress } => {
            let config = manager.load()?;
            update_command(&config, no_progress).await?;
        }
        Commands::Clean => {
            let config = manager.load()?;
            let orchestrator = orchestrator_for_maintenance(&config)?;
            let removed = orchestrator.clean()?;
            eprintln!(
                "Removed {removed} cache files from {}",
                orchestrator.cache_dir().display()
            );
        }
        Commands::Sources { command } => {
            sources_command(manager, command)?;
        }
        Commands::Config { command } => {
            config_command(manager, command)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

fn transport() -> Result<Arc<ReqwestTransport>> {
    Ok(Arc::new(
        ReqwestTransport::new().context("Failed to create HTTP client")?,
    ))
}

async fn find_command(
    config: &AppConfig,
    acronyms: &[String],
    tags: Vec<String>,
    format: Option<FormatArg>,
) -> Result<()> {
    let format = match format {
        Some(arg) => arg.into(),
        None => OutputFormat::from_string(&config.output.default_format)?,
    };
    let use_color = terminal::should_use_color(config.output.color_enabled);
    if !use_color {
        colored::control::set_override(false);
    }

    let mut orchestrator =
        FindOrchestrator::new(config, transport()?, Arc::new(PromptCredentials::new()));
    let summary = orchestrator
        .run(
            acronyms,
            &FindOptions {
                tags,
                format,
                use_color,
            },
        )
        .await?;

    print!("{}", summary.output);
    if format != OutputFormat::Text {
        println!();
    }
    log::debug!(
        "{} matched, {} filtered, {} not found",
        summary.matched,
        summary.filtered,
        summary.not_found
    );
    Ok(())
}

fn orchestrator_for_maintenance(config: &AppConfig) -> Result<UpdateOrchestrator> {
    Ok(UpdateOrchestrator::new(
        config,
        transport()?,
        Arc::new(PromptCredentials::new()),
    ))
}

async fn update_command(config: &AppConfig, no_progress: bool) -> Result<()> {
    let orchestrator = orchestrator_for_maintenance(config)?;
    let show_progress = !no_progress
        && config.output.progress_enabled
        && terminal::should_show_progress_by_default();

    let reports = orchestrator.update(show_progress).await;
    if reports.is_empty() {
        eprintln!("{}", "No enabled sources to update.".yellow());
        return Ok(());
    }

    let use_color = terminal::should_use_color(config.output.color_enabled);
    print!("{}", format_reports(&reports, use_color));

    let failed = reports
        .iter()
        .filter(|r| !r.alive || r.error.is_some())
        .count();
    if failed == reports.len() {
        return Err(CliError::network(&format!("None of {failed} sources could be updated")).into());
    }
    Ok(())
}

fn parse_kind(kind: &str) -> Result<ProviderKind> {
    ProviderKind::parse(kind).map_err(|_| {
        let known: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
        CliError::unknown_value("source type", kind, &known).into()
    })
}

fn sources_command(mut manager: ConfigManager, command: SourcesCommand) -> Result<()> {
    let path = manager.get_config_path();

    match command {
        SourcesCommand::List => {
            let sources = manager.sources()?;
            if sources.is_empty() {
                eprintln!("No sources configured in {}", path.display());
                eprintln!("Add one with 'decronym sources add <TYPE> <LOCATION>'");
                return Ok(());
            }

            println!("  #  | ON  | TYPE             | LOCATION");
            for (index, source) in sources.iter().enumerate() {
                let on = if source.enabled { "[x]" } else { "[ ]" };
                let mut line = format!(
                    "{index:>3}  | {on} | {:<16} | {}",
                    source.kind.as_str(),
                    source.location
                );
                for (key, value) in &source.extra {
                    line.push_str(&format!(" {key}={value}"));
                }
                println!("{line}");
            }
        }
        SourcesCommand::Add {
            kind,
            location,
            page_id,
            pattern,
            disabled,
        } => {
            let kind = parse_kind(&kind)?;
            let mut descriptor = ProviderDescriptor::new(kind, location).with_enabled(!disabled);
            if let Some(page_id) = page_id {
                descriptor = descriptor.with_extra(PAGE_ID, page_id);
            }
            if let Some(pattern) = pattern {
                descriptor = descriptor.with_extra(PATTERN, pattern);
            }
            if kind == ProviderKind::ConfluenceTable && descriptor.extra_str(PAGE_ID).is_none() {
                return Err(CliError::misuse("confluence_table sources need --page-id")
                    .with_context("type", kind.as_str())
                    .into());
            }

            let added = descriptor.to_string();
            manager.add_source(descriptor)?;
            eprintln!("{}", format!("Added {added}").green());
            eprintln!("Configuration saved to: {}", path.display());
        }
        SourcesCommand::Remove { kind, location } => {
            let kind = parse_kind(&kind)?;
            if manager.remove_source(kind, &location)? {
                eprintln!("{}", format!("Removed {kind} {location}").green());
            } else {
                return Err(CliError::misuse(&format!("No {kind} source at '{location}'"))
                    .with_suggestion("Run 'decronym sources list' to see configured sources")
                    .into());
            }
        }
        SourcesCommand::Enable { kind, location } => {
            manager.set_source_enabled(parse_kind(&kind)?, &location, true)?;
            eprintln!("{}", format!("Enabled {kind} {location}").green());
        }
        SourcesCommand::Disable { kind, location } => {
            manager.set_source_enabled(parse_kind(&kind)?, &location, false)?;
            eprintln!("{}", format!("Disabled {kind} {location}").green());
        }
    }

    Ok(())
}

fn config_command(mut manager: ConfigManager, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init { force } => {
            let path = manager.get_config_path();
            if manager.init(force)? {
                eprintln!("{}", "✓ Configuration written".green());
                eprintln!("Config file: {}", path.display());
                eprintln!("Public sources are disabled; enable them with 'decronym sources enable'");
            } else {
                eprintln!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                );
            }
        }
        ConfigCommand::Get { key } => {
            println!("{}", manager.get(&key)?);
        }
        ConfigCommand::Set { key, value } => {
            manager.set(&key, &value)?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.get_config_path().display()
            );
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {}", manager.get_config_path().display());
            eprintln!();

            // Group items by section
            let mut sections: std::collections::BTreeMap<String, Vec<(String, String)>> =
                std::collections::BTreeMap::new();

            for (key, value) in items {
                let section = key.split('.').next().unwrap_or("general").to_string();
                sections.entry(section).or_default().push((key, value));
            }

            for (section, items) in sections {
                println!("[{}]", section.yellow());
                for (key, value) in items {
                    let display_key = key.split_once('.').map_or(key.as_str(), |(_, k)| k);
                    println!("  {} = {}", display_key.cyan(), value);
                }
                println!();
            }
        }
        ConfigCommand::Path => {
            println!("{}", manager.get_config_path().display());
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
