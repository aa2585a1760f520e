//! provaudit - supply-chain integrity auditor
//!
//! Compares what a package registry serves for each release against the
//! tagged source archive of the project's repository, through the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, CompareArgs, RegistryArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use provaudit_compare::CompareOptions;
use provaudit_config::{constants, Config};
use provaudit_events::{EventReceiver, EventSender};
use provaudit_net::{NetClient, NetConfig};
use provaudit_ops::{AuditContextBuilder, OperationResult};
use provaudit_types::{ColorChoice, OutputFormat};
use std::process;
use tokio::select;
use tracing::{error, info};

/// Exit status when `--fail-on-mismatch` is set and archives differ
const EXIT_MISMATCH: i32 = 2;

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic, returning the process exit status
async fn run(cli: Cli) -> Result<i32, CliError> {
    info!("Starting provaudit v{}", env!("CARGO_PKG_VERSION"));

    // Precedence: file (or defaults), then environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command)?;

    let format = if cli.global.json {
        OutputFormat::Json
    } else {
        config.general.default_output
    };
    let renderer = OutputRenderer::new(format, config.general.color, cli.command.full_diff());
    let mut event_handler = EventHandler::new(
        colors_enabled(config.general.color, format),
        cli.global.debug,
        format == OutputFormat::Json,
    );

    let (event_sender, event_receiver) = provaudit_events::channel();
    let fail_on_mismatch = config.general.fail_on_mismatch;

    let result = execute_command_with_events(
        cli.command,
        config,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    Ok(exit_code(&result, fail_on_mismatch))
}

fn exit_code(result: &OperationResult, fail_on_mismatch: bool) -> i32 {
    if fail_on_mismatch && result.has_mismatches() {
        EXIT_MISMATCH
    } else {
        0
    }
}

fn colors_enabled(choice: ColorChoice, format: OutputFormat) -> bool {
    match (format, choice) {
        (OutputFormat::Plain | OutputFormat::Json, _) | (_, ColorChoice::Never) => false,
        (_, ColorChoice::Always) => true,
        (_, ColorChoice::Auto) => console::Term::stderr().features().colors_supported(),
    }
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    tx: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Audit(args) => {
            let ctx = AuditContextBuilder::from_config(&config, &args.package, &args.repo)?
                .with_event_sender(tx)
                .build()?;
            let only = (!args.versions.is_empty()).then_some(args.versions.as_slice());
            let report = provaudit_ops::run_audit(&ctx, only).await?;
            Ok(OperationResult::AuditReport(report))
        }

        Commands::Versions { package, .. } => {
            let client = NetClient::new(NetConfig::from(&config.network))?;
            let index = provaudit_ops::version_index(&config, client);
            let versions = provaudit_ops::list_versions(index.as_ref(), &package, Some(&tx)).await?;
            Ok(OperationResult::VersionList { package, versions })
        }

        Commands::Compare {
            registry_archive,
            source_archive,
            package,
            ..
        } => {
            let options = CompareOptions {
                decode_policy: config.compare.decode_policy,
                path_match: config.compare.path_match,
            };
            let result =
                provaudit_ops::compare_local(&registry_archive, &source_archive, &package, options)
                    .await?;
            Ok(OperationResult::Comparison { package, result })
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let debug_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "info,provaudit=debug,provaudit_ops=debug,provaudit_sources=debug",
            )
        })
    };

    if json_mode {
        // JSON mode: keep stdout and stderr clean
        if debug_enabled {
            if let Some((file, _)) = create_log_file() {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();
                return;
            }
        }
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Some((file, path)) = create_log_file() {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(debug_filter())
                .init();
            eprintln!("Debug logging enabled: {}", path.display());
        } else {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(debug_filter())
                .init();
        }
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,provaudit=warn,provaudit_ops=warn")
                }),
            )
            .init();
    }
}

fn create_log_file() -> Option<(std::fs::File, std::path::PathBuf)> {
    let log_dir = constants::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {e}");
        return None;
    }

    let log_file = log_dir.join(format!(
        "provaudit-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    match std::fs::File::create(&log_file) {
        Ok(file) => Some((file, log_file)),
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {e}");
            None
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(
    config: &mut Config,
    global: &cli::GlobalArgs,
    command: &Commands,
) -> Result<(), CliError> {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    match command {
        Commands::Audit(args) => {
            if let Some(jobs) = args.jobs {
                if jobs == 0 {
                    return Err(CliError::InvalidArguments(
                        "--jobs must be at least 1".to_string(),
                    ));
                }
                config.general.jobs = jobs;
            }
            apply_registry_args(config, &args.registry);
            apply_compare_args(config, &args.compare);
            if let Some(prefix) = &args.tag_prefix {
                config.hosting.tag_prefix.clone_from(prefix);
            }
            if let Some(dir) = &args.staging_dir {
                config.staging.enabled = true;
                config.staging.root = Some(dir.clone());
            }
            if args.no_staging {
                config.staging.enabled = false;
            }
            if args.fail_on_mismatch {
                config.general.fail_on_mismatch = true;
            }
        }
        Commands::Versions { registry, .. } => apply_registry_args(config, registry),
        Commands::Compare {
            compare,
            fail_on_mismatch,
            ..
        } => {
            apply_compare_args(config, compare);
            if *fail_on_mismatch {
                config.general.fail_on_mismatch = true;
            }
        }
    }

    Ok(())
}

fn apply_registry_args(config: &mut Config, args: &RegistryArgs) {
    if let Some(backend) = args.backend {
        config.registry.backend = backend;
    }
    if let Some(url) = &args.index_url {
        config.registry.base_url.clone_from(url);
    }
    if let Some(python) = &args.python {
        config.registry.python.clone_from(python);
    }
}

fn apply_compare_args(config: &mut Config, args: &CompareArgs) {
    if let Some(policy) = args.decode {
        config.compare.decode_policy = policy;
    }
    if let Some(path_match) = args.path_match {
        config.compare.path_match = path_match;
    }
}
