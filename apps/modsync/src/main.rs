//! modsync - keep a server's module files installed, current and intact
//!
//! This is the command line front end. Every command is carried out by the
//! ops crate; this binary wires configuration, events and output around it.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use modsync_config::Config;
use modsync_events::EventReceiver;
use modsync_net::{CancellationToken, NetClient, NetConfig};
use modsync_ops::{OperationResult, OpsContextBuilder, OpsCtx};
use modsync_types::ColorChoice;
use std::process;
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug, cli.global.silent);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting modsync v{}", env!("CARGO_PKG_VERSION"));

    // File (or defaults), then environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);
    config.validate()?;

    let (event_sender, event_receiver) = modsync_events::channel();
    let net = NetClient::new(NetConfig::from(&config.network))?;

    let cancel = CancellationToken::new();
    spawn_interrupt_watcher(cancel.clone());

    let ops_ctx = OpsContextBuilder::new()
        .with_config(config.clone())
        .with_net(net)
        .with_event_sender(event_sender)
        .with_cancel(cancel)
        .build()?;

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    // Status lines would interleave with the JSON document on the terminal
    let quiet = cli.global.silent || cli.global.json;
    let mut event_handler = EventHandler::new(colors_enabled, quiet, cli.global.debug);

    let result =
        execute_command_with_events(cli.command, ops_ctx, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;
    check_outcome(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// A rendered result still fails the command when modules are invalid, or
/// when verify or update could not handle every module
fn check_outcome(result: &OperationResult) -> Result<(), CliError> {
    match result {
        OperationResult::VerifyReport(report) => {
            if !report.is_valid() {
                let invalid = report
                    .modules
                    .iter()
                    .filter(|module| !module.status.is_valid())
                    .map(|module| module.module.clone())
                    .collect();
                return Err(CliError::Invalid(invalid));
            }
            if !report.errors.is_empty() {
                return Err(CliError::Incomplete(report.errors.clone()));
            }
            Ok(())
        }
        OperationResult::UpdateReport(report) if !report.warnings.is_empty() => {
            Err(CliError::Incomplete(report.warnings.clone()))
        }
        // Install skips unresolvable modules by design
        OperationResult::InstallReport(_) | OperationResult::UpdateReport(_) => Ok(()),
    }
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
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
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    let modules = ctx.config.general.modules.clone();

    match command {
        Commands::Install { manifests, .. } => {
            let report = modsync_ops::install(&ctx, &modules, manifests).await?;
            Ok(OperationResult::InstallReport(report))
        }
        Commands::Verify { remote, .. } => {
            let report = modsync_ops::verify(&ctx, &modules, remote).await?;
            Ok(OperationResult::VerifyReport(report))
        }
        Commands::Update { .. } => {
            let report = modsync_ops::update(&ctx, &modules).await?;
            Ok(OperationResult::UpdateReport(report))
        }
    }
}

/// Cancel running work on Ctrl-C
fn spawn_interrupt_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        select! {
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => {
                        warn!("Interrupted, cancelling");
                        cancel.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                }
            }
            () = cancel.cancelled() => {}
        }
    });
}

/// Initialize tracing/logging
///
/// Logs go to stderr. `RUST_LOG` wins over the verbosity flags when set.
fn init_tracing(json_mode: bool, debug_enabled: bool, silent: bool) {
    let default_filter = if debug_enabled {
        "info,modsync=debug,modsync_ops=debug"
    } else if silent {
        "error"
    } else if json_mode {
        // Keep stderr quiet next to machine-readable stdout
        "warn"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(debug_enabled)
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    let target = command.target();
    if let Some(branch) = target.branch {
        config.general.branch = branch;
    }
    if let Some(arch) = target.arch {
        config.general.arch = arch;
    }
    if let Some(path) = &target.path {
        config.general.path.clone_from(path);
    }
    if !target.modules.is_empty() {
        config.general.modules.clone_from(&target.modules);
    }
    if let Some(seconds) = target.timeout {
        config.network.deadline = u64::try_from(seconds.max(0)).unwrap_or_default();
    }
    if target.github {
        config.github.enabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsync_types::{Arch, Branch};
    use std::path::PathBuf;

    fn verify_report(status: modsync_types::ModuleStatus, errors: &[&str]) -> OperationResult {
        OperationResult::VerifyReport(modsync_ops::VerifyReport {
            root: PathBuf::from("/srv/game"),
            remote: true,
            modules: vec![modsync_ops::ModuleSummary {
                module: "go-module".to_string(),
                status,
                local: None,
                remote: None,
            }],
            errors: errors.iter().map(ToString::to_string).collect(),
            duration_ms: 3,
        })
    }

    fn update_report(warnings: &[&str]) -> OperationResult {
        OperationResult::UpdateReport(modsync_ops::UpdateReport {
            root: PathBuf::from("/srv/game"),
            before: std::collections::BTreeMap::new(),
            refreshed: Vec::new(),
            current: vec!["server".to_string()],
            files: Vec::new(),
            bytes: 0,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            duration_ms: 3,
        })
    }

    #[test]
    fn degraded_verify_fails_the_command() {
        use modsync_types::ModuleStatus;

        assert!(check_outcome(&verify_report(ModuleStatus::VALID, &[])).is_ok());
        assert!(matches!(
            check_outcome(&verify_report(ModuleStatus::INVALID, &[])),
            Err(CliError::Invalid(modules)) if modules == ["go-module"]
        ));
        assert!(matches!(
            check_outcome(&verify_report(
                ModuleStatus::VALID,
                &["no provider configured for module go-module"]
            )),
            Err(CliError::Incomplete(problems)) if problems.len() == 1
        ));
    }

    #[test]
    fn update_with_skips_fails_the_command() {
        assert!(check_outcome(&update_report(&[])).is_ok());
        assert!(matches!(
            check_outcome(&update_report(&["no provider configured for module go-module"])),
            Err(CliError::Incomplete(_))
        ));
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "modsync", "--color", "never", "update", "-b", "dev", "-a", "x64_win32", "-p",
            "/srv/game", "-m", "data-files", "-t", "30", "-g",
        ]);
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.general.branch, Branch::Dev);
        assert_eq!(config.general.arch, Arch::X64Win32);
        assert_eq!(config.general.path, PathBuf::from("/srv/game"));
        assert_eq!(config.general.modules, ["data-files"]);
        assert_eq!(config.network.deadline, 30);
        assert!(config.github.enabled);
    }

    #[test]
    fn non_positive_timeout_disables_deadline() {
        let cli = parse(&["modsync", "verify", "-t", "-5"]);
        let mut config = Config::default();
        config.network.deadline = 120;
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert_eq!(config.network.deadline, 0);
        assert_eq!(config.deadline(), None);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = parse(&["modsync", "install"]);
        let mut config = Config::default();
        let modules = config.general.modules.clone();
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert_eq!(config.general.modules, modules);
        assert!(!config.github.enabled);
    }
}
