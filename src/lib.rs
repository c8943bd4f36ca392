// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, select_targets, HostTarget};
use crate::engine::{escalate_interrupts, shutdown_channel, Coordinator, CoordinatorOptions};
use crate::output::{colors_enabled, Renderer, StartupInfo, StderrDiagnostics, StdoutSink};
use crate::pipeline::tail_command;
use crate::session::SshTransport;

/// Exit status after a second Ctrl-C (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and target selection
/// - the banner (unless silent)
/// - Ctrl-C handling
/// - the coordinator over the SSH transport, rendering to stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let targets = select_targets(&cfg, args.group.as_deref(), &args.overrides())?;

    if args.dry_run {
        print_dry_run(&config_path, &targets);
        return Ok(());
    }

    let silent = args.silent || cfg.config.silent;
    let colored = colors_enabled(silent);
    let renderer = Renderer::new(colored);

    if !silent && !targets.is_empty() {
        print!("{}", StartupInfo::current().welcome(&targets, colored));
    }

    // First Ctrl-C: every pipeline winds down and the queue drains.
    // Second Ctrl-C: exit at once, even if a host is stuck closing.
    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        match escalate_interrupts(trigger, tokio::signal::ctrl_c).await {
            Ok(()) => std::process::exit(INTERRUPTED_EXIT_CODE),
            Err(e) => eprintln!("failed to listen for Ctrl+C: {e}"),
        }
    });

    let coordinator = Coordinator::new(
        Arc::new(SshTransport::new()),
        CoordinatorOptions::from(&cfg.config),
        Arc::new(StderrDiagnostics::new(renderer)),
        shutdown,
    );
    let summary = coordinator.run(targets, renderer, StdoutSink).await;

    if summary.failed > 0 {
        warn!(
            failed = summary.failed,
            hosts = summary.hosts,
            "some hosts failed; see diagnostics above"
        );
    }
    Ok(())
}

/// Dry-run output: each target and the remote command it would run.
fn print_dry_run(config_path: &std::path::Path, targets: &[Arc<HostTarget>]) {
    println!("remotetail dry-run");
    println!("  config = {}", config_path.display());
    println!();

    println!("targets ({}):", targets.len());
    for target in targets {
        println!("  - {}", target.name);
        println!("      address: {}:{}", target.hostname, target.port);
        println!("      user: {}", target.user);
        if let Some(key) = target.key_path() {
            println!("      private_key: {}", key.display());
        }
        if target.credential.password.is_some() {
            println!("      password: <set>");
        }
        match tail_command(target) {
            Ok(cmd) => println!("      cmd: {cmd}"),
            Err(e) => println!("      cmd: <invalid: {}>", e.cause),
        }
    }

    debug!("dry-run complete (no connections made)");
}
