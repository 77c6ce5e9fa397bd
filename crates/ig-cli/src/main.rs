//! Idle Gamble terminal driver
//!
//! Usage:
//!   idle-gamble roll            - One manual gamble, then follow the fever countdown
//!   idle-gamble watch           - Feed build/test signals from stdin

mod commands;
mod console;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use ig_core::GambleConfig;
use ig_gamble::{GambleOutcome, GambleStateMachine, LogNotifier, MessagePresentation, Notifier};
use ig_trigger::TriggerSource;

use crate::commands::{WATCH_HELP, WatchCommand};
use crate::console::{ConsoleNotifier, spawn_renderer};

#[derive(Parser)]
#[command(name = "idle-gamble", about = "Idle Death Gamble for your terminal")]
struct Cli {
    /// Config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the win probability
    #[arg(long, global = true)]
    chance: Option<f64>,

    /// Skip roll and reveal delays
    #[arg(long, global = true)]
    instant: bool,

    /// Override the fever length (ms)
    #[arg(long, global = true)]
    fever_ms: Option<u64>,

    /// Print presentation messages as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Send notices to the log instead of stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gamble once and follow the fever if it hits
    Roll,
    /// Read `roll`, `task <code>`, `tests <p> <f> <e>`, ... from stdin
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    log::info!("Starting Idle Gamble (chance {:.2})", config.chance());

    let (presentation, rx) = MessagePresentation::channel();
    let fever_ms = config.timing.fever_ms();
    let renderer = spawn_renderer(rx, cli.json, fever_ms);
    let machine = GambleStateMachine::builder(config.clone())
        .presentation(Arc::new(presentation))
        .notifier(notifier(cli.quiet))
        .build();

    let result = match cli.command {
        Commands::Roll => run_roll(&machine).await,
        Commands::Watch => run_watch(&machine, &config, cli.json, fever_ms).await,
    };

    machine.dispose();
    machine.detach_presentation();
    if let Err(e) = renderer.await {
        log::warn!("Renderer task failed: {}", e);
    }
    result
}

fn notifier(quiet: bool) -> Arc<dyn Notifier> {
    if quiet {
        Arc::new(LogNotifier)
    } else {
        Arc::new(ConsoleNotifier)
    }
}

fn load_config(cli: &Cli) -> Result<GambleConfig> {
    let mut config = match &cli.config {
        Some(path) => GambleConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GambleConfig::default(),
    };

    if let Some(chance) = cli.chance {
        config.jackpot_chance = chance;
    }
    if cli.instant {
        config.timing.roll_buildup_ms = 0;
        config.timing.win_reveal_delay_ms = 0;
        config.timing.resume_settle_ms = 0;
    }
    if let Some(fever_ms) = cli.fever_ms {
        config.timing.fever_duration_ms = fever_ms;
    }
    Ok(config)
}

async fn run_roll(machine: &GambleStateMachine) -> Result<()> {
    match machine.attempt_gamble(true).await {
        GambleOutcome::Won => follow_fever(machine).await,
        outcome => {
            log::debug!("Roll ended: {:?}", outcome);
            Ok(())
        }
    }
}

/// Countdown once per second until fever ends or Ctrl-C resets it
async fn follow_fever(machine: &GambleStateMachine) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => match machine.fever_countdown() {
                Some(countdown) => eprint!("\r⏳ {} ", countdown.display()),
                None => {
                    eprintln!();
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                eprintln!();
                machine.reset_state();
                break;
            }
        }
    }
    Ok(())
}

async fn run_watch(
    machine: &GambleStateMachine,
    config: &GambleConfig,
    json: bool,
    fever_ms: u64,
) -> Result<()> {
    let trigger = TriggerSource::new(Arc::new(machine.clone()), config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{}", WATCH_HELP);

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match WatchCommand::parse(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            WatchCommand::Signal(signal) => {
                let decision = trigger.handle(&signal);
                log::info!("{:?} → {:?}", signal, decision);
            }
            WatchCommand::Reset => machine.reset_state(),
            WatchCommand::Reload => {
                let (presentation, rx) = MessagePresentation::channel();
                spawn_renderer(rx, json, fever_ms);
                let decision = machine.attach_presentation(Arc::new(presentation)).await;
                eprintln!("view reattached: {:?}", decision);
            }
            WatchCommand::Status => {
                let phase = machine.phase();
                match machine.fever_countdown() {
                    Some(countdown) => {
                        eprintln!("{} ({} left)", phase.display_name(), countdown.display())
                    }
                    None => eprintln!("{}", phase.display_name()),
                }
            }
            WatchCommand::Help => eprintln!("{}", WATCH_HELP),
            WatchCommand::Quit => break,
        }
    }
    Ok(())
}
