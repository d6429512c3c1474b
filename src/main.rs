//! HealthGuard bot: entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build inference + medicine backends and the orchestrator
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Run comms channels until shutdown or stdin EOF

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use healthguard_bot::{comms, config, error::AppError, logger, triage::TriageOrchestrator};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if args.no_console {
        config.comms.pty.enabled = false;
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str()).to_string();
    logger::init(&effective_log_level, args.log_level.is_some(), config.log_file.as_deref())?;

    info!(
        bot_name = %config.bot_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        inference = %config.inference.provider,
        medicine = %config.medicine.provider,
        "config loaded"
    );

    if config.inference_api_key.is_none() && config.inference.provider != "dummy" {
        warn!("HF_API_KEY is not set, turns will run without disease inference");
    }

    let orchestrator = TriageOrchestrator::from_config(&config)?;

    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let console = config.comms_pty_should_load();
    let comms = comms::start(&config, orchestrator, shutdown.clone());

    // Without the console, only Ctrl-C or a channel error ends the process.
    let result = comms.join().await;
    shutdown.cancel();

    if console {
        println!("\nTake care :) ...");
    }

    result
}

struct CliArgs {
    log_level: Option<&'static str>,
    no_console: bool,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut no_console = false;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: healthguard-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                println!("      --no-console           Disable the stdin/stdout console channel");
                std::process::exit(0);
            }
            "--no-console" => no_console = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs { log_level: logger::verbosity_level(verbosity), no_console, config_path }
}
