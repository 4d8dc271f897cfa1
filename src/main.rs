// SPDX-License-Identifier: GPL-2.0
//! mled - send a message as Morse code on the CAPS LOCK LED
//!
//! Usage:
//!   mled [-v] [FILE]      # Morse from FILE or standard input
//!   mled -t               # Current time as binary (hour, then minute)
//!
//! Needs root for the console LED ioctls. The LED state found at startup
//! is put back on exit, including Ctrl-C, Ctrl-\, Ctrl-Z and SIGTERM.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, error, info, warn};

use mled::interrupt::{self, EXIT_FAILURE};
use mled::{
    clock, stream, Blinker, ClockTime, Console, Interrupt, Led, MorseEncoder, SnapshotGuard,
    CONSOLE_PATH,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time the signal handler waits for the main flow to restore the LEDs
const INTERRUPT_GRACE: Duration = Duration::from_millis(500);

/// Sends a message from stdin as morsecode to your CAPS LOCK led
#[derive(Parser)]
#[command(name = "mled", version = VERSION, about)]
struct Cli {
    /// Print dots and dashes while sending
    #[arg(short, long)]
    verbose: bool,

    /// Send the current time as binary instead of reading input
    #[arg(short, long)]
    time: bool,

    /// Indicator to blink
    #[arg(short, long, value_enum, default_value_t = Led::Caps)]
    led: Led,

    /// Debug logging
    #[arg(short, long)]
    debug: bool,

    /// Read the message from FILE instead of standard input
    file: Option<PathBuf>,
}

fn setup_logging(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !nix::unistd::geteuid().is_root() {
        bail!("program must be run as superuser");
    }

    debug!(
        "[{}] mled v{}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        VERSION
    );

    let console = Console::open(CONSOLE_PATH)?;

    let input: Option<Box<dyn Read>> = if cli.time {
        None
    } else {
        Some(match &cli.file {
            Some(path) => Box::new(
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
            ),
            None => Box::new(io::stdin().lock()),
        })
    };

    let interrupt = Interrupt::new();
    let guard = SnapshotGuard::new(console.clone())
        .context("Failed to read LED state")?
        .with_interrupt(interrupt.clone());
    let saved = guard.saved();

    install_signal_handler(&interrupt, console, saved);

    let leds = cli.led.mask();
    info!("Blinking {} LED", cli.led);

    let mut blinker = Blinker::new(guard, interrupt);
    let result = match input {
        None => clock::run(&mut blinker, leds, ClockTime::now(), &mut io::stdout()),
        Some(input) => {
            let mut stdout = io::stdout();
            let trace: Option<&mut dyn io::Write> = if cli.verbose {
                Some(&mut stdout)
            } else {
                None
            };
            let mut encoder = MorseEncoder::new(&mut blinker, leds, trace);
            stream::run(input, &mut encoder).map(|stats| {
                if stats.skipped > 0 {
                    warn!("Skipped {} unsupported bytes", stats.skipped);
                }
            })
        }
    };

    // Restore before reporting, on success and on failure alike
    let restored = blinker.into_device().restore();

    match result {
        Err(e) if !e.is_interrupt() => {
            if let Err(re) = restored {
                warn!("Failed to restore LED state: {}", re);
            }
            Err(e.into())
        }
        other => {
            if other.is_err() {
                info!("Interrupted, LED state restored");
            }
            restored.context("Failed to restore LED state")?;
            Ok(())
        }
    }
}

/// SIGINT, SIGTERM, SIGHUP, SIGQUIT and SIGTSTP stop blinking and restore `saved`
fn install_signal_handler(token: &Interrupt, console: Console, saved: u8) {
    let mut console = console;
    let installed = interrupt::install(token, INTERRUPT_GRACE, move || {
        // Main flow is stuck (e.g. blocked on stdin): restore from here
        std::process::exit(interrupt::restore_from_handler(&mut console, saved));
    });

    if let Err(e) = installed {
        warn!("Could not set signal handler: {}", e);
    }
}
