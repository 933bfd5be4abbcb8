//! Wiegand keypad reader, driven by a scripted keypad.
//!
//! Decodes what the script puts on a pair of mock data lines exactly as the
//! reader would on hardware, and prints every service call as a JSON line on
//! stdout. Logs go to stderr.

mod script;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use wiegand_core::constants::{IDLE_TIMEOUT_MS, SILENCE_THRESHOLD_MS};
use wiegand_hardware::mock::MockWiegandLines;
use wiegand_hardware::{ConsoleServiceCaller, MonotonicClock, SharedClock};
use wiegand_reader::{ReaderConfig, ReaderEvent, ReaderHandle, WiegandReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reader configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service invoked with each entered code
    #[arg(short, long)]
    service: Option<String>,

    /// Pin wired to D0
    #[arg(long)]
    d0: Option<u8>,

    /// Pin wired to D1
    #[arg(long)]
    d1: Option<u8>,

    /// Keypad script to play, `-` for stdin
    #[arg(long, default_value = "-")]
    script: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Configuration file (or defaults) with command line overrides applied.
    fn reader_config(&self) -> Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => ReaderConfig::default(),
        };

        if let Some(service) = &self.service {
            config.service = service.clone();
        }
        if let Some(d0) = self.d0 {
            config.d0_pin = d0;
        }
        if let Some(d1) = self.d1 {
            config.d1_pin = d1;
        }

        config.validate()?;
        Ok(config)
    }

    fn read_script(&self) -> Result<String> {
        if self.script == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading script from stdin")?;
            return Ok(text);
        }
        fs::read_to_string(&self.script).with_context(|| format!("reading {}", self.script))
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn log_event(event: &ReaderEvent) {
    match event {
        ReaderEvent::FrameDecoded { frame } => info!(%frame, "Frame decoded"),
        ReaderEvent::FrameDiscarded { reason } => warn!(%reason, "Frame discarded"),
        ReaderEvent::CodeSent { call, trigger, at } => {
            debug!(%call, %trigger, %at, "Code sent")
        }
        ReaderEvent::SendFailed { call, error, .. } => warn!(%call, %error, "Code not sent"),
        ReaderEvent::SourceError { source, error } => {
            error!(%source, %error, "Edge source failed")
        }
        _ => {}
    }
}

/// Log reader events until `until` completes.
async fn follow_events<F>(handle: &mut ReaderHandle, until: F) -> F::Output
where
    F: Future,
{
    tokio::pin!(until);
    loop {
        tokio::select! {
            output = &mut until => return output,
            Some(event) = handle.recv() => log_event(&event),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.reader_config()?;
    let steps = script::parse(&args.read_script()?)?;
    info!(steps = steps.len(), service = %config.service, "Loaded script");

    let clock: SharedClock = Arc::new(MonotonicClock::new());
    let mut reader = WiegandReader::new(
        config.clone(),
        ConsoleServiceCaller::stdout(),
        clock.clone(),
    )?;

    let (mut lines, keypad) = MockWiegandLines::new(clock);
    lines.set_pins(config.pins());
    reader.register_edge_source(lines);

    let mut handle = reader.start();

    // One full poll after the lines go quiet, so frames never merge.
    let frame_gap = config.poll_interval() + Duration::from_millis(SILENCE_THRESHOLD_MS * 2);
    follow_events(&mut handle, script::run(&steps, &keypad, frame_gap)).await?;

    // Let a trailing code without `#` time out.
    let settle = Duration::from_millis(IDLE_TIMEOUT_MS) + config.poll_interval() * 2;
    follow_events(&mut handle, tokio::time::sleep(settle)).await;

    let stats = handle.stats();
    info!(
        frames = stats.frames_decoded,
        discarded = stats.frames_discarded,
        codes = stats.codes_sent,
        "Script finished"
    );

    handle.shutdown().await?;
    Ok(())
}
