//! touchctl - touchscreen discovery and tap injection over ADB
//!
//! Usage:
//!     touchctl [OPTIONS] <COMMAND>
//!
//! Environment Variables:
//!     TOUCH_AGENT_DEVICE_ID: ADB device serial for multi-device setups
//!     TOUCH_AGENT_ADB_PATH: Path to the adb executable (default: adb)
//!     TOUCH_AGENT_EVENT_PAIR_DELAY_MS: Pause between sendevent pairs (default: 50)
//!     TOUCH_AGENT_DEVICE_TMP_DIR: Device directory for event buffers (default: /data/local/tmp)
//!     RUST_LOG: Log filter, overrides --verbose

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::sync::mpsc;
use touch_agent::touch::{parse_dump, rank, INPUT_EVENT_SIZE};
use touch_agent::{
    decode, discover_with_source, encode, list_devices, monitor_events, tap, tap_sequence,
    AdbChannel, DeviceChannel, InjectionStrategy, MonitorEvent, ScreenSize, TouchError,
    TIMING_CONFIG,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Touch Agent - touchscreen discovery and synthetic taps
#[derive(Parser, Debug)]
#[command(name = "touchctl")]
#[command(about = "Touchscreen discovery and raw tap injection for Android devices")]
#[command(after_help = r#"Examples:
    # List connected devices
    touchctl devices

    # Show which input node is the touchscreen
    touchctl discover

    # Show every scored candidate
    touchctl discover --candidates

    # Tap the centre of a 1080x1920 screen with the default strategy
    touchctl tap 540 960

    # Tap on a specific device using a pushed binary buffer
    touchctl -d emulator-5554 tap 540 960 --strategy push

    # Watch raw touch events for 5 seconds
    touchctl monitor --device /dev/input/event3 --duration 5
"#)]
struct Cli {
    /// ADB device serial
    #[arg(short = 'd', long, env = "TOUCH_AGENT_DEVICE_ID", global = true)]
    device_id: Option<String>,

    /// Path to the adb executable
    #[arg(long, env = "TOUCH_AGENT_ADB_PATH", default_value = "adb", global = true)]
    adb_path: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List connected devices
    Devices,

    /// Discover the touchscreen input device
    Discover {
        /// Print every candidate with a positive score
        #[arg(long)]
        candidates: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inject a tap at screen pixel coordinates
    Tap {
        x: f64,
        y: f64,

        /// Injection strategy: sendevent, inline or push
        #[arg(short, long, default_value = "sendevent")]
        strategy: InjectionStrategy,

        /// Screen size as WIDTHxHEIGHT (queried from the device if omitted)
        #[arg(long, value_parser = parse_screen_size)]
        screen: Option<ScreenSize>,

        /// Print the tap report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stream raw getevent output
    Monitor {
        /// Limit capture to one input node
        #[arg(long)]
        device: Option<String>,

        /// Capture duration in seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Print the raw tap buffer for device coordinates as hex
    Encode { x: i32, y: i32 },
}

/// Parse `WIDTHxHEIGHT`
fn parse_screen_size(s: &str) -> std::result::Result<ScreenSize, String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {}", s))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad width: {}", e))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad height: {}", e))?;
    ScreenSize::new(width, height).ok_or_else(|| "screen size must be positive".to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("touch_agent={level},touchctl={level},warn", level = level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Check that adb is installed before talking to a device
fn check_adb(adb_path: &str) -> Result<()> {
    which::which(adb_path).map(|_| ()).map_err(|_| {
        anyhow!(
            "adb not found at '{}'. Install Android platform-tools or set --adb-path",
            adb_path
        )
    })
}

async fn handle_devices(adb_path: &str) -> Result<()> {
    let devices = list_devices(adb_path).await?;
    if devices.is_empty() {
        println!("No devices connected.");
        return Ok(());
    }

    println!("Connected devices:");
    println!("{}", "-".repeat(60));
    for device in devices {
        let status_icon = if device.is_ready() { "\u{2713}" } else { "\u{2717}" };
        let model_info = device
            .model
            .map(|m| format!(" ({})", m))
            .unwrap_or_default();
        println!(
            "  {} {:<30} [{:?}]{}",
            status_icon, device.device_id, device.connection_type, model_info
        );
    }
    Ok(())
}

async fn handle_discover(channel: &AdbChannel, candidates: bool, json: bool) -> Result<()> {
    if candidates {
        let output = channel.shell(&["getevent", "-lp"]).await?;
        let ranked = rank(parse_dump(&output.stdout).candidates);
        if ranked.is_empty() {
            println!("No candidate scored above zero.");
        }
        for candidate in &ranked {
            println!(
                "  {:>5}  {:<20} {}",
                candidate.score, candidate.device_path, candidate.name
            );
        }
        println!();
    }

    let (info, source) = discover_with_source(channel).await;
    if json {
        let value = serde_json::json!({ "device": info, "source": source });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Touch device: {} (id {})", info.path, info.id);
        println!("  X range: {}..{}", info.min_x, info.max_x);
        println!("  Y range: {}..{}", info.min_y, info.max_y);
        println!("  Source:  {:?}", source);
    }
    Ok(())
}

/// Point at the connection when the device itself could not be reached
fn describe_failure(err: TouchError) -> anyhow::Error {
    if err.is_communication() {
        anyhow!("{}\nCheck that the device is connected and authorised (touchctl devices)", err)
    } else {
        err.into()
    }
}

async fn handle_tap(
    channel: &AdbChannel,
    x: f64,
    y: f64,
    strategy: InjectionStrategy,
    screen: Option<ScreenSize>,
    json: bool,
) -> Result<()> {
    let injector = strategy.injector();
    let report = tap(injector.as_ref(), channel, x, y, screen)
        .await
        .map_err(describe_failure)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "\u{2713} Tapped ({}, {}) -> {} ({}, {}) via {}",
            x, y, report.device.path, report.device_x, report.device_y, report.strategy
        );
    }
    Ok(())
}

async fn handle_monitor(
    channel: &AdbChannel,
    device: Option<String>,
    duration: Option<u64>,
) -> Result<()> {
    let seconds = duration.unwrap_or(TIMING_CONFIG.monitor.default_duration);
    let duration = Duration::from_secs(seconds);
    let (tx, mut rx) = mpsc::channel(256);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                MonitorEvent::Line { received_at, text } => {
                    println!("{} {}", received_at.format("%H:%M:%S%.3f"), text)
                }
                MonitorEvent::Finished { exit_code } => {
                    eprintln!("getevent finished (exit code {:?})", exit_code)
                }
            }
        }
    });

    monitor_events(channel, device.as_deref(), duration, tx).await?;
    printer.await?;
    Ok(())
}

fn handle_encode(x: i32, y: i32) {
    let buf = encode(&tap_sequence(x, y));
    for (record, event) in buf.chunks(INPUT_EVENT_SIZE).zip(decode(&buf)) {
        let hex: Vec<String> = record.iter().map(|b| format!("{:02x}", b)).collect();
        println!(
            "{}  type={} code={} value={}",
            hex.join(" "),
            event.event_type,
            event.code,
            event.value
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Command::Encode { x, y } = args.command {
        handle_encode(x, y);
        return Ok(());
    }

    check_adb(&args.adb_path)?;
    let channel = AdbChannel::with_path(&args.adb_path, args.device_id.as_deref());
    debug!(
        "Using {} (serial: {:?})",
        channel.adb_path(),
        channel.serial()
    );

    match args.command {
        Command::Devices => handle_devices(&args.adb_path).await,
        Command::Discover { candidates, json } => {
            handle_discover(&channel, candidates, json).await
        }
        Command::Tap {
            x,
            y,
            strategy,
            screen,
            json,
        } => handle_tap(&channel, x, y, strategy, screen, json).await,
        Command::Monitor { device, duration } => handle_monitor(&channel, device, duration).await,
        Command::Encode { .. } => Ok(()),
    }
}
