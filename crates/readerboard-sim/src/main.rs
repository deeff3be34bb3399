//! Readerboard Simulator
//!
//! Runs the readerboard core on a host machine: stdin/stdout stand in
//! for the USB serial channel, an optional serial port carries RS-485
//! bus traffic, and a timer drives the animation tick. The display can
//! be echoed to stderr as ASCII art.

mod store;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use readerboard_core::device::Annunciator;
use readerboard_core::{
    ConfigStore, Device, HardwareSpec, ModelClass, NullStore,
};
use store::TomlStore;

#[derive(Parser, Debug)]
#[command(name = "rbsim", about = "Readerboard firmware core simulator", version)]
struct Args {
    /// Hardware model class: rgb, monochrome, or busylight
    #[arg(long, default_value = "rgb")]
    model: String,

    /// Display width in columns (ignored for busylight)
    #[arg(long, default_value_t = 64)]
    columns: usize,

    /// Serial port carrying RS-485 bus traffic
    #[arg(long)]
    port: Option<String>,

    /// Settings file standing in for the EEPROM
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Animation tick interval in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Echo the display to stderr as ASCII art when it changes
    #[arg(long)]
    sketch: bool,
}

/// Logs annunciator requests instead of making noise.
#[derive(Debug, Default)]
struct LogAnnunciator;

impl Annunciator for LogAnnunciator {
    fn morse(&mut self, led: Option<u8>, message: &[u8]) {
        info!(led = ?led, message = %String::from_utf8_lossy(message), "morse");
    }

    fn play(&mut self, repeat: bool, notes: &[u8]) {
        info!(repeat, notes = %String::from_utf8_lossy(notes), "tone sequence");
    }

    fn stop(&mut self) {
        info!("annunciator stopped");
    }
}

fn build_hardware(args: &Args) -> Result<HardwareSpec> {
    let model: ModelClass = args.model.parse()?;
    let mut hw = match model {
        ModelClass::Rgb => HardwareSpec::rgb_64x8(),
        ModelClass::Monochrome => HardwareSpec::mono_64x8(),
        ModelClass::Busylight => HardwareSpec::busylight(),
    };
    if hw.has_matrix() {
        hw.columns = args.columns;
    }
    Ok(hw)
}

/// Reads from the bus port when one is open; never resolves otherwise
/// so the select loop simply skips the branch.
async fn read_bus(port: &mut Option<SerialStream>, buf: &mut [u8]) -> std::io::Result<usize> {
    match port {
        Some(port) => port.read(buf).await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let hw = build_hardware(&args)?;
    info!(model = %hw.model, columns = hw.columns, "starting simulator");

    let store: Box<dyn ConfigStore> = match &args.settings {
        Some(path) => Box::new(TomlStore::new(path.clone())),
        None => Box::new(NullStore),
    };
    let mut device = Device::new(hw, store, Box::new(LogAnnunciator));

    let mut bus_port = match &args.port {
        Some(path) => {
            let rate = device.config().rs485_speed.rate();
            let port = tokio_serial::new(path.as_str(), rate)
                .open_native_async()
                .with_context(|| format!("opening bus port {path}"))?;
            info!(port = %path, rate, "bus port open");
            Some(port)
        }
        None => None,
    };

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut tick = tokio::time::interval(Duration::from_millis(args.tick_ms));
    let mut usb_buf = [0u8; 512];
    let mut bus_buf = [0u8; 512];
    let mut reply = Vec::new();
    let mut last_sketch = Vec::new();

    loop {
        reply.clear();
        tokio::select! {
            read = stdin.read(&mut usb_buf) => {
                let n = read.context("reading stdin")?;
                if n == 0 {
                    info!("stdin closed, shutting down");
                    break;
                }
                device.feed_usb(&usb_buf[..n], &mut reply);
                if !reply.is_empty() {
                    stdout.write_all(&reply).await?;
                    stdout.flush().await?;
                }
            }
            read = read_bus(&mut bus_port, &mut bus_buf) => {
                match read {
                    Ok(0) => {
                        warn!("bus port closed");
                        bus_port = None;
                    }
                    Ok(n) => {
                        device.feed_bus(&bus_buf[..n], &mut reply);
                        if !reply.is_empty() {
                            if let Some(port) = bus_port.as_mut() {
                                port.write_all(&reply).await?;
                                port.flush().await?;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "bus read failed");
                        bus_port = None;
                    }
                }
            }
            _ = tick.tick() => {
                device.tick();
                if args.sketch {
                    let sketch = device.display().sketch();
                    if sketch != last_sketch {
                        for row in &sketch {
                            eprintln!("{row}");
                        }
                        eprintln!();
                        last_sketch = sketch;
                    }
                }
            }
        }
    }
    Ok(())
}
