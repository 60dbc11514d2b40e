use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use launchpad_core::{
    ConfigManager, InputEvent, Launchpad, LedColor, MappingMode, Settings,
};
use launchpad_midi::{list_ports, spawn_input_poller, MidirTransport};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Diagnostics for Novation Launchpad grid controllers.
#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(about = "Launchpad driver diagnostics")]
struct Args {
    /// Settings file (created with defaults if missing)
    #[arg(long, default_value = "launchpad.json")]
    config: PathBuf,

    /// MIDI port name pattern, overrides the settings file
    #[arg(short, long)]
    device: Option<String>,

    /// Use drum rack note mapping
    #[arg(long)]
    drum_rack: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List MIDI ports, marking the ones that match the device pattern
    Ports,
    /// Send a device inquiry and print the reply
    Identify {
        /// How long to wait for the reply
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,
    },
    /// Light every LED with a red/green gradient
    TestPattern {
        /// How long to keep the pattern up
        #[arg(long, default_value = "5")]
        seconds: u64,

        /// Blink the diagonal using hardware flashing
        #[arg(long)]
        flash: bool,
    },
    /// Light buttons while they are held, until Ctrl-C
    Echo,
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut manager = ConfigManager::new(Some(args.config.clone()));
    let mut settings = manager
        .load()
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(device) = &args.device {
        settings.device_pattern = device.clone();
    }
    if args.drum_rack {
        settings.mapping_mode = MappingMode::DrumRack;
    }

    if let Err(errors) = ConfigManager::validate_settings(&settings) {
        bail!("invalid settings: {}", errors.join(", "));
    }
    Ok(settings)
}

fn open(settings: &Settings) -> anyhow::Result<Launchpad<MidirTransport>> {
    let transport = MidirTransport::connect(settings)
        .with_context(|| format!("connecting to '{}'", settings.device_pattern))?;
    let mut launchpad = Launchpad::open(transport)?;
    launchpad.apply_settings(settings)?;
    Ok(launchpad)
}

fn ports(settings: &Settings) -> anyhow::Result<()> {
    let ports = list_ports(&settings.client_name)?;
    let matching = ports.matching(&settings.device_pattern);
    let marker = |names: &[String], name: &String| if names.contains(name) { "*" } else { " " };

    println!("Inputs:");
    for name in &ports.inputs {
        println!(" {} {}", marker(&matching.inputs, name), name);
    }
    println!("Outputs:");
    for name in &ports.outputs {
        println!(" {} {}", marker(&matching.outputs, name), name);
    }
    Ok(())
}

async fn identify(settings: &Settings, timeout: Duration) -> anyhow::Result<()> {
    let mut launchpad = open(settings)?;
    launchpad.request_device_inquiry()?;

    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        let device = launchpad.messages()?.find_map(|event| match event {
            InputEvent::Device(device) => Some(device),
            InputEvent::Button(_) => None,
        });
        if let Some(device) = device {
            println!("{} on {}", device, launchpad.transport().port_name());
            return Ok(launchpad.close()?);
        }
        tokio::time::sleep(Duration::from_millis(settings.poll_interval_ms)).await;
    }

    bail!("no device inquiry reply within {:?}", timeout)
}

async fn test_pattern(settings: &Settings, seconds: u64, flash: bool) -> anyhow::Result<()> {
    let mut launchpad = open(settings)?;
    launchpad.enable_offline_updates();

    for row in -1..8 {
        for column in 0..9 {
            let mut color = LedColor::new((column % 4) as u8, ((row + 1) % 4) as u8);
            if flash && column == row {
                color = LedColor::AMBER.flashing();
            }
            launchpad.set_led(column, row, color)?;
        }
    }
    launchpad.flush()?;
    if flash {
        launchpad.set_flashing(true)?;
    }
    log::info!("Test pattern up for {}s", seconds);

    tokio::time::sleep(Duration::from_secs(seconds)).await;
    Ok(launchpad.close()?)
}

async fn echo(settings: &Settings) -> anyhow::Result<()> {
    let launchpad = Arc::new(Mutex::new(open(settings)?));
    let (tx, mut rx) = mpsc::channel(64);
    let poller = spawn_input_poller(
        launchpad.clone(),
        Duration::from_millis(settings.poll_interval_ms),
        tx,
    );
    log::info!("Echoing button presses, Ctrl-C to quit");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                let color = if event.pressed { LedColor::AMBER } else { LedColor::OFF };
                launchpad
                    .lock()
                    .set_led(event.position.column, event.position.row, color)?;
            }
            _ = &mut ctrl_c => break,
            else => break,
        }
    }

    poller.abort();
    let _ = poller.await;
    match Arc::try_unwrap(launchpad) {
        Ok(launchpad) => Ok(launchpad.into_inner().close()?),
        // Still shared: the last owner resets it on drop
        Err(_) => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    match args.command {
        Command::Ports => ports(&settings),
        Command::Identify { timeout_ms } => {
            identify(&settings, Duration::from_millis(timeout_ms)).await
        }
        Command::TestPattern { seconds, flash } => test_pattern(&settings, seconds, flash).await,
        Command::Echo => echo(&settings).await,
    }
}
