//! Build Alarm CLI Application
//!
//! Command-line front end for the build alarm bridge. It wires together
//! the alarm-bridge library pieces and adds:
//! - Command-line option parsing and config.toml loading
//! - Credential prompting (basic-auth username/password)
//! - Serial port auto-discovery when no port is given
//! - The forever poll loop: fetch, map, send, acknowledge, sleep

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use alarm_bridge::{ports, AlarmDevice, WaterfallClient};

mod config;

/// Build alarm bridge - relay waterfall build status to a serial indicator
#[derive(Parser, Debug)]
#[command(name = "alarm-cli")]
#[command(about = "Poll a Buildbot waterfall and drive a serial alarm device", long_about = None)]
#[command(version)]
struct Args {
    /// Serial port of the alarm device (auto-discovered if omitted)
    #[arg(short, long, value_name = "PORT")]
    port: Option<String>,

    /// Serial connection baud rate [default: 19200]
    #[arg(short, long, value_name = "BAUD")]
    baud: Option<u32>,

    /// Serial read timeout in seconds [default: 15]
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print more information (request URLs, packed bytes, ack lines)
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Waterfall base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// HTTP basic-auth username (prompted for if omitted)
    #[arg(short, long, value_name = "USER")]
    user: Option<String>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.debug);

    log::info!("Build alarm bridge v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using bridge library v{}", alarm_bridge::VERSION);

    // Resolve configuration: file (or defaults), then CLI overrides
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };
    config.apply_overrides(args.port, args.baud, args.timeout, args.base_url, args.user);

    // Resolve the serial port, scanning for a USB adapter when unset
    let port = match config.serial.port.clone() {
        Some(port) => port,
        None => ports::discover()
            .context("Port not found, please connect device or set with --port")?,
    };

    log::debug!("PORT {}", port);
    log::debug!("BAUD {}", config.serial.baud);
    log::debug!("TIMEOUT {}s", config.serial.timeout_secs);

    // Connect to the serial port and wait for the device reboot
    let mut device = AlarmDevice::open(
        &port,
        config.serial.baud,
        Duration::from_secs(config.serial.timeout_secs),
        Duration::from_secs(config.serial.startup_delay_secs),
    )
    .context("Serial connection could not be established")?;

    // Username and password input
    let username = match config.username.clone() {
        Some(user) => user,
        None => prompt_username()?,
    };
    let password =
        rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let client = WaterfallClient::new(&config.base_url, username, password)
        .context("Failed to build HTTP client")?;

    poll_loop(&config, &client, &mut device)
}

/// Poll every configured build forever, relaying each outcome to the device
///
/// Fetch and serial failures inside the loop are logged and skipped; only
/// setup problems abort the program.
fn poll_loop<T: Read + Write>(
    config: &config::AppConfig,
    client: &WaterfallClient,
    device: &mut AlarmDevice<T>,
) -> Result<()> {
    let ack_delay = Duration::from_secs(config.poll.ack_delay_secs);
    let interval = Duration::from_secs(config.poll.interval_secs);

    loop {
        for build in &config.builds {
            let status = match client.fetch_status(build) {
                Ok(status) => status,
                Err(e) => {
                    log::error!("Fetching status for {} failed: {}", build, e);
                    continue;
                }
            };

            let magnitude = status.magnitude();
            log::info!("{} {}", status, magnitude);
            log::debug!("packed: {}", hex(&magnitude.to_bytes()));

            if let Err(e) = device.send(magnitude) {
                log::error!("Serial write for {} failed: {}", build, e);
                continue;
            }

            // Give the device time to act before asking for confirmation
            thread::sleep(ack_delay);

            match device.read_ack() {
                Ok(ack) if !ack.is_empty() => log::debug!("ack: {}", ack),
                Ok(_) => log::debug!("no ack received"),
                Err(e) => log::error!("Ack read for {} failed: {}", build, e),
            }
        }

        // Wait before the next polling pass
        thread::sleep(interval);
    }
}

/// Prompt for the basic-auth username on stdin
fn prompt_username() -> Result<String> {
    print!("Username: ");
    std::io::stdout().flush()?;
    let mut username = String::new();
    std::io::stdin()
        .read_line(&mut username)
        .context("Failed to read username")?;
    Ok(username.trim().to_string())
}

/// Lowercase hex dump of the packed wire bytes
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Initialize logging based on the debug flag
fn init_logging(debug: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex(&[0x00, 0x00, 0xa0, 0x40]), "0000a040");
        assert_eq!(hex(&[]), "");
    }
}
