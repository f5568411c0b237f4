//! Build Alarm Bridge Library
//!
//! A small, synchronous library for relaying CI build outcomes to a
//! physical indicator device over a serial link.
//!
//! # Architecture
//!
//! The library covers the three sides of the bridge:
//! - Fetching per-build status JSON from a Buildbot waterfall over HTTP
//!   basic auth ([`WaterfallClient`])
//! - Deriving the one-float alarm signal from a status string and packing
//!   it into the 4-byte wire format ([`Magnitude`])
//! - Talking to the device: serial port discovery, magnitude writes,
//!   acknowledgement reads ([`AlarmDevice`])
//!
//! Everything is blocking; there is no runtime, no threads, no state
//! beyond the open connections. Polling cadence, configuration, and
//! credentials are the application layer's business (alarm-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use alarm_bridge::{AlarmDevice, WaterfallClient, ports};
//! use std::time::Duration;
//!
//! let port = ports::discover().unwrap();
//! let mut device = AlarmDevice::open(
//!     &port,
//!     19200,
//!     Duration::from_secs(15),
//!     Duration::from_secs(10),
//! )
//! .unwrap();
//!
//! let client = WaterfallClient::new("https://bb.example.org", "user", "secret").unwrap();
//! let status = client.fetch_status("full").unwrap();
//! device.send(status.magnitude()).unwrap();
//! let ack = device.read_ack().unwrap();
//! println!("{} -> {}", status, ack);
//! ```

// Public modules
pub mod alarm;
pub mod ports;
pub mod types;
pub mod waterfall;

// Re-export main types for convenience
pub use alarm::AlarmDevice;
pub use types::{BridgeError, BuildStatus, Magnitude, Result, Timestamp};
pub use waterfall::WaterfallClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
