//! Serial port discovery
//!
//! Finds the alarm device when no port is given on the command line.
//! Enumerates the serial ports the OS knows about and picks the first one
//! whose path looks like a USB-serial adapter.

use crate::types::{BridgeError, Result};

/// Path substrings that identify USB-serial adapters
///
/// "usbserial"/"usbmodem" are the macOS device names, "ttyUSB"/"ttyACM"
/// the Linux ones (ACM is what Arduinos enumerate as).
pub const USB_PATTERNS: &[&str] = &["usbserial", "usbmodem", "ttyUSB", "ttyACM"];

/// Pick the first candidate path that looks like a USB-serial adapter
///
/// Returns `None` when no path contains a recognized substring.
pub fn select_port<'a>(names: &'a [String]) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| USB_PATTERNS.iter().any(|pattern| name.contains(pattern)))
}

/// List the paths of all serial ports present on the system
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Discover the alarm device's serial port
///
/// # Returns
/// * `Ok(path)` - first available port matching the USB-adapter heuristic
/// * `Err(BridgeError::NoPortFound)` - no port matched
pub fn discover() -> Result<String> {
    let names = list_ports()?;
    log::debug!("Available serial ports: {:?}", names);
    select_port(&names)
        .map(str::to_string)
        .ok_or(BridgeError::NoPortFound)
}
