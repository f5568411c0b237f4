//! Core types for the alarm bridge library
//!
//! This module defines the data model shared by the bridge: the per-build
//! status fetched from the waterfall, the magnitude signal derived from it,
//! and the error type used throughout the library.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used throughout the bridge
pub type Timestamp = DateTime<Utc>;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Status string the waterfall reports for a passing build
pub const STATUS_SUCCESSFUL: &str = "successful";

/// Magnitude sent for a passing build
pub const MAGNITUDE_SUCCESS: f32 = 5.0;

/// Magnitude sent for any other outcome, or when no status was reported
pub const MAGNITUDE_FAILURE: f32 = 1.0;

/// Errors that can occur while bridging the waterfall to the device
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("No alarm device found among available serial ports")]
    NoPortFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Latest known outcome of one named build on the waterfall
///
/// The status string comes straight from the dashboard; `None` means the
/// waterfall had no text for either of the two most recent builds.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildStatus {
    /// Builder name as listed on the waterfall
    pub build: String,
    /// Reported status string (e.g. "successful", "failed"), if any
    pub status: Option<String>,
    /// When this status was fetched
    pub fetched_at: Timestamp,
}

impl BuildStatus {
    /// Derive the alarm magnitude for this status
    pub fn magnitude(&self) -> Magnitude {
        Magnitude::from_status(self.status.as_deref())
    }

    /// True if the waterfall reported this build as passing
    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESSFUL)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} {}", self.build, status),
            None => write!(f, "{} (no status)", self.build),
        }
    }
}

/// Alarm-intensity signal sent to the hardware device
///
/// Transmitted over the wire as a 4-byte little-endian IEEE-754 float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude(f32);

impl Magnitude {
    /// Map a waterfall status string to a magnitude
    ///
    /// Exactly "successful" maps to the success magnitude; any other
    /// string, or a missing status, maps to the failure magnitude.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some(STATUS_SUCCESSFUL) => Magnitude(MAGNITUDE_SUCCESS),
            _ => Magnitude(MAGNITUDE_FAILURE),
        }
    }

    /// The raw float value
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Pack the magnitude into the 4-byte wire format
    pub fn to_bytes(&self) -> [u8; 4] {
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, self.0);
        buf
    }

    /// Unpack a magnitude from the 4-byte wire format
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Magnitude(LittleEndian::read_f32(&bytes))
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_status_magnitude() {
        assert_eq!(
            Magnitude::from_status(Some("successful")).value(),
            MAGNITUDE_SUCCESS
        );
    }

    #[test]
    fn test_other_statuses_magnitude() {
        assert_eq!(Magnitude::from_status(Some("failed")).value(), MAGNITUDE_FAILURE);
        assert_eq!(Magnitude::from_status(Some("")).value(), MAGNITUDE_FAILURE);
        assert_eq!(
            Magnitude::from_status(Some("Successful")).value(),
            MAGNITUDE_FAILURE
        ); // case-sensitive
        assert_eq!(Magnitude::from_status(None).value(), MAGNITUDE_FAILURE);
    }

    #[test]
    fn test_bytes_round_trip() {
        for mag in [MAGNITUDE_SUCCESS, MAGNITUDE_FAILURE, 0.0, -3.25] {
            let m = Magnitude(mag);
            assert_eq!(Magnitude::from_bytes(m.to_bytes()), m);
        }
    }

    #[test]
    fn test_packing_is_little_endian() {
        let m = Magnitude(MAGNITUDE_SUCCESS);
        assert_eq!(m.to_bytes(), 5.0_f32.to_le_bytes());
    }

    #[test]
    fn test_build_status_helpers() {
        let status = BuildStatus {
            build: "full".to_string(),
            status: Some("successful".to_string()),
            fetched_at: Utc::now(),
        };
        assert!(status.is_successful());
        assert_eq!(status.magnitude().value(), MAGNITUDE_SUCCESS);
        assert_eq!(format!("{}", status), "full successful");

        let missing = BuildStatus {
            build: "style".to_string(),
            status: None,
            fetched_at: Utc::now(),
        };
        assert!(!missing.is_successful());
        assert_eq!(missing.magnitude().value(), MAGNITUDE_FAILURE);
        assert_eq!(format!("{}", missing), "style (no status)");
    }
}
