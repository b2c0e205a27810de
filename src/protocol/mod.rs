//! Messages exchanged with the launcher.
//!
//! - [`Command`]: intents we hand to the transport (APP → device)
//! - [`Event`]: notifications the transport delivers (device → APP)
//!
//! The transport owns framing and delivery. Config slot payloads have a
//! fixed byte layout (see [`config`]) so a transport can carry them opaquely.

pub mod config;
pub mod status;

use crate::addr::SensorId;
use crate::sensor::{CalibrationKind, CalibrationRequest};

pub use config::{ConfigCommand, ConfigRequest, ConfigResponse, ConfigStatus};
pub use status::{ConnectionState, RangeUpdate};

// ---------------------------------------------------------------------------
// Command: intents we send to the device
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Config(ConfigRequest),
    /// Route measurements and calibration to one sensor.
    SelectSensor(SensorId),
    Calibrate(CalibrationRequest),
}

// ---------------------------------------------------------------------------
// Event: notifications from the device
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Range(RangeUpdate),
    Config(ConfigResponse),
    Connection(ConnectionState),
    SensorSelected(SensorId),
    CalibrationResult {
        sensor: SensorId,
        kind: CalibrationKind,
        success: bool,
        value: i32,
    },
}

/// Outbound side of the device link.
///
/// Sends are fire-and-forget: replies come back as [`Event`]s.
pub trait Link {
    fn send(&mut self, cmd: Command);
}

impl<F: FnMut(Command)> Link for F {
    fn send(&mut self, cmd: Command) {
        self(cmd)
    }
}
