//! Link state and range samples.

use std::fmt;

use serde::Serialize;

use crate::addr::SensorId;
use crate::codec;
use crate::error::{ConfigError, Result};

/// Transport link state reported by the device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[repr(u8)]
pub enum ConnectionState {
    Connecting = 0x01,
    /// Link up and the device accepts requests
    Ready = 0x02,
    #[default]
    Disconnected = 0x00,
}

impl ConnectionState {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Self::Disconnected),
            0x01 => Some(Self::Connecting),
            0x02 => Some(Self::Ready),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "CONNECTING",
            Self::Ready => "READY",
            Self::Disconnected => "DISCONNECTED",
        };
        f.write_str(s)
    }
}

/// Range sample (5 bytes).
///
/// Format: `[sensor range_mm(i32 LE)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeUpdate {
    pub sensor: SensorId,
    pub range_mm: i32,
}

impl RangeUpdate {
    pub const LEN: usize = 5;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::LEN {
            return Err(ConfigError::payload_too_short("RangeUpdate", Self::LEN, payload.len()));
        }
        let sensor = SensorId::from_byte(payload[0])
            .ok_or(ConfigError::UnknownTarget { byte: payload[0] })?;
        Ok(Self {
            sensor,
            range_mm: codec::read_int32_le(payload, 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_bytes() {
        for s in [
            ConnectionState::Connecting,
            ConnectionState::Ready,
            ConnectionState::Disconnected,
        ] {
            assert_eq!(ConnectionState::from_byte(s.as_byte()), Some(s));
        }
        assert_eq!(ConnectionState::from_byte(0x7F), None);
        assert!(ConnectionState::Ready.is_ready());
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn range_update() {
        let r = RangeUpdate::decode(&[0x01, 0xE8, 0x03, 0x00, 0x00]).unwrap();
        assert_eq!(r.sensor, SensorId::Long);
        assert_eq!(r.range_mm, 1000);
        assert!(RangeUpdate::decode(&[0x05, 0, 0, 0, 0]).is_err());
        assert!(RangeUpdate::decode(&[0x00]).is_err());
    }
}
