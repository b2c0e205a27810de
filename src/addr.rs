use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Time-of-flight sensors on the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SensorId {
    /// Short-range sensor behind the carriage (carriage position)
    Short = 0x00,
    /// Long-range sensor under the barrel (device height)
    Long = 0x01,
}

impl SensorId {
    pub const ALL: [SensorId; 2] = [SensorId::Short, SensorId::Long];

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Self::Short),
            0x01 => Some(Self::Long),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Index into per-sensor arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => write!(f, "SHORT"),
            Self::Long => write!(f, "LONG"),
        }
    }
}

/// Owner of a config slot catalog on the remote device.
///
/// Wire byte: `0x10` for device user data, `0x20 | sensor` for a sensor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigTarget {
    /// Device-level user ballistic data
    Device,
    /// Driver settings of one sensor
    Sensor(SensorId),
}

impl ConfigTarget {
    pub const ALL: [ConfigTarget; 3] = [
        ConfigTarget::Device,
        ConfigTarget::Sensor(SensorId::Short),
        ConfigTarget::Sensor(SensorId::Long),
    ];

    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x10 => Ok(Self::Device),
            0x20..=0x2F => SensorId::from_byte(b & 0x0F)
                .map(Self::Sensor)
                .ok_or(ConfigError::UnknownTarget { byte: b }),
            _ => Err(ConfigError::UnknownTarget { byte: b }),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Device => 0x10,
            Self::Sensor(id) => 0x20 | id.as_byte(),
        }
    }
}

impl fmt::Display for ConfigTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "DEVICE"),
            Self::Sensor(id) => write!(f, "SENSOR/{id}"),
        }
    }
}
