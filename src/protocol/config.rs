//! Config slot requests, responses and slot catalogs.

use std::fmt;

use serde::Serialize;

use crate::addr::ConfigTarget;
use crate::codec;
use crate::error::{ConfigError, Result};

// ---------------------------------------------------------------------------
// Device user-data slots
// ---------------------------------------------------------------------------

pub const SLOT_FORCE_OFFSET: usize = 0;
pub const SLOT_EFFICIENCY: usize = 1;
pub const SLOT_FRICTION_COEFFICIENT: usize = 2;
pub const SLOT_SPRING_ID: usize = 3;

/// How a slot's 32-bit value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotKind {
    /// Plain integer
    Int,
    /// IEEE-754 `f32` bit pattern
    Float,
    /// Spring catalog id
    SpringId,
}

/// A named slot in a target's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotDef {
    pub name: &'static str,
    pub kind: SlotKind,
}

impl SlotDef {
    pub const fn new(name: &'static str, kind: SlotKind) -> Self {
        Self { name, kind }
    }
}

/// User ballistic data held by the device, in index order.
pub const DEVICE_USER_SLOTS: [SlotDef; 4] = [
    SlotDef::new("force_offset", SlotKind::Float),
    SlotDef::new("efficiency", SlotKind::Float),
    SlotDef::new("friction_coefficient", SlotKind::Float),
    SlotDef::new("spring_id", SlotKind::SpringId),
];

// ---------------------------------------------------------------------------
// Command / status bytes
// ---------------------------------------------------------------------------

/// Operation on one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ConfigCommand {
    Get = 0x01,
    Set = 0x02,
    /// Restore the slot's factory value
    Reset = 0x03,
    /// Commit the slot to non-volatile storage
    Store = 0x04,
}

impl ConfigCommand {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x01 => Ok(Self::Get),
            0x02 => Ok(Self::Set),
            0x03 => Ok(Self::Reset),
            0x04 => Ok(Self::Store),
            _ => Err(ConfigError::UnknownCommand { byte: b }),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ConfigCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Set => "SET",
            Self::Reset => "RESET",
            Self::Store => "STORE",
        };
        f.write_str(s)
    }
}

/// Device verdict on a slot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ConfigStatus {
    /// Value read back unchanged
    Ok = 0x00,
    /// Value written
    Updated = 0x01,
    /// Stored value differs from the working value
    Mismatch = 0x02,
    Error = 0x03,
    /// Slot not available on this target
    Na = 0x04,
}

impl ConfigStatus {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Self::Ok),
            0x01 => Ok(Self::Updated),
            0x02 => Ok(Self::Mismatch),
            0x03 => Ok(Self::Error),
            0x04 => Ok(Self::Na),
            _ => Err(ConfigError::UnknownStatus { byte: b }),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether the response carries a usable value.
    pub fn has_value(self) -> bool {
        matches!(self, Self::Ok | Self::Updated | Self::Mismatch)
    }
}

impl fmt::Display for ConfigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Updated => "UPDATED",
            Self::Mismatch => "MISMATCH",
            Self::Error => "ERROR",
            Self::Na => "NA",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Slot request (7 bytes).
///
/// Format: `[target command slot value(i32 LE)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRequest {
    pub target: ConfigTarget,
    pub command: ConfigCommand,
    pub slot: u8,
    pub value: i32,
}

impl ConfigRequest {
    pub const LEN: usize = 7;

    pub fn get(target: ConfigTarget, slot: u8) -> Self {
        Self {
            target,
            command: ConfigCommand::Get,
            slot,
            value: 0,
        }
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::LEN {
            return Err(ConfigError::payload_too_short("ConfigRequest", Self::LEN, payload.len()));
        }
        Ok(Self {
            target: ConfigTarget::from_byte(payload[0])?,
            command: ConfigCommand::from_byte(payload[1])?,
            slot: payload[2],
            value: codec::read_int32_le(payload, 3)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![self.target.as_byte(), self.command.as_byte(), self.slot];
        codec::write_int32_le(&mut buf, self.value);
        buf
    }
}

/// Slot response (7 bytes).
///
/// Format: `[target slot value(i32 LE) status]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigResponse {
    pub target: ConfigTarget,
    pub slot: u8,
    pub value: i32,
    pub status: ConfigStatus,
}

impl ConfigResponse {
    pub const LEN: usize = 7;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::LEN {
            return Err(ConfigError::payload_too_short("ConfigResponse", Self::LEN, payload.len()));
        }
        Ok(Self {
            target: ConfigTarget::from_byte(payload[0])?,
            slot: payload[1],
            value: codec::read_int32_le(payload, 2)?,
            status: ConfigStatus::from_byte(payload[6])?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![self.target.as_byte(), self.slot];
        codec::write_int32_le(&mut buf, self.value);
        buf.push(self.status.as_byte());
        buf
    }
}
