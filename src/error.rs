use thiserror::Error;

use crate::addr::ConfigTarget;

/// Errors arising from config protocol decoding and slot addressing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown config target 0x{byte:02X}")]
    UnknownTarget { byte: u8 },

    #[error("unknown config command 0x{byte:02X}")]
    UnknownCommand { byte: u8 },

    #[error("unknown config status 0x{byte:02X}")]
    UnknownStatus { byte: u8 },

    #[error("unknown sensor driver 0x{byte:02X}")]
    UnknownDriver { byte: u8 },

    #[error("slot {slot} out of range for {target} ({len} slots)")]
    UnknownSlot {
        target: ConfigTarget,
        slot: usize,
        len: usize,
    },

    #[error("payload too short for {what}: need {need} bytes, got {got}")]
    PayloadTooShort {
        what: &'static str,
        need: usize,
        got: usize,
    },
}

impl ConfigError {
    pub(crate) fn payload_too_short(what: &'static str, need: usize, got: usize) -> Self {
        Self::PayloadTooShort { what, need, got }
    }
}

/// Errors arising from decoding persisted records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("projectile lists disagree in length (names {names}, weights {weights}, diameters {diameters}, drags {drags})")]
    MismatchedLists {
        names: usize,
        weights: usize,
        diameters: usize,
        drags: usize,
    },

    #[error("invalid number {value:?} in {key}{}", format_index_suffix(*index))]
    InvalidNumber {
        key: &'static str,
        index: Option<usize>,
        value: String,
    },

    #[error("duplicate projectile name {0:?}")]
    DuplicateName(String),

    #[error("projectile name {0:?} is empty or contains ';'")]
    InvalidName(String),
}

impl StoreError {
    /// Create an `InvalidNumber` error for a scalar record.
    pub(crate) fn invalid_number(key: &'static str, value: &str) -> Self {
        Self::InvalidNumber { key, index: None, value: value.to_string() }
    }

    /// Create an `InvalidNumber` error for one element of a delimited list.
    pub(crate) fn invalid_element(key: &'static str, index: usize, value: &str) -> Self {
        Self::InvalidNumber { key, index: Some(index), value: value.to_string() }
    }
}

/// Format a list index as a suffix like " [3]" (empty for scalars).
fn format_index_suffix(index: Option<usize>) -> String {
    match index {
        Some(i) => format!(" [{i}]"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
