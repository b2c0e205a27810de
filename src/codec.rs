//! Field codecs for config slot values.
//!
//! Every slot travels as a signed 32-bit integer. Slots that carry a float
//! hold its IEEE-754 bit pattern, so decoding is a bit reinterpretation and
//! never a numeric conversion.

use crate::error::{ConfigError, Result};

// ---------------------------------------------------------------------------
// Slot value codecs
// ---------------------------------------------------------------------------

/// Reinterpret a slot value's 32-bit pattern as an `f32`.
pub fn int_bits_to_float(value: i32) -> f32 {
    f32::from_bits(value as u32)
}

/// Reinterpret an `f32` as the 32-bit pattern stored in a slot.
pub fn float_to_int_bits(value: f32) -> i32 {
    value.to_bits() as i32
}

/// Decode a float slot and widen it for model arithmetic.
///
/// NaN and infinite patterns decode to `None`; they would poison every
/// downstream energy computation.
pub fn read_float_slot(value: i32) -> Option<f64> {
    let f = int_bits_to_float(value);
    f.is_finite().then_some(f64::from(f))
}

/// Decode an id slot (spring catalog id and similar).
///
/// Negative values decode to `None`.
pub fn read_id_slot(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Read a little-endian signed 32-bit integer.
pub fn read_int32_le(data: &[u8], offset: usize) -> Result<i32> {
    check_len(data, offset, 4, "INT32")?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    Ok(i32::from_le_bytes(bytes))
}

/// Write a little-endian signed 32-bit integer.
pub fn write_int32_le(buf: &mut Vec<u8>, val: i32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

fn check_len(data: &[u8], offset: usize, need: usize, name: &'static str) -> Result<()> {
    if data.len() < offset + need {
        Err(ConfigError::payload_too_short(name, offset + need, data.len()))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
