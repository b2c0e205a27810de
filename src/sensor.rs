//! Time-of-flight sensor drivers and the calibration sequence.
//!
//! A [`SensorDriver`] is a tag selecting the slot catalog and calibration
//! parameters of one sensor part. Calibration runs against whichever
//! sensor the device has selected, so starting one may first have to wait
//! for the device to confirm a selection change.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::addr::SensorId;
use crate::error::{ConfigError, Result};
use crate::protocol::config::{SlotDef, SlotKind};

/// How long to wait for the device to confirm a sensor selection.
pub const SELECT_TIMEOUT: Duration = Duration::from_millis(2500);

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

const VL53L4CX_SLOTS: [SlotDef; 7] = [
    SlotDef::new("distance_mode", SlotKind::Int),
    SlotDef::new("timing_budget_us", SlotKind::Int),
    SlotDef::new("inter_measurement_ms", SlotKind::Int),
    SlotDef::new("offset_mm", SlotKind::Int),
    SlotDef::new("xtalk_kcps", SlotKind::Int),
    SlotDef::new("roi_width", SlotKind::Int),
    SlotDef::new("roi_height", SlotKind::Int),
];

const VL53L4CD_SLOTS: [SlotDef; 6] = [
    SlotDef::new("timing_budget_ms", SlotKind::Int),
    SlotDef::new("inter_measurement_ms", SlotKind::Int),
    SlotDef::new("offset_mm", SlotKind::Int),
    SlotDef::new("xtalk_kcps", SlotKind::Int),
    SlotDef::new("signal_threshold_kcps", SlotKind::Int),
    SlotDef::new("sigma_threshold_mm", SlotKind::Int),
];

/// Supported sensor parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum SensorDriver {
    /// Multi-zone long-distance part
    Vl53l4cx = 0x01,
    /// Compact short-distance part
    Vl53l4cd = 0x02,
}

impl SensorDriver {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x01 => Ok(Self::Vl53l4cx),
            0x02 => Ok(Self::Vl53l4cd),
            _ => Err(ConfigError::UnknownDriver { byte: b }),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// The driver's config slots, in index order.
    pub fn config_slots(self) -> &'static [SlotDef] {
        match self {
            Self::Vl53l4cx => &VL53L4CX_SLOTS,
            Self::Vl53l4cd => &VL53L4CD_SLOTS,
        }
    }

    /// Reflective target distance (mm) the calibration expects, if any.
    pub fn calibration_distance(self, kind: CalibrationKind) -> Option<i32> {
        match (self, kind) {
            (Self::Vl53l4cx, CalibrationKind::Offset) => Some(140),
            (Self::Vl53l4cd, CalibrationKind::Offset) => Some(100),
            (Self::Vl53l4cx, CalibrationKind::Xtalk) => Some(600),
            (Self::Vl53l4cd, CalibrationKind::Xtalk) => None,
        }
    }
}

impl fmt::Display for SensorDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vl53l4cx => write!(f, "VL53L4CX"),
            Self::Vl53l4cd => write!(f, "VL53L4CD"),
        }
    }
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum CalibrationKind {
    Offset = 0x01,
    /// Cover-glass crosstalk
    Xtalk = 0x02,
}

impl fmt::Display for CalibrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset => write!(f, "offset"),
            Self::Xtalk => write!(f, "crosstalk"),
        }
    }
}

/// Calibration start request sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRequest {
    pub sensor: SensorId,
    pub kind: CalibrationKind,
    /// Target distance (mm), 0 for none
    pub distance_mm: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    /// Selection change requested; gives up at `deadline`.
    WaitingForSensor {
        sensor: SensorId,
        kind: CalibrationKind,
        deadline: Instant,
    },
    Running {
        sensor: SensorId,
        kind: CalibrationKind,
    },
    Done {
        sensor: SensorId,
        kind: CalibrationKind,
        value: i32,
    },
    Failed(String),
}

impl CalibrationState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::WaitingForSensor { .. } | Self::Running { .. })
    }

    /// Human-readable status line.
    pub fn message(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::WaitingForSensor { sensor, .. } => format!("selecting {sensor} sensor..."),
            Self::Running { sensor, kind } => format!("{kind} calibration of {sensor} sensor running"),
            Self::Done { sensor, kind, value } => {
                format!("{kind} calibration of {sensor} sensor done ({value})")
            }
            Self::Failed(msg) => msg.clone(),
        }
    }
}

/// What the caller must send after a calibration transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationAction {
    SelectSensor(SensorId),
    Start(CalibrationRequest),
}

/// Offset / crosstalk calibration sequence for one device.
#[derive(Debug, Clone)]
pub struct Calibration {
    state: CalibrationState,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration {
    pub fn new() -> Self {
        Self {
            state: CalibrationState::Idle,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Begin a calibration of `sensor`.
    ///
    /// Returns `None` while another calibration is in progress.
    pub fn begin(
        &mut self,
        sensor: SensorId,
        kind: CalibrationKind,
        driver: SensorDriver,
        selected: Option<SensorId>,
        now: Instant,
    ) -> Option<CalibrationAction> {
        if self.state.is_busy() {
            log::warn!("calibration already in progress");
            return None;
        }
        if selected == Some(sensor) {
            return Some(self.start(sensor, kind, driver));
        }
        self.state = CalibrationState::WaitingForSensor {
            sensor,
            kind,
            deadline: now + SELECT_TIMEOUT,
        };
        Some(CalibrationAction::SelectSensor(sensor))
    }

    /// The device reports a selection change.
    pub fn on_sensor_selected(
        &mut self,
        selected: SensorId,
        driver: SensorDriver,
        now: Instant,
    ) -> Option<CalibrationAction> {
        let CalibrationState::WaitingForSensor { sensor, kind, deadline } = self.state else {
            return None;
        };
        if now >= deadline {
            self.fail_timeout(sensor);
            return None;
        }
        (selected == sensor).then(|| self.start(sensor, kind, driver))
    }

    /// The device reports a calibration outcome.
    pub fn on_result(&mut self, sensor: SensorId, success: bool, value: i32) {
        let CalibrationState::Running { sensor: running, kind } = self.state else {
            return;
        };
        if running != sensor {
            return;
        }
        self.state = if success {
            log::info!("{kind} calibration of {sensor} sensor complete: {value}");
            CalibrationState::Done { sensor, kind, value }
        } else {
            let msg = format!("{kind} calibration of {sensor} sensor failed");
            log::warn!("{msg}");
            CalibrationState::Failed(msg)
        };
    }

    /// Expire a pending selection wait. Returns `true` on timeout.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            CalibrationState::WaitingForSensor { sensor, deadline, .. } if now >= deadline => {
                self.fail_timeout(sensor);
                true
            }
            _ => false,
        }
    }

    /// Abandon a pending or running calibration.
    pub fn cancel(&mut self) {
        if self.state.is_busy() {
            log::info!("calibration cancelled");
            self.state = CalibrationState::Failed("calibration cancelled".to_string());
        }
    }

    /// Drop back to idle, e.g. after the link goes down.
    pub fn reset(&mut self) {
        self.state = CalibrationState::Idle;
    }

    fn start(&mut self, sensor: SensorId, kind: CalibrationKind, driver: SensorDriver) -> CalibrationAction {
        self.state = CalibrationState::Running { sensor, kind };
        CalibrationAction::Start(CalibrationRequest {
            sensor,
            kind,
            distance_mm: driver.calibration_distance(kind).unwrap_or(0),
        })
    }

    fn fail_timeout(&mut self, sensor: SensorId) {
        let msg = format!(
            "{sensor} sensor not selected within {:.1} s",
            SELECT_TIMEOUT.as_secs_f64()
        );
        log::warn!("{msg}");
        self.state = CalibrationState::Failed(msg);
    }
}
