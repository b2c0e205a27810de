//! Sequential config slot retrieval.
//!
//! A [`ConfigSync`] walks one target's slot catalog with GET requests, one
//! slot at a time. The device's answer for the slot under the cursor
//! advances it; answers for any other slot only refresh the cache. Manual
//! GET/SET/RESET/STORE replies come back through the same path, so a manual
//! reply for the cursor slot also advances an in-progress sync.
//!
//! There is no timeout here: a lost reply stalls the cursor until the link
//! drops and [`ConfigSync::reset`] restarts the walk.
//!
//! Slot ids are a single byte on the wire, so a catalog holds at most
//! [`MAX_SLOTS`] entries.

use serde::Serialize;

use crate::addr::ConfigTarget;
use crate::error::{ConfigError, Result};
use crate::protocol::config::{SlotDef, SlotKind};
use crate::protocol::{ConfigCommand, ConfigRequest, ConfigResponse, ConfigStatus};

/// Slots addressable by a one-byte id.
pub const MAX_SLOTS: usize = u8::MAX as usize + 1;

/// Cached state of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotValue {
    pub name: &'static str,
    pub kind: SlotKind,
    /// Last value reported by the device
    pub value: Option<i32>,
    /// Status of the last reply
    pub status: Option<ConfigStatus>,
}

impl From<&SlotDef> for SlotValue {
    fn from(def: &SlotDef) -> Self {
        Self {
            name: def.name,
            kind: def.kind,
            value: None,
            status: None,
        }
    }
}

/// Result of feeding one response to a [`ConfigSync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Slot whose cached value changed
    pub stored: Option<usize>,
    /// GET to send next
    pub next: Option<ConfigRequest>,
    /// The walk just reached the last slot
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigSync {
    target: ConfigTarget,
    slots: Vec<SlotValue>,
    cursor: usize,
    initialized: bool,
}

impl ConfigSync {
    pub fn new(target: ConfigTarget, defs: &[SlotDef]) -> Self {
        Self {
            target,
            slots: slot_values(target, defs),
            cursor: 0,
            initialized: false,
        }
    }

    pub fn target(&self) -> ConfigTarget {
        self.target
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn slots(&self) -> &[SlotValue] {
        &self.slots
    }

    pub fn value(&self, slot: usize) -> Option<i32> {
        self.slots.get(slot).and_then(|s| s.value)
    }

    /// Rewind to slot 0 and return the first GET.
    pub fn start(&mut self) -> Option<ConfigRequest> {
        self.reset();
        if self.slots.is_empty() {
            self.initialized = true;
            return None;
        }
        log::debug!("{}: sync started ({} slots)", self.target, self.slots.len());
        Some(ConfigRequest::get(self.target, 0))
    }

    /// Forget progress and cached values.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.initialized = false;
        for slot in &mut self.slots {
            slot.value = None;
            slot.status = None;
        }
    }

    /// Swap the slot catalog (e.g. a different sensor driver) and reset.
    pub fn set_slots(&mut self, defs: &[SlotDef]) {
        self.slots = slot_values(self.target, defs);
        self.reset();
    }

    /// Feed a device reply.
    pub fn handle_response(&mut self, resp: &ConfigResponse) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        if resp.target != self.target {
            return outcome;
        }
        let index = usize::from(resp.slot);
        let Some(slot) = self.slots.get_mut(index) else {
            log::warn!("{}: reply for unknown slot {index} ignored", self.target);
            return outcome;
        };

        slot.status = Some(resp.status);
        if resp.status.has_value() {
            slot.value = Some(resp.value);
            outcome.stored = Some(index);
        } else {
            log::warn!("{}: slot {} ({}) replied {}", self.target, index, slot.name, resp.status);
        }

        if !self.initialized && index == self.cursor {
            if self.cursor + 1 < self.slots.len() {
                self.cursor += 1;
                log::debug!("{}: cursor -> {}", self.target, self.cursor);
                // cursor < len <= MAX_SLOTS, so the next id fits in a byte
                outcome.next = Some(ConfigRequest::get(self.target, resp.slot + 1));
            } else {
                self.initialized = true;
                outcome.completed = true;
                log::info!("{}: {} slots synchronised", self.target, self.slots.len());
            }
        }
        outcome
    }

    /// Build a manual request for `slot`.
    pub fn request(&self, command: ConfigCommand, slot: usize, value: i32) -> Result<ConfigRequest> {
        match u8::try_from(slot) {
            Ok(id) if slot < self.slots.len() => Ok(ConfigRequest {
                target: self.target,
                command,
                slot: id,
                value,
            }),
            _ => Err(ConfigError::UnknownSlot {
                target: self.target,
                slot,
                len: self.slots.len(),
            }),
        }
    }
}

fn slot_values(target: ConfigTarget, defs: &[SlotDef]) -> Vec<SlotValue> {
    if defs.len() > MAX_SLOTS {
        log::warn!("{target}: {} slots, only the first {MAX_SLOTS} are addressable", defs.len());
    }
    defs.iter().take(MAX_SLOTS).map(SlotValue::from).collect()
}
