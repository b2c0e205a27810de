//! Live launcher session.
//!
//! [`Session`] owns everything that changes while a device is attached: the
//! mechanical model, both sensor filters, the config syncs, calibration
//! state and user settings. The host feeds it [`Event`]s and it answers
//! through its [`Link`]. Every reaction is synchronous.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use launchkit::context::Session;
//! use launchkit::prefs::{MemoryStore, Settings};
//! use launchkit::protocol::{Command, ConnectionState, Event};
//!
//! let mut sent = Vec::new();
//! let mut session = Session::new(|cmd: Command| sent.push(cmd), Settings::new(MemoryStore::new()));
//! session.handle(Event::Connection(ConnectionState::Ready), Instant::now());
//! drop(session);
//! assert_eq!(sent.len(), 3); // one GET per config target
//! ```

use std::sync::Arc;
use std::time::Instant;

use crate::addr::{ConfigTarget, SensorId};
use crate::codec;
use crate::error::{Result, StoreError};
use crate::filter::SensorFilter;
use crate::model::{self, EnergyPoint, Impact, ModelData, ModelGeometry};
use crate::observable::Observable;
use crate::prefs::{GyroOffsets, PrefStore, Settings};
use crate::projectile::{ProjectileCatalog, ProjectileData, RecData};
use crate::protocol::config::{
    DEVICE_USER_SLOTS, SLOT_EFFICIENCY, SLOT_FORCE_OFFSET, SLOT_FRICTION_COEFFICIENT, SLOT_SPRING_ID,
};
use crate::protocol::{Command, ConfigCommand, ConfigResponse, ConnectionState, Event, Link, RangeUpdate};
use crate::sensor::{Calibration, CalibrationAction, CalibrationKind, CalibrationState};
use crate::spring;
use crate::sync::{ConfigSync, SlotValue};

/// Values a presentation layer can watch.
#[derive(Debug, Default)]
pub struct Observers {
    pub connection: Observable<ConnectionState>,
    pub model_name: Observable<String>,
    pub spring_name: Observable<Option<String>>,
    /// Filtered short sensor range converted to carriage position (mm)
    pub carriage_position: Observable<f64>,
    /// Filtered long sensor range converted to device height (mm)
    pub device_height: Observable<f64>,
    pub energy_table: Observable<Arc<[EnergyPoint]>>,
    pub calibration_message: Observable<String>,
    /// Slot caches, indexed like [`ConfigTarget::ALL`]
    pub config_slots: [Observable<Vec<SlotValue>>; 3],
}

/// One attached launcher.
pub struct Session<L, S> {
    link: L,
    settings: Settings<S>,
    model: ModelData,
    catalog: ProjectileCatalog,
    filters: [SensorFilter; 2],
    syncs: [ConfigSync; 3],
    calibration: Calibration,
    gyro: GyroOffsets,
    selected_sensor: Option<SensorId>,
    pub observers: Observers,
}

fn target_index(target: ConfigTarget) -> usize {
    match target {
        ConfigTarget::Device => 0,
        ConfigTarget::Sensor(id) => 1 + id.index(),
    }
}

impl<L: Link, S: PrefStore> Session<L, S> {
    /// Restore a session from `settings`; nothing is sent until the link is ready.
    pub fn new(link: L, settings: Settings<S>) -> Self {
        let geometry = model::by_id(settings.model_id()).unwrap_or_else(|| {
            log::warn!("unknown model id {}, using {}", settings.model_id(), model::MODEL_STANDARD.name);
            model::MODEL_STANDARD
        });
        let size = settings.filter_sample_size();
        let catalog = settings.load_catalog();
        let gyro = settings.gyro_offsets();

        let mut session = Self {
            link,
            model: ModelData::new(geometry),
            catalog,
            filters: [SensorFilter::new(size), SensorFilter::new(size)],
            syncs: [
                ConfigSync::new(ConfigTarget::Device, &DEVICE_USER_SLOTS),
                ConfigSync::new(ConfigTarget::Sensor(SensorId::Short), geometry.short_driver.config_slots()),
                ConfigSync::new(ConfigTarget::Sensor(SensorId::Long), geometry.long_driver.config_slots()),
            ],
            calibration: Calibration::new(),
            gyro,
            selected_sensor: None,
            settings,
            observers: Observers::default(),
        };
        session.apply_geometry();
        session
            .model
            .set_projectile(session.catalog.selected().cloned());
        session
    }

    // -- accessors --

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn settings(&self) -> &Settings<S> {
        &self.settings
    }

    pub fn model(&self) -> &ModelData {
        &self.model
    }

    pub fn projectiles(&self) -> &ProjectileCatalog {
        &self.catalog
    }

    pub fn filter(&self, sensor: SensorId) -> &SensorFilter {
        &self.filters[sensor.index()]
    }

    pub fn sync(&self, target: ConfigTarget) -> &ConfigSync {
        &self.syncs[target_index(target)]
    }

    pub fn calibration(&self) -> &CalibrationState {
        self.calibration.state()
    }

    pub fn selected_sensor(&self) -> Option<SensorId> {
        self.selected_sensor
    }

    pub fn connection(&self) -> ConnectionState {
        *self.observers.connection.get()
    }

    // -- events --

    /// React to one event from the transport.
    pub fn handle(&mut self, event: Event, now: Instant) {
        match event {
            Event::Range(update) => self.on_range(update),
            Event::Config(resp) => self.on_config(&resp),
            Event::Connection(state) => self.on_connection(state),
            Event::SensorSelected(sensor) => {
                self.selected_sensor = Some(sensor);
                let driver = self.model.geometry().driver(sensor);
                if let Some(action) = self.calibration.on_sensor_selected(sensor, driver, now) {
                    self.dispatch_calibration(action);
                }
                self.publish_calibration();
            }
            Event::CalibrationResult { sensor, success, value, .. } => {
                self.calibration.on_result(sensor, success, value);
                self.publish_calibration();
            }
        }
    }

    fn on_range(&mut self, update: RangeUpdate) {
        let out = self.filters[update.sensor.index()].update(update.range_mm);
        let g = self.model.geometry();
        match update.sensor {
            SensorId::Short => {
                let position = g.position_from_range(out);
                self.observers.carriage_position.set(position);
            }
            SensorId::Long => {
                let height = g.height_from_range(out);
                self.observers.device_height.set(height);
            }
        }
    }

    fn on_connection(&mut self, state: ConnectionState) {
        log::info!("link {state}");
        self.observers.connection.set(state);
        match state {
            ConnectionState::Ready => {
                for i in 0..self.syncs.len() {
                    if let Some(req) = self.syncs[i].start() {
                        self.link.send(Command::Config(req));
                    }
                    self.publish_slots(i);
                }
            }
            ConnectionState::Disconnected => {
                for i in 0..self.syncs.len() {
                    self.syncs[i].reset();
                    self.publish_slots(i);
                }
                for f in &mut self.filters {
                    f.reset();
                }
                self.selected_sensor = None;
                self.calibration.reset();
                self.publish_calibration();
            }
            ConnectionState::Connecting => {}
        }
    }

    fn on_config(&mut self, resp: &ConfigResponse) {
        let i = target_index(resp.target);
        let outcome = self.syncs[i].handle_response(resp);
        if let Some(slot) = outcome.stored
            && resp.target == ConfigTarget::Device
        {
            self.apply_device_slot(slot, resp.value);
        }
        if let Some(next) = outcome.next {
            self.link.send(Command::Config(next));
        }
        self.publish_slots(i);
    }

    /// Push a device user-data value into the model.
    fn apply_device_slot(&mut self, slot: usize, value: i32) {
        match slot {
            SLOT_FORCE_OFFSET | SLOT_EFFICIENCY | SLOT_FRICTION_COEFFICIENT => {
                let Some(v) = codec::read_float_slot(value) else {
                    log::warn!("non-finite value 0x{value:08X} in device slot {slot} ignored");
                    return;
                };
                match slot {
                    SLOT_FORCE_OFFSET => self.model.set_force_offset(v),
                    SLOT_EFFICIENCY => self.model.set_efficiency(v),
                    _ => self.model.set_friction_coefficient(v),
                }
            }
            SLOT_SPRING_ID => {
                let spring = codec::read_id_slot(value).and_then(spring::by_id);
                if spring.is_none() {
                    log::warn!("device reports unknown spring id {value}");
                }
                if self.model.spring().map(|s| s.id) != spring.as_ref().map(|s| s.id) {
                    self.model.set_spring(spring);
                    self.publish_spring();
                }
            }
            _ => {}
        }
    }

    // -- user operations --

    /// Send a manual slot request. The reply comes back through [`handle`](Self::handle).
    pub fn request_config(&mut self, target: ConfigTarget, command: ConfigCommand, slot: usize, value: i32) -> Result<()> {
        let req = self.sync(target).request(command, slot, value)?;
        log::debug!("{target}: {command} slot {slot}");
        self.link.send(Command::Config(req));
        Ok(())
    }

    /// Ask the device to switch springs. The model follows its reply.
    pub fn select_spring(&mut self, id: usize) -> Result<()> {
        let value = i32::try_from(id).unwrap_or(i32::MAX);
        self.request_config(ConfigTarget::Device, ConfigCommand::Set, SLOT_SPRING_ID, value)
    }

    /// Write a float ballistic correction to the device.
    pub fn set_device_float(&mut self, slot: usize, value: f32) -> Result<()> {
        self.request_config(ConfigTarget::Device, ConfigCommand::Set, slot, codec::float_to_int_bits(value))
    }

    /// Switch the hardware model; the spring, projectile and corrections carry over.
    pub fn set_model(&mut self, id: u32) -> bool {
        let Some(geometry) = model::by_id(id) else {
            log::warn!("unknown model id {id}");
            return false;
        };
        let mut next = ModelData::new(geometry);
        next.set_force_offset(self.model.force_offset());
        next.set_efficiency(self.model.efficiency());
        next.set_friction_coefficient(self.model.friction_coefficient());
        next.set_spring(self.model.spring().cloned());
        next.set_projectile(self.model.projectile().cloned());
        self.model = next;

        // A different driver means a different slot catalog to walk.
        for sensor in SensorId::ALL {
            let i = target_index(ConfigTarget::Sensor(sensor));
            let slots = geometry.driver(sensor).config_slots();
            let unchanged = self.syncs[i]
                .slots()
                .iter()
                .map(|s| s.name)
                .eq(slots.iter().map(|d| d.name));
            if unchanged {
                continue;
            }
            self.syncs[i].set_slots(slots);
            if self.connection().is_ready()
                && let Some(req) = self.syncs[i].start()
            {
                self.link.send(Command::Config(req));
            }
            self.publish_slots(i);
        }

        self.apply_geometry();
        self.publish_spring();
        self.settings.set_model_id(id);
        log::info!("model changed to {}", geometry.name);
        true
    }

    pub fn set_filter_sample_size(&mut self, size: usize) -> usize {
        let size = size.max(1);
        for f in &mut self.filters {
            f.set_sample_size(size);
        }
        self.settings.set_filter_sample_size(size);
        size
    }

    /// Toggle drift compensation. Turning it on re-anchors the rest point.
    pub fn set_drift_compensation(&mut self, sensor: SensorId, enable: bool) {
        let f = &mut self.filters[sensor.index()];
        if enable && !f.drift_compensation_enabled() {
            f.request_drift_reset();
        }
        f.set_drift_compensation(enable);
    }

    // -- projectiles --

    /// Add or replace a projectile by name.
    pub fn save_projectile(&mut self, projectile: ProjectileData) -> std::result::Result<(), StoreError> {
        let name = projectile.name.clone();
        self.catalog.upsert(projectile)?;
        if self.catalog.selected_name() == Some(name.as_str()) {
            self.model.set_projectile(self.catalog.selected().cloned());
        }
        self.settings.save_catalog(&self.catalog);
        Ok(())
    }

    /// Delete a projectile and its recorded data.
    pub fn delete_projectile(&mut self, name: &str) -> Option<ProjectileData> {
        let removed = self.catalog.remove(name)?;
        if self.catalog.selected().is_none() {
            self.model.set_projectile(None);
        }
        self.settings.remove_rec_data(name);
        self.settings.save_catalog(&self.catalog);
        Some(removed)
    }

    pub fn select_projectile(&mut self, name: &str) -> bool {
        let found = self.catalog.select(name);
        self.model.set_projectile(self.catalog.selected().cloned());
        self.settings.save_catalog(&self.catalog);
        found
    }

    /// Record a measured impact distance (m) for the selected projectile at
    /// the current carriage position.
    pub fn record_distance(&mut self, distance: f64, raw_pitch: f64) -> Option<usize> {
        let name = self.catalog.selected_name()?.to_string();
        let mut rec = self.settings.rec_data(&name).unwrap_or_default();
        rec.pitch = self.gyro.correct_pitch(raw_pitch);
        rec.height = *self.observers.device_height.get() / 1000.0;
        let index = rec.record(*self.observers.carriage_position.get(), distance)?;
        if let Err(e) = self.settings.set_rec_data(&name, &rec) {
            log::warn!("recorded data for {name:?} not saved: {e}");
        }
        Some(index)
    }

    pub fn rec_data(&self, name: &str) -> Option<RecData> {
        self.settings.rec_data(name)
    }

    // -- gyro --

    pub fn set_gyro_offsets(&mut self, offsets: GyroOffsets) {
        self.gyro = offsets;
        self.settings.set_gyro_offsets(offsets);
    }

    /// Zero the gyro at the current raw attitude.
    pub fn zero_gyro(&mut self, raw_pitch: f64, raw_roll: f64) {
        self.set_gyro_offsets(GyroOffsets { pitch: raw_pitch, roll: raw_roll });
    }

    pub fn pitch(&self, raw_pitch: f64) -> f64 {
        self.gyro.correct_pitch(raw_pitch)
    }

    /// Predict the impact from the live carriage position and device height.
    pub fn predict(&self, raw_pitch: f64) -> Impact {
        let position = *self.observers.carriage_position.get();
        let height = *self.observers.device_height.get() / 1000.0;
        self.model.predict_impact(position, self.pitch(raw_pitch), height)
    }

    // -- calibration --

    pub fn begin_calibration(&mut self, sensor: SensorId, kind: CalibrationKind, now: Instant) -> bool {
        let driver = self.model.geometry().driver(sensor);
        let action = self
            .calibration
            .begin(sensor, kind, driver, self.selected_sensor, now);
        let started = action.is_some();
        if let Some(action) = action {
            self.dispatch_calibration(action);
        }
        self.publish_calibration();
        started
    }

    /// Expire a pending sensor selection. Call periodically.
    pub fn tick(&mut self, now: Instant) {
        if self.calibration.tick(now) {
            self.publish_calibration();
        }
    }

    pub fn cancel_calibration(&mut self) {
        self.calibration.cancel();
        self.publish_calibration();
    }

    fn dispatch_calibration(&mut self, action: CalibrationAction) {
        let cmd = match action {
            CalibrationAction::SelectSensor(sensor) => Command::SelectSensor(sensor),
            CalibrationAction::Start(req) => Command::Calibrate(req),
        };
        self.link.send(cmd);
    }

    // -- publication --

    /// Reconfigure everything that depends on the model geometry.
    fn apply_geometry(&mut self) {
        let g: ModelGeometry = *self.model.geometry();
        self.filters[SensorId::Short.index()].set_target_reference(g.short_target_reference());
        self.observers.model_name.set(g.name.to_string());
        self.observers.energy_table.set(self.model.energy_table());
    }

    fn publish_spring(&mut self) {
        let name = self.model.spring().map(|s| s.name.clone());
        self.observers.spring_name.set_if_changed(name);
        self.observers.energy_table.set(self.model.energy_table());
    }

    fn publish_slots(&mut self, i: usize) {
        self.observers.config_slots[i].set(self.syncs[i].slots().to_vec());
    }

    fn publish_calibration(&mut self) {
        let msg = self.calibration.state().message();
        self.observers.calibration_message.set_if_changed(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use approx::assert_relative_eq;

    use crate::prefs::MemoryStore;
    use crate::protocol::{ConfigRequest, ConfigStatus};
    use crate::sensor::CalibrationRequest;

    #[derive(Default)]
    struct Recorder(Vec<Command>);

    impl Link for Recorder {
        fn send(&mut self, cmd: Command) {
            self.0.push(cmd);
        }
    }

    fn session() -> Session<Recorder, MemoryStore> {
        Session::new(Recorder::default(), Settings::new(MemoryStore::new()))
    }

    fn device_reply(slot: u8, value: i32) -> Event {
        Event::Config(ConfigResponse {
            target: ConfigTarget::Device,
            slot,
            value,
            status: ConfigStatus::Ok,
        })
    }

    fn sent(s: &mut Session<Recorder, MemoryStore>) -> Vec<Command> {
        std::mem::take(&mut s.link_mut().0)
    }

    #[test]
    fn ready_starts_every_target() {
        let mut s = session();
        let now = Instant::now();
        s.handle(Event::Connection(ConnectionState::Ready), now);
        let cmds = sent(&mut s);
        assert_eq!(
            cmds,
            vec![
                Command::Config(ConfigRequest::get(ConfigTarget::Device, 0)),
                Command::Config(ConfigRequest::get(ConfigTarget::Sensor(SensorId::Short), 0)),
                Command::Config(ConfigRequest::get(ConfigTarget::Sensor(SensorId::Long), 0)),
            ]
        );
    }

    #[test]
    fn device_sync_drives_model() {
        let mut s = session();
        let now = Instant::now();
        s.handle(Event::Connection(ConnectionState::Ready), now);
        sent(&mut s);

        s.handle(device_reply(0, 0x3FC0_0000), now);
        assert_eq!(s.model().force_offset(), 1.5);
        s.handle(device_reply(1, codec::float_to_int_bits(0.75)), now);
        assert_eq!(s.model().efficiency(), 0.75);
        s.handle(device_reply(2, codec::float_to_int_bits(0.25)), now);
        assert_eq!(s.model().friction_coefficient(), 0.25);
        assert!(s.model().energy_table().is_empty());
        s.handle(device_reply(3, 2), now);

        assert_eq!(s.model().spring().unwrap().id, 2);
        assert!(!s.model().energy_table().is_empty());
        assert!(s.observers.energy_table.get().len() > 1);
        assert_eq!(s.observers.spring_name.get().as_deref(), Some("Heavy 1.8 mm"));
        assert!(s.sync(ConfigTarget::Device).is_initialized());
        assert_eq!(
            sent(&mut s),
            (1..4)
                .map(|i| Command::Config(ConfigRequest::get(ConfigTarget::Device, i)))
                .collect::<Vec<_>>()
        );
        assert_eq!(s.observers.config_slots[0].get()[3].value, Some(2));
    }

    #[test]
    fn unknown_spring_clears_model_spring() {
        let mut s = session();
        let now = Instant::now();
        s.handle(device_reply(3, 1), now);
        assert!(s.model().spring().is_some());
        s.handle(device_reply(3, 42), now);
        assert!(s.model().spring().is_none());
        assert_eq!(s.model().potential_energy_at_position(10.0), 0.0);
    }

    #[test]
    fn disconnect_restarts_sync() {
        let mut s = session();
        let now = Instant::now();
        s.handle(Event::Connection(ConnectionState::Ready), now);
        s.handle(device_reply(0, 0), now);
        assert_eq!(s.sync(ConfigTarget::Device).cursor(), 1);

        s.handle(Event::Connection(ConnectionState::Disconnected), now);
        assert_eq!(s.sync(ConfigTarget::Device).cursor(), 0);
        assert!(!s.sync(ConfigTarget::Device).is_initialized());
        assert_eq!(s.connection(), ConnectionState::Disconnected);

        sent(&mut s);
        s.handle(Event::Connection(ConnectionState::Ready), now);
        assert_eq!(
            sent(&mut s)[0],
            Command::Config(ConfigRequest::get(ConfigTarget::Device, 0))
        );
    }

    #[test]
    fn range_updates_publish_position_and_height() {
        let mut s = session();
        let now = Instant::now();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        s.observers
            .carriage_position
            .subscribe(move |p| sink.borrow_mut().push(*p));
        s.set_filter_sample_size(1);

        s.handle(Event::Range(RangeUpdate { sensor: SensorId::Short, range_mm: 52 }), now);
        s.handle(Event::Range(RangeUpdate { sensor: SensorId::Long, range_mm: 965 }), now);
        assert_eq!(*seen.borrow(), vec![40.0]);
        assert_eq!(*s.observers.device_height.get(), 1000.0);
        assert_eq!(s.settings().filter_sample_size(), 1);
    }

    #[test]
    fn model_switch_retargets_and_carries_state() {
        let mut s = session();
        let now = Instant::now();
        s.handle(device_reply(3, 1), now);
        assert_eq!(s.filter(SensorId::Short).target_reference(), 82);

        assert!(s.set_model(1));
        assert_eq!(s.model().name(), "Long Barrel");
        assert_eq!(
            s.filter(SensorId::Short).target_reference(),
            model::MODEL_LONG.short_target_reference()
        );
        assert_eq!(s.model().spring().unwrap().id, 1);
        assert_eq!(s.model().max_position(), 95.0);
        assert_eq!(s.settings().model_id(), 1);
        assert_eq!(s.observers.model_name.get(), "Long Barrel");
        // Short sensor changed driver, long did not.
        assert_eq!(s.sync(ConfigTarget::Sensor(SensorId::Short)).slots().len(), 7);
        assert!(!s.set_model(9));
    }

    #[test]
    fn projectile_lifecycle() {
        let mut s = session();
        assert!(s.model().projectile().is_none());
        assert!(s.select_projectile("Golf Ball"));
        assert_relative_eq!(s.model().total_weight(), 45.9 + 25.0);

        s.save_projectile(ProjectileData::new("Golf Ball", 46.0, 42.7, 0.25)).unwrap();
        assert_relative_eq!(s.model().total_weight(), 71.0);
        assert!(s.save_projectile(ProjectileData::new("Ball; red", 5.0, 38.0, 0.47)).is_err());
        assert_eq!(s.settings().load_catalog().len(), 4);

        s.delete_projectile("Golf Ball").unwrap();
        assert!(s.model().projectile().is_none());
        assert_eq!(s.model().total_weight(), 25.0);
        assert!(s.settings().load_catalog().get("Golf Ball").is_none());
    }

    #[test]
    fn record_distance_for_selected_projectile() {
        let mut s = session();
        let now = Instant::now();
        assert!(s.record_distance(3.0, 0.0).is_none());
        s.select_projectile("Foam Ball");
        s.set_filter_sample_size(1);
        s.handle(Event::Range(RangeUpdate { sensor: SensorId::Short, range_mm: 42 }), now);
        assert_eq!(s.record_distance(3.0, -2.0), Some(6));
        let rec = s.rec_data("Foam Ball").unwrap();
        assert_eq!(rec.rec_dist[6], 3.0);
        assert_eq!(rec.pitch, -2.0);
    }

    #[test]
    fn calibration_round_trip() {
        let mut s = session();
        let now = Instant::now();
        assert!(s.begin_calibration(SensorId::Short, CalibrationKind::Offset, now));
        assert_eq!(sent(&mut s), vec![Command::SelectSensor(SensorId::Short)]);

        s.handle(Event::SensorSelected(SensorId::Short), now + Duration::from_millis(300));
        assert_eq!(
            sent(&mut s),
            vec![Command::Calibrate(CalibrationRequest {
                sensor: SensorId::Short,
                kind: CalibrationKind::Offset,
                distance_mm: 100,
            })]
        );
        s.handle(
            Event::CalibrationResult {
                sensor: SensorId::Short,
                kind: CalibrationKind::Offset,
                success: true,
                value: -3,
            },
            now,
        );
        assert_eq!(
            s.observers.calibration_message.get(),
            "offset calibration of SHORT sensor done (-3)"
        );

        // Sensor already selected: starts straight away.
        assert!(s.begin_calibration(SensorId::Short, CalibrationKind::Xtalk, now));
        assert!(matches!(sent(&mut s)[..], [Command::Calibrate(_)]));
    }

    #[test]
    fn calibration_times_out() {
        let mut s = session();
        let now = Instant::now();
        s.begin_calibration(SensorId::Long, CalibrationKind::Offset, now);
        s.tick(now + Duration::from_secs(1));
        assert!(s.calibration().is_busy());
        s.tick(now + Duration::from_secs(3));
        assert!(matches!(s.calibration(), CalibrationState::Failed(_)));
        assert!(s.observers.calibration_message.get().contains("not selected"));
    }

    #[test]
    fn manual_requests() {
        let mut s = session();
        s.set_device_float(SLOT_EFFICIENCY, 0.5).unwrap();
        s.select_spring(4).unwrap();
        let cmds = sent(&mut s);
        assert!(matches!(
            cmds[..],
            [
                Command::Config(ConfigRequest { command: ConfigCommand::Set, slot: 1, .. }),
                Command::Config(ConfigRequest { command: ConfigCommand::Set, slot: 3, value: 4, .. }),
            ]
        ));
        assert!(s.request_config(ConfigTarget::Device, ConfigCommand::Get, 9, 0).is_err());
    }

    #[test]
    fn prediction_uses_corrected_pitch() {
        let mut s = session();
        let now = Instant::now();
        s.handle(device_reply(3, 2), now);
        s.select_projectile("Foam Ball");
        s.set_filter_sample_size(1);
        s.handle(Event::Range(RangeUpdate { sensor: SensorId::Short, range_mm: 22 }), now);
        s.handle(Event::Range(RangeUpdate { sensor: SensorId::Long, range_mm: 965 }), now);

        s.zero_gyro(2.0, 0.0);
        let impact = s.predict(12.0);
        let direct = s.model().predict_impact(10.0, 10.0, 1.0);
        assert!(impact.distance > 0.0);
        assert_eq!(impact, direct);
        assert_eq!(s.settings().gyro_offsets().pitch, 2.0);
    }
}
