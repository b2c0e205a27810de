//! Persisted user settings.
//!
//! Settings live in a flat string key/value store supplied by the host
//! ([`PrefStore`]). [`Settings`] owns the key names, formats and defaults.
//!
//! | Key                     | Format                          | Default          |
//! |-------------------------|---------------------------------|------------------|
//! | `height_unit`           | unit symbol                     | `m`              |
//! | `distance_unit`         | unit symbol                     | `m`              |
//! | `filter_sample_size`    | integer ≥ 1                     | 7                |
//! | `projectile_names`      | `;`-separated                   | default catalog  |
//! | `projectile_weights`    | `;`-separated numbers (g)       | default catalog  |
//! | `projectile_diameters`  | `;`-separated numbers (mm)      | default catalog  |
//! | `projectile_drags`      | `;`-separated numbers           | default catalog  |
//! | `selected_projectile`   | projectile name                 | none             |
//! | `rec_<name>`            | [`RecData`] JSON                | none             |
//! | `model_id`              | integer                         | 0                |
//! | `gyro_pitch_offset`     | degrees                         | 0                |
//! | `gyro_roll_offset`      | degrees                         | 0                |

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::StoreError;
use crate::filter::DEFAULT_SAMPLE_SIZE;
use crate::projectile::{self, NAME_SEPARATOR, ProjectileCatalog, ProjectileData, RecData};
use crate::units::LengthUnit;

const KEY_HEIGHT_UNIT: &str = "height_unit";
const KEY_DISTANCE_UNIT: &str = "distance_unit";
const KEY_FILTER_SAMPLE_SIZE: &str = "filter_sample_size";
const KEY_NAMES: &str = "projectile_names";
const KEY_WEIGHTS: &str = "projectile_weights";
const KEY_DIAMETERS: &str = "projectile_diameters";
const KEY_DRAGS: &str = "projectile_drags";
const KEY_SELECTED: &str = "selected_projectile";
const KEY_MODEL_ID: &str = "model_id";
const KEY_GYRO_PITCH: &str = "gyro_pitch_offset";
const KEY_GYRO_ROLL: &str = "gyro_roll_offset";
const REC_PREFIX: &str = "rec_";

/// Host key/value storage.
pub trait PrefStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Gyro zero offsets (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GyroOffsets {
    pub pitch: f64,
    pub roll: f64,
}

impl GyroOffsets {
    /// Pitch with the calibrated zero removed.
    pub fn correct_pitch(&self, raw_pitch: f64) -> f64 {
        raw_pitch - self.pitch
    }

    pub fn correct_roll(&self, raw_roll: f64) -> f64 {
        raw_roll - self.roll
    }
}

/// Typed accessors over a [`PrefStore`].
#[derive(Debug, Clone, Default)]
pub struct Settings<S> {
    store: S,
}

impl<S: PrefStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // -- units --

    pub fn height_unit(&self) -> LengthUnit {
        self.unit(KEY_HEIGHT_UNIT)
    }

    pub fn set_height_unit(&mut self, unit: LengthUnit) {
        self.store.set(KEY_HEIGHT_UNIT, unit.symbol().to_string());
    }

    pub fn distance_unit(&self) -> LengthUnit {
        self.unit(KEY_DISTANCE_UNIT)
    }

    pub fn set_distance_unit(&mut self, unit: LengthUnit) {
        self.store.set(KEY_DISTANCE_UNIT, unit.symbol().to_string());
    }

    fn unit(&self, key: &'static str) -> LengthUnit {
        match self.store.get(key) {
            None => LengthUnit::default(),
            Some(s) => LengthUnit::from_symbol(&s).unwrap_or_else(|| {
                log::warn!("unknown unit {s:?} in {key}, using default");
                LengthUnit::default()
            }),
        }
    }

    // -- filter --

    pub fn filter_sample_size(&self) -> usize {
        self.parsed(KEY_FILTER_SAMPLE_SIZE)
            .unwrap_or(DEFAULT_SAMPLE_SIZE)
            .max(1)
    }

    pub fn set_filter_sample_size(&mut self, size: usize) {
        self.store.set(KEY_FILTER_SAMPLE_SIZE, size.to_string());
    }

    // -- model --

    pub fn model_id(&self) -> u32 {
        self.parsed(KEY_MODEL_ID).unwrap_or(0)
    }

    pub fn set_model_id(&mut self, id: u32) {
        self.store.set(KEY_MODEL_ID, id.to_string());
    }

    // -- gyro --

    pub fn gyro_offsets(&self) -> GyroOffsets {
        GyroOffsets {
            pitch: self.parsed(KEY_GYRO_PITCH).unwrap_or(0.0),
            roll: self.parsed(KEY_GYRO_ROLL).unwrap_or(0.0),
        }
    }

    pub fn set_gyro_offsets(&mut self, offsets: GyroOffsets) {
        self.store.set(KEY_GYRO_PITCH, offsets.pitch.to_string());
        self.store.set(KEY_GYRO_ROLL, offsets.roll.to_string());
    }

    // -- projectiles --

    /// Read the four parallel projectile lists.
    ///
    /// `Ok(None)` when nothing has been stored yet.
    pub fn try_load_projectiles(&self) -> Result<Option<Vec<ProjectileData>>, StoreError> {
        let Some(names) = self.store.get(KEY_NAMES) else {
            return Ok(None);
        };
        let names = split_list(&names);
        let weights = self.number_list(KEY_WEIGHTS)?;
        let diameters = self.number_list(KEY_DIAMETERS)?;
        let drags = self.number_list(KEY_DRAGS)?;

        let n = names.len();
        if weights.len() != n || diameters.len() != n || drags.len() != n {
            return Err(StoreError::MismatchedLists {
                names: n,
                weights: weights.len(),
                diameters: diameters.len(),
                drags: drags.len(),
            });
        }
        Ok(Some(
            names
                .into_iter()
                .zip(weights)
                .zip(diameters)
                .zip(drags)
                .map(|(((name, w), d), c)| ProjectileData::new(name, w, d, c))
                .collect(),
        ))
    }

    /// Load the projectile catalog with its selection.
    ///
    /// Never-saved settings give the default catalog; malformed lists give
    /// an empty one rather than a partial reconstruction.
    pub fn load_catalog(&self) -> ProjectileCatalog {
        let items = match self.try_load_projectiles() {
            Ok(Some(items)) => items,
            Ok(None) => projectile::default_catalog(),
            Err(e) => {
                log::warn!("discarding stored projectiles: {e}");
                return ProjectileCatalog::default();
            }
        };
        let selected = self.store.get(KEY_SELECTED);
        ProjectileCatalog::new(items, selected).unwrap_or_else(|e| {
            log::warn!("discarding stored projectiles: {e}");
            ProjectileCatalog::default()
        })
    }

    pub fn save_catalog(&mut self, catalog: &ProjectileCatalog) {
        let items = catalog.items();
        self.store.set(KEY_NAMES, join_list(items, |p| p.name.clone()));
        self.store.set(KEY_WEIGHTS, join_list(items, |p| p.weight.to_string()));
        self.store.set(KEY_DIAMETERS, join_list(items, |p| p.diameter.to_string()));
        self.store.set(KEY_DRAGS, join_list(items, |p| p.drag.to_string()));
        match catalog.selected_name() {
            Some(name) => self.store.set(KEY_SELECTED, name.to_string()),
            None => self.store.remove(KEY_SELECTED),
        }
    }

    // -- recorded data --

    pub fn rec_data(&self, projectile: &str) -> Option<RecData> {
        let json = self.store.get(&rec_key(projectile))?;
        RecData::from_json(&json)
            .inspect_err(|e| log::warn!("recorded data for {projectile:?} unreadable: {e}"))
            .ok()
    }

    pub fn set_rec_data(&mut self, projectile: &str, data: &RecData) -> Result<(), StoreError> {
        let json = data.to_json()?;
        self.store.set(&rec_key(projectile), json);
        Ok(())
    }

    pub fn remove_rec_data(&mut self, projectile: &str) {
        self.store.remove(&rec_key(projectile));
    }

    // -- helpers --

    fn parsed<T: FromStr>(&self, key: &'static str) -> Option<T> {
        let raw = self.store.get(key)?;
        let parsed = raw.trim().parse().ok();
        if parsed.is_none() {
            log::warn!("{}", StoreError::invalid_number(key, &raw));
        }
        parsed
    }

    fn number_list(&self, key: &'static str) -> Result<Vec<f64>, StoreError> {
        let raw = self.store.get(key).unwrap_or_default();
        split_list(&raw)
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| StoreError::invalid_element(key, i, &s))
            })
            .collect()
    }
}

fn rec_key(projectile: &str) -> String {
    format!("{REC_PREFIX}{projectile}")
}

fn join_list(items: &[ProjectileData], field: impl Fn(&ProjectileData) -> String) -> String {
    items
        .iter()
        .map(field)
        .collect::<Vec<_>>()
        .join(&NAME_SEPARATOR.to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(NAME_SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings<MemoryStore> {
        Settings::new(MemoryStore::new())
    }

    #[test]
    fn defaults() {
        let s = settings();
        assert_eq!(s.filter_sample_size(), 7);
        assert_eq!(s.model_id(), 0);
        assert_eq!(s.height_unit(), LengthUnit::Meter);
        assert_eq!(s.gyro_offsets(), GyroOffsets::default());
        assert_eq!(s.load_catalog().items(), projectile::default_catalog().as_slice());
    }

    #[test]
    fn scalar_round_trip_and_bad_values() {
        let mut s = settings();
        s.set_filter_sample_size(12);
        s.set_model_id(1);
        s.set_distance_unit(LengthUnit::Yard);
        assert_eq!(s.filter_sample_size(), 12);
        assert_eq!(s.model_id(), 1);
        assert_eq!(s.distance_unit(), LengthUnit::Yard);

        let mut store = s.into_store();
        store.set(KEY_FILTER_SAMPLE_SIZE, "lots".into());
        store.set(KEY_HEIGHT_UNIT, "furlong".into());
        let s = Settings::new(store);
        assert_eq!(s.filter_sample_size(), 7);
        assert_eq!(s.height_unit(), LengthUnit::Meter);
    }

    #[test]
    fn rejected_name_leaves_stored_catalog_intact() {
        let mut s = settings();
        let mut cat = s.load_catalog();
        cat.select("Golf Ball");
        assert!(cat.upsert(ProjectileData::new("Ball; red", 5.0, 38.0, 0.47)).is_err());
        s.save_catalog(&cat);

        let loaded = s.load_catalog();
        assert_eq!(loaded.len(), projectile::default_catalog().len());
        assert_eq!(loaded.selected_name(), Some("Golf Ball"));
    }

    #[test]
    fn catalog_round_trip_with_selection() {
        let mut s = settings();
        let mut cat = s.load_catalog();
        cat.upsert(ProjectileData::new("Dart", 3.5, 12.0, 0.3)).unwrap();
        cat.select("Dart");
        s.save_catalog(&cat);

        let loaded = s.load_catalog();
        assert_eq!(loaded, cat);
        assert_eq!(loaded.selected().unwrap().weight, 3.5);

        cat.remove("Dart");
        s.save_catalog(&cat);
        assert!(s.load_catalog().selected().is_none());
    }

    #[test]
    fn mismatched_lists_load_nothing() {
        let mut store = MemoryStore::new();
        store.set(KEY_NAMES, "a;b".into());
        store.set(KEY_WEIGHTS, "1;2".into());
        store.set(KEY_DIAMETERS, "1".into());
        store.set(KEY_DRAGS, "0.5;0.5".into());
        let s = Settings::new(store);
        assert!(matches!(
            s.try_load_projectiles(),
            Err(StoreError::MismatchedLists { names: 2, diameters: 1, .. })
        ));
        assert!(s.load_catalog().is_empty());
    }

    #[test]
    fn bad_number_loads_nothing() {
        let mut store = MemoryStore::new();
        store.set(KEY_NAMES, "a;b".into());
        store.set(KEY_WEIGHTS, "1;x".into());
        store.set(KEY_DIAMETERS, "1;1".into());
        store.set(KEY_DRAGS, "0.5;0.5".into());
        let s = Settings::new(store);
        let err = s.try_load_projectiles().unwrap_err();
        assert_eq!(err.to_string(), "invalid number \"x\" in projectile_weights [1]");
        assert!(s.load_catalog().is_empty());
    }

    #[test]
    fn empty_lists_are_an_empty_catalog() {
        let mut s = settings();
        s.save_catalog(&ProjectileCatalog::default());
        assert_eq!(s.try_load_projectiles().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn rec_data_per_projectile() {
        let mut s = settings();
        let mut rec = RecData {
            pitch: -3.0,
            ..RecData::default()
        };
        rec.record(20.0, 4.25);
        s.set_rec_data("Foam Ball", &rec).unwrap();
        assert_eq!(s.rec_data("Foam Ball"), Some(rec));
        assert_eq!(s.rec_data("Golf Ball"), None);
        s.remove_rec_data("Foam Ball");
        assert_eq!(s.rec_data("Foam Ball"), None);
    }

    #[test]
    fn gyro_correction() {
        let mut s = settings();
        s.set_gyro_offsets(GyroOffsets { pitch: 1.5, roll: -0.5 });
        let g = s.gyro_offsets();
        assert_eq!(g.correct_pitch(-10.0), -11.5);
        assert_eq!(g.correct_roll(0.0), 0.5);
    }
}
