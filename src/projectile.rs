//! Projectile records, the user-editable catalog and recorded test data.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::units::LengthUnit;

/// Carriage travel between recorded positions (mm).
pub const REC_POSITION_INCREMENT: usize = 5;

/// Furthest recorded carriage position (mm).
pub const REC_POSITION_MAX: usize = 100;

/// Number of recorded distance buckets, one per increment including 0.
pub const REC_LEN: usize = REC_POSITION_MAX / REC_POSITION_INCREMENT + 1;

/// Delimiter of the persisted projectile lists; not allowed in names.
pub const NAME_SEPARATOR: char = ';';

/// A named projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileData {
    pub name: String,
    /// Weight (g)
    pub weight: f64,
    /// Diameter (mm)
    pub diameter: f64,
    /// Drag coefficient
    pub drag: f64,
}

impl ProjectileData {
    pub fn new(name: impl Into<String>, weight: f64, diameter: f64, drag: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            diameter,
            drag,
        }
    }
}

/// The catalog shipped before the user edits anything.
pub fn default_catalog() -> Vec<ProjectileData> {
    vec![
        ProjectileData::new("Ping Pong Ball", 2.7, 40.0, 0.5),
        ProjectileData::new("Foam Ball", 5.0, 38.0, 0.47),
        ProjectileData::new("Golf Ball", 45.9, 42.7, 0.25),
        ProjectileData::new("Rubber Ball", 18.0, 32.0, 0.47),
    ]
}

/// Ordered projectile list with a selection that follows deletions.
///
/// Names are unique; adding a projectile with an existing name replaces it
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectileCatalog {
    items: Vec<ProjectileData>,
    selected: Option<String>,
}

impl ProjectileCatalog {
    /// Build from a stored list; a selection naming a missing entry is dropped.
    pub fn new(items: Vec<ProjectileData>, selected: Option<String>) -> Result<Self, StoreError> {
        for (i, p) in items.iter().enumerate() {
            check_name(&p.name)?;
            if items[..i].iter().any(|q| q.name == p.name) {
                return Err(StoreError::DuplicateName(p.name.clone()));
            }
        }
        let mut catalog = Self { items, selected: None };
        if let Some(name) = selected {
            catalog.select(&name);
        }
        Ok(catalog)
    }

    pub fn items(&self) -> &[ProjectileData] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ProjectileData> {
        self.items.iter().find(|p| p.name == name)
    }

    /// Insert or replace by name. Returns `true` if an entry was replaced.
    pub fn upsert(&mut self, projectile: ProjectileData) -> Result<bool, StoreError> {
        check_name(&projectile.name)?;
        match self.items.iter_mut().find(|p| p.name == projectile.name) {
            Some(existing) => {
                *existing = projectile;
                Ok(true)
            }
            None => {
                self.items.push(projectile);
                Ok(false)
            }
        }
    }

    /// Rename-aware edit: replaces `old_name` with `projectile`, keeping its
    /// position and moving the selection along.
    pub fn replace(&mut self, old_name: &str, projectile: ProjectileData) -> Result<(), StoreError> {
        check_name(&projectile.name)?;
        if projectile.name != old_name && self.get(&projectile.name).is_some() {
            return Err(StoreError::DuplicateName(projectile.name));
        }
        let Some(slot) = self.items.iter_mut().find(|p| p.name == old_name) else {
            self.items.push(projectile);
            return Ok(());
        };
        if self.selected.as_deref() == Some(old_name) {
            self.selected = Some(projectile.name.clone());
        }
        *slot = projectile;
        Ok(())
    }

    /// Remove by name. Clears the selection if it pointed at the removed entry.
    pub fn remove(&mut self, name: &str) -> Option<ProjectileData> {
        let index = self.items.iter().position(|p| p.name == name)?;
        if self.selected.as_deref() == Some(name) {
            log::info!("selected projectile {name:?} deleted, selection cleared");
            self.selected = None;
        }
        Some(self.items.remove(index))
    }

    /// Select by name. Unknown names clear the selection; returns whether
    /// the selection is now set.
    pub fn select(&mut self, name: &str) -> bool {
        if self.get(name).is_some() {
            self.selected = Some(name.to_string());
            true
        } else {
            log::warn!("projectile {name:?} not in catalog");
            self.selected = None;
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&ProjectileData> {
        self.selected.as_deref().and_then(|n| self.get(n))
    }
}

/// Names must survive the delimited list format.
fn check_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.contains(NAME_SEPARATOR) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Recorded impact distances for one projectile.
///
/// `rec_dist[i]` is the distance measured with the carriage drawn to
/// `i * REC_POSITION_INCREMENT` mm. Zero means "not recorded".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecData {
    /// Device pitch during the recording (degrees)
    pub pitch: f64,
    pub height_unit: LengthUnit,
    pub height: f64,
    pub rec_dist_unit: LengthUnit,
    #[serde(default)]
    pub rec_dist: Vec<f64>,
}

impl Default for RecData {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            height_unit: LengthUnit::Meter,
            height: 0.0,
            rec_dist_unit: LengthUnit::Meter,
            rec_dist: vec![0.0; REC_LEN],
        }
    }
}

impl RecData {
    /// Parse a stored record, padding or truncating the distances to [`REC_LEN`].
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let mut data: RecData = serde_json::from_str(json)?;
        if data.rec_dist.len() != REC_LEN {
            log::debug!("recorded distances resized from {} to {REC_LEN}", data.rec_dist.len());
            data.rec_dist.resize(REC_LEN, 0.0);
        }
        Ok(data)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Bucket index for a carriage position (mm), if it falls on an increment.
    pub fn index_for_position(position: usize) -> Option<usize> {
        (position % REC_POSITION_INCREMENT == 0 && position <= REC_POSITION_MAX)
            .then_some(position / REC_POSITION_INCREMENT)
    }

    /// Store a distance for the bucket nearest `position`.
    pub fn record(&mut self, position: f64, distance: f64) -> Option<usize> {
        if !position.is_finite() || position < 0.0 {
            return None;
        }
        let index = (position / REC_POSITION_INCREMENT as f64).round() as usize;
        let slot = self.rec_dist.get_mut(index)?;
        *slot = distance;
        Some(index)
    }

    /// Recorded `(position mm, distance)` pairs, skipping empty buckets.
    pub fn recorded(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rec_dist
            .iter()
            .enumerate()
            .filter(|(_, d)| **d != 0.0)
            .map(|(i, d)| ((i * REC_POSITION_INCREMENT) as f64, *d))
    }
}
