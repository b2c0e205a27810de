//! Torsion spring model and catalog.

use serde::Serialize;

/// Torque-per-turn constant of the closed-form torsion spring rate.
pub const TORSION_RATE_CONSTANT: f64 = 10.67;

/// Spring wire material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub name: &'static str,
    /// Density (g/cm³)
    pub density: f64,
    /// Modulus of elasticity (N/mm²)
    pub modulus_of_elasticity: f64,
    /// Modulus of rigidity (N/mm²)
    pub torsion_modulus: f64,
}

pub const MUSIC_WIRE: Material = Material {
    name: "Music Wire",
    density: 7.85,
    modulus_of_elasticity: 207_000.0,
    torsion_modulus: 79_300.0,
};

pub const STAINLESS_302: Material = Material {
    name: "Stainless 302",
    density: 7.92,
    modulus_of_elasticity: 193_000.0,
    torsion_modulus: 69_000.0,
};

/// A torsion spring with its derived constants.
///
/// Immutable once built: every derived value is computed in [`SpringData::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpringData {
    /// Catalog id (the value carried by the device spring slot)
    pub id: usize,
    pub name: String,
    /// Wire diameter (mm)
    pub wire_diameter: f64,
    /// Outer coil diameter (mm)
    pub outer_diameter: f64,
    pub active_coils: f64,
    /// Leg lengths (mm)
    pub leg_lengths: [f64; 2],
    pub material: Material,
    /// Inner coil diameter (mm)
    pub inner_diameter: f64,
    /// Mean coil diameter (mm)
    pub mean_diameter: f64,
    pub spring_index: f64,
    /// Torque per degree of deflection (N·mm/°)
    pub rate_per_degree: f64,
}

impl SpringData {
    pub fn new(
        id: usize,
        name: impl Into<String>,
        wire_diameter: f64,
        outer_diameter: f64,
        active_coils: f64,
        leg_lengths: [f64; 2],
        material: Material,
    ) -> Self {
        let inner_diameter = outer_diameter - 2.0 * wire_diameter;
        let mean_diameter = outer_diameter - wire_diameter;
        let spring_index = if wire_diameter > 0.0 {
            mean_diameter / wire_diameter
        } else {
            0.0
        };
        let rate_per_degree = rate_per_degree(
            material.modulus_of_elasticity,
            wire_diameter,
            mean_diameter,
            active_coils,
        );
        Self {
            id,
            name: name.into(),
            wire_diameter,
            outer_diameter,
            active_coils,
            leg_lengths,
            material,
            inner_diameter,
            mean_diameter,
            spring_index,
            rate_per_degree,
        }
    }

    /// Mean coil radius plus one wire radius (mm): center of the stud to the
    /// outside edge of the leg where it leaves the coil.
    pub fn mean_radius_plus_wire(&self) -> f64 {
        (self.outer_diameter + self.wire_diameter) / 2.0
    }

    /// Torque (N·mm) at `angle` degrees of deflection.
    pub fn torque_at_degree(&self, angle: f64) -> f64 {
        self.rate_per_degree * angle
    }

    /// Force (N) at `radius` mm along the leg for `angle` degrees of deflection.
    pub fn force_at_degree(&self, angle: f64, radius: f64) -> f64 {
        if radius <= 0.0 {
            return 0.0;
        }
        self.torque_at_degree(angle) / radius
    }
}

/// Torque per turn (N·mm/rev): `E·d⁴ / (10.67·D·N)`.
pub fn rate_per_turn(elasticity: f64, wire_diameter: f64, mean_diameter: f64, active_coils: f64) -> f64 {
    let denom = TORSION_RATE_CONSTANT * mean_diameter * active_coils;
    if denom <= 0.0 {
        return 0.0;
    }
    elasticity * wire_diameter.powi(4) / denom
}

/// Torque per degree (N·mm/°), the per-turn rate spread over 360°.
pub fn rate_per_degree(elasticity: f64, wire_diameter: f64, mean_diameter: f64, active_coils: f64) -> f64 {
    rate_per_turn(elasticity, wire_diameter, mean_diameter, active_coils) / 360.0
}

/// The fixed spring catalog, indexed by id.
pub fn catalog() -> Vec<SpringData> {
    vec![
        SpringData::new(0, "Light 1.2 mm", 1.2, 11.0, 4.5, [45.0, 45.0], MUSIC_WIRE),
        SpringData::new(1, "Medium 1.5 mm", 1.5, 12.0, 4.5, [45.0, 45.0], MUSIC_WIRE),
        SpringData::new(2, "Heavy 1.8 mm", 1.8, 13.0, 5.0, [48.0, 48.0], MUSIC_WIRE),
        SpringData::new(3, "Heavy SS 1.8 mm", 1.8, 13.0, 5.0, [48.0, 48.0], STAINLESS_302),
        SpringData::new(4, "Extra Heavy 2.0 mm", 2.0, 14.0, 5.5, [50.0, 50.0], MUSIC_WIRE),
    ]
}

/// Look up a catalog spring by id.
pub fn by_id(id: usize) -> Option<SpringData> {
    catalog().into_iter().find(|s| s.id == id)
}
