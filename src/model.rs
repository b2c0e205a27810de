//! Mechanical model of the launcher.
//!
//! Converts a carriage position (mm, 0 = fully retracted) into spring
//! deflection, forward force, stored energy, launch velocity and a
//! predicted impact point.
//!
//! ## Geometry
//!
//! Two torsion springs sit on studs either side of the barrel axis. Each
//! spring's leg rests on a support pin when unloaded and is gripped by a
//! V-notch on the carriage. Retracting the carriage drags the leg tip
//! (the "spring point") back along the axis, rotating the leg about the
//! stud:
//!
//! ```text
//!   sensor                 stud line          unloaded spring point
//!     |<---------------------->|<----- h0 ----->|
//!     |                        S                 U   <- leg S→U at the
//!     |                         \  L0          /        unloaded angle
//!     |                          \           /
//!     |              P <---------- delta ----+
//! ```
//!
//! Every query solves the S-U-P triangle by the law of cosines against the
//! unloaded lever arm `L0` and the reference angle at `U`.

use std::sync::Arc;

use serde::Serialize;

use crate::addr::SensorId;
use crate::ballistics;
use crate::geometry;
use crate::projectile::ProjectileData;
use crate::sensor::SensorDriver;
use crate::spring::SpringData;

/// Integration step of the potential-energy table (mm).
pub const POSITION_STEP: f64 = 1.0;

/// Number of springs acting on the carriage.
pub const SPRING_COUNT: f64 = 2.0;

// ---------------------------------------------------------------------------
// Device model geometry
// ---------------------------------------------------------------------------

/// Immutable geometric constants of one hardware variant.
///
/// Lengths in mm, angles in degrees, weights in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelGeometry {
    pub id: u32,
    pub name: &'static str,
    /// Center-to-center spacing of the two spring studs
    pub stud_to_stud: f64,
    /// Short sensor face to the stud centers, along the axis
    pub sensor_to_stud_center: f64,
    /// Maximum carriage position (carriage fully forward, springs unloaded)
    pub sensor_to_carriage_back_face: f64,
    /// Carriage back face to the bottom of the grip notch
    pub carriage_back_face_to_spring_point: f64,
    /// Included angle of the grip notch
    pub carriage_grip_angle: f64,
    pub carriage_weight: f64,
    /// Projectile slot floor above the barrel axis
    pub carriage_slot_offset: f64,
    pub spring_stud_radius: f64,
    pub support_radius: f64,
    pub stud_to_support_center: f64,
    pub support_angle_from_horizontal: f64,
    /// Short sensor reading minus carriage position
    pub short_sensor_offset: f64,
    /// Ground height minus long sensor reading
    pub long_sensor_offset: f64,
    pub short_driver: SensorDriver,
    pub long_driver: SensorDriver,
}

impl ModelGeometry {
    /// Driver fitted at `sensor`.
    pub fn driver(&self, sensor: SensorId) -> SensorDriver {
        match sensor {
            SensorId::Short => self.short_driver,
            SensorId::Long => self.long_driver,
        }
    }

    /// Expected at-rest reading of the short sensor (mm).
    pub fn short_target_reference(&self) -> i32 {
        (self.sensor_to_carriage_back_face + self.short_sensor_offset).round() as i32
    }

    /// Carriage position for a short sensor reading, clamped to the travel.
    pub fn position_from_range(&self, range: f64) -> f64 {
        (range - self.short_sensor_offset).clamp(0.0, self.sensor_to_carriage_back_face)
    }

    /// Device height above ground (mm) for a long sensor reading.
    pub fn height_from_range(&self, range: f64) -> f64 {
        (range + self.long_sensor_offset).max(0.0)
    }
}

pub const MODEL_STANDARD: ModelGeometry = ModelGeometry {
    id: 0,
    name: "Standard",
    stud_to_stud: 60.0,
    sensor_to_stud_center: 58.0,
    sensor_to_carriage_back_face: 70.0,
    carriage_back_face_to_spring_point: 15.0,
    carriage_grip_angle: 90.0,
    carriage_weight: 25.0,
    carriage_slot_offset: 4.0,
    spring_stud_radius: 4.0,
    support_radius: 3.0,
    stud_to_support_center: 18.0,
    support_angle_from_horizontal: 60.0,
    short_sensor_offset: 12.0,
    long_sensor_offset: 35.0,
    short_driver: SensorDriver::Vl53l4cd,
    long_driver: SensorDriver::Vl53l4cx,
};

pub const MODEL_LONG: ModelGeometry = ModelGeometry {
    id: 1,
    name: "Long Barrel",
    stud_to_stud: 70.0,
    sensor_to_stud_center: 81.5,
    sensor_to_carriage_back_face: 95.0,
    carriage_back_face_to_spring_point: 18.0,
    carriage_grip_angle: 80.0,
    carriage_weight: 32.0,
    carriage_slot_offset: 5.0,
    spring_stud_radius: 4.5,
    support_radius: 3.5,
    stud_to_support_center: 20.0,
    support_angle_from_horizontal: 62.0,
    short_sensor_offset: 10.0,
    long_sensor_offset: 42.0,
    short_driver: SensorDriver::Vl53l4cx,
    long_driver: SensorDriver::Vl53l4cx,
};

/// The fixed device model catalog.
pub fn catalog() -> [ModelGeometry; 2] {
    [MODEL_STANDARD, MODEL_LONG]
}

/// Look up a device model by id.
pub fn by_id(id: u32) -> Option<ModelGeometry> {
    catalog().into_iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// Model data
// ---------------------------------------------------------------------------

/// One node of the potential-energy table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyPoint {
    /// Carriage position (mm)
    pub position: f64,
    /// Energy stored between max position and here (J)
    pub energy: f64,
}

/// Spring-dependent constants at the unloaded position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Unloaded {
    /// Carriage back face to the leg center in the grip notch
    back_face_to_spring_point: f64,
    /// Sensor to the stud line plus the coil's outer leg edge
    sensor_to_stud_center_plus_spring_mean_radius: f64,
    /// Leg angle from horizontal (lateral axis)
    spring_angle: f64,
    /// Angle between the leg and the barrel axis at the spring point
    reference_angle: f64,
    /// Stud center to spring point
    lever_arm: f64,
    /// Sensor to the unloaded spring point
    sensor_to_spring_point: f64,
}

/// Predicted launch outcome for one carriage position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Impact {
    /// Launch velocity (m/s)
    pub velocity: f64,
    /// Launch height above ground (m)
    pub launch_height: f64,
    /// Horizontal distance to ground impact (m)
    pub distance: f64,
    /// Time of flight (s)
    pub flight_time: f64,
}

/// Live model of one device: fixed geometry plus the selected spring,
/// projectile and ballistic corrections.
#[derive(Debug, Clone)]
pub struct ModelData {
    geometry: ModelGeometry,
    spring: Option<SpringData>,
    projectile: Option<ProjectileData>,
    /// Constant force added to the springs (N)
    force_offset: f64,
    /// Fraction of spring energy delivered to the carriage
    efficiency: f64,
    /// Carriage sliding friction coefficient
    friction_coefficient: f64,
    unloaded: Option<Unloaded>,
    /// Carriage plus projectile (g)
    total_weight: f64,
    /// Projectile center above the barrel axis (mm)
    projectile_offset: f64,
    table: Arc<[EnergyPoint]>,
}

impl ModelData {
    pub fn new(geometry: ModelGeometry) -> Self {
        let total_weight = geometry.carriage_weight;
        Self {
            geometry,
            spring: None,
            projectile: None,
            force_offset: 0.0,
            efficiency: 1.0,
            friction_coefficient: 0.0,
            unloaded: None,
            total_weight,
            projectile_offset: 0.0,
            table: Arc::from(Vec::new()),
        }
    }

    pub fn geometry(&self) -> &ModelGeometry {
        &self.geometry
    }

    pub fn name(&self) -> &'static str {
        self.geometry.name
    }

    pub fn spring(&self) -> Option<&SpringData> {
        self.spring.as_ref()
    }

    pub fn projectile(&self) -> Option<&ProjectileData> {
        self.projectile.as_ref()
    }

    pub fn force_offset(&self) -> f64 {
        self.force_offset
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn friction_coefficient(&self) -> f64 {
        self.friction_coefficient
    }

    /// Maximum carriage position (mm).
    pub fn max_position(&self) -> f64 {
        self.geometry.sensor_to_carriage_back_face
    }

    /// Carriage plus projectile weight (g).
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Projectile center above the barrel axis (mm).
    pub fn projectile_offset(&self) -> f64 {
        self.projectile_offset
    }

    /// Leg angle at the max position, or 0 with no spring.
    pub fn unloaded_spring_angle(&self) -> f64 {
        self.unloaded.map_or(0.0, |u| u.spring_angle)
    }

    /// Stud-to-spring-point length at the max position, or 0 with no spring.
    pub fn unloaded_lever_arm(&self) -> f64 {
        self.unloaded.map_or(0.0, |u| u.lever_arm)
    }

    /// The current potential-energy table, descending by position.
    ///
    /// The table is replaced wholesale on spring change; a clone held by a
    /// reader keeps seeing the table it took.
    pub fn energy_table(&self) -> Arc<[EnergyPoint]> {
        Arc::clone(&self.table)
    }

    pub fn set_force_offset(&mut self, force_offset: f64) {
        self.force_offset = force_offset;
    }

    pub fn set_efficiency(&mut self, efficiency: f64) {
        self.efficiency = efficiency;
    }

    pub fn set_friction_coefficient(&mut self, friction_coefficient: f64) {
        self.friction_coefficient = friction_coefficient;
    }

    /// Select a spring and rebuild the energy table.
    pub fn set_spring(&mut self, spring: Option<SpringData>) {
        self.spring = spring;
        let Some(spring) = self.spring.as_ref() else {
            self.unloaded = None;
            self.table = Arc::from(Vec::new());
            log::debug!("{}: spring cleared", self.geometry.name);
            return;
        };
        let g = &self.geometry;

        // Leg center sits r / sin(grip/2) above the notch apex.
        let grip_correction =
            geometry::side_from_angles(spring.wire_diameter / 2.0, g.carriage_grip_angle / 2.0, 90.0);
        let back_face_to_spring_point = g.carriage_back_face_to_spring_point - grip_correction;

        let sensor_to_stud_center_plus_spring_mean_radius =
            g.sensor_to_stud_center + spring.mean_radius_plus_wire();

        // Leg tangent to the support pin, then rotated by the pin's bearing.
        let tangent_angle = geometry::angle_from_sides(
            g.stud_to_support_center,
            90.0,
            g.spring_stud_radius + g.support_radius + spring.wire_diameter,
        );
        let spring_angle = g.support_angle_from_horizontal - tangent_angle;

        let half_span = g.stud_to_stud / 2.0;
        let lever_arm = geometry::hypotenuse_from_adjacent(half_span, spring_angle);
        let reference_angle = 90.0 - spring_angle;
        let sensor_to_spring_point = sensor_to_stud_center_plus_spring_mean_radius
            + geometry::opposite_from_adjacent(half_span, spring_angle);

        self.unloaded = Some(Unloaded {
            back_face_to_spring_point,
            sensor_to_stud_center_plus_spring_mean_radius,
            spring_angle,
            reference_angle,
            lever_arm,
            sensor_to_spring_point,
        });
        self.generate_potential_energy_table();
    }

    /// Select a projectile; `None` leaves the bare carriage.
    pub fn set_projectile(&mut self, projectile: Option<ProjectileData>) {
        self.projectile = projectile;
        match &self.projectile {
            None => {
                self.total_weight = self.geometry.carriage_weight;
                self.projectile_offset = 0.0;
            }
            Some(p) => {
                self.total_weight = p.weight + self.geometry.carriage_weight;
                // Round projectile resting in a 90° V slot.
                self.projectile_offset = geometry::side_from_angles(p.diameter / 2.0, 45.0, 90.0)
                    + self.geometry.carriage_slot_offset;
            }
        }
    }

    /// Delta between unloaded and loaded spring points, and the loaded lever arm.
    fn solve(&self, u: &Unloaded, position: f64) -> (f64, f64) {
        let position = position.min(self.geometry.sensor_to_carriage_back_face);
        let loaded = position + u.back_face_to_spring_point;
        // Ahead of the unloaded point the notch is clear of the leg.
        let delta = (u.sensor_to_spring_point - loaded).max(0.0);
        if delta == 0.0 {
            return (0.0, u.lever_arm);
        }
        let lever_arm = geometry::side_from_sas(u.lever_arm, delta, u.reference_angle);
        (delta, lever_arm)
    }

    /// Leg angle from horizontal at `position` (degrees).
    pub fn spring_angle_at_position(&self, position: f64) -> f64 {
        let Some(u) = self.unloaded.as_ref() else {
            return 0.0;
        };
        let (delta, lever_arm) = self.solve(u, position);
        if delta == 0.0 {
            return u.spring_angle;
        }
        u.spring_angle - geometry::angle_from_sss(u.lever_arm, lever_arm, delta)
    }

    /// Stud-to-spring-point length at `position` (mm).
    pub fn lever_arm_at_position(&self, position: f64) -> f64 {
        match self.unloaded.as_ref() {
            Some(u) => self.solve(u, position).1,
            None => 0.0,
        }
    }

    /// Forward force of one spring at `position` (N).
    pub fn forward_force(&self, position: f64) -> f64 {
        let (Some(spring), Some(u)) = (self.spring.as_ref(), self.unloaded.as_ref()) else {
            return 0.0;
        };
        let (delta, lever_arm) = self.solve(u, position);
        if delta == 0.0 {
            return 0.0;
        }
        let deflection = geometry::angle_from_sss(u.lever_arm, lever_arm, delta);
        let angle = u.spring_angle - deflection;
        spring.force_at_degree(deflection, lever_arm) * angle.to_radians().cos()
    }

    /// Forward force of both springs at `position` (N).
    pub fn total_forward_force(&self, position: f64) -> f64 {
        self.forward_force(position) * SPRING_COUNT
    }

    /// Rebuild the energy table from the max position down to 0.
    pub fn generate_potential_energy_table(&mut self) {
        if self.unloaded.is_none() {
            self.table = Arc::from(Vec::new());
            return;
        }
        let max = self.geometry.sensor_to_carriage_back_face.max(0.0);
        let mut points = Vec::with_capacity((max / POSITION_STEP) as usize + 2);
        points.push(EnergyPoint { position: max, energy: 0.0 });

        let mut energy = 0.0;
        let mut prev = max;
        let mut i = 1u32;
        while prev > 0.0 {
            let position = (max - f64::from(i) * POSITION_STEP).max(0.0);
            // N·mm → J
            energy += self.total_forward_force(position) * (prev - position) / 1000.0;
            points.push(EnergyPoint { position, energy });
            prev = position;
            i += 1;
        }
        log::debug!(
            "{}: energy table rebuilt ({} nodes, {:.4} J at full draw)",
            self.geometry.name,
            points.len(),
            energy,
        );
        self.table = Arc::from(points);
    }

    /// Stored energy at `position` (J), linearly interpolated.
    ///
    /// Returns 0 outside the table or when no spring is selected.
    pub fn potential_energy_at_position(&self, position: f64) -> f64 {
        let table = &self.table;
        let Some(first) = table.first() else {
            return 0.0;
        };
        if !(0.0..=first.position).contains(&position) {
            return 0.0;
        }
        // First node at or behind `position`; the last node is 0 so it exists.
        let idx = table.partition_point(|e| e.position > position);
        let Some(below) = table.get(idx) else {
            return 0.0;
        };
        if below.position == position || idx == 0 {
            return below.energy;
        }
        let above = table[idx - 1];
        let t = (position - below.position) / (above.position - below.position);
        below.energy + (above.energy - below.energy) * t
    }

    /// Launch velocity (m/s) after releasing from `position` at `pitch` degrees.
    ///
    /// Spring energy plus the force offset over the travel, scaled by the
    /// efficiency, minus sliding friction and the climb up the barrel.
    pub fn launch_velocity(&self, position: f64, pitch: f64) -> f64 {
        if self.spring.is_none() || self.total_weight <= 0.0 {
            return 0.0;
        }
        let max = self.geometry.sensor_to_carriage_back_face;
        let position = position.clamp(0.0, max);
        let travel = (max - position) / 1000.0;
        let mass = self.total_weight / 1000.0;

        let spring_energy = self.potential_energy_at_position(position) + self.force_offset * travel;
        let pitch = pitch.to_radians();
        let losses = mass
            * ballistics::G_ACCEL_MPS2
            * travel
            * (self.friction_coefficient * pitch.cos() + pitch.sin());
        let energy = spring_energy * self.efficiency - losses;
        if energy <= 0.0 {
            return 0.0;
        }
        (2.0 * energy / mass).sqrt()
    }

    /// Predict the impact of a launch from `position`, at `pitch` degrees,
    /// with the barrel axis `height` meters above ground.
    pub fn predict_impact(&self, position: f64, pitch: f64, height: f64) -> Impact {
        let velocity = self.launch_velocity(position, pitch);
        if velocity <= 0.0 {
            return Impact::default();
        }
        let launch_height = height + self.projectile_offset * pitch.to_radians().cos() / 1000.0;
        let distance = ballistics::impact_distance(velocity, launch_height, pitch);
        let flight_time = ballistics::flight_time(distance, pitch, velocity);
        Impact {
            velocity,
            launch_height,
            distance,
            flight_time,
        }
    }

    /// Sampled flight path `(distance, height)` in meters for plotting.
    pub fn trajectory(&self, position: f64, pitch: f64, height: f64, samples: usize) -> Vec<(f64, f64)> {
        let impact = self.predict_impact(position, pitch, height);
        if impact.velocity <= 0.0 {
            return Vec::new();
        }
        ballistics::trajectory_points(impact.velocity, impact.launch_height, pitch, impact.flight_time, samples)
    }

    /// Sensor to stud line plus the spring's outer leg radius (mm), or 0 with no spring.
    pub fn sensor_to_stud_center_plus_spring_mean_radius(&self) -> f64 {
        self.unloaded
            .map_or(0.0, |u| u.sensor_to_stud_center_plus_spring_mean_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spring;
    use approx::assert_relative_eq;

    fn model_with_spring(geometry: ModelGeometry, spring_id: usize) -> ModelData {
        let mut m = ModelData::new(geometry);
        m.set_spring(spring::by_id(spring_id));
        m
    }

    #[test]
    fn no_spring_is_neutral() {
        let m = ModelData::new(MODEL_STANDARD);
        assert_eq!(m.spring_angle_at_position(10.0), 0.0);
        assert_eq!(m.total_forward_force(10.0), 0.0);
        assert_eq!(m.potential_energy_at_position(10.0), 0.0);
        assert_eq!(m.launch_velocity(0.0, 10.0), 0.0);
        assert_eq!(m.predict_impact(0.0, 10.0, 1.0), Impact::default());
        assert!(m.energy_table().is_empty());
    }

    #[test]
    fn clearing_spring_clears_table() {
        let mut m = model_with_spring(MODEL_STANDARD, 1);
        assert!(!m.energy_table().is_empty());
        m.set_spring(None);
        assert!(m.energy_table().is_empty());
        assert_eq!(m.unloaded_spring_angle(), 0.0);
        assert_eq!(m.potential_energy_at_position(0.0), 0.0);
    }

    #[test]
    fn angle_monotonic_in_position() {
        for geometry in catalog() {
            for s in spring::catalog() {
                let m = model_with_spring(geometry, s.id);
                let max = m.max_position();
                let mut prev = m.spring_angle_at_position(0.0);
                let mut p = 0.25;
                while p <= max {
                    let a = m.spring_angle_at_position(p);
                    assert!(a >= prev - 1e-9, "{} / {}: angle fell at {p}", geometry.name, s.name);
                    assert!(a.is_finite());
                    prev = a;
                    p += 0.25;
                }
                assert_eq!(m.spring_angle_at_position(max), m.unloaded_spring_angle());
            }
        }
    }

    #[test]
    fn force_projects_on_current_leg_angle() {
        let m = model_with_spring(MODEL_STANDARD, 1);
        let s = m.spring().unwrap();
        for p in [0.0, 10.0, m.max_position() / 2.0, m.max_position() - 1.0] {
            let angle = m.spring_angle_at_position(p);
            let deflection = m.unloaded_spring_angle() - angle;
            let expected = s.force_at_degree(deflection, m.lever_arm_at_position(p)) * angle.to_radians().cos();
            assert_relative_eq!(m.forward_force(p), expected, max_relative = 1e-12);
            assert_relative_eq!(m.total_forward_force(p), 2.0 * expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn engaged_through_most_of_travel() {
        // The notch picks the legs up within the last mm of travel.
        for geometry in catalog() {
            for s in spring::catalog() {
                let m = model_with_spring(geometry, s.id);
                assert!(m.total_forward_force(m.max_position() - 1.0) > 0.0);
                assert!(m.spring_angle_at_position(0.0) < m.unloaded_spring_angle() - 45.0);
            }
        }
    }

    #[test]
    fn position_clamped_above_max() {
        let m = model_with_spring(MODEL_STANDARD, 0);
        let max = m.max_position();
        assert_eq!(m.spring_angle_at_position(max + 50.0), m.spring_angle_at_position(max));
        assert_eq!(m.total_forward_force(max + 50.0), 0.0);
    }

    #[test]
    fn negative_positions_keep_deflecting() {
        let m = model_with_spring(MODEL_STANDARD, 0);
        assert!(m.spring_angle_at_position(-5.0) < m.spring_angle_at_position(0.0));
    }

    #[test]
    fn unloaded_geometry() {
        let m = model_with_spring(MODEL_STANDARD, 4);
        // 2.0 mm wire: tangent asin(9/18) = 30°, support at 60°
        assert_relative_eq!(m.unloaded_spring_angle(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(m.unloaded_lever_arm(), 30.0 / 30f64.to_radians().cos(), epsilon = 1e-9);
        assert_relative_eq!(m.sensor_to_stud_center_plus_spring_mean_radius(), 58.0 + 8.0);
        assert_relative_eq!(m.lever_arm_at_position(m.max_position()), m.unloaded_lever_arm());
    }

    #[test]
    fn table_descending_and_monotonic() {
        let m = model_with_spring(MODEL_LONG, 2);
        let table = m.energy_table();
        assert_eq!(table.first().unwrap().position, m.max_position());
        assert_eq!(table.last().unwrap().position, 0.0);
        assert_eq!(table.len(), m.max_position() as usize + 1);
        for w in table.windows(2) {
            assert!(w[1].position < w[0].position);
            assert!(w[1].energy >= w[0].energy);
        }
        assert!(m.potential_energy_at_position(0.0) >= m.potential_energy_at_position(m.max_position()));
        assert!(m.potential_energy_at_position(0.0) > 0.0);
    }

    #[test]
    fn interpolation_exact_at_nodes() {
        let m = model_with_spring(MODEL_STANDARD, 1);
        for node in m.energy_table().iter() {
            assert_eq!(m.potential_energy_at_position(node.position), node.energy);
        }
    }

    #[test]
    fn interpolation_between_nodes() {
        let m = model_with_spring(MODEL_STANDARD, 1);
        let a = m.potential_energy_at_position(20.0);
        let b = m.potential_energy_at_position(21.0);
        let mid = m.potential_energy_at_position(20.5);
        assert_relative_eq!(mid, (a + b) / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn interpolation_outside_domain() {
        let m = model_with_spring(MODEL_STANDARD, 1);
        assert_eq!(m.potential_energy_at_position(-0.1), 0.0);
        assert_eq!(m.potential_energy_at_position(m.max_position() + 0.1), 0.0);
        assert_eq!(m.potential_energy_at_position(f64::NAN), 0.0);
    }

    #[test]
    fn spring_change_swaps_table() {
        let mut m = model_with_spring(MODEL_STANDARD, 0);
        let old = m.energy_table();
        m.set_spring(spring::by_id(4));
        let new = m.energy_table();
        assert!(!Arc::ptr_eq(&old, &new));
        assert!(new.last().unwrap().energy > old.last().unwrap().energy);
    }

    #[test]
    fn projectile_weight_and_offset() {
        let mut m = ModelData::new(MODEL_STANDARD);
        assert_eq!(m.total_weight(), 25.0);
        m.set_projectile(Some(ProjectileData::new("ball", 10.0, 20.0, 0.47)));
        assert_eq!(m.total_weight(), 35.0);
        assert_relative_eq!(m.projectile_offset(), 10.0 * 2f64.sqrt() + 4.0, epsilon = 1e-9);
        m.set_projectile(None);
        assert_eq!(m.total_weight(), 25.0);
        assert_eq!(m.projectile_offset(), 0.0);
    }

    #[test]
    fn corrections_shape_velocity() {
        let mut m = model_with_spring(MODEL_STANDARD, 2);
        m.set_projectile(Some(ProjectileData::new("ball", 10.0, 20.0, 0.47)));
        let base = m.launch_velocity(0.0, 0.0);
        assert!(base > 0.0);
        assert_eq!(m.launch_velocity(m.max_position(), 0.0), 0.0);

        // Velocity from energy: v = sqrt(2E/m)
        let e = m.potential_energy_at_position(0.0);
        assert_relative_eq!(base, (2.0 * e / 0.035).sqrt(), max_relative = 1e-12);

        m.set_efficiency(0.5);
        assert!(m.launch_velocity(0.0, 0.0) < base);
        m.set_efficiency(1.0);
        m.set_force_offset(2.0);
        assert!(m.launch_velocity(0.0, 0.0) > base);
        m.set_force_offset(0.0);
        m.set_friction_coefficient(0.3);
        assert!(m.launch_velocity(0.0, 0.0) < base);
        m.set_friction_coefficient(0.0);
        assert!(m.launch_velocity(0.0, 45.0) < base);
    }

    #[test]
    fn impact_uses_ballistics() {
        let mut m = model_with_spring(MODEL_STANDARD, 4);
        m.set_projectile(Some(ProjectileData::new("ball", 8.0, 16.0, 0.47)));
        let impact = m.predict_impact(0.0, 20.0, 1.0);
        assert!(impact.distance > 0.0);
        assert_relative_eq!(
            impact.distance,
            ballistics::impact_distance(impact.velocity, impact.launch_height, 20.0),
        );
        assert!(impact.launch_height > 1.0);

        let path = m.trajectory(0.0, 20.0, 1.0, 16);
        assert_eq!(path.len(), 17);
        let (x, y) = path[path.len() - 1];
        assert_relative_eq!(x, impact.distance, max_relative = 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn sensor_mapping() {
        let g = MODEL_STANDARD;
        assert_eq!(g.short_target_reference(), 82);
        assert_eq!(g.position_from_range(82.0), 70.0);
        assert_eq!(g.position_from_range(200.0), 70.0);
        assert_eq!(g.position_from_range(0.0), 0.0);
        assert_eq!(g.height_from_range(965.0), 1000.0);
        assert_eq!(g.driver(SensorId::Long), SensorDriver::Vl53l4cx);
    }

    #[test]
    fn catalog_lookup() {
        assert_eq!(by_id(1).unwrap().name, "Long Barrel");
        assert!(by_id(7).is_none());
    }
}
