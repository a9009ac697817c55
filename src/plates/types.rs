use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::DirectionalityConfig;

/// Unique identifier for a tectonic plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlateId(pub u8);

impl PlateId {
    pub const NONE: PlateId = PlateId(255);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Relative motion class of a plate boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BoundaryType {
    #[default]
    None = 0,
    /// Plates move toward each other (collision, subduction).
    Convergent = 1,
    /// Plates pull apart (rifting).
    Divergent = 2,
    /// Plates slide past each other.
    Transform = 3,
}

impl BoundaryType {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Convergent, Self::Divergent, Self::Transform]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "no significant relative motion",
            Self::Convergent => "plates collide",
            Self::Divergent => "plates separate",
            Self::Transform => "plates slide laterally",
        }
    }
}

impl std::fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Convergent => write!(f, "convergent"),
            Self::Divergent => write!(f, "divergent"),
            Self::Transform => write!(f, "transform"),
        }
    }
}

/// A 2D vector in tile units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Dot product against `other` rotated by 90 degrees.
    pub fn dot_perp(&self, other: &Vec2) -> f64 {
        -self.y * other.x + self.x * other.y
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len < 1e-10 {
            return Self::default();
        }
        Self {
            x: self.x / len,
            y: self.y / len,
        }
    }

    pub fn rotate(&self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

/// A tectonic plate. Created once per generation attempt and not mutated after
/// its summary (area, centroid, neighbors) is filled in.
#[derive(Clone, Debug)]
pub struct Plate {
    pub id: PlateId,
    /// Voronoi site in tile coordinates.
    pub seed_x: f64,
    pub seed_y: f64,
    /// Rigid translation per step.
    pub movement: Vec2,
    /// Rotation rate in degrees per step.
    pub rotation: f64,
    /// Tile count.
    pub area: usize,
    pub centroid: (f64, f64),
    /// Sorted ids of plates sharing a boundary with this one.
    pub neighbors: Vec<PlateId>,
}

impl Plate {
    /// Generate a plate with random motion at the given site.
    pub fn random(id: PlateId, seed_x: f64, seed_y: f64, rng: &mut ChaCha8Rng) -> Self {
        let angle = (rng.gen_range(0..360) as f64).to_radians();
        let speed = 0.5 + rng.gen_range(0..100) as f64 / 200.0;
        let rotation = (rng.gen_range(0..60) as f64 - 30.0) * 0.1;

        Self {
            id,
            seed_x,
            seed_y,
            movement: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            rotation,
            area: 0,
            centroid: (seed_x, seed_y),
            neighbors: Vec::new(),
        }
    }

    /// Pull the movement angle toward a shared axis, keeping its magnitude.
    pub fn apply_directionality(&mut self, cfg: &DirectionalityConfig, rng: &mut ChaCha8Rng) {
        let cohesion = cfg.cohesion.clamp(0.0, 1.0);
        let jitter_range = cfg.angle_jitter_deg.max(0);
        let jitter = rng.gen_range(0..=jitter_range * 2) - jitter_range;

        let current = self.movement.y.atan2(self.movement.x).to_degrees();
        let magnitude = self.movement.length();
        let target = current * (1.0 - cohesion)
            + cfg.plate_axis_deg as f64 * cohesion
            + jitter as f64 * cfg.magnitude_variance;

        let rad = target.to_radians();
        self.movement = Vec2::new(rad.cos() * magnitude, rad.sin() * magnitude);
    }

    /// Velocity of the plate surface at a tile: rotation about the site plus translation.
    pub fn movement_at(&self, x: f64, y: f64, rotation_multiple: f64) -> Vec2 {
        let rel = Vec2::new(x - self.seed_x, y - self.seed_y);
        let angular = self.rotation.to_radians() * rotation_multiple;
        let rotated = rel.rotate(angular);
        Vec2::new(
            rel.x - rotated.x + self.movement.x,
            rel.y - rotated.y + self.movement.y,
        )
    }
}
