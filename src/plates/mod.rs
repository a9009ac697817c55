pub mod boundaries;
pub mod generation;
pub mod types;

use log::{debug, info, warn};

use crate::seeds::PlateSeedManager;
use crate::tilemap::Tilemap;

pub use boundaries::{BoundaryCoverage, BoundaryMotion};
pub use generation::{PlateAttempt, PlateGenParams, PlateGeneration};
pub use types::{BoundaryType, Plate, PlateId, Vec2};

/// Influence share and boundary tile share must both stay at or under this.
const SATURATION_LIMIT: f64 = 0.45;
/// Average closeness over influenced tiles must stay at or under this.
const CLOSENESS_LIMIT: f64 = 80.0;

/// Per-tile plate tensors. All maps share the model dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateFields {
    pub plate_id: Tilemap<PlateId>,
    /// 0..255, decays with hex distance from the nearest boundary tile.
    pub boundary_closeness: Tilemap<u8>,
    pub boundary_type: Tilemap<BoundaryType>,
    pub tectonic_stress: Tilemap<u8>,
    pub uplift_potential: Tilemap<u8>,
    pub rift_potential: Tilemap<u8>,
    /// 255 - closeness; high in stable plate interiors.
    pub shield_stability: Tilemap<u8>,
    /// Surface velocity ×100, clamped to ±127.
    pub plate_movement_u: Tilemap<i8>,
    pub plate_movement_v: Tilemap<i8>,
    /// Rotation rate ×100, clamped to ±127.
    pub plate_rotation: Tilemap<i8>,
}

impl PlateFields {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            plate_id: Tilemap::new_with(width, height, PlateId(0)),
            boundary_closeness: Tilemap::new(width, height),
            boundary_type: Tilemap::new(width, height),
            tectonic_stress: Tilemap::new(width, height),
            uplift_potential: Tilemap::new(width, height),
            rift_potential: Tilemap::new(width, height),
            shield_stability: Tilemap::new(width, height),
            plate_movement_u: Tilemap::new(width, height),
            plate_movement_v: Tilemap::new(width, height),
            plate_rotation: Tilemap::new(width, height),
        }
    }

    /// (name, length) for every tensor, used by foundation validation.
    pub fn tensor_lengths(&self) -> [(&'static str, usize); 10] {
        [
            ("plateId", self.plate_id.len()),
            ("boundaryCloseness", self.boundary_closeness.len()),
            ("boundaryType", self.boundary_type.len()),
            ("tectonicStress", self.tectonic_stress.len()),
            ("upliftPotential", self.uplift_potential.len()),
            ("riftPotential", self.rift_potential.len()),
            ("shieldStability", self.shield_stability.len()),
            ("plateMovementU", self.plate_movement_u.len()),
            ("plateMovementV", self.plate_movement_v.len()),
            ("plateRotation", self.plate_rotation.len()),
        ]
    }
}

/// Generate plates, walking the retry ladder until the boundary field is not
/// saturated. If every attempt saturates the last one is used. The plate
/// stream is restored before returning, whichever attempt was accepted.
pub fn compute_plates(params: &PlateGenParams<'_>, seeds: &mut PlateSeedManager) -> PlateGeneration {
    let generation = walk_ladder(params, seeds);
    seeds.restore();
    generation
}

fn walk_ladder(params: &PlateGenParams<'_>, seeds: &mut PlateSeedManager) -> PlateGeneration {
    let ladder = PlateAttempt::ladder(params.count);
    let mut generation = generation::generate_attempt(params, ladder[0], seeds.rng());

    for (i, attempt) in ladder.iter().enumerate() {
        if i > 0 {
            generation = generation::generate_attempt(params, *attempt, seeds.rng());
        }
        let cov = generation.coverage;
        debug!(
            "plate attempt {}: plates={} boundary_share={:.3} influence_share={:.3} avg_influence_closeness={:.1}",
            i,
            generation.plates.len(),
            cov.boundary_tile_share,
            cov.boundary_influence_share,
            cov.avg_influence_closeness,
        );
        if cov.acceptable(SATURATION_LIMIT, CLOSENESS_LIMIT) {
            info!(
                "Generated {} plates on attempt {} ({:.1}% of tiles near a boundary)",
                generation.plates.len(),
                i + 1,
                cov.boundary_influence_share * 100.0
            );
            return generation;
        }
    }

    warn!(
        "All plate attempts saturated; using last attempt ({:.1}% influence share)",
        generation.coverage.boundary_influence_share * 100.0
    );
    generation
}
