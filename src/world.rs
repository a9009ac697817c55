//! World model
//!
//! The per-run foundation snapshot: plate tensors, dynamics tensors, the plate
//! list, how the plate seed was chosen, and the configuration it was built
//! with. Built once by the orchestrator and read by every later stage.

use log::{debug, info};

use crate::adapter::EngineAdapter;
use crate::config::{MapGenConfig, PlatesConfig};
use crate::dynamics::{self, DynamicsFields};
use crate::error::{MapGenError, Result};
use crate::plates::{self, BoundaryCoverage, Plate, PlateFields, PlateGenParams};
use crate::seeds::{PlateSeedManager, PlateSeedSnapshot, RunSeeds};

/// Plates per tile when the count is derived from map area.
const AUTO_PLATES_PER_TILE: f64 = 0.0025;
const AUTO_PLATES_MIN: usize = 8;

/// Resolve the major plate count for a map.
pub fn resolve_plate_count(width: usize, height: usize, cfg: &PlatesConfig) -> usize {
    if cfg.auto_count {
        AUTO_PLATES_MIN.max(((width * height) as f64 * AUTO_PLATES_PER_TILE).round() as usize)
    } else {
        cfg.count.max(2)
    }
}

/// Foundation tensors and metadata for one run.
#[derive(Clone, Debug)]
pub struct WorldModel {
    /// Map width in tiles
    width: usize,
    /// Map height in tiles
    height: usize,
    /// Seeds used for generation (allows recreation)
    seeds: RunSeeds,
    /// Plate seed provenance and final site locations
    snapshot: PlateSeedSnapshot,
    /// Plates of the accepted attempt
    plates: Vec<Plate>,
    /// Per-tile plate tensors
    fields: PlateFields,
    /// Wind, current and pressure tensors
    dynamics: DynamicsFields,
    /// Boundary coverage of the accepted attempt
    coverage: BoundaryCoverage,
    /// Frozen copy of the configuration the model was built from
    config: MapGenConfig,
}

impl WorldModel {
    /// Compute plates, pressure, winds and currents for a map.
    pub fn new(
        width: usize,
        height: usize,
        config: &MapGenConfig,
        adapter: &mut dyn EngineAdapter,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapGenError::InvalidDimensions { width, height });
        }

        let count = resolve_plate_count(width, height, &config.plates);
        let mut plate_seeds = PlateSeedManager::capture(width, height, &config.plates, adapter);
        info!("Building world model {}x{} with {} plates", width, height, count);
        debug!("{}", plate_seeds.seeds());

        let params = PlateGenParams {
            width,
            height,
            count,
            relaxation_steps: config.plates.relaxation_steps,
            rotation_multiple: config.plates.rotation_multiple,
            directionality: config.dynamics.directionality.as_ref(),
        };
        let generation = plates::compute_plates(&params, &mut plate_seeds);
        let sites: Vec<(f64, f64)> = generation.plates.iter().map(|p| (p.seed_x, p.seed_y)).collect();
        let (snapshot, seeds) = plate_seeds.finalize(&sites);

        let host: &dyn EngineAdapter = &*adapter;
        let latitude = |y: usize| {
            let lat = host.get_latitude(0, y);
            if lat.is_finite() {
                lat
            } else {
                dynamics::fallback_latitude(y, height)
            }
        };

        let pressure = dynamics::compute_pressure(
            width,
            height,
            &config.dynamics.mantle,
            &mut RunSeeds::rng(seeds.mantle),
        );
        let (wind_u, wind_v) = dynamics::compute_winds(
            width,
            height,
            &config.dynamics.wind,
            latitude,
            &mut RunSeeds::rng(seeds.winds),
        );
        let (current_u, current_v) =
            dynamics::compute_currents(width, height, latitude, |x, y| host.is_water(x, y));

        Ok(Self {
            width,
            height,
            seeds,
            snapshot,
            plates: generation.plates,
            fields: generation.fields,
            dynamics: DynamicsFields {
                wind_u,
                wind_v,
                current_u,
                current_v,
                pressure,
            },
            coverage: generation.coverage,
            config: config.clone(),
        })
    }

    /// Zero every tensor and drop the plate list, keeping dimensions.
    pub fn reset(&mut self) {
        self.plates.clear();
        self.fields = PlateFields::empty(self.width, self.height);
        self.dynamics = DynamicsFields::empty(self.width, self.height);
        self.coverage = BoundaryCoverage::default();
        self.snapshot.site_locations.clear();
    }

    /// Check that every tensor exists and covers the whole map.
    pub fn validate(&self) -> Result<()> {
        let expected = self.width * self.height;
        let tensors = self
            .fields
            .tensor_lengths()
            .into_iter()
            .chain(self.dynamics.tensor_lengths());
        for (name, actual) in tensors {
            if actual == 0 {
                return Err(MapGenError::MissingTensor(name));
            }
            if actual != expected {
                return Err(MapGenError::LengthMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn seeds(&self) -> &RunSeeds {
        &self.seeds
    }

    pub fn seed_snapshot(&self) -> &PlateSeedSnapshot {
        &self.snapshot
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    pub fn fields(&self) -> &PlateFields {
        &self.fields
    }

    pub fn dynamics(&self) -> &DynamicsFields {
        &self.dynamics
    }

    pub fn coverage(&self) -> &BoundaryCoverage {
        &self.coverage
    }

    pub fn config(&self) -> &MapGenConfig {
        &self.config
    }

    /// True once plates exist (cleared by [`WorldModel::reset`]).
    pub fn is_initialized(&self) -> bool {
        !self.plates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::SeedMode;
    use crate::tilemap::Tilemap;

    fn fixed_config(seed: u64, count: usize) -> MapGenConfig {
        let mut cfg = MapGenConfig::default();
        cfg.plates.seed_mode = SeedMode::Fixed;
        cfg.plates.fixed_seed = Some(seed);
        cfg.plates.auto_count = false;
        cfg.plates.count = count;
        cfg.plates.relaxation_steps = 1;
        cfg
    }

    #[test]
    fn test_resolve_plate_count() {
        let auto = PlatesConfig::default();
        assert_eq!(resolve_plate_count(10, 10, &auto), 8);
        assert_eq!(resolve_plate_count(100, 60, &auto), 15);
        let pinned = PlatesConfig {
            auto_count: false,
            count: 4,
            ..PlatesConfig::default()
        };
        assert_eq!(resolve_plate_count(100, 60, &pinned), 4);
    }

    #[test]
    fn test_new_model_validates() {
        let mut adapter = MockAdapter::new(24, 16, 1);
        let model = WorldModel::new(24, 16, &fixed_config(42, 4), &mut adapter).unwrap();
        model.validate().unwrap();
        assert!(model.is_initialized());
        assert_eq!(model.seed_snapshot().seed, 42);
        assert_eq!(model.seed_snapshot().site_locations.len(), model.plates().len());
    }

    #[test]
    fn test_same_seed_same_model() {
        let cfg = fixed_config(7, 5);
        let a = WorldModel::new(20, 12, &cfg, &mut MockAdapter::new(20, 12, 1)).unwrap();
        let b = WorldModel::new(20, 12, &cfg, &mut MockAdapter::new(20, 12, 99)).unwrap();
        assert_eq!(a.fields(), b.fields());
        assert_eq!(a.dynamics(), b.dynamics());
    }

    #[test]
    fn test_reset_clears_fields() {
        let mut adapter = MockAdapter::new(16, 10, 1);
        let mut model = WorldModel::new(16, 10, &fixed_config(3, 4), &mut adapter).unwrap();
        model.reset();
        assert!(!model.is_initialized());
        assert!(model.fields().boundary_closeness.as_slice().iter().all(|&c| c == 0));
        assert!(model.dynamics().pressure.as_slice().iter().all(|&p| p == 0));
        model.validate().unwrap();
    }

    #[test]
    fn test_validate_reports_missing_and_short_tensors() {
        let mut adapter = MockAdapter::new(16, 10, 1);
        let mut model = WorldModel::new(16, 10, &fixed_config(3, 4), &mut adapter).unwrap();
        model.dynamics.pressure = Tilemap::from_vec(16, 10, Vec::new());
        assert!(matches!(model.validate(), Err(MapGenError::MissingTensor("pressure"))));

        model.dynamics.pressure = Tilemap::new(16, 10);
        model.fields.rift_potential = Tilemap::from_vec(16, 10, vec![0; 20]);
        assert!(matches!(
            model.validate(),
            Err(MapGenError::LengthMismatch {
                name: "riftPotential",
                expected: 160,
                actual: 20
            })
        ));
    }

    #[test]
    fn test_host_stream_ignores_plate_retries() {
        // Two plates settle early; twelve on an 8x8 map run the whole ladder.
        let after_foundation = |count: usize| {
            let mut cfg = MapGenConfig::default();
            cfg.plates.auto_count = false;
            cfg.plates.count = count;
            let mut adapter = MockAdapter::new(8, 8, 31);
            WorldModel::new(8, 8, &cfg, &mut adapter).unwrap();
            let calls = adapter.random_calls();
            let next: Vec<i32> = (0..4).map(|_| adapter.get_random_number(1000, "Next")).collect();
            (calls, next)
        };
        let (calls_first, draws_first) = after_foundation(2);
        let (calls_last, draws_last) = after_foundation(12);
        assert_eq!(calls_first, 1);
        assert_eq!(calls_first, calls_last);
        assert_eq!(draws_first, draws_last);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut adapter = MockAdapter::new(1, 1, 1);
        let err = WorldModel::new(0, 8, &MapGenConfig::default(), &mut adapter).unwrap_err();
        assert!(matches!(err, MapGenError::InvalidDimensions { width: 0, height: 8 }));
    }
}
