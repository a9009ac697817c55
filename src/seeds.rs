//! Seed management for map generation
//!
//! One run seed is resolved per map (from the host engine or from config) and
//! every randomized system gets its own sub-seed derived from it, so plate
//! retries never shift the draws of later systems.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::adapter::EngineAdapter;
use crate::config::{PlatesConfig, SeedMode};

/// Sub-seeds for the foundation systems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSeeds {
    /// Resolved plate seed (fixed seed + offset, or host-provided)
    pub master: u64,
    /// Plate sites, motion and secondary cells
    pub plates: u64,
    /// Mantle pressure bumps
    pub mantle: u64,
    /// Jet streak placement and row variance
    pub winds: u64,
    /// Baseline rainfall noise
    pub climate: u64,
}

impl RunSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            plates: derive_seed(master, "plates"),
            mantle: derive_seed(master, "mantle"),
            winds: derive_seed(master, "winds"),
            climate: derive_seed(master, "climate"),
        }
    }

    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }
}

/// Derive a sub-seed from a master seed and a system name.
pub fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for RunSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunSeeds {{ master: {}, plates: {}, mantle: {}, winds: {}, climate: {} }}",
            self.master, self.plates, self.mantle, self.winds, self.climate,
        )
    }
}

/// Frozen record of how the plate seed was chosen, kept on the world model.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateSeedSnapshot {
    pub width: usize,
    pub height: usize,
    pub seed_mode: SeedMode,
    pub seed: u64,
    pub seed_offset: i64,
    /// Final plate site locations, filled in by [`PlateSeedManager::finalize`].
    pub site_locations: Vec<(f64, f64)>,
}

/// Plate seed scope. The host stream is read at most once, in
/// [`PlateSeedManager::capture`]; plate generation then draws from a private
/// stream that [`PlateSeedManager::restore`] rewinds to its captured state, so
/// the number of plate retries never changes what later stages see.
pub struct PlateSeedManager {
    snapshot: PlateSeedSnapshot,
    seeds: RunSeeds,
    captured: ChaCha8Rng,
    rng: ChaCha8Rng,
}

impl PlateSeedManager {
    pub fn capture(
        width: usize,
        height: usize,
        config: &PlatesConfig,
        adapter: &mut dyn EngineAdapter,
    ) -> Self {
        let base = match (config.seed_mode, config.fixed_seed) {
            (SeedMode::Fixed, Some(seed)) => seed,
            _ => adapter.get_random_number(i32::MAX, "PlateSeed").max(0) as u64,
        };
        let seed = base.wrapping_add_signed(config.seed_offset);
        let seed_mode = if config.fixed_seed.is_some() {
            config.seed_mode
        } else {
            SeedMode::Engine
        };

        Self::with_snapshot(PlateSeedSnapshot {
            width,
            height,
            seed_mode,
            seed,
            seed_offset: config.seed_offset,
            site_locations: Vec::new(),
        })
    }

    /// Scope for a known seed, without consulting a host.
    pub fn fixed(width: usize, height: usize, seed: u64) -> Self {
        Self::with_snapshot(PlateSeedSnapshot {
            width,
            height,
            seed_mode: SeedMode::Fixed,
            seed,
            seed_offset: 0,
            site_locations: Vec::new(),
        })
    }

    fn with_snapshot(snapshot: PlateSeedSnapshot) -> Self {
        let seeds = RunSeeds::from_master(snapshot.seed);
        let captured = RunSeeds::rng(seeds.plates);
        Self {
            rng: captured.clone(),
            captured,
            seeds,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &PlateSeedSnapshot {
        &self.snapshot
    }

    pub fn seeds(&self) -> &RunSeeds {
        &self.seeds
    }

    /// Plate stream for the current attempt.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Rewind the plate stream to the state it had at capture.
    pub fn restore(&mut self) {
        self.rng = self.captured.clone();
    }

    pub fn is_restored(&self) -> bool {
        self.rng == self.captured
    }

    /// Close the scope, recording the accepted plate sites.
    pub fn finalize(mut self, sites: &[(f64, f64)]) -> (PlateSeedSnapshot, RunSeeds) {
        self.restore();
        self.snapshot.site_locations = sites.to_vec();
        (self.snapshot, self.seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockAdapter;

    #[test]
    fn test_deterministic_derivation() {
        let a = RunSeeds::from_master(12345);
        let b = RunSeeds::from_master(12345);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_systems_get_different_seeds() {
        let seeds = RunSeeds::from_master(12345);
        assert_ne!(seeds.plates, seeds.mantle);
        assert_ne!(seeds.mantle, seeds.winds);
        assert_ne!(seeds.winds, seeds.climate);
    }

    #[test]
    fn test_fixed_mode_ignores_host_stream() {
        let mut adapter = MockAdapter::new(10, 10, 7);
        let config = PlatesConfig {
            seed_mode: SeedMode::Fixed,
            fixed_seed: Some(42),
            seed_offset: 3,
            ..PlatesConfig::default()
        };
        let manager = PlateSeedManager::capture(10, 10, &config, &mut adapter);
        assert_eq!(manager.snapshot().seed, 45);
        assert_eq!(manager.seeds().master, 45);
        assert_eq!(adapter.random_calls(), 0);
    }

    #[test]
    fn test_engine_mode_draws_once() {
        let mut adapter = MockAdapter::new(10, 10, 7);
        let config = PlatesConfig::default();
        let manager = PlateSeedManager::capture(10, 10, &config, &mut adapter);
        assert_eq!(manager.snapshot().seed_mode, SeedMode::Engine);
        assert_eq!(adapter.random_calls(), 1);
    }

    #[test]
    fn test_restore_rewinds_plate_stream() {
        use rand::Rng;

        let mut manager = PlateSeedManager::fixed(10, 10, 42);
        let first: u64 = manager.rng().gen();
        for _ in 0..50 {
            let _: u64 = manager.rng().gen();
        }
        assert!(!manager.is_restored());
        manager.restore();
        assert!(manager.is_restored());
        assert_eq!(manager.rng().gen::<u64>(), first);

        let (snapshot, seeds) = manager.finalize(&[(1.0, 2.0)]);
        assert_eq!(snapshot.site_locations, vec![(1.0, 2.0)]);
        assert_eq!(seeds, RunSeeds::from_master(42));
    }
}
