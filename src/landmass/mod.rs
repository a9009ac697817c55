//! Plate-driven landmass generation.
//!
//! Plates are typed continental or oceanic, a height per tile is synthesized
//! from the crust type, and land is whatever rises above the solved sea
//! level. Land is then summarized into west-to-east ordered windows that the
//! rest of the pipeline uses as continents.

pub mod crust;
pub mod heightfield;
pub mod separation;
pub mod windows;

use log::{info, warn};

use crate::config::{ContinentBoundsConfig, CrustMode, LandmassConfig};
use crate::context::{HeightfieldWrite, MapContext};
use crate::tilemap::Tilemap;

pub use crust::{assign_crust_by_area, assign_crust_types, CrustParams, CrustType, PlateGraph};
pub use heightfield::{compute_sea_level, generate_base_heightfield, HeightParams};
pub use separation::{separate_windows, SeparationOutcome};
pub use windows::{apply_landmass_post_adjustments, build_windows};

/// Inclusive tile bounds of one landmass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandmassWindow {
    pub west: usize,
    pub east: usize,
    pub south: usize,
    pub north: usize,
    pub continent: usize,
}

impl LandmassWindow {
    pub fn width(&self) -> usize {
        self.east.saturating_sub(self.west) + 1
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.west..=self.east).contains(&x) && (self.south..=self.north).contains(&y)
    }
}

#[derive(Clone, Debug)]
pub struct LandmassResult {
    pub windows: Vec<LandmassWindow>,
    pub land_mask: Tilemap<u8>,
    pub land_tiles: usize,
    pub sea_level: f64,
    pub target_land: usize,
    /// First and last window, when there are at least two.
    pub start_regions: Option<(LandmassWindow, LandmassWindow)>,
}

impl LandmassResult {
    /// Westmost and eastmost windows.
    pub fn continents(&self) -> Option<(LandmassWindow, LandmassWindow)> {
        match (self.windows.first(), self.windows.last()) {
            (Some(w), Some(e)) if self.windows.len() >= 2 => Some((*w, *e)),
            _ => None,
        }
    }
}

/// Effective water share in percent.
pub fn water_percent(cfg: &LandmassConfig) -> f64 {
    let scalar = cfg.water_scalar.clamp(0.25, 1.75);
    (cfg.base_water_percent * scalar).clamp(0.0, 100.0)
}

pub fn target_land_tiles(total: usize, water_pct: f64) -> usize {
    if total < 2 {
        return total;
    }
    let land = (total as f64 * (1.0 - water_pct / 100.0)).round() as i64;
    land.clamp(1, total as i64 - 1) as usize
}

/// Maximum boundary closeness a land tile may have.
pub fn closeness_limit(expand_tiles: i32) -> u8 {
    (255 + expand_tiles as i64 * 8).clamp(150, 255) as u8
}

/// Continent bounds used when no landmass windows exist.
pub fn default_continent_bounds(
    width: usize,
    height: usize,
    cfg: &ContinentBoundsConfig,
    west: bool,
) -> LandmassWindow {
    let max_x = width.saturating_sub(1);
    let max_y = height.saturating_sub(1);
    let offset = cfg.avoid_seam_offset;
    let half = width / 2;
    let (w, e, continent) = if west {
        (offset, half.saturating_sub(offset), 0)
    } else {
        (half + offset, width.saturating_sub(offset), 1)
    };
    let south = cfg.polar_water_rows.min(max_y);
    let north = height.saturating_sub(cfg.polar_water_rows).min(max_y).max(south);
    let w = w.min(max_x);
    LandmassWindow {
        west: w,
        east: e.min(max_x).max(w),
        south,
        north,
        continent,
    }
}

/// Type crust, solve sea level and write land/water to the map.
///
/// Returns `None` when the foundation is missing or its plate tensors do not
/// cover the map.
pub fn create_plate_driven_landmasses(ctx: &mut MapContext<'_>) -> Option<LandmassResult> {
    let (width, height) = (ctx.width, ctx.height);
    let size = width * height;

    let Some(world) = ctx.world.as_ref() else {
        warn!("Landmass generation skipped: foundation missing");
        return None;
    };
    let plate_id = world.fields().plate_id.clone();
    let closeness = world.fields().boundary_closeness.clone();
    if plate_id.len() != size || closeness.len() != size {
        warn!("Landmass generation skipped: plate tensors do not cover {}x{}", width, height);
        return None;
    }

    let graph = PlateGraph::from_raster(&plate_id)?;
    let cfg = ctx.config.landmass.clone();
    let water_pct = water_percent(&cfg);
    let target_land = target_land_tiles(size, water_pct);
    let limit = closeness_limit(cfg.post.expand_tiles);

    let types = match cfg.crust_mode {
        CrustMode::Legacy => {
            let params = CrustParams {
                continental_fraction: cfg
                    .crust
                    .continental_fraction
                    .unwrap_or(target_land as f64 / size as f64),
                clustering_bias: cfg.crust.clustering_bias,
                microcontinent_chance: cfg.crust.microcontinent_chance,
            };
            assign_crust_types(
                &graph,
                || ctx.random("CrustType", 1_000_000) as f64 / 1_000_000.0,
                params,
            )
        }
        CrustMode::Area => assign_crust_by_area(&graph, target_land),
    };

    let height_params = HeightParams {
        continental_height: cfg.crust.continental_height,
        oceanic_height: cfg.crust.oceanic_height,
        edge_blend: cfg.crust.edge_blend,
        noise_amplitude: cfg.crust.noise_amplitude,
    };
    let heights = generate_base_heightfield(&plate_id, &types, height_params, || {
        ctx.random("CrustNoise", 1_000_000) as f64 / 1_000_000.0
    });

    let sea_level = match cfg.crust_mode {
        CrustMode::Legacy => compute_sea_level(heights.as_slice(), target_land),
        CrustMode::Area => 0.0,
    };

    let mut land_mask: Tilemap<u8> = Tilemap::new(width, height);
    for (x, y, &h) in heights.iter() {
        let id = *plate_id.get(x, y);
        let continental = types.get(id.index()) == Some(&CrustType::Continental);
        let rises = match cfg.crust_mode {
            CrustMode::Legacy => h > sea_level,
            CrustMode::Area => continental && h > 0.0,
        };
        if rises && *closeness.get(x, y) <= limit {
            land_mask.set(x, y, 1);
        }
    }

    let (flat, ocean) = (ctx.catalog.terrain.flat, ctx.catalog.terrain.ocean);
    let mut land_tiles = 0;
    for y in 0..height {
        for x in 0..width {
            let land = *land_mask.get(x, y) != 0;
            land_tiles += land as usize;
            ctx.write_heightfield(
                x,
                y,
                HeightfieldWrite {
                    terrain: Some(if land { flat } else { ocean }),
                    elevation: Some(if land { 0 } else { -1 }),
                    is_land: Some(land),
                },
            );
        }
    }

    let windows = build_windows(&land_mask, &plate_id, &cfg.post);
    let continental_plates = types.iter().filter(|t| **t == CrustType::Continental).count();
    info!(
        "Landmass: seaLevel={:.3} landTiles={} continentalPlates={}/{} closenessLimit={} targetLand={} waterPct={:.1}",
        sea_level,
        land_tiles,
        continental_plates,
        graph.len(),
        limit,
        target_land,
        water_pct
    );

    let mut result = LandmassResult {
        windows,
        land_mask,
        land_tiles,
        sea_level,
        target_land,
        start_regions: None,
    };
    result.start_regions = result.continents();
    Some(result)
}

/// Run ocean separation against the context's land mask and mirror every
/// change to the host. Returns the re-aggregated windows.
pub fn apply_plate_aware_ocean_separation(
    ctx: &mut MapContext<'_>,
    windows: &[LandmassWindow],
) -> Vec<LandmassWindow> {
    let Some(world) = ctx.world.as_ref() else {
        return windows.to_vec();
    };
    let closeness = world.fields().boundary_closeness.clone();
    if closeness.len() != ctx.width * ctx.height {
        return windows.to_vec();
    }

    let mut mask = ctx.heightfield.land_mask.clone();
    let policy = ctx.config.landmass.ocean_separation.clone();
    let outcome = separate_windows(
        windows,
        &mut mask,
        &closeness,
        &policy,
        ctx.config.landmass.crust_mode,
    );

    let (flat, ocean) = (ctx.catalog.terrain.flat, ctx.catalog.terrain.ocean);
    for &(x, y, land) in &outcome.edits {
        ctx.write_heightfield(
            x,
            y,
            HeightfieldWrite {
                terrain: Some(if land { flat } else { ocean }),
                is_land: Some(land),
                ..HeightfieldWrite::default()
            },
        );
    }
    if !outcome.edits.is_empty() {
        info!("Ocean separation changed {} tiles", outcome.edits.len());
    }
    if let Some(landmass) = ctx.landmass.as_mut() {
        landmass.land_mask = mask;
        landmass.land_tiles = landmass.land_mask.as_slice().iter().filter(|&&v| v != 0).count();
    }
    outcome.windows
}

/// Tag tiles with their start region: land at or east of the east
/// continent's west edge is region 2, other land region 1. Water takes the
/// side it sits on, one column further west.
pub fn stamp_landmass_regions(ctx: &mut MapContext<'_>, east: &LandmassWindow) {
    for y in 0..ctx.height {
        for x in 0..ctx.width {
            let boundary = if ctx.is_water(x, y) {
                east.west.saturating_sub(1)
            } else {
                east.west
            };
            let region = if x >= boundary { 2 } else { 1 };
            ctx.adapter.set_landmass_region_id(x, y, region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockAdapter;
    use crate::config::{MapGenConfig, SeedMode};
    use crate::world::WorldModel;

    fn config(water: f64, mode: CrustMode) -> MapGenConfig {
        let mut cfg = MapGenConfig::default();
        cfg.plates.seed_mode = SeedMode::Fixed;
        cfg.plates.fixed_seed = Some(42);
        cfg.plates.auto_count = false;
        cfg.plates.count = 4;
        cfg.landmass.base_water_percent = water;
        cfg.landmass.crust_mode = mode;
        cfg
    }

    fn run(seed: u64, cfg: &MapGenConfig) -> LandmassResult {
        let mut adapter = MockAdapter::new(24, 16, seed);
        let world = WorldModel::new(24, 16, cfg, &mut adapter).unwrap();
        let mut ctx = MapContext::new(&mut adapter, cfg.clone()).unwrap();
        ctx.world = Some(world);
        create_plate_driven_landmasses(&mut ctx).unwrap()
    }

    #[test]
    fn test_water_percent_and_target() {
        let mut cfg = LandmassConfig::default();
        assert_eq!(water_percent(&cfg), 64.0);
        cfg.water_scalar = 3.0;
        assert_eq!(water_percent(&cfg), 100.0);
        assert_eq!(target_land_tiles(100, 100.0), 1);
        assert_eq!(target_land_tiles(100, 0.0), 99);
        assert_eq!(target_land_tiles(100, 50.0), 50);
    }

    #[test]
    fn test_closeness_limit() {
        assert_eq!(closeness_limit(0), 255);
        assert_eq!(closeness_limit(-5), 215);
        assert_eq!(closeness_limit(-50), 150);
    }

    #[test]
    fn test_default_bounds() {
        let cfg = ContinentBoundsConfig::default();
        let west = default_continent_bounds(80, 50, &cfg, true);
        let east = default_continent_bounds(80, 50, &cfg, false);
        assert_eq!((west.west, west.east, west.south, west.north), (4, 36, 2, 48));
        assert_eq!((east.west, east.east, east.continent), (44, 76, 1));
        let tiny = default_continent_bounds(3, 3, &cfg, false);
        assert!(tiny.east <= 2 && tiny.west <= tiny.east && tiny.north <= 2);
    }

    #[test]
    fn test_legacy_landmass_hits_target() {
        let result = run(1, &config(50.0, CrustMode::Legacy));
        assert_eq!(result.target_land, 192);
        assert_eq!(result.land_tiles, 192);
        assert!(!result.windows.is_empty());
        for pair in result.windows.windows(2) {
            assert!(pair[0].west + pair[0].east <= pair[1].west + pair[1].east);
        }
    }

    #[test]
    fn test_same_seed_same_mask() {
        let cfg = config(50.0, CrustMode::Legacy);
        let a = run(5, &cfg);
        let b = run(5, &cfg);
        assert_eq!(a.land_mask, b.land_mask);
    }

    #[test]
    fn test_area_mode_uses_zero_sea_level() {
        let result = run(1, &config(50.0, CrustMode::Area));
        assert_eq!(result.sea_level, 0.0);
        assert!(result.land_tiles > 0);
    }

    #[test]
    fn test_missing_foundation_returns_none() {
        let mut adapter = MockAdapter::new(8, 8, 1);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert!(create_plate_driven_landmasses(&mut ctx).is_none());
    }
}
