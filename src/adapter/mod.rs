//! Host engine capability interface.
//!
//! Generation never talks to a concrete game engine. Every read of host map
//! state, every write, and every host-side generation pass goes through
//! [`EngineAdapter`]. [`MockAdapter`] is an in-memory implementation used by
//! tests and the CLI.

mod mock;

pub use mock::MockAdapter;

use crate::error::AdapterError;
use crate::landmass::LandmassWindow;

pub type HostResult<T> = std::result::Result<T, AdapterError>;

/// Map-size dependent values the host looks up from its map info table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapInfo {
    pub num_natural_wonders: u32,
    pub lake_generation_frequency: u32,
    pub players_west: u32,
    pub players_east: u32,
}

/// Everything the host needs to seat players on the two start continents.
#[derive(Clone, Debug)]
pub struct StartRequest {
    pub players_west: u32,
    pub players_east: u32,
    pub west: LandmassWindow,
    pub east: LandmassWindow,
    pub sector_rows: u32,
    pub sector_cols: u32,
}

/// Capabilities consumed from the host engine.
///
/// Coordinates are tile coordinates with `x` in `0..width` and `y` in
/// `0..height`. Terrain, biome and feature values are host catalog indices;
/// resolve them through [`crate::catalog::Catalog`] rather than hard-coding.
pub trait EngineAdapter {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Returns `None` when the host has no map info for the current map size.
    fn map_info(&self) -> Option<MapInfo>;

    // ---- queries ----------------------------------------------------------
    fn is_water(&self, x: usize, y: usize) -> bool;
    fn is_mountain(&self, x: usize, y: usize) -> bool;
    fn is_lake(&self, x: usize, y: usize) -> bool;
    fn is_adjacent_to_rivers(&self, x: usize, y: usize, radius: u32) -> bool;
    fn get_elevation(&self, x: usize, y: usize) -> i32;
    fn get_rainfall(&self, x: usize, y: usize) -> i32;
    /// Signed latitude in degrees, positive north.
    fn get_latitude(&self, x: usize, y: usize) -> f64;
    fn get_terrain_type(&self, x: usize, y: usize) -> u8;
    fn get_biome_type(&self, x: usize, y: usize) -> u8;
    /// `None` when the tile has no feature.
    fn get_feature_type(&self, x: usize, y: usize) -> Option<u8>;
    fn can_have_feature(&self, x: usize, y: usize, feature: u8) -> bool;

    // ---- setters ----------------------------------------------------------
    fn set_terrain_type(&mut self, x: usize, y: usize, terrain: u8);
    fn set_elevation(&mut self, x: usize, y: usize, elevation: i32);
    fn set_rainfall(&mut self, x: usize, y: usize, rainfall: i32);
    fn set_biome_type(&mut self, x: usize, y: usize, biome: u8);
    fn set_feature_type(&mut self, x: usize, y: usize, feature: u8);
    fn set_landmass_region_id(&mut self, x: usize, y: usize, region: i32);

    // ---- randomness and noise --------------------------------------------
    /// Uniform integer in `0..max`. `label` names the call site for host-side tracing.
    fn get_random_number(&mut self, max: i32, label: &str) -> i32;
    fn create_fractal(
        &mut self,
        id: u32,
        width: usize,
        height: usize,
        grain: u32,
        flags: u32,
    ) -> HostResult<()>;
    /// Raw fractal sample. Hosts may return 8, 16 or 32 bit values.
    fn get_fractal_height(&self, id: u32, x: usize, y: usize) -> u32;
    fn get_height_from_percent(&self, id: u32, percent: u32) -> u32;

    // ---- catalogs ---------------------------------------------------------
    fn terrain_names(&self) -> Vec<String>;
    fn biome_names(&self) -> Vec<String>;
    fn feature_names(&self) -> Vec<String>;

    // ---- host generation passes -------------------------------------------
    fn validate_and_fix_terrain(&mut self) -> HostResult<()>;
    fn recalculate_areas(&mut self) -> HostResult<()>;
    fn store_water_data(&mut self) -> HostResult<()>;
    fn expand_coasts(&mut self, width: usize, height: usize) -> HostResult<()>;
    fn generate_lakes(&mut self, width: usize, height: usize, tiles_per_lake: u32)
        -> HostResult<()>;
    fn build_elevation(&mut self) -> HostResult<()>;
    fn model_rivers(&mut self, min_length: u32, max_length: u32, navigable_terrain: u8)
        -> HostResult<()>;
    fn define_named_rivers(&mut self) -> HostResult<()>;
    fn designate_biomes(&mut self, width: usize, height: usize) -> HostResult<()>;
    fn add_features(&mut self, width: usize, height: usize) -> HostResult<()>;
    fn add_natural_wonders(&mut self, width: usize, height: usize, count: u32) -> HostResult<()>;
    fn add_floodplains(&mut self, min_length: u32, max_length: u32) -> HostResult<()>;
    fn generate_snow(&mut self, width: usize, height: usize) -> HostResult<()>;
    fn generate_resources(&mut self, width: usize, height: usize) -> HostResult<()>;
    /// Returns one tile index per seated player.
    fn assign_start_positions(&mut self, request: &StartRequest) -> HostResult<Vec<usize>>;
    fn generate_discoveries(&mut self, width: usize, height: usize, starts: &[usize])
        -> HostResult<()>;
    fn recalculate_fertility(&mut self) -> HostResult<()>;
    fn assign_advanced_start_regions(&mut self) -> HostResult<()>;
}
