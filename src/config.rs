//! Generation tunables.
//!
//! The configuration arrives already validated and defaulted by an outer
//! schema layer. Every struct here is `#[serde(default)]` so partial JSON
//! documents deserialize cleanly; numeric ranges are still clamped where the
//! values are consumed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapGenError, Result};

/// How the plate generator picks its seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Ask the host engine for a seed at run time.
    #[default]
    Engine,
    /// Use `fixed_seed + seed_offset`.
    Fixed,
}

/// Which crust/sea-level model the landmass generator uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CrustMode {
    /// Frontier-grown crust, sea level solved at the water percentile.
    #[default]
    Legacy,
    /// Largest plates become continents until the land budget is met; sea level 0.
    Area,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenConfig {
    pub plates: PlatesConfig,
    pub dynamics: DynamicsConfig,
    pub landmass: LandmassConfig,
    pub coastlines: CoastlinesConfig,
    pub islands: IslandsConfig,
    pub story: StoryConfig,
    pub mountains: MountainsConfig,
    pub volcanoes: VolcanoesConfig,
    pub climate: ClimateConfig,
    pub biomes: BiomesConfig,
    pub features: FeaturesConfig,
    pub placement: PlacementConfig,
    pub stages: StageToggles,
}

impl MapGenConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MapGenError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MapGenError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}

// =============================================================================
// FOUNDATION
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatesConfig {
    /// Number of major plates (ignored when `auto_count` is set).
    pub count: usize,
    /// Derive the count from map area instead of `count`.
    pub auto_count: bool,
    /// Lloyd relaxation passes applied to plate sites.
    pub relaxation_steps: u32,
    /// Scale applied to each plate's rotation rate.
    pub rotation_multiple: f64,
    pub seed_mode: SeedMode,
    pub fixed_seed: Option<u64>,
    pub seed_offset: i64,
}

impl Default for PlatesConfig {
    fn default() -> Self {
        Self {
            count: 8,
            auto_count: true,
            relaxation_steps: 5,
            rotation_multiple: 1.0,
            seed_mode: SeedMode::Engine,
            fixed_seed: None,
            seed_offset: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub mantle: MantleConfig,
    pub wind: WindConfig,
    /// Optional plate/wind alignment. Absent means plates move freely.
    pub directionality: Option<DirectionalityConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MantleConfig {
    pub bumps: u32,
    pub amplitude: f64,
    pub scale: f64,
}

impl Default for MantleConfig {
    fn default() -> Self {
        Self {
            bumps: 4,
            amplitude: 0.6,
            scale: 0.4,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub jet_streaks: u32,
    pub jet_strength: f64,
    pub variance: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            jet_streaks: 3,
            jet_strength: 1.0,
            variance: 0.6,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalityConfig {
    /// 0..1, how strongly plate motion aligns to `plate_axis_deg`.
    pub cohesion: f64,
    pub plate_axis_deg: i32,
    pub angle_jitter_deg: i32,
    pub magnitude_variance: f64,
    /// 0..1, lengthens the upwind rain-shadow march.
    pub winds_follow_plates: f64,
    /// 0..1, steers rift lines along `plate_axis_deg`.
    pub rifts_follow_plates: f64,
    pub wind_bias_deg: i32,
    pub current_bias_deg: i32,
    /// 0..1, pulls the current axis toward the wind axis when scoring sea lanes.
    pub currents_follow_winds: f64,
    /// 0..1, strength of the wet onshore monsoon nudge on tropical coasts.
    pub monsoon_bias: f64,
    pub equator_band_deg: i32,
}

impl Default for DirectionalityConfig {
    fn default() -> Self {
        Self {
            cohesion: 0.0,
            plate_axis_deg: 0,
            angle_jitter_deg: 0,
            magnitude_variance: 0.35,
            winds_follow_plates: 0.0,
            rifts_follow_plates: 0.0,
            wind_bias_deg: 0,
            current_bias_deg: 0,
            currents_follow_winds: 0.0,
            monsoon_bias: 0.0,
            equator_band_deg: 12,
        }
    }
}

// =============================================================================
// LANDMASS
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmassConfig {
    pub base_water_percent: f64,
    pub water_scalar: f64,
    pub crust_mode: CrustMode,
    pub crust: CrustConfig,
    pub post: GeometryPostConfig,
    pub ocean_separation: OceanSeparationPolicy,
    pub continent_bounds: ContinentBoundsConfig,
}

impl Default for LandmassConfig {
    fn default() -> Self {
        Self {
            base_water_percent: 64.0,
            water_scalar: 1.0,
            crust_mode: CrustMode::Legacy,
            crust: CrustConfig::default(),
            post: GeometryPostConfig::default(),
            ocean_separation: OceanSeparationPolicy::default(),
            continent_bounds: ContinentBoundsConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrustConfig {
    /// Share of tiles on continental plates. Defaults to the land target.
    pub continental_fraction: Option<f64>,
    pub clustering_bias: f64,
    pub microcontinent_chance: f64,
    pub edge_blend: f64,
    pub noise_amplitude: f64,
    pub continental_height: f64,
    pub oceanic_height: f64,
}

impl Default for CrustConfig {
    fn default() -> Self {
        Self {
            continental_fraction: None,
            clustering_bias: 0.7,
            microcontinent_chance: 0.04,
            edge_blend: 0.45,
            noise_amplitude: 0.08,
            continental_height: 0.32,
            oceanic_height: -0.55,
        }
    }
}

/// Window shaping applied after land is decided.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryPostConfig {
    pub expand_tiles: i32,
    pub expand_west_tiles: i32,
    pub expand_east_tiles: i32,
    pub clamp_west_min: Option<i32>,
    pub clamp_east_max: Option<i32>,
    pub override_south: Option<i32>,
    pub override_north: Option<i32>,
    pub min_width_tiles: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanSeparationPolicy {
    pub enabled: bool,
    /// Window index pairs to keep apart.
    pub band_pairs: Vec<[usize; 2]>,
    pub base_separation_tiles: i32,
    pub boundary_closeness_multiplier: f64,
    pub max_per_row_delta: i32,
    /// Area-mode channel width.
    pub min_channel_width: i32,
    pub channel_jitter: i32,
    pub edge_west: EdgePolicy,
    pub edge_east: EdgePolicy,
}

impl Default for OceanSeparationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            band_pairs: vec![[0, 1], [1, 2]],
            base_separation_tiles: 0,
            boundary_closeness_multiplier: 1.0,
            max_per_row_delta: 3,
            min_channel_width: 3,
            channel_jitter: 0,
            edge_west: EdgePolicy::default(),
            edge_east: EdgePolicy::default(),
        }
    }
}

/// Map-border margin. Positive `base_tiles` carves ocean, negative fills land.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePolicy {
    pub enabled: bool,
    pub base_tiles: i32,
    pub boundary_closeness_multiplier: f64,
    pub max_per_row_delta: i32,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            base_tiles: 0,
            boundary_closeness_multiplier: 1.0,
            max_per_row_delta: 2,
        }
    }
}

/// Fallback continent bounds used when landmass generation fails.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinentBoundsConfig {
    pub avoid_seam_offset: usize,
    pub polar_water_rows: usize,
}

impl Default for ContinentBoundsConfig {
    fn default() -> Self {
        Self {
            avoid_seam_offset: 4,
            polar_water_rows: 2,
        }
    }
}

// =============================================================================
// COASTS AND ISLANDS
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastlinesConfig {
    pub plate_bias: CoastPlateBias,
    pub bay: BayConfig,
    pub fjord: FjordConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastPlateBias {
    pub threshold: f64,
    pub power: f64,
    pub convergent: f64,
    pub transform: f64,
    pub divergent: f64,
    pub interior: f64,
    pub bay_weight: f64,
    pub bay_noise_bonus: f64,
    pub fjord_weight: f64,
}

impl Default for CoastPlateBias {
    fn default() -> Self {
        Self {
            threshold: 0.45,
            power: 1.25,
            convergent: 1.0,
            transform: 0.4,
            divergent: -0.6,
            interior: 0.0,
            bay_weight: 0.35,
            bay_noise_bonus: 1.0,
            fjord_weight: 0.8,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BayConfig {
    pub noise_gate_add: i32,
    pub roll_den_active: i32,
    pub roll_den_default: i32,
}

impl Default for BayConfig {
    fn default() -> Self {
        Self {
            noise_gate_add: 0,
            roll_den_active: 4,
            roll_den_default: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FjordConfig {
    pub base_denom: i32,
    pub active_bonus: i32,
    pub passive_bonus: i32,
}

impl Default for FjordConfig {
    fn default() -> Self {
        Self {
            base_denom: 12,
            active_bonus: 1,
            passive_bonus: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandsConfig {
    pub fractal_threshold_percent: u32,
    pub min_dist_from_land_radius: i32,
    pub base_island_den_near_active: i32,
    pub base_island_den_else: i32,
    pub hotspot_seed_denom: i32,
    pub cluster_max: i32,
}

impl Default for IslandsConfig {
    fn default() -> Self {
        Self {
            fractal_threshold_percent: 90,
            min_dist_from_land_radius: 2,
            base_island_den_near_active: 5,
            base_island_den_else: 7,
            hotspot_seed_denom: 2,
            cluster_max: 3,
        }
    }
}

// =============================================================================
// STORY OVERLAYS
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub margins: MarginsConfig,
    pub hotspot: HotspotConfig,
    pub rift: RiftConfig,
    pub orogeny: OrogenyConfig,
    pub corridors: CorridorsConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginsConfig {
    pub active_fraction: f64,
    pub passive_fraction: f64,
    pub min_segment_length: usize,
}

impl Default for MarginsConfig {
    fn default() -> Self {
        Self {
            active_fraction: 0.25,
            passive_fraction: 0.25,
            min_segment_length: 12,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotConfig {
    pub max_trails: usize,
    pub steps: usize,
    pub step_len: i32,
    pub min_distance_from_land: i32,
    pub min_trail_separation: i32,
    pub paradise_bias: i32,
    pub volcanic_bias: i32,
    pub volcanic_peak_chance: f64,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            max_trails: 12,
            steps: 15,
            step_len: 2,
            min_distance_from_land: 5,
            min_trail_separation: 12,
            paradise_bias: 2,
            volcanic_bias: 1,
            volcanic_peak_chance: 0.33,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RiftConfig {
    pub max_rifts_per_map: usize,
    pub line_steps: usize,
    pub step_len: i32,
    pub shoulder_width: i32,
}

impl Default for RiftConfig {
    fn default() -> Self {
        Self {
            max_rifts_per_map: 3,
            line_steps: 18,
            step_len: 1,
            shoulder_width: 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrogenyConfig {
    pub radius: i32,
    pub min_length_soft: usize,
    pub windward_boost: i32,
    pub lee_drying_strength: f64,
}

impl Default for OrogenyConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            min_length_soft: 30,
            windward_boost: 5,
            lee_drying_strength: 1.2,
        }
    }
}

/// How rugged coasts treat tiles on a sea lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LaneProtection {
    /// Never carve on a lane.
    #[default]
    Hard,
    /// Carve with odds scaled by `soft_chance_multiplier`.
    Soft,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorsConfig {
    pub sea: SeaLaneConfig,
    pub island_hop: IslandHopConfig,
    pub land: LandCorridorConfig,
    pub river: RiverCorridorConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaLaneConfig {
    pub max_lanes: usize,
    /// Shortest accepted water run as a share of the scanned axis (0.4..1).
    pub min_length_frac: f64,
    pub scan_stride: usize,
    pub prefer_diagonals: bool,
    /// Minimum index gap between two lanes of the same orientation.
    pub lane_spacing: i64,
    pub min_channel_width: usize,
    /// Islands never seed within this radius of a lane.
    pub avoid_radius: i32,
    pub protection: LaneProtection,
    pub soft_chance_multiplier: f64,
}

impl Default for SeaLaneConfig {
    fn default() -> Self {
        Self {
            max_lanes: 3,
            min_length_frac: 0.7,
            scan_stride: 6,
            prefer_diagonals: true,
            lane_spacing: 6,
            min_channel_width: 3,
            avoid_radius: 2,
            protection: LaneProtection::Hard,
            soft_chance_multiplier: 0.5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandHopConfig {
    pub use_hotspots: bool,
    pub max_arcs: usize,
}

impl Default for IslandHopConfig {
    fn default() -> Self {
        Self {
            use_hotspots: true,
            max_arcs: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LandCorridorConfig {
    pub use_rift_shoulders: bool,
    pub max_corridors: usize,
    /// Shortest shoulder run kept; never below 12.
    pub min_run_length: usize,
    /// Minimum row gap between corridors.
    pub spacing: usize,
    /// 0..1 chance that a corridor tile is nudged to grassland.
    pub biome_bias_strength: f64,
}

impl Default for LandCorridorConfig {
    fn default() -> Self {
        Self {
            use_rift_shoulders: true,
            max_corridors: 5,
            min_run_length: 24,
            spacing: 11,
            biome_bias_strength: 0.6,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverCorridorConfig {
    pub max_chains: usize,
    /// Walk length cap; never below 20.
    pub max_steps: usize,
    pub prefer_lowland_below: i32,
    pub coast_seed_radius: u32,
    pub min_tiles: usize,
    pub must_end_near_coast: bool,
    pub biome_bias_strength: f64,
}

impl Default for RiverCorridorConfig {
    fn default() -> Self {
        Self {
            max_chains: 2,
            max_steps: 80,
            prefer_lowland_below: 300,
            coast_seed_radius: 2,
            min_tiles: 24,
            must_end_near_coast: true,
            biome_bias_strength: 0.5,
        }
    }
}

// =============================================================================
// RELIEF
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainsConfig {
    pub tectonic_intensity: f64,
    pub mountain_threshold: f64,
    pub hill_threshold: f64,
    pub uplift_weight: f64,
    pub fractal_weight: f64,
    pub rift_depth: f64,
    pub boundary_weight: f64,
    pub boundary_exponent: f64,
    pub convergence_bonus: f64,
    pub transform_penalty: f64,
    pub rift_penalty: f64,
    pub hill_boundary_weight: f64,
    pub hill_rift_bonus: f64,
    pub hill_convergent_foothill: f64,
    pub hill_uplift_weight: f64,
}

impl Default for MountainsConfig {
    fn default() -> Self {
        Self {
            tectonic_intensity: 1.0,
            mountain_threshold: 0.58,
            hill_threshold: 0.32,
            uplift_weight: 0.35,
            fractal_weight: 0.15,
            rift_depth: 0.2,
            boundary_weight: 1.0,
            boundary_exponent: 1.6,
            convergence_bonus: 1.0,
            transform_penalty: 0.6,
            rift_penalty: 1.0,
            hill_boundary_weight: 0.35,
            hill_rift_bonus: 0.25,
            hill_convergent_foothill: 0.35,
            hill_uplift_weight: 0.2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VolcanoesConfig {
    pub enabled: bool,
    pub base_density: f64,
    pub min_spacing: i32,
    pub boundary_threshold: f64,
    pub boundary_weight: f64,
    pub convergent_multiplier: f64,
    pub transform_multiplier: f64,
    pub divergent_multiplier: f64,
    pub hotspot_weight: f64,
    pub shield_penalty: f64,
    pub random_jitter: f64,
    pub min_volcanoes: usize,
    pub max_volcanoes: usize,
}

impl Default for VolcanoesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_density: 1.0 / 170.0,
            min_spacing: 3,
            boundary_threshold: 0.35,
            boundary_weight: 1.2,
            convergent_multiplier: 2.4,
            transform_multiplier: 1.1,
            divergent_multiplier: 0.35,
            hotspot_weight: 0.12,
            shield_penalty: 0.6,
            random_jitter: 0.08,
            min_volcanoes: 5,
            max_volcanoes: 40,
        }
    }
}

// =============================================================================
// CLIMATE
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub baseline: ClimateBaselineConfig,
    pub refine: ClimateRefineConfig,
    pub story_rainfall: StoryRainfallConfig,
    pub swatches: SwatchesConfig,
    pub paleo: PaleoConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateBaselineConfig {
    /// Rainfall target per latitude band, equator first.
    pub bands: [i32; 6],
    /// Upper latitude edge of the first five bands.
    pub band_edges: [f64; 5],
    pub host_weight: f64,
    pub band_weight: f64,
    pub orographic_low_elevation: i32,
    pub orographic_low_bonus: i32,
    pub orographic_high_elevation: i32,
    pub orographic_high_bonus: i32,
    pub coastal_bonus: i32,
    pub coastal_spread: u32,
    pub noise_base: f64,
    pub noise_frequency: f64,
}

impl Default for ClimateBaselineConfig {
    fn default() -> Self {
        Self {
            bands: [120, 104, 75, 70, 60, 45],
            band_edges: [10.0, 20.0, 35.0, 55.0, 70.0],
            host_weight: 0.6,
            band_weight: 0.4,
            orographic_low_elevation: 350,
            orographic_low_bonus: 8,
            orographic_high_elevation: 600,
            orographic_high_bonus: 7,
            coastal_bonus: 24,
            coastal_spread: 3,
            noise_base: 3.0,
            noise_frequency: 0.15,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateRefineConfig {
    /// Pass A
    pub water_gradient: bool,
    /// Pass B
    pub orographic: bool,
    /// Passes C and D
    pub river_basin: bool,
    pub water_gradient_radius: i32,
    pub water_gradient_per_ring: i32,
    pub water_gradient_lowland_bonus: i32,
    pub water_gradient_lowland_elevation: i32,
    pub orographic_steps: i32,
    pub orographic_barrier_elevation: i32,
    pub orographic_reduction_base: i32,
    pub orographic_reduction_per_step: i32,
    pub river_lowland_bonus: i32,
    pub river_highland_bonus: i32,
    pub river_lowland_elevation: i32,
    pub basin_radius: i32,
    pub basin_bonus: i32,
    pub basin_max_elevation: i32,
    pub basin_rim_delta: i32,
}

impl Default for ClimateRefineConfig {
    fn default() -> Self {
        Self {
            water_gradient: true,
            orographic: true,
            river_basin: true,
            water_gradient_radius: 5,
            water_gradient_per_ring: 5,
            water_gradient_lowland_bonus: 3,
            water_gradient_lowland_elevation: 150,
            orographic_steps: 4,
            orographic_barrier_elevation: 500,
            orographic_reduction_base: 8,
            orographic_reduction_per_step: 6,
            river_lowland_bonus: 14,
            river_highland_bonus: 10,
            river_lowland_elevation: 250,
            basin_radius: 2,
            basin_bonus: 6,
            basin_max_elevation: 200,
            basin_rim_delta: 20,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryRainfallConfig {
    pub rift_radius: i32,
    pub rift_boost: i32,
    pub hotspot_radius: i32,
    pub paradise_delta: i32,
    pub volcanic_delta: i32,
}

impl Default for StoryRainfallConfig {
    fn default() -> Self {
        Self {
            rift_radius: 2,
            rift_boost: 8,
            hotspot_radius: 2,
            paradise_delta: 6,
            volcanic_delta: 8,
        }
    }
}

/// One macro climate zone is rolled per map from these weighted kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SwatchesConfig {
    /// Band half-width growth per unit of map size scale above 1.
    pub width_mul_sqrt: f64,
    pub macro_desert_belt: DesertBeltSwatch,
    pub equatorial_rainbelt: RainbeltSwatch,
    pub rainforest_archipelago: ArchipelagoSwatch,
    pub mountain_forests: MountainForestSwatch,
    pub great_plains: GreatPlainsSwatch,
}

impl Default for SwatchesConfig {
    fn default() -> Self {
        Self {
            width_mul_sqrt: 0.3,
            macro_desert_belt: DesertBeltSwatch::default(),
            equatorial_rainbelt: RainbeltSwatch::default(),
            rainforest_archipelago: ArchipelagoSwatch::default(),
            mountain_forests: MountainForestSwatch::default(),
            great_plains: GreatPlainsSwatch::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DesertBeltSwatch {
    pub weight: u32,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub dryness_delta: i32,
}

impl Default for DesertBeltSwatch {
    fn default() -> Self {
        Self {
            weight: 8,
            latitude_center_deg: 20.0,
            half_width_deg: 12.0,
            dryness_delta: 28,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RainbeltSwatch {
    pub weight: u32,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub wetness_delta: i32,
}

impl Default for RainbeltSwatch {
    fn default() -> Self {
        Self {
            weight: 3,
            latitude_center_deg: 0.0,
            half_width_deg: 10.0,
            wetness_delta: 24,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchipelagoSwatch {
    pub weight: u32,
    pub wetness_delta: i32,
}

impl Default for ArchipelagoSwatch {
    fn default() -> Self {
        Self {
            weight: 7,
            wetness_delta: 18,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainForestSwatch {
    pub weight: u32,
    pub windward_bonus: i32,
    pub lee_penalty: i32,
}

impl Default for MountainForestSwatch {
    fn default() -> Self {
        Self {
            weight: 2,
            windward_bonus: 6,
            lee_penalty: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GreatPlainsSwatch {
    pub weight: u32,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub dry_delta: i32,
    pub lowland_max_elevation: i32,
}

impl Default for GreatPlainsSwatch {
    fn default() -> Self {
        Self {
            weight: 5,
            latitude_center_deg: 45.0,
            half_width_deg: 8.0,
            dry_delta: 12,
            lowland_max_elevation: 300,
        }
    }
}

/// River deltas, oxbow pockets and fossil channels.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PaleoConfig {
    pub max_deltas: usize,
    pub delta_fan_radius: i32,
    pub delta_marsh_chance: f64,
    pub max_oxbows: usize,
    pub oxbow_elevation_max: i32,
    pub max_fossil_channels: usize,
    /// Base channel length; never below 6.
    pub fossil_channel_length: usize,
    pub fossil_channel_step: usize,
    pub fossil_channel_humidity: i32,
    pub fossil_min_distance_from_rivers: u32,
    pub length_mul_sqrt: f64,
    pub canyon_rim: bool,
    pub rim_width: i32,
    pub canyon_dry_bonus: i32,
    pub bluff_wet_reduction: i32,
}

impl Default for PaleoConfig {
    fn default() -> Self {
        Self {
            max_deltas: 4,
            delta_fan_radius: 1,
            delta_marsh_chance: 0.35,
            max_oxbows: 6,
            oxbow_elevation_max: 580,
            max_fossil_channels: 12,
            fossil_channel_length: 12,
            fossil_channel_step: 2,
            fossil_channel_humidity: 6,
            fossil_min_distance_from_rivers: 4,
            length_mul_sqrt: 0.7,
            canyon_rim: true,
            rim_width: 4,
            canyon_dry_bonus: 3,
            bluff_wet_reduction: 0,
        }
    }
}

// =============================================================================
// ECOLOGY AND PLACEMENT
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomesConfig {
    pub tundra_lat_min: f64,
    pub tundra_elev_min: i32,
    pub tundra_rain_max: i32,
    pub tropical_coast_lat_max: f64,
    pub tropical_coast_rain_min: i32,
    pub river_valley_lat_max: f64,
    pub river_valley_rain_min: i32,
    pub rift_grassland_lat_max: f64,
    pub rift_grassland_rain_min: i32,
    pub rift_tropical_lat_max: f64,
    pub rift_tropical_rain_min: i32,
}

impl Default for BiomesConfig {
    fn default() -> Self {
        Self {
            tundra_lat_min: 70.0,
            tundra_elev_min: 850,
            tundra_rain_max: 90,
            tropical_coast_lat_max: 18.0,
            tropical_coast_rain_min: 105,
            river_valley_lat_max: 50.0,
            river_valley_rain_min: 75,
            rift_grassland_lat_max: 50.0,
            rift_grassland_rain_min: 75,
            rift_tropical_lat_max: 18.0,
            rift_tropical_rain_min: 100,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub paradise_reef_chance: i32,
    pub paradise_reef_radius: i32,
    pub shelf_reef_multiplier: f64,
    pub shelf_reef_radius: i32,
    pub volcanic_radius: i32,
    pub volcanic_forest_chance: i32,
    pub volcanic_forest_bonus: i32,
    pub volcanic_forest_rain_min: i32,
    pub volcanic_taiga_chance: i32,
    pub volcanic_taiga_bonus: i32,
    pub volcanic_taiga_lat_min: f64,
    pub volcanic_taiga_elev_max: i32,
    pub volcanic_taiga_rain_min: i32,
    pub rainforest_extra_chance: i32,
    pub rainforest_rain_min: i32,
    pub forest_extra_chance: i32,
    pub forest_rain_min: i32,
    pub taiga_extra_chance: i32,
    pub taiga_elev_max: i32,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            paradise_reef_chance: 18,
            paradise_reef_radius: 2,
            shelf_reef_multiplier: 0.6,
            shelf_reef_radius: 1,
            volcanic_radius: 1,
            volcanic_forest_chance: 22,
            volcanic_forest_bonus: 6,
            volcanic_forest_rain_min: 95,
            volcanic_taiga_chance: 25,
            volcanic_taiga_bonus: 5,
            volcanic_taiga_lat_min: 55.0,
            volcanic_taiga_elev_max: 400,
            volcanic_taiga_rain_min: 60,
            rainforest_extra_chance: 55,
            rainforest_rain_min: 130,
            forest_extra_chance: 30,
            forest_rain_min: 100,
            taiga_extra_chance: 35,
            taiga_elev_max: 300,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub wonders_plus_one: bool,
    pub floodplains_min_length: u32,
    pub floodplains_max_length: u32,
    pub river_min_length: u32,
    pub river_max_length: u32,
    pub start_sector_rows: u32,
    pub start_sector_cols: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            wonders_plus_one: true,
            floodplains_min_length: 4,
            floodplains_max_length: 10,
            river_min_length: 5,
            river_max_length: 15,
            start_sector_rows: 4,
            start_sector_cols: 4,
        }
    }
}

/// Per-stage enable flags. Every stage runs unless switched off here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StageToggles {
    pub foundation: bool,
    pub landmass_plates: bool,
    pub coastlines: bool,
    pub story_seed: bool,
    pub story_hotspots: bool,
    pub story_rifts: bool,
    pub story_orogeny: bool,
    pub story_corridors_pre: bool,
    pub islands: bool,
    pub mountains: bool,
    pub volcanoes: bool,
    pub lakes: bool,
    pub climate_baseline: bool,
    pub story_swatches: bool,
    pub rivers: bool,
    pub story_corridors_post: bool,
    pub story_paleo: bool,
    pub climate_refine: bool,
    pub biomes: bool,
    pub features: bool,
    pub placement: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            foundation: true,
            landmass_plates: true,
            coastlines: true,
            story_seed: true,
            story_hotspots: true,
            story_rifts: true,
            story_orogeny: true,
            story_corridors_pre: true,
            islands: true,
            mountains: true,
            volcanoes: true,
            lakes: true,
            climate_baseline: true,
            story_swatches: true,
            rivers: true,
            story_corridors_post: true,
            story_paleo: true,
            climate_refine: true,
            biomes: true,
            features: true,
            placement: true,
        }
    }
}
