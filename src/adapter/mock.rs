//! In-memory host used by tests and the CLI.

use std::collections::{HashMap, HashSet};

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{EngineAdapter, HostResult, MapInfo, StartRequest};
use crate::error::AdapterError;

pub const TERRAIN_NAMES: [&str; 6] = [
    "TERRAIN_MOUNTAIN",
    "TERRAIN_HILL",
    "TERRAIN_FLAT",
    "TERRAIN_COAST",
    "TERRAIN_OCEAN",
    "TERRAIN_NAVIGABLE_RIVER",
];

pub const BIOME_NAMES: [&str; 6] = [
    "BIOME_TUNDRA",
    "BIOME_GRASSLAND",
    "BIOME_PLAINS",
    "BIOME_TROPICAL",
    "BIOME_DESERT",
    "BIOME_MARINE",
];

pub const FEATURE_NAMES: [&str; 24] = [
    "FEATURE_SAGEBRUSH_STEPPE",
    "FEATURE_OASIS",
    "FEATURE_DESERT_FLOODPLAIN_MINOR",
    "FEATURE_DESERT_FLOODPLAIN_NAVIGABLE",
    "FEATURE_FOREST",
    "FEATURE_MARSH",
    "FEATURE_GRASSLAND_FLOODPLAIN_MINOR",
    "FEATURE_GRASSLAND_FLOODPLAIN_NAVIGABLE",
    "FEATURE_REEF",
    "FEATURE_COLD_REEF",
    "FEATURE_ICE",
    "FEATURE_SAVANNA_WOODLAND",
    "FEATURE_WATERING_HOLE",
    "FEATURE_PLAINS_FLOODPLAIN_MINOR",
    "FEATURE_PLAINS_FLOODPLAIN_NAVIGABLE",
    "FEATURE_RAINFOREST",
    "FEATURE_MANGROVE",
    "FEATURE_TROPICAL_FLOODPLAIN_MINOR",
    "FEATURE_TROPICAL_FLOODPLAIN_NAVIGABLE",
    "FEATURE_TAIGA",
    "FEATURE_TUNDRA_BOG",
    "FEATURE_TUNDRA_FLOODPLAIN_MINOR",
    "FEATURE_TUNDRA_FLOODPLAIN_NAVIGABLE",
    "FEATURE_VOLCANO",
];

const MOUNTAIN: u8 = 0;
const HILL: u8 = 1;
const FLAT: u8 = 2;
const COAST: u8 = 3;
const OCEAN: u8 = 4;

const TUNDRA: u8 = 0;
const GRASSLAND: u8 = 1;
const PLAINS: u8 = 2;
const TROPICAL: u8 = 3;
const DESERT: u8 = 4;
const MARINE: u8 = 5;

const FOREST: u8 = 4;
const REEF: u8 = 8;

/// Host double backed by plain vectors and a seeded ChaCha8 stream.
///
/// Host passes (coasts, lakes, rivers, biomes) are simple stand-ins that keep
/// the map consistent enough for downstream stages. Individual fractals or
/// operations can be made to fail to exercise stage failure handling.
pub struct MockAdapter {
    width: usize,
    height: usize,
    terrain: Vec<u8>,
    elevation: Vec<i32>,
    rainfall: Vec<i32>,
    biome: Vec<u8>,
    feature: Vec<Option<u8>>,
    landmass_region: Vec<i32>,
    lakes: Vec<bool>,
    rivers: Vec<bool>,
    fractals: HashMap<u32, Vec<u32>>,
    rng: ChaCha8Rng,
    noise_seed: u32,
    random_calls: usize,
    map_info: Option<MapInfo>,
    failing_fractals: HashSet<u32>,
    failing_ops: HashSet<&'static str>,
    calls: Vec<&'static str>,
}

impl MockAdapter {
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            terrain: vec![OCEAN; size],
            elevation: vec![100; size],
            rainfall: vec![50; size],
            biome: vec![MARINE; size],
            feature: vec![None; size],
            landmass_region: vec![0; size],
            lakes: vec![false; size],
            rivers: vec![false; size],
            fractals: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            noise_seed: seed as u32,
            random_calls: 0,
            map_info: Some(MapInfo {
                num_natural_wonders: 2,
                lake_generation_frequency: 5,
                players_west: 2,
                players_east: 2,
            }),
            failing_fractals: HashSet::new(),
            failing_ops: HashSet::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_map_info(mut self, info: Option<MapInfo>) -> Self {
        self.map_info = info;
        self
    }

    /// Make `create_fractal` fail for the given fractal id.
    pub fn fail_fractal(mut self, id: u32) -> Self {
        self.failing_fractals.insert(id);
        self
    }

    /// Make a named host pass (e.g. `"expand_coasts"`) fail.
    pub fn fail_operation(mut self, op: &'static str) -> Self {
        self.failing_ops.insert(op);
        self
    }

    pub fn random_calls(&self) -> usize {
        self.random_calls
    }

    /// Host passes invoked so far, in order.
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    pub fn land_count(&self) -> usize {
        (0..self.width * self.height)
            .filter(|&i| {
                let (x, y) = (i % self.width, i / self.width);
                !self.is_water(x, y)
            })
            .count()
    }

    pub fn river_count(&self) -> usize {
        self.rivers.iter().filter(|&&r| r).count()
    }

    /// Mark a tile as carrying a river.
    pub fn set_river(&mut self, x: usize, y: usize) {
        let i = self.idx(x, y);
        self.rivers[i] = true;
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + (x % self.width)
    }

    fn check(&mut self, op: &'static str) -> HostResult<()> {
        self.calls.push(op);
        if self.failing_ops.contains(op) {
            return Err(AdapterError::failed(op, "injected failure"));
        }
        Ok(())
    }

    fn bounded_neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(8);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                    out.push((nx as usize, ny as usize));
                }
            }
        }
        out
    }

    fn land_tiles_in(&self, window: &crate::landmass::LandmassWindow) -> Vec<usize> {
        let mut tiles = Vec::new();
        for y in window.south..=window.north.min(self.height.saturating_sub(1)) {
            for x in window.west..=window.east.min(self.width.saturating_sub(1)) {
                if !self.is_water(x, y) && !self.is_mountain(x, y) {
                    tiles.push(self.idx(x, y));
                }
            }
        }
        tiles
    }
}

fn spread_pick(tiles: &[usize], count: u32) -> Vec<usize> {
    if tiles.is_empty() || count == 0 {
        return Vec::new();
    }
    let count = (count as usize).min(tiles.len());
    let step = tiles.len() / count;
    (0..count).map(|i| tiles[i * step + step / 2]).collect()
}

impl EngineAdapter for MockAdapter {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn map_info(&self) -> Option<MapInfo> {
        self.map_info
    }

    fn is_water(&self, x: usize, y: usize) -> bool {
        let i = self.idx(x, y);
        matches!(self.terrain[i], COAST | OCEAN) || self.lakes[i]
    }

    fn is_mountain(&self, x: usize, y: usize) -> bool {
        self.terrain[self.idx(x, y)] == MOUNTAIN
    }

    fn is_lake(&self, x: usize, y: usize) -> bool {
        self.lakes[self.idx(x, y)]
    }

    fn is_adjacent_to_rivers(&self, x: usize, y: usize, radius: u32) -> bool {
        let r = radius as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx as usize >= self.width || ny as usize >= self.height {
                    continue;
                }
                if self.rivers[self.idx(nx as usize, ny as usize)] {
                    return true;
                }
            }
        }
        false
    }

    fn get_elevation(&self, x: usize, y: usize) -> i32 {
        self.elevation[self.idx(x, y)]
    }

    fn get_rainfall(&self, x: usize, y: usize) -> i32 {
        self.rainfall[self.idx(x, y)]
    }

    fn get_latitude(&self, _x: usize, y: usize) -> f64 {
        ((y as f64 / self.height as f64) * 180.0 - 90.0) * -1.0
    }

    fn get_terrain_type(&self, x: usize, y: usize) -> u8 {
        self.terrain[self.idx(x, y)]
    }

    fn get_biome_type(&self, x: usize, y: usize) -> u8 {
        self.biome[self.idx(x, y)]
    }

    fn get_feature_type(&self, x: usize, y: usize) -> Option<u8> {
        self.feature[self.idx(x, y)]
    }

    fn can_have_feature(&self, x: usize, y: usize, feature: u8) -> bool {
        let water = self.is_water(x, y);
        if feature == REEF {
            water && !self.is_lake(x, y)
        } else {
            !water && !self.is_mountain(x, y)
        }
    }

    fn set_terrain_type(&mut self, x: usize, y: usize, terrain: u8) {
        let i = self.idx(x, y);
        self.terrain[i] = terrain;
        if terrain != COAST {
            self.lakes[i] = false;
        }
    }

    fn set_elevation(&mut self, x: usize, y: usize, elevation: i32) {
        let i = self.idx(x, y);
        self.elevation[i] = elevation;
    }

    fn set_rainfall(&mut self, x: usize, y: usize, rainfall: i32) {
        let i = self.idx(x, y);
        self.rainfall[i] = rainfall;
    }

    fn set_biome_type(&mut self, x: usize, y: usize, biome: u8) {
        let i = self.idx(x, y);
        self.biome[i] = biome;
    }

    fn set_feature_type(&mut self, x: usize, y: usize, feature: u8) {
        let i = self.idx(x, y);
        self.feature[i] = Some(feature);
    }

    fn set_landmass_region_id(&mut self, x: usize, y: usize, region: i32) {
        let i = self.idx(x, y);
        self.landmass_region[i] = region;
    }

    fn get_random_number(&mut self, max: i32, _label: &str) -> i32 {
        self.random_calls += 1;
        if max <= 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }

    fn create_fractal(
        &mut self,
        id: u32,
        width: usize,
        height: usize,
        grain: u32,
        _flags: u32,
    ) -> HostResult<()> {
        if self.failing_fractals.contains(&id) {
            return Err(AdapterError::failed(
                "create_fractal",
                format!("fractal {id} unavailable"),
            ));
        }
        let noise = Perlin::new(self.noise_seed.wrapping_add(id.wrapping_mul(7919)));
        let freq = (grain.max(1) as f64) / (width.max(height).max(1) as f64) * 2.0;
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let mut total = 0.0;
                let mut amp = 1.0;
                let mut f = freq;
                let mut norm = 0.0;
                for _ in 0..4 {
                    total += amp * noise.get([x as f64 * f, y as f64 * f]);
                    norm += amp;
                    amp *= 0.5;
                    f *= 2.0;
                }
                let v = ((total / norm) * 0.5 + 0.5).clamp(0.0, 1.0);
                values.push((v * 65535.0) as u32);
            }
        }
        self.fractals.insert(id, values);
        Ok(())
    }

    fn get_fractal_height(&self, id: u32, x: usize, y: usize) -> u32 {
        let i = self.idx(x, y);
        self.fractals
            .get(&id)
            .and_then(|v| v.get(i).copied())
            .unwrap_or(0)
    }

    fn get_height_from_percent(&self, id: u32, percent: u32) -> u32 {
        let Some(values) = self.fractals.get(&id) else {
            return 0;
        };
        if values.is_empty() {
            return 0;
        }
        let mut sorted = values.clone();
        sorted.sort_unstable();
        let rank = (percent.min(100) as usize * (sorted.len() - 1)) / 100;
        sorted[rank]
    }

    fn terrain_names(&self) -> Vec<String> {
        TERRAIN_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn biome_names(&self) -> Vec<String> {
        BIOME_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn feature_names(&self) -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn validate_and_fix_terrain(&mut self) -> HostResult<()> {
        self.check("validate_and_fix_terrain")
    }

    fn recalculate_areas(&mut self) -> HostResult<()> {
        self.check("recalculate_areas")
    }

    fn store_water_data(&mut self) -> HostResult<()> {
        self.check("store_water_data")
    }

    fn expand_coasts(&mut self, width: usize, height: usize) -> HostResult<()> {
        self.check("expand_coasts")?;
        let mut coast = Vec::new();
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                if self.terrain[self.idx(x, y)] != OCEAN {
                    continue;
                }
                if self
                    .bounded_neighbors(x, y)
                    .into_iter()
                    .any(|(nx, ny)| !self.is_water(nx, ny))
                {
                    coast.push(self.idx(x, y));
                }
            }
        }
        for i in coast {
            self.terrain[i] = COAST;
        }
        Ok(())
    }

    fn generate_lakes(&mut self, width: usize, height: usize, tiles_per_lake: u32) -> HostResult<()> {
        self.check("generate_lakes")?;
        let land = self.land_count();
        let mut remaining = land / tiles_per_lake.max(1) as usize;
        for y in 1..height.min(self.height).saturating_sub(1) {
            for x in 1..width.min(self.width).saturating_sub(1) {
                if remaining == 0 {
                    return Ok(());
                }
                if self.is_water(x, y) || self.is_mountain(x, y) {
                    continue;
                }
                let enclosed = self
                    .bounded_neighbors(x, y)
                    .into_iter()
                    .all(|(nx, ny)| !self.is_water(nx, ny));
                if enclosed && self.rng.gen_range(0..4) == 0 {
                    let i = self.idx(x, y);
                    self.terrain[i] = COAST;
                    self.lakes[i] = true;
                    remaining -= 1;
                }
            }
        }
        Ok(())
    }

    fn build_elevation(&mut self) -> HostResult<()> {
        self.check("build_elevation")?;
        let noise = Perlin::new(self.noise_seed ^ 0x5eed);
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.idx(x, y);
                let jitter = (noise.get([x as f64 * 0.2, y as f64 * 0.2]) * 40.0) as i32;
                self.elevation[i] = match self.terrain[i] {
                    MOUNTAIN => 900 + jitter,
                    HILL => 450 + jitter,
                    FLAT => 120 + jitter,
                    COAST => -20,
                    _ => -200,
                };
            }
        }
        Ok(())
    }

    fn model_rivers(&mut self, min_length: u32, max_length: u32, _navigable_terrain: u8) -> HostResult<()> {
        self.check("model_rivers")?;
        let mut sources = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let t = self.terrain[self.idx(x, y)];
                if (t == HILL || t == MOUNTAIN) && (x + y) % 7 == 0 {
                    sources.push((x, y));
                }
            }
        }
        for (sx, sy) in sources {
            let mut path = vec![(sx, sy)];
            let (mut cx, mut cy) = (sx, sy);
            let mut reached_water = false;
            while path.len() < max_length as usize {
                let here = self.elevation[self.idx(cx, cy)];
                let next = self
                    .bounded_neighbors(cx, cy)
                    .into_iter()
                    .min_by_key(|&(nx, ny)| self.elevation[self.idx(nx, ny)]);
                let Some((nx, ny)) = next else { break };
                if self.is_water(nx, ny) {
                    reached_water = true;
                    break;
                }
                if self.elevation[self.idx(nx, ny)] >= here {
                    break;
                }
                path.push((nx, ny));
                cx = nx;
                cy = ny;
            }
            if reached_water && path.len() >= min_length.max(1) as usize {
                for (x, y) in path {
                    let i = self.idx(x, y);
                    self.rivers[i] = true;
                }
            }
        }
        Ok(())
    }

    fn define_named_rivers(&mut self) -> HostResult<()> {
        self.check("define_named_rivers")
    }

    fn designate_biomes(&mut self, width: usize, height: usize) -> HostResult<()> {
        self.check("designate_biomes")?;
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                let i = self.idx(x, y);
                if self.is_water(x, y) {
                    self.biome[i] = MARINE;
                    continue;
                }
                let lat = self.get_latitude(x, y).abs();
                let rain = self.rainfall[i];
                self.biome[i] = if lat > 65.0 {
                    TUNDRA
                } else if lat < 20.0 && rain > 100 {
                    TROPICAL
                } else if rain < 40 {
                    DESERT
                } else if rain > 80 {
                    GRASSLAND
                } else {
                    PLAINS
                };
            }
        }
        Ok(())
    }

    fn add_features(&mut self, width: usize, height: usize) -> HostResult<()> {
        self.check("add_features")?;
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                let i = self.idx(x, y);
                if self.feature[i].is_none()
                    && self.biome[i] == GRASSLAND
                    && self.rainfall[i] > 110
                    && self.rng.gen_range(0..3) == 0
                {
                    self.feature[i] = Some(FOREST);
                }
            }
        }
        Ok(())
    }

    fn add_natural_wonders(&mut self, _width: usize, _height: usize, _count: u32) -> HostResult<()> {
        self.check("add_natural_wonders")
    }

    fn add_floodplains(&mut self, _min_length: u32, _max_length: u32) -> HostResult<()> {
        self.check("add_floodplains")
    }

    fn generate_snow(&mut self, _width: usize, _height: usize) -> HostResult<()> {
        self.check("generate_snow")
    }

    fn generate_resources(&mut self, _width: usize, _height: usize) -> HostResult<()> {
        self.check("generate_resources")
    }

    fn assign_start_positions(&mut self, request: &StartRequest) -> HostResult<Vec<usize>> {
        self.check("assign_start_positions")?;
        let mut starts = spread_pick(&self.land_tiles_in(&request.west), request.players_west);
        starts.extend(spread_pick(&self.land_tiles_in(&request.east), request.players_east));
        Ok(starts)
    }

    fn generate_discoveries(&mut self, _width: usize, _height: usize, _starts: &[usize]) -> HostResult<()> {
        self.check("generate_discoveries")
    }

    fn recalculate_fertility(&mut self) -> HostResult<()> {
        self.check("recalculate_fertility")
    }

    fn assign_advanced_start_regions(&mut self) -> HostResult<()> {
        self.check("assign_advanced_start_regions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_as_ocean_with_defaults() {
        let adapter = MockAdapter::new(8, 6, 1);
        assert!(adapter.is_water(3, 3));
        assert_eq!(adapter.get_elevation(0, 0), 100);
        assert_eq!(adapter.get_rainfall(0, 0), 50);
        assert_eq!(adapter.land_count(), 0);
    }

    #[test]
    fn test_random_is_seeded() {
        let mut a = MockAdapter::new(4, 4, 9);
        let mut b = MockAdapter::new(4, 4, 9);
        let xs: Vec<i32> = (0..10).map(|_| a.get_random_number(100, "T")).collect();
        let ys: Vec<i32> = (0..10).map(|_| b.get_random_number(100, "T")).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&v| (0..100).contains(&v)));
        assert_eq!(a.random_calls(), 10);
    }

    #[test]
    fn test_fractal_failure_injection() {
        let mut adapter = MockAdapter::new(8, 8, 1).fail_fractal(0);
        assert!(adapter.create_fractal(0, 8, 8, 5, 0).is_err());
        assert!(adapter.create_fractal(1, 8, 8, 5, 0).is_ok());
        assert!(adapter.get_height_from_percent(1, 100) >= adapter.get_height_from_percent(1, 10));
    }

    #[test]
    fn test_expand_coasts_marks_ocean_next_to_land() {
        let mut adapter = MockAdapter::new(6, 6, 1);
        adapter.set_terrain_type(2, 2, FLAT);
        adapter.expand_coasts(6, 6).unwrap();
        assert_eq!(adapter.get_terrain_type(3, 3), COAST);
        assert_eq!(adapter.get_terrain_type(5, 5), OCEAN);
        assert_eq!(adapter.calls(), &["expand_coasts"]);
    }

    #[test]
    fn test_failing_operation() {
        let mut adapter = MockAdapter::new(4, 4, 1).fail_operation("generate_snow");
        assert!(adapter.generate_snow(4, 4).is_err());
        assert!(adapter.generate_resources(4, 4).is_ok());
    }
}
