//! Biome overrides on top of the host's own designation.
//!
//! The host assigns biomes first; the rules here then nudge land tiles
//! toward tundra on cold dry ground, tropical along warm wet coasts and
//! grassland in river valleys, rift shoulders and strategic corridors.

use log::debug;

use crate::context::MapContext;
use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BiomeSummary {
    pub tundra: usize,
    pub tropical_coast: usize,
    pub river_valley: usize,
    pub rift_shoulder: usize,
    pub corridor: usize,
}

pub fn designate_enhanced_biomes(ctx: &mut MapContext<'_>) -> Result<BiomeSummary> {
    let (width, height) = (ctx.width, ctx.height);
    ctx.adapter.designate_biomes(width, height)?;

    let cfg = ctx.config.biomes.clone();
    let ids = ctx.catalog.biome;
    let rifts = ctx.config.stages.story_rifts && !ctx.story.rift_shoulder.is_empty();
    let corridors = &ctx.config.story.corridors;
    let land_pct = (corridors.land.biome_bias_strength.clamp(0.0, 1.0) * 100.0).round() as i32;
    let river_pct = (corridors.river.biome_bias_strength.clamp(0.0, 1.0) * 100.0).round() as i32;
    let mut summary = BiomeSummary::default();

    for y in 0..height {
        for x in 0..width {
            if ctx.is_water(x, y) {
                continue;
            }
            let lat = ctx.latitude(x, y).abs();
            let elevation = ctx.adapter.get_elevation(x, y);
            let rainfall = ctx.adapter.get_rainfall(x, y);

            if (lat > cfg.tundra_lat_min || elevation > cfg.tundra_elev_min)
                && rainfall < cfg.tundra_rain_max
            {
                ctx.adapter.set_biome_type(x, y, ids.tundra);
                summary.tundra += 1;
                continue;
            }

            if lat < cfg.tropical_coast_lat_max
                && ctx.is_coastal_land(x, y)
                && rainfall > cfg.tropical_coast_rain_min
            {
                ctx.adapter.set_biome_type(x, y, ids.tropical);
                summary.tropical_coast += 1;
            }

            if ctx.adapter.is_adjacent_to_rivers(x, y, 1)
                && rainfall > cfg.river_valley_rain_min
                && lat < cfg.river_valley_lat_max
            {
                ctx.adapter.set_biome_type(x, y, ids.grassland);
                summary.river_valley += 1;
            }

            if rifts && ctx.story.rift_shoulder.contains(&(x, y)) {
                if lat < cfg.rift_grassland_lat_max && rainfall > cfg.rift_grassland_rain_min {
                    ctx.adapter.set_biome_type(x, y, ids.grassland);
                    summary.rift_shoulder += 1;
                } else if lat < cfg.rift_tropical_lat_max && rainfall > cfg.rift_tropical_rain_min {
                    ctx.adapter.set_biome_type(x, y, ids.tropical);
                    summary.rift_shoulder += 1;
                }
            }

            if ctx.story.land_corridor.contains(&(x, y))
                && rainfall > 80
                && lat < 55.0
                && ctx.random("Corridor Land-Open Biome", 100) < land_pct
            {
                ctx.adapter.set_biome_type(x, y, ids.grassland);
                summary.corridor += 1;
            }
            if ctx.story.river_corridor.contains(&(x, y))
                && rainfall > 75
                && lat < 55.0
                && ctx.random("Corridor River-Chain Biome", 100) < river_pct
            {
                ctx.adapter.set_biome_type(x, y, ids.grassland);
                summary.corridor += 1;
            }
        }
    }

    debug!(
        "Biomes: {} tundra, {} tropical coast, {} river valley, {} rift shoulder, {} corridor",
        summary.tundra, summary.tropical_coast, summary.river_valley, summary.rift_shoulder, summary.corridor
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    fn land(width: usize, height: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(width, height, 3);
        for y in 0..height {
            for x in 0..width {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    #[test]
    fn test_high_dry_ground_becomes_tundra() {
        let mut adapter = land(10, 10);
        // Row 5 sits on the equator.
        adapter.set_elevation(4, 5, 900);
        adapter.set_rainfall(4, 5, 60);
        adapter.set_elevation(6, 5, 900);
        adapter.set_rainfall(6, 5, 120);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        let summary = designate_enhanced_biomes(&mut ctx).unwrap();
        let tundra = ctx.catalog.biome.tundra;
        drop(ctx);

        assert!(summary.tundra >= 1);
        assert_eq!(adapter.get_biome_type(4, 5), tundra);
        assert_ne!(adapter.get_biome_type(6, 5), tundra);
    }

    #[test]
    fn test_warm_wet_coast_becomes_tropical() {
        let mut adapter = MockAdapter::new(10, 10, 3);
        for y in 0..10 {
            for x in 5..10 {
                adapter.set_terrain_type(x, y, 2);
                adapter.set_rainfall(x, y, 110);
            }
        }
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        designate_enhanced_biomes(&mut ctx).unwrap();
        let tropical = ctx.catalog.biome.tropical;
        drop(ctx);

        assert_eq!(adapter.get_biome_type(5, 5), tropical);
        // Interior tile at 70 degrees stays with the host's choice.
        assert_ne!(adapter.get_biome_type(8, 1), tropical);
    }

    #[test]
    fn test_rift_shoulder_respects_toggle() {
        let mut adapter = land(10, 10);
        adapter.set_rainfall(3, 4, 60);
        let mut config = MapGenConfig::default();
        config.biomes.rift_grassland_rain_min = 50;
        let grassland = {
            let mut ctx = MapContext::new(&mut adapter, config.clone()).unwrap();
            ctx.story.rift_shoulder.insert((3, 4));
            let summary = designate_enhanced_biomes(&mut ctx).unwrap();
            assert_eq!(summary.rift_shoulder, 1);
            ctx.catalog.biome.grassland
        };
        assert_eq!(adapter.get_biome_type(3, 4), grassland);

        config.stages.story_rifts = false;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        ctx.story.rift_shoulder.insert((3, 4));
        assert_eq!(designate_enhanced_biomes(&mut ctx).unwrap().rift_shoulder, 0);
    }

    #[test]
    fn test_corridors_lean_toward_grassland() {
        let mut adapter = land(10, 10);
        for x in 0..10 {
            adapter.set_rainfall(x, 4, 90);
            adapter.set_rainfall(x, 6, 90);
        }
        let mut config = MapGenConfig::default();
        config.story.corridors.land.biome_bias_strength = 1.0;
        config.story.corridors.river.biome_bias_strength = 0.0;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        for x in 2..8 {
            ctx.story.land_corridor.insert((x, 4));
            ctx.story.river_corridor.insert((x, 6));
        }
        let summary = designate_enhanced_biomes(&mut ctx).unwrap();
        let grassland = ctx.catalog.biome.grassland;
        drop(ctx);

        assert_eq!(summary.corridor, 6);
        for x in 2..8 {
            assert_eq!(adapter.get_biome_type(x, 4), grassland);
        }
    }

    #[test]
    fn test_host_failure_propagates() {
        let mut adapter = land(6, 6).fail_operation("designate_biomes");
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert!(designate_enhanced_biomes(&mut ctx).is_err());
    }
}
