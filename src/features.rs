//! Story-driven features layered over the host's feature pass.

use std::collections::HashSet;

use log::debug;

use crate::context::MapContext;
use crate::error::Result;
use crate::story::TileKey;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureSummary {
    pub reefs: usize,
    pub volcanic: usize,
    pub vegetation: usize,
}

/// Shelf reef odds, derived from the paradise reef chance.
pub fn shelf_reef_chance(paradise_chance: i32, multiplier: f64) -> i32 {
    let base = if paradise_chance > 0 { paradise_chance } else { 18 };
    ((base as f64 * multiplier).floor() as i32).clamp(1, 100)
}

/// Roll reefs on empty water around each tagged tile. Returns the count placed.
fn scatter_reefs(
    ctx: &mut MapContext<'_>,
    centers: &HashSet<TileKey>,
    radius: i32,
    chance: i32,
    label: &str,
) -> usize {
    let reef = ctx.catalog.feature.reef;
    let mut centers: Vec<TileKey> = centers.iter().copied().collect();
    centers.sort_unstable();

    let mut placed = 0;
    for (cx, cy) in centers {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (nx, ny) = (cx as i64 + dx as i64, cy as i64 + dy as i64);
                if !ctx.in_bounds(nx, ny) {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if !ctx.is_water(nx, ny) || ctx.adapter.get_feature_type(nx, ny).is_some() {
                    continue;
                }
                if ctx.random(label, 100) < chance && ctx.adapter.can_have_feature(nx, ny, reef) {
                    ctx.adapter.set_feature_type(nx, ny, reef);
                    placed += 1;
                }
            }
        }
    }
    placed
}

/// Roll `chance` percent and place `feature` if the host allows it there.
fn try_place(ctx: &mut MapContext<'_>, x: usize, y: usize, feature: u8, label: &str, chance: i32) -> bool {
    if ctx.random(label, 100) < chance && ctx.adapter.can_have_feature(x, y, feature) {
        ctx.adapter.set_feature_type(x, y, feature);
        true
    } else {
        false
    }
}

pub fn add_diverse_features(ctx: &mut MapContext<'_>) -> Result<FeatureSummary> {
    let (width, height) = (ctx.width, ctx.height);
    ctx.adapter.add_features(width, height)?;

    let cfg = ctx.config.features.clone();
    let hotspots = ctx.config.stages.story_hotspots;
    let biomes = ctx.catalog.biome;
    let features = ctx.catalog.feature;
    let mut summary = FeatureSummary::default();

    if hotspots && cfg.paradise_reef_chance > 0 {
        let paradise = ctx.story.hotspot_paradise.clone();
        summary.reefs += scatter_reefs(
            ctx,
            &paradise,
            cfg.paradise_reef_radius.max(0),
            cfg.paradise_reef_chance,
            "Paradise Reef",
        );
    }
    if !ctx.story.passive_shelf.is_empty() {
        let shelf = ctx.story.passive_shelf.clone();
        let chance = shelf_reef_chance(cfg.paradise_reef_chance, cfg.shelf_reef_multiplier);
        summary.reefs += scatter_reefs(ctx, &shelf, cfg.shelf_reef_radius.max(0), chance, "Shelf Reef");
    }

    let volcanic_forest = (cfg.volcanic_forest_chance + cfg.volcanic_forest_bonus).min(100);
    let volcanic_taiga = (cfg.volcanic_taiga_chance + cfg.volcanic_taiga_bonus).min(100);
    let check_volcanic = hotspots && !ctx.story.hotspot_volcanic.is_empty();

    for y in 0..height {
        for x in 0..width {
            if ctx.is_water(x, y) || ctx.adapter.get_feature_type(x, y).is_some() {
                continue;
            }
            let biome = ctx.adapter.get_biome_type(x, y);
            let elevation = ctx.adapter.get_elevation(x, y);
            let rainfall = ctx.adapter.get_rainfall(x, y);
            let lat = ctx.latitude(x, y).abs();

            let near_volcanic = check_volcanic
                && ctx.any_within(x, y, cfg.volcanic_radius.max(0), |nx, ny| {
                    ctx.story.hotspot_volcanic.contains(&(nx, ny))
                });
            if near_volcanic {
                if rainfall > cfg.volcanic_forest_rain_min
                    && (biome == biomes.grassland || biome == biomes.tropical)
                    && try_place(ctx, x, y, features.forest, "Volcanic Forest", volcanic_forest)
                {
                    summary.volcanic += 1;
                    continue;
                }
                if lat >= cfg.volcanic_taiga_lat_min
                    && biome == biomes.tundra
                    && elevation < cfg.volcanic_taiga_elev_max
                    && rainfall > cfg.volcanic_taiga_rain_min
                    && try_place(ctx, x, y, features.taiga, "Volcanic Taiga", volcanic_taiga)
                {
                    summary.volcanic += 1;
                    continue;
                }
            }

            let placed = (biome == biomes.tropical
                && rainfall > cfg.rainforest_rain_min
                && try_place(ctx, x, y, features.rainforest, "Extra Jungle", cfg.rainforest_extra_chance))
                || (biome == biomes.grassland
                    && rainfall > cfg.forest_rain_min
                    && try_place(ctx, x, y, features.forest, "Extra Forest", cfg.forest_extra_chance))
                || (biome == biomes.tundra
                    && elevation < cfg.taiga_elev_max
                    && try_place(ctx, x, y, features.taiga, "Extra Taiga", cfg.taiga_extra_chance));
            if placed {
                summary.vegetation += 1;
            }
        }
    }

    debug!(
        "Features: {} reefs, {} volcanic, {} extra vegetation",
        summary.reefs, summary.volcanic, summary.vegetation
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    #[test]
    fn test_shelf_reef_chance() {
        assert_eq!(shelf_reef_chance(18, 0.6), 10);
        assert_eq!(shelf_reef_chance(0, 0.6), 10);
        assert_eq!(shelf_reef_chance(18, 0.0), 1);
        assert_eq!(shelf_reef_chance(90, 2.0), 100);
    }

    #[test]
    fn test_paradise_reefs_only_on_empty_sea() {
        let mut adapter = MockAdapter::new(12, 12, 8);
        adapter.set_terrain_type(6, 6, 2);
        let mut config = MapGenConfig::default();
        config.features.paradise_reef_chance = 100;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        ctx.story.hotspot_paradise.insert((6, 6));
        let summary = add_diverse_features(&mut ctx).unwrap();
        let reef = ctx.catalog.feature.reef;
        drop(ctx);

        // 5x5 block minus the island itself.
        assert_eq!(summary.reefs, 24);
        assert_eq!(adapter.get_feature_type(6, 6), None);
        assert_eq!(adapter.get_feature_type(4, 4), Some(reef));
        assert_eq!(adapter.get_feature_type(3, 6), None);
    }

    #[test]
    fn test_hotspot_toggle_disables_paradise_reefs() {
        let mut adapter = MockAdapter::new(12, 12, 8);
        let mut config = MapGenConfig::default();
        config.features.paradise_reef_chance = 100;
        config.stages.story_hotspots = false;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        ctx.story.hotspot_paradise.insert((6, 6));
        assert_eq!(add_diverse_features(&mut ctx).unwrap().reefs, 0);
    }

    #[test]
    fn test_extra_vegetation_respects_host_rules() {
        let (w, h) = (10, 10);
        let mut adapter = MockAdapter::new(w, h, 4);
        for y in 0..h {
            for x in 0..w {
                adapter.set_terrain_type(x, y, 2);
                adapter.set_biome_type(x, y, 3);
                adapter.set_rainfall(x, y, 150);
            }
        }
        adapter.set_terrain_type(5, 5, 0);
        let mut config = MapGenConfig::default();
        config.features.rainforest_extra_chance = 100;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        let summary = add_diverse_features(&mut ctx).unwrap();
        let rainforest = ctx.catalog.feature.rainforest;
        drop(ctx);

        assert_eq!(summary.vegetation, w * h - 1);
        assert_eq!(adapter.get_feature_type(5, 5), None);
        assert_eq!(adapter.get_feature_type(0, 0), Some(rainforest));
    }
}
