//! Paleo-hydrology.
//!
//! Traces of older water after rivers are modelled: wet delta fans where
//! rivers meet low coasts, oxbow pockets beside lowland rivers and dry fossil
//! channels that wander downhill across lowlands away from today's rivers.
//! Only rainfall changes; no rivers or terrain are added.

use log::debug;

use super::size_scale;
use crate::climate::{rainfall_at, set_rainfall};
use crate::context::MapContext;

const DELTA_MAX_ELEVATION: i32 = 300;
const FOSSIL_MAX_START_ELEVATION: i32 = 320;
const MAX_OXBOW_ATTEMPTS: usize = 300;
const MAX_FOSSIL_TRIES: usize = 120;
/// Flank tiles this much higher than the channel count as bluffs.
const BLUFF_RISE: i32 = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaleoSummary {
    pub deltas: usize,
    pub oxbows: usize,
    pub fossils: usize,
}

pub fn story_tag_paleo_hydrology(ctx: &mut MapContext<'_>) -> PaleoSummary {
    let summary = PaleoSummary {
        deltas: wet_deltas(ctx),
        oxbows: wet_oxbows(ctx),
        fossils: carve_fossil_channels(ctx),
    };
    debug!(
        "Paleo: {} deltas, {} oxbows, {} fossil channels",
        summary.deltas, summary.oxbows, summary.fossils
    );
    summary
}

fn wet_deltas(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.climate.paleo.clone();
    let (w, h) = (ctx.width, ctx.height);
    let fan = cfg.delta_fan_radius.max(0) as i64;
    let marsh_pct = (cfg.delta_marsh_chance.clamp(0.0, 1.0) * 100.0).round() as i32;

    let mut deltas = 0;
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            if deltas >= cfg.max_deltas {
                return deltas;
            }
            if !ctx.is_coastal_land(x, y)
                || !ctx.adapter.is_adjacent_to_rivers(x, y, 1)
                || ctx.adapter.get_elevation(x, y) > DELTA_MAX_ELEVATION
            {
                continue;
            }
            for dy in -fan..=fan {
                for dx in -fan..=fan {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if !ctx.in_bounds(nx, ny) || ctx.is_water(nx as usize, ny as usize) {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    let bonus = if ctx.random("DeltaMarsh", 100) < marsh_pct { 6 } else { 3 };
                    let rf = rainfall_at(ctx, nx, ny);
                    set_rainfall(ctx, nx, ny, rf + bonus);
                }
            }
            deltas += 1;
        }
    }
    deltas
}

fn wet_oxbows(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.climate.paleo.clone();
    let (w, h) = (ctx.width, ctx.height);
    let mut oxbows = 0;
    let mut attempts = 0;
    while oxbows < cfg.max_oxbows && attempts < MAX_OXBOW_ATTEMPTS {
        attempts += 1;
        let x = ctx.random("OxbowX", w as i32).max(0) as usize;
        let y = ctx.random("OxbowY", h as i32).max(0) as usize;
        if x >= w || y >= h || ctx.is_water(x, y) {
            continue;
        }
        if ctx.adapter.get_elevation(x, y) > cfg.oxbow_elevation_max
            || !ctx.adapter.is_adjacent_to_rivers(x, y, 1)
        {
            continue;
        }
        let rf = rainfall_at(ctx, x, y);
        set_rainfall(ctx, x, y, rf + 8);
        oxbows += 1;
    }
    oxbows
}

fn carve_fossil_channels(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.climate.paleo.clone();
    if cfg.max_fossil_channels == 0 {
        return 0;
    }
    let (w, h) = (ctx.width, ctx.height);
    let sqrt = size_scale(w, h);
    let base_len = cfg.fossil_channel_length.max(6) as f64;
    let len = (base_len * (1.0 + cfg.length_mul_sqrt * (sqrt - 1.0))).round() as usize;
    let step = cfg.fossil_channel_step.max(1);
    let rim = if cfg.canyon_rim { cfg.rim_width.max(0) as i64 } else { 0 };
    let dry = if cfg.canyon_rim { cfg.canyon_dry_bonus.max(0) } else { 0 };

    let mut fossils = 0;
    let mut tries = 0;
    while fossils < cfg.max_fossil_channels && tries < MAX_FOSSIL_TRIES {
        tries += 1;
        let sx = ctx.random("FossilX", w as i32).max(0) as usize;
        let sy = ctx.random("FossilY", h as i32).max(0) as usize;
        if sx >= w || sy >= h || ctx.is_water(sx, sy) {
            continue;
        }
        if ctx.adapter.get_elevation(sx, sy) > FOSSIL_MAX_START_ELEVATION
            || ctx.adapter.is_adjacent_to_rivers(sx, sy, cfg.fossil_min_distance_from_rivers)
        {
            continue;
        }

        let (mut x, mut y) = (sx, sy);
        let mut used = 0;
        while used < len {
            if !ctx.is_water(x, y) {
                let rf = rainfall_at(ctx, x, y);
                set_rainfall(ctx, x, y, rf + cfg.fossil_channel_humidity - dry);
                dry_bluffs(ctx, x, y, rim, cfg.bluff_wet_reduction);
            }

            let mut best = (x, y);
            let mut best_elev = ctx.adapter.get_elevation(x, y);
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    if (dx, dy) == (0, 0) || (dx.abs() + dy.abs()) as usize * step > 2 {
                        continue;
                    }
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if !ctx.in_bounds(nx, ny) {
                        continue;
                    }
                    let e = ctx.adapter.get_elevation(nx as usize, ny as usize);
                    if e < best_elev {
                        best_elev = e;
                        best = (nx as usize, ny as usize);
                    }
                }
            }
            if best == (x, y) {
                break;
            }
            (x, y) = best;
            used += step;
        }
        if used >= len {
            fossils += 1;
        }
    }
    fossils
}

fn dry_bluffs(ctx: &mut MapContext<'_>, x: usize, y: usize, rim: i64, reduction: i32) {
    if rim == 0 || reduction == 0 {
        return;
    }
    let e0 = ctx.adapter.get_elevation(x, y);
    for ry in -rim..=rim {
        for rx in -rim..=rim {
            let (nx, ny) = (x as i64 + rx, y as i64 + ry);
            if (rx, ry) == (0, 0) || !ctx.in_bounds(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if ctx.is_water(nx, ny) || ctx.adapter.get_elevation(nx, ny) <= e0 + BLUFF_RISE {
                continue;
            }
            let rf = rainfall_at(ctx, nx, ny);
            set_rainfall(ctx, nx, ny, rf - reduction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::{MapGenConfig, PaleoConfig};
    use crate::context::ClimateWrite;

    fn land(width: usize, height: usize, land_to: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(width, height, 12);
        for y in 0..height {
            for x in 0..land_to {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    fn only(paleo: PaleoConfig) -> MapGenConfig {
        let mut config = MapGenConfig::default();
        config.climate.paleo = paleo;
        config
    }

    fn fill_rain(ctx: &mut MapContext<'_>, value: i32) {
        for y in 0..ctx.height {
            for x in 0..ctx.width {
                ctx.write_climate(x, y, ClimateWrite { rainfall: Some(value), ..Default::default() });
            }
        }
    }

    fn rain_grid(ctx: &MapContext<'_>) -> Vec<i32> {
        (0..ctx.height)
            .flat_map(|y| (0..ctx.width).map(move |x| (x, y)))
            .map(|(x, y)| rainfall_at(ctx, x, y))
            .collect()
    }

    #[test]
    fn test_delta_fan_wets_river_mouth() {
        // Land west of x=15, a river reaching the coast at (14, 5).
        let mut adapter = land(20, 10, 15);
        adapter.set_river(14, 5);
        let config = only(PaleoConfig {
            max_deltas: 1,
            delta_marsh_chance: 1.0,
            max_oxbows: 0,
            max_fossil_channels: 0,
            ..PaleoConfig::default()
        });
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        fill_rain(&mut ctx, 100);
        let summary = story_tag_paleo_hydrology(&mut ctx);

        assert_eq!(summary, PaleoSummary { deltas: 1, oxbows: 0, fossils: 0 });
        // First river-side coastal tile in scan order is (14, 4).
        assert_eq!(rainfall_at(&ctx, 14, 4), 106);
        assert_eq!(rainfall_at(&ctx, 13, 5), 106);
        assert_eq!(rainfall_at(&ctx, 14, 6), 100);
        assert_eq!(rainfall_at(&ctx, 16, 4), 100);
    }

    #[test]
    fn test_oxbows_stay_beside_rivers() {
        let (w, h) = (20, 10);
        let mut adapter = land(w, h, w);
        for x in 0..w {
            adapter.set_river(x, 5);
        }
        let config = only(PaleoConfig {
            max_deltas: 0,
            max_oxbows: 3,
            max_fossil_channels: 0,
            ..PaleoConfig::default()
        });
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        fill_rain(&mut ctx, 100);
        let summary = story_tag_paleo_hydrology(&mut ctx);

        assert_eq!(summary.oxbows, 3);
        let mut added = 0;
        for (i, rf) in rain_grid(&ctx).into_iter().enumerate() {
            let (x, y) = (i % w, i / w);
            if rf != 100 {
                assert!((4..=6).contains(&y), "oxbow off the river at ({x},{y})");
                added += rf - 100;
            }
        }
        assert_eq!(added, 24);
    }

    #[test]
    fn test_fossil_channels_run_downhill_away_from_rivers() {
        let (w, h) = (30, 10);
        let mut adapter = land(w, h, w);
        for y in 0..h {
            for x in 0..w {
                adapter.set_elevation(x, y, 100 + 10 * x as i32);
            }
        }
        let config = only(PaleoConfig {
            max_deltas: 0,
            max_oxbows: 0,
            max_fossil_channels: 2,
            ..PaleoConfig::default()
        });
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        fill_rain(&mut ctx, 100);
        let summary = story_tag_paleo_hydrology(&mut ctx);

        assert!(summary.fossils >= 1);
        // Channel tiles gain humidity less the canyon dryness; nothing dries.
        let grid = rain_grid(&ctx);
        assert!(grid.iter().all(|&rf| rf >= 100));
        assert!(grid.iter().any(|&rf| rf > 100));
    }

    #[test]
    fn test_fossil_start_rejects_river_country() {
        let (w, h) = (12, 8);
        let mut adapter = land(w, h, w);
        for x in 0..w {
            adapter.set_river(x, 4);
        }
        let config = only(PaleoConfig {
            max_deltas: 0,
            max_oxbows: 0,
            ..PaleoConfig::default()
        });
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        fill_rain(&mut ctx, 100);
        assert_eq!(story_tag_paleo_hydrology(&mut ctx).fossils, 0);
        assert!(rain_grid(&ctx).iter().all(|&rf| rf == 100));
    }
}
