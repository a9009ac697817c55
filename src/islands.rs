//! Offshore island chains.
//!
//! Open water far enough from land seeds small island clusters where the
//! hill fractal peaks. Hotspot trail tiles seed on their own odds and are
//! classified paradise or volcanic for the climate and feature passes.

use log::debug;

use crate::coastline::HILL_FRACTAL;
use crate::context::{HeightfieldWrite, MapContext};
use crate::error::Result;

const ISLAND_GRAIN: u32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IslandSummary {
    pub seeded: usize,
    pub paradise: usize,
    pub volcanic: usize,
}

pub fn add_island_chains(ctx: &mut MapContext<'_>) -> Result<IslandSummary> {
    let (width, height) = (ctx.width, ctx.height);
    let mut summary = IslandSummary::default();
    if width < 5 || height < 5 {
        return Ok(summary);
    }
    ctx.adapter
        .create_fractal(HILL_FRACTAL, width, height, ISLAND_GRAIN, 0)?;

    let cfg = ctx.config.islands.clone();
    let hotspot_cfg = ctx.config.story.hotspot.clone();
    let threshold = ctx
        .adapter
        .get_height_from_percent(HILL_FRACTAL, cfg.fractal_threshold_percent.min(100));
    let peak_percent = ((hotspot_cfg.volcanic_peak_chance * 100.0).round() as i32 + 10).clamp(0, 100);
    let min_dist = cfg.min_dist_from_land_radius.max(0);
    let cluster_max = cfg.cluster_max.max(1);
    let (coast, flat) = (ctx.catalog.terrain.coast, ctx.catalog.terrain.flat);
    let lane_radius = ctx.config.story.corridors.sea.avoid_radius.max(0);
    let near_lane = |ctx: &MapContext<'_>, x: usize, y: usize| {
        let lanes = &ctx.story.sea_lane;
        !lanes.is_empty()
            && (lanes.contains(&(x, y)) || ctx.any_within(x, y, lane_radius, |nx, ny| lanes.contains(&(nx, ny))))
    };

    for y in 2..height - 2 {
        for x in 2..width - 2 {
            if !ctx.is_water(x, y) || ctx.is_adjacent_to_land(x, y, min_dist) {
                continue;
            }
            if near_lane(ctx, x, y) {
                continue;
            }

            let v = ctx.adapter.get_fractal_height(HILL_FRACTAL, x, y);
            let is_hotspot = ctx.story.hotspot.contains(&(x, y));
            let mut near_active = false;
            let mut near_passive = false;
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    if (nx, ny) != (x, y) {
                        near_active |= ctx.story.active_margin.contains(&(nx, ny));
                        near_passive |= ctx.story.passive_shelf.contains(&(nx, ny));
                    }
                }
            }

            let den = if near_active {
                cfg.base_island_den_near_active
            } else {
                cfg.base_island_den_else
            };
            let base_allowed = v > threshold && ctx.roll("Island Seed", den.max(1));
            let hotspot_allowed =
                is_hotspot && ctx.roll("Hotspot Island Seed", cfg.hotspot_seed_denom.max(1));
            if !(base_allowed || hotspot_allowed) {
                continue;
            }

            let mut center = coast;
            let mut paradise = false;
            if is_hotspot {
                let p_weight = hotspot_cfg.paradise_bias + near_passive as i32;
                let v_weight = hotspot_cfg.volcanic_bias;
                let bucket = (p_weight + v_weight).max(1);
                paradise = ctx.random("HotspotKind", bucket) < p_weight;
                if !paradise && ctx.random("HotspotPeak", 100) < peak_percent {
                    center = flat;
                }
            }

            ctx.write_heightfield(
                x,
                y,
                HeightfieldWrite {
                    terrain: Some(center),
                    is_land: Some(center == flat),
                    ..Default::default()
                },
            );
            summary.seeded += 1;
            if is_hotspot {
                if paradise {
                    ctx.story.hotspot_paradise.insert((x, y));
                    summary.paradise += 1;
                } else {
                    ctx.story.hotspot_volcanic.insert((x, y));
                    summary.volcanic += 1;
                }
            }

            let count = 1 + ctx.random("Island Size", cluster_max);
            for _ in 0..count {
                let nx = x as i64 + ctx.random("dx", 3) as i64 - 1;
                let ny = y as i64 + ctx.random("dy", 3) as i64 - 1;
                if nx <= 0 || ny <= 0 || nx >= width as i64 - 1 || ny >= height as i64 - 1 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if ctx.is_water(nx, ny) && !ctx.story.sea_lane.contains(&(nx, ny)) {
                    ctx.write_heightfield(
                        nx,
                        ny,
                        HeightfieldWrite {
                            terrain: Some(coast),
                            is_land: Some(false),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    debug!(
        "Islands: {} seeded ({} paradise, {} volcanic)",
        summary.seeded, summary.paradise, summary.volcanic
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    fn continent(width: usize, height: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(width, height, 5);
        for y in 10..20 {
            for x in 4..12 {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    #[test]
    fn test_islands_keep_clear_of_land() {
        let (w, h) = (48, 30);
        let mut adapter = continent(w, h);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        for x in (24..44).step_by(2) {
            ctx.story.hotspot.insert((x, 15));
        }
        let summary = add_island_chains(&mut ctx).unwrap();

        assert!(summary.seeded > 0);
        assert_eq!(summary.paradise, ctx.story.hotspot_paradise.len());
        assert_eq!(summary.volcanic, ctx.story.hotspot_volcanic.len());
        assert!(ctx.story.hotspot_paradise.is_disjoint(&ctx.story.hotspot_volcanic));
        for tile in ctx.story.hotspot_paradise.iter().chain(&ctx.story.hotspot_volcanic) {
            assert!(ctx.story.hotspot.contains(tile));
        }
        drop(ctx);

        // Nothing touches the ring right around the original coast.
        for y in 9..=20 {
            for x in 3..=12 {
                let inside = (10..20).contains(&y) && (4..12).contains(&x);
                let expected = if inside { 2 } else { 4 };
                assert_eq!(adapter.get_terrain_type(x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_islands_avoid_sea_lanes() {
        let (w, h) = (40, 30);
        let mut adapter = MockAdapter::new(w, h, 9);
        let mut config = MapGenConfig::default();
        config.islands.hotspot_seed_denom = 1;
        config.story.corridors.sea.avoid_radius = 2;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        for y in 0..h {
            ctx.story.sea_lane.insert((20, y));
        }
        for y in (4..26).step_by(3) {
            for x in (4..36).step_by(2) {
                ctx.story.hotspot.insert((x, y));
            }
        }
        let summary = add_island_chains(&mut ctx).unwrap();
        drop(ctx);

        assert!(summary.seeded > 0);
        // Seeds stay outside the radius; cluster spill reaches one tile at most.
        for y in 0..h {
            for x in 19..=21 {
                assert_eq!(adapter.get_terrain_type(x, y), 4, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_all_land_seeds_nothing() {
        let mut adapter = MockAdapter::new(20, 20, 1);
        for y in 0..20 {
            for x in 0..20 {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert_eq!(add_island_chains(&mut ctx).unwrap(), IslandSummary::default());
    }

    #[test]
    fn test_fractal_failure_propagates() {
        let mut adapter = continent(40, 30).fail_fractal(HILL_FRACTAL);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert!(add_island_chains(&mut ctx).is_err());
    }
}
