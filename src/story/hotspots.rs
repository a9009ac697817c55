//! Deep-ocean hotspot trails.

use log::debug;

use super::size_scale;
use crate::context::MapContext;

const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const MAX_SEED_ATTEMPTS: usize = 200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HotspotSummary {
    pub trails: usize,
    pub points: usize,
}

/// Walk sparse polylines across open ocean, tagging every step that stays
/// clear of land.
pub fn story_tag_hotspot_trails(ctx: &mut MapContext<'_>) -> HotspotSummary {
    let (width, height) = (ctx.width, ctx.height);
    let cfg = ctx.config.story.hotspot.clone();
    let sqrt = size_scale(width, height);

    let step_len = cfg.step_len.max(1) as i64;
    let min_land = cfg.min_distance_from_land.max(0);
    let separation = cfg.min_trail_separation.max(1) as i64;
    let max_trails = 1.max((cfg.max_trails as f64 * (0.9 + 0.6 * sqrt)).round() as usize);
    let steps = 1.max((cfg.steps as f64 * (0.9 + 0.4 * sqrt)).round() as usize);

    let open_ocean = |ctx: &MapContext<'_>, x: usize, y: usize| {
        ctx.is_water(x, y) && !ctx.is_adjacent_to_land(x, y, min_land)
    };

    let mut summary = HotspotSummary::default();
    let mut attempts = 0;
    while summary.trails < max_trails && attempts < MAX_SEED_ATTEMPTS {
        attempts += 1;
        let sx = ctx.random("HotspotSeedX", width as i32) as usize;
        let sy = ctx.random("HotspotSeedY", height as i32) as usize;
        if sx >= width || sy >= height || !open_ocean(ctx, sx, sy) {
            continue;
        }
        let far = ctx.story.hotspot.iter().all(|&(hx, hy)| {
            (hx as i64 - sx as i64).abs() + (hy as i64 - sy as i64).abs() >= separation
        });
        if !far {
            continue;
        }

        let mut dir = ctx.random("HotspotDir", DIRECTIONS.len() as i32) as usize % DIRECTIONS.len();
        let (mut x, mut y) = (sx as i64, sy as i64);
        let mut tagged = 0;
        for _ in 0..steps {
            let (dx, dy) = DIRECTIONS[dir];
            x += dx * step_len;
            y += dy * step_len;
            if !ctx.in_bounds(x, y) {
                break;
            }
            let (ux, uy) = (x as usize, y as usize);
            if !open_ocean(ctx, ux, uy) {
                continue;
            }

            ctx.story.hotspot.insert((ux, uy));
            tagged += 1;

            if ctx.random("HotspotBend", 5) == 0 {
                let turn = ctx.random("HotspotTurn", 3) as usize;
                dir = (dir + turn + DIRECTIONS.len() - 1) % DIRECTIONS.len();
            }
        }

        if tagged > 0 {
            summary.trails += 1;
            summary.points += tagged;
        }
    }

    debug!("Hotspot trails: {} trails, {} points", summary.trails, summary.points);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    #[test]
    fn test_trails_stay_in_open_ocean() {
        let mut adapter = MockAdapter::new(60, 40, 11);
        for y in 15..25 {
            for x in 5..12 {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        let summary = story_tag_hotspot_trails(&mut ctx);

        assert!(summary.trails > 0);
        // Crossing trails may revisit a tile.
        assert!(summary.points >= ctx.story.hotspot.len());
        for &(x, y) in &ctx.story.hotspot {
            assert!(ctx.is_water(x, y));
            assert!(!ctx.is_adjacent_to_land(x, y, 5));
        }
    }

    #[test]
    fn test_all_land_map_has_no_trails() {
        let mut adapter = MockAdapter::new(20, 20, 2);
        for y in 0..20 {
            for x in 0..20 {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert_eq!(story_tag_hotspot_trails(&mut ctx), HotspotSummary::default());
        assert!(ctx.story.hotspot.is_empty());
    }
}
