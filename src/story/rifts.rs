//! Inland rift valleys.
//!
//! With a foundation the lines start at local maxima of rift potential on
//! divergent land and follow the ridge of highest potential. Without one, a
//! seeded random march stands in.

use log::debug;

use super::size_scale;
use crate::config::DirectionalityConfig;
use crate::context::MapContext;
use crate::plates::BoundaryType;
use crate::tilemap::Tilemap;

/// Rift lines never reach into polar latitudes.
const MAX_RIFT_LATITUDE: f64 = 70.0;
const LEGACY_MAX_ELEVATION: i32 = 500;
const LEGACY_MAX_TRIES: usize = 300;

const DIRS_NS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 1), (-1, -1)];
const DIRS_EW: [(i64, i64); 4] = [(1, 0), (-1, 0), (1, 1), (-1, -1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiftSource {
    Foundation,
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiftSummary {
    pub rifts: usize,
    pub line_tiles: usize,
    pub shoulder_tiles: usize,
    pub source: RiftSource,
}

#[derive(Clone, Copy, Debug)]
struct RiftParams {
    max_rifts: usize,
    line_steps: usize,
    step_len: i64,
    shoulder_width: i64,
    min_seed_separation: i64,
    /// cohesion × rifts_follow_plates, 0..1
    follow: f64,
    axis_deg: f64,
}

impl RiftParams {
    fn resolve(ctx: &MapContext<'_>) -> Self {
        let cfg = &ctx.config.story.rift;
        let sqrt = size_scale(ctx.width, ctx.height);
        let (follow, axis_deg) = ctx
            .config
            .dynamics
            .directionality
            .as_ref()
            .map(|d: &DirectionalityConfig| {
                (
                    d.rifts_follow_plates.clamp(0.0, 1.0) * d.cohesion.clamp(0.0, 1.0),
                    d.plate_axis_deg as f64,
                )
            })
            .unwrap_or((0.0, 0.0));
        Self {
            max_rifts: 1.max((cfg.max_rifts_per_map as f64 * (0.8 + 0.6 * sqrt)).round() as usize),
            line_steps: 1.max((cfg.line_steps as f64 * (0.9 + 0.4 * sqrt)).round() as usize),
            step_len: cfg.step_len.max(1) as i64,
            shoulder_width: cfg.shoulder_width as i64 + if sqrt > 1.5 { 1 } else { 0 },
            min_seed_separation: if sqrt > 1.5 { 18 } else { 14 },
            follow,
            axis_deg,
        }
    }

    /// Bonus for stepping along the plate axis.
    fn direction_bias(&self, tx: i64, ty: i64) -> i64 {
        if self.follow <= 0.0 {
            return 0;
        }
        let rad = self.axis_deg.to_radians();
        let len = ((tx * tx + ty * ty) as f64).sqrt().max(1.0);
        let dot = rad.cos() * tx as f64 / len + rad.sin() * ty as f64 / len;
        (10.0 * self.follow * dot).round() as i64
    }
}

/// Rift potential, boundary class and closeness for every tile.
pub struct RiftFields<'a> {
    pub rift_potential: &'a Tilemap<u8>,
    pub boundary_type: &'a Tilemap<BoundaryType>,
    pub boundary_closeness: &'a Tilemap<u8>,
}

pub fn story_tag_rift_valleys(ctx: &mut MapContext<'_>) -> RiftSummary {
    let params = RiftParams::resolve(ctx);
    let tensors = ctx.world.as_ref().map(|w| {
        let f = w.fields();
        (
            f.rift_potential.clone(),
            f.boundary_type.clone(),
            f.boundary_closeness.clone(),
        )
    });

    let size = ctx.width * ctx.height;
    let summary = match tensors {
        Some((rp, bt, bc)) if rp.len() == size && bt.len() == size && bc.len() == size => {
            let fields = RiftFields {
                rift_potential: &rp,
                boundary_type: &bt,
                boundary_closeness: &bc,
            };
            tag_from_plates(ctx, &fields, params)
        }
        _ => tag_by_marching(ctx, params),
    };

    debug!(
        "Rift valleys ({:?}): {} rifts, {} line tiles, {} shoulder tiles",
        summary.source, summary.rifts, summary.line_tiles, summary.shoulder_tiles
    );
    summary
}

fn polar(ctx: &MapContext<'_>, y: usize) -> bool {
    ctx.latitude(0, y).abs() > MAX_RIFT_LATITUDE
}

/// Tag land tiles on both sides of a line step, perpendicular to `(dx, dy)`.
fn tag_shoulders(ctx: &mut MapContext<'_>, x: i64, y: i64, dx: i64, dy: i64, width: i64) -> usize {
    let mut added = 0;
    for off in 1..=width {
        for (px, py) in [(x - dy * off, y + dx * off), (x + dy * off, y - dx * off)] {
            if ctx.in_bounds(px, py)
                && !ctx.is_water(px as usize, py as usize)
                && ctx.story.rift_shoulder.insert((px as usize, py as usize))
            {
                added += 1;
            }
        }
    }
    added
}

fn tag_from_plates(ctx: &mut MapContext<'_>, fields: &RiftFields<'_>, params: RiftParams) -> RiftSummary {
    let (width, height) = (ctx.width, ctx.height);
    let rp = fields.rift_potential;
    let divergent = |x: usize, y: usize| *fields.boundary_type.get(x, y) == BoundaryType::Divergent;

    // Sparse local maxima, relaxing the threshold until there are enough.
    let mut seeds: Vec<(usize, usize, u8)> = Vec::new();
    let mut threshold = 192u8;
    for _ in 0..6 {
        seeds.clear();
        for y in 1..height.saturating_sub(1) {
            if polar(ctx, y) {
                continue;
            }
            for x in 1..width.saturating_sub(1) {
                if ctx.is_water(x, y) || !divergent(x, y) {
                    continue;
                }
                let v = *rp.get(x, y);
                if *fields.boundary_closeness.get(x, y) <= 32 || v < threshold {
                    continue;
                }
                let peak = rp
                    .square_ring(x, y, 1)
                    .into_iter()
                    .all(|(nx, ny)| *rp.get(nx, ny) <= v);
                if peak {
                    seeds.push((x, y, v));
                }
            }
        }
        if seeds.len() >= params.max_rifts * 2 || threshold <= 112 {
            break;
        }
        threshold -= 16;
    }
    seeds.sort_by(|a, b| b.2.cmp(&a.2));

    let mut chosen: Vec<(usize, usize)> = Vec::new();
    for &(x, y, _) in &seeds {
        if chosen.len() >= params.max_rifts {
            break;
        }
        let far = chosen.iter().all(|&(cx, cy)| {
            (cx as i64 - x as i64).abs() + (cy as i64 - y as i64).abs() >= params.min_seed_separation
        });
        if far {
            chosen.push((x, y));
        }
    }

    let mut summary = RiftSummary {
        rifts: 0,
        line_tiles: 0,
        shoulder_tiles: 0,
        source: RiftSource::Foundation,
    };

    for (seed_x, seed_y) in chosen {
        let (mut x, mut y) = (seed_x as i64, seed_y as i64);

        // Initial heading toward the strongest land neighbor.
        let mut best = -1i64;
        let (mut sdx, mut sdy) = (1i64, 0i64);
        for (nx, ny) in rp.square_ring(seed_x, seed_y, 1) {
            if ctx.is_water(nx, ny) {
                continue;
            }
            let p = *rp.get(nx, ny) as i64;
            if p > best {
                best = p;
                sdx = nx as i64 - x;
                sdy = ny as i64 - y;
            }
        }

        let mut placed = false;
        for _ in 0..params.line_steps {
            if !ctx.in_bounds(x, y) || ctx.is_water(x as usize, y as usize) || polar(ctx, y as usize) {
                break;
            }
            if ctx.story.rift_line.insert((x as usize, y as usize)) {
                summary.line_tiles += 1;
            }
            placed = true;
            summary.shoulder_tiles += tag_shoulders(ctx, x, y, sdx, sdy, params.shoulder_width);

            let mut best_score = i64::MIN;
            let (mut ndx, mut ndy, mut nx, mut ny) = (sdx, sdy, x, y);
            for ty in -1i64..=1 {
                for tx in -1i64..=1 {
                    if tx == 0 && ty == 0 {
                        continue;
                    }
                    let cx = x + tx * params.step_len;
                    let cy = y + ty * params.step_len;
                    if !ctx.in_bounds(cx, cy) || ctx.is_water(cx as usize, cy as usize) {
                        continue;
                    }
                    let align = if (tx, ty) == (sdx, sdy) {
                        16
                    } else if (tx, ty) == (-sdx, -sdy) {
                        -12
                    } else {
                        0
                    };
                    let score = *rp.get(cx as usize, cy as usize) as i64 + align + params.direction_bias(tx, ty);
                    if score > best_score {
                        best_score = score;
                        (ndx, ndy, nx, ny) = (tx, ty, cx, cy);
                    }
                }
            }

            if (nx, ny) == (x, y) {
                break;
            }
            let (ux, uy) = (nx as usize, ny as usize);
            if !divergent(ux, uy) || *fields.boundary_closeness.get(ux, uy) <= 16 || *rp.get(ux, uy) < 64 {
                break;
            }
            (x, y, sdx, sdy) = (nx, ny, ndx, ndy);
        }

        if placed {
            summary.rifts += 1;
        }
        if summary.rifts >= params.max_rifts {
            break;
        }
    }
    summary
}

fn tag_by_marching(ctx: &mut MapContext<'_>, params: RiftParams) -> RiftSummary {
    let (width, height) = (ctx.width, ctx.height);
    let mut summary = RiftSummary {
        rifts: 0,
        line_tiles: 0,
        shoulder_tiles: 0,
        source: RiftSource::Legacy,
    };

    let mut tries = 0;
    while summary.rifts < params.max_rifts && tries < LEGACY_MAX_TRIES {
        tries += 1;
        let sx = ctx.random("RiftSeedX", width as i32) as usize;
        let sy = ctx.random("RiftSeedY", height as i32) as usize;
        if sx >= width || sy >= height || ctx.is_water(sx, sy) {
            continue;
        }
        if ctx.latitude(sx, sy).abs() > MAX_RIFT_LATITUDE
            || ctx.adapter.get_elevation(sx, sy) > LEGACY_MAX_ELEVATION
        {
            continue;
        }

        let north_south = ctx.random("RiftAxis", 2) == 0;
        let pick = |ctx: &mut MapContext<'_>, first: bool| {
            let (dirs, label) = match (north_south, first) {
                (true, true) => (&DIRS_NS, "RiftDirNS"),
                (true, false) => (&DIRS_NS, "RiftDirNS2"),
                (false, true) => (&DIRS_EW, "RiftDirEW"),
                (false, false) => (&DIRS_EW, "RiftDirEW2"),
            };
            dirs[ctx.random(label, dirs.len() as i32) as usize % dirs.len()]
        };

        let (mut dx, mut dy) = pick(ctx, true);
        let (mut x, mut y) = (sx as i64, sy as i64);
        let mut placed = false;
        for _ in 0..params.line_steps {
            x += dx * params.step_len;
            y += dy * params.step_len;
            if !ctx.in_bounds(x, y) {
                break;
            }
            if ctx.is_water(x as usize, y as usize) {
                continue;
            }
            if ctx.story.rift_line.insert((x as usize, y as usize)) {
                summary.line_tiles += 1;
            }
            placed = true;
            summary.shoulder_tiles += tag_shoulders(ctx, x, y, dx, dy, params.shoulder_width);

            if ctx.random("RiftBend", 6) == 0 {
                (dx, dy) = pick(ctx, false);
            }
        }

        if placed {
            summary.rifts += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    fn land_map(width: usize, height: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(width, height, 21);
        for y in 0..height {
            for x in 2..width - 2 {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    #[test]
    fn test_plate_rift_follows_ridge() {
        let (w, h) = (40, 30);
        let mut adapter = land_map(w, h);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();

        // A north-south ridge of rift potential along column 20.
        let mut rp = Tilemap::new(w, h);
        let mut bt = Tilemap::new(w, h);
        let bc = Tilemap::new_with(w, h, 200u8);
        for y in 0..h {
            for x in 18..=22 {
                bt.set(x, y, BoundaryType::Divergent);
                rp.set(x, y, if x == 20 { 200 + (y == 15) as u8 * 20 } else { 100 });
            }
        }
        let fields = RiftFields {
            rift_potential: &rp,
            boundary_type: &bt,
            boundary_closeness: &bc,
        };
        let params = RiftParams::resolve(&ctx);
        let summary = tag_from_plates(&mut ctx, &fields, params);

        assert_eq!(summary.source, RiftSource::Foundation);
        assert_eq!(summary.rifts, 1);
        assert!(ctx.story.rift_line.contains(&(20, 15)));
        assert!(ctx.story.rift_line.iter().all(|&(x, _)| x == 20));
        assert!(ctx.story.rift_shoulder.contains(&(19, 15)));
        assert!(ctx.story.rift_shoulder.contains(&(21, 15)));
    }

    #[test]
    fn test_fallback_marches_over_land() {
        let mut adapter = land_map(40, 30);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        let summary = story_tag_rift_valleys(&mut ctx);

        assert_eq!(summary.source, RiftSource::Legacy);
        assert!(summary.rifts > 0);
        assert_eq!(summary.line_tiles, ctx.story.rift_line.len());
        for &(x, y) in &ctx.story.rift_line {
            assert!(!ctx.is_water(x, y));
        }
    }

    #[test]
    fn test_direction_bias_prefers_axis() {
        let params = RiftParams {
            max_rifts: 1,
            line_steps: 1,
            step_len: 1,
            shoulder_width: 1,
            min_seed_separation: 14,
            follow: 1.0,
            axis_deg: 0.0,
        };
        assert_eq!(params.direction_bias(1, 0), 10);
        assert_eq!(params.direction_bias(-1, 0), -10);
        assert_eq!(params.direction_bias(0, 1), 0);
    }
}
