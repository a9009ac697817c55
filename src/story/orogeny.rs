//! Orogeny belts with windward and lee flanks.

use log::debug;

use super::{size_scale, TileKey};
use crate::context::MapContext;
use crate::plates::BoundaryType;
use crate::tilemap::Tilemap;

const MIN_BELT_CLOSENESS: u8 = 48;
const HIGH_ELEVATION: i32 = 500;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrogenySummary {
    pub belts: usize,
    pub windward: usize,
    pub lee: usize,
}

/// Tensors the plate-driven belt search reads.
pub struct OrogenyFields<'a> {
    pub uplift_potential: &'a Tilemap<u8>,
    pub tectonic_stress: &'a Tilemap<u8>,
    pub boundary_type: &'a Tilemap<BoundaryType>,
    pub boundary_closeness: &'a Tilemap<u8>,
    pub wind_u: Option<&'a Tilemap<i8>>,
    pub wind_v: Option<&'a Tilemap<i8>>,
}

/// Prevailing surface flow by latitude: easterly trades and polar easterlies,
/// westerlies between 30 and 60 degrees.
pub fn zonal_step(lat: f64) -> (i64, i64) {
    let lat = lat.abs();
    if !(30.0..60.0).contains(&lat) {
        (-1, 0)
    } else {
        (1, 0)
    }
}

/// Tag belts, then mark land upwind (windward) and downwind (lee) of each.
pub fn story_tag_orogeny_belts(ctx: &mut MapContext<'_>) -> OrogenySummary {
    ctx.story.orogeny.clear();

    let tensors = ctx.world.as_ref().map(|w| {
        let (f, d) = (w.fields(), w.dynamics());
        (
            f.uplift_potential.clone(),
            f.tectonic_stress.clone(),
            f.boundary_type.clone(),
            f.boundary_closeness.clone(),
            d.wind_u.clone(),
            d.wind_v.clone(),
        )
    });

    let size = ctx.width * ctx.height;
    let summary = match tensors {
        Some((u, s, bt, bc, wu, wv))
            if u.len() == size && s.len() == size && bt.len() == size && bc.len() == size =>
        {
            let winds = wu.len() == size && wv.len() == size;
            let fields = OrogenyFields {
                uplift_potential: &u,
                tectonic_stress: &s,
                boundary_type: &bt,
                boundary_closeness: &bc,
                wind_u: winds.then_some(&wu),
                wind_v: winds.then_some(&wv),
            };
            tag_from_plates(ctx, &fields)
        }
        _ => tag_from_elevation(ctx),
    };

    debug!(
        "Orogeny: {} belt tiles, {} windward, {} lee",
        summary.belts, summary.windward, summary.lee
    );
    summary
}

fn params(ctx: &MapContext<'_>) -> (i64, usize) {
    let cfg = &ctx.config.story.orogeny;
    let sqrt = size_scale(ctx.width, ctx.height);
    let radius = cfg.radius as i64 + if sqrt > 1.5 { 1 } else { 0 };
    let min_len = 10.max((cfg.min_length_soft as f64 * (0.9 + 0.4 * sqrt)).round() as usize);
    (radius, min_len)
}

pub fn tag_from_plates(ctx: &mut MapContext<'_>, fields: &OrogenyFields<'_>) -> OrogenySummary {
    let (width, height) = (ctx.width, ctx.height);
    let (radius, min_len) = params(ctx);

    let metric = |x: usize, y: usize| {
        (0.7 * *fields.uplift_potential.get(x, y) as f64 + 0.3 * *fields.tectonic_stress.get(x, y) as f64)
            .round() as i32
    };

    let mut belts: Vec<TileKey> = Vec::new();
    let mut threshold = 180;
    for _ in 0..5 {
        belts.clear();
        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                if ctx.is_water(x, y)
                    || *fields.boundary_type.get(x, y) != BoundaryType::Convergent
                    || *fields.boundary_closeness.get(x, y) < MIN_BELT_CLOSENESS
                    || metric(x, y) < threshold
                {
                    continue;
                }
                let dense = fields
                    .uplift_potential
                    .square_ring(x, y, 1)
                    .into_iter()
                    .filter(|&(nx, ny)| metric(nx, ny) >= threshold)
                    .count();
                if dense >= 2 {
                    belts.push((x, y));
                }
            }
        }
        if belts.len() >= min_len || threshold <= 128 {
            break;
        }
        threshold -= 12;
    }

    if belts.len() < min_len {
        return OrogenySummary::default();
    }

    let wind_step = |ctx: &MapContext<'_>, x: usize, y: usize| match (fields.wind_u, fields.wind_v) {
        (Some(wu), Some(wv)) => {
            let (u, v) = (*wu.get(x, y) as i64, *wv.get(x, y) as i64);
            if u.abs() >= v.abs() {
                (u.signum(), 0)
            } else {
                (0, v.signum())
            }
        }
        _ => zonal_step(ctx.latitude(x, y)),
    };

    let steps: Vec<(TileKey, (i64, i64))> = belts.iter().map(|&(x, y)| ((x, y), wind_step(ctx, x, y))).collect();
    expand_flanks(ctx, &steps, radius)
}

/// Belts from clustered mountains or high ground, flanked along zonal winds.
pub fn tag_from_elevation(ctx: &mut MapContext<'_>) -> OrogenySummary {
    let (width, height) = (ctx.width, ctx.height);
    let (radius, min_len) = params(ctx);

    let mut high = vec![false; width * height];
    for y in 0..height {
        for x in 0..width {
            high[y * width + x] =
                ctx.adapter.is_mountain(x, y) || ctx.adapter.get_elevation(x, y) >= HIGH_ELEVATION;
        }
    }

    let mut steps = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if !high[y * width + x] {
                continue;
            }
            let mut neighbors = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if (dx, dy) != (0, 0) && ctx.in_bounds(nx, ny) && high[ny as usize * width + nx as usize] {
                        neighbors += 1;
                    }
                }
            }
            if neighbors >= 2 {
                steps.push(((x, y), zonal_step(ctx.latitude(x, y))));
            }
        }
    }

    if steps.len() < min_len {
        return OrogenySummary::default();
    }
    expand_flanks(ctx, &steps, radius)
}

fn expand_flanks(ctx: &mut MapContext<'_>, belts: &[(TileKey, (i64, i64))], radius: i64) -> OrogenySummary {
    for &((x, y), (dx, dy)) in belts {
        ctx.story.orogeny.belts.insert((x, y));
        for r in 1..=radius {
            let (wx, wy) = (x as i64 - dx * r, y as i64 - dy * r);
            let (lx, ly) = (x as i64 + dx * r, y as i64 + dy * r);
            if ctx.in_bounds(wx, wy) && !ctx.is_water(wx as usize, wy as usize) {
                ctx.story.orogeny.windward.insert((wx as usize, wy as usize));
            }
            if ctx.in_bounds(lx, ly) && !ctx.is_water(lx as usize, ly as usize) {
                ctx.story.orogeny.lee.insert((lx as usize, ly as usize));
            }
        }
    }
    OrogenySummary {
        belts: ctx.story.orogeny.belts.len(),
        windward: ctx.story.orogeny.windward.len(),
        lee: ctx.story.orogeny.lee.len(),
    }
}
