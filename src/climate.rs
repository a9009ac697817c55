//! Rainfall
//!
//! The baseline blends host rainfall with a six-band latitude target, then
//! adds orographic, coastal and noise terms. Refinement runs six passes in a
//! fixed order over the rainfall buffer:
//!
//! - A: water-proximity gradient (also writes humidity)
//! - B: orographic rain shadow along the prevailing flow
//! - C/D: river corridors and closed low basins
//! - E: rift humidity and orogeny windward/lee adjustments
//! - F: hotspot microclimates
//!
//! Passes that need a missing input fall back (zonal winds instead of the
//! wind field) or skip; refinement itself never fails.

use log::debug;
use noise::{NoiseFn, Perlin, Seedable};

use crate::config::ClimateBaselineConfig;
use crate::context::{ClimateWrite, MapContext};
use crate::error::Result;
use crate::story::orogeny::zonal_step;
use crate::story::size_scale;
use crate::tilemap::Tilemap;

/// Latitude band target. `equator_plus` widens the two tropical bands on
/// larger maps.
pub fn band_rainfall(abs_lat: f64, cfg: &ClimateBaselineConfig, equator_plus: i32) -> i32 {
    let band = cfg
        .band_edges
        .iter()
        .position(|&edge| abs_lat < edge)
        .unwrap_or(cfg.bands.len() - 1);
    let base = cfg.bands[band];
    match band {
        0 => base + equator_plus,
        1 => base + (equator_plus as f64 * 0.6).floor() as i32,
        _ => base,
    }
}

/// Chebyshev distance to the nearest water tile, searching rings out to
/// `max_radius`.
pub fn distance_to_water(ctx: &MapContext<'_>, x: usize, y: usize, max_radius: i32) -> Option<i32> {
    for r in 1..=max_radius {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs() != r && dy.abs() != r {
                    continue;
                }
                let (nx, ny) = (x as i64 + dx as i64, y as i64 + dy as i64);
                if ctx.in_bounds(nx, ny) && ctx.is_water(nx as usize, ny as usize) {
                    return Some(r);
                }
            }
        }
    }
    None
}

/// Full bonus next to water, decaying linearly to nothing past `spread`.
pub fn coastal_bonus(distance: Option<i32>, bonus: i32, spread: u32) -> i32 {
    let spread = spread.max(1) as i32;
    match distance {
        Some(d) if (1..=spread).contains(&d) => {
            (bonus as f64 * (spread + 1 - d) as f64 / spread as f64).round() as i32
        }
        _ => 0,
    }
}

pub(crate) fn rainfall_at(ctx: &MapContext<'_>, x: usize, y: usize) -> i32 {
    *ctx.climate.rainfall.get(x, y) as i32
}

pub(crate) fn set_rainfall(ctx: &mut MapContext<'_>, x: usize, y: usize, rainfall: i32) {
    ctx.write_climate(
        x,
        y,
        ClimateWrite {
            rainfall: Some(rainfall),
            ..Default::default()
        },
    );
}

// =============================================================================
// BASELINE
// =============================================================================

pub fn apply_climate_baseline(ctx: &mut MapContext<'_>) -> Result<()> {
    ctx.sync_climate();

    let (width, height) = (ctx.width, ctx.height);
    let cfg = ctx.config.climate.baseline.clone();
    let sqrt = size_scale(width, height);
    let equator_plus = (12.0 * (sqrt - 1.0)).round() as i32;
    let noise_span = cfg.noise_base + if sqrt > 1.0 { 1.0 } else { 0.0 };

    let seed = match ctx.world.as_ref().map(|w| w.seeds().climate) {
        Some(seed) => seed,
        None => ctx.random("RainNoiseSeed", i32::MAX) as u64,
    };
    let noise = Perlin::new(1).set_seed(seed as u32);

    let mut land = 0usize;
    for y in 0..height {
        for x in 0..width {
            if ctx.is_water(x, y) {
                continue;
            }
            land += 1;
            let base = rainfall_at(ctx, x, y) as f64;
            let elevation = ctx.adapter.get_elevation(x, y);
            let band = band_rainfall(ctx.latitude(x, y).abs(), &cfg, equator_plus);

            let mut rf = (base * cfg.host_weight + band as f64 * cfg.band_weight).round() as i32;
            if elevation > cfg.orographic_low_elevation {
                rf += cfg.orographic_low_bonus;
            }
            if elevation > cfg.orographic_high_elevation {
                rf += cfg.orographic_high_bonus;
            }
            let dist = distance_to_water(ctx, x, y, cfg.coastal_spread as i32);
            rf += coastal_bonus(dist, cfg.coastal_bonus, cfg.coastal_spread);

            let n = noise.get([x as f64 * cfg.noise_frequency, y as f64 * cfg.noise_frequency]);
            rf += (n * noise_span).round() as i32;

            set_rainfall(ctx, x, y, rf);
        }
    }

    debug!("Climate baseline: {land} land tiles, noise span {noise_span}");
    Ok(())
}

// =============================================================================
// REFINEMENT
// =============================================================================

/// Run every refinement pass. Story passes only run when their overlay
/// stage is enabled.
pub fn refine_climate(ctx: &mut MapContext<'_>) {
    let stages = ctx.config.stages.clone();
    let passes = ctx.config.climate.refine.clone();

    if passes.water_gradient {
        water_gradient_pass(ctx);
    }
    if passes.orographic {
        orographic_shadow_pass(ctx);
    }
    if passes.river_basin {
        river_basin_pass(ctx);
    }
    if stages.story_rifts {
        rift_humidity_pass(ctx);
    }
    if stages.story_orogeny {
        orogeny_belt_pass(ctx);
    }
    if stages.story_hotspots {
        hotspot_microclimate_pass(ctx);
    }
    debug!("Climate refinement complete");
}

fn land_tiles(ctx: &MapContext<'_>) -> Vec<(usize, usize)> {
    let mut tiles = Vec::new();
    for y in 0..ctx.height {
        for x in 0..ctx.width {
            if !ctx.is_water(x, y) {
                tiles.push((x, y));
            }
        }
    }
    tiles
}

pub fn water_gradient_pass(ctx: &mut MapContext<'_>) {
    let cfg = ctx.config.climate.refine.clone();
    let max_r = cfg.water_gradient_radius.max(0);
    for (x, y) in land_tiles(ctx) {
        let Some(dist) = distance_to_water(ctx, x, y, max_r) else {
            ctx.write_climate(x, y, ClimateWrite { humidity: Some(0), ..Default::default() });
            continue;
        };
        let mut bonus = (max_r - dist).max(0) * cfg.water_gradient_per_ring;
        if ctx.adapter.get_elevation(x, y) < cfg.water_gradient_lowland_elevation {
            bonus += cfg.water_gradient_lowland_bonus;
        }
        let humidity = 255 * (max_r + 1 - dist) / (max_r + 1);
        ctx.write_climate(
            x,
            y,
            ClimateWrite {
                rainfall: Some(rainfall_at(ctx, x, y) + bonus),
                humidity: Some(humidity),
            },
        );
    }
}

fn is_barrier(ctx: &MapContext<'_>, x: usize, y: usize, barrier_elevation: i32) -> bool {
    !ctx.is_water(x, y)
        && (ctx.adapter.is_mountain(x, y) || ctx.adapter.get_elevation(x, y) >= barrier_elevation)
}

/// Step of the first barrier met marching upwind, following the wind field
/// tile by tile when one is given.
pub fn upwind_barrier(
    ctx: &MapContext<'_>,
    x: usize,
    y: usize,
    steps: i32,
    wind: Option<(&Tilemap<i8>, &Tilemap<i8>)>,
    barrier_elevation: i32,
) -> Option<i32> {
    let (mut cx, mut cy) = (x as i64, y as i64);
    for s in 1..=steps {
        let (fx, fy) = flow_at(ctx, cx as usize, cy as usize, wind);
        let (nx, ny) = (cx - fx, cy - fy);
        if !ctx.in_bounds(nx, ny) {
            break;
        }
        if is_barrier(ctx, nx as usize, ny as usize, barrier_elevation) {
            return Some(s);
        }
        cx = nx;
        cy = ny;
    }
    None
}

/// Unit flow direction at a tile: the dominant wind axis, or the zonal
/// default when there is no wind field or it is calm.
fn flow_at(ctx: &MapContext<'_>, x: usize, y: usize, wind: Option<(&Tilemap<i8>, &Tilemap<i8>)>) -> (i64, i64) {
    if let Some((wu, wv)) = wind {
        let (u, v) = (*wu.get(x, y) as i64, *wv.get(x, y) as i64);
        if u != 0 || v != 0 {
            return if u.abs() >= v.abs() { (u.signum(), 0) } else { (0, v.signum()) };
        }
    }
    zonal_step(ctx.latitude(x, y))
}

pub fn orographic_shadow_pass(ctx: &mut MapContext<'_>) {
    let cfg = ctx.config.climate.refine.clone();
    let extra = ctx
        .config
        .dynamics
        .directionality
        .as_ref()
        .map(|d| (d.cohesion.clamp(0.0, 1.0) * d.winds_follow_plates.clamp(0.0, 1.0)).round() as i32)
        .unwrap_or(0);
    let steps = (cfg.orographic_steps + extra).max(1);

    let size = ctx.width * ctx.height;
    let wind = ctx.world.as_ref().and_then(|w| {
        let d = w.dynamics();
        (d.wind_u.len() == size && d.wind_v.len() == size).then(|| (d.wind_u.clone(), d.wind_v.clone()))
    });

    let mut shadowed = 0;
    for (x, y) in land_tiles(ctx) {
        let barrier = upwind_barrier(
            ctx,
            x,
            y,
            steps,
            wind.as_ref().map(|(u, v)| (u, v)),
            cfg.orographic_barrier_elevation,
        );
        if let Some(step) = barrier {
            let reduction = cfg.orographic_reduction_base + step * cfg.orographic_reduction_per_step;
            set_rainfall(ctx, x, y, rainfall_at(ctx, x, y) - reduction);
            shadowed += 1;
        }
    }
    debug!("Orographic shadow: {shadowed} tiles ({steps} steps)");
}

pub fn river_basin_pass(ctx: &mut MapContext<'_>) {
    let cfg = ctx.config.climate.refine.clone();
    let r = cfg.basin_radius.max(0);
    for (x, y) in land_tiles(ctx) {
        let elevation = ctx.adapter.get_elevation(x, y);
        let mut rf = rainfall_at(ctx, x, y);
        if ctx.adapter.is_adjacent_to_rivers(x, y, 1) {
            rf += if elevation < cfg.river_lowland_elevation {
                cfg.river_lowland_bonus
            } else {
                cfg.river_highland_bonus
            };
        }
        let open = ctx.any_within(x, y, r, |nx, ny| {
            ctx.adapter.get_elevation(nx, ny) < elevation + cfg.basin_rim_delta
        });
        if !open && elevation < cfg.basin_max_elevation {
            rf += cfg.basin_bonus;
        }
        set_rainfall(ctx, x, y, rf);
    }
}

pub fn rift_humidity_pass(ctx: &mut MapContext<'_>) {
    let cfg = ctx.config.climate.story_rainfall.clone();
    if ctx.story.rift_line.is_empty() || cfg.rift_radius <= 0 || cfg.rift_boost == 0 {
        return;
    }
    for (x, y) in land_tiles(ctx) {
        let near = ctx.any_within(x, y, cfg.rift_radius, |nx, ny| ctx.story.rift_line.contains(&(nx, ny)));
        if !near {
            continue;
        }
        let penalty = (ctx.adapter.get_elevation(x, y) - 200).div_euclid(150).max(0);
        let delta = (cfg.rift_boost - penalty).max(0);
        set_rainfall(ctx, x, y, rainfall_at(ctx, x, y) + delta);
    }
}

pub fn orogeny_belt_pass(ctx: &mut MapContext<'_>) {
    let cache = &ctx.story.orogeny;
    if cache.windward.is_empty() && cache.lee.is_empty() {
        return;
    }
    let cfg = ctx.config.story.orogeny.clone();
    let lee_extra = (8.0 * (cfg.lee_drying_strength - 1.0)).round().max(0.0) as i32;
    let lee_subtract = 8 + lee_extra;

    for (x, y) in land_tiles(ctx) {
        let mut rf = rainfall_at(ctx, x, y);
        if ctx.story.orogeny.windward.contains(&(x, y)) {
            rf = (rf + cfg.windward_boost).clamp(0, 200);
        }
        if ctx.story.orogeny.lee.contains(&(x, y)) {
            rf = (rf - lee_subtract).clamp(0, 200);
        }
        set_rainfall(ctx, x, y, rf);
    }
}

pub fn hotspot_microclimate_pass(ctx: &mut MapContext<'_>) {
    let cfg = ctx.config.climate.story_rainfall.clone();
    if ctx.story.hotspot_paradise.is_empty() && ctx.story.hotspot_volcanic.is_empty() {
        return;
    }
    let radius = cfg.hotspot_radius.max(0);
    for (x, y) in land_tiles(ctx) {
        let paradise = ctx.any_within(x, y, radius, |nx, ny| ctx.story.hotspot_paradise.contains(&(nx, ny)));
        let volcanic = ctx.any_within(x, y, radius, |nx, ny| ctx.story.hotspot_volcanic.contains(&(nx, ny)));
        if !(paradise || volcanic) {
            continue;
        }
        let delta = if paradise { cfg.paradise_delta } else { 0 } + if volcanic { cfg.volcanic_delta } else { 0 };
        set_rainfall(ctx, x, y, rainfall_at(ctx, x, y) + delta);
    }
}
