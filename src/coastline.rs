//! Rugged coastlines.
//!
//! After the host has laid down its coast ring, two per-tile rolls roughen
//! it: bays turn coastal land into coast, and fjord-like inlets push coast
//! into open water. Active margins and nearby plate boundaries raise the odds
//! of both; divergent boundaries lower them.

use log::debug;

use crate::config::{CoastPlateBias, LaneProtection};
use crate::context::{HeightfieldWrite, MapContext};
use crate::error::Result;
use crate::plates::BoundaryType;
use crate::story::size_scale;
use crate::tilemap::Tilemap;

/// Fractal id shared by coasts and islands.
pub const HILL_FRACTAL: u32 = 1;
const COAST_GRAIN: u32 = 4;
/// Bay noise gate modulus applied to raw fractal samples.
const BAY_NOISE_MODULUS: u32 = 97;

fn clamped_bias(raw: &CoastPlateBias) -> CoastPlateBias {
    CoastPlateBias {
        threshold: raw.threshold.clamp(0.0, 1.0),
        power: raw.power.max(0.1),
        bay_weight: raw.bay_weight.max(0.0),
        bay_noise_bonus: raw.bay_noise_bonus.max(0.0),
        fjord_weight: raw.fjord_weight.max(0.0),
        ..raw.clone()
    }
}

/// Signed weight from boundary proximity and type.
///
/// Past `threshold` the weight ramps up to the type multiplier; inside plates
/// it ramps toward `interior` instead. `closeness` is normalized to 0..1.
pub fn compute_plate_bias(closeness: f64, boundary: BoundaryType, cfg: &CoastPlateBias) -> f64 {
    let cn = if closeness.is_nan() { 0.0 } else { closeness };
    let threshold = cfg.threshold;

    if cn >= threshold {
        let span = (1.0 - threshold).max(1e-3);
        let ramp = ((cn - threshold) / span).clamp(0.0, 1.0).powf(cfg.power);
        let type_mul = match boundary {
            BoundaryType::Convergent => cfg.convergent,
            BoundaryType::Transform => cfg.transform,
            BoundaryType::Divergent => cfg.divergent,
            BoundaryType::None => 0.0,
        };
        ramp * type_mul
    } else if cfg.interior != 0.0 && threshold > 0.0 {
        (1.0 - cn / threshold).clamp(0.0, 1.0).powf(cfg.power) * cfg.interior
    } else {
        0.0
    }
}

/// Scale a roll denominator down by a positive bias (or up by a negative one).
fn biased_den(den: i32, bias: f64, weight: f64, lo: f64, hi: f64) -> i32 {
    if weight <= 0.0 || bias == 0.0 {
        return den;
    }
    let scale = (1.0 + bias * weight).clamp(lo, hi);
    ((den as f64 / scale).round() as i32).max(1)
}

pub fn add_rugged_coasts(ctx: &mut MapContext<'_>) -> Result<()> {
    let (width, height) = (ctx.width, ctx.height);
    if width < 3 || height < 3 {
        return Ok(());
    }
    ctx.adapter
        .create_fractal(HILL_FRACTAL, width, height, COAST_GRAIN, 0)?;

    let sqrt = size_scale(width, height);
    let cfg = ctx.config.coastlines.clone();
    let bias_cfg = clamped_bias(&cfg.plate_bias);
    let boundaries: Option<(Tilemap<u8>, Tilemap<BoundaryType>)> = ctx
        .plate_fields()
        .map(|f| (f.boundary_closeness.clone(), f.boundary_type.clone()));

    let bay_noise_extra = (sqrt > 1.0) as i32 + cfg.bay.noise_gate_add;
    let fjord_base = (cfg.fjord.base_denom - (sqrt > 1.3) as i32).max(6);
    let coast = ctx.catalog.terrain.coast;
    let to_coast = HeightfieldWrite {
        terrain: Some(coast),
        is_land: Some(false),
        ..Default::default()
    };

    let lanes = ctx.config.story.corridors.sea.clone();
    let soft_mult = lanes.soft_chance_multiplier.clamp(0.01, 1.0);

    let (mut bays, mut fjords) = (0usize, 0usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let on_lane = ctx.story.sea_lane.contains(&(x, y));
            if on_lane && lanes.protection == LaneProtection::Hard {
                continue;
            }
            // Soft protection only thins the odds on lane tiles.
            let soften = |den: i32| {
                if on_lane {
                    ((den as f64 / soft_mult).round() as i32).max(1)
                } else {
                    den
                }
            };
            let (closeness, bias) = match &boundaries {
                Some((bc, bt)) => {
                    let cn = *bc.get(x, y) as f64 / 255.0;
                    (cn, compute_plate_bias(cn, *bt.get(x, y), &bias_cfg))
                }
                None => (0.0, 0.0),
            };
            let near_boundary = closeness >= bias_cfg.threshold;

            if ctx.is_coastal_land(x, y) {
                let h = ctx.adapter.get_fractal_height(HILL_FRACTAL, x, y);
                let active = near_boundary || ctx.story.active_margin.contains(&(x, y));
                let gate_bonus = if bias > 0.0 {
                    (bias * bias_cfg.bay_noise_bonus).round() as i32
                } else {
                    0
                };
                let noise_gate = 2 + bay_noise_extra + active as i32 + gate_bonus;
                let den = if active {
                    cfg.bay.roll_den_active
                } else {
                    cfg.bay.roll_den_default
                };
                let den = biased_den(soften(den.max(1)), bias, bias_cfg.bay_weight, 0.25, 4.0);

                if ((h % BAY_NOISE_MODULUS) as i32) < noise_gate && ctx.roll("Carve Bay", den) {
                    ctx.write_heightfield(x, y, to_coast);
                    bays += 1;
                    continue;
                }
            }

            if ctx.is_water(x, y) && ctx.is_adjacent_to_land(x, y, 1) {
                let mut near_active = near_boundary;
                let mut near_passive = false;
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        if (nx, ny) == (x, y) || nx == 0 || ny == 0 || nx >= width - 1 || ny >= height - 1 {
                            continue;
                        }
                        near_active |= ctx.story.active_margin.contains(&(nx, ny));
                        near_passive |= ctx.story.passive_shelf.contains(&(nx, ny));
                    }
                }
                let denom = (fjord_base
                    - if near_passive { cfg.fjord.passive_bonus } else { 0 }
                    - if near_active { cfg.fjord.active_bonus } else { 0 })
                .max(4);
                let den = biased_den(soften(denom), bias, bias_cfg.fjord_weight, 0.2, 5.0);

                if ctx.roll("Fjord Coast", den) {
                    ctx.write_heightfield(x, y, to_coast);
                    fjords += 1;
                }
            }
        }
    }

    debug!("Rugged coasts: {bays} bays, {fjords} fjords");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    fn island(width: usize, height: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(width, height, 21);
        for y in 5..15 {
            for x in 5..25 {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    #[test]
    fn test_plate_bias_ramps() {
        let cfg = CoastPlateBias::default();
        assert!((compute_plate_bias(1.0, BoundaryType::Convergent, &cfg) - 1.0).abs() < 1e-9);
        assert!((compute_plate_bias(1.0, BoundaryType::Divergent, &cfg) + 0.6).abs() < 1e-9);
        assert_eq!(compute_plate_bias(0.45, BoundaryType::Convergent, &cfg), 0.0);
        assert_eq!(compute_plate_bias(0.2, BoundaryType::Convergent, &cfg), 0.0);
        assert_eq!(compute_plate_bias(f64::NAN, BoundaryType::Convergent, &cfg), 0.0);

        let inland = CoastPlateBias {
            interior: 0.5,
            ..CoastPlateBias::default()
        };
        let w = compute_plate_bias(0.0, BoundaryType::None, &inland);
        assert!((w - 0.5).abs() < 1e-9);
        assert!(compute_plate_bias(0.3, BoundaryType::None, &inland) < w);
    }

    #[test]
    fn test_biased_den_bounds() {
        assert_eq!(biased_den(5, 0.0, 0.35, 0.25, 4.0), 5);
        assert_eq!(biased_den(5, 1.0, 0.0, 0.25, 4.0), 5);
        assert!(biased_den(5, 1.0, 0.35, 0.25, 4.0) < 5);
        assert!(biased_den(5, -0.6, 0.8, 0.2, 5.0) > 5);
        assert_eq!(biased_den(1, 10.0, 1.0, 0.2, 5.0), 1);
    }

    #[test]
    fn test_rugged_coasts_only_add_coast() {
        let (w, h) = (30, 20);
        let mut adapter = island(w, h);
        let before: Vec<u8> = (0..w * h).map(|i| adapter.get_terrain_type(i % w, i / w)).collect();
        let land_before = adapter.land_count();

        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        add_rugged_coasts(&mut ctx).unwrap();
        drop(ctx);

        assert!(adapter.land_count() <= land_before);
        for i in 0..w * h {
            let (x, y) = (i % w, i / w);
            let now = adapter.get_terrain_type(x, y);
            if now != before[i] {
                assert_eq!(now, 3, "changed tile ({x},{y}) must be coast");
                assert!(x > 0 && y > 0 && x < w - 1 && y < h - 1);
            }
        }
        assert!(adapter.random_calls() > 0);
    }

    #[test]
    fn test_hard_lane_protection_keeps_lanes_untouched() {
        let (w, h) = (30, 20);
        let mut adapter = island(w, h);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        // Tag the whole water ring around the island as a lane.
        for y in 4..16 {
            for x in 4..26 {
                if ctx.is_water(x, y) {
                    ctx.story.sea_lane.insert((x, y));
                }
            }
        }
        let lanes = ctx.story.sea_lane.clone();
        add_rugged_coasts(&mut ctx).unwrap();
        drop(ctx);

        for &(x, y) in &lanes {
            assert_eq!(adapter.get_terrain_type(x, y), 4, "lane tile ({x},{y}) was edited");
        }
    }

    #[test]
    fn test_fractal_failure_fails_the_pass() {
        let mut adapter = island(30, 20).fail_fractal(HILL_FRACTAL);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert!(add_rugged_coasts(&mut ctx).is_err());
    }
}
