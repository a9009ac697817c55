//! Climate swatches.
//!
//! One weighted macro pattern per map (a desert belt, an equatorial rainbelt,
//! wet tropical island coasts, forested windward ranges or dry interior
//! plains) nudges baseline rainfall before rivers are modelled. An optional
//! monsoon pass then wets tropical coasts facing onshore winds.

use log::debug;

use super::size_scale;
use crate::climate::{rainfall_at, set_rainfall};
use crate::config::{DirectionalityConfig, SwatchesConfig};
use crate::context::MapContext;
use crate::tilemap::Tilemap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwatchKind {
    MacroDesertBelt,
    EquatorialRainbelt,
    RainforestArchipelago,
    MountainForests,
    GreatPlains,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwatchSummary {
    pub kind: Option<SwatchKind>,
    pub tiles: usize,
    pub monsoon_tiles: usize,
}

/// Swatch weights, boosted toward patterns that line up with the wind and
/// plate axes when directionality is cohesive.
fn weighted_kinds(cfg: &SwatchesConfig, dir: Option<&DirectionalityConfig>) -> [(SwatchKind, u32); 5] {
    let mut entries = [
        (SwatchKind::MacroDesertBelt, cfg.macro_desert_belt.weight),
        (SwatchKind::EquatorialRainbelt, cfg.equatorial_rainbelt.weight),
        (SwatchKind::RainforestArchipelago, cfg.rainforest_archipelago.weight),
        (SwatchKind::MountainForests, cfg.mountain_forests.weight),
        (SwatchKind::GreatPlains, cfg.great_plains.weight),
    ];
    let Some(d) = dir else {
        return entries;
    };
    let coh = d.cohesion.clamp(0.0, 1.0);
    if coh <= 0.0 {
        return entries;
    }
    let zonal = (d.wind_bias_deg as f64).to_radians().cos().abs();
    let plate = (d.plate_axis_deg as f64).to_radians().cos().abs();
    for (kind, weight) in entries.iter_mut() {
        let mul = match kind {
            SwatchKind::MacroDesertBelt => 1.0 + 0.4 * coh * zonal,
            SwatchKind::EquatorialRainbelt => 1.0 + 0.25 * coh * zonal,
            SwatchKind::MountainForests => 1.0 + 0.2 * coh * plate,
            SwatchKind::GreatPlains => 1.0 + 0.2 * coh * zonal,
            SwatchKind::RainforestArchipelago => 1.0,
        };
        *weight = (*weight as f64 * mul).round() as u32;
    }
    entries
}

/// Walk the cumulative weights with a roll in `0..total`.
fn pick_kind(entries: &[(SwatchKind, u32)], mut roll: u32) -> Option<SwatchKind> {
    for &(kind, weight) in entries {
        if roll < weight {
            return Some(kind);
        }
        roll -= weight;
    }
    None
}

fn falloff(distance: f64, radius: f64) -> f64 {
    (1.0 - distance / radius.max(1.0)).max(0.0)
}

pub fn story_tag_climate_swatches(ctx: &mut MapContext<'_>) -> SwatchSummary {
    let (width, height) = (ctx.width, ctx.height);
    let cfg = ctx.config.climate.swatches.clone();
    let dir = ctx.config.dynamics.directionality.clone();
    let mut summary = SwatchSummary::default();

    let entries = weighted_kinds(&cfg, dir.as_ref());
    let total: u32 = entries.iter().map(|&(_, w)| w).sum();
    if total > 0 {
        let roll = ctx.random("SwatchType", total.min(i32::MAX as u32) as i32).max(0) as u32;
        summary.kind = pick_kind(&entries, roll.min(total - 1));
    }

    let width_mul = 1.0 + cfg.width_mul_sqrt * (size_scale(width, height) - 1.0);
    let band = |half_width: f64, floor: f64| (half_width * width_mul).round().max(floor);

    if let Some(kind) = summary.kind {
        for y in 0..height {
            let lat = ctx.latitude(0, y).abs();
            for x in 0..width {
                if ctx.is_water(x, y) {
                    continue;
                }
                let rf = rainfall_at(ctx, x, y);
                let elev = ctx.adapter.get_elevation(x, y);
                let delta = match kind {
                    SwatchKind::MacroDesertBelt => {
                        let t = &cfg.macro_desert_belt;
                        let f = falloff((lat - t.latitude_center_deg).abs(), band(t.half_width_deg, 4.0));
                        let lowland = if elev < 250 { 4 } else { 0 };
                        (f > 0.0).then(|| -(((t.dryness_delta + lowland) as f64 * f).round() as i32))
                    }
                    SwatchKind::EquatorialRainbelt => {
                        let t = &cfg.equatorial_rainbelt;
                        let f = falloff((lat - t.latitude_center_deg).abs(), band(t.half_width_deg, 4.0));
                        let coast = if ctx.is_coastal_land(x, y) { 6 } else { 0 }
                            + if ctx.is_adjacent_to_shallow_water(x, y) { 4 } else { 0 };
                        (f > 0.0).then(|| ((t.wetness_delta + coast) as f64 * f).round() as i32)
                    }
                    SwatchKind::RainforestArchipelago => {
                        let tropics = if lat < 23.0 {
                            1.0
                        } else if lat < 30.0 {
                            0.5
                        } else {
                            0.0
                        };
                        let islandy = if ctx.is_coastal_land(x, y) { 1.0 } else { 0.0 }
                            + if ctx.is_adjacent_to_shallow_water(x, y) { 0.5 } else { 0.0 };
                        let wet = cfg.rainforest_archipelago.wetness_delta as f64;
                        (tropics > 0.0 && islandy > 0.0).then(|| (wet * tropics * islandy).round() as i32)
                    }
                    SwatchKind::MountainForests => {
                        let t = &cfg.mountain_forests;
                        if ctx.story.orogeny.windward.contains(&(x, y)) {
                            Some(t.windward_bonus + if elev < 300 { 2 } else { 0 })
                        } else if ctx.story.orogeny.lee.contains(&(x, y)) {
                            Some(-t.lee_penalty)
                        } else {
                            None
                        }
                    }
                    SwatchKind::GreatPlains => {
                        let t = &cfg.great_plains;
                        let f = falloff((lat - t.latitude_center_deg).abs(), band(t.half_width_deg, 6.0));
                        (f > 0.0 && elev <= t.lowland_max_elevation)
                            .then(|| -((t.dry_delta as f64 * f).round() as i32))
                    }
                };
                if let Some(delta) = delta {
                    set_rainfall(ctx, x, y, rf + delta);
                    summary.tiles += 1;
                }
            }
        }
    }

    summary.monsoon_tiles = monsoon_pass(ctx, dir.as_ref());
    debug!(
        "Climate swatch {:?}: {} tiles, {} monsoon tiles",
        summary.kind, summary.tiles, summary.monsoon_tiles
    );
    summary
}

/// Onshore wet nudge on tropical coasts, following the dominant wind axis.
fn monsoon_pass(ctx: &mut MapContext<'_>, dir: Option<&DirectionalityConfig>) -> usize {
    let Some(d) = dir else {
        return 0;
    };
    let bias = d.monsoon_bias.clamp(0.0, 1.0);
    let coh = d.cohesion.clamp(0.0, 1.0);
    if bias <= 0.0 || coh <= 0.0 {
        return 0;
    }
    let winds: Option<(Tilemap<i8>, Tilemap<i8>)> = ctx
        .world
        .as_ref()
        .filter(|w| w.width() == ctx.width && w.height() == ctx.height)
        .map(|w| (w.dynamics().wind_u.clone(), w.dynamics().wind_v.clone()));
    let Some((wind_u, wind_v)) = winds else {
        return 0;
    };

    let base = ((3.0 * coh * bias).round() as i32).max(1);
    let eq_band = d.equator_band_deg.max(0) as f64;
    let mut touched = 0;
    for y in 0..ctx.height {
        let lat = ctx.latitude(0, y).abs();
        if lat > eq_band + 18.0 {
            continue;
        }
        for x in 0..ctx.width {
            if ctx.is_water(x, y) || !(ctx.is_coastal_land(x, y) || ctx.is_adjacent_to_shallow_water(x, y)) {
                continue;
            }
            let (u, v) = (*wind_u.get(x, y) as i64, *wind_v.get(x, y) as i64);
            let (ux, vy) = if u.abs() >= v.abs() { (u.signum(), 0) } else { (0, v.signum()) };
            let (dn_x, dn_y) = (x as i64 - ux, y as i64 - vy);
            if !ctx.in_bounds(dn_x, dn_y) {
                continue;
            }
            let downwind_water = ctx.is_water(dn_x as usize, dn_y as usize);

            let mut delta = base;
            if lat <= eq_band {
                delta += 2;
            }
            if downwind_water {
                delta += 2;
            }
            if downwind_water && ctx.in_bounds(x as i64 + ux, y as i64 + vy) {
                delta -= 1;
            }
            let rf = rainfall_at(ctx, x, y);
            set_rainfall(ctx, x, y, rf + delta);
            touched += 1;
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;
    use crate::context::ClimateWrite;

    fn wet_land(width: usize, height: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(width, height, 4);
        for y in 0..height {
            for x in 0..width {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    fn only(kind: SwatchKind) -> MapGenConfig {
        let mut config = MapGenConfig::default();
        let s = &mut config.climate.swatches;
        s.macro_desert_belt.weight = (kind == SwatchKind::MacroDesertBelt) as u32;
        s.equatorial_rainbelt.weight = (kind == SwatchKind::EquatorialRainbelt) as u32;
        s.rainforest_archipelago.weight = (kind == SwatchKind::RainforestArchipelago) as u32;
        s.mountain_forests.weight = (kind == SwatchKind::MountainForests) as u32;
        s.great_plains.weight = (kind == SwatchKind::GreatPlains) as u32;
        config
    }

    fn fill_rain(ctx: &mut MapContext<'_>, value: i32) {
        for y in 0..ctx.height {
            for x in 0..ctx.width {
                ctx.write_climate(x, y, ClimateWrite { rainfall: Some(value), ..Default::default() });
            }
        }
    }

    #[test]
    fn test_pick_walks_cumulative_weights() {
        let entries = [
            (SwatchKind::MacroDesertBelt, 8),
            (SwatchKind::EquatorialRainbelt, 0),
            (SwatchKind::GreatPlains, 5),
        ];
        assert_eq!(pick_kind(&entries, 0), Some(SwatchKind::MacroDesertBelt));
        assert_eq!(pick_kind(&entries, 7), Some(SwatchKind::MacroDesertBelt));
        assert_eq!(pick_kind(&entries, 8), Some(SwatchKind::GreatPlains));
        assert_eq!(pick_kind(&entries, 13), None);
    }

    #[test]
    fn test_cohesion_boosts_zonal_patterns() {
        let cfg = SwatchesConfig::default();
        let dir = DirectionalityConfig {
            cohesion: 1.0,
            ..DirectionalityConfig::default()
        };
        let boosted = weighted_kinds(&cfg, Some(&dir));
        assert_eq!(boosted[0], (SwatchKind::MacroDesertBelt, 11));
        assert_eq!(boosted[2], (SwatchKind::RainforestArchipelago, 7));
        assert_eq!(weighted_kinds(&cfg, None)[0], (SwatchKind::MacroDesertBelt, 8));
    }

    #[test]
    fn test_desert_belt_dries_its_band() {
        // Mock latitude is 90 - 10y on an 18-row map.
        let mut adapter = wet_land(20, 18);
        let mut ctx = MapContext::new(&mut adapter, only(SwatchKind::MacroDesertBelt)).unwrap();
        fill_rain(&mut ctx, 100);
        let summary = story_tag_climate_swatches(&mut ctx);

        assert_eq!(summary.kind, Some(SwatchKind::MacroDesertBelt));
        assert!(summary.tiles > 0);
        // Band center: full dryness plus the lowland bonus.
        assert_eq!(rainfall_at(&ctx, 5, 7), 100 - 32);
        // The equator lies outside the band.
        assert_eq!(rainfall_at(&ctx, 5, 9), 100);
    }

    #[test]
    fn test_mountain_forests_follow_orogeny_flanks() {
        let mut adapter = wet_land(12, 12);
        let mut ctx = MapContext::new(&mut adapter, only(SwatchKind::MountainForests)).unwrap();
        fill_rain(&mut ctx, 100);
        ctx.story.orogeny.windward.insert((3, 3));
        ctx.story.orogeny.lee.insert((5, 3));
        let summary = story_tag_climate_swatches(&mut ctx);

        assert_eq!(summary.tiles, 2);
        assert_eq!(rainfall_at(&ctx, 3, 3), 108);
        assert_eq!(rainfall_at(&ctx, 5, 3), 98);
        assert_eq!(rainfall_at(&ctx, 4, 3), 100);
    }

    #[test]
    fn test_zero_weights_pick_nothing() {
        let mut config = only(SwatchKind::GreatPlains);
        config.climate.swatches.great_plains.weight = 0;
        let mut adapter = wet_land(10, 10);
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        fill_rain(&mut ctx, 100);
        let summary = story_tag_climate_swatches(&mut ctx);
        assert_eq!(summary, SwatchSummary::default());
        drop(ctx);
        assert_eq!(adapter.random_calls(), 0);
    }
}
