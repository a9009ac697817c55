//! Plate-aware volcano placement.

use std::cmp::Ordering;

use log::{debug, warn};

use crate::config::VolcanoesConfig;
use crate::context::{HeightfieldWrite, MapContext};
use crate::error::Result;
use crate::plates::BoundaryType;
use crate::tilemap::wrapped_dx;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolcanoCandidate {
    pub x: usize,
    pub y: usize,
    pub weight: f64,
}

/// Density-derived volcano count, clamped to the configured min/max.
/// A non-positive max leaves the density result uncapped.
pub fn volcano_target(land_tiles: usize, cfg: &VolcanoesConfig) -> usize {
    let raw = (land_tiles as f64 * cfg.base_density.max(0.0)).round() as usize;
    let wanted = raw.max(cfg.min_volcanoes);
    let max = if cfg.max_volcanoes > 0 {
        cfg.max_volcanoes
    } else {
        raw
    };
    if max >= cfg.min_volcanoes {
        wanted.clamp(cfg.min_volcanoes, max)
    } else {
        wanted
    }
}

/// Weight before jitter. Closeness and shield are normalized to 0..1.
pub fn candidate_weight(
    closeness: f64,
    shield: f64,
    boundary: BoundaryType,
    cfg: &VolcanoesConfig,
) -> f64 {
    let threshold = cfg.boundary_threshold.clamp(0.0, 1.0);
    let mut weight = if closeness >= threshold {
        let band = (closeness - threshold) / (1.0 - threshold).max(1e-3);
        let multiplier = match boundary {
            BoundaryType::Convergent => cfg.convergent_multiplier.max(0.0),
            BoundaryType::Transform => cfg.transform_multiplier.max(0.0),
            BoundaryType::Divergent => cfg.divergent_multiplier.max(0.0),
            BoundaryType::None => 1.0,
        };
        band * cfg.boundary_weight.max(0.0) * multiplier
    } else {
        cfg.hotspot_weight.max(0.0) * (1.0 - closeness)
    };
    if weight <= 0.0 {
        return 0.0;
    }
    let shield_weight = cfg.shield_penalty.clamp(0.0, 1.0);
    if shield_weight > 0.0 {
        weight *= (1.0 - shield * shield_weight).max(0.0);
    }
    weight
}

/// Greedy pick by descending weight, keeping every pair at least
/// `min_spacing` apart in Chebyshev distance measured across the horizontal
/// wrap. Equal weights keep scan order.
pub fn place_spaced(
    mut candidates: Vec<VolcanoCandidate>,
    target: usize,
    min_spacing: i32,
    wrap_width: usize,
) -> Vec<(usize, usize)> {
    candidates.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    let spacing = min_spacing.max(1) as usize;

    let mut placed: Vec<(usize, usize)> = Vec::with_capacity(target);
    for c in candidates {
        if placed.len() >= target {
            break;
        }
        let crowded = placed
            .iter()
            .any(|&(px, py)| wrapped_dx(c.x, px, wrap_width).max(c.y.abs_diff(py)) < spacing);
        if !crowded {
            placed.push((c.x, c.y));
        }
    }
    placed
}

pub fn add_volcanoes(ctx: &mut MapContext<'_>) -> Result<usize> {
    let cfg = ctx.config.volcanoes.clone();
    if !cfg.enabled {
        return Ok(0);
    }
    let Some(fields) = ctx.plate_fields() else {
        warn!("Volcanoes: plate tensors unavailable, skipping");
        return Ok(0);
    };
    let closeness = fields.boundary_closeness.clone();
    let boundary = fields.boundary_type.clone();
    let shield = fields.shield_stability.clone();

    let (width, height) = (ctx.width, ctx.height);
    let volcano = ctx.catalog.feature.volcano;
    let land_tiles = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| !ctx.is_water(x, y))
        .count();
    let target = volcano_target(land_tiles, &cfg);
    if target == 0 {
        return Ok(0);
    }

    let jitter = cfg.random_jitter.max(0.0);
    let mut candidates = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if ctx.is_water(x, y) || ctx.adapter.get_feature_type(x, y) == Some(volcano) {
                continue;
            }
            let mut weight = candidate_weight(
                *closeness.get(x, y) as f64 / 255.0,
                *shield.get(x, y) as f64 / 255.0,
                *boundary.get(x, y),
                &cfg,
            );
            if weight <= 0.0 {
                continue;
            }
            if jitter > 0.0 {
                weight += ctx.random("VolcanoJitter", 1000) as f64 / 1000.0 * jitter;
            }
            candidates.push(VolcanoCandidate { x, y, weight });
        }
    }

    let placed = place_spaced(candidates, target, cfg.min_spacing, width);
    let mountain = ctx.catalog.terrain.mountain;
    for &(x, y) in &placed {
        ctx.write_heightfield(
            x,
            y,
            HeightfieldWrite {
                terrain: Some(mountain),
                is_land: Some(true),
                ..Default::default()
            },
        );
        ctx.adapter.set_feature_type(x, y, volcano);
    }

    debug!("Volcanoes: placed {} of target {}", placed.len(), target);
    Ok(placed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockAdapter;
    use crate::config::MapGenConfig;

    #[test]
    fn test_target_clamps() {
        let cfg = VolcanoesConfig::default();
        assert_eq!(volcano_target(0, &cfg), 5);
        assert_eq!(volcano_target(1700, &cfg), 10);
        assert_eq!(volcano_target(100_000, &cfg), 40);
        let uncapped = VolcanoesConfig {
            max_volcanoes: 0,
            ..VolcanoesConfig::default()
        };
        assert_eq!(volcano_target(17_000, &uncapped), 100);
    }

    #[test]
    fn test_weight_prefers_convergent_boundaries() {
        let cfg = VolcanoesConfig::default();
        let conv = candidate_weight(1.0, 0.0, BoundaryType::Convergent, &cfg);
        let div = candidate_weight(1.0, 0.0, BoundaryType::Divergent, &cfg);
        let interior = candidate_weight(0.0, 1.0, BoundaryType::None, &cfg);
        assert!((conv - 1.2 * 2.4).abs() < 1e-9);
        assert!(conv > div);
        // Hotspot weight damped by a fully stable shield.
        assert!((interior - 0.12 * 0.4).abs() < 1e-9);
        assert_eq!(candidate_weight(0.35, 0.0, BoundaryType::Convergent, &cfg), 0.0);
    }

    #[test]
    fn test_placements_respect_spacing() {
        let mut candidates = Vec::new();
        let mut seed = 7u64;
        for y in 0..30 {
            for x in 0..30 {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let weight = (seed >> 33) as f64 / (1u64 << 31) as f64;
                candidates.push(VolcanoCandidate { x, y, weight });
            }
        }
        let placed = place_spaced(candidates, 40, 3, 30);
        assert!(!placed.is_empty() && placed.len() <= 40);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let d = wrapped_dx(a.0, b.0, 30).max(a.1.abs_diff(b.1));
                assert!(d >= 3, "{a:?} and {b:?} are {d} apart");
            }
        }
    }

    #[test]
    fn test_highest_weight_placed_first() {
        let candidates = vec![
            VolcanoCandidate { x: 0, y: 0, weight: 0.2 },
            VolcanoCandidate { x: 1, y: 0, weight: 0.9 },
            VolcanoCandidate { x: 9, y: 9, weight: 0.5 },
        ];
        assert_eq!(place_spaced(candidates, 5, 3, 10), vec![(1, 0), (9, 9)]);
    }

    #[test]
    fn test_spacing_wraps_across_seam() {
        let candidates = vec![
            VolcanoCandidate { x: 0, y: 5, weight: 0.9 },
            VolcanoCandidate { x: 9, y: 5, weight: 0.8 },
            VolcanoCandidate { x: 5, y: 5, weight: 0.7 },
        ];
        assert_eq!(place_spaced(candidates, 5, 3, 10), vec![(0, 5), (5, 5)]);
    }

    #[test]
    fn test_without_plates_places_nothing() {
        let mut adapter = MockAdapter::new(10, 10, 1);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert_eq!(add_volcanoes(&mut ctx).unwrap(), 0);
    }
}
