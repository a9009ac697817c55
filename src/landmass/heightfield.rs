//! Crust heights and the sea level solve.

use super::crust::CrustType;
use crate::plates::PlateId;
use crate::tilemap::Tilemap;

#[derive(Clone, Copy, Debug)]
pub struct HeightParams {
    pub continental_height: f64,
    pub oceanic_height: f64,
    /// 0..1 pull toward the mean of the hex neighbors.
    pub edge_blend: f64,
    pub noise_amplitude: f64,
}

fn crust_height(id: PlateId, types: &[CrustType], params: &HeightParams) -> f64 {
    match types.get(id.index()) {
        Some(CrustType::Continental) if !id.is_none() => params.continental_height,
        _ => params.oceanic_height,
    }
}

/// Per-tile height: the plate's crust constant, blended toward its
/// neighbors, plus noise in `-amplitude..amplitude`.
///
/// `noise` is only called when the amplitude is positive, once per tile in
/// row-major order.
pub fn generate_base_heightfield(
    plate_id: &Tilemap<PlateId>,
    types: &[CrustType],
    params: HeightParams,
    mut noise: impl FnMut() -> f64,
) -> Tilemap<f64> {
    let (width, height) = (plate_id.width, plate_id.height);
    let mut base = Tilemap::new(width, height);
    for (x, y, id) in plate_id.iter() {
        base.set(x, y, crust_height(*id, types, &params));
    }

    let blend = params.edge_blend.clamp(0.0, 1.0);
    let amplitude = params.noise_amplitude.max(0.0);
    let mut heights = Tilemap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let here = *base.get(x, y);
            let neighbors = base.hex_neighbors(x, y);
            let mean = if neighbors.is_empty() {
                here
            } else {
                neighbors.iter().map(|&(nx, ny)| *base.get(nx, ny)).sum::<f64>()
                    / neighbors.len() as f64
            };
            let mut h = here + (mean - here) * blend;
            if amplitude > 0.0 {
                h += (noise() * 2.0 - 1.0) * amplitude;
            }
            heights.set(x, y, h);
        }
    }
    heights
}

/// Height such that `target_land` tiles lie strictly above it, ties aside.
pub fn compute_sea_level(heights: &[f64], target_land: usize) -> f64 {
    if heights.is_empty() {
        return 0.0;
    }
    let mut sorted = heights.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let rank = target_land.min(sorted.len() - 1);
    sorted[rank]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(noise_amplitude: f64) -> HeightParams {
        HeightParams {
            continental_height: 0.32,
            oceanic_height: -0.55,
            edge_blend: 0.45,
            noise_amplitude,
        }
    }

    #[test]
    fn test_sea_level_leaves_exact_land_count() {
        let heights: Vec<f64> = (0..100).map(|i| ((i * 37) % 100) as f64 / 10.0).collect();
        for target in [1, 25, 50, 99] {
            let sea = compute_sea_level(&heights, target);
            let above = heights.iter().filter(|&&h| h > sea).count();
            assert_eq!(above, target);
        }
    }

    #[test]
    fn test_interior_tiles_keep_crust_height() {
        let mut ids = Tilemap::new_with(12, 6, PlateId(0));
        for (x, _, id) in ids.iter_mut() {
            if x >= 6 {
                *id = PlateId(1);
            }
        }
        let types = [CrustType::Continental, CrustType::Oceanic];
        let heights = generate_base_heightfield(&ids, &types, params(0.0), || 0.5);
        assert!((heights.get(2, 3) - 0.32).abs() < 1e-9);
        assert!((heights.get(9, 3) + 0.55).abs() < 1e-9);
        // Column 5 borders the oceanic plate and gets pulled down.
        assert!(*heights.get(5, 3) < 0.32);
    }

    #[test]
    fn test_noise_only_drawn_when_amplitude_positive() {
        let ids = Tilemap::new_with(4, 4, PlateId(0));
        let types = [CrustType::Oceanic];
        let mut draws = 0;
        generate_base_heightfield(&ids, &types, params(0.0), || {
            draws += 1;
            0.5
        });
        assert_eq!(draws, 0);
        generate_base_heightfield(&ids, &types, params(0.1), || {
            draws += 1;
            0.5
        });
        assert_eq!(draws, 16);
    }
}
