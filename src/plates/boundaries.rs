//! Boundary detection, distance propagation and derived boundary fields.

use std::collections::VecDeque;

use crate::tilemap::Tilemap;

use super::types::{BoundaryType, Plate, PlateId, Vec2};

/// Subduction above this is convergent.
const CONVERGENT_THRESHOLD: f64 = 0.25;
/// Subduction below this is divergent.
const DIVERGENT_THRESHOLD: f64 = -0.15;
/// Sliding above this (when neither of the above) is transform.
const TRANSFORM_THRESHOLD: f64 = 0.4;

/// Distance value for tiles the BFS never reached.
pub const UNREACHED: u8 = 255;

pub fn to_byte(f: f64) -> u8 {
    (f * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn clamp_i8(v: f64) -> i8 {
    v.round().clamp(-127.0, 127.0) as i8
}

/// Marks tiles with any hex neighbor on another plate. The neighbor map holds
/// the first such neighbor's plate, or [`PlateId::NONE`].
pub fn detect_boundary_tiles(plate_id: &Tilemap<PlateId>) -> (Tilemap<bool>, Tilemap<PlateId>) {
    let mut is_boundary = Tilemap::new_with(plate_id.width, plate_id.height, false);
    let mut neighbor_plate = Tilemap::new_with(plate_id.width, plate_id.height, PlateId::NONE);

    for (x, y, &mine) in plate_id.iter() {
        for (nx, ny) in plate_id.hex_neighbors(x, y) {
            let other = *plate_id.get(nx, ny);
            if other != mine {
                is_boundary.set(x, y, true);
                neighbor_plate.set(x, y, other);
                break;
            }
        }
    }

    (is_boundary, neighbor_plate)
}

/// Multi-source BFS over hex neighbors from all boundary tiles. Tiles at
/// `max_distance` are not expanded further; unreached tiles stay at [`UNREACHED`].
pub fn compute_distance_field(is_boundary: &Tilemap<bool>, max_distance: u8) -> Tilemap<u8> {
    let mut distance = Tilemap::new_with(is_boundary.width, is_boundary.height, UNREACHED);
    let mut queue = VecDeque::new();

    for (x, y, &b) in is_boundary.iter() {
        if b {
            distance.set(x, y, 0);
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let d = *distance.get(x, y);
        if d >= max_distance {
            continue;
        }
        for (nx, ny) in distance.hex_neighbors(x, y) {
            if *distance.get(nx, ny) > d + 1 {
                distance.set(nx, ny, d + 1);
                queue.push_back((nx, ny));
            }
        }
    }

    distance
}

/// Relative motion across a boundary between `a` (this side) and `b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryMotion {
    /// Closing speed along the normal from `a`'s site to `b`'s site.
    pub subduction: f64,
    /// Shear speed along the boundary.
    pub sliding: f64,
}

impl BoundaryMotion {
    pub fn between(a: &Plate, b: &Plate, x: f64, y: f64, rotation_multiple: f64) -> Self {
        let m1 = a.movement_at(x, y, rotation_multiple);
        let m2 = b.movement_at(x, y, rotation_multiple);
        let normal = Vec2::new(b.seed_x - a.seed_x, b.seed_y - a.seed_y).normalize();

        Self {
            subduction: normal.dot(&m1) - normal.dot(&m2),
            sliding: (normal.dot_perp(&m1) - normal.dot_perp(&m2)).abs(),
        }
    }

    pub fn classify(&self) -> BoundaryType {
        if self.subduction > CONVERGENT_THRESHOLD {
            BoundaryType::Convergent
        } else if self.subduction < DIVERGENT_THRESHOLD {
            BoundaryType::Divergent
        } else if self.sliding > TRANSFORM_THRESHOLD {
            BoundaryType::Transform
        } else {
            BoundaryType::None
        }
    }
}

/// Boundary-derived per-tile fields.
#[derive(Clone, Debug)]
pub struct BoundaryFields {
    pub boundary_type: Tilemap<BoundaryType>,
    pub boundary_closeness: Tilemap<u8>,
    pub uplift_potential: Tilemap<u8>,
    pub rift_potential: Tilemap<u8>,
    pub shield_stability: Tilemap<u8>,
    pub tectonic_stress: Tilemap<u8>,
    /// Flat index of the boundary tile each tile inherited its type from.
    pub inherited_from: Tilemap<Option<usize>>,
}

/// Classify boundary tiles, then let every tile within `max_influence` take the
/// type of the boundary tile the BFS reached it from, and derive
/// closeness/uplift/rift/stress/shield from distance and type.
pub fn assign_boundary_types(
    plate_id: &Tilemap<PlateId>,
    plates: &[Plate],
    is_boundary: &Tilemap<bool>,
    neighbor_plate: &Tilemap<PlateId>,
    distance: &Tilemap<u8>,
    max_influence: u8,
    decay: f64,
    rotation_multiple: f64,
) -> BoundaryFields {
    let width = plate_id.width;
    let height = plate_id.height;
    let mut boundary_type = Tilemap::new_with(width, height, BoundaryType::None);

    for (x, y, &b) in is_boundary.iter() {
        if !b {
            continue;
        }
        let other = *neighbor_plate.get(x, y);
        let (Some(a), Some(o)) = (
            plates.get(plate_id.get(x, y).index()),
            plates.get(other.index()),
        ) else {
            continue;
        };
        let motion = BoundaryMotion::between(a, o, x as f64, y as f64, rotation_multiple);
        boundary_type.set(x, y, motion.classify());
    }

    let mut inherited_from: Tilemap<Option<usize>> = Tilemap::new_with(width, height, None);
    let mut queue = VecDeque::new();
    for (x, y, &b) in is_boundary.iter() {
        if b {
            let i = is_boundary.index(x, y);
            inherited_from.set(x, y, Some(i));
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let d = *distance.get(x, y);
        if d >= max_influence {
            continue;
        }
        let source = *inherited_from.get(x, y);
        for (nx, ny) in distance.hex_neighbors(x, y) {
            if inherited_from.get(nx, ny).is_none() && *distance.get(nx, ny) == d + 1 {
                inherited_from.set(nx, ny, source);
                queue.push_back((nx, ny));
            }
        }
    }

    let mut boundary_closeness = Tilemap::new_with(width, height, 0u8);
    let mut uplift_potential = Tilemap::new_with(width, height, 0u8);
    let mut rift_potential = Tilemap::new_with(width, height, 0u8);
    let mut shield_stability = Tilemap::new_with(width, height, 255u8);
    let mut tectonic_stress = Tilemap::new_with(width, height, 0u8);

    for y in 0..height {
        for x in 0..width {
            let dist = *distance.get(x, y);
            if dist >= max_influence {
                boundary_type.set(x, y, BoundaryType::None);
                continue;
            }

            let c = to_byte((-(dist as f64) * decay).exp());
            boundary_closeness.set(x, y, c);

            if !*is_boundary.get(x, y) {
                if let Some(src) = *inherited_from.get(x, y) {
                    let (sx, sy) = boundary_type.coords(src);
                    let inherited = *boundary_type.get(sx, sy);
                    boundary_type.set(x, y, inherited);
                }
            }

            tectonic_stress.set(x, y, c);
            shield_stability.set(x, y, 255 - c);
            let (uplift, rift) = match *boundary_type.get(x, y) {
                BoundaryType::Convergent => (c, c >> 2),
                BoundaryType::Divergent => (c >> 2, c),
                _ => (c >> 2, c >> 2),
            };
            uplift_potential.set(x, y, uplift);
            rift_potential.set(x, y, rift);
        }
    }

    BoundaryFields {
        boundary_type,
        boundary_closeness,
        uplift_potential,
        rift_potential,
        shield_stability,
        tectonic_stress,
        inherited_from,
    }
}

/// How much of the map the boundary field touches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundaryCoverage {
    pub boundary_tile_share: f64,
    pub boundary_influence_share: f64,
    pub avg_closeness: f64,
    pub avg_influence_closeness: f64,
    pub max_closeness: u8,
    pub boundary_tiles: usize,
    pub influenced_tiles: usize,
    pub total_tiles: usize,
}

impl BoundaryCoverage {
    pub fn summarize(is_boundary: &Tilemap<bool>, closeness: &Tilemap<u8>) -> Self {
        let total = is_boundary.len().max(1);
        let boundary_tiles = is_boundary.as_slice().iter().filter(|&&b| b).count();
        let mut influenced = 0usize;
        let mut sum = 0u64;
        let mut max_closeness = 0u8;
        for &c in closeness.as_slice() {
            if c > 0 {
                influenced += 1;
            }
            sum += c as u64;
            max_closeness = max_closeness.max(c);
        }

        Self {
            boundary_tile_share: boundary_tiles as f64 / total as f64,
            boundary_influence_share: influenced as f64 / total as f64,
            avg_closeness: sum as f64 / total as f64,
            avg_influence_closeness: if influenced > 0 {
                sum as f64 / influenced as f64
            } else {
                0.0
            },
            max_closeness,
            boundary_tiles,
            influenced_tiles: influenced,
            total_tiles: total,
        }
    }

    /// Whether the boundary field stays under the saturation ceiling.
    pub fn acceptable(&self, share_limit: f64, closeness_limit: f64) -> bool {
        self.boundary_influence_share <= share_limit
            && self.boundary_tile_share <= share_limit
            && self.avg_influence_closeness <= closeness_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two vertical halves: columns < split are plate 0.
    fn split_map(width: usize, height: usize, split: usize) -> Tilemap<PlateId> {
        let mut map = Tilemap::new_with(width, height, PlateId(0));
        for y in 0..height {
            for x in split..width {
                map.set(x, y, PlateId(1));
            }
        }
        map
    }

    fn plate(id: u8, x: f64, y: f64, mx: f64, my: f64) -> Plate {
        Plate {
            id: PlateId(id),
            seed_x: x,
            seed_y: y,
            movement: Vec2::new(mx, my),
            rotation: 0.0,
            area: 0,
            centroid: (x, y),
            neighbors: Vec::new(),
        }
    }

    #[test]
    fn test_detects_both_sides_of_split() {
        let map = split_map(12, 6, 6);
        let (is_boundary, neighbor) = detect_boundary_tiles(&map);
        assert!(*is_boundary.get(5, 2));
        assert!(*is_boundary.get(6, 2));
        assert!(!*is_boundary.get(3, 2));
        assert_eq!(*neighbor.get(5, 2), PlateId(1));
        assert_eq!(*neighbor.get(3, 2), PlateId::NONE);
    }

    #[test]
    fn test_distance_field_caps_expansion() {
        let map = split_map(40, 4, 20);
        let (is_boundary, _) = detect_boundary_tiles(&map);
        let dist = compute_distance_field(&is_boundary, 3);
        assert_eq!(*dist.get(19, 1), 0);
        assert_eq!(*dist.get(17, 1), 2);
        assert_eq!(*dist.get(10, 1), UNREACHED);
    }

    #[test]
    fn test_head_on_collision_is_convergent() {
        let a = plate(0, 0.0, 0.0, 1.0, 0.0);
        let b = plate(1, 10.0, 0.0, -1.0, 0.0);
        let motion = BoundaryMotion::between(&a, &b, 5.0, 0.0, 1.0);
        assert!((motion.subduction - 2.0).abs() < 1e-9);
        assert_eq!(motion.classify(), BoundaryType::Convergent);

        let reversed = BoundaryMotion::between(&b, &a, 5.0, 0.0, 1.0);
        assert_eq!(reversed.classify(), BoundaryType::Convergent);

        let spread = BoundaryMotion::between(
            &plate(0, 0.0, 0.0, -1.0, 0.0),
            &plate(1, 10.0, 0.0, 1.0, 0.0),
            5.0,
            0.0,
            1.0,
        );
        assert_eq!(spread.classify(), BoundaryType::Divergent);
    }

    #[test]
    fn test_shear_is_transform() {
        let a = plate(0, 0.0, 0.0, 0.0, 1.0);
        let b = plate(1, 10.0, 0.0, 0.0, -1.0);
        let motion = BoundaryMotion::between(&a, &b, 5.0, 0.0, 1.0);
        assert!(motion.subduction.abs() < 1e-9);
        assert_eq!(motion.classify(), BoundaryType::Transform);
    }

    #[test]
    fn test_closeness_decays_and_types_inherit() {
        let map = split_map(40, 6, 20);
        let plates = vec![plate(0, 10.0, 3.0, 1.0, 0.0), plate(1, 30.0, 3.0, -1.0, 0.0)];
        let (is_boundary, neighbor) = detect_boundary_tiles(&map);
        let influence = 3u8;
        let dist = compute_distance_field(&is_boundary, influence + 1);
        let fields =
            assign_boundary_types(&map, &plates, &is_boundary, &neighbor, &dist, influence, 0.8, 1.0);

        for (x, y, &d) in dist.iter() {
            let c = *fields.boundary_closeness.get(x, y);
            if d >= influence {
                assert_eq!(c, 0);
                assert_eq!(*fields.boundary_type.get(x, y), BoundaryType::None);
                assert_eq!(*fields.shield_stability.get(x, y), 255);
            } else {
                assert_eq!(c, to_byte((-(d as f64) * 0.8).exp()));
                assert_eq!(*fields.shield_stability.get(x, y), 255 - c);
            }
        }

        // Inherited tiles carry their source's type.
        for (x, y, src) in fields.inherited_from.iter() {
            if let Some(src) = *src {
                if *dist.get(x, y) < influence {
                    let (sx, sy) = map.coords(src);
                    assert!(*is_boundary.get(sx, sy));
                    assert_eq!(
                        *fields.boundary_type.get(x, y),
                        *fields.boundary_type.get(sx, sy)
                    );
                }
            }
        }
        assert_eq!(*fields.boundary_type.get(18, 2), BoundaryType::Convergent);
        assert_eq!(*fields.uplift_potential.get(19, 2), 255);
    }

    #[test]
    fn test_coverage_summary() {
        let map = split_map(20, 5, 10);
        let (is_boundary, _) = detect_boundary_tiles(&map);
        let closeness = Tilemap::from_vec(
            20,
            5,
            is_boundary.as_slice().iter().map(|&b| if b { 255 } else { 0 }).collect(),
        );
        let cov = BoundaryCoverage::summarize(&is_boundary, &closeness);
        assert_eq!(cov.total_tiles, 100);
        assert_eq!(cov.boundary_tiles, cov.influenced_tiles);
        assert_eq!(cov.avg_influence_closeness, 255.0);
        assert!(!cov.acceptable(0.45, 80.0));
    }
}
