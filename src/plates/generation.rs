use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::DirectionalityConfig;
use crate::tilemap::{hex_project, wrapped_dist_sq, Tilemap};

use super::boundaries::{
    assign_boundary_types, clamp_i8, compute_distance_field, detect_boundary_tiles,
    BoundaryCoverage,
};
use super::types::{Plate, PlateId};
use super::PlateFields;

/// Tunables for one generation attempt. Coarser attempts shrink the boundary
/// influence so a poor sample does not flood the map with boundary tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlateAttempt {
    pub cell_density: f64,
    pub influence: u8,
    pub decay: f64,
    pub plate_count_override: Option<usize>,
}

impl PlateAttempt {
    /// The retry ladder, finest first.
    pub fn ladder(count: usize) -> [PlateAttempt; 4] {
        [
            PlateAttempt {
                cell_density: 0.003,
                influence: 3,
                decay: 0.8,
                plate_count_override: None,
            },
            PlateAttempt {
                cell_density: 0.002,
                influence: 2,
                decay: 0.9,
                plate_count_override: None,
            },
            PlateAttempt {
                cell_density: 0.002,
                influence: 2,
                decay: 0.9,
                plate_count_override: Some(6.max((count as f64 * 0.6).round() as usize)),
            },
            PlateAttempt {
                cell_density: 0.0015,
                influence: 2,
                decay: 1.0,
                plate_count_override: Some(4.max((count as f64 * 0.4).round() as usize)),
            },
        ]
    }
}

/// Inputs shared by every attempt of a run.
#[derive(Clone, Debug)]
pub struct PlateGenParams<'a> {
    pub width: usize,
    pub height: usize,
    pub count: usize,
    pub relaxation_steps: u32,
    pub rotation_multiple: f64,
    pub directionality: Option<&'a DirectionalityConfig>,
}

/// Output of a single attempt.
#[derive(Clone, Debug)]
pub struct PlateGeneration {
    pub plates: Vec<Plate>,
    pub fields: PlateFields,
    pub coverage: BoundaryCoverage,
    pub attempt: PlateAttempt,
    /// Secondary cells captured by each plate.
    pub cell_counts: Vec<usize>,
}

fn random_sites(count: usize, width: usize, height: usize, rng: &mut ChaCha8Rng) -> Vec<(f64, f64)> {
    (0..count)
        .map(|_| (rng.gen_range(0.0..width as f64), rng.gen_range(0.0..height as f64)))
        .collect()
}

fn nearest_site(x: f64, y: f64, centers: &[(f64, f64)], wrap_width: f64) -> usize {
    let (px, py) = hex_project(x, y);
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &(cx, cy)) in centers.iter().enumerate() {
        let d = wrapped_dist_sq(px, py, cx, cy, wrap_width);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Mean of x coordinates on a wrapping axis, taken via the angle average.
fn wrapped_mean_x(sum_sin: f64, sum_cos: f64, width: usize) -> f64 {
    let angle = sum_sin.atan2(sum_cos);
    let t = if angle < 0.0 { angle + std::f64::consts::TAU } else { angle };
    t / std::f64::consts::TAU * width as f64
}

/// Lloyd relaxation: move each site to the wrap-aware centroid of its tiles.
fn relax_sites(sites: &mut [(f64, f64)], width: usize, height: usize, steps: u32) {
    let wrap_width = width as f64 * 3f64.sqrt();
    for _ in 0..steps {
        let centers: Vec<(f64, f64)> = sites.iter().map(|&(x, y)| hex_project(x, y)).collect();
        let mut acc = vec![(0.0f64, 0.0f64, 0.0f64, 0usize); sites.len()];
        for y in 0..height {
            for x in 0..width {
                let p = nearest_site(x as f64, y as f64, &centers, wrap_width);
                let theta = x as f64 / width as f64 * std::f64::consts::TAU;
                acc[p].0 += theta.sin();
                acc[p].1 += theta.cos();
                acc[p].2 += y as f64;
                acc[p].3 += 1;
            }
        }
        for (site, &(s, c, sy, n)) in sites.iter_mut().zip(acc.iter()) {
            if n > 0 {
                *site = (wrapped_mean_x(s, c, width), sy / n as f64);
            }
        }
    }
}

/// Fill in area, centroid and the sorted neighbor list of each plate.
pub fn summarize_plates(plates: &mut [Plate], plate_id: &Tilemap<PlateId>) {
    let n = plates.len();
    let width = plate_id.width;
    let mut area = vec![0usize; n];
    let mut sums = vec![(0.0f64, 0.0f64, 0.0f64); n];
    let mut adjacency = vec![vec![false; n]; n];

    for (x, y, &id) in plate_id.iter() {
        let p = id.index();
        if p >= n {
            continue;
        }
        area[p] += 1;
        let theta = x as f64 / width as f64 * std::f64::consts::TAU;
        sums[p].0 += theta.sin();
        sums[p].1 += theta.cos();
        sums[p].2 += y as f64;
        for (nx, ny) in plate_id.hex_neighbors(x, y) {
            let q = plate_id.get(nx, ny).index();
            if q != p && q < n {
                adjacency[p][q] = true;
            }
        }
    }

    for (i, plate) in plates.iter_mut().enumerate() {
        plate.area = area[i];
        if area[i] > 0 {
            plate.centroid = (
                wrapped_mean_x(sums[i].0, sums[i].1, width),
                sums[i].2 / area[i] as f64,
            );
        }
        plate.neighbors = (0..n)
            .filter(|&j| adjacency[i][j])
            .map(|j| PlateId(j as u8))
            .collect();
    }
}

/// Run one attempt of Voronoi plate generation.
pub fn generate_attempt(
    params: &PlateGenParams<'_>,
    attempt: PlateAttempt,
    rng: &mut ChaCha8Rng,
) -> PlateGeneration {
    let width = params.width;
    let height = params.height;
    let plate_count = attempt
        .plate_count_override
        .unwrap_or(params.count)
        .clamp(2, PlateId::NONE.0 as usize);
    let wrap_width = width as f64 * 3f64.sqrt();

    let mut sites = random_sites(plate_count, width, height, rng);
    relax_sites(&mut sites, width, height, params.relaxation_steps);

    let mut plates: Vec<Plate> = sites
        .iter()
        .enumerate()
        .map(|(i, &(sx, sy))| {
            let mut plate = Plate::random(PlateId(i as u8), sx, sy, rng);
            if let Some(dir) = params.directionality {
                plate.apply_directionality(dir, rng);
            }
            plate
        })
        .collect();
    let centers: Vec<(f64, f64)> = sites.iter().map(|&(x, y)| hex_project(x, y)).collect();

    // Secondary sampling: denser cells, each owned by its nearest plate.
    let cell_count = (plate_count * 2).max((width as f64 * height as f64 * attempt.cell_density) as usize);
    let mut cell_counts = vec![0usize; plate_count];
    for (cx, cy) in random_sites(cell_count, width, height, rng) {
        cell_counts[nearest_site(cx, cy, &centers, wrap_width)] += 1;
    }

    let mut plate_id = Tilemap::new_with(width, height, PlateId(0));
    let mut plate_movement_u = Tilemap::new_with(width, height, 0i8);
    let mut plate_movement_v = Tilemap::new_with(width, height, 0i8);
    let mut plate_rotation = Tilemap::new_with(width, height, 0i8);

    for y in 0..height {
        for x in 0..width {
            let p = nearest_site(x as f64, y as f64, &centers, wrap_width);
            plate_id.set(x, y, PlateId(p as u8));
            let plate = &plates[p];
            let m = plate.movement_at(x as f64, y as f64, params.rotation_multiple);
            plate_movement_u.set(x, y, clamp_i8(m.x * 100.0));
            plate_movement_v.set(x, y, clamp_i8(m.y * 100.0));
            plate_rotation.set(x, y, clamp_i8(plate.rotation * 100.0));
        }
    }

    summarize_plates(&mut plates, &plate_id);

    let (is_boundary, neighbor_plate) = detect_boundary_tiles(&plate_id);
    let distance = compute_distance_field(&is_boundary, attempt.influence.saturating_add(1));
    let boundary = assign_boundary_types(
        &plate_id,
        &plates,
        &is_boundary,
        &neighbor_plate,
        &distance,
        attempt.influence,
        attempt.decay,
        params.rotation_multiple,
    );
    let coverage = BoundaryCoverage::summarize(&is_boundary, &boundary.boundary_closeness);

    PlateGeneration {
        plates,
        fields: PlateFields {
            plate_id,
            boundary_closeness: boundary.boundary_closeness,
            boundary_type: boundary.boundary_type,
            tectonic_stress: boundary.tectonic_stress,
            uplift_potential: boundary.uplift_potential,
            rift_potential: boundary.rift_potential,
            shield_stability: boundary.shield_stability,
            plate_movement_u,
            plate_movement_v,
            plate_rotation,
        },
        coverage,
        attempt,
        cell_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params(width: usize, height: usize, count: usize) -> PlateGenParams<'static> {
        PlateGenParams {
            width,
            height,
            count,
            relaxation_steps: 2,
            rotation_multiple: 1.0,
            directionality: None,
        }
    }

    #[test]
    fn test_ladder_overrides() {
        let ladder = PlateAttempt::ladder(20);
        assert_eq!(ladder[0].plate_count_override, None);
        assert_eq!(ladder[2].plate_count_override, Some(12));
        assert_eq!(ladder[3].plate_count_override, Some(8));
        let small = PlateAttempt::ladder(4);
        assert_eq!(small[2].plate_count_override, Some(6));
        assert_eq!(small[3].plate_count_override, Some(4));
    }

    #[test]
    fn test_every_tile_assigned_to_a_plate() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let gen = generate_attempt(&params(30, 20, 6), PlateAttempt::ladder(6)[0], &mut rng);
        assert_eq!(gen.plates.len(), 6);
        assert!(gen.fields.plate_id.as_slice().iter().all(|id| id.index() < 6));
        let total: usize = gen.plates.iter().map(|p| p.area).sum();
        assert_eq!(total, 600);
        assert_eq!(gen.cell_counts.iter().sum::<usize>(), 12);
    }

    #[test]
    fn test_neighbor_lists_are_sorted_and_symmetric() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let gen = generate_attempt(&params(24, 16, 5), PlateAttempt::ladder(5)[1], &mut rng);
        for plate in &gen.plates {
            assert!(plate.neighbors.windows(2).all(|w| w[0] < w[1]));
            for n in &plate.neighbors {
                assert!(gen.plates[n.index()].neighbors.contains(&plate.id));
            }
        }
    }

    #[test]
    fn test_minimum_two_plates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let gen = generate_attempt(&params(10, 10, 1), PlateAttempt::ladder(1)[0], &mut rng);
        assert_eq!(gen.plates.len(), 2);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let p = params(20, 12, 4);
        let a = generate_attempt(&p, PlateAttempt::ladder(4)[0], &mut ChaCha8Rng::seed_from_u64(42));
        let b = generate_attempt(&p, PlateAttempt::ladder(4)[0], &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a.fields.plate_id, b.fields.plate_id);
        assert_eq!(a.fields.boundary_type, b.fields.boundary_type);
    }
}
