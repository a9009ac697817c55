//! Plate topology and crust typing.

use crate::plates::PlateId;
use crate::tilemap::Tilemap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CrustType {
    #[default]
    Oceanic,
    Continental,
}

/// Plate adjacency and tile counts, rebuilt from the plate raster.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateGraph {
    pub areas: Vec<usize>,
    /// Sorted neighbor indices per plate.
    pub neighbors: Vec<Vec<usize>>,
}

impl PlateGraph {
    /// Returns `None` when the raster holds no valid plate id.
    pub fn from_raster(plate_id: &Tilemap<PlateId>) -> Option<Self> {
        let count = plate_id
            .as_slice()
            .iter()
            .filter(|id| !id.is_none())
            .map(|id| id.index() + 1)
            .max()?;

        let mut areas = vec![0usize; count];
        let mut adjacency = vec![vec![false; count]; count];
        for (x, y, id) in plate_id.iter() {
            if id.is_none() {
                continue;
            }
            let p = id.index();
            areas[p] += 1;
            for (nx, ny) in plate_id.hex_neighbors(x, y) {
                let other = plate_id.get(nx, ny);
                if !other.is_none() && other.index() != p {
                    adjacency[p][other.index()] = true;
                }
            }
        }

        let neighbors = adjacency
            .iter()
            .map(|row| (0..count).filter(|&j| row[j]).collect())
            .collect();
        Some(Self { areas, neighbors })
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn total_area(&self) -> usize {
        self.areas.iter().sum()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CrustParams {
    /// Target share of tiles on continental plates, 0..1.
    pub continental_fraction: f64,
    /// Chance of growing the current cluster rather than seeding a new one.
    pub clustering_bias: f64,
    /// Chance an oceanic plate becomes a microcontinent.
    pub microcontinent_chance: f64,
}

fn pick(len: usize, draw: f64) -> usize {
    ((draw * len as f64) as usize).min(len.saturating_sub(1))
}

/// Grow continental crust from a random seed plate until the target area is
/// covered, then sprinkle microcontinents.
///
/// `rand` yields uniform values in `0..1`. The same draw sequence always
/// produces the same partition.
pub fn assign_crust_types(
    graph: &PlateGraph,
    mut rand: impl FnMut() -> f64,
    params: CrustParams,
) -> Vec<CrustType> {
    let n = graph.len();
    let mut types = vec![CrustType::Oceanic; n];
    let live: Vec<usize> = (0..n).filter(|&i| graph.areas[i] > 0).collect();
    if live.is_empty() {
        return types;
    }

    let target = params.continental_fraction.clamp(0.0, 1.0) * graph.total_area() as f64;
    let mut covered = 0usize;

    let seed = live[pick(live.len(), rand())];
    types[seed] = CrustType::Continental;
    covered += graph.areas[seed];

    while (covered as f64) < target {
        let frontier: Vec<usize> = live
            .iter()
            .copied()
            .filter(|&p| {
                types[p] == CrustType::Oceanic
                    && graph.neighbors[p]
                        .iter()
                        .any(|&q| types[q] == CrustType::Continental)
            })
            .collect();

        let next = if !frontier.is_empty() && rand() < params.clustering_bias {
            frontier[pick(frontier.len(), rand())]
        } else {
            let open: Vec<usize> = live
                .iter()
                .copied()
                .filter(|&p| types[p] == CrustType::Oceanic)
                .collect();
            if open.is_empty() {
                break;
            }
            open[pick(open.len(), rand())]
        };

        types[next] = CrustType::Continental;
        covered += graph.areas[next];
    }

    for &p in &live {
        if types[p] == CrustType::Oceanic && rand() < params.microcontinent_chance {
            types[p] = CrustType::Continental;
        }
    }

    types
}

/// Area-first typing: the largest plates become continental until the land
/// budget is met. Ties go to the lower plate id.
pub fn assign_crust_by_area(graph: &PlateGraph, land_budget: usize) -> Vec<CrustType> {
    let mut order: Vec<usize> = (0..graph.len()).filter(|&i| graph.areas[i] > 0).collect();
    order.sort_by(|&a, &b| graph.areas[b].cmp(&graph.areas[a]).then(a.cmp(&b)));

    let mut types = vec![CrustType::Oceanic; graph.len()];
    let mut covered = 0usize;
    for p in order {
        if covered >= land_budget {
            break;
        }
        types[p] = CrustType::Continental;
        covered += graph.areas[p];
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Four vertical stripes of plates on a 16x4 map.
    fn striped() -> Tilemap<PlateId> {
        let mut map = Tilemap::new_with(16, 4, PlateId(0));
        for (x, _, id) in map.iter_mut() {
            *id = PlateId((x / 4) as u8);
        }
        map
    }

    #[test]
    fn test_graph_from_raster() {
        let graph = PlateGraph::from_raster(&striped()).unwrap();
        assert_eq!(graph.areas, vec![16, 16, 16, 16]);
        // Horizontal wrap makes the stripes a ring.
        assert_eq!(graph.neighbors[0], vec![1, 3]);
        assert_eq!(graph.neighbors[2], vec![1, 3]);
    }

    #[test]
    fn test_empty_raster_has_no_graph() {
        let map = Tilemap::new_with(4, 4, PlateId::NONE);
        assert!(PlateGraph::from_raster(&map).is_none());
    }

    #[test]
    fn test_crust_typing_is_idempotent() {
        let graph = PlateGraph::from_raster(&striped()).unwrap();
        let params = CrustParams {
            continental_fraction: 0.5,
            clustering_bias: 0.7,
            microcontinent_chance: 0.04,
        };
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assign_crust_types(&graph, || rng.gen::<f64>(), params)
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_crust_typing_meets_target() {
        let graph = PlateGraph::from_raster(&striped()).unwrap();
        let params = CrustParams {
            continental_fraction: 0.5,
            clustering_bias: 1.0,
            microcontinent_chance: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let types = assign_crust_types(&graph, || rng.gen::<f64>(), params);
        let continental: usize = types
            .iter()
            .zip(&graph.areas)
            .filter(|(t, _)| **t == CrustType::Continental)
            .map(|(_, a)| a)
            .sum();
        assert_eq!(continental, 32);
    }

    #[test]
    fn test_area_mode_prefers_large_plates() {
        let graph = PlateGraph {
            areas: vec![5, 40, 20, 35],
            neighbors: vec![vec![], vec![], vec![], vec![]],
        };
        let types = assign_crust_by_area(&graph, 50);
        assert_eq!(
            types,
            vec![
                CrustType::Oceanic,
                CrustType::Continental,
                CrustType::Oceanic,
                CrustType::Continental
            ]
        );
    }
}
