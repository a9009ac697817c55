//! Plate-aware ocean separation between landmass windows.
//!
//! Works on per-row spans of each window. Legacy crust mode carves a margin
//! that widens with boundary closeness at the gap midpoint; area mode cuts a
//! fixed-width channel centered between neighboring windows. Either way a
//! window keeps at least one column in every row.

use super::LandmassWindow;
use crate::config::{CrustMode, EdgePolicy, OceanSeparationPolicy};
use crate::tilemap::Tilemap;

/// A land mask change: `(x, y, is_land)`.
pub type MaskEdit = (usize, usize, bool);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeparationOutcome {
    pub windows: Vec<LandmassWindow>,
    /// Mask changes in the order they were made.
    pub edits: Vec<MaskEdit>,
}

struct RowState {
    west: Vec<i64>,
    east: Vec<i64>,
    south: usize,
    north: usize,
    continent: usize,
}

impl RowState {
    fn new(win: &LandmassWindow, width: usize, height: usize) -> Self {
        let w = win.west.min(width - 1) as i64;
        let e = win.east.min(width - 1) as i64;
        let s = win.south.min(height - 1);
        let n = win.north.min(height - 1);
        Self {
            west: vec![w.min(e); height],
            east: vec![w.max(e); height],
            south: s.min(n),
            north: s.max(n),
            continent: win.continent,
        }
    }

    fn aggregate(&self, width: usize) -> LandmassWindow {
        let mut min_west = i64::MAX;
        let mut max_east = i64::MIN;
        for y in self.south..=self.north {
            if self.west[y] > self.east[y] {
                continue;
            }
            min_west = min_west.min(self.west[y]);
            max_east = max_east.max(self.east[y]);
        }
        let (west, east) = if max_east < min_west {
            (0, 0)
        } else {
            (
                min_west.clamp(0, width as i64 - 1) as usize,
                max_east.clamp(0, width as i64 - 1) as usize,
            )
        };
        LandmassWindow {
            west,
            east,
            south: self.south,
            north: self.north,
            continent: self.continent,
        }
    }
}

struct Carver<'a> {
    mask: &'a mut Tilemap<u8>,
    edits: Vec<MaskEdit>,
}

impl Carver<'_> {
    fn set(&mut self, x: i64, y: usize, land: bool) {
        if x < 0 || x as usize >= self.mask.width {
            return;
        }
        self.mask.set(x as usize, y, land as u8);
        self.edits.push((x as usize, y, land));
    }

    fn is_land(&self, x: i64, y: usize) -> bool {
        *self.mask.get(x as usize, y) != 0
    }

    /// Drown up to `tiles` land tiles walking west from the row's east edge,
    /// never touching the westmost column.
    fn carve_from_east(&mut self, state: &mut RowState, y: usize, tiles: i64) -> i64 {
        let limit = state.west[y];
        let mut x = state.east[y];
        let mut removed = 0;
        while removed < tiles && x > limit {
            if self.is_land(x, y) {
                self.set(x, y, false);
                removed += 1;
            }
            x -= 1;
        }
        state.east[y] = x.max(limit);
        removed
    }

    fn carve_from_west(&mut self, state: &mut RowState, y: usize, tiles: i64) -> i64 {
        let limit = state.east[y];
        let mut x = state.west[y];
        let mut removed = 0;
        while removed < tiles && x < limit {
            if self.is_land(x, y) {
                self.set(x, y, false);
                removed += 1;
            }
            x += 1;
        }
        state.west[y] = x.min(limit);
        removed
    }

    fn fill_from_west(&mut self, state: &mut RowState, y: usize, tiles: i64) {
        let mut x = state.west[y] - 1;
        let mut added = 0;
        while added < tiles && x >= 0 {
            self.set(x, y, true);
            added += 1;
            x -= 1;
        }
        state.west[y] -= added;
    }

    fn fill_from_east(&mut self, state: &mut RowState, y: usize, tiles: i64) {
        let width = self.mask.width as i64;
        let mut x = state.east[y] + 1;
        let mut added = 0;
        while added < tiles && x < width {
            self.set(x, y, true);
            added += 1;
            x += 1;
        }
        state.east[y] += added;
    }
}

fn scaled(base: i64, closeness: u8, multiplier: f64) -> i64 {
    (closeness as f64 / 255.0 * multiplier * base as f64).round() as i64
}

/// Separate windows by ocean, editing `land_mask` in place.
///
/// Returns the re-aggregated windows and every mask edit so the caller can
/// mirror them to the host. Disabled policies return the windows unchanged.
pub fn separate_windows(
    windows: &[LandmassWindow],
    land_mask: &mut Tilemap<u8>,
    closeness: &Tilemap<u8>,
    policy: &OceanSeparationPolicy,
    mode: CrustMode,
) -> SeparationOutcome {
    let (width, height) = (land_mask.width, land_mask.height);
    if !policy.enabled || windows.is_empty() || width == 0 || height == 0 {
        return SeparationOutcome {
            windows: windows.to_vec(),
            edits: Vec::new(),
        };
    }

    let mut states: Vec<RowState> = windows.iter().map(|w| RowState::new(w, width, height)).collect();
    let mut carver = Carver {
        mask: land_mask,
        edits: Vec::new(),
    };

    match mode {
        CrustMode::Area => cut_channels(&mut states, &mut carver, policy),
        CrustMode::Legacy => {
            carve_band_pairs(&mut states, &mut carver, closeness, policy);
            let last = states.len() - 1;
            apply_edge(&mut states[0], &mut carver, closeness, &policy.edge_west, true);
            apply_edge(&mut states[last], &mut carver, closeness, &policy.edge_east, false);
        }
    }

    SeparationOutcome {
        windows: states.iter().map(|s| s.aggregate(width)).collect(),
        edits: carver.edits,
    }
}

fn cut_channels(states: &mut [RowState], carver: &mut Carver<'_>, policy: &OceanSeparationPolicy) {
    let width = carver.mask.width as i64;
    let channel = policy.min_channel_width.max(1) as i64;
    let jitter = policy.channel_jitter.max(0) as i64;
    let half = (channel - 1) / 2;

    for i in 0..states.len().saturating_sub(1) {
        let (head, tail) = states.split_at_mut(i + 1);
        let left = &mut head[i];
        let right = &mut tail[0];
        let rows = left.south.max(right.south)..=left.north.min(right.north);

        for y in rows {
            let base = ((left.east[y] + right.west[y]) / 2).clamp(0, width - 1);
            let offset = if jitter > 0 {
                ((y as i64 + i as i64) % (jitter * 2 + 1)) - jitter
            } else {
                0
            };
            let center = (base + offset).clamp(0, width - 1);
            let mut start = (center - half).clamp(0, width - 1);
            let mut end = (start + channel - 1).min(width - 1);

            // Each side keeps at least its outermost column.
            start = start.max(left.west[y] + 1);
            end = end.min(right.east[y] - 1);
            if start > end {
                continue;
            }

            for x in start..=end {
                carver.set(x, y, false);
            }
            left.east[y] = left.east[y].min(start - 1);
            right.west[y] = right.west[y].max(end + 1);
        }
    }
}

fn carve_band_pairs(
    states: &mut [RowState],
    carver: &mut Carver<'_>,
    closeness: &Tilemap<u8>,
    policy: &OceanSeparationPolicy,
) {
    let width = carver.mask.width as i64;
    let base = policy.base_separation_tiles.max(0) as i64;
    let cap = policy.max_per_row_delta.max(0) as i64;

    for &[li, ri] in &policy.band_pairs {
        if li == ri || li >= states.len() || ri >= states.len() {
            continue;
        }
        for y in 0..closeness.height.min(carver.mask.height) {
            let (left, right) = pair_mut(states, li, ri);
            if y < left.south.max(right.south) || y > left.north.min(right.north) {
                continue;
            }
            let mid = ((left.east[y] + right.west[y]) / 2).clamp(0, width - 1);
            let mut sep = base;
            if sep > 0 {
                sep += scaled(base, *closeness.get(mid as usize, y), policy.boundary_closeness_multiplier);
            }
            let sep = sep.min(cap);
            if sep <= 0 {
                continue;
            }
            carver.carve_from_east(left, y, sep);
            carver.carve_from_west(right, y, sep);
        }
    }
}

fn pair_mut(states: &mut [RowState], a: usize, b: usize) -> (&mut RowState, &mut RowState) {
    if a < b {
        let (head, tail) = states.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = states.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}

fn apply_edge(
    state: &mut RowState,
    carver: &mut Carver<'_>,
    closeness: &Tilemap<u8>,
    edge: &EdgePolicy,
    west: bool,
) {
    if !edge.enabled {
        return;
    }
    let base = edge.base_tiles as i64;
    let cap = edge.max_per_row_delta.max(0) as i64;
    let column = if west { 0 } else { closeness.width - 1 };

    for y in state.south..=state.north {
        let mag = (base.abs() + scaled(base.abs(), *closeness.get(column, y), edge.boundary_closeness_multiplier)).min(cap);
        if mag <= 0 {
            continue;
        }
        match (base >= 0, west) {
            (true, true) => {
                carver.carve_from_west(state, y, mag);
            }
            (true, false) => {
                carver.carve_from_east(state, y, mag);
            }
            (false, true) => carver.fill_from_west(state, y, mag),
            (false, false) => carver.fill_from_east(state, y, mag),
        }
    }
}
