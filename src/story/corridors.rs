//! Strategic corridors.
//!
//! Sea lanes, island hops and rift-shoulder land corridors are tagged before
//! islands are raised; river chains are tagged once rivers exist. Coasts and
//! islands keep sea lanes open, and biomes lean toward grassland along land
//! and river corridors.

use std::cmp::Reverse;

use log::debug;

use super::TileKey;
use crate::config::{DirectionalityConfig, SeaLaneConfig};
use crate::context::MapContext;

const MAX_HOP_ATTEMPTS: usize = 100;
const MAX_CHAIN_TRIES: usize = 300;
const RELIEF_STEP: i32 = 60;

/// Which overlay set a corridor tile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CorridorKind {
    SeaLane,
    IslandHop,
    Land,
    River,
}

/// Flavor of a tagged corridor tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CorridorStyle {
    Ocean,
    Coastal,
    Archipelago,
    Canyon,
    Plateau,
    FlatMountain,
    DesertBelt,
    GrasslandBelt,
    PlainsBelt,
    RiverChain,
}

impl CorridorStyle {
    pub fn kind(&self) -> CorridorKind {
        match self {
            CorridorStyle::Ocean | CorridorStyle::Coastal => CorridorKind::SeaLane,
            CorridorStyle::Archipelago => CorridorKind::IslandHop,
            CorridorStyle::RiverChain => CorridorKind::River,
            _ => CorridorKind::Land,
        }
    }
}

/// When in the pipeline the corridor pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorridorPhase {
    /// Sea lanes, island hops and land corridors, before islands.
    PreIslands,
    /// River chains, after rivers are modelled.
    PostRivers,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorridorSummary {
    pub sea_lanes: usize,
    pub island_hops: usize,
    pub land_corridors: usize,
    pub river_chains: usize,
}

pub fn story_tag_strategic_corridors(ctx: &mut MapContext<'_>, phase: CorridorPhase) -> CorridorSummary {
    let mut summary = CorridorSummary::default();
    match phase {
        CorridorPhase::PreIslands => {
            summary.sea_lanes = tag_sea_lanes(ctx);
            summary.island_hops = tag_island_hops(ctx);
            summary.land_corridors = tag_land_corridors(ctx);
        }
        CorridorPhase::PostRivers => {
            summary.river_chains = tag_river_chains(ctx);
        }
    }
    debug!(
        "Corridors ({:?}): {} sea lanes, {} hop arcs, {} land, {} river chains; {} lane tiles",
        phase,
        summary.sea_lanes,
        summary.island_hops,
        summary.land_corridors,
        summary.river_chains,
        ctx.story.sea_lane.len(),
    );
    summary
}

fn tag(ctx: &mut MapContext<'_>, key: TileKey, style: CorridorStyle) {
    let set = match style.kind() {
        CorridorKind::SeaLane => &mut ctx.story.sea_lane,
        CorridorKind::IslandHop => &mut ctx.story.island_hop,
        CorridorKind::Land => &mut ctx.story.land_corridor,
        CorridorKind::River => &mut ctx.story.river_corridor,
    };
    set.insert(key);
    ctx.story.corridor_style.insert(key, style);
}

// =============================================================================
// SEA LANES
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LaneAxis {
    Column,
    Row,
    /// Lines of constant `x + y`
    DiagonalSum,
    /// Lines of constant `x - y`
    DiagonalDiff,
}

impl LaneAxis {
    /// Unit vector along the lane.
    fn direction(self) -> (f64, f64) {
        let d = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            LaneAxis::Column => (0.0, 1.0),
            LaneAxis::Row => (1.0, 0.0),
            LaneAxis::DiagonalSum => (d, -d),
            LaneAxis::DiagonalDiff => (d, d),
        }
    }

    /// Step across the lane used for the channel width check.
    fn across(self) -> (i64, i64) {
        match self {
            LaneAxis::Column => (1, 0),
            LaneAxis::Row => (0, 1),
            LaneAxis::DiagonalSum => (1, 1),
            LaneAxis::DiagonalDiff => (1, -1),
        }
    }
}

struct LaneCandidate {
    axis: LaneAxis,
    index: i64,
    score: i64,
    cells: Vec<TileKey>,
}

/// Cells of one scan line, in order.
fn line_cells(axis: LaneAxis, index: i64, width: usize, height: usize) -> Vec<TileKey> {
    let (w, h) = (width as i64, height as i64);
    match axis {
        LaneAxis::Column => (0..height).map(|y| (index as usize, y)).collect(),
        LaneAxis::Row => (0..width).map(|x| (x, index as usize)).collect(),
        LaneAxis::DiagonalSum => {
            let lo = (index - (h - 1)).max(0);
            let hi = index.min(w - 1);
            (lo..=hi).map(|x| (x as usize, (index - x) as usize)).collect()
        }
        LaneAxis::DiagonalDiff => {
            let lo = (-index).max(0);
            let hi = (h - 1).min(w - 1 - index);
            (lo..=hi).map(|y| ((index + y) as usize, y as usize)).collect()
        }
    }
}

/// Longest contiguous water run along a line.
fn longest_water_run(ctx: &MapContext<'_>, cells: &[TileKey]) -> Vec<TileKey> {
    let (mut best_start, mut best_len) = (0, 0);
    let mut start = 0;
    let mut len = 0;
    for (i, &(x, y)) in cells.iter().enumerate() {
        if ctx.is_water(x, y) {
            if len == 0 {
                start = i;
            }
            len += 1;
            if len > best_len {
                best_len = len;
                best_start = start;
            }
        } else {
            len = 0;
        }
    }
    cells[best_start..best_start + best_len].to_vec()
}

fn channel_is_wide(ctx: &MapContext<'_>, axis: LaneAxis, x: usize, y: usize, radius: i64) -> bool {
    let (ax, ay) = axis.across();
    (-radius..=radius).all(|t| {
        let nx = x as i64 + ax * t;
        let ny = y as i64 + ay * t;
        ctx.in_bounds(nx, ny) && ctx.is_water(nx as usize, ny as usize)
    })
}

/// Score bonus for lanes running along the prevailing wind and current axes.
fn directional_bonus(dir: Option<&DirectionalityConfig>, axis: LaneAxis) -> i64 {
    let Some(d) = dir else {
        return 0;
    };
    let coh = d.cohesion.clamp(0.0, 1.0);
    if coh <= 0.0 {
        return 0;
    }
    let plate_axis = d.plate_axis_deg as f64;
    let wfp = d.winds_follow_plates.clamp(0.0, 1.0) * coh;
    let cfw = d.currents_follow_winds.clamp(0.0, 1.0) * coh;
    let wind_deg = d.wind_bias_deg as f64 + (plate_axis * wfp).round();
    let current_deg = d.current_bias_deg as f64 + (plate_axis * wfp * 0.5).round();

    let unit = |deg: f64| {
        let r = deg.to_radians();
        (r.cos(), r.sin())
    };
    let (wx, wy) = unit(wind_deg);
    let (cx, cy) = unit(current_deg);
    let (lx, ly) = axis.direction();
    let current_weight = 0.8 + 0.6 * cfw;
    let align = ((wx * lx + wy * ly).abs() + (cx * lx + cy * ly).abs() * current_weight)
        / (1.0 + current_weight);
    (align * 25.0 * coh).round() as i64
}

fn lane_candidates(ctx: &MapContext<'_>, cfg: &SeaLaneConfig) -> Vec<LaneCandidate> {
    let (w, h) = (ctx.width as i64, ctx.height as i64);
    let stride = cfg.scan_stride.max(2);
    let frac = cfg.min_length_frac.clamp(0.4, 1.0);
    let required = cfg.min_channel_width.max(1);
    let radius = ((required - 1) / 2) as i64;
    let dir = ctx.config.dynamics.directionality.as_ref();

    let mut lines: Vec<(LaneAxis, i64)> = Vec::new();
    lines.extend((1..w - 1).step_by(stride).map(|x| (LaneAxis::Column, x)));
    lines.extend((1..h - 1).step_by(stride).map(|y| (LaneAxis::Row, y)));
    if cfg.prefer_diagonals {
        lines.extend((0..w + h - 1).step_by(stride).map(|k| (LaneAxis::DiagonalSum, k)));
        lines.extend((-(h - 1)..w).step_by(stride).map(|d| (LaneAxis::DiagonalDiff, d)));
    }

    let mut out = Vec::new();
    for (axis, index) in lines {
        let cells = line_cells(axis, index, ctx.width, ctx.height);
        if cells.is_empty() {
            continue;
        }
        let axis_len = cells.len();
        let run = longest_water_run(ctx, &cells);
        let min_len = (axis_len as f64 * frac).floor() as usize;
        if run.is_empty() || run.len() < min_len {
            continue;
        }

        let sample = (run.len() / 10).max(1);
        let wide = run
            .iter()
            .step_by(sample)
            .all(|&(x, y)| channel_is_wide(ctx, axis, x, y, radius));
        let min_width = if wide { required as i64 } else { 1 };
        let width_weight = match axis {
            LaneAxis::Column | LaneAxis::Row => 3,
            _ => 2,
        };
        let coverage = run.len() as f64 / axis_len as f64;
        let score = run.len() as i64
            + width_weight * min_width
            + (coverage * 10.0).round() as i64
            + directional_bonus(dir, axis);
        out.push(LaneCandidate {
            axis,
            index,
            score,
            cells: run,
        });
    }
    out
}

fn tag_sea_lanes(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.story.corridors.sea.clone();
    if cfg.max_lanes == 0 || ctx.width < 3 || ctx.height < 3 {
        return 0;
    }
    let mut candidates = lane_candidates(ctx, &cfg);
    candidates.sort_by_key(|c| Reverse(c.score));

    let mut chosen: Vec<(LaneAxis, i64)> = Vec::new();
    for cand in candidates {
        if chosen.len() >= cfg.max_lanes {
            break;
        }
        let crowded = chosen
            .iter()
            .any(|&(axis, index)| axis == cand.axis && (index - cand.index).abs() < cfg.lane_spacing);
        if crowded {
            continue;
        }
        for &(x, y) in &cand.cells {
            if !ctx.is_water(x, y) {
                continue;
            }
            let style = if ctx.is_adjacent_to_land(x, y, 2) {
                CorridorStyle::Coastal
            } else {
                CorridorStyle::Ocean
            };
            tag(ctx, (x, y), style);
        }
        chosen.push((cand.axis, cand.index));
    }
    chosen.len()
}

// =============================================================================
// ISLAND HOPS
// =============================================================================

fn tag_island_hops(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.story.corridors.island_hop.clone();
    if !cfg.use_hotspots || cfg.max_arcs == 0 || ctx.story.hotspot.is_empty() {
        return 0;
    }
    let mut keys: Vec<TileKey> = ctx.story.hotspot.iter().copied().collect();
    keys.sort_unstable();

    let mut picked: Vec<usize> = Vec::new();
    let mut attempts = 0;
    while picked.len() < cfg.max_arcs && attempts < MAX_HOP_ATTEMPTS && attempts < keys.len() * 2 {
        attempts += 1;
        let idx = ctx.random("IslandHopPick", keys.len() as i32).max(0) as usize % keys.len();
        if picked.contains(&idx) {
            continue;
        }
        picked.push(idx);

        let (hx, hy) = keys[idx];
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let (nx, ny) = (hx as i64 + dx, hy as i64 + dy);
                if ctx.in_bounds(nx, ny) && ctx.is_water(nx as usize, ny as usize) {
                    tag(ctx, (nx as usize, ny as usize), CorridorStyle::Archipelago);
                }
            }
        }
    }
    picked.len()
}

// =============================================================================
// LAND CORRIDORS
// =============================================================================

struct RunStats {
    avg_elevation: i32,
    avg_rainfall: i32,
    relief: f64,
    latitude: f64,
}

fn run_stats(ctx: &MapContext<'_>, y: usize, start: usize, end: usize) -> RunStats {
    let (w, h) = (ctx.width, ctx.height);
    let a = &*ctx.adapter;
    let (mut elev, mut rain, mut samples, mut hits) = (0i64, 0i64, 0usize, 0usize);
    for x in start..=end {
        if a.is_water(x, y) {
            continue;
        }
        let e = a.get_elevation(x, y);
        elev += e as i64;
        rain += a.get_rainfall(x, y) as i64;
        samples += 1;
        let neighbors = [
            a.get_elevation(x, y.saturating_sub(1)),
            a.get_elevation(x, (y + 1).min(h - 1)),
            a.get_elevation(x.saturating_sub(1), y),
            a.get_elevation((x + 1).min(w - 1), y),
        ];
        if neighbors.iter().any(|&n| (e - n).abs() >= RELIEF_STEP) {
            hits += 1;
        }
    }
    let avg = |total: i64| {
        if samples > 0 {
            (total as f64 / samples as f64).round() as i32
        } else {
            0
        }
    };
    RunStats {
        avg_elevation: avg(elev),
        avg_rainfall: avg(rain),
        relief: if samples > 0 { hits as f64 / samples as f64 } else { 0.0 },
        latitude: ctx.latitude(0, y).abs(),
    }
}

fn classify_land(stats: &RunStats, dir: Option<&DirectionalityConfig>) -> CorridorStyle {
    let RunStats {
        avg_elevation: elev,
        avg_rainfall: rain,
        relief,
        latitude: lat,
    } = *stats;

    let mut style = if relief > 0.35 && rain < 95 {
        CorridorStyle::Canyon
    } else if elev > 650 && relief < 0.2 {
        CorridorStyle::Plateau
    } else if elev > 550 && relief < 0.35 {
        CorridorStyle::FlatMountain
    } else if rain < 85 && lat < 35.0 {
        CorridorStyle::DesertBelt
    } else if rain > 115 {
        CorridorStyle::GrasslandBelt
    } else {
        CorridorStyle::PlainsBelt
    };

    let Some(d) = dir else {
        return style;
    };
    let coh = d.cohesion.clamp(0.0, 1.0);
    if coh <= 0.0 {
        return style;
    }
    // Runs are horizontal, so alignment is the x component of each axis.
    let align_plate = (d.plate_axis_deg as f64).to_radians().cos().abs();
    let align_wind = (d.wind_bias_deg as f64).to_radians().cos().abs();
    let hi = 0.75 * coh + 0.1;
    let mid = 0.5 * coh + 0.1;

    if align_plate >= hi {
        if elev > 650 && relief < 0.28 {
            style = CorridorStyle::Plateau;
        } else if relief > 0.3 && rain < 100 {
            style = CorridorStyle::Canyon;
        } else if elev > 560 && relief < 0.35 {
            style = CorridorStyle::FlatMountain;
        }
    } else if align_plate >= mid && elev > 600 && relief < 0.25 {
        style = CorridorStyle::Plateau;
    }

    if align_wind >= hi {
        if rain > 110 || (lat < 25.0 && rain > 100) {
            style = CorridorStyle::GrasslandBelt;
        } else if rain < 90 && lat < 35.0 {
            style = CorridorStyle::DesertBelt;
        }
    } else if align_wind >= mid && rain > 120 {
        style = CorridorStyle::GrasslandBelt;
    }
    style
}

fn tag_land_corridors(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.story.corridors.land.clone();
    if !cfg.use_rift_shoulders || cfg.max_corridors == 0 || ctx.story.rift_shoulder.is_empty() {
        return 0;
    }
    let (w, h) = (ctx.width, ctx.height);
    let min_run = cfg.min_run_length.max(12);
    let dir = ctx.config.dynamics.directionality.clone();

    let mut used_rows: Vec<usize> = Vec::new();
    for y in 1..h.saturating_sub(1) {
        if used_rows.len() >= cfg.max_corridors {
            break;
        }
        let mut x = 1;
        while x < w - 1 && used_rows.len() < cfg.max_corridors {
            while x < w - 1 && !ctx.story.rift_shoulder.contains(&(x, y)) {
                x += 1;
            }
            if x >= w - 1 {
                break;
            }
            let start = x;
            while x < w - 1 && ctx.story.rift_shoulder.contains(&(x, y)) {
                x += 1;
            }
            let end = x - 1;
            if end - start + 1 < min_run {
                continue;
            }
            if used_rows.iter().any(|&row| row.abs_diff(y) < cfg.spacing) {
                continue;
            }

            let stats = run_stats(ctx, y, start, end);
            let style = classify_land(&stats, dir.as_ref());
            for cx in start..=end {
                if !ctx.is_water(cx, y) {
                    tag(ctx, (cx, y), style);
                }
            }
            used_rows.push(y);
        }
    }
    used_rows.len()
}

// =============================================================================
// RIVER CHAINS
// =============================================================================

fn tag_river_chains(ctx: &mut MapContext<'_>) -> usize {
    let cfg = ctx.config.story.corridors.river.clone();
    if cfg.max_chains == 0 {
        return 0;
    }
    let (w, h) = (ctx.width, ctx.height);
    let max_steps = cfg.max_steps.max(20);
    let lowland = cfg.prefer_lowland_below;

    let mut chains = 0;
    let mut tries = 0;
    while chains < cfg.max_chains && tries < MAX_CHAIN_TRIES {
        tries += 1;
        let sx = ctx.random("RiverChainSX", w as i32).max(0) as usize;
        let sy = ctx.random("RiverChainSY", h as i32).max(0) as usize;
        if sx >= w || sy >= h {
            continue;
        }
        if !ctx.is_coastal_land(sx, sy) || !ctx.adapter.is_adjacent_to_rivers(sx, sy, cfg.coast_seed_radius) {
            continue;
        }

        let (mut x, mut y) = (sx, sy);
        let mut path: Vec<TileKey> = Vec::new();
        for _ in 0..max_steps {
            if !ctx.is_water(x, y) && ctx.adapter.is_adjacent_to_rivers(x, y, 1) {
                path.push((x, y));
            }
            let mut best = (x, y);
            let mut best_elev = ctx.adapter.get_elevation(x, y);
            let mut improved = false;
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if !ctx.in_bounds(nx, ny) {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if ctx.is_water(nx, ny) || !ctx.adapter.is_adjacent_to_rivers(nx, ny, 1) {
                        continue;
                    }
                    let e = ctx.adapter.get_elevation(nx, ny);
                    let prefer = e <= best_elev || (e < lowland && best_elev >= lowland);
                    if prefer && (!improved || ctx.random("RiverChainTie", 3) == 0) {
                        best = (nx, ny);
                        best_elev = e;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
            (x, y) = best;
        }

        if path.len() < cfg.min_tiles {
            continue;
        }
        let ends_near_coast = !cfg.must_end_near_coast
            || ctx.is_coastal_land(x, y)
            || ctx.is_adjacent_to_shallow_water(x, y);
        if !ends_near_coast {
            continue;
        }
        for key in path {
            tag(ctx, key, CorridorStyle::RiverChain);
        }
        chains += 1;
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::{LandCorridorConfig, MapGenConfig};

    /// Two land blocks with a nine-wide north-south strait between them.
    fn strait_map(w: usize, h: usize) -> MockAdapter {
        let mut adapter = MockAdapter::new(w, h, 5);
        for y in 0..h {
            for x in (2..=10).chain(20..=28) {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    #[test]
    fn test_sea_lane_follows_open_strait() {
        let mut adapter = strait_map(30, 20);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        let summary = story_tag_strategic_corridors(&mut ctx, CorridorPhase::PreIslands);

        assert!(summary.sea_lanes >= 1);
        for y in 0..20 {
            assert!(ctx.story.sea_lane.contains(&(13, y)), "strait column untagged at y={y}");
        }
        for &(x, y) in &ctx.story.sea_lane {
            assert!(ctx.is_water(x, y));
            assert_eq!(ctx.story.corridor_style[&(x, y)].kind(), CorridorKind::SeaLane);
        }
        // Every row crosses land, so no east-west lane qualifies.
        assert!(!(0..30).all(|x| ctx.story.sea_lane.contains(&(x, 10))));
    }

    #[test]
    fn test_no_lanes_when_disabled() {
        let mut adapter = strait_map(30, 20);
        let mut config = MapGenConfig::default();
        config.story.corridors.sea.max_lanes = 0;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        let summary = story_tag_strategic_corridors(&mut ctx, CorridorPhase::PreIslands);
        assert_eq!(summary.sea_lanes, 0);
        assert!(ctx.story.sea_lane.is_empty());
    }

    #[test]
    fn test_island_hops_surround_hotspots() {
        let mut adapter = MockAdapter::new(30, 30, 8);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        ctx.story.hotspot.insert((10, 10));
        ctx.story.hotspot.insert((20, 20));
        let picked = tag_island_hops(&mut ctx);

        assert!(picked >= 1);
        assert!(!ctx.story.island_hop.is_empty());
        for &(x, y) in &ctx.story.island_hop {
            let near = ctx
                .story
                .hotspot
                .iter()
                .any(|&(hx, hy)| hx.abs_diff(x) <= 1 && hy.abs_diff(y) <= 1);
            assert!(near);
            assert_eq!(ctx.story.corridor_style[&(x, y)], CorridorStyle::Archipelago);
        }
    }

    #[test]
    fn test_land_corridor_follows_shoulder_run() {
        let (w, h) = (40, 20);
        let mut adapter = MockAdapter::new(w, h, 3);
        for y in 0..h {
            for x in 0..w {
                adapter.set_terrain_type(x, y, 2);
                adapter.set_rainfall(x, y, 130);
            }
        }
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        for x in 4..34 {
            ctx.story.rift_shoulder.insert((x, 6));
        }
        // Too short to count.
        for x in 4..10 {
            ctx.story.rift_shoulder.insert((x, 14));
        }
        let count = tag_land_corridors(&mut ctx);

        assert_eq!(count, 1);
        assert_eq!(ctx.story.land_corridor.len(), 30);
        assert!(ctx.story.land_corridor.iter().all(|&(_, y)| y == 6));
        assert_eq!(ctx.story.corridor_style[&(10, 6)], CorridorStyle::GrasslandBelt);
    }

    #[test]
    fn test_land_corridor_requires_shoulder_flag() {
        let mut adapter = MockAdapter::new(40, 20, 3);
        let mut config = MapGenConfig::default();
        config.story.corridors.land = LandCorridorConfig {
            use_rift_shoulders: false,
            ..LandCorridorConfig::default()
        };
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        for x in 4..34 {
            ctx.story.rift_shoulder.insert((x, 6));
        }
        assert_eq!(tag_land_corridors(&mut ctx), 0);
        assert!(ctx.story.land_corridor.is_empty());
    }

    #[test]
    fn test_land_style_classification() {
        let stats = |elev, rain, relief, lat| RunStats {
            avg_elevation: elev,
            avg_rainfall: rain,
            relief,
            latitude: lat,
        };
        assert_eq!(classify_land(&stats(300, 60, 0.5, 40.0), None), CorridorStyle::Canyon);
        assert_eq!(classify_land(&stats(700, 100, 0.1, 40.0), None), CorridorStyle::Plateau);
        assert_eq!(classify_land(&stats(600, 100, 0.3, 40.0), None), CorridorStyle::FlatMountain);
        assert_eq!(classify_land(&stats(200, 70, 0.0, 20.0), None), CorridorStyle::DesertBelt);
        assert_eq!(classify_land(&stats(200, 100, 0.0, 50.0), None), CorridorStyle::PlainsBelt);
    }

    #[test]
    fn test_river_chain_tags_riverside_land() {
        let (w, h) = (40, 12);
        let mut adapter = MockAdapter::new(w, h, 17);
        // Land band from x=0 to x=35 with ocean to the east; a river along row 5.
        for y in 0..h {
            for x in 0..36 {
                adapter.set_terrain_type(x, y, 2);
                adapter.set_elevation(x, y, 500 - 10 * x as i32);
            }
        }
        for x in 2..36 {
            adapter.set_river(x, 5);
        }
        let mut config = MapGenConfig::default();
        config.story.corridors.river.min_tiles = 4;
        config.story.corridors.river.must_end_near_coast = false;
        let mut ctx = MapContext::new(&mut adapter, config).unwrap();
        story_tag_strategic_corridors(&mut ctx, CorridorPhase::PostRivers);

        for &(x, y) in &ctx.story.river_corridor {
            assert!(!ctx.is_water(x, y));
            assert!(ctx.adapter.is_adjacent_to_rivers(x, y, 1));
            assert_eq!(ctx.story.corridor_style[&(x, y)], CorridorStyle::RiverChain);
        }
        // Post-river phase leaves the pre-island sets alone.
        assert!(ctx.story.sea_lane.is_empty());
        assert!(ctx.story.land_corridor.is_empty());
    }
}
