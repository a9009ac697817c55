//! Landmass bounding windows.

use super::LandmassWindow;
use crate::config::GeometryPostConfig;
use crate::plates::PlateId;
use crate::tilemap::Tilemap;

fn clamp_to(v: i64, max: usize) -> usize {
    v.clamp(0, max as i64) as usize
}

/// Widen a window symmetrically until it spans `min_width` columns; the odd
/// tile goes east.
fn widen(west: i64, east: i64, min_width: i64) -> (i64, i64) {
    let span = east - west + 1;
    if min_width <= 0 || span >= min_width {
        return (west, east);
    }
    let deficit = min_width - span;
    let extra_west = deficit / 2;
    (west - extra_west, east + (deficit - extra_west))
}

#[derive(Clone, Copy)]
struct Extent {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

/// One window per plate that owns land, ordered west to east.
pub fn build_windows(
    land_mask: &Tilemap<u8>,
    plate_id: &Tilemap<PlateId>,
    post: &GeometryPostConfig,
) -> Vec<LandmassWindow> {
    let (width, height) = (land_mask.width, land_mask.height);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut extents: Vec<Option<Extent>> = Vec::new();
    for (x, y, &land) in land_mask.iter() {
        if land == 0 {
            continue;
        }
        let id = *plate_id.get(x, y);
        if id.is_none() {
            continue;
        }
        let p = id.index();
        if extents.len() <= p {
            extents.resize(p + 1, None);
        }
        extents[p] = Some(match extents[p] {
            None => Extent {
                min_x: x,
                max_x: x,
                min_y: y,
                max_y: y,
            },
            Some(e) => Extent {
                min_x: e.min_x.min(x),
                max_x: e.max_x.max(x),
                min_y: e.min_y.min(y),
                max_y: e.max_y.max(y),
            },
        });
    }

    let expand = post.expand_tiles as i64;
    let grow_west = (expand + post.expand_west_tiles as i64).max(0);
    let grow_east = (expand + post.expand_east_tiles as i64).max(0);
    let vertical_pad = expand.max(0);

    let mut windows: Vec<LandmassWindow> = extents
        .into_iter()
        .flatten()
        .map(|e| {
            let mut west = e.min_x as i64 - grow_west;
            let mut east = e.max_x as i64 + grow_east;
            if let Some(min_width) = post.min_width_tiles {
                (west, east) = widen(west, east, min_width as i64);
            }
            let mut west = clamp_to(west, width - 1);
            let mut east = clamp_to(east, width - 1);
            if let Some(min) = post.clamp_west_min {
                west = west.max(clamp_to(min as i64, width - 1));
            }
            if let Some(max) = post.clamp_east_max {
                east = east.min(clamp_to(max as i64, width - 1));
            }

            let south = post
                .override_south
                .map(|s| clamp_to(s as i64, height - 1))
                .unwrap_or_else(|| clamp_to(e.min_y as i64 - vertical_pad, height - 1));
            let north = post
                .override_north
                .map(|n| clamp_to(n as i64, height - 1))
                .unwrap_or_else(|| clamp_to(e.max_y as i64 + vertical_pad, height - 1));

            LandmassWindow {
                west: west.min(east),
                east: west.max(east),
                south: south.min(north),
                north: south.max(north),
                continent: 0,
            }
        })
        .collect();

    windows.sort_by_key(|w| w.west + w.east);
    for (i, w) in windows.iter_mut().enumerate() {
        w.continent = i;
    }
    windows
}

/// Re-apply the geometry post block to finished windows. Expansion only
/// grows; clamps run before the minimum width.
pub fn apply_landmass_post_adjustments(
    windows: &[LandmassWindow],
    post: &GeometryPostConfig,
    width: usize,
    height: usize,
) -> Vec<LandmassWindow> {
    if width == 0 || height == 0 {
        return windows.to_vec();
    }
    let max_x = width - 1;
    let max_y = height - 1;

    let grow_west = (post.expand_tiles + post.expand_west_tiles) as i64;
    let grow_east = (post.expand_tiles + post.expand_east_tiles) as i64;

    windows
        .iter()
        .map(|win| {
            let mut west = win.west.min(max_x) as i64;
            let mut east = win.east.min(max_x) as i64;
            if grow_west > 0 {
                west = clamp_to(west - grow_west, max_x) as i64;
            }
            if grow_east > 0 {
                east = clamp_to(east + grow_east, max_x) as i64;
            }
            if let Some(min) = post.clamp_west_min {
                west = west.max(min.max(0) as i64);
            }
            if let Some(max) = post.clamp_east_max {
                east = east.min((max as i64).min(max_x as i64));
            }
            if let Some(min_width) = post.min_width_tiles {
                let (w, e) = widen(west, east, min_width as i64);
                west = clamp_to(w, max_x) as i64;
                east = clamp_to(e, max_x) as i64;
            }

            let south = post
                .override_south
                .map(|s| clamp_to(s as i64, max_y))
                .unwrap_or(win.south.min(max_y));
            let north = post
                .override_north
                .map(|n| clamp_to(n as i64, max_y))
                .unwrap_or(win.north.min(max_y));

            LandmassWindow {
                west: clamp_to(west, max_x),
                east: clamp_to(east, max_x),
                south,
                north,
                continent: win.continent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Tilemap<u8>, Tilemap<PlateId>) {
        let mut land = Tilemap::new(20, 10);
        let mut ids = Tilemap::new_with(20, 10, PlateId(0));
        for y in 2..6 {
            for x in 12..16 {
                land.set(x, y, 1);
                ids.set(x, y, PlateId(0));
            }
            for x in 2..5 {
                land.set(x, y, 1);
                ids.set(x, y, PlateId(3));
            }
        }
        (land, ids)
    }

    #[test]
    fn test_windows_sorted_west_to_east() {
        let (land, ids) = two_blobs();
        let windows = build_windows(&land, &ids, &GeometryPostConfig::default());
        assert_eq!(windows.len(), 2);
        assert_eq!(
            windows[0],
            LandmassWindow {
                west: 2,
                east: 4,
                south: 2,
                north: 5,
                continent: 0
            }
        );
        assert_eq!(windows[1].west, 12);
        assert_eq!(windows[1].east, 15);
        assert_eq!(windows[1].continent, 1);
    }

    #[test]
    fn test_expand_and_min_width() {
        let (land, ids) = two_blobs();
        let post = GeometryPostConfig {
            expand_tiles: 1,
            min_width_tiles: Some(8),
            ..GeometryPostConfig::default()
        };
        let windows = build_windows(&land, &ids, &post);
        // 3 wide + 2 expansion = 5, widened by 1 west and 2 east.
        assert_eq!((windows[0].west, windows[0].east), (0, 7));
        assert_eq!((windows[0].south, windows[0].north), (1, 6));
    }

    #[test]
    fn test_post_adjust_min_width_and_overrides() {
        let win = LandmassWindow {
            west: 10,
            east: 11,
            south: 3,
            north: 7,
            continent: 2,
        };
        let post = GeometryPostConfig {
            min_width_tiles: Some(6),
            override_north: Some(40),
            clamp_west_min: Some(9),
            ..GeometryPostConfig::default()
        };
        let out = apply_landmass_post_adjustments(&[win], &post, 30, 20);
        assert_eq!(out[0].east - out[0].west + 1, 6);
        assert_eq!((out[0].west, out[0].east), (8, 13));
        assert_eq!(out[0].north, 19);
        assert_eq!(out[0].continent, 2);
    }

    #[test]
    fn test_post_adjust_negative_expansion_is_ignored() {
        let win = LandmassWindow {
            west: 5,
            east: 9,
            south: 0,
            north: 4,
            continent: 0,
        };
        let post = GeometryPostConfig {
            expand_tiles: -3,
            ..GeometryPostConfig::default()
        };
        assert_eq!(apply_landmass_post_adjustments(&[win], &post, 20, 10), vec![win]);
    }
}
