//! Final host placement passes: wonders, floodplains, snow, resources,
//! starts, discoveries, fertility and advanced start regions.
//!
//! Each pass is independent. A failure is logged and the remaining passes
//! still run.

use log::{info, warn};

use crate::adapter::{HostResult, MapInfo, StartRequest};
use crate::context::MapContext;
use crate::landmass::{default_continent_bounds, LandmassWindow};

/// Natural wonders to request; one extra when `plus_one` is set.
pub fn natural_wonder_count(info: Option<&MapInfo>, plus_one: bool) -> u32 {
    match info {
        None => 1,
        Some(info) if plus_one => info.num_natural_wonders.saturating_add(1),
        Some(info) => info.num_natural_wonders,
    }
}

/// West and east start continents, falling back to fixed halves of the map
/// when the landmass stage produced fewer than two windows.
pub fn start_continents(ctx: &MapContext<'_>) -> (LandmassWindow, LandmassWindow) {
    if let Some(pair) = ctx.landmass.as_ref().and_then(|l| l.continents()) {
        return pair;
    }
    let bounds = &ctx.config.landmass.continent_bounds;
    (
        default_continent_bounds(ctx.width, ctx.height, bounds, true),
        default_continent_bounds(ctx.width, ctx.height, bounds, false),
    )
}

fn attempt<T>(step: &str, result: HostResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Placement: {step} failed: {e}");
            None
        }
    }
}

/// Run every placement pass and return the assigned start tiles.
pub fn run_placement(ctx: &mut MapContext<'_>) -> Vec<usize> {
    let (width, height) = (ctx.width, ctx.height);
    let cfg = ctx.config.placement.clone();
    let info = ctx.adapter.map_info();

    let wonders = natural_wonder_count(info.as_ref(), cfg.wonders_plus_one);
    attempt("natural wonders", ctx.adapter.add_natural_wonders(width, height, wonders));
    attempt(
        "floodplains",
        ctx.adapter
            .add_floodplains(cfg.floodplains_min_length, cfg.floodplains_max_length),
    );
    attempt("snow", ctx.adapter.generate_snow(width, height));
    attempt("resources", ctx.adapter.generate_resources(width, height));

    let mut starts = Vec::new();
    match info {
        None => info!("Placement: no map info, skipping start positions"),
        Some(info) => {
            let (west, east) = start_continents(ctx);
            let request = StartRequest {
                players_west: info.players_west,
                players_east: info.players_east,
                west,
                east,
                sector_rows: cfg.start_sector_rows,
                sector_cols: cfg.start_sector_cols,
            };
            let total = (request.players_west + request.players_east) as usize;
            if let Some(positions) = attempt("start positions", ctx.adapter.assign_start_positions(&request)) {
                starts = positions;
            }
            if starts.len() < total {
                warn!(
                    "Placement: {} of {} players could not be seated",
                    total - starts.len(),
                    total
                );
            } else {
                info!("Placement: {total} start positions assigned");
            }
        }
    }

    attempt("discoveries", ctx.adapter.generate_discoveries(width, height, &starts));
    attempt("fertility", ctx.adapter.recalculate_fertility());
    attempt("advanced start regions", ctx.adapter.assign_advanced_start_regions());
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter};
    use crate::config::MapGenConfig;

    fn two_islands() -> MockAdapter {
        let mut adapter = MockAdapter::new(40, 20, 2);
        for y in 4..16 {
            for x in (6..14).chain(26..34) {
                adapter.set_terrain_type(x, y, 2);
            }
        }
        adapter
    }

    #[test]
    fn test_wonder_count() {
        let info = MapInfo {
            num_natural_wonders: 3,
            lake_generation_frequency: 5,
            players_west: 1,
            players_east: 1,
        };
        assert_eq!(natural_wonder_count(Some(&info), true), 4);
        assert_eq!(natural_wonder_count(Some(&info), false), 3);
        assert_eq!(natural_wonder_count(None, true), 1);
    }

    #[test]
    fn test_starts_use_default_bounds_without_landmass() {
        let mut adapter = two_islands();
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        let (west, east) = start_continents(&ctx);
        assert!(west.east < east.west);

        let starts = run_placement(&mut ctx);
        assert_eq!(starts.len(), 4);
        for &tile in &starts {
            let x = tile % 40;
            assert!((6..14).contains(&x) || (26..34).contains(&x));
        }
    }

    #[test]
    fn test_failures_do_not_stop_later_passes() {
        let mut adapter = two_islands()
            .fail_operation("add_natural_wonders")
            .fail_operation("assign_start_positions");
        let starts = {
            let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
            run_placement(&mut ctx)
        };
        assert!(starts.is_empty());
        assert_eq!(
            adapter.calls(),
            &[
                "add_natural_wonders",
                "add_floodplains",
                "generate_snow",
                "generate_resources",
                "assign_start_positions",
                "generate_discoveries",
                "recalculate_fertility",
                "assign_advanced_start_regions",
            ]
        );
    }

    #[test]
    fn test_missing_map_info_skips_starts() {
        let mut adapter = two_islands().with_map_info(None);
        let mut ctx = MapContext::new(&mut adapter, MapGenConfig::default()).unwrap();
        assert!(run_placement(&mut ctx).is_empty());
        drop(ctx);
        assert!(!adapter.calls().contains(&"assign_start_positions"));
    }
}
