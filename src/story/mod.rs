//! Story overlays.
//!
//! Narrative tags are plain coordinate sets written by the overlay stages and
//! read by coasts, islands, relief, climate, biomes and features. Each run
//! starts from an empty set via [`StoryTags::reset`]. The swatch and paleo
//! passes write rainfall directly instead of tagging.

pub mod corridors;
pub mod hotspots;
pub mod margins;
pub mod orogeny;
pub mod paleo;
pub mod rifts;
pub mod swatches;

use std::collections::{HashMap, HashSet};

pub use corridors::{story_tag_strategic_corridors, CorridorPhase, CorridorStyle};
pub use hotspots::story_tag_hotspot_trails;
pub use margins::story_tag_continental_margins;
pub use orogeny::story_tag_orogeny_belts;
pub use paleo::story_tag_paleo_hydrology;
pub use rifts::story_tag_rift_valleys;
pub use swatches::story_tag_climate_swatches;

/// Tile coordinate used as a tag key.
pub type TileKey = (usize, usize);

/// Orogeny belts and their wind-relative flanks.
#[derive(Clone, Debug, Default)]
pub struct OrogenyCache {
    pub belts: HashSet<TileKey>,
    pub windward: HashSet<TileKey>,
    pub lee: HashSet<TileKey>,
}

impl OrogenyCache {
    pub fn clear(&mut self) {
        self.belts.clear();
        self.windward.clear();
        self.lee.clear();
    }
}

#[derive(Clone, Debug, Default)]
pub struct StoryTags {
    /// Every tile on a hotspot trail
    pub hotspot: HashSet<TileKey>,
    /// Trail tiles marked for lush island chains
    pub hotspot_paradise: HashSet<TileKey>,
    /// Trail tiles marked for volcanic island chains
    pub hotspot_volcanic: HashSet<TileKey>,
    pub rift_line: HashSet<TileKey>,
    pub rift_shoulder: HashSet<TileKey>,
    /// Coastal land on convergent-style margins
    pub active_margin: HashSet<TileKey>,
    /// Coastal land on passive shelves
    pub passive_shelf: HashSet<TileKey>,
    pub orogeny: OrogenyCache,
    /// Open-water lanes kept clear of islands and rugged coast edits
    pub sea_lane: HashSet<TileKey>,
    /// Water around hotspot picks reserved for archipelago hops
    pub island_hop: HashSet<TileKey>,
    /// Land runs along rift shoulders
    pub land_corridor: HashSet<TileKey>,
    /// Riverside land following a river toward the coast
    pub river_corridor: HashSet<TileKey>,
    pub corridor_style: HashMap<TileKey, CorridorStyle>,
}

impl StoryTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.hotspot.clear();
        self.hotspot_paradise.clear();
        self.hotspot_volcanic.clear();
        self.rift_line.clear();
        self.rift_shoulder.clear();
        self.active_margin.clear();
        self.passive_shelf.clear();
        self.orogeny.clear();
        self.sea_lane.clear();
        self.island_hop.clear();
        self.land_corridor.clear();
        self.river_corridor.clear();
        self.corridor_style.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.hotspot.is_empty()
            && self.rift_line.is_empty()
            && self.rift_shoulder.is_empty()
            && self.active_margin.is_empty()
            && self.passive_shelf.is_empty()
            && self.orogeny.belts.is_empty()
            && self.sea_lane.is_empty()
            && self.island_hop.is_empty()
            && self.land_corridor.is_empty()
            && self.river_corridor.is_empty()
    }
}

/// `sqrt(area / 10000)` clamped to 0.6..2.0; scales story budgets with map size.
pub fn size_scale(width: usize, height: usize) -> f64 {
    let area = (width * height).max(1) as f64;
    (area / 10_000.0).sqrt().clamp(0.6, 2.0)
}
