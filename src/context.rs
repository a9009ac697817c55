//! Per-run map context.
//!
//! Owns everything one generation run mutates besides the host map itself:
//! the foundation [`WorldModel`], heightfield and climate buffers mirroring
//! what has been written to the host, story tags, and the labelled random
//! counters. Stages borrow the context mutably for the duration of one call.

use std::collections::HashMap;

use crate::adapter::EngineAdapter;
use crate::catalog::Catalog;
use crate::config::MapGenConfig;
use crate::dynamics::fallback_latitude;
use crate::error::{MapGenError, Result};
use crate::landmass::LandmassResult;
use crate::plates::PlateFields;
use crate::story::StoryTags;
use crate::tilemap::Tilemap;
use crate::world::WorldModel;

/// Upper bound of the host rainfall scale.
pub const MAX_RAINFALL: i32 = 200;

/// Terrain, elevation and land mask as last written.
#[derive(Clone, Debug)]
pub struct Heightfield {
    pub elevation: Tilemap<i16>,
    pub terrain: Tilemap<u8>,
    /// 1 for land, 0 for water
    pub land_mask: Tilemap<u8>,
}

impl Heightfield {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            elevation: Tilemap::new(width, height),
            terrain: Tilemap::new(width, height),
            land_mask: Tilemap::new(width, height),
        }
    }

    pub fn land_count(&self) -> usize {
        self.land_mask.as_slice().iter().filter(|&&v| v != 0).count()
    }
}

/// Rainfall (0..200) and humidity (0..255) as last written.
#[derive(Clone, Debug)]
pub struct ClimateField {
    pub rainfall: Tilemap<u8>,
    pub humidity: Tilemap<u8>,
}

impl ClimateField {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rainfall: Tilemap::new(width, height),
            humidity: Tilemap::new(width, height),
        }
    }
}

/// Fields to write at one tile. `None` leaves the value untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeightfieldWrite {
    pub terrain: Option<u8>,
    pub elevation: Option<i32>,
    pub is_land: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ClimateWrite {
    pub rainfall: Option<i32>,
    pub humidity: Option<i32>,
}

pub struct MapContext<'a> {
    pub width: usize,
    pub height: usize,
    pub adapter: &'a mut dyn EngineAdapter,
    pub config: MapGenConfig,
    pub catalog: Catalog,
    /// Foundation snapshot; `None` until the foundation stage succeeds.
    pub world: Option<WorldModel>,
    /// Landmass windows and mask; `None` until the landmass stage succeeds.
    pub landmass: Option<LandmassResult>,
    pub heightfield: Heightfield,
    pub climate: ClimateField,
    pub story: StoryTags,
    label_counts: HashMap<String, u32>,
}

impl<'a> MapContext<'a> {
    pub fn new(adapter: &'a mut dyn EngineAdapter, config: MapGenConfig) -> Result<Self> {
        let width = adapter.width();
        let height = adapter.height();
        if width == 0 || height == 0 {
            return Err(MapGenError::InvalidDimensions { width, height });
        }
        let catalog = Catalog::from_adapter(&*adapter)?;

        Ok(Self {
            width,
            height,
            adapter,
            config,
            catalog,
            world: None,
            landmass: None,
            heightfield: Heightfield::new(width, height),
            climate: ClimateField::new(width, height),
            story: StoryTags::new(),
            label_counts: HashMap::new(),
        })
    }

    /// The foundation snapshot, or [`MapGenError::MissingFoundation`].
    pub fn foundation(&self) -> Result<&WorldModel> {
        self.world.as_ref().ok_or(MapGenError::MissingFoundation)
    }

    /// Plate tensors, when the foundation exists and covers this map.
    pub fn plate_fields(&self) -> Option<&PlateFields> {
        let world = self.world.as_ref()?;
        if world.width() != self.width || world.height() != self.height {
            return None;
        }
        world.validate().ok()?;
        Some(world.fields())
    }

    /// Host random draw. The n-th draw under a label (from 0) is sent to the
    /// host as `"{label}_{n}"`.
    pub fn random(&mut self, label: &str, max: i32) -> i32 {
        let count = self.label_counts.entry(label.to_string()).or_insert(0);
        let tagged = format!("{label}_{count}");
        *count += 1;
        self.adapter.get_random_number(max, &tagged)
    }

    /// One-in-`den` chance. Non-positive denominators never fire.
    pub fn roll(&mut self, label: &str, den: i32) -> bool {
        den > 0 && self.random(label, den) == 0
    }

    /// Host latitude, falling back to a linear estimate.
    pub fn latitude(&self, x: usize, y: usize) -> f64 {
        let lat = self.adapter.get_latitude(x, y);
        if lat.is_finite() {
            lat
        } else {
            fallback_latitude(y, self.height)
        }
    }

    pub fn is_water(&self, x: usize, y: usize) -> bool {
        self.adapter.is_water(x, y)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Land with water among its eight neighbors.
    pub fn is_coastal_land(&self, x: usize, y: usize) -> bool {
        if self.is_water(x, y) {
            return false;
        }
        self.any_within(x, y, 1, |nx, ny| self.is_water(nx, ny))
    }

    /// Water with land among its eight neighbors.
    pub fn is_adjacent_to_land(&self, x: usize, y: usize, radius: i32) -> bool {
        self.any_within(x, y, radius, |nx, ny| !self.is_water(nx, ny))
    }

    /// Land next to water the host paints as shallow coast.
    pub fn is_adjacent_to_shallow_water(&self, x: usize, y: usize) -> bool {
        let coast = self.catalog.terrain.coast;
        !self.is_water(x, y)
            && self.any_within(x, y, 1, |nx, ny| {
                self.is_water(nx, ny) && self.adapter.get_terrain_type(nx, ny) == coast
            })
    }

    /// Whether `pred` holds for any tile within a Chebyshev radius, excluding
    /// the center. Columns wrap around the map; rows stop at the poles.
    pub fn any_within(
        &self,
        x: usize,
        y: usize,
        radius: i32,
        pred: impl Fn(usize, usize) -> bool,
    ) -> bool {
        let w = self.width as i64;
        for dy in -radius..=radius {
            let ny = y as i64 + dy as i64;
            if ny < 0 || ny >= self.height as i64 {
                continue;
            }
            for dx in -radius..=radius {
                let nx = (x as i64 + dx as i64).rem_euclid(w) as usize;
                if dy == 0 && nx == x {
                    continue;
                }
                if pred(nx, ny as usize) {
                    return true;
                }
            }
        }
        false
    }

    /// Update the heightfield buffers and mirror terrain/elevation to the host.
    pub fn write_heightfield(&mut self, x: usize, y: usize, write: HeightfieldWrite) {
        if let Some(terrain) = write.terrain {
            self.heightfield.terrain.set(x, y, terrain);
            self.adapter.set_terrain_type(x, y, terrain);
        }
        if let Some(elevation) = write.elevation {
            let clamped = elevation.clamp(i16::MIN as i32, i16::MAX as i32);
            self.heightfield.elevation.set(x, y, clamped as i16);
            self.adapter.set_elevation(x, y, elevation);
        }
        if let Some(is_land) = write.is_land {
            self.heightfield.land_mask.set(x, y, is_land as u8);
        }
    }

    /// Update the climate buffers; rainfall is clamped to 0..200 and mirrored
    /// to the host.
    pub fn write_climate(&mut self, x: usize, y: usize, write: ClimateWrite) {
        if let Some(rainfall) = write.rainfall {
            let rf = rainfall.clamp(0, MAX_RAINFALL);
            self.climate.rainfall.set(x, y, rf as u8);
            self.adapter.set_rainfall(x, y, rf);
        }
        if let Some(humidity) = write.humidity {
            self.climate.humidity.set(x, y, humidity.clamp(0, 255) as u8);
        }
    }

    /// Pull terrain, elevation and land/water state back from the host.
    pub fn sync_heightfield(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let terrain = self.adapter.get_terrain_type(x, y);
                let elevation = self.adapter.get_elevation(x, y);
                let land = !self.adapter.is_water(x, y);
                self.heightfield.terrain.set(x, y, terrain);
                self.heightfield.elevation.set(
                    x,
                    y,
                    elevation.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
                );
                self.heightfield.land_mask.set(x, y, land as u8);
            }
        }
    }

    /// Pull rainfall back from the host.
    pub fn sync_climate(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let rf = self.adapter.get_rainfall(x, y).clamp(0, MAX_RAINFALL);
                self.climate.rainfall.set(x, y, rf as u8);
            }
        }
    }
}
