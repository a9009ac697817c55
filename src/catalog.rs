//! Host catalog lookup.
//!
//! Terrain, biome and feature indices are resolved by name once per run from
//! the adapter's enumerated catalogs. A missing required name is an error.

use std::collections::HashMap;
use std::fmt;

use crate::adapter::EngineAdapter;
use crate::error::{MapGenError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Terrain,
    Biome,
    Feature,
}

impl CatalogKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::Biome => "biome",
            Self::Feature => "feature",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainIds {
    pub mountain: u8,
    pub hill: u8,
    pub flat: u8,
    pub coast: u8,
    pub ocean: u8,
    pub navigable_river: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiomeIds {
    pub tundra: u8,
    pub grassland: u8,
    pub tropical: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureIds {
    pub reef: u8,
    pub forest: u8,
    pub rainforest: u8,
    pub taiga: u8,
    pub volcano: u8,
}

/// Name to index tables plus the ids the generator needs.
#[derive(Clone, Debug)]
pub struct Catalog {
    tables: HashMap<CatalogKind, HashMap<String, u8>>,
    pub terrain: TerrainIds,
    pub biome: BiomeIds,
    pub feature: FeatureIds,
}

fn table(names: Vec<String>) -> HashMap<String, u8> {
    names
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i <= u8::MAX as usize)
        .map(|(i, name)| (name, i as u8))
        .collect()
}

fn require(
    tables: &HashMap<CatalogKind, HashMap<String, u8>>,
    kind: CatalogKind,
    name: &str,
) -> Result<u8> {
    tables
        .get(&kind)
        .and_then(|t| t.get(name))
        .copied()
        .ok_or_else(|| MapGenError::MissingCatalogEntry {
            kind: kind.label(),
            name: name.to_string(),
        })
}

impl Catalog {
    pub fn from_adapter(adapter: &dyn EngineAdapter) -> Result<Self> {
        Self::from_names(
            adapter.terrain_names(),
            adapter.biome_names(),
            adapter.feature_names(),
        )
    }

    fn from_names(
        terrain: Vec<String>,
        biome: Vec<String>,
        feature: Vec<String>,
    ) -> Result<Self> {
        let mut tables = HashMap::new();
        tables.insert(CatalogKind::Terrain, table(terrain));
        tables.insert(CatalogKind::Biome, table(biome));
        tables.insert(CatalogKind::Feature, table(feature));

        use CatalogKind::*;
        let terrain = TerrainIds {
            mountain: require(&tables, Terrain, "TERRAIN_MOUNTAIN")?,
            hill: require(&tables, Terrain, "TERRAIN_HILL")?,
            flat: require(&tables, Terrain, "TERRAIN_FLAT")?,
            coast: require(&tables, Terrain, "TERRAIN_COAST")?,
            ocean: require(&tables, Terrain, "TERRAIN_OCEAN")?,
            navigable_river: require(&tables, Terrain, "TERRAIN_NAVIGABLE_RIVER")?,
        };
        let biome = BiomeIds {
            tundra: require(&tables, Biome, "BIOME_TUNDRA")?,
            grassland: require(&tables, Biome, "BIOME_GRASSLAND")?,
            tropical: require(&tables, Biome, "BIOME_TROPICAL")?,
        };
        let feature = FeatureIds {
            reef: require(&tables, Feature, "FEATURE_REEF")?,
            forest: require(&tables, Feature, "FEATURE_FOREST")?,
            rainforest: require(&tables, Feature, "FEATURE_RAINFOREST")?,
            taiga: require(&tables, Feature, "FEATURE_TAIGA")?,
            volcano: require(&tables, Feature, "FEATURE_VOLCANO")?,
        };

        Ok(Self {
            tables,
            terrain,
            biome,
            feature,
        })
    }

    /// Look up any catalog entry by name.
    pub fn lookup(&self, kind: CatalogKind, name: &str) -> Result<u8> {
        require(&self.tables, kind, name)
    }
}
