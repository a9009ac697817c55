//! Tectonic map generation library
//!
//! Builds strategy-game maps from a seeded plate simulation. Host engines
//! plug in through [`adapter::EngineAdapter`]; [`pipeline::MapOrchestrator`]
//! runs the stages.

pub mod adapter;
pub mod ascii;
pub mod biomes;
pub mod catalog;
pub mod climate;
pub mod coastline;
pub mod config;
pub mod context;
pub mod dynamics;
pub mod error;
pub mod features;
pub mod islands;
pub mod landmass;
pub mod pipeline;
pub mod placement;
pub mod plates;
pub mod relief;
pub mod seeds;
pub mod story;
pub mod tilemap;
pub mod volcanoes;
pub mod world;

pub use error::{MapGenError, Result};
pub use pipeline::{GenerationReport, MapOrchestrator, Stage, StageResult};
