//! Mountains and hills from plate physics.
//!
//! Mountains appear wherever the physics score clears a threshold; there is
//! no quota. Scores are gated on boundary closeness, so plate interiors stay
//! low no matter how much uplift noise they carry. Without plate tensors the
//! two host fractals are used as scores directly.

use log::{debug, warn};

use crate::coastline::HILL_FRACTAL;
use crate::config::MountainsConfig;
use crate::context::{HeightfieldWrite, MapContext};
use crate::error::Result;
use crate::plates::{BoundaryType, PlateFields};
use crate::tilemap::Tilemap;

pub const MOUNTAIN_FRACTAL: u32 = 0;
const RELIEF_GRAIN: u32 = 5;
/// Tiles with normalized closeness below this never score as mountains.
const BOUNDARY_GATE: f64 = 0.35;

/// Map a raw host fractal sample to 0..1. Hosts return 8, 16 or 32 bit values.
pub fn normalize_fractal(raw: u32) -> f64 {
    if raw > 65_535 {
        (raw >> 24) as f64 / 255.0
    } else if raw > 255 {
        (raw >> 8) as f64 / 255.0
    } else {
        raw as f64 / 255.0
    }
}

#[derive(Clone, Debug)]
pub struct ReliefScores {
    pub mountain: Tilemap<f64>,
    pub hill: Tilemap<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReliefSummary {
    pub mountains: usize,
    pub hills: usize,
    pub plate_driven: bool,
}

/// Config with tectonic intensity folded into the weights it scales.
fn scaled(cfg: &MountainsConfig) -> MountainsConfig {
    let k = cfg.tectonic_intensity;
    MountainsConfig {
        convergence_bonus: cfg.convergence_bonus * k,
        boundary_weight: cfg.boundary_weight * k,
        uplift_weight: cfg.uplift_weight * k,
        hill_boundary_weight: cfg.hill_boundary_weight * k,
        hill_convergent_foothill: cfg.hill_convergent_foothill * k,
        ..cfg.clone()
    }
}

pub fn plate_scores(
    fields: &PlateFields,
    mountain_noise: &Tilemap<f64>,
    hill_noise: &Tilemap<f64>,
    cfg: &MountainsConfig,
) -> ReliefScores {
    let cfg = scaled(cfg);
    let (width, height) = (mountain_noise.width, mountain_noise.height);
    let mut scores = ReliefScores {
        mountain: Tilemap::new_with(width, height, 0.0),
        hill: Tilemap::new_with(width, height, 0.0),
    };
    let exponent = if cfg.boundary_exponent > 0.0 {
        cfg.boundary_exponent
    } else {
        2.5
    };

    for y in 0..height {
        for x in 0..width {
            let uplift = *fields.uplift_potential.get(x, y) as f64 / 255.0;
            let closeness = *fields.boundary_closeness.get(x, y) as f64 / 255.0;
            let rift = *fields.rift_potential.get(x, y) as f64 / 255.0;
            let stress = *fields.tectonic_stress.get(x, y) as f64 / 255.0;
            let f_mtn = *mountain_noise.get(x, y);
            let f_hill = *hill_noise.get(x, y);

            if closeness < BOUNDARY_GATE {
                scores.hill.set(x, y, (f_hill * cfg.fractal_weight * 0.5).max(0.0));
                continue;
            }

            let strength = ((closeness - BOUNDARY_GATE) / (1.0 - BOUNDARY_GATE)).powf(exponent);
            let btype = *fields.boundary_type.get(x, y);
            let of = |t: BoundaryType| if btype == t { strength } else { 0.0 };
            let (collision, transform, divergence) = (
                of(BoundaryType::Convergent),
                of(BoundaryType::Transform),
                of(BoundaryType::Divergent),
            );

            let mut mountain = collision * cfg.boundary_weight * (0.7 * stress + 0.3 * uplift)
                + uplift * cfg.uplift_weight * 0.4
                + f_mtn * cfg.fractal_weight * 0.2;
            if collision > 0.0 {
                mountain += collision * cfg.convergence_bonus * (0.6 + f_mtn * 0.2);
            }
            if divergence > 0.0 {
                mountain *= (1.0 - divergence * cfg.rift_penalty).max(0.0);
            }
            if transform > 0.0 {
                mountain *= (1.0 - transform * cfg.transform_penalty).max(0.0);
            }
            scores.mountain.set(x, y, mountain.max(0.0));

            let intensity = strength.sqrt();
            let extent = 0.5 + f_hill * 0.5;
            let mut hill = f_hill * cfg.fractal_weight * 0.8 + uplift * cfg.hill_uplift_weight * 0.3;
            if collision > 0.0 && cfg.hill_boundary_weight > 0.0 {
                hill += intensity * cfg.hill_boundary_weight * extent;
                hill += intensity * cfg.hill_convergent_foothill * extent;
            }
            if divergence > 0.0 {
                hill += intensity * rift * cfg.hill_rift_bonus * extent * 0.5;
            }
            scores.hill.set(x, y, hill.max(0.0));
        }
    }

    if cfg.rift_depth > 0.0 {
        apply_rift_depressions(&mut scores, fields, cfg.rift_depth);
    }
    scores
}

/// Fallback scoring straight from the two fractals.
pub fn fractal_scores(mountain_noise: &Tilemap<f64>, hill_noise: &Tilemap<f64>) -> ReliefScores {
    ReliefScores {
        mountain: mountain_noise.clone(),
        hill: hill_noise.clone(),
    }
}

fn apply_rift_depressions(scores: &mut ReliefScores, fields: &PlateFields, depth: f64) {
    for (x, y, &btype) in fields.boundary_type.iter() {
        if btype != BoundaryType::Divergent {
            continue;
        }
        let depression = *fields.rift_potential.get(x, y) as f64 / 255.0 * depth;
        let m = scores.mountain.get_mut(x, y);
        *m = (*m - depression).max(0.0);
        let h = scores.hill.get_mut(x, y);
        *h = (*h - depression * 0.5).max(0.0);
    }
}

/// Land tiles scoring strictly above `threshold`, skipping `exclude`.
pub fn select_above(
    scores: &Tilemap<f64>,
    land_mask: &Tilemap<u8>,
    threshold: f64,
    exclude: &[(usize, usize)],
) -> Vec<(usize, usize)> {
    let mut skip = Tilemap::new_with(scores.width, scores.height, false);
    for &(x, y) in exclude {
        skip.set(x, y, true);
    }
    scores
        .iter()
        .filter(|&(x, y, &s)| *land_mask.get(x, y) != 0 && !*skip.get(x, y) && s > threshold)
        .map(|(x, y, _)| (x, y))
        .collect()
}

fn sample_fractal(ctx: &MapContext<'_>, id: u32) -> Tilemap<f64> {
    let mut out = Tilemap::new_with(ctx.width, ctx.height, 0.0);
    for (x, y, v) in out.iter_mut() {
        *v = normalize_fractal(ctx.adapter.get_fractal_height(id, x, y));
    }
    out
}

/// Score, select and write mountains, then hills on the remaining land.
pub fn add_mountains(ctx: &mut MapContext<'_>) -> Result<ReliefSummary> {
    let (width, height) = (ctx.width, ctx.height);
    ctx.adapter
        .create_fractal(MOUNTAIN_FRACTAL, width, height, RELIEF_GRAIN, 0)?;
    ctx.adapter
        .create_fractal(HILL_FRACTAL, width, height, RELIEF_GRAIN, 0)?;

    let mountain_noise = sample_fractal(ctx, MOUNTAIN_FRACTAL);
    let hill_noise = sample_fractal(ctx, HILL_FRACTAL);
    let cfg = ctx.config.mountains.clone();

    let (scores, plate_driven) = match ctx.plate_fields() {
        Some(fields) => (plate_scores(fields, &mountain_noise, &hill_noise, &cfg), true),
        None => {
            warn!("Mountains: plate tensors unavailable, using fractal-only scores");
            (fractal_scores(&mountain_noise, &hill_noise), false)
        }
    };

    let mountains = select_above(
        &scores.mountain,
        &ctx.heightfield.land_mask,
        cfg.mountain_threshold,
        &[],
    );
    let hills = select_above(
        &scores.hill,
        &ctx.heightfield.land_mask,
        cfg.hill_threshold,
        &mountains,
    );

    let terrain = ctx.catalog.terrain;
    for &(x, y) in &mountains {
        ctx.write_heightfield(
            x,
            y,
            HeightfieldWrite {
                terrain: Some(terrain.mountain),
                is_land: Some(true),
                ..Default::default()
            },
        );
    }
    for &(x, y) in &hills {
        ctx.write_heightfield(
            x,
            y,
            HeightfieldWrite {
                terrain: Some(terrain.hill),
                is_land: Some(true),
                ..Default::default()
            },
        );
    }

    let summary = ReliefSummary {
        mountains: mountains.len(),
        hills: hills.len(),
        plate_driven,
    };
    debug!(
        "Mountains: {} mountains, {} hills (plate driven: {})",
        summary.mountains, summary.hills, summary.plate_driven
    );
    Ok(summary)
}
