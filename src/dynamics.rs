//! Atmospheric and mantle fields.
//!
//! These are independent of plate geometry: pressure is a sum of random
//! Gaussian bumps, winds and currents are banded by latitude.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::{MantleConfig, WindConfig};
use crate::plates::boundaries::{clamp_i8, to_byte};
use crate::tilemap::Tilemap;

/// Wind, current and pressure tensors.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicsFields {
    /// Zonal wind, positive east.
    pub wind_u: Tilemap<i8>,
    /// Meridional wind, positive north.
    pub wind_v: Tilemap<i8>,
    pub current_u: Tilemap<i8>,
    pub current_v: Tilemap<i8>,
    /// Mantle pressure, 0..255.
    pub pressure: Tilemap<u8>,
}

impl DynamicsFields {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            wind_u: Tilemap::new(width, height),
            wind_v: Tilemap::new(width, height),
            current_u: Tilemap::new(width, height),
            current_v: Tilemap::new(width, height),
            pressure: Tilemap::new(width, height),
        }
    }

    pub fn tensor_lengths(&self) -> [(&'static str, usize); 5] {
        [
            ("windU", self.wind_u.len()),
            ("windV", self.wind_v.len()),
            ("currentU", self.current_u.len()),
            ("currentV", self.current_v.len()),
            ("pressure", self.pressure.len()),
        ]
    }
}

/// Latitude estimate used when the host cannot answer.
pub fn fallback_latitude(y: usize, height: usize) -> f64 {
    ((y as f64 / height.max(1) as f64) * 180.0 - 90.0) * -1.0
}

/// Normalized sum of Gaussian pressure bumps.
pub fn compute_pressure(
    width: usize,
    height: usize,
    cfg: &MantleConfig,
    rng: &mut ChaCha8Rng,
) -> Tilemap<u8> {
    let mut pressure = Tilemap::new(width, height);
    if width == 0 || height == 0 {
        return pressure;
    }

    let sigma = 4.max((width.min(height) as f64 * cfg.scale).floor() as i64);
    let inv_2s2 = 1.0 / (2.0 * (sigma * sigma) as f64);

    let centers: Vec<(i64, i64, f64)> = (0..cfg.bumps)
        .map(|_| {
            let cx = rng.gen_range(0..width) as i64;
            let cy = rng.gen_range(0..height) as i64;
            let a = cfg.amplitude * (0.75 + rng.gen_range(0..50) as f64 / 100.0);
            (cx, cy, a)
        })
        .collect();

    let mut acc: Tilemap<f64> = Tilemap::new(width, height);
    let mut max_val = 1e-6f64;
    for &(cx, cy, a) in &centers {
        let y_min = (cy - sigma * 2).max(0);
        let y_max = (cy + sigma * 2).min(height as i64 - 1);
        let x_min = (cx - sigma * 2).max(0);
        let x_max = (cx + sigma * 2).min(width as i64 - 1);
        for y in y_min..=y_max {
            let dy = y - cy;
            for x in x_min..=x_max {
                let dx = x - cx;
                let v = a * (-((dx * dx + dy * dy) as f64) * inv_2s2).exp();
                let cell = acc.get_mut(x as usize, y as usize);
                *cell += v;
                max_val = max_val.max(*cell);
            }
        }
    }

    for (x, y, &v) in acc.iter() {
        pressure.set(x, y, to_byte(v / max_val));
    }
    pressure
}

/// Zonal wind bands with jet streak amplification and per-row variance.
///
/// `latitude` is queried once per row with the row index.
pub fn compute_winds(
    width: usize,
    height: usize,
    cfg: &WindConfig,
    latitude: impl Fn(usize) -> f64,
    rng: &mut ChaCha8Rng,
) -> (Tilemap<i8>, Tilemap<i8>) {
    let mut wind_u = Tilemap::new(width, height);
    let mut wind_v = Tilemap::new(width, height);

    let streaks = cfg.jet_streaks as f64;
    let streak_lats: Vec<f64> = (0..cfg.jet_streaks)
        .map(|s| {
            let base = 30.0 + s as f64 * (30.0 / (streaks - 1.0).max(1.0));
            let jitter = rng.gen_range(0..12) as f64 - 6.0;
            (base + jitter).clamp(15.0, 75.0)
        })
        .collect();

    for y in 0..height {
        let lat = latitude(y).abs();
        let mut u: f64 = if !(30.0..60.0).contains(&lat) { -80.0 } else { 80.0 };

        for &streak in &streak_lats {
            let f = (1.0 - (lat - streak).abs() / 12.0).max(0.0);
            if f > 0.0 {
                let boost = (32.0 * cfg.jet_strength * f).round();
                u += if lat < streak { boost } else { -boost };
            }
        }

        let var_u = ((rng.gen_range(0..21) - 10) as f64 * cfg.variance).round();
        let var_v = ((rng.gen_range(0..11) - 5) as f64 * cfg.variance).round();

        for x in 0..width {
            wind_u.set(x, y, clamp_i8(u + var_u));
            wind_v.set(x, y, clamp_i8(var_v));
        }
    }

    (wind_u, wind_v)
}

/// Banded ocean currents. Land tiles stay at rest.
pub fn compute_currents(
    width: usize,
    height: usize,
    latitude: impl Fn(usize) -> f64,
    is_water: impl Fn(usize, usize) -> bool,
) -> (Tilemap<i8>, Tilemap<i8>) {
    let mut current_u = Tilemap::new(width, height);
    let current_v = Tilemap::new(width, height);

    for y in 0..height {
        let lat = latitude(y).abs();
        let u: i8 = if lat < 12.0 {
            -50
        } else if (45.0..60.0).contains(&lat) {
            20
        } else if lat >= 60.0 {
            -15
        } else {
            0
        };
        for x in 0..width {
            if is_water(x, y) {
                current_u.set(x, y, u);
            }
        }
    }

    (current_u, current_v)
}
