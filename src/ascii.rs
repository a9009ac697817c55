//! ASCII rendering of generated maps
//!
//! Diagnostic views of host terrain and foundation tensors for the CLI.

use crate::adapter::EngineAdapter;
use crate::catalog::Catalog;
use crate::plates::{BoundaryType, PlateFields, PlateId};

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsciiMode {
    /// Water, land, hills, mountains and volcanoes
    Terrain,
    /// Plate ids
    Plates,
    /// Boundary type near plate edges
    Boundaries,
    /// Rainfall gradient on land
    Rainfall,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Terrain => "Terrain",
            AsciiMode::Plates => "Plates",
            AsciiMode::Boundaries => "Boundaries",
            AsciiMode::Rainfall => "Rainfall",
        }
    }

    pub fn all() -> &'static [AsciiMode] {
        &[
            AsciiMode::Terrain,
            AsciiMode::Plates,
            AsciiMode::Boundaries,
            AsciiMode::Rainfall,
        ]
    }
}

/// Terrain character for one tile
pub fn terrain_char(adapter: &dyn EngineAdapter, catalog: &Catalog, x: usize, y: usize) -> char {
    if adapter.get_feature_type(x, y) == Some(catalog.feature.volcano) {
        return '*';
    }
    if adapter.is_lake(x, y) {
        return 'o';
    }
    if adapter.is_water(x, y) {
        return if adapter.get_terrain_type(x, y) == catalog.terrain.coast {
            '.'
        } else {
            '~'
        };
    }
    if adapter.is_mountain(x, y) {
        '^'
    } else if adapter.get_terrain_type(x, y) == catalog.terrain.hill {
        'n'
    } else {
        '#'
    }
}

/// Rainfall character, 0..200 in ten steps
pub fn rainfall_char(rainfall: i32) -> char {
    const CHARS: &[char] = &['_', '.', '-', ':', ';', '=', '+', '#', '%', '@'];
    let idx = (rainfall.clamp(0, 199) as usize * CHARS.len()) / 200;
    CHARS[idx.min(CHARS.len() - 1)]
}

pub fn plate_char(plate_id: PlateId) -> char {
    if plate_id.is_none() {
        ' '
    } else {
        (b'A' + plate_id.0 % 26) as char
    }
}

/// Boundary character; tiles far from any boundary render blank.
pub fn boundary_char(boundary: BoundaryType, closeness: u8) -> char {
    if closeness < 128 {
        return ' ';
    }
    match boundary {
        BoundaryType::Convergent => '^',
        BoundaryType::Divergent => 'v',
        BoundaryType::Transform => '=',
        BoundaryType::None => '.',
    }
}

/// Render a map to ASCII string. Plate views fall back to terrain when no
/// plate tensors are given.
pub fn render_ascii_map(
    adapter: &dyn EngineAdapter,
    catalog: &Catalog,
    fields: Option<&PlateFields>,
    mode: AsciiMode,
) -> String {
    let (width, height) = (adapter.width(), adapter.height());
    let mut result = String::with_capacity((width + 1) * height);

    for y in 0..height {
        for x in 0..width {
            let ch = match (mode, fields) {
                (AsciiMode::Plates, Some(f)) => plate_char(*f.plate_id.get(x, y)),
                (AsciiMode::Boundaries, Some(f)) => {
                    boundary_char(*f.boundary_type.get(x, y), *f.boundary_closeness.get(x, y))
                }
                (AsciiMode::Rainfall, _) if !adapter.is_water(x, y) => {
                    rainfall_char(adapter.get_rainfall(x, y))
                }
                (AsciiMode::Rainfall, _) => '~',
                _ => terrain_char(adapter, catalog, x, y),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

pub fn terrain_legend() -> String {
    "~ ocean  . coast  o lake  # flat  n hill  ^ mountain  * volcano".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockAdapter;

    #[test]
    fn test_rainfall_chars_span_range() {
        assert_eq!(rainfall_char(-5), '_');
        assert_eq!(rainfall_char(0), '_');
        assert_eq!(rainfall_char(100), '=');
        assert_eq!(rainfall_char(200), '@');
    }

    #[test]
    fn test_boundary_char() {
        assert_eq!(boundary_char(BoundaryType::Convergent, 255), '^');
        assert_eq!(boundary_char(BoundaryType::Divergent, 200), 'v');
        assert_eq!(boundary_char(BoundaryType::Convergent, 10), ' ');
        assert_eq!(plate_char(PlateId::NONE), ' ');
        assert_eq!(plate_char(PlateId(27)), 'B');
    }

    #[test]
    fn test_render_terrain() {
        let mut adapter = MockAdapter::new(4, 2, 1);
        adapter.set_terrain_type(1, 0, 2);
        adapter.set_terrain_type(2, 0, 0);
        adapter.set_terrain_type(3, 1, 3);
        let catalog = Catalog::from_adapter(&adapter).unwrap();
        adapter.set_feature_type(0, 1, catalog.feature.volcano);

        let map = render_ascii_map(&adapter, &catalog, None, AsciiMode::Terrain);
        assert_eq!(map, "~#^~\n*~~.\n");
        // No tensors: plate view shows terrain.
        assert_eq!(render_ascii_map(&adapter, &catalog, None, AsciiMode::Plates), map);
    }
}
