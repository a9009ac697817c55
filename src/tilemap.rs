/// A 2D tilemap grid that wraps horizontally (cylindrical map).
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// Odd-q hex neighbor offsets for odd columns.
const HEX_ODD: [(i32, i32); 6] = [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, 1), (1, 1)];
/// Odd-q hex neighbor offsets for even columns.
const HEX_EVEN: [(i32, i32); 6] = [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, -1)];

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major buffer. The buffer length is not checked,
    /// see [`Tilemap::is_complete`].
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        Self { width, height, data }
    }

    /// Get the index into the data array, handling horizontal wrapping.
    pub fn index(&self, x: usize, y: usize) -> usize {
        let x = x % self.width; // Wrap horizontally
        y * self.width + x
    }

    /// Inverse of [`Tilemap::index`].
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the backing buffer covers every tile exactly once.
    pub fn is_complete(&self) -> bool {
        !self.data.is_empty() && self.data.len() == self.width * self.height
    }

    /// Whether signed coordinates fall inside the map without wrapping.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Get neighbors with horizontal wrapping (4-connectivity).
    /// Top and bottom edges don't wrap.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);

        let left_x = if x == 0 { self.width - 1 } else { x - 1 };
        result.push((left_x, y));

        let right_x = if x == self.width - 1 { 0 } else { x + 1 };
        result.push((right_x, y));

        if y > 0 {
            result.push((x, y - 1));
        }

        if y < self.height - 1 {
            result.push((x, y + 1));
        }

        result
    }

    /// Get 8-connected neighbors with horizontal wrapping.
    /// Top and bottom edges don't wrap vertically.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = (x as i32 + dx).rem_euclid(self.width as i32) as usize;

                let ny = y as i32 + dy;
                if ny >= 0 && ny < self.height as i32 {
                    result.push((nx, ny as usize));
                }
            }
        }

        result
    }

    /// Hex neighbors in the odd-q offset layout. X wraps; neighbors above the
    /// top row or below the bottom row are dropped.
    pub fn hex_neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let offsets = if x & 1 == 1 { &HEX_ODD } else { &HEX_EVEN };
        let w = self.width as i32;
        let mut out = Vec::with_capacity(6);
        for (dx, dy) in offsets.iter() {
            let ny = y as i32 + dy;
            if ny < 0 || ny >= self.height as i32 {
                continue;
            }
            let nx = (x as i32 + dx).rem_euclid(w) as usize;
            out.push((nx, ny as usize));
        }
        out
    }

    /// Coordinates within a Chebyshev radius, excluding the center.
    /// Unlike the neighbor helpers this never wraps; tiles off the map are skipped.
    pub fn square_ring(&self, x: usize, y: usize, radius: i32) -> Vec<(usize, usize)> {
        let mut result = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if self.in_bounds(nx, ny) {
                    result.push((nx as usize, ny as usize));
                }
            }
        }
        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

/// Hex-projected center of a tile: columns are √3 apart, odd columns shift down by 3/4.
pub fn hex_project(x: f64, y: f64) -> (f64, f64) {
    let odd = (x.floor() as i64) & 1 == 1;
    let px = x * 3f64.sqrt();
    let py = y * 1.5 + if odd { 0.75 } else { 0.0 };
    (px, py)
}

/// Squared distance between two projected points on a map that wraps every `wrap_width`.
pub fn wrapped_dist_sq(ax: f64, ay: f64, bx: f64, by: f64, wrap_width: f64) -> f64 {
    let mut dx = (ax - bx).abs();
    if wrap_width > 0.0 {
        dx = dx.min(wrap_width - dx);
    }
    let dy = ay - by;
    dx * dx + dy * dy
}

/// Column distance on a map that wraps every `width` tiles.
pub fn wrapped_dx(a: usize, b: usize, width: usize) -> usize {
    let dx = a.abs_diff(b);
    if width > 0 {
        dx.min(width - dx % width)
    } else {
        dx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_wraps_horizontally() {
        let map: Tilemap<u8> = Tilemap::new(10, 5);
        assert_eq!(map.index(12, 1), map.index(2, 1));
        assert_eq!(map.coords(map.index(7, 3)), (7, 3));
    }

    #[test]
    fn test_hex_neighbors_odd_and_even_columns() {
        let map: Tilemap<u8> = Tilemap::new(8, 8);
        let odd = map.hex_neighbors(3, 4);
        assert!(odd.contains(&(2, 5)));
        assert!(odd.contains(&(4, 5)));
        let even = map.hex_neighbors(2, 4);
        assert!(even.contains(&(1, 3)));
        assert!(even.contains(&(3, 3)));
    }

    #[test]
    fn test_hex_neighbors_wrap_and_drop_off_map() {
        let map: Tilemap<u8> = Tilemap::new(6, 4);
        let n = map.hex_neighbors(0, 0);
        assert!(n.contains(&(5, 0)));
        assert!(n.contains(&(1, 0)));
        assert_eq!(n.len(), 3);
        assert_eq!(map.hex_neighbors(3, 2).len(), 6);
    }

    #[test]
    fn test_square_ring_does_not_wrap() {
        let map: Tilemap<u8> = Tilemap::new(10, 10);
        let ring = map.square_ring(0, 0, 1);
        assert_eq!(ring.len(), 3);
        assert_eq!(map.square_ring(5, 5, 2).len(), 24);
    }

    #[test]
    fn test_wrapped_distance_uses_short_way_round() {
        let wrap = 10.0 * 3f64.sqrt();
        let (ax, ay) = hex_project(0.0, 0.0);
        let (bx, by) = hex_project(9.0, 0.0);
        let d = wrapped_dist_sq(ax, ay, bx, by, wrap);
        assert!(d < 4.0, "expected neighbors across seam, got {d}");
    }

    #[test]
    fn test_wrapped_dx_crosses_seam() {
        assert_eq!(wrapped_dx(0, 9, 10), 1);
        assert_eq!(wrapped_dx(2, 7, 10), 5);
        assert_eq!(wrapped_dx(3, 4, 10), 1);
        assert_eq!(wrapped_dx(4, 4, 10), 0);
    }

    #[test]
    fn test_is_complete() {
        let ok: Tilemap<u8> = Tilemap::new(4, 4);
        assert!(ok.is_complete());
        let short = Tilemap::from_vec(4, 4, vec![0u8; 15]);
        assert!(!short.is_complete());
    }
}
