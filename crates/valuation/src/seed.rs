use foundation::math::LatLng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default lat/lng quantization step (degrees), roughly 20 m.
pub const DEFAULT_GRID_DEG: f64 = 0.0002;

/// Independent random streams drawn from the same cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stream {
    LandValue,
    Tourism,
}

impl Stream {
    fn tag(self) -> u8 {
        match self {
            Stream::LandValue => 0x4c,
            Stream::Tourism => 0x54,
        }
    }
}

/// Grid cell containing a coordinate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub lat_index: i64,
    pub lng_index: i64,
}

impl GridCell {
    /// Representative coordinate of the cell.
    pub fn center(self, grid_deg: f64) -> LatLng {
        LatLng::new(self.lat_index as f64 * grid_deg, self.lng_index as f64 * grid_deg)
    }
}

/// Snaps a coordinate to the quantization grid.
pub fn quantize(lat: f64, lng: f64, grid_deg: f64) -> GridCell {
    GridCell {
        lat_index: (lat / grid_deg).round() as i64,
        lng_index: (lng / grid_deg).round() as i64,
    }
}

/// FNV-1a 64 over the cell indices and stream tag.
pub fn cell_seed(cell: GridCell, stream: Stream) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut state = OFFSET_BASIS;
    let bytes = cell
        .lat_index
        .to_le_bytes()
        .into_iter()
        .chain(cell.lng_index.to_le_bytes())
        .chain([stream.tag()]);
    for byte in bytes {
        state ^= byte as u64;
        state = state.wrapping_mul(PRIME);
    }
    state
}

/// Center of the cell containing `(lat, lng)`. Everything derived from a
/// coordinate is computed here so a cell has exactly one answer.
pub fn snap(lat: f64, lng: f64, grid_deg: f64) -> LatLng {
    quantize(lat, lng, grid_deg).center(grid_deg)
}

/// Seeded generator for the cell containing `(lat, lng)`.
pub fn cell_rng(lat: f64, lng: f64, grid_deg: f64, stream: Stream) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(cell_seed(quantize(lat, lng, grid_deg), stream))
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_GRID_DEG, Stream, cell_rng, cell_seed, quantize, snap};
    use rand::Rng;

    #[test]
    fn nearby_samples_share_a_cell() {
        let a = quantize(40.71234, -74.00567, DEFAULT_GRID_DEG);
        let b = quantize(40.71234 + 0.00003, -74.00567 - 0.00002, DEFAULT_GRID_DEG);
        assert_eq!(a, b);
        let c = quantize(40.71234 + 0.0004, -74.00567, DEFAULT_GRID_DEG);
        assert_ne!(a, c);
    }

    #[test]
    fn snapped_point_stays_in_its_cell() {
        let cell = quantize(40.71234, -74.00567, DEFAULT_GRID_DEG);
        let center = snap(40.71234, -74.00567, DEFAULT_GRID_DEG);
        assert_eq!(quantize(center.lat, center.lng, DEFAULT_GRID_DEG), cell);
        assert!((center.lat - 40.7124).abs() < 1e-9);
        assert!((center.lng + 74.0056).abs() < 1e-9);
    }

    #[test]
    fn streams_are_independent() {
        let cell = quantize(40.7, -74.0, DEFAULT_GRID_DEG);
        assert_ne!(
            cell_seed(cell, Stream::LandValue),
            cell_seed(cell, Stream::Tourism)
        );
    }

    #[test]
    fn rng_is_reproducible() {
        let a: f64 = cell_rng(40.7, -74.0, DEFAULT_GRID_DEG, Stream::LandValue).r#gen();
        let b: f64 = cell_rng(40.7, -74.0, DEFAULT_GRID_DEG, Stream::LandValue).r#gen();
        assert_eq!(a.to_bits(), b.to_bits());
        assert!((0.0..1.0).contains(&a));
    }

    #[test]
    fn draws_are_roughly_uniform() {
        let mut buckets = [0usize; 10];
        for i in 0..2_000 {
            let lat = 40.5 + i as f64 * DEFAULT_GRID_DEG;
            let u: f64 = cell_rng(lat, -74.0, DEFAULT_GRID_DEG, Stream::Tourism).r#gen();
            buckets[(u * 10.0) as usize] += 1;
        }
        for count in buckets {
            assert!((120..=280).contains(&count), "bucket count {count}");
        }
    }
}
