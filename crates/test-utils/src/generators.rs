//! Synthetic grids and raw `.grd` payloads.
//!
//! Grids here are row-major with row 0 at the northern edge, the layout
//! produced by the decoder. The payload helpers turn them into the bytes a
//! download would contain.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a temperature-like grid in degrees Celsius.
///
/// Values run from about 15°C in the north-west corner to 45°C in the
/// south-east, roughly the summer range over India.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(15.0 + x_factor * 15.0 + y_factor * 15.0);
        }
    }
    data
}

/// Creates a grid with precipitation-like values in mm.
///
/// Most cells are dry; about one in four carries up to 50 mm. Deterministic
/// for a given `seed`.
pub fn create_precipitation_grid(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let precip = if hash % 4 == 0 {
                (hash % 5000) as f32 / 100.0
            } else {
                0.0
            };
            data.push(precip);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Replaces the cells at `(col, row)` positions with a fill value.
///
/// Out-of-range positions are ignored.
pub fn with_fill_cells(
    mut data: Vec<f32>,
    width: usize,
    height: usize,
    fill_value: f32,
    positions: &[(usize, usize)],
) -> Vec<f32> {
    for &(col, row) in positions {
        if col < width && row < height {
            data[row * width + col] = fill_value;
        }
    }
    data
}

/// Reverses the row order of a row-major grid.
pub fn flip_rows(data: &[f32], width: usize) -> Vec<f32> {
    data.chunks(width).rev().flatten().copied().collect()
}

/// Serializes values as little-endian `f32`, the `.grd` byte layout.
pub fn encode_grd_payload(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Payload for a north-up grid stored with the southern row first.
pub fn south_up_payload(north_up: &[f32], width: usize) -> Vec<u8> {
    encode_grd_payload(&flip_rows(north_up, width))
}
