//! Affine pixel-to-world transforms.

use serde::{Deserialize, Serialize};

/// Maps pixel `(col, row)` to world `(x, y)`:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Coefficients follow the rasterio/Affine ordering. `(col, row)` addresses
/// the pixel's upper-left corner, so `(col + 0.5, row + 0.5)` is its centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    /// North-up transform with the upper-left corner at `(west, north)`.
    pub fn from_origin(west: f64, north: f64, x_size: f64, y_size: f64) -> Self {
        Self {
            a: x_size,
            b: 0.0,
            c: west,
            d: 0.0,
            e: -y_size,
            f: north,
        }
    }

    /// World coordinates of a pixel corner.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// World coordinates of the centre of pixel `(col, row)`.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Pixel containing a world coordinate, or `None` for a degenerate or
    /// rotated transform.
    pub fn pixel_at(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.b != 0.0 || self.d != 0.0 || self.a == 0.0 || self.e == 0.0 {
            return None;
        }
        Some(((x - self.c) / self.a, (y - self.f) / self.e))
    }

    /// Coefficients in GDAL GeoTransform order `(c, a, b, f, d, e)`.
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    pub fn is_north_up(&self) -> bool {
        self.b == 0.0 && self.d == 0.0 && self.e < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_origin() {
        let t = AffineTransform::from_origin(66.375, 38.625, 0.25, 0.25);
        assert_eq!(t.apply(0.0, 0.0), (66.375, 38.625));
        assert_eq!(t.pixel_center(0, 0), (66.5, 38.5));
        assert!(t.is_north_up());
    }

    #[test]
    fn test_gdal_order() {
        let t = AffineTransform::from_origin(10.0, 20.0, 1.0, 2.0);
        assert_eq!(t.to_gdal(), [10.0, 1.0, 0.0, 20.0, 0.0, -2.0]);
    }

    #[test]
    fn test_pixel_at_inverts_apply() {
        let t = AffineTransform::from_origin(67.0, 38.0, 1.0, 1.0);
        let (x, y) = t.pixel_center(4, 7);
        let (col, row) = t.pixel_at(x, y).unwrap();
        assert_eq!((col, row), (4.5, 7.5));
    }

    #[test]
    fn test_pixel_at_rotated_is_none() {
        let mut t = AffineTransform::from_origin(0.0, 0.0, 1.0, 1.0);
        t.b = 0.1;
        assert!(t.pixel_at(0.0, 0.0).is_none());
    }
}
