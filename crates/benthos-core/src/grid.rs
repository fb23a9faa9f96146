use geo::{Contains, Point, Polygon};
use serde::{Deserialize, Serialize};

/// A regular grid of bathymetry or slope-gradient values, row-major `f32`.
/// Values follow the survey convention: metres, negative below the datum for
/// bathymetry; degrees for slope-gradient grids. Coordinate math uses f64.
///
/// Row 0 is the southernmost row; `origin_x`/`origin_y` locate the centre of
/// cell (0, 0). The grid is read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BathyGrid {
    /// Row-major cell values.
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// World coordinate of the centre of the lower-left cell.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Cell size in metres (square cells).
    pub cell_size: f64,
    /// Marker for cells with no sounding.
    pub nodata: f32,
}

impl BathyGrid {
    /// Create a grid filled with the given value.
    pub fn filled(
        width: usize,
        height: usize,
        origin_x: f64,
        origin_y: f64,
        cell_size: f64,
        fill: f32,
    ) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
            origin_x,
            origin_y,
            cell_size,
            nodata: -9999.0,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.width + col] = val;
    }

    #[inline]
    pub fn is_nodata(&self, v: f32) -> bool {
        v == self.nodata || !v.is_finite()
    }

    /// World coordinate of the centre of cell (row, col).
    #[inline]
    pub fn cell_centre(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.cell_size,
            self.origin_y + row as f64 * self.cell_size,
        )
    }

    /// Nearest-cell value at a world point.
    /// Returns None outside the grid or on a no-data cell.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f32> {
        let fx = (x - self.origin_x) / self.cell_size;
        let fy = (y - self.origin_y) / self.cell_size;
        let col = fx.round();
        let row = fy.round();
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }
        let v = self.get(row as usize, col as usize);
        if self.is_nodata(v) {
            None
        } else {
            Some(v)
        }
    }

    /// Values at every cell centre covered by the polygon. No-data cells and
    /// cells outside the polygon are skipped; an empty result means the grid
    /// does not cover the geometry.
    pub fn values_in(&self, poly: &Polygon<f64>) -> Vec<f32> {
        use geo::BoundingRect;

        let Some(rect) = poly.bounding_rect() else {
            return Vec::new();
        };
        let col_min = (((rect.min().x - self.origin_x) / self.cell_size).floor()).max(0.0) as usize;
        let row_min = (((rect.min().y - self.origin_y) / self.cell_size).floor()).max(0.0) as usize;
        let col_max = ((rect.max().x - self.origin_x) / self.cell_size).ceil();
        let row_max = ((rect.max().y - self.origin_y) / self.cell_size).ceil();
        if col_max < 0.0 || row_max < 0.0 {
            return Vec::new();
        }
        let col_max = (col_max as usize).min(self.width.saturating_sub(1));
        let row_max = (row_max as usize).min(self.height.saturating_sub(1));

        let mut values = Vec::new();
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                let v = self.get(row, col);
                if self.is_nodata(v) {
                    continue;
                }
                let (x, y) = self.cell_centre(row, col);
                if poly.contains(&Point::new(x, y)) {
                    values.push(v);
                }
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn value_at_returns_nearest_cell() {
        let mut g = BathyGrid::filled(4, 4, 0.0, 0.0, 10.0, -100.0);
        g.set(1, 2, -55.0);
        assert_eq!(g.value_at(21.0, 9.0), Some(-55.0));
        assert_eq!(g.value_at(0.0, 0.0), Some(-100.0));
    }

    #[test]
    fn value_at_outside_or_nodata_is_none() {
        let mut g = BathyGrid::filled(4, 4, 0.0, 0.0, 10.0, -100.0);
        g.set(0, 0, g.nodata);
        assert_eq!(g.value_at(-20.0, 0.0), None);
        assert_eq!(g.value_at(0.0, 0.0), None);
        assert_eq!(g.value_at(100.0, 100.0), None);
    }

    #[test]
    fn values_in_collects_covered_cells_only() {
        let mut g = BathyGrid::filled(10, 10, 0.0, 0.0, 1.0, -10.0);
        g.set(2, 2, g.nodata);
        let poly = polygon![
            (x: 1.5, y: 1.5),
            (x: 4.5, y: 1.5),
            (x: 4.5, y: 4.5),
            (x: 1.5, y: 4.5),
            (x: 1.5, y: 1.5),
        ];
        // 3x3 block of cell centres (2..=4, 2..=4) minus the one no-data cell.
        let vals = g.values_in(&poly);
        assert_eq!(vals.len(), 8);
        assert!(vals.iter().all(|&v| v == -10.0));
    }
}
