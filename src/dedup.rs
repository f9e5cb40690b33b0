//! Spatial deduplication of registered reference points.
//!
//! Every reference coordinate handed to the model passes through a
//! [`PointIndex`], which either returns the handle of a previously
//! registered point within the merge tolerance or allocates the next
//! handle. Handles are dense indices into the node arena, issued in
//! registration order.

use std::collections::HashMap;

/// Grid-based index mapping 3D points to node handles.
///
/// Space is divided into uniform cubic cells with edge length equal to the
/// merge tolerance, so any point within tolerance of a query lies in the
/// query's cell or one of its 26 neighbors.
#[derive(Debug)]
pub struct PointIndex {
    tolerance: f64,
    /// Inverse cell size for fast coordinate-to-cell conversion.
    inv_cell_size: f64,
    /// Map from cell coordinates to handles of points stored in that cell.
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
    /// Registered points in handle order.
    points: Vec<[f64; 3]>,
}

impl PointIndex {
    /// Creates an empty index with the given merge tolerance.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance` is not finite and strictly positive.
    pub fn new(tolerance: f64) -> Self {
        assert!(
            tolerance.is_finite() && tolerance > 0.,
            "merge tolerance must be finite and positive"
        );
        Self {
            tolerance,
            inv_cell_size: 1. / tolerance,
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    /// Merge tolerance the index was created with.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of distinct points registered so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Registered points in handle order.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Returns the handle for `p`, merging with the earliest registered
    /// point at distance `<= tolerance` or allocating a new handle.
    pub fn resolve(&mut self, p: [f64; 3]) -> usize {
        let tol_sq = self.tolerance * self.tolerance;
        let (cx, cy, cz) = self.cell_coords(p);

        let mut best: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(handles) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &h in handles {
                        let q = self.points[h];
                        let dist_sq = (p[0] - q[0]).powi(2)
                            + (p[1] - q[1]).powi(2)
                            + (p[2] - q[2]).powi(2);
                        // Ties across cells go to the earliest handle.
                        if dist_sq <= tol_sq && best.map_or(true, |b| h < b) {
                            best = Some(h);
                        }
                    }
                }
            }
        }

        match best {
            Some(h) => h,
            None => {
                let h = self.points.len();
                self.points.push(p);
                self.cells.entry((cx, cy, cz)).or_default().push(h);
                h
            }
        }
    }

    fn cell_coords(&self, p: [f64; 3]) -> (i64, i64, i64) {
        (
            (p[0] * self.inv_cell_size).floor() as i64,
            (p[1] * self.inv_cell_size).floor() as i64,
            (p[2] * self.inv_cell_size).floor() as i64,
        )
    }
}
