use crate::error::{ModelError, Result};
use crate::goals::{check_arity, Goal, GoalResult, LENGTH_EPS};
use crate::state::State;

/// Cable segment carrying a constant horizontal prestress component.
///
/// With unit direction `u = (cur(p1) - cur(p0)) / len`, the axial force is
/// scaled so its horizontal projection equals the prescribed prestress:
///
/// ```text
/// s = prestress / sqrt(u_x² + u_y²)
/// force(p0) += u * s
/// force(p1) -= u * s
/// ```
///
/// A near-vertical segment has no horizontal projection to normalize
/// against and is degenerate, as is a segment of near-zero length.
pub struct HorizontalPrestress {
    points: [[f64; 3]; 2],
    node_ids: [usize; 2],
    prestress: f64,
    result: f64,
}

impl HorizontalPrestress {
    pub fn new(p0: [f64; 3], p1: [f64; 3], prestress: f64) -> Self {
        Self {
            points: [p0, p1],
            node_ids: [usize::MAX; 2],
            prestress,
            result: 0.,
        }
    }
}

impl Goal for HorizontalPrestress {
    fn reference_points(&self) -> &[[f64; 3]] {
        &self.points
    }

    fn bind(&mut self, handles: &[usize]) -> Result<()> {
        check_arity(handles.len(), 2)?;
        if !self.prestress.is_finite() {
            return Err(ModelError::InvalidRegistration(
                "prestress magnitude must be finite".into(),
            ));
        }
        if handles[0] == handles[1] {
            return Err(ModelError::DegenerateGeometry {
                detail: format!(
                    "prestress segment endpoints resolve to the same node {}",
                    handles[0]
                ),
            });
        }
        self.node_ids = [handles[0], handles[1]];
        Ok(())
    }

    fn nodes(&self) -> &[usize] {
        &self.node_ids
    }

    fn calc_forces(&mut self, state: &mut State) -> Result<()> {
        let a = state.current_position(self.node_ids[0]);
        let b = state.current_position(self.node_ids[1]);
        let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        if len < LENGTH_EPS {
            return Err(ModelError::DegenerateGeometry {
                detail: format!(
                    "prestress segment between nodes {} and {} collapsed to zero length",
                    self.node_ids[0], self.node_ids[1]
                ),
            });
        }

        let u = [d[0] / len, d[1] / len, d[2] / len];
        let horizontal = (u[0] * u[0] + u[1] * u[1]).sqrt();
        if horizontal < LENGTH_EPS {
            return Err(ModelError::DegenerateGeometry {
                detail: format!(
                    "prestress segment between nodes {} and {} is vertical",
                    self.node_ids[0], self.node_ids[1]
                ),
            });
        }

        let s = self.prestress / horizontal;
        state.add_force(self.node_ids[0], [u[0] * s, u[1] * s, u[2] * s]);
        state.add_force(self.node_ids[1], [-u[0] * s, -u[1] * s, -u[2] * s]);

        self.result = s;
        Ok(())
    }

    fn result(&self) -> GoalResult {
        GoalResult::Scalar(self.result)
    }
}
