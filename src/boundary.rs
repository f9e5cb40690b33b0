use crate::error::{ModelError, Result};
use crate::state::State;
use itertools::Itertools;

/// Kinematic restriction enforced on specific nodes once per iteration,
/// after the velocity update and before the displacement update.
pub trait BoundaryCondition {
    /// Reference coordinates, used only at registration.
    fn reference_points(&self) -> &[[f64; 3]];

    /// Binds resolved node handles, one per reference point.
    fn bind(&mut self, handles: &[usize]) -> Result<()>;

    /// Bound node handles, valid after [`bind`](BoundaryCondition::bind).
    fn nodes(&self) -> &[usize];

    /// Enforces the restriction on every bound node.
    fn apply(&self, state: &mut State);
}

/// Support that pins selected velocity components of its nodes to zero.
pub struct Support {
    points: Vec<[f64; 3]>,
    node_ids: Vec<usize>,
    axes: [bool; 3],
}

impl Support {
    /// Fixed support: all three velocity components pinned.
    pub fn pinned(points: &[[f64; 3]]) -> Self {
        Self::along_axes(points, [true, true, true])
    }

    /// Support restraining only the axes flagged in the mask, leaving the
    /// remaining components free (a slide support).
    pub fn along_axes(points: &[[f64; 3]], axes: [bool; 3]) -> Self {
        Self {
            points: points.to_vec(),
            node_ids: vec![],
            axes,
        }
    }
}

impl BoundaryCondition for Support {
    fn reference_points(&self) -> &[[f64; 3]] {
        &self.points
    }

    fn bind(&mut self, handles: &[usize]) -> Result<()> {
        if handles.len() != self.points.len() {
            return Err(ModelError::InvalidRegistration(format!(
                "expected {} node handles, got {}",
                self.points.len(),
                handles.len()
            )));
        }
        self.node_ids = handles.iter().copied().collect_vec();
        Ok(())
    }

    fn nodes(&self) -> &[usize] {
        &self.node_ids
    }

    fn apply(&self, state: &mut State) {
        for &node in &self.node_ids {
            state.restrain(node, self.axes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_support_zeroes_all_components() {
        let mut support = Support::pinned(&[[0., 0., 0.]]);
        support.bind(&[0]).unwrap();

        let mut state = State::new(&[[0., 0., 0.], [1., 0., 0.]]);
        state.v[(0, 0)] = 1.;
        state.v[(1, 0)] = 2.;
        state.v[(2, 0)] = 3.;
        state.v[(0, 1)] = 4.;

        support.apply(&mut state);
        assert_eq!(state.v[(0, 0)], 0.);
        assert_eq!(state.v[(1, 0)], 0.);
        assert_eq!(state.v[(2, 0)], 0.);
        // Unbound node is untouched.
        assert_eq!(state.v[(0, 1)], 4.);
    }

    #[test]
    fn slide_support_leaves_free_axes() {
        let mut support = Support::along_axes(&[[0., 0., 0.]], [false, false, true]);
        support.bind(&[0]).unwrap();

        let mut state = State::new(&[[0., 0., 0.]]);
        state.v[(0, 0)] = 1.;
        state.v[(2, 0)] = 3.;

        support.apply(&mut state);
        assert_eq!(state.v[(0, 0)], 1.);
        assert_eq!(state.v[(2, 0)], 0.);
    }

    #[test]
    fn arity_mismatch_rejected() {
        let mut support = Support::pinned(&[[0., 0., 0.], [1., 0., 0.]]);
        let err = support.bind(&[0]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidRegistration(_)));
    }
}
