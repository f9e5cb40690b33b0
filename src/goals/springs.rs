use crate::error::{ModelError, Result};
use crate::goals::{check_arity, Goal, GoalResult, LENGTH_EPS};
use crate::state::State;

/// Linear elastic spring between two nodes.
///
/// Restoring force per iteration with `d = cur(p1) - cur(p0)` and
/// `len = |d|`:
///
/// ```text
/// c = (rest - len) / len * stiffness
/// force(p1) += c * d
/// force(p0) -= c * d
/// ```
///
/// Tension (`len > rest`) pulls the ends together, compression pushes them
/// apart.
pub struct Spring {
    points: [[f64; 3]; 2],
    node_ids: [usize; 2],
    stiffness: f64,
    rest_length: f64,
    result: f64,
}

impl Spring {
    /// Spring with rest length taken from the distance between the two
    /// reference points.
    pub fn new(p0: [f64; 3], p1: [f64; 3], stiffness: f64) -> Self {
        let rest_length = distance(p0, p1);
        Self::with_rest_length(p0, p1, stiffness, rest_length)
    }

    /// Spring with an explicit rest length, prestressing the element when
    /// it differs from the initial distance.
    pub fn with_rest_length(
        p0: [f64; 3],
        p1: [f64; 3],
        stiffness: f64,
        rest_length: f64,
    ) -> Self {
        Self {
            points: [p0, p1],
            node_ids: [usize::MAX; 2],
            stiffness,
            rest_length,
            result: 0.,
        }
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }
}

impl Goal for Spring {
    fn reference_points(&self) -> &[[f64; 3]] {
        &self.points
    }

    fn bind(&mut self, handles: &[usize]) -> Result<()> {
        check_arity(handles.len(), 2)?;
        if !self.stiffness.is_finite() || !self.rest_length.is_finite() {
            return Err(ModelError::InvalidRegistration(
                "spring stiffness and rest length must be finite".into(),
            ));
        }
        // Endpoints that merged into one node leave the force direction
        // undefined on every iteration.
        if handles[0] == handles[1] {
            return Err(ModelError::DegenerateGeometry {
                detail: format!(
                    "spring endpoints resolve to the same node {}",
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
                    "spring between nodes {} and {} collapsed to zero length",
                    self.node_ids[0], self.node_ids[1]
                ),
            });
        }

        let c = (self.rest_length - len) / len * self.stiffness;
        let f = [c * d[0], c * d[1], c * d[2]];
        state.add_force(self.node_ids[1], f);
        state.add_force(self.node_ids[0], [-f[0], -f[1], -f[2]]);

        self.result = (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt();
        Ok(())
    }

    fn result(&self) -> GoalResult {
        GoalResult::Scalar(self.result)
    }
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::prelude::*;
    use faer::utils::approx::*;

    #[test]
    fn force_at_rest_is_zero() {
        let approx_eq = CwiseMat(ApproxEq::eps());

        let mut spring = Spring::new([0., 0., 0.], [1., 0., 0.], 10.);
        spring.bind(&[0, 1]).unwrap();
        assert_eq!(spring.rest_length(), 1.);

        let mut state = State::new(&[[0., 0., 0.], [1., 0., 0.]]);
        spring.calc_forces(&mut state).unwrap();

        assert!(state.f.col(0) ~ col![0., 0., 0.]);
        assert!(state.f.col(1) ~ col![0., 0., 0.]);
        assert_eq!(spring.result(), GoalResult::Scalar(0.));
    }

    #[test]
    fn stretched_spring_pulls_ends_together() {
        let approx_eq = CwiseMat(ApproxEq::eps());

        let mut spring = Spring::new([0., 0., 0.], [1., 0., 0.], 10.);
        spring.bind(&[0, 1]).unwrap();

        let mut state = State::new(&[[0., 0., 0.], [1., 0., 0.]]);
        state.u[(0, 1)] = 0.5; // stretch to length 1.5

        spring.calc_forces(&mut state).unwrap();

        // c = (1 - 1.5)/1.5 * 10 = -10/3; f = c * (1.5, 0, 0) = (-5, 0, 0)
        assert!(state.f.col(1) ~ col![-5., 0., 0.]);
        assert!(state.f.col(0) ~ col![5., 0., 0.]);
        assert_eq!(spring.result(), GoalResult::Scalar(5.));
    }

    #[test]
    fn compressed_spring_pushes_ends_apart() {
        let mut spring = Spring::new([0., 0., 0.], [1., 0., 0.], 10.);
        spring.bind(&[0, 1]).unwrap();

        let mut state = State::new(&[[0., 0., 0.], [1., 0., 0.]]);
        state.u[(0, 1)] = -0.5; // compress to length 0.5

        spring.calc_forces(&mut state).unwrap();
        assert!(state.f[(0, 1)] > 0.);
        assert!(state.f[(0, 0)] < 0.);
    }

    #[test]
    fn explicit_rest_length_prestresses() {
        let mut spring = Spring::with_rest_length([0., 0., 0.], [1., 0., 0.], 10., 0.5);
        spring.bind(&[0, 1]).unwrap();

        let mut state = State::new(&[[0., 0., 0.], [1., 0., 0.]]);
        spring.calc_forces(&mut state).unwrap();

        // c = (0.5 - 1)/1 * 10 = -5; node 1 pulled toward node 0
        assert_eq!(state.f[(0, 1)], -5.);
        assert_eq!(state.f[(0, 0)], 5.);
    }

    #[test]
    fn merged_endpoints_rejected_at_bind() {
        let mut spring = Spring::new([0., 0., 0.], [1e-9, 0., 0.], 10.);
        let err = spring.bind(&[0, 0]).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateGeometry { .. }));
    }

    #[test]
    fn collapsed_spring_errors_mid_run() {
        let mut spring = Spring::new([0., 0., 0.], [1., 0., 0.], 10.);
        spring.bind(&[0, 1]).unwrap();

        let mut state = State::new(&[[0., 0., 0.], [1., 0., 0.]]);
        state.u[(0, 1)] = -1.; // node 1 sits exactly on node 0

        let err = spring.calc_forces(&mut state).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateGeometry { .. }));
    }

    #[test]
    fn non_finite_stiffness_rejected() {
        let mut spring = Spring::new([0., 0., 0.], [1., 0., 0.], f64::NAN);
        let err = spring.bind(&[0, 1]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidRegistration(_)));
    }
}
