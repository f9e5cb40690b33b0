use crate::error::{ModelError, Result};
use crate::state::State;
use itertools::Itertools;

/// Assigns lumped mass to nodes. Executed exactly once, before the
/// iteration loop.
pub trait MassApplier {
    /// Reference coordinates, used only at registration.
    fn reference_points(&self) -> &[[f64; 3]];

    /// Binds resolved node handles, one per reference point.
    fn bind(&mut self, handles: &[usize]) -> Result<()>;

    /// Bound node handles, valid after [`bind`](MassApplier::bind).
    fn nodes(&self) -> &[usize];

    /// Sets or accumulates mass on every bound node.
    fn apply(&self, state: &mut State);
}

/// Uniform lumped mass added to each referenced node.
pub struct LumpedMass {
    points: Vec<[f64; 3]>,
    node_ids: Vec<usize>,
    mass: f64,
}

impl LumpedMass {
    pub fn new(points: &[[f64; 3]], mass: f64) -> Self {
        Self {
            points: points.to_vec(),
            node_ids: vec![],
            mass,
        }
    }
}

impl MassApplier for LumpedMass {
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
        if !self.mass.is_finite() || self.mass <= 0. {
            return Err(ModelError::InvalidRegistration(format!(
                "lumped mass must be finite and positive, got {}",
                self.mass
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
            state.add_mass(node, self.mass);
        }
    }
}
