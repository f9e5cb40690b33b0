use crate::error::{ModelError, Result};
use crate::goals::{check_arity, Goal, GoalResult};
use crate::state::State;

/// Constant force applied to a single node every iteration.
pub struct PointLoad {
    points: [[f64; 3]; 1],
    node_ids: [usize; 1],
    vector: [f64; 3],
}

impl PointLoad {
    pub fn new(vector: [f64; 3], at: [f64; 3]) -> Self {
        Self {
            points: [at],
            node_ids: [usize::MAX],
            vector,
        }
    }
}

impl Goal for PointLoad {
    fn reference_points(&self) -> &[[f64; 3]] {
        &self.points
    }

    fn bind(&mut self, handles: &[usize]) -> Result<()> {
        check_arity(handles.len(), 1)?;
        if self.vector.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidRegistration(
                "load vector must be finite".into(),
            ));
        }
        self.node_ids = [handles[0]];
        Ok(())
    }

    fn nodes(&self) -> &[usize] {
        &self.node_ids
    }

    fn calc_forces(&mut self, state: &mut State) -> Result<()> {
        state.add_force(self.node_ids[0], self.vector);
        Ok(())
    }

    fn result(&self) -> GoalResult {
        GoalResult::Vector(self.vector)
    }
}
