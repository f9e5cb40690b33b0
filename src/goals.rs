pub mod loads;
pub mod prestress;
pub mod springs;

use crate::error::Result;
use crate::state::State;

/// Near-zero length guard for force directions.
///
/// Element lengths (or horizontal projections) below this are treated as
/// degenerate instead of dividing through and propagating non-finite
/// values.
pub(crate) const LENGTH_EPS: f64 = 1e-12;

/// Scalar or vector result cached by a goal after each force evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalResult {
    /// Magnitude of the applied force (springs, prestress segments).
    Scalar(f64),
    /// The applied force vector (point loads).
    Vector([f64; 3]),
}

/// A unit of physical behavior contributing forces to one or more nodes
/// each iteration.
///
/// A goal is constructed from reference coordinates, bound to node handles
/// once at registration (the handles are resolved through the model's
/// point index), and evaluated every iteration against the current node
/// positions. Force computation dispatches through this trait; new goal
/// kinds require no change to the solver loop.
pub trait Goal {
    /// Reference coordinates, in the order they are bound to handles.
    /// Used only at registration.
    fn reference_points(&self) -> &[[f64; 3]];

    /// Binds resolved node handles to this goal.
    ///
    /// Called exactly once at registration with one handle per reference
    /// point. Implementations validate arity, parameters, and structural
    /// degeneracy here so that bad input fails before the run starts.
    fn bind(&mut self, handles: &[usize]) -> Result<()>;

    /// Bound node handles, valid after [`bind`](Goal::bind).
    fn nodes(&self) -> &[usize];

    /// Computes this goal's force contribution from the current node
    /// positions and accumulates it into the force channel of each bound
    /// node. Never overwrites: multiple goals may load the same node
    /// within one iteration.
    fn calc_forces(&mut self, state: &mut State) -> Result<()>;

    /// Last computed force magnitude or vector, queryable after the run.
    fn result(&self) -> GoalResult;
}

pub(crate) fn check_arity(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(crate::error::ModelError::InvalidRegistration(format!(
            "expected {expected} node handles, got {got}"
        )));
    }
    Ok(())
}
