use itertools::Itertools;

use crate::boundary::BoundaryCondition;
use crate::dedup::PointIndex;
use crate::error::{ModelError, Result};
use crate::goals::{Goal, GoalResult};
use crate::masses::MassApplier;
use crate::solver::{RunReport, Solver, StepParameters};
use crate::state::State;

/// Default merge tolerance for point deduplication, in model length units.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-3;

/// Form-finding model: owns the point index, the registered goals,
/// boundary conditions, and mass appliers, and drives the relaxation run.
///
/// Lifecycle: construct, register items (each reference point is resolved
/// through the deduplication index into a node handle), solve once, read
/// results. Registration is rejected once the solve has started.
pub struct Model {
    index: PointIndex,
    goals: Vec<Box<dyn Goal>>,
    bcs: Vec<Box<dyn BoundaryCondition>>,
    masses: Vec<Box<dyn MassApplier>>,
    /// Nodes referenced by at least one goal or boundary condition; these
    /// must receive mass before the run.
    needs_mass: Vec<bool>,
    parameters: StepParameters,
    started: bool,
    state: Option<State>,
    report: Option<RunReport>,
}

impl Model {
    /// Creates an empty model with the default merge tolerance.
    pub fn new() -> Model {
        Self::with_merge_tolerance(DEFAULT_MERGE_TOLERANCE)
    }

    /// Creates an empty model with the given merge tolerance. The
    /// tolerance applies uniformly to every point registered during setup
    /// and cannot change afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance` is not finite and strictly positive.
    pub fn with_merge_tolerance(tolerance: f64) -> Model {
        Model {
            index: PointIndex::new(tolerance),
            goals: vec![],
            bcs: vec![],
            masses: vec![],
            needs_mass: vec![],
            parameters: StepParameters::default(),
            started: false,
            state: None,
            report: None,
        }
    }

    pub fn set_time_step(&mut self, dt: f64) {
        self.parameters.dt = dt;
    }

    pub fn set_damping(&mut self, damping: f64) {
        self.parameters.damping = damping;
    }

    pub fn set_convergence_tolerance(&mut self, tol: f64) {
        self.parameters.convergence_tol = tol;
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.parameters.max_iterations = max_iterations;
    }

    /// Number of distinct nodes in the arena.
    pub fn n_nodes(&self) -> usize {
        self.index.len()
    }

    /// Registers a goal: resolves its reference points into node handles,
    /// binds them, and marks the nodes as requiring mass.
    pub fn add_goal(&mut self, mut goal: impl Goal + 'static) -> Result<usize> {
        self.ensure_registration_open()?;
        let handles = self.resolve_points(goal.reference_points())?;
        goal.bind(&handles)?;
        for &h in &handles {
            self.needs_mass[h] = true;
        }
        self.goals.push(Box::new(goal));
        Ok(self.goals.len() - 1)
    }

    /// Registers a boundary condition, resolving and binding its nodes.
    pub fn add_boundary_condition(
        &mut self,
        mut bc: impl BoundaryCondition + 'static,
    ) -> Result<usize> {
        self.ensure_registration_open()?;
        let handles = self.resolve_points(bc.reference_points())?;
        bc.bind(&handles)?;
        for &h in &handles {
            self.needs_mass[h] = true;
        }
        self.bcs.push(Box::new(bc));
        Ok(self.bcs.len() - 1)
    }

    /// Registers a mass applier, resolving and binding its nodes.
    pub fn add_mass(&mut self, mut mass: impl MassApplier + 'static) -> Result<usize> {
        self.ensure_registration_open()?;
        let handles = self.resolve_points(mass.reference_points())?;
        mass.bind(&handles)?;
        self.masses.push(Box::new(mass));
        Ok(self.masses.len() - 1)
    }

    /// Runs the relaxation loop to a terminal status.
    pub fn solve(&mut self) -> Result<RunReport> {
        self.solve_with(|_, _| true)
    }

    /// Runs the relaxation loop, invoking `on_iteration` with the node
    /// store after every completed iteration. Returning `false` cancels
    /// the run between iterations.
    pub fn solve_with(
        &mut self,
        on_iteration: impl FnMut(&State, usize) -> bool,
    ) -> Result<RunReport> {
        if self.started {
            return Err(ModelError::InvalidRegistration(
                "model has already been solved".into(),
            ));
        }
        self.started = true;

        log::info!(
            "solving model: {} nodes, {} goals, {} boundary conditions, {} mass appliers",
            self.index.len(),
            self.goals.len(),
            self.bcs.len(),
            self.masses.len(),
        );

        // Build the arena and assign mass exactly once, before the loop.
        let mut state = State::new(self.index.points());
        for mass in &self.masses {
            mass.apply(&mut state);
        }
        for (node, &needed) in self.needs_mass.iter().enumerate() {
            if needed && !state.mass_assigned(node) {
                return Err(ModelError::UnassignedMass { node });
            }
        }

        let mut solver = Solver {
            p: self.parameters,
            state: &mut state,
            goals: &mut self.goals,
            bcs: &self.bcs,
            energy_prev: 0.,
        };
        let report = solver.run(on_iteration)?;

        log::info!("solve finished: {:?} in {} iterations", report.status, report.iterations);
        self.state = Some(state);
        self.report = Some(report);
        Ok(report)
    }

    /// Node positions in creation order: equilibrium positions after a
    /// completed run, registered coordinates before.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        match &self.state {
            Some(state) => state.positions(),
            None => self.index.points().to_vec(),
        }
    }

    /// Iteration count of the completed run.
    pub fn iterations(&self) -> Option<usize> {
        self.report.map(|r| r.iterations)
    }

    /// Last computed result of a registered goal.
    pub fn goal_result(&self, goal: usize) -> Option<GoalResult> {
        self.goals.get(goal).map(|g| g.result())
    }

    fn ensure_registration_open(&self) -> Result<()> {
        if self.started {
            return Err(ModelError::InvalidRegistration(
                "registration after solve() has started is not supported".into(),
            ));
        }
        Ok(())
    }

    /// Resolves reference points to node handles through the dedup index,
    /// growing the arena for previously unseen points.
    fn resolve_points(&mut self, points: &[[f64; 3]]) -> Result<Vec<usize>> {
        for p in points {
            if p.iter().any(|c| !c.is_finite()) {
                return Err(ModelError::InvalidRegistration(format!(
                    "reference point ({}, {}, {}) is not finite",
                    p[0], p[1], p[2]
                )));
            }
        }
        let handles = points.iter().map(|&p| self.index.resolve(p)).collect_vec();
        self.needs_mass.resize(self.index.len(), false);
        Ok(handles)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
