use crate::boundary::BoundaryCondition;
use crate::error::Result;
use crate::goals::Goal;
use crate::state::State;

/// Integration parameters for the dynamic relaxation loop.
#[derive(Debug, Clone, Copy)]
pub struct StepParameters {
    /// Fictitious time step.
    pub dt: f64,
    /// Linear viscous damping factor applied to velocities each iteration.
    pub damping: f64,
    /// Peak per-node velocity magnitude below which the run is converged.
    pub convergence_tol: f64,
    /// Iteration cap; reaching it terminates with
    /// [`RunStatus::MaxIterationsReached`].
    pub max_iterations: usize,
}

impl Default for StepParameters {
    fn default() -> Self {
        Self {
            dt: 0.1,
            damping: 0.1,
            convergence_tol: 1e-4,
            max_iterations: 5000,
        }
    }
}

/// Terminal status of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Peak node velocity dropped below the convergence threshold.
    Converged,
    /// The iteration cap was reached; positions and iteration count are
    /// still available and possibly far from equilibrium.
    MaxIterationsReached,
    /// The per-iteration callback requested a stop.
    Cancelled,
}

/// Outcome of a solver run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub status: RunStatus,
    /// Number of completed iterations.
    pub iterations: usize,
}

/// Explicit dynamic relaxation integrator with kinetic damping.
///
/// Borrows the node store and the registered goals and boundary conditions
/// for the duration of one run; the model retains ownership so per-goal
/// results stay queryable afterwards.
pub(crate) struct Solver<'m> {
    pub p: StepParameters,
    pub state: &'m mut State,
    pub goals: &'m mut [Box<dyn Goal>],
    pub bcs: &'m [Box<dyn BoundaryCondition>],
    /// Total kinetic energy stored from the previous iteration, reset to
    /// zero whenever a decrease triggers kinetic damping.
    pub energy_prev: f64,
}

impl<'m> Solver<'m> {
    /// Runs one iteration of the fixed step order and returns the peak
    /// per-node velocity magnitude measured before any kinetic-damping
    /// reset. Convergence is judged on that pre-reset peak: the reset
    /// zeroes every velocity, so the post-reset maximum is always zero.
    fn step(&mut self) -> Result<f64> {
        // 1-2. Re-accumulate forces from every goal.
        self.state.zero_forces();
        for goal in self.goals.iter_mut() {
            goal.calc_forces(self.state)?;
        }

        // 3. Damped explicit Euler velocity update.
        self.state.integrate(self.p.dt, self.p.damping);

        // 4. Kinematic restrictions, before displacements move.
        for bc in self.bcs {
            bc.apply(self.state);
        }

        // 5. Advance displacements.
        self.state.advance(self.p.dt);

        // 6. Kinetic damping: any energy decrease counts as a peak just
        // passed; zero all velocities and reset the stored baseline.
        let energy = self.state.kinetic_energy();
        let peak_velocity = self.state.max_velocity();
        if energy < self.energy_prev {
            log::trace!("kinetic damping reset at energy {energy:.6e}");
            self.state.zero_velocities();
            self.energy_prev = 0.;
        } else {
            self.energy_prev = energy;
        }

        Ok(peak_velocity)
    }

    /// Iterates until convergence, the iteration cap, or cancellation.
    ///
    /// The callback runs once per completed iteration with the current
    /// node store; returning `false` stops the run between steps.
    pub fn run(
        &mut self,
        mut on_iteration: impl FnMut(&State, usize) -> bool,
    ) -> Result<RunReport> {
        let mut iterations = 0;
        let status = loop {
            let peak_velocity = self.step()?;
            iterations += 1;

            if !on_iteration(self.state, iterations) {
                break RunStatus::Cancelled;
            }
            // The cap is checked before the velocity test; the first
            // iteration is never a candidate for convergence.
            if iterations >= self.p.max_iterations {
                break RunStatus::MaxIterationsReached;
            }
            if iterations > 1 && peak_velocity < self.p.convergence_tol {
                break RunStatus::Converged;
            }
        };

        log::debug!("run terminated: {status:?} after {iterations} iterations");
        Ok(RunReport { status, iterations })
    }
}
