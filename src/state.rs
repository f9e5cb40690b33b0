use faer::prelude::*;
use faer::{Col, Mat};
use itertools::{izip, Itertools};

/// Per-node numeric channels for one solver run.
///
/// Nodes are identified solely by their index into these channels. Initial
/// positions are fixed at construction; the current position of a node is
/// always derived as `x0 + u`.
pub struct State {
    /// Initial position `[3][n_nodes]`, immutable during the run.
    x0: Mat<f64>,
    /// Cumulative displacement `[3][n_nodes]`.
    pub u: Mat<f64>,
    /// Velocity `[3][n_nodes]`.
    pub v: Mat<f64>,
    /// Acceleration `[3][n_nodes]`.
    pub vd: Mat<f64>,
    /// Force accumulator `[3][n_nodes]`, zeroed every iteration.
    pub f: Mat<f64>,
    /// Lumped mass `[n_nodes]`, broadcast across dimensions.
    pub m: Col<f64>,
    /// Whether a mass applier has touched each node.
    mass_set: Vec<bool>,
}

impl State {
    /// Creates channels for the given node positions, all other channels
    /// zeroed. Mass must be assigned through [`add_mass`](State::add_mass)
    /// before the integrator may run.
    pub fn new(positions: &[[f64; 3]]) -> Self {
        let n_nodes = positions.len();
        Self {
            x0: Mat::from_fn(3, n_nodes, |i, j| positions[j][i]),
            u: Mat::zeros(3, n_nodes),
            v: Mat::zeros(3, n_nodes),
            vd: Mat::zeros(3, n_nodes),
            f: Mat::zeros(3, n_nodes),
            m: Col::zeros(n_nodes),
            mass_set: vec![false; n_nodes],
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.mass_set.len()
    }

    /// Current position of a node: initial position plus displacement.
    pub fn current_position(&self, node: usize) -> [f64; 3] {
        std::array::from_fn(|d| self.x0[(d, node)] + self.u[(d, node)])
    }

    /// Current positions of all nodes in creation order.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        (0..self.n_nodes())
            .map(|i| self.current_position(i))
            .collect_vec()
    }

    /// Accumulates a force contribution into a node. Contributions from
    /// multiple goals add up within one iteration; nothing overwrites.
    pub fn add_force(&mut self, node: usize, force: [f64; 3]) {
        for d in 0..3 {
            self.f[(d, node)] += force[d];
        }
    }

    /// Accumulates lumped mass into a node and marks it as assigned.
    pub fn add_mass(&mut self, node: usize, mass: f64) {
        self.m[node] += mass;
        self.mass_set[node] = true;
    }

    /// Whether any mass applier has assigned mass to this node.
    pub fn mass_assigned(&self, node: usize) -> bool {
        self.mass_set[node]
    }

    /// Zeroes the velocity components of a node selected by the axis mask.
    pub fn restrain(&mut self, node: usize, axes: [bool; 3]) {
        for (d, &fixed) in axes.iter().enumerate() {
            if fixed {
                self.v[(d, node)] = 0.;
            }
        }
    }

    pub fn zero_forces(&mut self) {
        self.f.fill(0.);
    }

    pub fn zero_velocities(&mut self) {
        self.v.fill(0.);
    }

    /// Explicit Euler velocity update with linear viscous damping:
    /// `vd = f/m * dt`, `v = (v + vd*dt) * (1 - damping)`.
    pub fn integrate(&mut self, dt: f64, damping: f64) {
        izip!(
            self.m.iter(),
            self.f.col_iter(),
            self.vd.col_iter_mut(),
            self.v.col_iter_mut(),
        )
        .for_each(|(&m, f, mut vd, mut v)| {
            for d in 0..3 {
                vd[d] = f[d] / m * dt;
                v[d] = (v[d] + vd[d] * dt) * (1. - damping);
            }
        });
    }

    /// Advances cumulative displacements: `u += v * dt`.
    pub fn advance(&mut self, dt: f64) {
        zip!(&mut self.u, &self.v).for_each(|unzip!(u, v)| *u += *v * dt);
    }

    /// Total kinetic energy `Σ m_i * |v_i|²`.
    pub fn kinetic_energy(&self) -> f64 {
        izip!(self.m.iter(), self.v.col_iter())
            .map(|(&m, v)| {
                let speed = v.norm_l2();
                m * speed * speed
            })
            .sum()
    }

    /// Largest per-node velocity magnitude.
    pub fn max_velocity(&self) -> f64 {
        self.v.col_iter().map(|v| v.norm_l2()).fold(0., f64::max)
    }
}
