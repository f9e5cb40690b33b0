//! **formfind** — dynamic relaxation form-finding solver.
//!
//! Finds the static equilibrium shape of a network of point masses
//! connected by elastic and prestress relationships, using damped explicit
//! time stepping accelerated by kinetic damping (all velocities are zeroed
//! whenever total kinetic energy drops between iterations).
//!
//! A [`model::Model`] is built from goals (springs, prestressed cable
//! segments, point loads), boundary conditions, and mass appliers. Each
//! item's reference coordinates are resolved through a spatial
//! deduplication index so independently registered endpoints collapse onto
//! shared solver nodes, identified by plain indices into one node arena.

pub mod boundary;
pub mod dedup;
pub mod error;
pub mod goals;
pub mod masses;
pub mod model;
pub mod solver;
pub mod state;
