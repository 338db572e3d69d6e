//! The `ode_core` crate advances ordinary differential equation systems with
//! fixed-step explicit integrators.
//! Every algorithm is written once against the `State` trait and runs over
//! either a single floating-point value or a packed `NumericVector`.
//!
//! Key components:
//! - **Traits**: `Scalar` (float abstraction), `State` (scalar or vector state),
//!   `EquationSystem` (stateful derivative source), `Solver` (step algorithms).
//! - **Vector**: `NumericVector`, the packed multi-degree-of-freedom state.
//! - **Solvers**: Euler, MidPoint, RungeKutta (RK4) and VelocityVerlet.
//! - **Analysis**: runtime method selection, sampled trajectories and
//!   empirical convergence order.
//! - **Systems**: the Lorenz attractor, gravitational N-body dynamics and
//!   Lennard-Jones molecular dynamics.

pub mod analysis;
pub mod error;
pub mod settings;
pub mod solvers;
pub mod systems;
pub mod traits;
pub mod vector;

pub use analysis::{Method, Trajectory};
pub use error::VectorError;
pub use settings::IntegrationSettings;
pub use solvers::{Euler, MidPoint, RungeKutta, VelocityVerlet};
pub use traits::{EquationSystem, Scalar, Solver, State};
pub use vector::{approx_equal, equal, NumericVector};
