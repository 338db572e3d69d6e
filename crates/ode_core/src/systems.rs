//! Ready-made equation systems: the Lorenz attractor (stateless form) and
//! two particle systems (stateful form), gravitational N-body and
//! Lennard-Jones molecular dynamics.

use crate::traits::{EquationSystem, Scalar};
use crate::vector::NumericVector;
use serde::{Deserialize, Serialize};

/// Lorenz attractor `x' = σ(y - x)`, `y' = ρx - y - xz`, `z' = xy - βz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lorenz<T> {
    pub sigma: T,
    pub rho: T,
    pub beta: T,
}

impl<T: Scalar> Default for Lorenz<T> {
    fn default() -> Self {
        Self {
            sigma: T::from_f64(10.0).unwrap(),
            rho: T::from_f64(28.0).unwrap(),
            beta: T::from_f64(8.0 / 3.0).unwrap(),
        }
    }
}

impl<T: Scalar> Lorenz<T> {
    /// dy/dx for the three-component state `y = [x, y, z]`.
    pub fn derivative(&self, _t: T, y: &NumericVector<T>) -> NumericVector<T> {
        NumericVector::from([
            self.sigma * (y[1] - y[0]),
            self.rho * y[0] - y[1] - y[0] * y[2],
            y[0] * y[1] - self.beta * y[2],
        ])
    }
}

/// A point mass taking part in an [`NBody`] simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body<T> {
    pub name: String,
    pub position: [T; 3],
    pub velocity: [T; 3],
    pub mass: T,
    #[serde(default)]
    pub radius: T,
}

/// Values per body in the packed state: position then velocity.
const STRIDE: usize = 6;

/// Sum of `m v² / 2` over `bodies`.
fn kinetic_energy<T: Scalar>(bodies: &[Body<T>]) -> T {
    let half = T::from_f64(0.5).unwrap();
    bodies.iter().fold(T::zero(), |acc, body| {
        let v2 = body.velocity.iter().fold(T::zero(), |s, &v| s + v * v);
        acc + half * body.mass * v2
    })
}

fn distance<T: Scalar>(a: &[T; 3], b: &[T; 3]) -> T {
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (&p, &q)| acc + (p - q) * (p - q))
        .sqrt()
}

fn pack<T: Scalar>(bodies: &[Body<T>]) -> NumericVector<T> {
    bodies
        .iter()
        .flat_map(|body| body.position.iter().chain(&body.velocity).copied())
        .collect()
}

fn add_packed<T: Scalar>(bodies: &mut [Body<T>], delta: &NumericVector<T>) {
    assert_eq!(
        delta.len(),
        bodies.len() * STRIDE,
        "state increment does not match the number of bodies"
    );
    for (body, chunk) in bodies.iter_mut().zip(delta.chunks(STRIDE)) {
        for k in 0..3 {
            body.position[k] = body.position[k] + chunk[k];
            body.velocity[k] = body.velocity[k] + chunk[k + 3];
        }
    }
}

/// dy/dx of a packed state: velocities in the position slots, `acc` in the
/// velocity slots.
fn packed_derivative<T: Scalar>(y: &NumericVector<T>, acc: Vec<[T; 3]>) -> NumericVector<T> {
    let mut dydx = NumericVector::new(acc.len() * STRIDE);
    for (i, acc) in acc.into_iter().enumerate() {
        let a = i * STRIDE;
        for k in 0..3 {
            // Position
            dydx[a + k] = y[a + k + 3];
            // Velocity
            dydx[a + k + 3] = acc[k];
        }
    }
    dydx
}

/// Second derivative of the positions is the acceleration already present
/// in the velocity slots of `dy`; velocities get no second-order term.
fn acceleration_coupling<T: Scalar>(dy: &NumericVector<T>) -> NumericVector<T> {
    let mut d2y = NumericVector::new(dy.len());
    for a in (0..d2y.len()).step_by(STRIDE) {
        for k in 0..3 {
            d2y[a + k] = dy[a + k + 3];
        }
    }
    d2y
}

/// Newtonian gravity between point masses, with unit gravitational constant.
///
/// The packed state holds `[x, y, z, vx, vy, vz]` for every body in order.
/// `set_params` adds the step increment to every body.
#[derive(Debug, Clone, PartialEq)]
pub struct NBody<T> {
    bodies: Vec<Body<T>>,
}

impl<T: Scalar> NBody<T> {
    pub fn new(bodies: Vec<Body<T>>) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &[Body<T>] {
        &self.bodies
    }

    /// Sum of `m v² / 2` over all bodies.
    pub fn kinetic_energy(&self) -> T {
        kinetic_energy(&self.bodies)
    }

    /// Sum of `-m_i m_j / r_ij` over all pairs.
    pub fn potential_energy(&self) -> T {
        let mut energy = T::zero();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                let r = distance(&a.position, &b.position);
                energy = energy - a.mass * b.mass / r;
            }
        }
        energy
    }

    pub fn total_energy(&self) -> T {
        self.kinetic_energy() + self.potential_energy()
    }

    fn accelerations(&self, y: &NumericVector<T>) -> Vec<[T; 3]> {
        let mut acc = vec![[T::zero(); 3]; self.bodies.len()];
        for (i, slot) in acc.iter_mut().enumerate() {
            let a = i * STRIDE;
            for (j, other) in self.bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                let b = j * STRIDE;
                let mut d2 = T::zero();
                for k in 0..3 {
                    d2 = d2 + (y[a + k] - y[b + k]).powi(2);
                }
                let d = d2.sqrt();
                let scale = other.mass / d.powi(3);
                for k in 0..3 {
                    slot[k] = slot[k] + (y[b + k] - y[a + k]) * scale;
                }
            }
        }
        acc
    }
}

impl<T: Scalar> EquationSystem<NumericVector<T>> for NBody<T> {
    fn derive(&self, _x: T, y: &NumericVector<T>) -> NumericVector<T> {
        packed_derivative(y, self.accelerations(y))
    }

    fn derive2(
        &self,
        _x: T,
        _y: &NumericVector<T>,
        dy: &NumericVector<T>,
    ) -> Option<NumericVector<T>> {
        Some(acceleration_coupling(dy))
    }

    fn params(&self) -> NumericVector<T> {
        pack(&self.bodies)
    }

    fn set_params(&mut self, delta: &NumericVector<T>) {
        add_packed(&mut self.bodies, delta);
    }
}

/// Particles interacting through the Lennard-Jones pair potential
/// `V(r) = 4ε((σ/r)¹² - (σ/r)⁶)`.
///
/// Uses the same packed layout as [`NBody`]. Temperatures are reported in
/// units where the Boltzmann constant is one.
#[derive(Debug, Clone, PartialEq)]
pub struct LennardJones<T> {
    pub sigma: T,
    pub epsilon: T,
    bodies: Vec<Body<T>>,
}

impl<T: Scalar> LennardJones<T> {
    /// Particles with σ = 40 and ε = 20.
    pub fn new(bodies: Vec<Body<T>>) -> Self {
        Self::with_parameters(
            T::from_f64(40.0).unwrap(),
            T::from_f64(20.0).unwrap(),
            bodies,
        )
    }

    pub fn with_parameters(sigma: T, epsilon: T, bodies: Vec<Body<T>>) -> Self {
        Self {
            sigma,
            epsilon,
            bodies,
        }
    }

    pub fn bodies(&self) -> &[Body<T>] {
        &self.bodies
    }

    pub fn kinetic_energy(&self) -> T {
        kinetic_energy(&self.bodies)
    }

    /// Sum of the pair potential over all pairs.
    pub fn potential_energy(&self) -> T {
        let four = T::from_f64(4.0).unwrap();
        let mut energy = T::zero();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                let s6 = (self.sigma / distance(&a.position, &b.position)).powi(6);
                energy = energy + four * self.epsilon * (s6 * s6 - s6);
            }
        }
        energy
    }

    pub fn total_energy(&self) -> T {
        self.kinetic_energy() + self.potential_energy()
    }

    /// `2 E_kin / (3 N)`; zero for an empty system.
    pub fn temperature(&self) -> T {
        if self.bodies.is_empty() {
            return T::zero();
        }
        let n = T::from_usize(self.bodies.len()).unwrap();
        let two = T::from_f64(2.0).unwrap();
        let three = T::from_f64(3.0).unwrap();
        two * self.kinetic_energy() / (three * n)
    }

    fn accelerations(&self, y: &NumericVector<T>) -> Vec<[T; 3]> {
        let two = T::from_f64(2.0).unwrap();
        let strength = T::from_f64(24.0).unwrap() * self.epsilon;
        let sigma2 = self.sigma * self.sigma;

        let mut acc = vec![[T::zero(); 3]; self.bodies.len()];
        for i in 0..self.bodies.len() {
            for j in i + 1..self.bodies.len() {
                let (a, b) = (i * STRIDE, j * STRIDE);
                let mut dr = [T::zero(); 3];
                let mut r2 = T::zero();
                for k in 0..3 {
                    dr[k] = y[a + k] - y[b + k];
                    r2 = r2 + dr[k] * dr[k];
                }
                let s6 = (sigma2 / r2).powi(3);
                // F_ij = 24ε/r² (2(σ/r)¹² - (σ/r)⁶) r_ij
                let scale = strength * (two * s6 * s6 - s6) / r2;
                for k in 0..3 {
                    let force = scale * dr[k];
                    acc[i][k] = acc[i][k] + force / self.bodies[i].mass;
                    acc[j][k] = acc[j][k] - force / self.bodies[j].mass;
                }
            }
        }
        acc
    }
}

impl<T: Scalar> EquationSystem<NumericVector<T>> for LennardJones<T> {
    fn derive(&self, _x: T, y: &NumericVector<T>) -> NumericVector<T> {
        packed_derivative(y, self.accelerations(y))
    }

    fn derive2(
        &self,
        _x: T,
        _y: &NumericVector<T>,
        dy: &NumericVector<T>,
    ) -> Option<NumericVector<T>> {
        Some(acceleration_coupling(dy))
    }

    fn params(&self) -> NumericVector<T> {
        pack(&self.bodies)
    }

    fn set_params(&mut self, delta: &NumericVector<T>) {
        add_packed(&mut self.bodies, delta);
    }
}
