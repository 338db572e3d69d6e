use crate::{
    settings::{validate_range, IntegrationSettings},
    solvers::{Euler, MidPoint, RungeKutta, VelocityVerlet},
    traits::{EquationSystem, Scalar, Solver, State},
};
use anyhow::{bail, Result};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Runtime selection of one of the step algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Euler,
    MidPoint,
    RungeKutta,
    VelocityVerlet,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Euler,
        Method::MidPoint,
        Method::RungeKutta,
        Method::VelocityVerlet,
    ];
}

impl<S: State> Solver<S> for Method {
    fn delta<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S,
    {
        match self {
            Method::Euler => Euler.delta(x, dx, y, f),
            Method::MidPoint => MidPoint.delta(x, dx, y, f),
            Method::RungeKutta => RungeKutta.delta(x, dx, y, f),
            Method::VelocityVerlet => VelocityVerlet.delta(x, dx, y, f),
        }
    }

    fn calc<E>(&self, x: S::Elem, dx: S::Elem, system: &mut E) -> S
    where
        E: EquationSystem<S> + ?Sized,
    {
        match self {
            Method::Euler => Euler.calc(x, dx, system),
            Method::MidPoint => MidPoint.calc(x, dx, system),
            Method::RungeKutta => RungeKutta.calc(x, dx, system),
            Method::VelocityVerlet => VelocityVerlet.calc(x, dx, system),
        }
    }
}

/// Sampled solution: `states[i]` is the state at `xs[i]`.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "S: Serialize, S::Elem: Serialize"))]
pub struct Trajectory<S: State> {
    pub xs: Vec<S::Elem>,
    pub states: Vec<S>,
}

impl<S: State> Trajectory<S> {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// The last sample, i.e. the first point past the end of the range.
    pub fn last(&self) -> Option<(S::Elem, &S)> {
        Some((*self.xs.last()?, self.states.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (S::Elem, &S)> + '_ {
        self.xs.iter().copied().zip(self.states.iter())
    }
}

/// Integrates `dy/dx = f(x, y)` from `(x0, y0)` towards `x_end`, recording
/// every visited point including the initial one.
///
/// Stepping continues while `x` has not passed `x_end` (`x <= x_end` for a
/// positive step, `x >= x_end` for a negative one), the same termination rule
/// as [`Solver::calc_range`].
pub fn trajectory<S, F>(
    method: Method,
    f: F,
    x0: S::Elem,
    y0: &S,
    x_end: S::Elem,
    dx: S::Elem,
) -> Result<Trajectory<S>>
where
    S: State,
    F: Fn(S::Elem, &S) -> S,
{
    validate_range(x0, x_end, dx)?;

    let forward = dx.is_sign_positive();
    let mut x = x0;
    let mut y = y0.clone();
    let mut xs = vec![x];
    let mut states = vec![y.clone()];

    while (forward && x <= x_end) || (!forward && x >= x_end) {
        y = method.step(x, dx, &y, &f);
        x = x + dx;
        xs.push(x);
        states.push(y.clone());
    }

    Ok(Trajectory { xs, states })
}

/// Runs [`trajectory`] with the method and range taken from `settings`.
pub fn trajectory_with_settings<S, F>(
    settings: &IntegrationSettings<S::Elem>,
    y0: &S,
    f: F,
) -> Result<Trajectory<S>>
where
    S: State,
    F: Fn(S::Elem, &S) -> S,
{
    trajectory(
        settings.method,
        f,
        settings.x0,
        y0,
        settings.x_end,
        settings.dx,
    )
}

/// Absolute error at `x_end` after exactly `steps` equal steps from
/// `(x0, y0)`, measured against the closed-form solution `exact`.
pub fn global_error<T, F, G>(
    method: Method,
    f: F,
    exact: G,
    x0: T,
    y0: T,
    x_end: T,
    steps: usize,
) -> Result<T>
where
    T: Scalar,
    F: Fn(T, &T) -> T,
    G: Fn(T) -> T,
{
    if steps == 0 {
        bail!("Error estimation requires at least one integration step.");
    }
    if !x0.is_finite() || !x_end.is_finite() || x0 == x_end {
        bail!("Integration range must be finite and non-empty.");
    }

    let n = T::from_usize(steps).unwrap();
    let dx = (x_end - x0) / n;
    let mut y = y0;
    for i in 0..steps {
        let x = x0 + dx * T::from_usize(i).unwrap();
        y = method.step(x, dx, &y, &f);
    }

    Ok((y - exact(x_end)).abs())
}

/// Empirical order of convergence `log2(e(h) / e(h / 2))`, where `e(h)` is
/// the [`global_error`] with `steps` steps and `e(h / 2)` with twice as many.
pub fn observed_order<T, F, G>(
    method: Method,
    f: F,
    exact: G,
    x0: T,
    y0: T,
    x_end: T,
    steps: usize,
) -> Result<T>
where
    T: Scalar,
    F: Fn(T, &T) -> T,
    G: Fn(T) -> T,
{
    let coarse = global_error(method, &f, &exact, x0, y0, x_end, steps)?;
    let fine = global_error(method, &f, &exact, x0, y0, x_end, 2 * steps)?;

    let zero = T::zero();
    if !(coarse > zero && fine > zero) || !coarse.is_finite() || !fine.is_finite() {
        bail!(
            "Cannot estimate order: errors must be positive and finite (got {:?} and {:?}).",
            coarse,
            fine
        );
    }

    Ok((coarse / fine).log2())
}
