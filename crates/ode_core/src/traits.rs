use crate::vector::NumericVector;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

/// A trait for floating-point types used as the independent variable and as
/// the elements of a state.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A quantity the solvers can integrate: either a single `Scalar` or a
/// packed `NumericVector` of them.
///
/// `Elem` is the scalar type of the independent variable `x` and of the step
/// `dx`. For a scalar state it is the state type itself, for a vector state it
/// is the element type, so every step formula is written once against
/// `State` and instantiated for both representations.
pub trait State:
    Clone
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<<Self as State>::Elem, Output = Self>
    + Div<<Self as State>::Elem, Output = Self>
{
    type Elem: Scalar;
}

impl<T: Scalar> State for T {
    type Elem = T;
}

impl<T: Scalar> State for NumericVector<T> {
    type Elem = T;
}

/// An equation system that owns its state (stateful form).
///
/// The solver reads the current state through `params`, evaluates the
/// derivative through `derive` (and optionally `derive2`) and hands back the
/// increment through `set_params`, exactly once per step.
pub trait EquationSystem<S: State> {
    /// Evaluates dy/dx at `(x, y)`.
    fn derive(&self, x: S::Elem, y: &S) -> S;

    /// Evaluates the second-derivative coupling d²y/dx² given `y` and its
    /// first derivative `dy`.
    ///
    /// Returns `None` when the system has no such coupling, which is the
    /// default for first-order systems.
    fn derive2(&self, _x: S::Elem, _y: &S, _dy: &S) -> Option<S> {
        None
    }

    /// Snapshot of the current state.
    fn params(&self) -> S;

    /// Commits a step: `delta` is added to the owned state.
    /// Not idempotent; calling it twice advances the state twice.
    fn set_params(&mut self, delta: &S);
}

/// A single-step explicit integration algorithm.
///
/// Implementors only provide `delta`; the stateless `step` and the stateful
/// `calc`/`calc_range` are derived from it.
pub trait Solver<S: State> {
    /// Computes the increment that advances `y` from `x` to `x + dx` for the
    /// derivative function `f(x, y) = dy/dx`.
    fn delta<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S;

    /// Stateless form: returns the new state at `x + dx`.
    fn step<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S,
    {
        y.clone() + self.delta(x, dx, y, f)
    }

    /// Stateful form: computes the increment for the system's current state,
    /// commits it through `set_params` and returns it.
    fn calc<E>(&self, x: S::Elem, dx: S::Elem, system: &mut E) -> S
    where
        E: EquationSystem<S> + ?Sized,
    {
        let y = system.params();
        let dy = self.delta(x, dx, &y, |x, y| system.derive(x, y));
        system.set_params(&dy);
        dy
    }

    /// Repeatedly calls `calc` from `x0` while `x <= x_end`, adding every
    /// increment to a copy of `y0`.
    ///
    /// `x` advances by repeated addition of `dx`, so rounding may add or drop
    /// one step when `x_end` is not exactly representable on the grid.
    fn calc_range<E>(&self, x0: S::Elem, y0: &S, x_end: S::Elem, dx: S::Elem, system: &mut E) -> S
    where
        E: EquationSystem<S> + ?Sized,
    {
        let mut y = y0.clone();
        let mut x = x0;
        while x <= x_end {
            y = y + self.calc(x, dx, system);
            x = x + dx;
        }
        y
    }
}
