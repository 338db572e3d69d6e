use crate::traits::{EquationSystem, Scalar, Solver, State};
use num_traits::Float;

fn constant<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap()
}

/// Explicit Euler, one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euler;

impl<S: State> Solver<S> for Euler {
    fn delta<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S,
    {
        // dy = f(x, y) * dx
        f(x, y) * dx
    }
}

/// Explicit midpoint (second-order Runge-Kutta), two stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidPoint;

impl<S: State> Solver<S> for MidPoint {
    fn delta<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S,
    {
        let two: S::Elem = constant(2.0);

        // k1 = f(x, y) * dx
        let k1 = f(x, y) * dx;

        // dy = f(x + dx/2, y + k1/2) * dx
        let yt = y.clone() + k1 / two;
        f(x + dx / two, &yt) * dx
    }
}

/// Classic Runge-Kutta 4th order, four stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RungeKutta;

impl<S: State> Solver<S> for RungeKutta {
    fn delta<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S,
    {
        let two: S::Elem = constant(2.0);
        let six: S::Elem = constant(6.0);
        let x_half = x + dx / two;

        // k1 = f(x, y) * dx
        let k1 = f(x, y) * dx;

        // k2 = f(x + dx/2, y + k1/2) * dx
        let k2 = f(x_half, &(y.clone() + k1.clone() / two)) * dx;

        // k3 = f(x + dx/2, y + k2/2) * dx
        let k3 = f(x_half, &(y.clone() + k2.clone() / two)) * dx;

        // k4 = f(x + dx, y + k3) * dx
        let k4 = f(x + dx, &(y.clone() + k3.clone())) * dx;

        // dy = (k1 + 2k2 + 2k3 + k4) / 6
        (k1 + k2 * two + k3 * two + k4) / six
    }
}

/// Velocity-Verlet for second-order (Newtonian) systems.
///
/// The stateless form is [`VelocityVerlet::advance`], which takes the
/// acceleration function `a = f(x, y)` and updates the velocity in place.
/// Through [`Solver`] the method works on a packed state and evaluates the
/// derivative twice per step: once at `(x, y)` and once at the predicted
/// state at `x + dx`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VelocityVerlet;

impl VelocityVerlet {
    /// Advances position `y` by one step and updates `velocity` in place.
    ///
    /// `f(x, y)` is the acceleration. Returns the new position:
    /// `y + v dx + a_n dx² / 2`, after which
    /// `v <- v + (f(x + dx, y_new) + a_n) dx / 2`.
    pub fn advance<S, F>(&self, x: S::Elem, dx: S::Elem, y: &S, velocity: &mut S, f: F) -> S
    where
        S: State,
        F: Fn(S::Elem, &S) -> S,
    {
        let half: S::Elem = constant(0.5);

        // a(n)
        let acceleration = f(x, y);

        // y(n+1) = y(n) + v(n) * dx + 1/2 * a(n) * dx^2
        let y_next =
            y.clone() + velocity.clone() * dx + acceleration.clone() * dx.powi(2) * half;

        // v(n+1) = v(n) + 1/2 * (a(n+1) + a(n)) * dx
        *velocity = velocity.clone() + (f(x + dx, &y_next) + acceleration) * dx * half;

        y_next
    }

    /// Packed-state increment.
    ///
    /// `d2` supplies the second-derivative coupling for the predictor; without
    /// it the predictor falls back to `y + d1 dx`.
    fn coupled_delta<S, F, G>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F, d2: G) -> S
    where
        S: State,
        F: Fn(S::Elem, &S) -> S,
        G: FnOnce(S::Elem, &S, &S) -> Option<S>,
    {
        let half: S::Elem = constant(0.5);

        let d1 = f(x, y);
        let predicted = match d2(x, y, &d1) {
            Some(second) => y.clone() + d1.clone() * dx + second * dx.powi(2) * half,
            None => y.clone() + d1.clone() * dx,
        };
        let d1_next = f(x + dx, &predicted);

        (d1 + d1_next) * dx * half
    }
}

impl<S: State> Solver<S> for VelocityVerlet {
    fn delta<F>(&self, x: S::Elem, dx: S::Elem, y: &S, f: F) -> S
    where
        F: Fn(S::Elem, &S) -> S,
    {
        self.coupled_delta(x, dx, y, f, |_, _, _| None)
    }

    fn calc<E>(&self, x: S::Elem, dx: S::Elem, system: &mut E) -> S
    where
        E: EquationSystem<S> + ?Sized,
    {
        let y = system.params();
        let dy = self.coupled_delta(
            x,
            dx,
            &y,
            |x, y| system.derive(x, y),
            |x, y, dy| system.derive2(x, y, dy),
        );
        system.set_params(&dy);
        dy
    }
}

#[cfg(test)]
mod tests {
    use super::{Euler, MidPoint, RungeKutta, VelocityVerlet};
    use crate::traits::{EquationSystem, Solver};
    use crate::vector::NumericVector;
    use std::cell::Cell;

    /// dy/dx = cos(x), owning a single-element state.
    struct CosineSystem {
        y: NumericVector<f64>,
    }

    impl CosineSystem {
        fn new() -> Self {
            Self {
                y: NumericVector::new(1),
            }
        }
    }

    impl EquationSystem<NumericVector<f64>> for CosineSystem {
        fn derive(&self, x: f64, _y: &NumericVector<f64>) -> NumericVector<f64> {
            NumericVector::from([x.cos()])
        }

        fn params(&self) -> NumericVector<f64> {
            self.y.clone()
        }

        fn set_params(&mut self, delta: &NumericVector<f64>) {
            self.y += delta;
        }
    }

    /// Scalar harmonic oscillator packed as [position, velocity].
    struct Oscillator {
        state: NumericVector<f64>,
        second_order: bool,
    }

    impl EquationSystem<NumericVector<f64>> for Oscillator {
        fn derive(&self, _x: f64, y: &NumericVector<f64>) -> NumericVector<f64> {
            NumericVector::from([y[1], -y[0]])
        }

        fn derive2(
            &self,
            _x: f64,
            _y: &NumericVector<f64>,
            dy: &NumericVector<f64>,
        ) -> Option<NumericVector<f64>> {
            self.second_order.then(|| NumericVector::from([dy[1], 0.0]))
        }

        fn params(&self) -> NumericVector<f64> {
            self.state.clone()
        }

        fn set_params(&mut self, delta: &NumericVector<f64>) {
            self.state += delta;
        }
    }

    fn run_stateful(solver: &impl Solver<NumericVector<f64>>, tolerance: f64) {
        let dx = 0.001;
        let mut system = CosineSystem::new();
        for i in 0..1000 {
            let x = i as f64 * dx;
            solver.calc(x, dx, &mut system);
            let expected = (x + dx).sin();
            let got = system.params()[0];
            assert!(
                (got - expected).abs() < tolerance,
                "x={x}: {got} vs {expected}"
            );
        }
    }

    #[test]
    fn stateful_solvers_track_sine() {
        run_stateful(&Euler, 1e-3);
        run_stateful(&MidPoint, 1e-3);
        run_stateful(&RungeKutta, 1e-3);
    }

    #[test]
    fn scalar_step_tracks_sine() {
        let dx = 0.001_f64;
        let f = |x: f64, _y: &f64| x.cos();
        let (mut euler, mut mid, mut rk) = (0.0_f64, 0.0_f64, 0.0_f64);
        let mut max_err = [0.0_f64; 3];
        for i in 0..1000 {
            let x = i as f64 * dx;
            euler = Euler.step(x, dx, &euler, f);
            mid = MidPoint.step(x, dx, &mid, f);
            rk = RungeKutta.step(x, dx, &rk, f);
            let exact = (x + dx).sin();
            for (slot, value) in max_err.iter_mut().zip([euler, mid, rk]) {
                *slot = slot.max((value - exact).abs());
            }
        }
        assert!(max_err[0] < 1e-3);
        assert!(max_err[1] < 1e-6);
        assert!(max_err[2] < 1e-10);
        // First-order truncation error must remain visible.
        assert!(max_err[0] > 1e-5);
        assert!(max_err[0] > max_err[1]);
        assert!(max_err[1] > max_err[2]);
    }

    #[test]
    fn euler_delta_is_slope_times_step() {
        let dy = Euler.delta(0.0, 0.5, &2.0_f64, |_x, y: &f64| 3.0 * y);
        assert_eq!(dy, 3.0);
    }

    #[test]
    fn midpoint_uses_full_step_for_stage_slope() {
        // f = y: k1 = y dx, dy = (y + k1/2) dx
        let y = 1.0_f64;
        let dx = 0.1;
        let dy = MidPoint.delta(0.0, dx, &y, |_x, y: &f64| *y);
        assert_eq!(dy, (y + (y * dx) / 2.0) * dx);
    }

    #[test]
    fn runge_kutta_matches_hand_expansion() {
        let dx = 0.2_f64;
        let x = 0.3;
        let y = 1.5_f64;
        let f = |x: f64, y: &f64| x * y;
        let k1 = f(x, &y) * dx;
        let k2 = f(x + dx / 2.0, &(y + k1 / 2.0)) * dx;
        let k3 = f(x + dx / 2.0, &(y + k2 / 2.0)) * dx;
        let k4 = f(x + dx, &(y + k3)) * dx;
        let expected = (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0;
        assert_eq!(RungeKutta.delta(x, dx, &y, f), expected);
    }

    #[test]
    fn vector_and_scalar_states_agree() {
        let dx = 0.01_f64;
        let scalar = RungeKutta.step(0.2, dx, &0.7_f64, |x, y: &f64| x - y);
        let vector = RungeKutta.step(
            0.2,
            dx,
            &NumericVector::from([0.7_f64]),
            |x, y: &NumericVector<f64>| NumericVector::from([x - y[0]]),
        );
        assert_eq!(vector[0], scalar);
    }

    #[test]
    fn velocity_verlet_tracks_sine() {
        let dx = 0.001_f64;
        let mut y = 0.0_f64;
        let mut v = 1.0_f64;
        for i in 0..1000 {
            let x = i as f64 * dx;
            y = VelocityVerlet.advance(x, dx, &y, &mut v, |x, _y: &f64| -x.sin());
            let exact = (x + dx).sin();
            assert!((y - exact).abs() < 1e-3, "x={x}: {y} vs {exact}");
            assert!((v - (x + dx).cos()).abs() < 1e-3);
        }
    }

    #[test]
    fn velocity_verlet_evaluates_twice_per_step() {
        let calls = Cell::new(0usize);
        let mut v = NumericVector::from([1.0_f64, 0.0]);
        let y = NumericVector::from([0.0_f64, 1.0]);
        let next = VelocityVerlet.advance(0.0, 0.1, &y, &mut v, |_x, y: &NumericVector<f64>| {
            calls.set(calls.get() + 1);
            -y.clone()
        });
        assert_eq!(calls.get(), 2);
        assert_eq!(next.len(), 2);

        calls.set(0);
        let _ = VelocityVerlet.delta(0.0, 0.1, &y, |_x, y: &NumericVector<f64>| {
            calls.set(calls.get() + 1);
            y.clone()
        });
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn velocity_verlet_second_derivative_coupling_matches_advance() {
        let dx = 0.01_f64;
        let mut system = Oscillator {
            state: NumericVector::from([1.0, 0.0]),
            second_order: true,
        };
        let mut y = 1.0_f64;
        let mut v = 0.0_f64;
        for i in 0..500 {
            let x = i as f64 * dx;
            VelocityVerlet.calc(x, dx, &mut system);
            y = VelocityVerlet.advance(x, dx, &y, &mut v, |_x, y: &f64| -y);
        }
        let state = system.params();
        assert!((state[0] - y).abs() < 1e-12);
        assert!((state[1] - v).abs() < 1e-12);
        assert!((state[0] - 5.0_f64.cos()).abs() < 1e-3);
    }

    #[test]
    fn velocity_verlet_without_coupling_still_converges() {
        let dx = 0.01_f64;
        let mut system = Oscillator {
            state: NumericVector::from([1.0, 0.0]),
            second_order: false,
        };
        for i in 0..100 {
            VelocityVerlet.calc(i as f64 * dx, dx, &mut system);
        }
        let state = system.params();
        assert!((state[0] - 1.0_f64.cos()).abs() < 1e-3);
        assert!((state[1] + 1.0_f64.sin()).abs() < 1e-3);
    }

    #[test]
    fn calc_commits_exactly_the_returned_delta() {
        let mut system = CosineSystem::new();
        let before = system.params();
        let dy = RungeKutta.calc(0.0, 0.1, &mut system);
        assert_eq!(system.params(), before + dy);
    }
}
