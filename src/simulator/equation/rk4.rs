use crate::error::DosingError;
use crate::simulator::equation::{Integrator, System, ODE};
use crate::simulator::{DiffEq, TaskMode, T, V};

/// Largest internal step used in [TaskMode::AdvanceToTime]
pub const MAX_STEP: f64 = 0.05;

/// Classical fourth-order Runge-Kutta over a [DiffEq]
///
/// In [TaskMode::AdvanceToTime] the interval is split into equal steps no
/// longer than the maximum step; in [TaskMode::SingleStep] one step spans the
/// whole interval.
#[derive(Debug, Clone)]
pub struct Rk4 {
    diffeq: DiffEq,
    p: V,
    max_step: f64,
}

impl Rk4 {
    pub fn new(diffeq: DiffEq, p: Vec<f64>) -> Self {
        Rk4 {
            diffeq,
            p: V::from_vec(p),
            max_step: MAX_STEP,
        }
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    fn derivative(&self, x: &V, t: T, rateiv: &V) -> V {
        let mut dx = V::zeros(x.len());
        (self.diffeq)(x, &self.p, t, &mut dx, rateiv);
        dx
    }

    fn step(&self, x: &V, t: T, h: T, rateiv: &V) -> V {
        let k1 = self.derivative(x, t, rateiv);
        let k2 = self.derivative(&(x + &k1 * (h / 2.0)), t + h / 2.0, rateiv);
        let k3 = self.derivative(&(x + &k2 * (h / 2.0)), t + h / 2.0, rateiv);
        let k4 = self.derivative(&(x + &k3 * h), t + h, rateiv);
        x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
    }
}

impl Integrator for Rk4 {
    fn integrate(
        &self,
        x: &V,
        rateiv: &V,
        tfrom: T,
        tto: T,
        mode: TaskMode,
    ) -> Result<V, DosingError> {
        if !(self.max_step > 0.0) {
            return Err(DosingError::Integration(format!(
                "maximum step must be positive, got {}",
                self.max_step
            )));
        }
        let span = tto - tfrom;
        let nsteps = match mode {
            TaskMode::SingleStep => 1,
            TaskMode::AdvanceToTime => (span / self.max_step).ceil().max(1.0) as usize,
        };
        let h = span / nsteps as f64;

        let mut state = x.clone();
        for n in 0..nsteps {
            state = self.step(&state, tfrom + n as f64 * h, h, rateiv);
        }
        Ok(state)
    }
}

impl ODE {
    /// A numerically integrated system with `neq` compartments
    ///
    /// # Arguments
    ///
    /// * `diffeq` - The right-hand side, see [DiffEq]
    /// * `p` - Model parameters passed to `diffeq`
    /// * `neq` - Number of compartments
    pub fn new(diffeq: DiffEq, p: Vec<f64>, neq: usize) -> Self {
        System::with_integrator(Rk4::new(diffeq, p), neq)
    }

    pub fn with_max_step(self, max_step: f64) -> Self {
        System {
            integrator: self.integrator.with_max_step(max_step),
            compartments: self.compartments,
        }
    }
}
