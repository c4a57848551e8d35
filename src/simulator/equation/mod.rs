//! Reference [OdeSystem] implementations
//!
//! A [System] couples the compartment bookkeeping with an [Integrator] that
//! moves the state vector forward in time. Two integrators are provided:
//! closed-form solutions ([Analytical]) and a fixed-step Runge-Kutta scheme
//! over a differential equation closure ([ODE]).

mod closed_form;
mod rk4;

pub use closed_form::ClosedForm;
pub use rk4::Rk4;

use crate::error::DosingError;
use crate::simulator::{Compartments, OdeSystem, TaskMode, T, V};

/// Moves a state vector from `tfrom` to `tto` under constant input rates
pub trait Integrator {
    fn integrate(
        &self,
        x: &V,
        rateiv: &V,
        tfrom: T,
        tto: T,
        mode: TaskMode,
    ) -> Result<V, DosingError>;
}

/// An [OdeSystem] for one subject
#[derive(Debug, Clone)]
pub struct System<I> {
    integrator: I,
    compartments: Compartments,
}

/// A system solved in closed form
pub type Analytical = System<ClosedForm>;
/// A system integrated numerically
pub type ODE = System<Rk4>;

impl<I: Integrator> System<I> {
    pub fn with_integrator(integrator: I, neq: usize) -> Self {
        System {
            integrator,
            compartments: Compartments::new(neq),
        }
    }

    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    pub fn compartments(&self) -> &Compartments {
        &self.compartments
    }

    pub fn compartments_mut(&mut self) -> &mut Compartments {
        &mut self.compartments
    }
}

impl<I: Integrator> OdeSystem for System<I> {
    fn neq(&self) -> usize {
        self.compartments.neq()
    }
    fn is_on(&self, cmt: usize) -> bool {
        self.compartments.is_on(cmt)
    }
    fn on(&mut self, cmt: usize) {
        self.compartments.set_on(cmt, true);
    }
    fn off(&mut self, cmt: usize) {
        self.compartments.set_on(cmt, false);
    }
    fn y(&self, cmt: usize) -> f64 {
        self.compartments.y(cmt)
    }
    fn set_y(&mut self, cmt: usize, value: f64) {
        self.compartments.set_y(cmt, value);
    }
    fn rate_add(&mut self, cmt: usize, rate: f64) {
        self.compartments.rate_add(cmt, rate);
    }
    fn rate_rm(&mut self, cmt: usize, rate: f64) {
        self.compartments.rate_rm(cmt, rate);
    }
    fn set_rate(&mut self, cmt: usize, rate: f64) {
        self.compartments.set_rate(cmt, rate);
    }
    fn fbio(&mut self, cmt: usize, f: f64) {
        self.compartments.set_fbio(cmt, f);
    }
    fn xdose(&self) -> f64 {
        self.compartments.xdose()
    }
    fn reinit(&mut self) {
        self.compartments.count_reinit();
    }
    fn init_call(&mut self, time: f64) {
        self.compartments.set_clock(time);
    }
    fn begin_subject(&mut self, time: f64) {
        self.compartments.count_subject();
        self.compartments.set_clock(time);
    }

    fn advance(&mut self, tfrom: f64, tto: f64) -> Result<(), DosingError> {
        if tto < tfrom {
            return Err(DosingError::Integration(format!(
                "cannot integrate backwards from {} to {}",
                tfrom, tto
            )));
        }
        if tto == tfrom {
            return Ok(());
        }

        let rateiv = self.compartments.active_rates();
        let next = self.integrator.integrate(
            self.compartments.values(),
            &rateiv,
            tfrom,
            tto,
            self.compartments.task_mode(),
        )?;
        if next.iter().any(|value| !value.is_finite()) {
            return Err(DosingError::Integration(format!(
                "non-finite state integrating from {} to {}",
                tfrom, tto
            )));
        }
        self.compartments.accept(next, tto);
        Ok(())
    }

    fn task_mode(&self) -> TaskMode {
        self.compartments.task_mode()
    }
    fn set_task_mode(&mut self, mode: TaskMode) {
        self.compartments.set_task_mode(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::models::one_compartment;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_decays() {
        let mut system = Analytical::new(one_compartment, vec![0.1], 1);
        system.set_y(0, 100.0);
        system.advance(0.0, 10.0).unwrap();
        assert_relative_eq!(system.y(0), 100.0 * (-1.0_f64).exp(), max_relative = 1e-12);
        assert_eq!(system.compartments().clock(), 10.0);
    }

    #[test]
    fn test_off_compartment_is_held() {
        let mut system = Analytical::new(one_compartment, vec![0.1], 1);
        system.set_y(0, 100.0);
        system.rate_add(0, 10.0);
        system.off(0);
        system.advance(0.0, 10.0).unwrap();
        assert_eq!(system.y(0), 100.0);
    }

    #[test]
    fn test_backwards_advance_fails() {
        let mut system = Analytical::new(one_compartment, vec![0.1], 1);
        assert!(matches!(
            system.advance(5.0, 1.0),
            Err(DosingError::Integration(_))
        ));
        system.advance(5.0, 5.0).unwrap();
        assert_eq!(system.compartments().advances(), 0);
    }

    #[test]
    fn test_non_finite_state_fails() {
        // ke = 0 divides the infusion term by zero
        let mut system = Analytical::new(one_compartment, vec![0.0], 1);
        system.rate_add(0, 1.0);
        assert!(system.advance(0.0, 1.0).is_err());
    }
}
