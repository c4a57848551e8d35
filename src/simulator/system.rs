use serde::{Deserialize, Serialize};

use crate::error::DosingError;

/// How the integrator should treat a call to [OdeSystem::advance]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskMode {
    /// Integrate with internal steps until the end time is reached
    #[default]
    AdvanceToTime,
    /// Take a single step across the whole interval
    SingleStep,
}

/// The integration subsystem as seen by the dosing engine
///
/// Compartment arguments are zero-based indices. Implementations own the
/// compartment vector, the on/off flags and the rate accumulators of one
/// subject; the engine assumes exclusive access for the duration of an
/// [crate::DoseEvent::implement] call.
pub trait OdeSystem {
    /// Number of compartments
    fn neq(&self) -> usize;

    fn is_on(&self, cmt: usize) -> bool;
    fn on(&mut self, cmt: usize);
    fn off(&mut self, cmt: usize);

    /// Current value of a compartment
    fn y(&self, cmt: usize) -> f64;
    fn set_y(&mut self, cmt: usize, value: f64);

    /// Add `rate` to the active input rate of a compartment
    fn rate_add(&mut self, cmt: usize, rate: f64);
    /// Remove `rate` from the active input rate of a compartment
    fn rate_rm(&mut self, cmt: usize, rate: f64);
    /// Overwrite the active input rate of a compartment
    fn set_rate(&mut self, cmt: usize, rate: f64);
    /// Zero every rate accumulator
    fn rate_reset(&mut self) {
        for cmt in 0..self.neq() {
            self.set_rate(cmt, 0.0);
        }
    }

    /// Set the bioavailability multiplier of a compartment
    fn fbio(&mut self, cmt: usize, f: f64);

    /// Amount added by an extra-dose record
    fn xdose(&self) -> f64;

    /// Discard the stepper state after a discontinuity
    fn reinit(&mut self);

    /// Re-initialize the system clock at `time`
    fn init_call(&mut self, time: f64);

    /// Hook run at the start of a new subject, and on a full reset, at `time`
    fn begin_subject(&mut self, time: f64);

    /// Integrate from `tfrom` to `tto`
    fn advance(&mut self, tfrom: f64, tto: f64) -> Result<(), DosingError>;

    fn task_mode(&self) -> TaskMode;
    fn set_task_mode(&mut self, mode: TaskMode);

    /// Copy of the compartment vector
    fn state(&self) -> Vec<f64> {
        (0..self.neq()).map(|cmt| self.y(cmt)).collect()
    }
}
