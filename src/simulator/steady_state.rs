//! Steady-state resolution
//!
//! A steady-state dose is resolved by simulating identical dosing cycles, one
//! interdose interval each, until the compartment vector at the end of a cycle
//! stops changing. Convergence is judged on the sum of squared differences
//! between consecutive cycle-end states: once the absolute change in that sum
//! between two cycles drops below [SteadyStateOptions::tolerance], after a
//! warm-up of [SteadyStateOptions::warmup] cycles, the loop stops.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::data::ordering::LATE_POSITION;
use crate::data::{DoseEvent, EventKind, Timed};
use crate::error::DosingError;
use crate::simulator::{OdeSystem, TaskMode};

/// Ceiling on the cycle counter
pub const N_SS: usize = 1000;
/// Absolute change in the sum of squares below which a cycle is converged
pub const CRIT_DIFF_SS: f64 = 1e-10;
/// Cycles that never trigger an early exit
pub const SS_WARMUP: usize = 10;

/// Options for the steady-state loops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteadyStateOptions {
    /// Cycles are counted from 1 and the loop runs while the counter is below this value
    pub max_cycles: usize,
    pub tolerance: f64,
    pub warmup: usize,
}

impl Default for SteadyStateOptions {
    fn default() -> Self {
        Self {
            max_cycles: N_SS,
            tolerance: CRIT_DIFF_SS,
            warmup: SS_WARMUP,
        }
    }
}

impl SteadyStateOptions {
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }
}

/// Outcome of a steady-state loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteadyStateReport {
    /// Number of dosing cycles simulated
    pub cycles: usize,
    pub converged: bool,
    /// Last absolute change in the sum of squares, `NaN` if none was computed
    pub delta: f64,
}

/// Tracks cycle-end states and decides when the loop has converged
struct Convergence {
    last: Vec<f64>,
    last_sum: f64,
    delta: f64,
    tolerance: f64,
    warmup: usize,
}

impl Convergence {
    fn new(neq: usize, options: &SteadyStateOptions) -> Self {
        Convergence {
            last: vec![0.0; neq],
            last_sum: 0.0,
            delta: f64::NAN,
            tolerance: options.tolerance,
            warmup: options.warmup,
        }
    }

    /// Record the state at the end of `cycle`, returns true once converged
    fn update<S: OdeSystem + ?Sized>(&mut self, system: &S, cycle: usize) -> bool {
        let mut this_sum = 0.0;
        for (j, last) in self.last.iter_mut().enumerate() {
            let y = system.y(j);
            this_sum += (y - *last).powi(2);
            *last = y;
        }

        let mut converged = false;
        if cycle > self.warmup {
            self.delta = (this_sum - self.last_sum).abs();
            converged = self.delta < self.tolerance;
        }
        self.last_sum = this_sum;
        converged
    }

    fn report(&self, cycles: usize, converged: bool, kind: &str) -> SteadyStateReport {
        if converged {
            tracing::debug!(cycles, delta = self.delta, "{} steady state converged", kind);
        } else {
            tracing::warn!(
                cycles,
                delta = self.delta,
                "{} steady state did not converge within the cycle limit",
                kind
            );
        }
        SteadyStateReport {
            cycles,
            converged,
            delta: self.delta,
        }
    }
}

impl DoseEvent {
    /// Bring `system` to the steady state of repeated boluses every `ii`
    ///
    /// All rate accumulators are cleared first. The task mode is restored to
    /// [TaskMode::AdvanceToTime] when the loop ends.
    pub fn steady_bolus<S: OdeSystem + ?Sized>(
        &self,
        system: &mut S,
        options: &SteadyStateOptions,
    ) -> Result<SteadyStateReport, DosingError> {
        system.rate_reset();
        system.reinit();

        // Owned by this loop alone; only its dose attributes are read
        let mut evon = DoseEvent::new(
            self.cmt(),
            EventKind::Dose,
            self.amt(),
            self.time(),
            self.rate(),
            self.pos(),
            self.id(),
        );
        evon.set_fn(self.fn_());

        let mut convergence = Convergence::new(system.neq(), options);
        let mut cycles = 0;
        let mut converged = false;

        for i in 1..options.max_cycles {
            let tfrom = (i - 1) as f64 * self.ii();
            let tto = i as f64 * self.ii();
            evon.implement_with(system, options)?;
            system.reinit();
            system.advance(tfrom, tto)?;
            cycles = i;

            if convergence.update(system, i) {
                converged = true;
                break;
            }
        }

        system.set_task_mode(TaskMode::AdvanceToTime);
        Ok(convergence.report(cycles, converged, "bolus"))
    }

    /// Bring `system` to the steady state of repeated infusions every `ii`
    ///
    /// The infusion lasts `fn * amt / rate` and may outlast the interval, in
    /// which case the ends of earlier infusions are applied in later cycles.
    pub fn steady_infusion<S: OdeSystem + ?Sized>(
        &self,
        system: &mut S,
        options: &SteadyStateOptions,
    ) -> Result<SteadyStateReport, DosingError> {
        let duration = self.duration();
        system.rate_reset();

        // Re-timed every cycle; nothing else holds it. The fraction is already in the duration.
        let mut evon = DoseEvent::new(
            self.cmt(),
            EventKind::Dose,
            self.amt(),
            self.time(),
            self.rate(),
            self.pos(),
            self.id(),
        );
        // Pending infusion ends, ascending in time
        let mut offs: VecDeque<DoseEvent> = VecDeque::new();

        let mut convergence = Convergence::new(system.neq(), options);
        let mut tfrom = 0.0;
        let mut cycles = 0;
        let mut converged = false;

        for i in 1..options.max_cycles {
            evon.set_time(tfrom);
            evon.implement_with(system, options)?;
            system.reinit();

            offs.push_back(DoseEvent::new(
                self.cmt(),
                EventKind::InfusionStop,
                self.amt(),
                tfrom + duration,
                self.rate(),
                LATE_POSITION,
                self.id(),
            ));

            let nexti = i as f64 * self.ii();
            while offs.front().is_some_and(|off| off.time() <= nexti) {
                if let Some(off) = offs.pop_front() {
                    let toff = off.time();
                    system.advance(tfrom, toff)?;
                    off.implement_with(system, options)?;
                    system.reinit();
                    tfrom = toff;
                }
            }

            system.reinit();
            system.advance(tfrom, nexti)?;
            tfrom = nexti;
            cycles = i;

            if convergence.update(system, i) {
                converged = true;
                break;
            }
        }

        system.reinit();
        Ok(convergence.report(cycles, converged, "infusion"))
    }
}
