mod compartments;
pub mod equation;
mod expand;
mod implement;
pub mod models;
mod mtime;
pub mod steady_state;
mod system;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{EventKind, Record, Schedule, Timed};
use crate::error::DosingError;

pub use compartments::Compartments;
pub use equation::{Analytical, Integrator, System, ODE};
pub use mtime::add_mtime;
pub use steady_state::{SteadyStateOptions, SteadyStateReport, CRIT_DIFF_SS, N_SS, SS_WARMUP};
pub use system::{OdeSystem, TaskMode};

pub type T = f64;
pub type V = nalgebra::DVector<T>;

/// This closure represents the differential equation of the model:
/// Params:
/// - x: The state vector at time t
/// - p: The parameters of the model
/// - t: The time at which the differential equation is evaluated
/// - dx: A mutable reference to the derivative of the state vector at time t
/// - rateiv: A vector of infusion rates at time t
/// Example:
/// ```ignore
/// use pkevents::*;
/// let diff_eq = |x, p, t, dx, rateiv| {
///  let (ka, ke) = (p[0], p[1]);
///  dx[0] = -ka * x[0];
///  dx[1] = ka * x[0] - ke * x[1] + rateiv[1];
/// };
/// ```
pub type DiffEq = fn(&V, &V, T, &mut V, &V);

/// This closure represents an Analytical solution of the model, see [models] for examples.
/// Params:
/// - x: The state vector at the start of the interval
/// - p: The parameters of the model
/// - t: The length of the interval
/// - rateiv: A vector of infusion rates held constant over the interval
pub type AnalyticalEq = fn(&V, &V, T, &V) -> V;

/// Options for [simulate_subject] and [simulate_population]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Additional doses later than this time are not generated, `None` for no limit
    pub horizon: Option<f64>,
    /// Give generated additional doses an early position so they sort before
    /// records sharing their time
    pub prepend_additional: bool,
    /// Times at which phantom observations are inserted
    pub forced_times: Vec<f64>,
    /// Log forced times that fall outside the record stream
    pub debug: bool,
    pub steady_state: SteadyStateOptions,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            horizon: None,
            prepend_additional: false,
            forced_times: Vec::new(),
            debug: false,
            steady_state: SteadyStateOptions::default(),
        }
    }
}

impl SimulationOptions {
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_prepend_additional(mut self, prepend: bool) -> Self {
        self.prepend_additional = prepend;
        self
    }

    pub fn with_forced_times(mut self, times: Vec<f64>) -> Self {
        self.forced_times = times;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_steady_state(mut self, options: SteadyStateOptions) -> Self {
        self.steady_state = options;
        self
    }
}

/// Compartment vector after the record at `time` was processed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub time: f64,
    pub id: f64,
    pub kind: EventKind,
    pub pos: i32,
    pub state: Vec<f64>,
}

/// Output records of one subject, in stream order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStates {
    id: f64,
    snapshots: Vec<StateSnapshot>,
}

impl SubjectStates {
    pub fn id(&self) -> f64 {
        self.id
    }

    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Values of compartment `cmt` (zero-based) across the snapshots
    pub fn compartment(&self, cmt: usize) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.state[cmt]).collect()
    }

    /// Snapshot times
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }
}

/// Run one subject's schedule through `system`
///
/// The schedule is copied, expanded up to the horizon and augmented with the
/// forced times. The system is started at the first record time and advanced
/// from record to record; dose records are implemented at their time and every
/// record flagged for output is snapshotted after it was processed.
pub fn simulate_subject<S: OdeSystem + ?Sized>(
    system: &mut S,
    schedule: &Schedule,
    options: &SimulationOptions,
) -> Result<SubjectStates, DosingError> {
    if schedule.is_empty() {
        return Err(DosingError::EmptySchedule);
    }

    let mut stream = schedule.clone();
    let horizon = options.horizon.unwrap_or(f64::INFINITY);
    stream.expand(horizon, options.prepend_additional)?;
    stream.insert_forced_times(&options.forced_times, &[], options.debug);

    let Some((start, _)) = stream.time_span() else {
        return Err(DosingError::EmptySchedule);
    };
    tracing::debug!(id = stream.id(), records = stream.len(), "simulating subject");

    system.begin_subject(start);
    let mut clock = start;
    let mut snapshots = Vec::new();

    for record in stream.iter() {
        let time = record.time();
        system.advance(clock, time)?;
        clock = time;

        if let Record::Dose(dose) = record {
            dose.implement_with(system, &options.steady_state)?;
        }

        if record.output() {
            snapshots.push(StateSnapshot {
                time,
                id: record.record().id(),
                kind: record.kind(),
                pos: record.pos(),
                state: system.state(),
            });
        }
    }

    Ok(SubjectStates {
        id: stream.id(),
        snapshots,
    })
}

/// Simulate every schedule on its own copy of `template`
///
/// Subjects run in parallel. The results keep the order of `schedules`.
pub fn simulate_population<S>(
    template: &S,
    schedules: &[Schedule],
    options: &SimulationOptions,
) -> Vec<Result<SubjectStates, DosingError>>
where
    S: OdeSystem + Clone + Send + Sync,
{
    schedules
        .par_iter()
        .map(|schedule| {
            let mut system = template.clone();
            simulate_subject(&mut system, schedule, options)
        })
        .collect()
}
