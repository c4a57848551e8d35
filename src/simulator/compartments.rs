use crate::simulator::{TaskMode, V};

/// Bookkeeping behind an [crate::simulator::OdeSystem]
///
/// Holds the compartment values with their on/off flags, the input rate
/// accumulators and bioavailability multipliers, and counters that make the
/// engine's calls observable.
#[derive(Debug, Clone)]
pub struct Compartments {
    y: V,
    on: Vec<bool>,
    rate: V,
    fbio: V,
    xdose: f64,
    task: TaskMode,
    clock: f64,
    reinits: usize,
    advances: usize,
    subjects: usize,
}

impl Compartments {
    pub fn new(neq: usize) -> Self {
        Compartments {
            y: V::zeros(neq),
            on: vec![true; neq],
            rate: V::zeros(neq),
            fbio: V::from_element(neq, 1.0),
            xdose: 0.0,
            task: TaskMode::default(),
            clock: 0.0,
            reinits: 0,
            advances: 0,
            subjects: 0,
        }
    }

    pub fn neq(&self) -> usize {
        self.y.len()
    }
    pub fn values(&self) -> &V {
        &self.y
    }
    pub fn y(&self, cmt: usize) -> f64 {
        self.y[cmt]
    }
    pub fn set_y(&mut self, cmt: usize, value: f64) {
        self.y[cmt] = value;
    }
    pub fn is_on(&self, cmt: usize) -> bool {
        self.on[cmt]
    }
    pub fn set_on(&mut self, cmt: usize, on: bool) {
        self.on[cmt] = on;
    }
    pub fn rate(&self, cmt: usize) -> f64 {
        self.rate[cmt]
    }
    pub fn rate_add(&mut self, cmt: usize, rate: f64) {
        self.rate[cmt] += rate;
    }
    /// Removal floors at zero so rounding never leaves a negative input
    pub fn rate_rm(&mut self, cmt: usize, rate: f64) {
        self.rate[cmt] = (self.rate[cmt] - rate).max(0.0);
    }
    pub fn set_rate(&mut self, cmt: usize, rate: f64) {
        self.rate[cmt] = rate;
    }
    /// Input rates with off compartments masked out
    pub fn active_rates(&self) -> V {
        V::from_iterator(
            self.neq(),
            self.rate
                .iter()
                .zip(&self.on)
                .map(|(&rate, &on)| if on { rate } else { 0.0 }),
        )
    }
    pub fn fbio(&self, cmt: usize) -> f64 {
        self.fbio[cmt]
    }
    pub fn set_fbio(&mut self, cmt: usize, f: f64) {
        self.fbio[cmt] = f;
    }
    pub fn xdose(&self) -> f64 {
        self.xdose
    }
    pub fn set_xdose(&mut self, xdose: f64) {
        self.xdose = xdose;
    }
    pub fn task_mode(&self) -> TaskMode {
        self.task
    }
    pub fn set_task_mode(&mut self, mode: TaskMode) {
        self.task = mode;
    }
    /// Time the state vector refers to
    pub fn clock(&self) -> f64 {
        self.clock
    }
    pub fn set_clock(&mut self, time: f64) {
        self.clock = time;
    }
    /// Number of stepper re-initializations
    pub fn reinits(&self) -> usize {
        self.reinits
    }
    pub(crate) fn count_reinit(&mut self) {
        self.reinits += 1;
    }
    /// Number of completed advances
    pub fn advances(&self) -> usize {
        self.advances
    }
    /// Number of times the new-subject hook ran
    pub fn subjects(&self) -> usize {
        self.subjects
    }
    pub(crate) fn count_subject(&mut self) {
        self.subjects += 1;
    }

    /// Accept the integrated state `next` at `time`; off compartments keep their value
    pub(crate) fn accept(&mut self, next: V, time: f64) {
        for (cmt, value) in next.iter().enumerate() {
            if self.on[cmt] {
                self.y[cmt] = *value;
            }
        }
        self.clock = time;
        self.advances += 1;
    }
}
