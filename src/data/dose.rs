use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{EventKind, TimeRecord, Timed};

/// A dosing record
///
/// A [DoseEvent] is a [TimeRecord] with dosing attributes. With `rate == 0`
/// a dose is an instantaneous bolus of `amount * fn`, with `rate > 0` it is a
/// zero-order infusion lasting [DoseEvent::duration].
///
/// Derived events (infusion off, additional doses) are produced by
/// [DoseEvent::schedule] and never appear in the output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DoseEvent {
    record: TimeRecord,
    amt: f64,
    rate: f64,
    ss: bool,
    addl: u32,
    ii: f64,
    fn_: f64,
    armed: bool,
}

impl DoseEvent {
    /// Create a new dose event
    ///
    /// # Arguments
    ///
    /// * `cmt` - Signed compartment number (one-indexed)
    /// * `kind` - The event kind
    /// * `amt` - Dose amount
    /// * `time` - Time of the dose
    /// * `rate` - Infusion rate, zero for a bolus
    /// * `pos` - Tie-break position
    /// * `id` - Subject identifier
    pub fn new(
        cmt: i32,
        kind: EventKind,
        amt: f64,
        time: f64,
        rate: f64,
        pos: i32,
        id: f64,
    ) -> Self {
        DoseEvent {
            record: TimeRecord::new(kind, time, cmt, pos, id),
            amt,
            rate,
            ss: false,
            addl: 0,
            ii: 0.0,
            fn_: 1.0,
            armed: true,
        }
    }

    /// A bolus (or infusion, when `rate > 0`) into `cmt` at `time`
    pub fn dose(cmt: i32, amt: f64, time: f64, rate: f64) -> Self {
        DoseEvent::new(cmt, EventKind::Dose, amt, time, rate, 0, 0.0)
    }

    pub fn record(&self) -> &TimeRecord {
        &self.record
    }
    pub(crate) fn record_mut(&mut self) -> &mut TimeRecord {
        &mut self.record
    }
    pub fn kind(&self) -> EventKind {
        self.record.kind()
    }
    pub fn cmt(&self) -> i32 {
        self.record.cmt()
    }
    pub fn id(&self) -> f64 {
        self.record.id()
    }
    pub fn set_time(&mut self, time: f64) {
        self.record.set_time(time);
    }
    pub fn set_pos(&mut self, pos: i32) {
        self.record.set_pos(pos);
    }
    pub fn set_id(&mut self, id: f64) {
        self.record.set_id(id);
    }
    pub fn output(&self) -> bool {
        self.record.output()
    }
    pub fn set_output(&mut self, output: bool) {
        self.record.set_output(output);
    }

    pub fn amt(&self) -> f64 {
        self.amt
    }
    pub fn set_amt(&mut self, amt: f64) {
        self.amt = amt;
    }
    pub fn rate(&self) -> f64 {
        self.rate
    }
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }
    /// Whether this dose is given at steady state
    pub fn ss(&self) -> bool {
        self.ss
    }
    pub fn set_ss(&mut self, ss: bool) {
        self.ss = ss;
    }
    /// Number of additional doses after this one
    pub fn addl(&self) -> u32 {
        self.addl
    }
    pub fn set_addl(&mut self, addl: u32) {
        self.addl = addl;
    }
    /// Interdose interval
    pub fn ii(&self) -> f64 {
        self.ii
    }
    pub fn set_ii(&mut self, ii: f64) {
        self.ii = ii;
    }
    /// Bioavailable fraction, 1.0 unless set
    ///
    /// The value is not clamped; a fraction of zero makes the dose contribute nothing.
    pub fn fn_(&self) -> f64 {
        self.fn_
    }
    pub fn set_fn(&mut self, fn_: f64) {
        self.fn_ = fn_;
    }
    /// A disarmed event stays in the stream but [DoseEvent::implement] does nothing
    pub fn armed(&self) -> bool {
        self.armed
    }
    pub fn arm(&mut self) {
        self.armed = true;
    }
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether this dose starts a zero-order infusion
    pub fn is_infusion(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::Dose | EventKind::ResetAndDose | EventKind::InfusionStart
        ) && self.rate > 0.0
    }

    /// Infusion duration for a bioavailable fraction `f`
    pub fn duration_with(&self, f: f64) -> f64 {
        f * self.amt / self.rate
    }

    /// Infusion duration using this event's own bioavailable fraction
    pub fn duration(&self) -> f64 {
        self.duration_with(self.fn_)
    }
}

impl Timed for DoseEvent {
    fn record(&self) -> &TimeRecord {
        &self.record
    }
}

impl fmt::Display for DoseEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.rate > 0.0 {
            write!(
                f,
                "{} at time {:.2} with amount {:.2} at rate {:.2} in compartment {}",
                self.kind(),
                self.record.time(),
                self.amt,
                self.rate,
                self.cmt()
            )
        } else {
            write!(
                f,
                "{} at time {:.2} with amount {:.2} in compartment {}",
                self.kind(),
                self.record.time(),
                self.amt,
                self.cmt()
            )
        }
    }
}
