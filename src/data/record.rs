use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::DoseEvent;
use crate::error::DosingError;

/// The kind of a record, the `EVID` of the data set
///
/// Dosing kinds are implemented against an [crate::simulator::OdeSystem] by
/// [DoseEvent::implement]; observation kinds carry no effect and only mark a
/// time at which the system is integrated to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// EVID 0
    Observation,
    /// EVID 1, a bolus, or an infusion when the rate is non-zero
    Dose,
    /// EVID 2, turns a compartment on (positive `cmt`) or off (negative `cmt`)
    Toggle,
    /// EVID 3, wipes every compartment
    Reset,
    /// EVID 4, a reset followed by a dose at the same instant
    ResetAndDose,
    /// EVID 5
    InfusionStart,
    /// EVID 8, overwrites the compartment value with the amount
    Replace,
    /// EVID 9
    InfusionStop,
    /// EVID 11, adds the system-provided extra dose to a compartment
    ExtraDose,
    /// EVID 100, a forced sample time without effect
    Phantom,
}

impl EventKind {
    /// The integer code for this kind
    pub fn evid(&self) -> u32 {
        match self {
            EventKind::Observation => 0,
            EventKind::Dose => 1,
            EventKind::Toggle => 2,
            EventKind::Reset => 3,
            EventKind::ResetAndDose => 4,
            EventKind::InfusionStart => 5,
            EventKind::Replace => 8,
            EventKind::InfusionStop => 9,
            EventKind::ExtraDose => 11,
            EventKind::Phantom => 100,
        }
    }

    /// Whether records of this kind only mark a time and never change state
    pub fn is_observation(&self) -> bool {
        matches!(self, EventKind::Observation | EventKind::Phantom)
    }

    /// Whether [DoseEvent::implement] addresses a single compartment for this kind
    pub(crate) fn indexes_compartment(&self) -> bool {
        !matches!(
            self,
            EventKind::Observation | EventKind::Phantom | EventKind::Reset
        )
    }
}

impl TryFrom<u32> for EventKind {
    type Error = DosingError;

    fn try_from(evid: u32) -> Result<Self, Self::Error> {
        Ok(match evid {
            0 => EventKind::Observation,
            1 => EventKind::Dose,
            2 => EventKind::Toggle,
            3 => EventKind::Reset,
            4 => EventKind::ResetAndDose,
            5 => EventKind::InfusionStart,
            8 => EventKind::Replace,
            9 => EventKind::InfusionStop,
            11 => EventKind::ExtraDose,
            100 => EventKind::Phantom,
            _ => return Err(DosingError::UnknownEvid { evid }),
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} (EVID {})", self, self.evid())
    }
}

/// A timestamped row of a subject's record stream
///
/// `cmt` is signed: `|cmt| - 1` is the zero-based compartment index, and a
/// negative value is an "off" directive for [EventKind::Toggle].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeRecord {
    kind: EventKind,
    time: f64,
    cmt: i32,
    pos: i32,
    id: f64,
    output: bool,
}

impl TimeRecord {
    /// Create a new record that is included in the output
    ///
    /// # Arguments
    ///
    /// * `kind` - The event kind
    /// * `time` - Simulation time of the record
    /// * `cmt` - Signed compartment number (one-indexed)
    /// * `pos` - Tie-break position for records sharing a time
    /// * `id` - Subject identifier
    pub fn new(kind: EventKind, time: f64, cmt: i32, pos: i32, id: f64) -> Self {
        TimeRecord {
            kind,
            time,
            cmt,
            pos,
            id,
            output: true,
        }
    }

    /// An observation record at `time`
    pub fn observation(time: f64, cmt: i32, pos: i32, id: f64) -> Self {
        TimeRecord::new(EventKind::Observation, time, cmt, pos, id)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
    pub fn set_kind(&mut self, kind: EventKind) {
        self.kind = kind;
    }
    pub fn evid(&self) -> u32 {
        self.kind.evid()
    }
    pub fn time(&self) -> f64 {
        self.time
    }
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }
    pub fn cmt(&self) -> i32 {
        self.cmt
    }
    pub fn set_cmt(&mut self, cmt: i32) {
        self.cmt = cmt;
    }
    /// Zero-based compartment index, `None` when `cmt` is zero
    pub fn cmt_index(&self) -> Option<usize> {
        match self.cmt.unsigned_abs() {
            0 => None,
            n => Some(n as usize - 1),
        }
    }
    pub fn pos(&self) -> i32 {
        self.pos
    }
    pub fn set_pos(&mut self, pos: i32) {
        self.pos = pos;
    }
    pub fn id(&self) -> f64 {
        self.id
    }
    pub fn set_id(&mut self, id: f64) {
        self.id = id;
    }
    /// Whether the record appears in the simulation output
    pub fn output(&self) -> bool {
        self.output
    }
    pub fn set_output(&mut self, output: bool) {
        self.output = output;
    }
}

/// Read access to the [TimeRecord] part of anything that sits in a record stream
pub trait Timed {
    fn record(&self) -> &TimeRecord;

    fn time(&self) -> f64 {
        self.record().time()
    }
    fn pos(&self) -> i32 {
        self.record().pos()
    }
}

impl Timed for TimeRecord {
    fn record(&self) -> &TimeRecord {
        self
    }
}

/// One entry of a subject's record stream
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Record {
    /// A record without dosing attributes (observations, phantom observations)
    Observation(TimeRecord),
    /// A record that is implemented against the system
    Dose(DoseEvent),
}

impl Record {
    pub fn kind(&self) -> EventKind {
        self.record().kind()
    }
    pub fn output(&self) -> bool {
        self.record().output()
    }
    pub fn as_dose(&self) -> Option<&DoseEvent> {
        match self {
            Record::Dose(dose) => Some(dose),
            Record::Observation(_) => None,
        }
    }
    pub(crate) fn record_mut(&mut self) -> &mut TimeRecord {
        match self {
            Record::Observation(record) => record,
            Record::Dose(dose) => dose.record_mut(),
        }
    }
}

impl Timed for Record {
    fn record(&self) -> &TimeRecord {
        match self {
            Record::Observation(record) => record,
            Record::Dose(dose) => dose.record(),
        }
    }
}

impl From<TimeRecord> for Record {
    fn from(record: TimeRecord) -> Self {
        Record::Observation(record)
    }
}

impl From<DoseEvent> for Record {
    fn from(dose: DoseEvent) -> Self {
        Record::Dose(dose)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Record::Observation(record) => write!(
                f,
                "{} at time {:.2} (pos {})",
                record.kind, record.time, record.pos
            ),
            Record::Dose(dose) => write!(f, "{}", dose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evid_round_trip() {
        for evid in [0u32, 1, 2, 3, 4, 5, 8, 9, 11, 100] {
            let kind = EventKind::try_from(evid).unwrap();
            assert_eq!(kind.evid(), evid);
        }
    }

    #[test]
    fn test_unknown_evid() {
        assert_eq!(
            EventKind::try_from(7u32),
            Err(DosingError::UnknownEvid { evid: 7 })
        );
    }

    #[test]
    fn test_cmt_index() {
        let on = TimeRecord::new(EventKind::Toggle, 0.0, 3, 0, 1.0);
        let off = TimeRecord::new(EventKind::Toggle, 0.0, -3, 0, 1.0);
        let none = TimeRecord::new(EventKind::Reset, 0.0, 0, 0, 1.0);
        assert_eq!(on.cmt_index(), Some(2));
        assert_eq!(off.cmt_index(), Some(2));
        assert_eq!(none.cmt_index(), None);
    }

    #[test]
    fn test_record_defaults_to_output() {
        let mut record = TimeRecord::observation(4.0, 1, 2, 7.0);
        assert!(record.output());
        assert_eq!(record.kind(), EventKind::Observation);
        record.set_output(false);
        assert!(!record.output());
    }

    #[test]
    fn test_observation_kinds() {
        assert!(EventKind::Observation.is_observation());
        assert!(EventKind::Phantom.is_observation());
        assert!(!EventKind::Dose.is_observation());
        assert!(!EventKind::Reset.indexes_compartment());
        assert!(EventKind::Toggle.indexes_compartment());
    }
}
