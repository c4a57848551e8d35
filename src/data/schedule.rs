use serde::{Deserialize, Serialize};

use crate::data::ordering::{is_sorted, sort_records};
use crate::data::{DoseEvent, Record, Timed};
use crate::error::DosingError;
use crate::simulator::add_mtime;

/// The record stream of one subject
///
/// A [Schedule] holds raw records as provided (doses and observations) and,
/// after [Schedule::expand], the derived events that realize additional doses
/// and infusion ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Schedule {
    id: f64,
    records: Vec<Record>,
}

impl Schedule {
    /// Create a schedule from records, sorting them by time and position
    pub fn new(id: f64, records: Vec<Record>) -> Self {
        let mut schedule = Schedule { id, records };
        schedule.sort();
        schedule
    }

    pub fn id(&self) -> f64 {
        self.id
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    pub fn iter(&'_ self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record; call [Schedule::sort] before simulating
    pub fn push(&mut self, record: impl Into<Record>) {
        self.records.push(record.into());
    }

    /// All dose events in stream order
    pub fn doses(&self) -> impl Iterator<Item = &DoseEvent> {
        self.records.iter().filter_map(Record::as_dose)
    }

    /// Time of the first and last record
    pub fn time_span(&self) -> Option<(f64, f64)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.time(), last.time())),
            _ => None,
        }
    }

    /// Sort by time, then position
    pub fn sort(&mut self) {
        sort_records(&mut self.records);
    }

    pub fn is_sorted(&self) -> bool {
        is_sorted(&self.records)
    }

    /// Expand every dose currently in the stream into its derived events
    ///
    /// Only the doses present before the call are expanded; the events they
    /// produce are appended and never expanded themselves. Additional doses
    /// later than `horizon` are not generated. The stream is sorted afterwards.
    pub fn expand(&mut self, horizon: f64, prepend: bool) -> Result<(), DosingError> {
        let raw: Vec<DoseEvent> = self.doses().cloned().collect();
        for dose in raw.iter().filter(|dose| dose.fn_() != 0.0) {
            dose.validate()?;
        }
        for dose in &raw {
            dose.schedule(&mut self.records, horizon, prepend)?;
        }
        self.sort();
        Ok(())
    }

    /// Insert phantom observations at forced sample times
    ///
    /// See [add_mtime]; the stream is sorted first so its bounds are known.
    pub fn insert_forced_times(&mut self, times: &[f64], extra: &[f64], debug: bool) {
        if !self.is_sorted() {
            self.sort();
        }
        add_mtime(&mut self.records, times, extra, debug);
    }
}

impl IntoIterator for Schedule {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
