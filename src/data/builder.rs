use crate::data::*;

pub trait ScheduleBuilderExt {
    fn builder(id: f64) -> ScheduleBuilder;
}

impl ScheduleBuilderExt for Schedule {
    fn builder(id: f64) -> ScheduleBuilder {
        ScheduleBuilder {
            id,
            records: Vec::new(),
        }
    }
}

/// Fluent construction of a [Schedule]
///
/// Records get consecutive positions in the order they are added, as rows of
/// a data set would. Modifiers such as [ScheduleBuilder::addl] apply to the
/// last added record.
pub struct ScheduleBuilder {
    id: f64,
    records: Vec<Record>,
}

impl ScheduleBuilder {
    fn next_pos(&self) -> i32 {
        self.records.len() as i32
    }

    pub fn event(mut self, mut event: DoseEvent) -> Self {
        event.set_id(self.id);
        event.set_pos(self.next_pos());
        self.records.push(Record::Dose(event));
        self
    }

    pub fn record(mut self, mut record: TimeRecord) -> Self {
        record.set_id(self.id);
        record.set_pos(self.next_pos());
        self.records.push(Record::Observation(record));
        self
    }

    pub fn bolus(self, time: f64, amount: f64, cmt: i32) -> Self {
        self.event(DoseEvent::dose(cmt, amount, time, 0.0))
    }

    pub fn infusion(self, time: f64, amount: f64, cmt: i32, rate: f64) -> Self {
        self.event(DoseEvent::dose(cmt, amount, time, rate))
    }

    pub fn observation(self, time: f64, cmt: i32) -> Self {
        self.record(TimeRecord::observation(time, cmt, 0, 0.0))
    }

    pub fn reset(self, time: f64) -> Self {
        self.event(DoseEvent::new(0, EventKind::Reset, 0.0, time, 0.0, 0, 0.0))
    }

    /// Reset every compartment, then dose into `cmt`
    pub fn reset_dose(self, time: f64, amount: f64, cmt: i32, rate: f64) -> Self {
        self.event(DoseEvent::new(
            cmt,
            EventKind::ResetAndDose,
            amount,
            time,
            rate,
            0,
            0.0,
        ))
    }

    /// Turn `cmt` on, or off when `cmt` is negative
    pub fn toggle(self, time: f64, cmt: i32) -> Self {
        self.event(DoseEvent::new(cmt, EventKind::Toggle, 0.0, time, 0.0, 0, 0.0))
    }

    pub fn replace(self, time: f64, amount: f64, cmt: i32) -> Self {
        self.event(DoseEvent::new(cmt, EventKind::Replace, amount, time, 0.0, 0, 0.0))
    }

    pub fn extra_dose(self, time: f64, cmt: i32) -> Self {
        self.event(DoseEvent::new(cmt, EventKind::ExtraDose, 0.0, time, 0.0, 0, 0.0))
    }

    fn last_dose(&mut self) -> &mut DoseEvent {
        match self.records.last_mut() {
            Some(Record::Dose(dose)) => dose,
            _ => panic!("There is no dose to modify"),
        }
    }

    /// Give `addl` additional doses, `ii` apart, after the last dose
    pub fn addl(mut self, addl: u32, ii: f64) -> Self {
        let dose = self.last_dose();
        dose.set_addl(addl);
        dose.set_ii(ii);
        self
    }

    /// Mark the last dose as given at steady state with interval `ii`
    pub fn steady_state(mut self, ii: f64) -> Self {
        let dose = self.last_dose();
        dose.set_ss(true);
        dose.set_ii(ii);
        self
    }

    /// Set the bioavailable fraction of the last dose
    pub fn fraction(mut self, f: f64) -> Self {
        self.last_dose().set_fn(f);
        self
    }

    /// Repeat the last record `n` times, `delta` apart
    pub fn repeat(mut self, n: usize, delta: f64) -> Self {
        let last = match self.records.last() {
            Some(record) => record.clone(),
            None => panic!("There is no event to repeat"),
        };
        for i in 1..=n {
            let mut next = last.clone();
            let time = next.time() + delta * i as f64;
            next.record_mut().set_time(time);
            next.record_mut().set_pos(self.next_pos());
            self.records.push(next);
        }
        self
    }

    pub fn build(self) -> Schedule {
        Schedule::new(self.id, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_positions_and_id() {
        let schedule = Schedule::builder(3.0)
            .bolus(0.0, 100.0, 1)
            .observation(1.0, 1)
            .observation(0.0, 1)
            .build();

        assert_eq!(schedule.id(), 3.0);
        let order: Vec<(f64, i32)> = schedule.iter().map(|r| (r.time(), r.pos())).collect();
        assert_eq!(order, vec![(0.0, 0), (0.0, 2), (1.0, 1)]);
        assert!(schedule.iter().all(|r| r.record().id() == 3.0));
    }

    #[test]
    fn test_builder_modifiers() {
        let schedule = Schedule::builder(1.0)
            .infusion(0.0, 100.0, 2, 10.0)
            .steady_state(24.0)
            .fraction(0.8)
            .build();
        let dose = schedule.doses().next().unwrap();
        assert!(dose.ss());
        assert_eq!(dose.ii(), 24.0);
        assert_eq!(dose.fn_(), 0.8);
        assert_eq!(dose.rate(), 10.0);
    }

    #[test]
    fn test_repeat() {
        let schedule = Schedule::builder(1.0)
            .observation(1.0, 1)
            .repeat(3, 2.0)
            .build();
        let times: Vec<f64> = schedule.iter().map(|r| r.time()).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    #[should_panic(expected = "There is no dose to modify")]
    fn test_addl_without_dose_panics() {
        Schedule::builder(1.0).observation(1.0, 1).addl(2, 12.0);
    }
}
