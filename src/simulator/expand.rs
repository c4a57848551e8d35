use crate::data::ordering::{EARLY_POSITION, LATE_POSITION};
use crate::data::{DoseEvent, EventKind, Record, Timed};
use crate::error::DosingError;

impl DoseEvent {
    /// Check that a dose which repeats has an interval to repeat at
    pub fn validate(&self) -> Result<(), DosingError> {
        if (self.ss() || self.addl() > 0) && self.ii() <= 0.0 {
            return Err(DosingError::MissingInterval {
                time: self.time(),
                ii: self.ii(),
            });
        }
        Ok(())
    }

    /// Append to `records` the derived events that realize this dose
    ///
    /// This covers the end of an infusion, the ends of earlier infusions
    /// still running at a steady-state start, and the additional doses (with
    /// their own ends) up to `horizon`. Additional doses get [EARLY_POSITION]
    /// when `prepend` is set, otherwise a position after every record known
    /// at the time of the call. The event itself is left untouched and every
    /// derived event is excluded from the output.
    ///
    /// A dose with a bioavailable fraction of zero produces nothing.
    pub fn schedule(
        &self,
        records: &mut Vec<Record>,
        horizon: f64,
        prepend: bool,
    ) -> Result<(), DosingError> {
        if self.fn_() == 0.0 {
            return Ok(());
        }
        self.validate()?;

        let nextpos = if prepend {
            EARLY_POSITION
        } else {
            records.len() as i32 + 10
        };

        if self.rate() > 0.0 {
            let duration = self.duration();
            records.push(self.infusion_off(self.time() + duration).into());

            if self.ss() {
                // infusions from earlier cycles that are still running at the start
                let mut ninf = (duration / self.ii()).floor() as i64;
                let mut first_off = duration - ninf as f64 * self.ii() + self.time();
                if first_off == self.time() {
                    first_off = duration - self.ii() + self.time();
                    ninf -= 1;
                }
                for k in 0..ninf.max(0) {
                    let offtime = first_off + k as f64 * self.ii();
                    records.push(self.infusion_off(offtime).into());
                }
            }
        }

        if self.addl() > 0 {
            let kind = match self.kind() {
                EventKind::ResetAndDose if self.rate() > 0.0 => EventKind::InfusionStart,
                EventKind::ResetAndDose => EventKind::Dose,
                kind => kind,
            };

            let per_dose = if self.is_infusion() { 2 } else { 1 };
            records.reserve(per_dose * self.addl() as usize);

            for k in 1..=self.addl() {
                let ontime = self.time() + self.ii() * k as f64;
                if ontime > horizon {
                    break;
                }

                let mut evon = DoseEvent::new(
                    self.cmt(),
                    kind,
                    self.amt(),
                    ontime,
                    self.rate(),
                    nextpos,
                    self.id(),
                );
                evon.set_fn(self.fn_());
                evon.set_output(false);
                records.push(evon.into());

                if self.is_infusion() {
                    records.push(self.infusion_off(ontime + self.duration()).into());
                }
            }
        }
        Ok(())
    }

    fn infusion_off(&self, time: f64) -> DoseEvent {
        let mut evoff = DoseEvent::new(
            self.cmt(),
            EventKind::InfusionStop,
            self.amt(),
            time,
            self.rate(),
            LATE_POSITION,
            self.id(),
        );
        evoff.set_output(false);
        evoff
    }
}
