use crate::data::{DoseEvent, EventKind, Timed};
use crate::error::DosingError;
use crate::simulator::{OdeSystem, SteadyStateOptions};

impl DoseEvent {
    /// Apply this event to `system` at the event time
    ///
    /// Steady-state doses are resolved first with the default
    /// [SteadyStateOptions]. Every precondition is checked before the system
    /// is touched, and the stepper is re-initialized afterwards.
    pub fn implement<S: OdeSystem + ?Sized>(&self, system: &mut S) -> Result<(), DosingError> {
        self.implement_with(system, &SteadyStateOptions::default())
    }

    /// [DoseEvent::implement] with explicit steady-state options
    pub fn implement_with<S: OdeSystem + ?Sized>(
        &self,
        system: &mut S,
        options: &SteadyStateOptions,
    ) -> Result<(), DosingError> {
        if !self.armed() {
            return Ok(());
        }

        let kind = self.effective_kind();
        self.check(system, kind)?;
        let idx = self.record().cmt_index().unwrap_or(0);

        tracing::trace!(event = %self, "implement");
        self.dispatch(system, kind, idx, options)?;
        system.reinit();
        Ok(())
    }

    /// The kind this event is applied as; a dose with a rate starts an infusion
    pub fn effective_kind(&self) -> EventKind {
        match self.kind() {
            EventKind::Dose if self.rate() != 0.0 => EventKind::InfusionStart,
            kind => kind,
        }
    }

    fn check<S: OdeSystem + ?Sized>(&self, system: &S, kind: EventKind) -> Result<(), DosingError> {
        if self.ss() {
            if self.fn_() == 0.0 {
                return Err(DosingError::SteadyStateZeroBioavailability {
                    cmt: self.cmt(),
                    time: self.time(),
                });
            }
            if self.ii() <= 0.0 {
                return Err(DosingError::MissingInterval {
                    time: self.time(),
                    ii: self.ii(),
                });
            }
        }

        if !kind.indexes_compartment() {
            return Ok(());
        }
        let idx = match self.record().cmt_index() {
            Some(idx) if idx < system.neq() => idx,
            _ => {
                return Err(DosingError::InvalidCompartment {
                    cmt: self.cmt(),
                    neq: system.neq(),
                    evid: self.kind().evid(),
                })
            }
        };

        let action = match kind {
            EventKind::Dose => "bolus dose",
            EventKind::InfusionStart => "infusion start",
            _ => return Ok(()),
        };
        if !system.is_on(idx) {
            return Err(DosingError::CompartmentOff {
                action,
                cmt: self.cmt(),
                time: self.time(),
            });
        }
        Ok(())
    }

    fn dispatch<S: OdeSystem + ?Sized>(
        &self,
        system: &mut S,
        kind: EventKind,
        idx: usize,
        options: &SteadyStateOptions,
    ) -> Result<(), DosingError> {
        match kind {
            EventKind::ResetAndDose => {
                // reset and dose happen at the same instant
                reset_compartments(system);
                system.init_call(self.time());
                let dose = if self.rate() > 0.0 {
                    EventKind::InfusionStart
                } else {
                    EventKind::Dose
                };
                return self.dispatch(system, dose, idx, options);
            }
            _ if self.ss() => {
                if self.rate() == 0.0 {
                    self.steady_bolus(system, options)?;
                } else if self.rate() > 0.0 {
                    self.steady_infusion(system, options)?;
                }
            }
            _ => {}
        }

        match kind {
            EventKind::Dose => {
                system.fbio(idx, self.fn_());
                let y = system.y(idx) + self.amt() * self.fn_();
                system.set_y(idx, y);
            }
            EventKind::InfusionStart => {
                if self.fn_() != 0.0 {
                    system.fbio(idx, self.fn_());
                    system.rate_add(idx, self.rate());
                }
            }
            EventKind::InfusionStop => {
                if system.is_on(idx) {
                    system.rate_rm(idx, self.rate());
                }
            }
            EventKind::Toggle => {
                if self.cmt() > 0 {
                    system.on(idx);
                } else {
                    system.off(idx);
                    system.set_y(idx, 0.0);
                }
            }
            EventKind::Reset => {
                reset_compartments(system);
                system.begin_subject(self.time());
            }
            EventKind::Replace => system.set_y(idx, self.amt()),
            EventKind::ExtraDose => {
                let y = system.y(idx) + system.xdose();
                system.set_y(idx, y);
            }
            EventKind::ResetAndDose | EventKind::Observation | EventKind::Phantom => {}
        }
        Ok(())
    }
}

/// Zero every compartment and rate, and turn every compartment on
fn reset_compartments<S: OdeSystem + ?Sized>(system: &mut S) {
    for cmt in 0..system.neq() {
        system.set_y(cmt, 0.0);
        system.on(cmt);
        system.set_rate(cmt, 0.0);
    }
}
