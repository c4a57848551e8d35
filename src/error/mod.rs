use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DosingError {
    #[error("Cannot use ss flag when F(n) is zero (compartment {cmt}, time {time})")]
    SteadyStateZeroBioavailability { cmt: i32, time: f64 },
    #[error("Attempted {action} into compartment {cmt} at time {time}, but the compartment is off")]
    CompartmentOff {
        action: &'static str,
        cmt: i32,
        time: f64,
    },
    #[error("Compartment {cmt} is not valid for EVID {evid} in a system with {neq} compartments")]
    InvalidCompartment { cmt: i32, neq: usize, evid: u32 },
    #[error("A positive interdose interval is required for ADDL or SS dosing at time {time} (ii = {ii})")]
    MissingInterval { time: f64, ii: f64 },
    #[error("Unknown EVID: {evid}")]
    UnknownEvid { evid: u32 },
    #[error("Cannot simulate an empty schedule")]
    EmptySchedule,
    #[error("Integration error: {0}")]
    Integration(String),
}
