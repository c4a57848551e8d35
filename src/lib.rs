pub mod data;
pub mod error;
pub mod simulator;

//extension traits
pub use crate::data::builder::ScheduleBuilderExt;
pub use crate::data::*;
pub use crate::simulator::equation::{self, Analytical, System, ODE};
pub use crate::simulator::{
    simulate_population, simulate_subject, OdeSystem, SimulationOptions, StateSnapshot,
    SteadyStateOptions, SteadyStateReport, SubjectStates, TaskMode, CRIT_DIFF_SS, N_SS,
    SS_WARMUP,
};
pub use error::DosingError;
pub use nalgebra::dvector;

pub mod prelude {
    pub mod data {
        pub use crate::data::{DoseEvent, EventKind, Record, Schedule, TimeRecord};
    }
    pub mod simulator {
        pub use crate::simulator::{
            equation::{Analytical, Integrator, System, ODE},
            simulate_population, simulate_subject, Compartments, OdeSystem, SimulationOptions,
            SteadyStateOptions, SubjectStates, TaskMode,
        };
    }
    pub mod models {
        pub use crate::simulator::models::one_compartment;
        pub use crate::simulator::models::one_compartment_with_absorption;
        pub use crate::simulator::models::two_compartments;
    }

    //extension traits
    pub use crate::data::builder::ScheduleBuilderExt;
    pub use crate::data::Timed;
    pub use crate::simulator::OdeSystem;
    pub use crate::DosingError;
}
