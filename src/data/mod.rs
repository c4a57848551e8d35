pub mod builder;
pub mod dose;
pub mod ordering;
pub mod record;
pub mod schedule;
pub use builder::{ScheduleBuilder, ScheduleBuilderExt};
pub use dose::DoseEvent;
pub use record::*;
pub use schedule::Schedule;
