pub mod routine;
pub mod time_of_day;

pub use routine::{Frequency, Routine, Schedule};
pub use time_of_day::TimeOfDay;
