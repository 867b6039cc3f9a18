//! Read-side projections over decisions

mod tally;

pub use tally::{project, project_for, OptionTally, Tally};
