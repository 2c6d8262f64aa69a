mod assignment;
mod plan;
mod updaters;

pub use assignment::{InitialAssignment, MissingLabelPolicy};
pub use plan::Plan;
pub use updaters::{Derived, Tally, Updaters};

#[cfg(test)]
pub(crate) use plan::tests::{grid_plan, grid_precincts};
