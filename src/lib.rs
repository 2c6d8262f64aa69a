#![doc = "Short-burst redistricting experiments: precinct graphs, district plans, ReCom, and Gingles scores"]
mod common;
mod experiment;
mod geom;
mod graph;
mod io;
mod optimize;
mod partition;
mod plan;
mod score;

#[doc(inline)]
pub use graph::PrecinctGraph;

#[doc(inline)]
pub use geom::Adjacency;

#[doc(inline)]
pub use io::AttrValue;

#[doc(inline)]
pub use plan::{Derived, InitialAssignment, MissingLabelPolicy, Plan, Tally, Updaters};

#[doc(inline)]
pub use score::ScoreFunction;

#[doc(inline)]
pub use optimize::{BurstOutcome, Direction, Gingleator, Optimizer};

#[doc(inline)]
pub use experiment::{MaxPartStats, OutputPaths, RunConfig, RunRecord, run, run_experiment, setup};
