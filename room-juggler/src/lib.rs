//! Assigns guests to rooms so that as many roommate wishes as possible come
//! true, using simulated annealing per gender partition.

pub mod assignment;
pub mod config;
pub mod input;
pub mod job;
pub mod juggler;
pub mod model;
pub mod monitor;
pub mod partition;
pub mod problem;
pub mod relations;
pub mod report;

pub use assignment::{AssignmentState, InvariantViolation};
pub use config::{ConfigError, JuggleConfig, JuggleOptions};
pub use input::{InputError, Lists, Roster};
pub use job::{JobError, PartitionJob, RoomJugglerJob};
pub use juggler::{JuggleError, JuggleOutcome, JuggleStats, Move, anneal, juggle};
pub use model::{Gender, Guest, Room, Wish};
pub use monitor::{CancelFlag, LogMonitor, Monitor, StepReport};
pub use problem::{ProblemError, RoomOccupancyProblem};
pub use report::JobReport;
